use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use arbor_store::ByteRange;
use arbor_types::Pid;

#[derive(Parser)]
#[command(
    name = "arbor",
    about = "Inspect objects in an arbor digital repository",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the store base URI
    #[arg(long, global = true)]
    pub base_uri: Option<String>,

    /// Override the query endpoint
    #[arg(long, global = true)]
    pub query_endpoint: Option<String>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show an object's kind, version and statements
    Show(PidArgs),
    /// List ancestors, root first
    Ancestors(PidArgs),
    /// List direct members, in declared order for works
    Members(PidArgs),
    /// Print the current version token
    Etag(PidArgs),
    /// Write a binary's content to stdout
    Cat(CatArgs),
    /// Show PREMIS events recorded for an object
    Events(PidArgs),
    /// List generated derivatives of an object
    Derivatives(PidArgs),
    /// Print the effective configuration
    Config,
}

#[derive(Args)]
pub struct PidArgs {
    /// Object pid, e.g. `content/<uuid>` or a bare content id
    pub pid: Pid,
}

#[derive(Args)]
pub struct CatArgs {
    pub pid: Pid,
    /// Inclusive byte range, `start-end` or `start-`
    #[arg(long, value_parser = parse_range)]
    pub range: Option<ByteRange>,
}

pub fn parse_range(s: &str) -> Result<ByteRange, String> {
    let (start, end) = s
        .split_once('-')
        .ok_or_else(|| format!("expected start-end, got '{s}'"))?;
    let start: u64 = start
        .trim()
        .parse()
        .map_err(|_| format!("invalid range start '{start}'"))?;
    let end = match end.trim() {
        "" => None,
        e => Some(e.parse::<u64>().map_err(|_| format!("invalid range end '{e}'"))?),
    };
    if end.is_some_and(|e| e < start) {
        return Err(format!("range end precedes start in '{s}'"));
    }
    Ok(ByteRange::new(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_parse() {
        assert_eq!(parse_range("2-4").unwrap(), ByteRange::new(2, Some(4)));
        assert_eq!(parse_range("10-").unwrap(), ByteRange::new(10, None));
        assert!(parse_range("4-2").is_err());
        assert!(parse_range("abc").is_err());
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "arbor",
            "show",
            "content/abc",
            "--format",
            "json",
            "--base-uri",
            "http://fcrepo/rest",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.base_uri.as_deref(), Some("http://fcrepo/rest"));
        match cli.command {
            Command::Show(args) => assert_eq!(args.pid, Pid::content("abc").unwrap()),
            _ => panic!("expected show"),
        }
    }

    #[test]
    fn cat_takes_a_range() {
        let cli = Cli::try_parse_from(["arbor", "cat", "abc/datafs/original_file", "--range", "0-9"])
            .unwrap();
        match cli.command {
            Command::Cat(args) => {
                assert_eq!(args.range, Some(ByteRange::new(0, Some(9))));
                assert_eq!(args.pid.component(), Some("datafs/original_file"));
            }
            _ => panic!("expected cat"),
        }
    }

    #[test]
    fn invalid_pid_is_rejected() {
        assert!(Cli::try_parse_from(["arbor", "show", "a b"]).is_err());
    }
}
