use std::io::{self, Write};

use anyhow::Context;
use colored::Colorize;
use serde_json::json;

use arbor_model::{ArborConfig, Repository, RepositoryObject};
use arbor_types::Pid;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let format = cli.format;
    if let Command::Config = cli.command {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }
    let repo = Repository::connect(config).context("connecting to repository")?;
    match cli.command {
        Command::Show(args) => cmd_show(&repo, &args.pid, format),
        Command::Ancestors(args) => cmd_ancestors(&repo, &args.pid, format),
        Command::Members(args) => cmd_members(&repo, &args.pid, format),
        Command::Etag(args) => cmd_etag(&repo, &args.pid, format),
        Command::Cat(args) => cmd_cat(&repo, args),
        Command::Events(args) => cmd_events(&repo, &args.pid, format),
        Command::Derivatives(args) => cmd_derivatives(&repo, &args.pid, format),
        Command::Config => Ok(()),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<ArborConfig> {
    let mut config = match &cli.config {
        Some(path) => ArborConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => ArborConfig::default(),
    };
    if let Some(base_uri) = &cli.base_uri {
        config.store.base_uri = base_uri.clone();
    }
    if let Some(endpoint) = &cli.query_endpoint {
        config.store.query_endpoint = endpoint.clone();
    }
    config.validate()?;
    Ok(config)
}

fn cmd_show(repo: &Repository, pid: &Pid, format: OutputFormat) -> anyhow::Result<()> {
    let object = repo.get(pid)?;
    let core = object.core();
    let graph = core.graph()?;
    let types = core.types()?;
    let last_modified = core.last_modified()?;

    match format {
        OutputFormat::Json => {
            let value = json!({
                "pid": pid.to_string(),
                "kind": object.resource_type().name(),
                "uri": object.uri(),
                "etag": core.etag(),
                "last_modified": last_modified.map(|t| t.to_rfc3339()),
                "types": &*types,
                "statements": &*graph,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            println!("{} {}", object.resource_type().name().cyan().bold(), pid.to_string().yellow());
            println!("  URI: {}", object.uri());
            if let Some(etag) = core.etag() {
                println!("  ETag: {}", etag.dimmed());
            }
            if let Some(ts) = last_modified {
                println!("  Last modified: {}", ts.to_rfc3339());
            }
            for t in types.iter() {
                println!("  Type: {}", t.blue());
            }
            println!("  Statements: {}", graph.len().to_string().bold());
            for statement in graph.iter() {
                println!("    {statement}");
            }
        }
    }
    Ok(())
}

fn cmd_ancestors(repo: &Repository, pid: &Pid, format: OutputFormat) -> anyhow::Result<()> {
    let path = repo.ancestors().get_ancestor_pids(pid)?;
    print_pids(&path, format)
}

fn cmd_members(repo: &Repository, pid: &Pid, format: OutputFormat) -> anyhow::Result<()> {
    let members = match repo.get(pid)? {
        RepositoryObject::Work(work) => repo.membership().ordered_members(&work)?,
        _ => repo.membership().list_members(pid)?,
    };
    print_pids(&members, format)
}

fn print_pids(pids: &[Pid], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let list: Vec<String> = pids.iter().map(Pid::to_string).collect();
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
        OutputFormat::Text if pids.is_empty() => println!("{}", "(none)".dimmed()),
        OutputFormat::Text => {
            for pid in pids {
                println!("{pid}");
            }
        }
    }
    Ok(())
}

fn cmd_etag(repo: &Repository, pid: &Pid, format: OutputFormat) -> anyhow::Result<()> {
    let object = repo.get(pid)?;
    let etag = repo.driver().get_etag(object.core())?;
    match format {
        OutputFormat::Json => println!("{}", json!({ "pid": pid.to_string(), "etag": etag })),
        OutputFormat::Text => println!("{}", etag.unwrap_or_else(|| "(none)".into())),
    }
    Ok(())
}

fn cmd_cat(repo: &Repository, args: CatArgs) -> anyhow::Result<()> {
    let binary = repo.cache().get_binary(&args.pid)?;
    let mut stream = binary.open_stream(args.range)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    io::copy(&mut stream, &mut out)?;
    out.flush()?;
    Ok(())
}

fn cmd_events(repo: &Repository, pid: &Pid, format: OutputFormat) -> anyhow::Result<()> {
    let object = repo.get(pid)?;
    let events = object.core().event_log().events()?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&events)?),
        OutputFormat::Text if events.is_empty() => println!("{}", "No events.".dimmed()),
        OutputFormat::Text => {
            for event in &events {
                println!(
                    "{}  {}{}",
                    event.date_time.to_rfc3339().dimmed(),
                    event.event_type.green(),
                    event
                        .agent
                        .as_ref()
                        .map(|a| format!(" by {a}"))
                        .unwrap_or_default()
                );
                if let Some(detail) = &event.detail {
                    println!("    {detail}");
                }
            }
        }
    }
    Ok(())
}

fn cmd_derivatives(repo: &Repository, pid: &Pid, format: OutputFormat) -> anyhow::Result<()> {
    let found = repo.derivatives().list(pid)?;
    match format {
        OutputFormat::Json => {
            let list: Vec<_> = found
                .iter()
                .map(|d| {
                    json!({
                        "datastream": d.datastream.id(),
                        "path": d.path.display().to_string(),
                        "size": d.size,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
        OutputFormat::Text if found.is_empty() => println!("{}", "No derivatives.".dimmed()),
        OutputFormat::Text => {
            for d in &found {
                println!("{:<24} {:>10}  {}", d.datastream.id().cyan(), d.size, d.path.display());
            }
        }
    }
    Ok(())
}
