//! `Link` header parsing (RFC 8288 subset).

/// One link value: a target URI and its parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkValue {
    pub uri: String,
    pub params: Vec<(String, String)>,
}

impl LinkValue {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether any of the space-separated `rel` values equals `rel`.
    pub fn has_rel(&self, rel: &str) -> bool {
        self.param("rel")
            .is_some_and(|rels| rels.split_whitespace().any(|r| r == rel))
    }

    /// Render as a header value.
    pub fn to_header_value(&self) -> String {
        let mut out = format!("<{}>", self.uri);
        for (k, v) in &self.params {
            out.push_str(&format!("; {k}=\"{v}\""));
        }
        out
    }
}

/// Parse a `Link` header value into its link values.
///
/// Malformed entries are skipped rather than failing the whole header.
pub fn parse_link_header(header: &str) -> Vec<LinkValue> {
    let mut links = Vec::new();
    let mut rest = header;
    while let Some(open) = rest.find('<') {
        let Some(close) = rest[open..].find('>') else {
            break;
        };
        let uri = rest[open + 1..open + close].trim().to_string();
        rest = &rest[open + close + 1..];

        let end = param_section_end(rest);
        let params = rest[..end]
            .split(';')
            .filter_map(|p| {
                let (k, v) = p.split_once('=')?;
                Some((k.trim().to_string(), v.trim().trim_matches('"').to_string()))
            })
            .collect();
        links.push(LinkValue { uri, params });
        rest = &rest[end..];
    }
    links
}

/// Index of the comma ending the current link's parameters, ignoring commas
/// inside quoted strings.
fn param_section_end(s: &str) -> usize {
    let mut quoted = false;
    for (i, c) in s.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => return i,
            _ => {}
        }
    }
    s.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multiple_links() {
        let header = r#"<http://r/a/fcr:metadata>; rel="describedby", <http://www.w3.org/ns/ldp#NonRDFSource>;rel="type""#;
        let links = parse_link_header(header);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].uri, "http://r/a/fcr:metadata");
        assert!(links[0].has_rel("describedby"));
        assert!(links[1].has_rel("type"));
    }

    #[test]
    fn quoted_commas_do_not_split() {
        let header = r#"<http://x>; title="a, b"; rel="alternate""#;
        let links = parse_link_header(header);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].param("title"), Some("a, b"));
        assert!(links[0].has_rel("alternate"));
    }

    #[test]
    fn space_separated_rels() {
        let links = parse_link_header(r#"<http://x>; rel="type describedby""#);
        assert!(links[0].has_rel("describedby"));
    }

    #[test]
    fn renders_header_value() {
        let link = LinkValue {
            uri: "file:///a".into(),
            params: vec![("rel".into(), "external".into())],
        };
        assert_eq!(link.to_header_value(), r#"<file:///a>; rel="external""#);
        assert_eq!(parse_link_header(&link.to_header_value()), vec![link]);
    }

    #[test]
    fn garbage_yields_nothing() {
        assert!(parse_link_header("no links here").is_empty());
    }
}
