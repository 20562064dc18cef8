//! Blocking HTTP client for the remote object store and query endpoint.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{self, HeaderMap};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use tracing::debug;

use arbor_types::{vocab, Graph, GraphUpdate, Statement, TriplePattern};

use crate::error::{StoreError, StoreResult};
use crate::link::{parse_link_header, LinkValue};
use crate::traits::{
    BinaryContent, BinaryStream, BinaryUpload, ByteRange, GraphResponse, ObjectStore,
    QueryService, ResourceHead, ResourceKind,
};

/// Media type of a JSON-serialized [`Graph`].
pub const GRAPH_MEDIA_TYPE: &str = "application/vnd.arbor.graph+json";
/// Media type of a JSON-serialized [`GraphUpdate`].
pub const GRAPH_UPDATE_MEDIA_TYPE: &str = "application/vnd.arbor.graph-update+json";

/// Media type of an RFC 9457 problem details body.
pub const PROBLEM_MEDIA_TYPE: &str = "application/problem+json";
/// Problem type the store reports for a rejected digest.
pub const CHECKSUM_PROBLEM_TYPE: &str = "https://arbor.dev/problems/checksum-mismatch";
/// Message prefix the store uses for a rejected digest in plain-text bodies.
const CHECKSUM_MESSAGE_PREFIX: &str = "checksum mismatch";

fn build_client(timeout: Duration) -> StoreResult<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Map a non-success response to the matching [`StoreError`].
fn check(uri: &str, response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match status {
        StatusCode::NOT_FOUND => Err(StoreError::NotFound(uri.to_string())),
        StatusCode::GONE => Err(StoreError::Gone(uri.to_string())),
        StatusCode::CONFLICT => {
            let content_type = header_str(response.headers(), header::CONTENT_TYPE);
            let body = response.text().unwrap_or_default();
            Err(conflict_error(uri, content_type.as_deref(), body))
        }
        StatusCode::RANGE_NOT_SATISFIABLE => Err(StoreError::RangeNotSatisfiable {
            uri: uri.to_string(),
            start: 0,
            length: 0,
        }),
        other => Err(StoreError::UnexpectedStatus {
            uri: uri.to_string(),
            status: other.as_u16(),
        }),
    }
}

#[derive(Deserialize)]
struct Problem {
    #[serde(rename = "type")]
    kind: Option<String>,
    title: Option<String>,
    detail: Option<String>,
}

/// Classify a 409 body: a checksum problem or any other conflict.
pub(crate) fn conflict_error(uri: &str, content_type: Option<&str>, body: String) -> StoreError {
    let is_problem = content_type
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|ct| ct.trim().eq_ignore_ascii_case(PROBLEM_MEDIA_TYPE));
    let (checksum, detail) = match serde_json::from_str::<Problem>(&body) {
        Ok(problem) if is_problem => {
            let checksum = problem.kind.as_deref() == Some(CHECKSUM_PROBLEM_TYPE);
            let detail = problem.detail.or(problem.title).unwrap_or(body);
            (checksum, detail)
        }
        _ => {
            let checksum = body
                .trim_start()
                .get(..CHECKSUM_MESSAGE_PREFIX.len())
                .is_some_and(|p| p.eq_ignore_ascii_case(CHECKSUM_MESSAGE_PREFIX));
            (checksum, body)
        }
    };
    let uri = uri.to_string();
    if checksum {
        StoreError::ChecksumMismatch { uri, detail }
    } else {
        StoreError::Conflict { uri, detail }
    }
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn links(headers: &HeaderMap) -> Vec<LinkValue> {
    headers
        .get_all(header::LINK)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(parse_link_header)
        .collect()
}

/// Build a [`ResourceHead`] from response headers.
pub(crate) fn head_from_headers(uri: &str, headers: &HeaderMap) -> ResourceHead {
    let links = links(headers);
    let is_binary = links
        .iter()
        .any(|l| l.has_rel("type") && l.uri == vocab::ldp::NON_RDF_SOURCE);
    ResourceHead {
        uri: uri.to_string(),
        kind: if is_binary {
            ResourceKind::Binary
        } else {
            ResourceKind::Rdf
        },
        etag: header_str(headers, header::ETAG),
        described_by: links
            .iter()
            .find(|l| l.has_rel("describedby"))
            .map(|l| l.uri.clone()),
        content_location: header_str(headers, header::CONTENT_LOCATION),
        content_length: header_str(headers, header::CONTENT_LENGTH).and_then(|v| v.parse().ok()),
    }
}

/// [`ObjectStore`] over HTTP.
#[derive(Clone, Debug)]
pub struct HttpObjectStore {
    client: Client,
}

impl HttpObjectStore {
    pub fn new(timeout: Duration) -> StoreResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
        })
    }

    fn send(&self, uri: &str, request: RequestBuilder) -> StoreResult<Response> {
        let response = request.send()?;
        debug!(uri, status = response.status().as_u16(), "store response");
        check(uri, response)
    }
}

impl ObjectStore for HttpObjectStore {
    fn head(&self, uri: &str) -> StoreResult<ResourceHead> {
        let response = self.send(uri, self.client.head(uri))?;
        Ok(head_from_headers(uri, response.headers()))
    }

    fn get_graph(&self, uri: &str) -> StoreResult<GraphResponse> {
        let response = self.send(
            uri,
            self.client.get(uri).header(header::ACCEPT, GRAPH_MEDIA_TYPE),
        )?;
        let etag = header_str(response.headers(), header::ETAG);
        let graph: Graph = response.json()?;
        Ok(GraphResponse { graph, etag })
    }

    fn put_graph(&self, uri: &str, graph: &Graph) -> StoreResult<ResourceHead> {
        let body = serde_json::to_vec(graph)?;
        let response = self.send(
            uri,
            self.client
                .put(uri)
                .header(header::CONTENT_TYPE, GRAPH_MEDIA_TYPE)
                .body(body),
        )?;
        let mut head = head_from_headers(uri, response.headers());
        head.kind = ResourceKind::Rdf;
        Ok(head)
    }

    fn post(&self, container: &str, slug: Option<&str>, graph: &Graph) -> StoreResult<String> {
        let mut request = self
            .client
            .post(container)
            .header(header::CONTENT_TYPE, GRAPH_MEDIA_TYPE)
            .body(serde_json::to_vec(graph)?);
        if let Some(slug) = slug {
            request = request.header("Slug", slug);
        }
        let response = self.send(container, request)?;
        match header_str(response.headers(), header::LOCATION) {
            Some(location) => Ok(location),
            None => Ok(response.text()?.trim().to_string()),
        }
    }

    fn patch(&self, uri: &str, update: &GraphUpdate) -> StoreResult<()> {
        self.send(
            uri,
            self.client
                .request(Method::PATCH, uri)
                .header(header::CONTENT_TYPE, GRAPH_UPDATE_MEDIA_TYPE)
                .body(serde_json::to_vec(update)?),
        )?;
        Ok(())
    }

    fn put_binary(&self, uri: &str, upload: &BinaryUpload) -> StoreResult<ResourceHead> {
        let mimetype = upload
            .mimetype
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let mut request = self.client.put(uri);
        if let Some(filename) = &upload.filename {
            request = request.header(
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            );
        }
        if !upload.digests.is_empty() {
            let digests: Vec<String> = upload.digests.iter().map(|d| d.to_header_value()).collect();
            request = request.header("Digest", digests.join(", "));
        }
        request = match &upload.content {
            BinaryContent::Inline(bytes) => request
                .header(header::CONTENT_TYPE, mimetype)
                .body(bytes.to_vec()),
            BinaryContent::External(location) => {
                let link = LinkValue {
                    uri: location.clone(),
                    params: vec![
                        ("rel".into(), vocab::fedora::EXTERNAL_CONTENT.into()),
                        ("handling".into(), "proxy".into()),
                        ("type".into(), mimetype),
                    ],
                };
                request.header(header::LINK, link.to_header_value())
            }
        };
        let response = self.send(uri, request)?;
        let mut head = head_from_headers(uri, response.headers());
        head.kind = ResourceKind::Binary;
        Ok(head)
    }

    fn open_binary(&self, uri: &str, range: Option<ByteRange>) -> StoreResult<BinaryStream> {
        let mut request = self.client.get(uri);
        if let Some(range) = range {
            request = request.header(header::RANGE, range.to_header_value());
        }
        let response = self.send(uri, request)?;
        Ok(Box::new(response))
    }
}

/// [`QueryService`] posting patterns to a query endpoint.
///
/// The endpoint accepts a JSON [`TriplePattern`] and answers with a JSON
/// array of matching statements.
#[derive(Clone, Debug)]
pub struct HttpQueryService {
    client: Client,
    endpoint: String,
}

impl HttpQueryService {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> StoreResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: endpoint.into(),
        })
    }
}

impl QueryService for HttpQueryService {
    fn find(&self, pattern: &TriplePattern) -> StoreResult<Vec<Statement>> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(header::ACCEPT, "application/json")
            .json(pattern)
            .send()?;
        let response = check(&self.endpoint, response)?;
        Ok(response.json()?)
    }
}
