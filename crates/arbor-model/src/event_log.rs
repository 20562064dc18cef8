//! PREMIS event history kept beside each object.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use arbor_store::StoreError;
use arbor_types::{vocab, Graph, GraphUpdate, Pid, Statement, Term};

use crate::driver::ObjectDriver;
use crate::error::{ModelError, ModelResult};

/// Name of the event log resource under its object.
pub const EVENT_LOG_SLUG: &str = "event_log";

/// One preservation event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremisEvent {
    pub id: String,
    pub event_type: String,
    pub date_time: DateTime<Utc>,
    pub agent: Option<String>,
    pub detail: Option<String>,
}

impl PremisEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_type: event_type.into(),
            date_time: Utc::now(),
            agent: None,
            detail: None,
        }
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    fn statements(&self, subject: &str) -> Vec<Statement> {
        let mut out = vec![
            Statement::new(subject, vocab::rdf::TYPE, Term::iri(vocab::premis::EVENT)),
            Statement::new(
                subject,
                vocab::premis::HAS_EVENT_TYPE,
                Term::literal(&self.event_type),
            ),
            Statement::new(
                subject,
                vocab::premis::HAS_EVENT_DATE_TIME,
                Term::typed_literal(
                    self.date_time.to_rfc3339_opts(SecondsFormat::Millis, true),
                    vocab::xsd::DATE_TIME,
                ),
            ),
        ];
        if let Some(agent) = &self.agent {
            out.push(Statement::new(subject, vocab::premis::HAS_AGENT, Term::literal(agent)));
        }
        if let Some(detail) = &self.detail {
            out.push(Statement::new(
                subject,
                vocab::premis::HAS_EVENT_DETAIL,
                Term::literal(detail),
            ));
        }
        out
    }

    fn from_graph(graph: &Graph, subject: &str) -> Option<Self> {
        let (_, id) = subject.rsplit_once('#')?;
        let date_time = graph
            .literal(subject, vocab::premis::HAS_EVENT_DATE_TIME)
            .and_then(|v| DateTime::parse_from_rfc3339(v).ok())?
            .with_timezone(&Utc);
        Some(Self {
            id: id.to_string(),
            event_type: graph
                .literal(subject, vocab::premis::HAS_EVENT_TYPE)?
                .to_string(),
            date_time,
            agent: graph
                .literal(subject, vocab::premis::HAS_AGENT)
                .map(str::to_string),
            detail: graph
                .literal(subject, vocab::premis::HAS_EVENT_DETAIL)
                .map(str::to_string),
        })
    }
}

/// Append-only event log of one object.
pub struct EventLog {
    pid: Pid,
    object_uri: String,
    log_uri: String,
    driver: Arc<ObjectDriver>,
    provisioned: AtomicBool,
}

impl EventLog {
    pub(crate) fn new(pid: Pid, object_uri: &str, driver: Arc<ObjectDriver>) -> Self {
        Self {
            pid,
            object_uri: object_uri.to_string(),
            log_uri: format!("{object_uri}/{EVENT_LOG_SLUG}"),
            driver,
            provisioned: AtomicBool::new(false),
        }
    }

    pub fn uri(&self) -> &str {
        &self.log_uri
    }

    /// Append `event`, creating the log on first use.
    pub fn record(&self, event: &PremisEvent) -> ModelResult<()> {
        self.provision()?;
        let subject = format!("{}#{}", self.log_uri, event.id);
        let update = event
            .statements(&subject)
            .into_iter()
            .fold(GraphUpdate::new(), GraphUpdate::insert)
            .insert(Statement::new(
                &self.log_uri,
                vocab::arbor::HAS_EVENT,
                Term::iri(&subject),
            ));
        self.driver
            .store()
            .patch(&self.log_uri, &update)
            .map_err(|e| ModelError::from_store(&self.pid, e))?;
        debug!(pid = %self.pid, event_type = %event.event_type, "recorded event");
        Ok(())
    }

    /// Create the log resource unless it already exists. Appends only ever
    /// patch it, so concurrent writers never replace each other's events.
    fn provision(&self) -> ModelResult<()> {
        if self.provisioned.load(Ordering::Acquire) {
            return Ok(());
        }
        let mut body = Graph::new();
        body.add("", vocab::rdf::TYPE, Term::iri(vocab::arbor::EVENT_LOG));
        match self
            .driver
            .store()
            .post(&self.object_uri, Some(EVENT_LOG_SLUG), &body)
        {
            Ok(_) => debug!(pid = %self.pid, "created event log"),
            Err(StoreError::Conflict { .. }) => {}
            Err(e) => return Err(ModelError::from_store(&self.pid, e)),
        }
        self.provisioned.store(true, Ordering::Release);
        Ok(())
    }

    /// All recorded events, oldest first.
    pub fn events(&self) -> ModelResult<Vec<PremisEvent>> {
        let graph = match self.driver.store().get_graph(&self.log_uri) {
            Ok(response) => response.graph,
            Err(StoreError::NotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(ModelError::from_store(&self.pid, e)),
        };
        let mut events: Vec<PremisEvent> = graph
            .iris(&self.log_uri, vocab::arbor::HAS_EVENT)
            .into_iter()
            .filter_map(|subject| PremisEvent::from_graph(&graph, subject))
            .collect();
        events.sort_by(|a, b| a.date_time.cmp(&b.date_time).then_with(|| a.id.cmp(&b.id)));
        Ok(events)
    }
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog").field("uri", &self.log_uri).finish()
    }
}
