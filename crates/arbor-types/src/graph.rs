//! Statement graphs: the subject–predicate–object facts a resource carries.
//!
//! [`Graph`] is an ordered, deduplicated set of [`Statement`]s. It is the
//! unit exchanged with the remote store on GET/PUT, while [`GraphUpdate`]
//! carries the delete/insert sets of a PATCH and [`TriplePattern`] is the
//! request shape of a graph query.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::vocab;

/// Object position of a statement.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Term {
    /// Reference to another resource.
    Iri { value: String },
    /// Literal value with an optional datatype IRI.
    Literal {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        datatype: Option<String>,
    },
}

impl Term {
    pub fn iri(value: impl Into<String>) -> Self {
        Self::Iri {
            value: value.into(),
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            datatype: None,
        }
    }

    pub fn typed_literal(value: impl Into<String>, datatype: &str) -> Self {
        Self::Literal {
            value: value.into(),
            datatype: Some(datatype.to_string()),
        }
    }

    /// The lexical value, regardless of kind.
    pub fn value(&self) -> &str {
        match self {
            Self::Iri { value } | Self::Literal { value, .. } => value,
        }
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Self::Iri { value } => Some(value),
            Self::Literal { .. } => None,
        }
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal { value, .. } => Some(value),
            Self::Iri { .. } => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri { value } => write!(f, "<{value}>"),
            Self::Literal {
                value,
                datatype: Some(dt),
            } => write!(f, "{value:?}^^<{dt}>"),
            Self::Literal { value, .. } => write!(f, "{value:?}"),
        }
    }
}

/// A single subject–predicate–object fact.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Statement {
    pub subject: String,
    pub predicate: String,
    pub object: Term,
}

impl Statement {
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> <{}> {} .", self.subject, self.predicate, self.object)
    }
}

/// An ordered, deduplicated set of statements.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Graph {
    statements: BTreeSet<Statement>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Add a statement. Returns `false` if it was already present.
    pub fn insert(&mut self, statement: Statement) -> bool {
        self.statements.insert(statement)
    }

    /// Add a statement built from its parts.
    pub fn add(&mut self, subject: &str, predicate: &str, object: Term) -> bool {
        self.insert(Statement::new(subject, predicate, object))
    }

    pub fn remove(&mut self, statement: &Statement) -> bool {
        self.statements.remove(statement)
    }

    pub fn contains(&self, statement: &Statement) -> bool {
        self.statements.contains(statement)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter()
    }

    /// Remove every `(subject, predicate, *)` statement and return them.
    pub fn remove_property(&mut self, subject: &str, predicate: &str) -> Vec<Statement> {
        let removed = self.property_statements(subject, predicate);
        for statement in &removed {
            self.statements.remove(statement);
        }
        removed
    }

    /// All `(subject, predicate, *)` statements.
    pub fn property_statements(&self, subject: &str, predicate: &str) -> Vec<Statement> {
        self.statements
            .iter()
            .filter(|s| s.subject == subject && s.predicate == predicate)
            .cloned()
            .collect()
    }

    /// Objects of `(subject, predicate, ?)`.
    pub fn objects<'a, 'b>(
        &'a self,
        subject: &'b str,
        predicate: &'b str,
    ) -> impl Iterator<Item = &'a Term> + 'b
    where
        'a: 'b,
    {
        self.statements
            .iter()
            .filter(move |s| s.subject == subject && s.predicate == predicate)
            .map(|s| &s.object)
    }

    /// First object of `(subject, predicate, ?)`, in statement order.
    pub fn first_object(&self, subject: &str, predicate: &str) -> Option<&Term> {
        self.objects(subject, predicate).next()
    }

    /// First literal value of `(subject, predicate, ?)`.
    pub fn literal(&self, subject: &str, predicate: &str) -> Option<&str> {
        self.objects(subject, predicate).find_map(Term::as_literal)
    }

    /// IRI values of `(subject, predicate, ?)`.
    pub fn iris(&self, subject: &str, predicate: &str) -> Vec<&str> {
        self.objects(subject, predicate)
            .filter_map(Term::as_iri)
            .collect()
    }

    /// Subjects of `(?, predicate, object)`.
    pub fn subjects_with(&self, predicate: &str, object: &Term) -> Vec<&str> {
        self.statements
            .iter()
            .filter(|s| s.predicate == predicate && &s.object == object)
            .map(|s| s.subject.as_str())
            .collect()
    }

    /// Declared `rdf:type` values of a subject.
    pub fn types(&self, subject: &str) -> Vec<String> {
        self.iris(subject, vocab::rdf::TYPE)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn has_type(&self, subject: &str, type_iri: &str) -> bool {
        self.contains(&Statement::new(subject, vocab::rdf::TYPE, Term::iri(type_iri)))
    }

    /// Statements matching a pattern.
    pub fn matching<'a>(
        &'a self,
        pattern: &'a TriplePattern,
    ) -> impl Iterator<Item = &'a Statement> + 'a {
        self.statements.iter().filter(move |s| pattern.matches(s))
    }

    /// Replace the subject `from` with `to` in every statement, including
    /// IRI objects referring to `from`.
    pub fn rebase(&mut self, from: &str, to: &str) {
        let rewritten: BTreeSet<Statement> = std::mem::take(&mut self.statements)
            .into_iter()
            .map(|mut s| {
                if s.subject == from {
                    s.subject = to.to_string();
                }
                if let Term::Iri { value } = &mut s.object {
                    if value == from {
                        *value = to.to_string();
                    }
                }
                s
            })
            .collect();
        self.statements = rewritten;
    }

    /// Add every statement of `other`.
    pub fn merge(&mut self, other: &Graph) {
        self.statements.extend(other.statements.iter().cloned());
    }

    /// Apply a delete/insert update in place.
    pub fn apply(&mut self, update: &GraphUpdate) {
        for statement in &update.delete {
            self.statements.remove(statement);
        }
        for statement in &update.insert {
            self.statements.insert(statement.clone());
        }
    }
}

impl FromIterator<Statement> for Graph {
    fn from_iter<I: IntoIterator<Item = Statement>>(iter: I) -> Self {
        Self {
            statements: iter.into_iter().collect(),
        }
    }
}

impl Extend<Statement> for Graph {
    fn extend<I: IntoIterator<Item = Statement>>(&mut self, iter: I) {
        self.statements.extend(iter);
    }
}

impl IntoIterator for Graph {
    type Item = Statement;
    type IntoIter = std::collections::btree_set::IntoIter<Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}

/// A partial update: statements to delete, then statements to insert.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphUpdate {
    pub delete: Vec<Statement>,
    pub insert: Vec<Statement>,
}

impl GraphUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, statement: Statement) -> Self {
        self.insert.push(statement);
        self
    }

    pub fn delete(mut self, statement: Statement) -> Self {
        self.delete.push(statement);
        self
    }

    pub fn delete_all(mut self, statements: impl IntoIterator<Item = Statement>) -> Self {
        self.delete.extend(statements);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.delete.is_empty() && self.insert.is_empty()
    }
}

/// A single-statement query pattern; `None` positions match anything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriplePattern {
    pub subject: Option<String>,
    pub predicate: Option<String>,
    pub object: Option<Term>,
}

impl TriplePattern {
    /// `(?s, predicate, object)`: who points at `object` via `predicate`.
    pub fn pointing_at(predicate: &str, object: Term) -> Self {
        Self {
            subject: None,
            predicate: Some(predicate.to_string()),
            object: Some(object),
        }
    }

    /// `(subject, predicate, ?o)`.
    pub fn values_of(subject: &str, predicate: &str) -> Self {
        Self {
            subject: Some(subject.to_string()),
            predicate: Some(predicate.to_string()),
            object: None,
        }
    }

    pub fn matches(&self, statement: &Statement) -> bool {
        self.subject.as_ref().map_or(true, |s| *s == statement.subject)
            && self
                .predicate
                .as_ref()
                .map_or(true, |p| *p == statement.predicate)
            && self.object.as_ref().map_or(true, |o| *o == statement.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const S: &str = "http://x/a";

    fn sample() -> Graph {
        let mut g = Graph::new();
        g.add(S, vocab::rdf::TYPE, Term::iri(vocab::arbor::WORK));
        g.add(S, vocab::pcdm::MEMBER_OF, Term::iri("http://x/parent"));
        g.add(S, vocab::arbor::TITLE, Term::literal("A title"));
        g
    }

    #[test]
    fn insert_is_deduplicated() {
        let mut g = sample();
        assert!(!g.add(S, vocab::arbor::TITLE, Term::literal("A title")));
        assert_eq!(g.len(), 3);
    }

    #[test]
    fn types_and_lookup() {
        let g = sample();
        assert_eq!(g.types(S), vec![vocab::arbor::WORK.to_string()]);
        assert!(g.has_type(S, vocab::arbor::WORK));
        assert_eq!(g.literal(S, vocab::arbor::TITLE), Some("A title"));
        assert_eq!(g.iris(S, vocab::pcdm::MEMBER_OF), vec!["http://x/parent"]);
        assert_eq!(
            g.subjects_with(vocab::pcdm::MEMBER_OF, &Term::iri("http://x/parent")),
            vec![S]
        );
    }

    #[test]
    fn lookups_outlive_the_query_strings() {
        let g = sample();
        let title = {
            let subject = String::from(S);
            g.literal(&subject, vocab::arbor::TITLE)
        };
        let parents = {
            let predicate = vocab::pcdm::MEMBER_OF.to_string();
            g.iris(S, &predicate)
        };
        assert_eq!(title, Some("A title"));
        assert_eq!(parents, vec!["http://x/parent"]);
    }

    #[test]
    fn remove_property_returns_removed() {
        let mut g = sample();
        g.add(S, vocab::pcdm::MEMBER_OF, Term::iri("http://x/other"));
        let removed = g.remove_property(S, vocab::pcdm::MEMBER_OF);
        assert_eq!(removed.len(), 2);
        assert!(g.iris(S, vocab::pcdm::MEMBER_OF).is_empty());
    }

    #[test]
    fn apply_deletes_before_inserting() {
        let mut g = sample();
        let old = Statement::new(S, vocab::arbor::TITLE, Term::literal("A title"));
        let new = Statement::new(S, vocab::arbor::TITLE, Term::literal("B"));
        g.apply(&GraphUpdate::new().delete(old.clone()).insert(new.clone()));
        assert!(!g.contains(&old));
        assert!(g.contains(&new));
    }

    #[test]
    fn rebase_rewrites_subjects_and_self_references() {
        let mut g = Graph::new();
        g.add("", vocab::rdf::TYPE, Term::iri(vocab::arbor::FOLDER));
        g.add("", vocab::arbor::PRIMARY_OBJECT, Term::iri(""));
        g.rebase("", S);
        assert!(g.has_type(S, vocab::arbor::FOLDER));
        assert_eq!(g.iris(S, vocab::arbor::PRIMARY_OBJECT), vec![S]);
    }

    #[test]
    fn pattern_matching() {
        let g = sample();
        let p = TriplePattern::values_of(S, vocab::pcdm::MEMBER_OF);
        assert_eq!(g.matching(&p).count(), 1);
        let any = TriplePattern::default();
        assert_eq!(g.matching(&any).count(), 3);
    }

    #[test]
    fn serde_json_shape() {
        let g = sample();
        let json = serde_json::to_string(&g).unwrap();
        assert!(json.starts_with('['));
        let parsed: Graph = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, g);
    }

    #[test]
    fn term_display() {
        assert_eq!(Term::iri("http://x").to_string(), "<http://x>");
        assert_eq!(Term::literal("v").to_string(), "\"v\"");
    }
}
