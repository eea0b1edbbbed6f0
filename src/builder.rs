//! Graph builder: accumulates one recording's triples and turns them into
//! the compacted document pushed to the store.

use crate::codec;
use crate::environment::{IdentityOracle, ProjectContext};
use crate::error::TraceResult;
use crate::model::{format_time, EntityKind, Specifier, Trace, TrNode};
use crate::rdf::{self, named_node, Literal, Term, Triple};
use crate::vocab::{self, keys};
use chrono::Utc;
use serde_json::Value;
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Builds the triple set for one traceability message.
///
/// Adding the same node or trace twice has no further effect.
pub struct TraceMessageBuilder {
    project: ProjectContext,
    triples: Vec<Triple>,
    seen: HashSet<Triple>,
    oracle: Option<Arc<dyn IdentityOracle>>,
    snapshot_dir: Option<PathBuf>,
}

impl TraceMessageBuilder {
    pub fn new(project: ProjectContext) -> Self {
        Self {
            project,
            triples: Vec::new(),
            seen: HashSet::new(),
            oracle: None,
            snapshot_dir: None,
        }
    }

    /// Associate every added activity with the oracle's current user
    pub fn auto_associate(mut self, oracle: Arc<dyn IdentityOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Write a copy of the finished document into `dir`
    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = Some(dir.into());
        self
    }

    pub fn project(&self) -> &ProjectContext {
        &self.project
    }

    fn push(&mut self, subject: &str, predicate: &str, object: impl Into<Term>) -> TraceResult<()> {
        let triple = Triple::new(
            named_node(vocab::expand(subject))?,
            named_node(vocab::expand(predicate))?,
            object,
        );
        if self.seen.insert(triple.clone()) {
            self.triples.push(triple);
        }
        Ok(())
    }

    fn push_iri(&mut self, subject: &str, predicate: &str, object: &str) -> TraceResult<()> {
        let object = named_node(vocab::expand(object))?;
        self.push(subject, predicate, object)
    }

    /// The project entity every activity points at through `inProject`
    pub fn add_project_node(&mut self) -> TraceResult<()> {
        let uri = self.project.uri();
        let name = self.project.name.clone();
        self.push_iri(&uri, keys::term::TYPE, Specifier::Entity.as_str())?;
        self.push_iri(&uri, keys::intocps::ENTITY_TYPE, EntityKind::Project.as_str())?;
        self.push(&uri, keys::term::NAME, Literal::new_simple_literal(name))
    }

    /// Emit a node's parameters. Reference-valued keys become IRIs, the rest
    /// plain literals.
    pub fn add_node(&mut self, node: &TrNode) -> TraceResult<()> {
        let uri = node.uri().to_string();
        for (key, value) in node.parameters() {
            if keys::is_reference_key(&key) {
                self.push_iri(&uri, &key, &value)?;
            } else {
                self.push(&uri, &key, Literal::new_simple_literal(value))?;
            }
        }

        if let TrNode::Activity(_) = node {
            let project = self.project.uri();
            self.push_iri(&uri, keys::intocps::IN_PROJECT, &project)?;

            if let Some(oracle) = self.oracle.clone() {
                let agent: TrNode = oracle.user_as_agent()?.into();
                self.add_node(&agent)?;
                self.push_iri(&uri, keys::prov::WAS_ASSOCIATED_WITH, agent.uri())?;
            }
        }
        Ok(())
    }

    pub fn add_trace(&mut self, trace: &Trace) -> TraceResult<()> {
        self.push_iri(&trace.subject, &trace.predicate, &trace.object)
    }

    /// Triples in insertion order
    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn to_ntriples(&self) -> String {
        rdf::write_ntriples(&self.triples)
    }

    /// Encode the accumulated triples. A configured snapshot is written on
    /// success; failing to write it only logs.
    pub fn finish(&self) -> TraceResult<Value> {
        let doc = codec::encode(&self.triples)?;
        debug!(triples = self.triples.len(), "trace message encoded");

        if let Some(dir) = &self.snapshot_dir {
            match write_snapshot(dir, &snapshot_stamp(), &doc) {
                Ok(path) => debug!(path = %path.display(), "snapshot written"),
                Err(e) => warn!(dir = %dir.display(), error = %e, "failed to write snapshot"),
            }
        }
        Ok(doc)
    }
}

/// `2024-03-01T12:30:00.123Z` → `20240301T123000123`
fn snapshot_stamp() -> String {
    format_time(&Utc::now())
        .chars()
        .filter(|c| !matches!(c, '-' | ':' | '.' | 'Z'))
        .collect()
}

/// Write `doc` as `<stamp>.jsonld`, or `<stamp>-<n>.jsonld` when an earlier
/// message already took the name. Existing files are never replaced.
fn write_snapshot(dir: &Path, stamp: &str, doc: &Value) -> TraceResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let body = serde_json::to_string_pretty(doc)?;
    let mut suffix = 0u32;
    loop {
        let name = match suffix {
            0 => format!("{}.jsonld", stamp),
            n => format!("{}-{}.jsonld", stamp, n),
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(body.as_bytes())?;
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => suffix += 1,
            Err(e) => return Err(e.into()),
        }
    }
}
