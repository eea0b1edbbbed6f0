//! Wire codec: typed nodes and traces to and from the store's formats
//!
//! Outbound: quads are written as N-Triples, read back, converted to
//! JSON-LD and compacted against the context table. Inbound: whatever
//! RDF serialization the store answers with is parsed, IRIs are compacted,
//! trace predicates become [`Trace`] edges and the remaining properties are
//! grouped by subject and loaded as [`TrNode`]s.

use crate::error::TraceResult;
use crate::model::{Activity, Agent, Artefact, LoadError, PropertyMap, Specifier, Tool, Trace, TrNode};
use crate::rdf::{self, jsonld, term_text, Quad, RdfFormat, Term, Triple};
use crate::vocab::{self, keys};
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Encode a batch of triples as a compacted JSON-LD document.
///
/// The batch is validated by writing and re-parsing it as N-Triples, so a
/// single bad triple rejects the whole batch.
pub fn encode(triples: &[Triple]) -> TraceResult<Value> {
    let text = rdf::write_ntriples(triples);
    let parsed = rdf::parse_quads(&text, RdfFormat::NTriples)?;
    let expanded = jsonld::from_rdf(&parsed);
    Ok(jsonld::compact(&expanded, &vocab::jsonld_context()))
}

/// A subject group that could not be loaded as a typed node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodeWarning {
    pub subject: String,
    #[serde(serialize_with = "serialize_reason")]
    pub reason: LoadError,
}

fn serialize_reason<S: serde::Serializer>(reason: &LoadError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(reason)
}

/// Typed result of decoding a response body
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DecodedGraph {
    pub nodes: Vec<TrNode>,
    pub traces: Vec<Trace>,
    pub warnings: Vec<DecodeWarning>,
}

impl DecodedGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.traces.is_empty()
    }

    pub fn node(&self, uri: &str) -> Option<&TrNode> {
        self.nodes.iter().find(|n| n.uri() == uri)
    }

    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.nodes.iter().filter_map(TrNode::as_agent)
    }

    pub fn activities(&self) -> impl Iterator<Item = &Activity> {
        self.nodes.iter().filter_map(TrNode::as_activity)
    }

    pub fn artefacts(&self) -> impl Iterator<Item = &Artefact> {
        self.nodes.iter().filter_map(TrNode::as_artefact)
    }

    pub fn tools(&self) -> impl Iterator<Item = &Tool> {
        self.nodes.iter().filter_map(TrNode::as_tool)
    }

    /// Fold another decode result in. Nodes are unique by URI, traces by
    /// content.
    pub fn merge(&mut self, other: DecodedGraph) {
        for node in other.nodes {
            if self.node(node.uri()).is_none() {
                self.nodes.push(node);
            }
        }
        for trace in other.traces {
            if !self.traces.contains(&trace) {
                self.traces.push(trace);
            }
        }
        self.warnings.extend(other.warnings);
    }
}

/// Decode a response body by content type.
///
/// Unsupported content types decode to an empty graph; a malformed body in
/// a supported format is an error.
pub fn parse_objects(body: &str, content_type: &str) -> TraceResult<DecodedGraph> {
    let Some(format) = RdfFormat::from_content_type(content_type) else {
        debug!(content_type, "unsupported content type, nothing decoded");
        return Ok(DecodedGraph::default());
    };
    let quads = rdf::parse_quads(body, format)?;
    Ok(decode_quads(&quads))
}

fn compact_term(term: &Term) -> String {
    match term {
        Term::Literal(lit) => lit.value().to_string(),
        other => vocab::compact_id(&term_text(other)),
    }
}

/// Single-valued property insert. Where a subject carries several
/// `rdf:type`s, a known specifier wins over anything else.
fn insert_property(props: &mut PropertyMap, key: String, value: String) {
    match props.get(&key) {
        None => {
            props.insert(key, value);
        }
        Some(existing) if key == keys::term::TYPE => {
            let known = |v: &str| v.parse::<Specifier>().is_ok();
            if !known(existing) && known(&value) {
                props.insert(key, value);
            }
        }
        Some(_) => {}
    }
}

/// Split quads into typed nodes and traces. Graph names are ignored.
pub fn decode_quads(quads: &[Quad]) -> DecodedGraph {
    let mut graph = DecodedGraph::default();
    let mut seen_traces = HashSet::new();
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, PropertyMap> = HashMap::new();

    for quad in quads {
        let subject = compact_term(&Term::from(quad.subject.clone()));
        let predicate = vocab::compact(quad.predicate.as_str());

        if keys::is_trace_predicate(&predicate) {
            let trace = Trace::new(subject, predicate, compact_term(&quad.object));
            if seen_traces.insert(trace.clone()) {
                graph.traces.push(trace);
            }
            continue;
        }

        let value = match &quad.object {
            Term::Literal(lit) => lit.value().to_string(),
            Term::NamedNode(iri) => vocab::compact(iri.as_str()),
            other => term_text(other),
        };
        let props = groups.entry(subject.clone()).or_insert_with(|| {
            order.push(subject.clone());
            PropertyMap::new()
        });
        insert_property(props, predicate, value);
    }

    for subject in order {
        let Some(props) = groups.remove(&subject) else { continue };
        match TrNode::load(&subject, &props) {
            Ok(node) => graph.nodes.push(node),
            Err(reason) => {
                warn!(subject = %subject, %reason, "dropping undecodable subject");
                graph.warnings.push(DecodeWarning { subject, reason });
            }
        }
    }

    graph
}
