//! JSON-LD documents for outbound messages
//!
//! `from_rdf` groups quads into expanded node objects and `compact` rewrites
//! them against the fixed context table. Reading JSON-LD back is
//! `oxjsonld`'s job, see [`super::parse_quads`].

use super::{term_text, Quad, Term};
use crate::vocab::RDF_TYPE;
use oxrdf::vocab::xsd;
use serde_json::{Map, Value};
use std::collections::HashMap;

fn object_value(term: &Term) -> Value {
    let mut obj = Map::new();
    match term {
        Term::Literal(literal) => {
            obj.insert("@value".into(), Value::String(literal.value().to_string()));
            if let Some(language) = literal.language() {
                obj.insert("@language".into(), Value::String(language.to_string()));
            } else if literal.datatype() != xsd::STRING {
                obj.insert("@type".into(), Value::String(literal.datatype().as_str().to_string()));
            }
        }
        other => {
            obj.insert("@id".into(), Value::String(term_text(other)));
        }
    }
    Value::Object(obj)
}

/// Expanded JSON-LD node objects, one per subject in first-seen order.
///
/// `rdf:type` with an IRI object becomes `@type`. Graph names are not kept;
/// every quad lands in one flat node list.
pub fn from_rdf(quads: &[Quad]) -> Vec<Value> {
    let mut order: Vec<String> = Vec::new();
    let mut nodes: HashMap<String, Map<String, Value>> = HashMap::new();

    for quad in quads {
        let id = term_text(&Term::from(quad.subject.clone()));
        let node = nodes.entry(id.clone()).or_insert_with(|| {
            order.push(id.clone());
            let mut node = Map::new();
            node.insert("@id".into(), Value::String(id.clone()));
            node
        });

        let (key, value) = match &quad.object {
            Term::NamedNode(class) if quad.predicate.as_str() == RDF_TYPE => {
                ("@type".to_string(), Value::String(class.as_str().to_string()))
            }
            object => (quad.predicate.as_str().to_string(), object_value(object)),
        };
        if let Value::Array(list) = node.entry(key).or_insert_with(|| Value::Array(Vec::new())) {
            if !list.contains(&value) {
                list.push(value);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|id| nodes.remove(&id))
        .map(Value::Object)
        .collect()
}

/// Term and prefix tables read back out of a flat `@context` object
struct Compactor {
    terms: Vec<(String, String)>,
    prefixes: Vec<(String, String)>,
}

impl Compactor {
    fn from_context(ctx: &Value) -> Self {
        let mut terms = Vec::new();
        let mut prefixes = Vec::new();
        if let Some(map) = ctx.as_object() {
            for (key, value) in map {
                let Some(iri) = value.as_str() else { continue };
                if iri.ends_with('#') || iri.ends_with('/') {
                    prefixes.push((key.clone(), iri.to_string()));
                } else {
                    terms.push((key.clone(), iri.to_string()));
                }
            }
        }
        Self { terms, prefixes }
    }

    fn id(&self, iri: &str) -> String {
        let best = self
            .prefixes
            .iter()
            .filter(|(_, base)| iri.starts_with(base.as_str()) && iri.len() > base.len())
            .max_by_key(|(_, base)| base.len());
        match best {
            Some((prefix, base)) => format!("{}:{}", prefix, &iri[base.len()..]),
            None => iri.to_string(),
        }
    }

    fn vocab(&self, iri: &str) -> String {
        match self.terms.iter().find(|(_, full)| full == iri) {
            Some((term, _)) => term.clone(),
            None => self.id(iri),
        }
    }

    fn value(&self, value: &Value) -> Value {
        let Some(obj) = value.as_object() else {
            return value.clone();
        };
        if let Some(id) = obj.get("@id").and_then(Value::as_str) {
            let mut out = Map::new();
            out.insert("@id".into(), Value::String(self.id(id)));
            return Value::Object(out);
        }
        match (obj.get("@value"), obj.get("@type"), obj.get("@language")) {
            (Some(v), None, None) => v.clone(),
            (Some(v), Some(Value::String(datatype)), _) => {
                let mut out = Map::new();
                out.insert("@value".into(), v.clone());
                out.insert("@type".into(), Value::String(self.vocab(datatype)));
                Value::Object(out)
            }
            _ => value.clone(),
        }
    }

    fn node(&self, node: &Value) -> Value {
        let Some(obj) = node.as_object() else {
            return node.clone();
        };
        let mut out = Map::new();
        for (key, value) in obj {
            let (key, value) = match key.as_str() {
                "@id" => (
                    key.clone(),
                    value
                        .as_str()
                        .map(|id| Value::String(self.id(id)))
                        .unwrap_or_else(|| value.clone()),
                ),
                "@type" => (
                    key.clone(),
                    map_values(value, |v| match v.as_str() {
                        Some(iri) => Value::String(self.vocab(iri)),
                        None => v.clone(),
                    }),
                ),
                _ => (self.vocab(key), map_values(value, |v| self.value(v))),
            };
            out.insert(key, unwrap_single(value));
        }
        Value::Object(out)
    }
}

fn map_values(value: &Value, f: impl Fn(&Value) -> Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(f).collect()),
        other => f(other),
    }
}

fn unwrap_single(value: Value) -> Value {
    match value {
        Value::Array(mut items) if items.len() == 1 => items.remove(0),
        other => other,
    }
}

/// Compact expanded node objects against `ctx`.
///
/// Property keys and `@type` values become terms or `prefix:` names, `@id`
/// values become `prefix:` names only, plain string values collapse to bare
/// strings and single-element arrays are unwrapped. One node is returned
/// inline; several go under `@graph`.
pub fn compact(expanded: &[Value], ctx: &Value) -> Value {
    let compactor = Compactor::from_context(ctx);
    let mut nodes: Vec<Value> = expanded.iter().map(|n| compactor.node(n)).collect();

    let mut doc = Map::new();
    doc.insert("@context".into(), ctx.clone());
    match nodes.len() {
        0 => {}
        1 => {
            if let Some(Value::Object(node)) = nodes.pop() {
                doc.extend(node);
            }
        }
        _ => {
            doc.insert("@graph".into(), Value::Array(nodes));
        }
    }
    Value::Object(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::{parse_quads, GraphName, Literal, NamedNode, RdfFormat, Triple};
    use crate::vocab::jsonld_context;
    use serde_json::json;

    const PROV: &str = "http://www.w3.org/ns/prov#";
    const NS: &str = "http://into-cps.org/ns#";

    fn quad(s: &str, p: &str, o: impl Into<Term>) -> Quad {
        Triple::new(NamedNode::new_unchecked(s), NamedNode::new_unchecked(p), o).in_graph(GraphName::DefaultGraph)
    }

    fn iri(s: &str) -> NamedNode {
        NamedNode::new_unchecked(s)
    }

    fn agent_quads() -> Vec<Quad> {
        vec![
            quad("mailto:t@example.com", RDF_TYPE, iri(&format!("{}Agent", PROV))),
            quad("mailto:t@example.com", "https://schema.org/name", Literal::new_simple_literal("T")),
        ]
    }

    #[test]
    fn from_rdf_groups_by_subject() {
        let mut quads = agent_quads();
        quads.push(quad(&format!("{}sim.1", NS), &format!("{}used", PROV), iri(&format!("{}fmu.1", NS))));
        let nodes = from_rdf(&quads);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0]["@id"], "mailto:t@example.com");
        assert_eq!(nodes[0]["@type"], json!([format!("{}Agent", PROV)]));
        assert_eq!(nodes[0]["https://schema.org/name"], json!([{"@value": "T"}]));
        assert_eq!(nodes[1][format!("{}used", PROV)], json!([{"@id": format!("{}fmu.1", NS)}]));
    }

    #[test]
    fn from_rdf_drops_duplicate_objects() {
        let mut quads = agent_quads();
        quads.extend(agent_quads());
        let nodes = from_rdf(&quads);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0]["@type"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn from_rdf_keeps_datatypes_and_languages() {
        let s = "http://into-cps.org/ns#x";
        let quads = vec![
            quad(s, "http://p/a", Literal::new_typed_literal("3", iri("http://www.w3.org/2001/XMLSchema#integer"))),
            quad(s, "http://p/b", Literal::new_language_tagged_literal_unchecked("hallo", "de")),
        ];
        let node = &from_rdf(&quads)[0];
        assert_eq!(node["http://p/a"][0]["@type"], "http://www.w3.org/2001/XMLSchema#integer");
        assert_eq!(node["http://p/b"][0]["@language"], "de");
    }

    #[test]
    fn compact_single_node_is_inlined() {
        let doc = compact(&from_rdf(&agent_quads()), &jsonld_context());
        assert_eq!(doc["@id"], "mailto:t@example.com");
        assert_eq!(doc["@type"], "prov:Agent");
        assert_eq!(doc["name"], "T");
        assert!(doc.get("@graph").is_none());
    }

    #[test]
    fn compact_many_nodes_uses_graph() {
        let mut quads = agent_quads();
        quads.push(quad(&format!("{}fmu.1", NS), &format!("{}Path", NS), Literal::new_simple_literal("FMUs/a.fmu")));
        let doc = compact(&from_rdf(&quads), &jsonld_context());
        let graph = doc["@graph"].as_array().unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph[1]["@id"], "intocps:fmu.1");
        assert_eq!(graph[1]["path"], "FMUs/a.fmu");
    }

    #[test]
    fn compacted_document_reads_back_to_same_quads() {
        let mut quads = agent_quads();
        quads.push(quad(
            &format!("{}sim.1", NS),
            &format!("{}wasAssociatedWith", PROV),
            iri("mailto:t@example.com"),
        ));
        let doc = compact(&from_rdf(&quads), &jsonld_context());
        let mut back = parse_quads(&doc.to_string(), RdfFormat::JsonLd).unwrap();
        let key = |q: &Quad| q.to_string();
        back.sort_by_key(key);
        quads.sort_by_key(key);
        assert_eq!(back, quads);
    }
}
