//! Context table: the fixed mapping between short terms, `prefix:` names
//! and full IRIs.
//!
//! Both directions are total. A string that matches nothing in the table
//! passes through unchanged, so unknown vocabulary coming back from the
//! store survives a decode instead of failing it.

pub mod keys;

use serde_json::{Map, Value};

/// Short term → IRI
pub const TERMS: &[(&str, &str)] = &[
    ("name", "https://schema.org/name"),
    ("email", "https://schema.org/email"),
    ("hash", "https://schema.org/sha256"),
    ("time", "https://schema.org/DateTime"),
    ("type", "http://www.w3.org/1999/02/22-rdf-syntax-ns#type"),
    ("path", "http://into-cps.org/ns#Path"),
    ("version", "http://into-cps.org/ns#Version"),
];

/// Prefix → IRI base
pub const PREFIXES: &[(&str, &str)] = &[
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("prov", "http://www.w3.org/ns/prov#"),
    ("intocps", "http://into-cps.org/ns#"),
];

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// Expand a term or `prefix:suffix` string to a full IRI.
///
/// Exact term matches win over prefix substitution. Anything else is
/// assumed to already be absolute and is returned as-is.
pub fn expand(value: &str) -> String {
    if let Some((_, iri)) = TERMS.iter().find(|(term, _)| *term == value) {
        return (*iri).to_string();
    }

    if let Some((prefix, suffix)) = value.split_once(':') {
        if let Some((_, base)) = PREFIXES.iter().find(|(p, _)| *p == prefix) {
            return format!("{}{}", base, suffix);
        }
    }

    value.to_string()
}

/// Compact a full IRI to its term or `prefix:suffix` form.
pub fn compact(iri: &str) -> String {
    if let Some((term, _)) = TERMS.iter().find(|(_, full)| *full == iri) {
        return (*term).to_string();
    }
    compact_id(iri)
}

/// Prefix-only compaction. Used where terms must not apply, such as
/// `@id` values in a compacted JSON-LD document.
pub fn compact_id(iri: &str) -> String {
    let best = PREFIXES
        .iter()
        .filter(|(_, base)| iri.starts_with(base))
        .max_by_key(|(_, base)| base.len());

    match best {
        Some((prefix, base)) => format!("{}:{}", prefix, &iri[base.len()..]),
        None => iri.to_string(),
    }
}

/// The `@context` object sent with every compacted document.
pub fn jsonld_context() -> Value {
    let mut ctx = Map::new();
    for (prefix, base) in PREFIXES {
        ctx.insert((*prefix).to_string(), Value::String((*base).to_string()));
    }
    for (term, iri) in TERMS {
        ctx.insert((*term).to_string(), Value::String((*iri).to_string()));
    }
    Value::Object(ctx)
}
