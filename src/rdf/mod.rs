//! RDF terms and the text formats the store speaks
//!
//! Terms and quads are `oxrdf`'s. Parsing goes through `oxttl` for the
//! line and Turtle families and `oxjsonld` for JSON-LD; this module only
//! maps content types to parsers and errors into [`RdfError`].

pub mod jsonld;

pub use oxrdf::{BlankNode, GraphName, Literal, NamedNode, Quad, Term, Triple};

use oxjsonld::JsonLdParser;
use oxttl::{NQuadsParser, NTriplesParser, TriGParser, TurtleParser};
use std::fmt::Display;
use thiserror::Error;

/// Errors from reading or writing RDF
#[derive(Debug, Error)]
pub enum RdfError {
    #[error("invalid {format} document: {message}")]
    Syntax { format: &'static str, message: String },

    #[error("invalid IRI <{iri}>: {message}")]
    Iri { iri: String, message: String },
}

pub type RdfResult<T> = Result<T, RdfError>;

/// RDF serializations understood by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    NTriples,
    NQuads,
    Turtle,
    TriG,
    JsonLd,
}

impl RdfFormat {
    /// Map an HTTP content type to a format. Parameters such as `charset`
    /// are ignored; unknown types give `None`.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let media = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match media.as_str() {
            "application/ld+json" | "application/json" => Some(Self::JsonLd),
            "application/n-triples" => Some(Self::NTriples),
            "application/n-quads" => Some(Self::NQuads),
            "text/turtle" | "application/x-turtle" => Some(Self::Turtle),
            "application/trig" => Some(Self::TriG),
            _ => None,
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            Self::NTriples => "application/n-triples",
            Self::NQuads => "application/n-quads",
            Self::Turtle => "text/turtle",
            Self::TriG => "application/trig",
            Self::JsonLd => "application/ld+json",
        }
    }
}

/// A named node, rejecting anything that is not an absolute IRI
pub fn named_node(iri: impl Into<String>) -> RdfResult<NamedNode> {
    let iri = iri.into();
    NamedNode::new(iri.clone()).map_err(|e| RdfError::Iri {
        iri,
        message: e.to_string(),
    })
}

/// IRI text, `_:label`, or the literal's lexical form
pub fn term_text(term: &Term) -> String {
    match term {
        Term::NamedNode(node) => node.as_str().to_string(),
        Term::Literal(literal) => literal.value().to_string(),
        other => other.to_string(),
    }
}

/// N-Triples text, one statement per line
pub fn write_ntriples<'a>(triples: impl IntoIterator<Item = &'a Triple>) -> String {
    triples
        .into_iter()
        .map(|triple| format!("{} .\n", triple))
        .collect()
}

fn collect<T, E: Display>(
    format: RdfFormat,
    items: impl Iterator<Item = Result<T, E>>,
) -> RdfResult<Vec<T>> {
    items
        .map(|item| {
            item.map_err(|e| RdfError::Syntax {
                format: format.media_type(),
                message: e.to_string(),
            })
        })
        .collect()
}

fn in_default_graph<E>(triple: Result<Triple, E>) -> Result<Quad, E> {
    triple.map(|t| t.in_graph(GraphName::DefaultGraph))
}

/// Parse a document in any supported format into quads
pub fn parse_quads(body: &str, format: RdfFormat) -> RdfResult<Vec<Quad>> {
    let bytes = body.as_bytes();
    match format {
        RdfFormat::NTriples => collect(format, NTriplesParser::new().for_slice(bytes).map(in_default_graph)),
        RdfFormat::NQuads => collect(format, NQuadsParser::new().for_slice(bytes)),
        RdfFormat::Turtle => collect(format, TurtleParser::new().for_slice(bytes).map(in_default_graph)),
        RdfFormat::TriG => collect(format, TriGParser::new().for_slice(bytes)),
        RdfFormat::JsonLd => collect(format, JsonLdParser::new().for_slice(bytes)),
    }
}
