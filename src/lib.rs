//! INTO-CPS Traceability: provenance recording for co-simulation projects
//!
//! Records who did what to which engineering artefact as a W3C PROV graph,
//! and keeps that graph in a remote provenance store.
//!
//! # Core Concepts
//!
//! - **Nodes**: agents, activities and entities (artefacts and tools), each
//!   with a URI derived from its content
//! - **Traces**: PROV relationships between nodes (`used`, `wasGeneratedBy`, ...)
//! - **Messages**: one recording's nodes and traces, pushed as compacted JSON-LD
//!
//! # Example
//!
//! ```
//! use intocps_traceability::{vocab, Agent, TrNode};
//!
//! let agent: TrNode = Agent::new("T", "t@example.com").into();
//! assert_eq!(agent.uri(), "mailto:t@example.com");
//! assert_eq!(vocab::expand("prov:used"), "http://www.w3.org/ns/prov#used");
//! ```

pub mod builder;
pub mod client;
pub mod codec;
pub mod config;
pub mod controller;
pub mod environment;
mod error;
pub mod model;
pub mod rdf;
pub mod vocab;

pub use builder::TraceMessageBuilder;
pub use client::{
    partition_simulation, HttpRequest, HttpResponse, Method, MockTransport, ReqwestTransport,
    SimulationDetails, TraceClient, Transport,
};
pub use codec::{decode_quads, encode, parse_objects, DecodeWarning, DecodedGraph};
pub use config::TraceConfig;
pub use controller::{CoSimConfig, CoeInfo, MultiModelConfig, RecordOutcome, TraceabilityController};
pub use environment::{AppIdentity, FixedOracle, GitOracle, IdentityOracle, ProjectContext};
pub use error::{TraceError, TraceResult};
pub use model::{
    Activity, ActivityType, Agent, Artefact, ArtefactType, EntityKind, LoadError, PropertyMap,
    Specifier, Tool, ToolType, Trace, TrNode,
};
pub use rdf::{Quad, RdfError, RdfFormat, Term, Triple};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
