//! Domain model: typed PROV nodes and the traces between them

mod kinds;
mod node;
mod trace;


pub use kinds::{ActivityType, ArtefactType, EntityKind, Specifier, ToolType};
pub use node::{format_time, Activity, Agent, Artefact, LoadError, PropertyMap, Tool, TrNode};
pub use trace::Trace;
