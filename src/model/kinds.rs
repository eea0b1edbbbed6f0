//! Discriminators: PROV specifiers and the INTO-CPS type vocabularies

use crate::vocab::keys::{activity_type, artefact_type, entity_type, prov, tool_type};
use serde::{Deserialize, Serialize};

/// Implements `as_str`, `local_name`, `Display` and `FromStr` for an enum
/// whose variants map one-to-one onto compact vocabulary terms.
macro_rules! vocab_enum {
    ($name:ident, $what:literal, { $($variant:ident => $term:path),+ $(,)? }) => {
        impl $name {
            /// Compact vocabulary term for this value
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $term,)+
                }
            }

            /// Term without its `prefix:`; used when minting URIs
            pub fn local_name(&self) -> &'static str {
                let term = self.as_str();
                term.split_once(':').map(|(_, local)| local).unwrap_or(term)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(x if x == $term => Ok(Self::$variant),)+
                    _ => Err(format!(concat!("unknown ", $what, ": {}"), s)),
                }
            }
        }
    };
}

/// The PROV class of a node (its `rdf:type`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Specifier {
    #[serde(rename = "prov:Agent")]
    Agent,
    #[serde(rename = "prov:Activity")]
    Activity,
    #[serde(rename = "prov:Entity")]
    Entity,
}

vocab_enum!(Specifier, "specifier", {
    Agent => prov::AGENT,
    Activity => prov::ACTIVITY,
    Entity => prov::ENTITY,
});

/// Which kind of `prov:Entity` a node is (`intocps:EntityType`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    #[serde(rename = "intocps:Artefact")]
    Artefact,
    #[serde(rename = "intocps:Tool")]
    Tool,
    #[serde(rename = "intocps:Project")]
    Project,
}

vocab_enum!(EntityKind, "entity type", {
    Artefact => entity_type::ARTEFACT,
    Tool => entity_type::TOOL,
    Project => entity_type::PROJECT,
});

/// Engineering activity recorded in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityType {
    #[serde(rename = "intocps:modelCreation")]
    ModelCreation,
    #[serde(rename = "intocps:simulationConfigurationCreation")]
    SimulationConfigCreation,
    #[serde(rename = "intocps:simulation")]
    Simulation,
}

vocab_enum!(ActivityType, "activity type", {
    ModelCreation => activity_type::MODEL_CREATION,
    SimulationConfigCreation => activity_type::SIMULATION_CONFIG_CREATION,
    Simulation => activity_type::SIMULATION,
});

/// File-based engineering asset kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtefactType {
    #[serde(rename = "intocps:fmu")]
    Fmu,
    #[serde(rename = "intocps:multiModelConfiguration")]
    MultiModelConfig,
    #[serde(rename = "intocps:simulationConfiguration")]
    SimulationConfig,
    #[serde(rename = "intocps:simulationResult")]
    SimulationResult,
}

vocab_enum!(ArtefactType, "artefact type", {
    Fmu => artefact_type::FMU,
    MultiModelConfig => artefact_type::MULTI_MODEL_CONFIG,
    SimulationConfig => artefact_type::SIMULATION_CONFIG,
    SimulationResult => artefact_type::SIMULATION_RESULT,
});

/// Software tool kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolType {
    #[serde(rename = "intocps:softwareTool")]
    Software,
    #[serde(rename = "intocps:coSimulationEngine")]
    CoSimulationEngine,
}

vocab_enum!(ToolType, "tool type", {
    Software => tool_type::SOFTWARE,
    CoSimulationEngine => tool_type::CO_SIMULATION_ENGINE,
});
