//! Compact-form keys for every predicate, class and type term the
//! traceability graph uses.
//!
//! All of these resolve through the context table in [`super`].

/// Short terms defined directly in the context table
pub mod term {
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const HASH: &str = "hash";
    pub const TIME: &str = "time";
    pub const TYPE: &str = "type";
    pub const PATH: &str = "path";
    pub const VERSION: &str = "version";
}

/// INTO-CPS predicates
pub mod intocps {
    pub const IN_PROJECT: &str = "intocps:inProject";
    pub const ENTITY_TYPE: &str = "intocps:EntityType";
    pub const ACTIVITY_TYPE: &str = "intocps:ActivityType";
    pub const ARTEFACT_TYPE: &str = "intocps:ArtefactType";
    pub const TOOL_TYPE: &str = "intocps:ToolType";
}

/// PROV relations and classes
pub mod prov {
    pub const USED: &str = "prov:used";
    pub const WAS_GENERATED_BY: &str = "prov:wasGeneratedBy";
    pub const WAS_ASSOCIATED_WITH: &str = "prov:wasAssociatedWith";
    pub const WAS_ATTRIBUTED_TO: &str = "prov:wasAttributedTo";
    pub const WAS_DERIVED_FROM: &str = "prov:wasDerivedFrom";
    pub const WAS_INFORMED_BY: &str = "prov:wasInformedBy";
    pub const ACTED_ON_BEHALF_OF: &str = "prov:actedOnBehalfOf";
    pub const STARTED_AT_TIME: &str = "prov:startedAtTime";
    pub const ENDED_AT_TIME: &str = "prov:endedAtTime";

    pub const ENTITY: &str = "prov:Entity";
    pub const ACTIVITY: &str = "prov:Activity";
    pub const AGENT: &str = "prov:Agent";
}

/// Values of `intocps:EntityType`
pub mod entity_type {
    pub const ARTEFACT: &str = "intocps:Artefact";
    pub const TOOL: &str = "intocps:Tool";
    pub const PROJECT: &str = "intocps:Project";
}

/// Values of `intocps:ActivityType`
pub mod activity_type {
    pub const MODEL_CREATION: &str = "intocps:modelCreation";
    pub const SIMULATION_CONFIG_CREATION: &str = "intocps:simulationConfigurationCreation";
    pub const SIMULATION: &str = "intocps:simulation";
}

/// Values of `intocps:ArtefactType`
pub mod artefact_type {
    pub const FMU: &str = "intocps:fmu";
    pub const MULTI_MODEL_CONFIG: &str = "intocps:multiModelConfiguration";
    pub const SIMULATION_CONFIG: &str = "intocps:simulationConfiguration";
    pub const SIMULATION_RESULT: &str = "intocps:simulationResult";
}

/// Values of `intocps:ToolType`
pub mod tool_type {
    pub const SOFTWARE: &str = "intocps:softwareTool";
    pub const CO_SIMULATION_ENGINE: &str = "intocps:coSimulationEngine";
}

/// Predicates that decode into [`crate::Trace`] edges rather than node
/// properties.
pub const TRACE_PREDICATES: &[&str] = &[
    prov::USED,
    prov::WAS_GENERATED_BY,
    prov::WAS_DERIVED_FROM,
    prov::WAS_ATTRIBUTED_TO,
    prov::WAS_ASSOCIATED_WITH,
    prov::WAS_INFORMED_BY,
    prov::ACTED_ON_BEHALF_OF,
    prov::STARTED_AT_TIME,
    prov::ENDED_AT_TIME,
];

/// Property keys whose values are IRIs. Every other node property is
/// written as a plain literal.
pub const REFERENCE_KEYS: &[&str] = &[
    term::TYPE,
    intocps::ENTITY_TYPE,
    intocps::ACTIVITY_TYPE,
    intocps::ARTEFACT_TYPE,
    intocps::TOOL_TYPE,
    intocps::IN_PROJECT,
];

pub fn is_trace_predicate(predicate: &str) -> bool {
    TRACE_PREDICATES.contains(&predicate)
}

pub fn is_reference_key(key: &str) -> bool {
    REFERENCE_KEYS.contains(&key)
}
