//! Typed provenance nodes
//!
//! Every node URI is a pure function of the node's semantic fields, so
//! re-deriving a node from unchanged inputs reproduces the same URI and
//! the store sees an idempotent re-submission.

use super::kinds::{ActivityType, ArtefactType, EntityKind, Specifier, ToolType};
use crate::environment::{AppIdentity, IdentityOracle, ProjectContext};
use crate::error::TraceResult;
use crate::vocab::keys::{intocps, term};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Flat predicate-term → value map describing a node's own attributes
pub type PropertyMap = BTreeMap<String, String>;

/// Why a property group could not be turned into a typed node
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("subject has no rdf:type")]
    Untyped,

    #[error("unknown specifier: {0}")]
    UnknownSpecifier(String),

    #[error("entity has no intocps:EntityType")]
    MissingEntityType,

    #[error("unsupported entity type: {0}")]
    UnsupportedEntityType(String),

    #[error("missing property: {0}")]
    MissingProperty(&'static str),

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// Namespace all content-addressed ids are minted under
fn id_namespace() -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, b"http://into-cps.org/ns#")
}

/// Name-based UUID over the given parts
fn stable_id(parts: &[&str]) -> Uuid {
    Uuid::new_v5(&id_namespace(), parts.join("\u{1f}").as_bytes())
}

fn mint_uri(local_name: &str, parts: &[&str]) -> String {
    format!("intocps:{}.{}", local_name, stable_id(parts))
}

/// Wire form of an activity time, millisecond precision
pub fn format_time(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn required<'a>(props: &'a PropertyMap, key: &'static str) -> Result<&'a str, LoadError> {
    props
        .get(key)
        .map(String::as_str)
        .ok_or(LoadError::MissingProperty(key))
}

fn parsed<T: FromStr<Err = String>>(props: &PropertyMap, key: &'static str) -> Result<T, LoadError> {
    required(props, key)?
        .parse()
        .map_err(|message| LoadError::InvalidValue { key, message })
}

fn entry(key: &str, value: impl Into<String>) -> (String, String) {
    (key.to_string(), value.into())
}

/// A person or system acting in the workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub uri: String,
    pub name: String,
    pub email: String,
}

impl Agent {
    /// The URI is `mailto:<email>`; an email identifies exactly one agent.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        let email = email.into();
        Self {
            uri: format!("mailto:{}", email),
            name: name.into(),
            email,
        }
    }

    pub fn parameters(&self) -> PropertyMap {
        PropertyMap::from([
            entry(term::TYPE, Specifier::Agent.as_str()),
            entry(term::NAME, &self.name),
            entry(term::EMAIL, &self.email),
        ])
    }

    pub fn load(uri: &str, props: &PropertyMap) -> Result<Self, LoadError> {
        let name = required(props, term::NAME)?;
        let email = match props.get(term::EMAIL) {
            Some(email) => email.as_str(),
            None => uri
                .strip_prefix("mailto:")
                .ok_or(LoadError::MissingProperty(term::EMAIL))?,
        };
        Ok(Self {
            uri: uri.to_string(),
            name: name.to_string(),
            email: email.to_string(),
        })
    }
}

/// A recorded engineering activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub uri: String,
    pub activity_type: ActivityType,
    pub time: DateTime<Utc>,
}

impl Activity {
    /// Time is truncated to milliseconds, the precision of the wire form.
    pub fn new(activity_type: ActivityType, time: DateTime<Utc>) -> Self {
        let time = time.trunc_subsecs(3);
        let uri = mint_uri(
            activity_type.local_name(),
            &[activity_type.as_str(), &format_time(&time)],
        );
        Self {
            uri,
            activity_type,
            time,
        }
    }

    pub fn model_creation(time: DateTime<Utc>) -> Self {
        Self::new(ActivityType::ModelCreation, time)
    }

    pub fn simulation_config_creation(time: DateTime<Utc>) -> Self {
        Self::new(ActivityType::SimulationConfigCreation, time)
    }

    pub fn simulation(time: DateTime<Utc>) -> Self {
        Self::new(ActivityType::Simulation, time)
    }

    pub fn parameters(&self) -> PropertyMap {
        PropertyMap::from([
            entry(term::TYPE, Specifier::Activity.as_str()),
            entry(intocps::ACTIVITY_TYPE, self.activity_type.as_str()),
            entry(term::TIME, format_time(&self.time)),
        ])
    }

    pub fn load(uri: &str, props: &PropertyMap) -> Result<Self, LoadError> {
        let activity_type = parsed(props, intocps::ACTIVITY_TYPE)?;
        let time = DateTime::parse_from_rfc3339(required(props, term::TIME)?)
            .map_err(|e| LoadError::InvalidValue {
                key: term::TIME,
                message: e.to_string(),
            })?
            .with_timezone(&Utc);
        Ok(Self {
            uri: uri.to_string(),
            activity_type,
            time,
        })
    }
}

/// A file-based asset, tracked by project-relative path and content hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artefact {
    pub uri: String,
    pub artefact_type: ArtefactType,
    pub path: String,
    pub hash: String,
}

impl Artefact {
    /// Identity is type + hash: equal content collides on purpose, the path
    /// does not take part.
    pub fn new(artefact_type: ArtefactType, path: impl Into<String>, hash: impl Into<String>) -> Self {
        let hash = hash.into();
        let uri = mint_uri(artefact_type.local_name(), &[artefact_type.as_str(), &hash]);
        Self {
            uri,
            artefact_type,
            path: path.into(),
            hash,
        }
    }

    /// Artefact for the file at `path`, hashed by the oracle
    pub fn tracked(
        artefact_type: ArtefactType,
        project: &ProjectContext,
        path: &Path,
        oracle: &dyn IdentityOracle,
    ) -> TraceResult<Self> {
        let hash = oracle.file_hash(path)?;
        Ok(Self::new(artefact_type, project.relative_path(path), hash))
    }

    pub fn fmu(project: &ProjectContext, path: &Path, oracle: &dyn IdentityOracle) -> TraceResult<Self> {
        Self::tracked(ArtefactType::Fmu, project, path, oracle)
    }

    pub fn mm_config(project: &ProjectContext, path: &Path, oracle: &dyn IdentityOracle) -> TraceResult<Self> {
        Self::tracked(ArtefactType::MultiModelConfig, project, path, oracle)
    }

    pub fn sim_config(project: &ProjectContext, path: &Path, oracle: &dyn IdentityOracle) -> TraceResult<Self> {
        Self::tracked(ArtefactType::SimulationConfig, project, path, oracle)
    }

    pub fn sim_result(project: &ProjectContext, path: &Path, oracle: &dyn IdentityOracle) -> TraceResult<Self> {
        Self::tracked(ArtefactType::SimulationResult, project, path, oracle)
    }

    pub fn parameters(&self) -> PropertyMap {
        PropertyMap::from([
            entry(term::TYPE, Specifier::Entity.as_str()),
            entry(intocps::ENTITY_TYPE, EntityKind::Artefact.as_str()),
            entry(intocps::ARTEFACT_TYPE, self.artefact_type.as_str()),
            entry(term::PATH, &self.path),
            entry(term::HASH, &self.hash),
        ])
    }

    pub fn load(uri: &str, props: &PropertyMap) -> Result<Self, LoadError> {
        Ok(Self {
            uri: uri.to_string(),
            artefact_type: parsed(props, intocps::ARTEFACT_TYPE)?,
            path: required(props, term::PATH)?.to_string(),
            hash: required(props, term::HASH)?.to_string(),
        })
    }
}

/// A software tool taking part in an activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    pub uri: String,
    pub tool_type: ToolType,
    pub name: String,
    pub version: String,
}

impl Tool {
    pub fn new(tool_type: ToolType, name: impl Into<String>, version: impl Into<String>) -> Self {
        let name = name.into();
        let version = version.into();
        let uri = mint_uri(tool_type.local_name(), &[tool_type.as_str(), &name, &version]);
        Self {
            uri,
            tool_type,
            name,
            version,
        }
    }

    /// The hosting application itself
    pub fn application(app: &AppIdentity) -> Self {
        Self::new(ToolType::Software, &app.name, &app.version)
    }

    /// A co-simulation engine
    pub fn coe(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(ToolType::CoSimulationEngine, name, version)
    }

    pub fn parameters(&self) -> PropertyMap {
        PropertyMap::from([
            entry(term::TYPE, Specifier::Entity.as_str()),
            entry(intocps::ENTITY_TYPE, EntityKind::Tool.as_str()),
            entry(intocps::TOOL_TYPE, self.tool_type.as_str()),
            entry(term::NAME, &self.name),
            entry(term::VERSION, &self.version),
        ])
    }

    pub fn load(uri: &str, props: &PropertyMap) -> Result<Self, LoadError> {
        Ok(Self {
            uri: uri.to_string(),
            tool_type: parsed(props, intocps::TOOL_TYPE)?,
            name: required(props, term::NAME)?.to_string(),
            version: required(props, term::VERSION)?.to_string(),
        })
    }
}

/// Any typed node in the provenance graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TrNode {
    Agent(Agent),
    Activity(Activity),
    Artefact(Artefact),
    Tool(Tool),
}

impl TrNode {
    pub fn uri(&self) -> &str {
        match self {
            Self::Agent(n) => &n.uri,
            Self::Activity(n) => &n.uri,
            Self::Artefact(n) => &n.uri,
            Self::Tool(n) => &n.uri,
        }
    }

    pub fn specifier(&self) -> Specifier {
        match self {
            Self::Agent(_) => Specifier::Agent,
            Self::Activity(_) => Specifier::Activity,
            Self::Artefact(_) | Self::Tool(_) => Specifier::Entity,
        }
    }

    /// The node's own attributes, discriminators included. Excludes the URI
    /// and any traces.
    pub fn parameters(&self) -> PropertyMap {
        match self {
            Self::Agent(n) => n.parameters(),
            Self::Activity(n) => n.parameters(),
            Self::Artefact(n) => n.parameters(),
            Self::Tool(n) => n.parameters(),
        }
    }

    /// Rebuild a typed node from a property group, dispatching on `type`
    /// and, for entities, `intocps:EntityType`. Extra properties are ignored.
    pub fn load(uri: &str, props: &PropertyMap) -> Result<Self, LoadError> {
        let specifier = props.get(term::TYPE).ok_or(LoadError::Untyped)?;
        let specifier: Specifier = specifier
            .parse()
            .map_err(|_| LoadError::UnknownSpecifier(specifier.clone()))?;

        match specifier {
            Specifier::Agent => Agent::load(uri, props).map(Self::Agent),
            Specifier::Activity => Activity::load(uri, props).map(Self::Activity),
            Specifier::Entity => {
                let kind = props
                    .get(intocps::ENTITY_TYPE)
                    .ok_or(LoadError::MissingEntityType)?;
                match kind.parse::<EntityKind>() {
                    Ok(EntityKind::Artefact) => Artefact::load(uri, props).map(Self::Artefact),
                    Ok(EntityKind::Tool) => Tool::load(uri, props).map(Self::Tool),
                    Ok(EntityKind::Project) | Err(_) => {
                        Err(LoadError::UnsupportedEntityType(kind.clone()))
                    }
                }
            }
        }
    }

    pub fn as_agent(&self) -> Option<&Agent> {
        match self {
            Self::Agent(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_activity(&self) -> Option<&Activity> {
        match self {
            Self::Activity(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_artefact(&self) -> Option<&Artefact> {
        match self {
            Self::Artefact(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_tool(&self) -> Option<&Tool> {
        match self {
            Self::Tool(n) => Some(n),
            _ => None,
        }
    }
}

impl From<Agent> for TrNode {
    fn from(n: Agent) -> Self {
        Self::Agent(n)
    }
}

impl From<Activity> for TrNode {
    fn from(n: Activity) -> Self {
        Self::Activity(n)
    }
}

impl From<Artefact> for TrNode {
    fn from(n: Artefact) -> Self {
        Self::Artefact(n)
    }
}

impl From<Tool> for TrNode {
    fn from(n: Tool) -> Self {
        Self::Tool(n)
    }
}
