//! Recording entry points for the application layer
//!
//! Each `create_trace_*` call derives the nodes for one engineering step,
//! links them and pushes the result as a single message. Nothing is
//! recorded while tracing is disabled, and a configuration whose content
//! hash did not change since the last recording is skipped without any
//! request.

use crate::builder::TraceMessageBuilder;
use crate::client::TraceClient;
use crate::config::TraceConfig;
use crate::environment::{AppIdentity, IdentityOracle, ProjectContext};
use crate::error::{TraceError, TraceResult};
use crate::model::{Activity, ActivityType, Agent, Artefact, ArtefactType, Tool, Trace, TrNode};
use crate::vocab::keys::prov;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::{spawn_blocking, JoinHandle};
use tracing::{debug, error, info};

/// A multi-model configuration file and the FMUs it references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiModelConfig {
    pub source_path: PathBuf,
    pub fmus: Vec<PathBuf>,
}

/// A co-simulation configuration, the multi-model it runs and that
/// multi-model's FMUs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoSimConfig {
    pub source_path: PathBuf,
    pub multi_model_path: PathBuf,
    pub fmus: Vec<PathBuf>,
}

/// The co-simulation engine that ran a simulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoeInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum RecordOutcome {
    /// Tracing is switched off
    Disabled,
    /// Content hash matches the previous recording
    Unchanged,
    Pushed { triples: usize },
}

/// One activity with its inputs, output and author
struct Recording {
    activity: Activity,
    agent: Agent,
    used: Vec<TrNode>,
    generated: Artefact,
    derived_from: Option<Artefact>,
}

/// A recording turned into triples, ready to push
struct Assembled {
    activity: ActivityType,
    builder: TraceMessageBuilder,
}

/// The local half of a recording: every oracle call and the message
/// assembly. Runs on the blocking pool.
#[derive(Clone)]
struct Recorder {
    config: TraceConfig,
    project: ProjectContext,
    app: AppIdentity,
    oracle: Arc<dyn IdentityOracle>,
}

impl Recorder {
    fn builder(&self) -> TraceMessageBuilder {
        let mut builder = TraceMessageBuilder::new(self.project.clone());
        if self.config.auto_associate {
            builder = builder.auto_associate(self.oracle.clone());
        }
        if let Some(dir) = self.config.snapshot_dir(&self.project) {
            builder = builder.with_snapshot_dir(dir);
        }
        builder
    }

    fn artefact(&self, kind: ArtefactType, path: &Path) -> TraceResult<Artefact> {
        Artefact::tracked(kind, &self.project, path, self.oracle.as_ref())
    }

    fn fmus(&self, paths: &[PathBuf]) -> TraceResult<Vec<TrNode>> {
        paths
            .iter()
            .map(|p| self.artefact(ArtefactType::Fmu, p).map(TrNode::from))
            .collect()
    }

    /// Hash the source once. `None` when it still matches `prev_hash`,
    /// otherwise the new artefact and the version it replaces.
    fn changed(
        &self,
        kind: ArtefactType,
        path: &Path,
        prev_hash: Option<&str>,
    ) -> TraceResult<Option<(Artefact, Option<Artefact>)>> {
        let hash = self.oracle.file_hash(path)?;
        if prev_hash == Some(hash.as_str()) {
            debug!(path = %path.display(), "source unchanged, not recorded");
            return Ok(None);
        }
        let current = Artefact::new(kind, self.project.relative_path(path), hash);
        let previous = prev_hash.map(|prev| Artefact::new(kind, current.path.clone(), prev));
        Ok(Some((current, previous)))
    }

    fn assemble(&self, rec: Recording) -> TraceResult<Assembled> {
        let mut builder = self.builder();
        builder.add_project_node()?;
        builder.add_node(&rec.agent.clone().into())?;
        for node in &rec.used {
            builder.add_node(node)?;
        }
        builder.add_node(&rec.generated.clone().into())?;
        builder.add_node(&rec.activity.clone().into())?;

        let activity = rec.activity.uri.as_str();
        let output = rec.generated.uri.as_str();
        builder.add_trace(&Trace::new(activity, prov::WAS_ASSOCIATED_WITH, &rec.agent.uri))?;
        builder.add_trace(&Trace::new(output, prov::WAS_ATTRIBUTED_TO, &rec.agent.uri))?;
        for node in &rec.used {
            builder.add_trace(&Trace::new(activity, prov::USED, node.uri()))?;
        }
        builder.add_trace(&Trace::new(output, prov::WAS_GENERATED_BY, activity))?;

        if let Some(prev) = &rec.derived_from {
            builder.add_node(&prev.clone().into())?;
            builder.add_trace(&Trace::new(output, prov::WAS_DERIVED_FROM, &prev.uri))?;
        }
        Ok(Assembled {
            activity: rec.activity.activity_type,
            builder,
        })
    }

    fn mm_config(&self, mm: &MultiModelConfig, prev_hash: Option<&str>) -> TraceResult<Option<Assembled>> {
        let Some((generated, derived_from)) =
            self.changed(ArtefactType::MultiModelConfig, &mm.source_path, prev_hash)?
        else {
            return Ok(None);
        };
        let mut used = self.fmus(&mm.fmus)?;
        used.push(Tool::application(&self.app).into());

        self.assemble(Recording {
            activity: Activity::model_creation(Utc::now()),
            agent: self.oracle.user_as_agent()?,
            used,
            generated,
            derived_from,
        })
        .map(Some)
    }

    fn cosim_config(&self, cfg: &CoSimConfig, prev_hash: Option<&str>) -> TraceResult<Option<Assembled>> {
        let Some((generated, derived_from)) =
            self.changed(ArtefactType::SimulationConfig, &cfg.source_path, prev_hash)?
        else {
            return Ok(None);
        };
        let used = vec![
            self.artefact(ArtefactType::MultiModelConfig, &cfg.multi_model_path)?.into(),
            Tool::application(&self.app).into(),
        ];

        self.assemble(Recording {
            activity: Activity::simulation_config_creation(Utc::now()),
            agent: self.oracle.user_as_agent()?,
            used,
            generated,
            derived_from,
        })
        .map(Some)
    }

    fn simulation(&self, cfg: &CoSimConfig, coe: &CoeInfo, result_path: &Path) -> TraceResult<Assembled> {
        let mut used = self.fmus(&cfg.fmus)?;
        used.push(self.artefact(ArtefactType::MultiModelConfig, &cfg.multi_model_path)?.into());
        used.push(self.artefact(ArtefactType::SimulationConfig, &cfg.source_path)?.into());
        used.push(Tool::coe(&coe.name, &coe.version).into());

        self.assemble(Recording {
            activity: Activity::simulation(Utc::now()),
            agent: self.oracle.user_as_agent()?,
            generated: self.artefact(ArtefactType::SimulationResult, result_path)?,
            derived_from: None,
            used,
        })
    }
}

pub struct TraceabilityController {
    recorder: Recorder,
    client: TraceClient,
}

impl TraceabilityController {
    pub fn new(
        config: TraceConfig,
        project: ProjectContext,
        app: AppIdentity,
        oracle: Arc<dyn IdentityOracle>,
        client: TraceClient,
    ) -> Self {
        Self {
            recorder: Recorder {
                config,
                project,
                app,
                oracle,
            },
            client,
        }
    }

    pub fn config(&self) -> &TraceConfig {
        &self.recorder.config
    }

    pub fn client(&self) -> &TraceClient {
        &self.client
    }

    /// Run `f` against the recorder on the blocking pool; oracle calls may
    /// shell out to `git`.
    async fn local<T, F>(&self, f: F) -> TraceResult<T>
    where
        F: FnOnce(&Recorder) -> TraceResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let recorder = self.recorder.clone();
        spawn_blocking(move || f(&recorder))
            .await
            .map_err(|e| TraceError::Oracle(format!("recording task failed: {}", e)))?
    }

    async fn push(&self, assembled: Option<Assembled>) -> TraceResult<RecordOutcome> {
        let Some(Assembled { activity, builder }) = assembled else {
            return Ok(RecordOutcome::Unchanged);
        };
        self.client.push(&builder).await?;
        info!(%activity, triples = builder.len(), "recorded activity");
        Ok(RecordOutcome::Pushed {
            triples: builder.len(),
        })
    }

    /// Record the creation of a multi-model configuration
    pub async fn create_trace_mm_config(
        &self,
        mm: &MultiModelConfig,
        prev_hash: Option<&str>,
    ) -> TraceResult<RecordOutcome> {
        if !self.config().enabled {
            return Ok(RecordOutcome::Disabled);
        }
        let mm = mm.clone();
        let prev_hash = prev_hash.map(str::to_string);
        let assembled = self
            .local(move |recorder| recorder.mm_config(&mm, prev_hash.as_deref()))
            .await?;
        self.push(assembled).await
    }

    /// Record the creation of a co-simulation configuration from a
    /// multi-model
    pub async fn create_trace_cosim_config(
        &self,
        cfg: &CoSimConfig,
        prev_hash: Option<&str>,
    ) -> TraceResult<RecordOutcome> {
        if !self.config().enabled {
            return Ok(RecordOutcome::Disabled);
        }
        let cfg = cfg.clone();
        let prev_hash = prev_hash.map(str::to_string);
        let assembled = self
            .local(move |recorder| recorder.cosim_config(&cfg, prev_hash.as_deref()))
            .await?;
        self.push(assembled).await
    }

    /// Record a finished simulation run and its result file
    pub async fn create_trace_simulation(
        &self,
        cfg: &CoSimConfig,
        coe: &CoeInfo,
        result_path: &Path,
    ) -> TraceResult<RecordOutcome> {
        if !self.config().enabled {
            return Ok(RecordOutcome::Disabled);
        }
        let (cfg, coe, result_path) = (cfg.clone(), coe.clone(), result_path.to_path_buf());
        let assembled = self
            .local(move |recorder| recorder.simulation(&cfg, &coe, &result_path))
            .await?;
        self.push(Some(assembled)).await
    }

    /// Run a recording in the background. Failures are logged and go no
    /// further.
    pub fn spawn<F>(recording: F) -> JoinHandle<()>
    where
        F: Future<Output = TraceResult<RecordOutcome>> + Send + 'static,
    {
        tokio::spawn(async move {
            match recording.await {
                Ok(outcome) => debug!(?outcome, "background recording finished"),
                Err(e) => error!(error = %e, "background recording failed"),
            }
        })
    }
}
