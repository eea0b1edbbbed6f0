//! Shared fixtures for the integration tests
//!
//! A throwaway project directory with known file hashes, and helpers that
//! turn typed nodes into the JSON-LD bodies a store would answer with.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use intocps_traceability::{
    Activity, Agent, Artefact, ArtefactType, FixedOracle, ProjectContext, Tool, Trace,
    TraceMessageBuilder, TrNode,
};
use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;

pub const USER_NAME: &str = "T";
pub const USER_EMAIL: &str = "t@example.com";

/// A project rooted in a temporary directory
pub struct Workspace {
    pub dir: TempDir,
    pub project: ProjectContext,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let project = ProjectContext::new("p1", dir.path(), "demo");
        Self { dir, project }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.project.resolve(relative)
    }

    /// Oracle answering for the standard fixture files
    pub fn oracle(&self) -> FixedOracle {
        FixedOracle::new(user())
            .with_hash(self.path("FMUs/tank.fmu"), "h-tank")
            .with_hash(self.path("FMUs/controller.fmu"), "h-ctrl")
            .with_hash(self.path("Multi-models/mm/mm.json"), "h-mm")
            .with_hash(self.path("Multi-models/mm/co-sim/coe.json"), "h-coe")
            .with_hash(self.path("Multi-models/mm/co-sim/outputs.csv"), "h-out")
    }
}

pub fn user() -> Agent {
    Agent::new(USER_NAME, USER_EMAIL)
}

pub fn fixed_simulation() -> Activity {
    Activity::simulation(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap())
}

/// The neighbourhood of one recorded simulation
pub struct SimulationFixture {
    pub simulation: Activity,
    pub fmus: Vec<Artefact>,
    pub mm: Artefact,
    pub sim_config: Artefact,
    pub engine: Tool,
    pub agent: Agent,
    pub result: Artefact,
}

impl SimulationFixture {
    pub fn new() -> Self {
        Self {
            simulation: fixed_simulation(),
            fmus: vec![
                Artefact::new(ArtefactType::Fmu, "FMUs/tank.fmu", "h-tank"),
                Artefact::new(ArtefactType::Fmu, "FMUs/controller.fmu", "h-ctrl"),
            ],
            mm: Artefact::new(ArtefactType::MultiModelConfig, "Multi-models/mm/mm.json", "h-mm"),
            sim_config: Artefact::new(
                ArtefactType::SimulationConfig,
                "Multi-models/mm/co-sim/coe.json",
                "h-coe",
            ),
            engine: Tool::coe("coe", "1.0.10"),
            agent: user(),
            result: Artefact::new(
                ArtefactType::SimulationResult,
                "Multi-models/mm/co-sim/outputs.csv",
                "h-out",
            ),
        }
    }

    /// Nodes and traces the simulation `used`
    pub fn used(&self) -> (Vec<TrNode>, Vec<Trace>) {
        let mut nodes: Vec<TrNode> = vec![self.simulation.clone().into()];
        let mut inputs: Vec<TrNode> = self.fmus.iter().cloned().map(TrNode::from).collect();
        inputs.push(self.mm.clone().into());
        inputs.push(self.sim_config.clone().into());
        inputs.push(self.engine.clone().into());

        let traces = inputs
            .iter()
            .map(|n| Trace::new(&self.simulation.uri, "prov:used", n.uri()))
            .collect();
        nodes.extend(inputs);
        (nodes, traces)
    }

    pub fn associated(&self) -> (Vec<TrNode>, Vec<Trace>) {
        (
            vec![self.simulation.clone().into(), self.agent.clone().into()],
            vec![Trace::new(&self.simulation.uri, "prov:wasAssociatedWith", &self.agent.uri)],
        )
    }

    pub fn generated(&self) -> (Vec<TrNode>, Vec<Trace>) {
        (
            vec![self.result.clone().into()],
            vec![Trace::new(&self.result.uri, "prov:wasGeneratedBy", &self.simulation.uri)],
        )
    }
}

/// Compacted JSON-LD for a set of nodes and traces, as a store would
/// return it
pub fn store_document(project: &ProjectContext, nodes: &[TrNode], traces: &[Trace]) -> Value {
    let mut builder = TraceMessageBuilder::new(project.clone());
    for node in nodes {
        builder.add_node(node).expect("fixture node");
    }
    for trace in traces {
        builder.add_trace(trace).expect("fixture trace");
    }
    builder.finish().expect("fixture document")
}

/// Shorthand for [`store_document`] over a `(nodes, traces)` pair
pub fn store_body(project: &ProjectContext, part: (Vec<TrNode>, Vec<Trace>)) -> Value {
    store_document(project, &part.0, &part.1)
}
