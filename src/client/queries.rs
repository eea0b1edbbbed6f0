//! Higher-level queries over the store
//!
//! The store only answers property-match and single-hop trace requests.
//! Everything else is done locally: keep the nodes whose URI appears at the
//! right end of the right traces, then sort them by subtype.

use super::TraceClient;
use crate::codec::DecodedGraph;
use crate::error::TraceResult;
use crate::model::{Activity, ActivityType, Agent, Artefact, ArtefactType, Tool, ToolType};
use crate::vocab::{self, keys, keys::prov};
use serde::Serialize;
use std::collections::HashSet;

/// Everything recorded about one simulation run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationDetails {
    pub simulation: Option<Activity>,
    pub fmus: Vec<Artefact>,
    pub mm_config: Option<Artefact>,
    pub simulation_config: Option<Artefact>,
    pub engine: Option<Tool>,
    pub agent: Option<Agent>,
    pub result: Option<Artefact>,
}

/// Normalize a node URI to the compact form decoded graphs use
fn compact_uri(uri: &str) -> String {
    vocab::compact_id(&vocab::expand(uri))
}

fn objects_from<'a>(graph: &'a DecodedGraph, subject: &str, predicate: &str) -> HashSet<&'a str> {
    graph
        .traces
        .iter()
        .filter(|t| t.is_from(subject, predicate))
        .map(|t| t.object.as_str())
        .collect()
}

fn subjects_to<'a>(graph: &'a DecodedGraph, object: &str, predicate: &str) -> HashSet<&'a str> {
    graph
        .traces
        .iter()
        .filter(|t| t.is_to(object, predicate))
        .map(|t| t.subject.as_str())
        .collect()
}

/// Sort a decoded neighbourhood of `simulation` into its parts.
///
/// Inputs are the artefacts and tools the simulation `used`; the agent is
/// whoever it `wasAssociatedWith`; the result is the artefact that
/// `wasGeneratedBy` it. Slots with nothing matching stay empty.
pub fn partition_simulation(simulation: &str, graph: &DecodedGraph) -> SimulationDetails {
    let simulation = compact_uri(simulation);
    let used = &objects_from(graph, &simulation, prov::USED);
    let associated = objects_from(graph, &simulation, prov::WAS_ASSOCIATED_WITH);
    let generated = subjects_to(graph, &simulation, prov::WAS_GENERATED_BY);

    let inputs = |kind: ArtefactType| {
        graph
            .artefacts()
            .filter(move |a| a.artefact_type == kind && used.contains(a.uri.as_str()))
            .cloned()
    };

    SimulationDetails {
        simulation: graph.activities().find(|a| a.uri == simulation).cloned(),
        fmus: inputs(ArtefactType::Fmu).collect(),
        mm_config: inputs(ArtefactType::MultiModelConfig).next(),
        simulation_config: inputs(ArtefactType::SimulationConfig).next(),
        engine: graph
            .tools()
            .find(|t| {
                t.tool_type == ToolType::CoSimulationEngine
                    && (used.contains(t.uri.as_str()) || associated.contains(t.uri.as_str()))
            })
            .cloned(),
        agent: graph
            .agents()
            .find(|a| associated.contains(a.uri.as_str()))
            .cloned(),
        result: graph
            .artefacts()
            .find(|a| a.artefact_type == ArtefactType::SimulationResult && generated.contains(a.uri.as_str()))
            .cloned(),
    }
}

impl TraceClient {
    /// Simulation activities recorded for this client's project
    pub async fn get_simulations(&self) -> TraceResult<Vec<Activity>> {
        let project = vocab::expand(&self.project().uri());
        let graph = self
            .get(
                &["nodes"],
                &[
                    ("projectId", project.as_str()),
                    (keys::intocps::ACTIVITY_TYPE, keys::activity_type::SIMULATION),
                ],
            )
            .await?;
        Ok(graph
            .activities()
            .filter(|a| a.activity_type == ActivityType::Simulation)
            .cloned()
            .collect())
    }

    /// FMUs the simulation `used`
    pub async fn get_fmus_in_simulation(&self, simulation: &str) -> TraceResult<Vec<Artefact>> {
        let simulation = compact_uri(simulation);
        let graph = self
            .get(&["traces", prov::USED, "from", simulation.as_str()], &[])
            .await?;
        let used = objects_from(&graph, &simulation, prov::USED);
        Ok(graph
            .artefacts()
            .filter(|a| a.artefact_type == ArtefactType::Fmu && used.contains(a.uri.as_str()))
            .cloned()
            .collect())
    }

    /// Simulations that `used` the FMU
    pub async fn get_simulations_with_fmu(&self, fmu: &str) -> TraceResult<Vec<Activity>> {
        let fmu = compact_uri(fmu);
        let graph = self.get(&["traces", prov::USED, "to", fmu.as_str()], &[]).await?;
        let users = subjects_to(&graph, &fmu, prov::USED);
        Ok(graph
            .activities()
            .filter(|a| a.activity_type == ActivityType::Simulation && users.contains(a.uri.as_str()))
            .cloned()
            .collect())
    }

    /// Fetch the simulation's neighbourhood with three concurrent requests
    /// and partition it. The first failing request fails the whole call.
    pub async fn get_simulation_details(&self, simulation: &str) -> TraceResult<SimulationDetails> {
        let simulation = compact_uri(simulation);
        let sim = simulation.as_str();

        let generated_by = ["traces", prov::WAS_GENERATED_BY, "to", sim];
        let used_from = ["traces", prov::USED, "from", sim];
        let associated_from = ["traces", prov::WAS_ASSOCIATED_WITH, "from", sim];
        let (generated, used, associated) = tokio::try_join!(
            self.get(&generated_by, &[]),
            self.get(&used_from, &[]),
            self.get(&associated_from, &[]),
        )?;

        let mut graph = generated;
        graph.merge(used);
        graph.merge(associated);
        Ok(partition_simulation(sim, &graph))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Trace, TrNode};
    use chrono::{TimeZone, Utc};

    fn sim() -> Activity {
        Activity::simulation(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
    }

    fn graph_with(nodes: Vec<TrNode>, traces: Vec<Trace>) -> DecodedGraph {
        DecodedGraph {
            nodes,
            traces,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn partition_groups_by_trace_and_subtype() {
        let sim = sim();
        let fmu_a = Artefact::new(ArtefactType::Fmu, "a.fmu", "a");
        let fmu_b = Artefact::new(ArtefactType::Fmu, "b.fmu", "b");
        let mm = Artefact::new(ArtefactType::MultiModelConfig, "mm.json", "m");
        let coe = Tool::coe("coe", "1.0");
        let agent = Agent::new("T", "t@example.com");

        let graph = graph_with(
            vec![
                sim.clone().into(),
                fmu_a.clone().into(),
                fmu_b.clone().into(),
                mm.clone().into(),
                coe.clone().into(),
                agent.clone().into(),
            ],
            vec![
                Trace::new(&sim.uri, prov::USED, &fmu_a.uri),
                Trace::new(&sim.uri, prov::USED, &fmu_b.uri),
                Trace::new(&sim.uri, prov::USED, &mm.uri),
                Trace::new(&sim.uri, prov::USED, &coe.uri),
                Trace::new(&sim.uri, prov::WAS_ASSOCIATED_WITH, &agent.uri),
            ],
        );

        let details = partition_simulation(&sim.uri, &graph);
        assert_eq!(details.simulation, Some(sim));
        assert_eq!(details.fmus.len(), 2);
        assert_eq!(details.mm_config, Some(mm));
        assert_eq!(details.engine, Some(coe));
        assert_eq!(details.agent, Some(agent));
        assert_eq!(details.simulation_config, None);
        assert_eq!(details.result, None);
    }

    #[test]
    fn partition_ignores_nodes_not_linked_to_the_simulation() {
        let sim = sim();
        let stray = Artefact::new(ArtefactType::Fmu, "c.fmu", "c");
        let result = Artefact::new(ArtefactType::SimulationResult, "out.csv", "r");
        let graph = graph_with(
            vec![stray.into(), result.clone().into()],
            vec![Trace::new(&result.uri, prov::WAS_GENERATED_BY, &sim.uri)],
        );

        let details = partition_simulation(&sim.uri, &graph);
        assert!(details.fmus.is_empty());
        assert_eq!(details.result, Some(result));
        assert_eq!(details.simulation, None);
    }

    #[test]
    fn partition_accepts_expanded_uri() {
        let sim = sim();
        let graph = graph_with(vec![sim.clone().into()], Vec::new());
        let details = partition_simulation(&vocab::expand(&sim.uri), &graph);
        assert_eq!(details.simulation, Some(sim));
    }
}
