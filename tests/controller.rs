//! Recording workflows through the controller
//!
//! The mock store accepts every push; tests decode what was sent and check
//! the provenance it describes.

mod common;

use common::{user, Workspace};
use intocps_traceability::vocab::keys::prov;
use intocps_traceability::{
    parse_objects, partition_simulation, ActivityType, AppIdentity, ArtefactType, CoSimConfig,
    CoeInfo, DecodedGraph, HttpResponse, Method, MockTransport, MultiModelConfig, RecordOutcome,
    ToolType, TraceClient, TraceConfig, TraceabilityController,
};
use std::sync::Arc;

fn accepting_store() -> Arc<MockTransport> {
    Arc::new(MockTransport::new().with_response(Method::Post, "push", HttpResponse::status(201)))
}

fn controller(ws: &Workspace, config: TraceConfig, transport: Arc<MockTransport>) -> TraceabilityController {
    let client = TraceClient::new(&config, ws.project.clone(), transport).unwrap();
    TraceabilityController::new(
        config,
        ws.project.clone(),
        AppIdentity::new("INTO-CPS", "4.0.0"),
        Arc::new(ws.oracle()),
        client,
    )
}

fn enabled() -> TraceConfig {
    TraceConfig {
        enabled: true,
        save_snapshots: false,
        ..TraceConfig::default()
    }
}

fn cosim(ws: &Workspace) -> CoSimConfig {
    CoSimConfig {
        source_path: ws.path("Multi-models/mm/co-sim/coe.json"),
        multi_model_path: ws.path("Multi-models/mm/mm.json"),
        fmus: vec![ws.path("FMUs/tank.fmu"), ws.path("FMUs/controller.fmu")],
    }
}

/// Decode the body of the `n`th request sent to the store
fn pushed(transport: &MockTransport, n: usize) -> DecodedGraph {
    let request = &transport.requests()[n];
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.header("Content-Type"), Some("application/ld+json"));
    parse_objects(request.body.as_deref().unwrap(), "application/ld+json").unwrap()
}

#[tokio::test]
async fn test_mm_config_records_fmus_and_application() {
    let ws = Workspace::new();
    let transport = accepting_store();
    let mm = MultiModelConfig {
        source_path: ws.path("Multi-models/mm/mm.json"),
        fmus: vec![ws.path("FMUs/tank.fmu"), ws.path("FMUs/controller.fmu")],
    };

    let outcome = controller(&ws, enabled(), transport.clone())
        .create_trace_mm_config(&mm, None)
        .await
        .unwrap();
    assert!(matches!(outcome, RecordOutcome::Pushed { .. }));

    let graph = pushed(&transport, 0);
    let activity = graph.activities().next().expect("activity pushed");
    assert_eq!(activity.activity_type, ActivityType::ModelCreation);

    let generated = graph
        .artefacts()
        .find(|a| a.artefact_type == ArtefactType::MultiModelConfig)
        .expect("multi-model pushed");
    assert_eq!(generated.path, "Multi-models/mm/mm.json");
    assert_eq!(generated.hash, "h-mm");

    let used: Vec<_> = graph
        .traces
        .iter()
        .filter(|t| t.is_from(&activity.uri, prov::USED))
        .collect();
    assert_eq!(used.len(), 3);
    let app = graph.tools().next().expect("application tool pushed");
    assert_eq!(app.tool_type, ToolType::Software);
    assert!(used.iter().any(|t| t.object == app.uri));

    let agent = user();
    assert!(graph
        .traces
        .iter()
        .any(|t| t.is_from(&activity.uri, prov::WAS_ASSOCIATED_WITH) && t.object == agent.uri));
    assert!(graph
        .traces
        .iter()
        .any(|t| t.is_from(&generated.uri, prov::WAS_ATTRIBUTED_TO) && t.object == agent.uri));
    assert!(graph
        .traces
        .iter()
        .any(|t| t.is_from(&generated.uri, prov::WAS_GENERATED_BY) && t.object == activity.uri));
}

#[tokio::test]
async fn test_cosim_config_unchanged_sends_nothing() {
    let ws = Workspace::new();
    let transport = accepting_store();

    let outcome = controller(&ws, enabled(), transport.clone())
        .create_trace_cosim_config(&cosim(&ws), Some("h-coe"))
        .await
        .unwrap();

    assert_eq!(outcome, RecordOutcome::Unchanged);
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_cosim_config_change_is_derived_from_previous() {
    let ws = Workspace::new();
    let transport = accepting_store();

    controller(&ws, enabled(), transport.clone())
        .create_trace_cosim_config(&cosim(&ws), Some("h-coe-old"))
        .await
        .unwrap();

    let graph = pushed(&transport, 0);
    let configs: Vec<_> = graph
        .artefacts()
        .filter(|a| a.artefact_type == ArtefactType::SimulationConfig)
        .collect();
    assert_eq!(configs.len(), 2);
    let current = configs.iter().find(|a| a.hash == "h-coe").unwrap();
    let previous = configs.iter().find(|a| a.hash == "h-coe-old").unwrap();
    assert!(graph
        .traces
        .iter()
        .any(|t| t.is_from(&current.uri, prov::WAS_DERIVED_FROM) && t.object == previous.uri));
}

#[tokio::test]
async fn test_simulation_recording_partitions_back() {
    let ws = Workspace::new();
    let transport = accepting_store();
    let coe = CoeInfo {
        name: "coe".into(),
        version: "1.0.10".into(),
    };

    controller(&ws, enabled(), transport.clone())
        .create_trace_simulation(&cosim(&ws), &coe, &ws.path("Multi-models/mm/co-sim/outputs.csv"))
        .await
        .unwrap();

    let graph = pushed(&transport, 0);
    let sim = graph
        .activities()
        .find(|a| a.activity_type == ActivityType::Simulation)
        .expect("simulation pushed");
    let details = partition_simulation(&sim.uri, &graph);

    assert_eq!(details.simulation.as_ref(), Some(sim));
    assert_eq!(details.fmus.len(), 2);
    assert_eq!(details.mm_config.map(|a| a.hash).as_deref(), Some("h-mm"));
    assert_eq!(details.simulation_config.map(|a| a.hash).as_deref(), Some("h-coe"));
    assert_eq!(details.engine.map(|t| t.version).as_deref(), Some("1.0.10"));
    assert_eq!(details.agent, Some(user()));
    assert_eq!(details.result.map(|a| a.path).as_deref(), Some("Multi-models/mm/co-sim/outputs.csv"));
}

#[tokio::test]
async fn test_snapshots_saved_under_project() {
    let ws = Workspace::new();
    let transport = accepting_store();
    let config = TraceConfig {
        save_snapshots: true,
        ..enabled()
    };

    controller(&ws, config.clone(), transport)
        .create_trace_cosim_config(&cosim(&ws), None)
        .await
        .unwrap();

    let dir = config.snapshot_dir(&ws.project).expect("snapshots enabled");
    assert!(dir.starts_with(ws.dir.path()));
    assert_eq!(std::fs::read_dir(dir).unwrap().count(), 1);
}

#[tokio::test]
async fn test_auto_associate_adds_user_once() {
    let ws = Workspace::new();
    let transport = accepting_store();
    let config = TraceConfig {
        auto_associate: true,
        ..enabled()
    };

    controller(&ws, config, transport.clone())
        .create_trace_cosim_config(&cosim(&ws), None)
        .await
        .unwrap();

    let graph = pushed(&transport, 0);
    assert_eq!(graph.agents().count(), 1);
    let associations = graph
        .traces
        .iter()
        .filter(|t| t.predicate == prov::WAS_ASSOCIATED_WITH)
        .count();
    assert_eq!(associations, 1);
}
