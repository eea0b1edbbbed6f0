//! End-to-end: build a message, encode it, decode it back
//!
//! Covers the path a recording takes before it reaches the store, and the
//! path a store response takes on the way back in.

mod common;

use common::{user, Workspace, USER_EMAIL, USER_NAME};
use intocps_traceability::vocab::keys::prov;
use intocps_traceability::{
    parse_objects, Activity, ActivityType, Artefact, ArtefactType, LoadError, RdfFormat, Trace,
    TraceMessageBuilder, TrNode,
};
use chrono::{TimeZone, Utc};

fn model_creation() -> Activity {
    Activity::model_creation(Utc.with_ymd_and_hms(2024, 3, 1, 9, 15, 0).unwrap())
}

fn inputs() -> Vec<Artefact> {
    vec![
        Artefact::new(ArtefactType::Fmu, "FMUs/tank.fmu", "h-tank"),
        Artefact::new(ArtefactType::Fmu, "FMUs/controller.fmu", "h-ctrl"),
    ]
}

/// Project + agent + activity + two used artefacts
fn recorded_message(ws: &Workspace) -> TraceMessageBuilder {
    let activity = model_creation();
    let mut builder = TraceMessageBuilder::new(ws.project.clone());
    builder.add_project_node().unwrap();
    builder.add_node(&user().into()).unwrap();
    builder.add_node(&activity.clone().into()).unwrap();
    for artefact in inputs() {
        builder.add_node(&artefact.clone().into()).unwrap();
        builder
            .add_trace(&Trace::new(&activity.uri, prov::USED, &artefact.uri))
            .unwrap();
    }
    builder
}

#[test]
fn test_message_decodes_to_typed_nodes_and_traces() {
    let ws = Workspace::new();
    let doc = recorded_message(&ws).finish().unwrap();

    let body = serde_json::to_string(&doc).unwrap();
    let graph = parse_objects(&body, "application/ld+json").unwrap();

    // The project entity is not a node kind of its own
    assert_eq!(graph.nodes.len(), 4);
    assert_eq!(graph.warnings.len(), 1);
    assert_eq!(graph.warnings[0].subject, ws.project.uri());
    assert!(matches!(graph.warnings[0].reason, LoadError::UnsupportedEntityType(_)));

    let agent = graph.agents().next().expect("agent decoded");
    assert_eq!(agent.name, USER_NAME);
    assert_eq!(agent.email, USER_EMAIL);

    let activity = graph.activities().next().expect("activity decoded");
    assert_eq!(activity.activity_type, ActivityType::ModelCreation);
    assert_eq!(activity, &model_creation());

    let artefacts: Vec<_> = graph.artefacts().cloned().collect();
    assert_eq!(artefacts.len(), 2);
    for expected in inputs() {
        assert!(artefacts.contains(&expected), "missing {}", expected.path);
    }

    assert_eq!(graph.traces.len(), 2);
    assert!(graph.traces.iter().all(|t| t.is_from(&activity.uri, prov::USED)));
}

#[test]
fn test_document_uses_compact_context() {
    let ws = Workspace::new();
    let doc = recorded_message(&ws).finish().unwrap();

    assert!(doc.get("@context").is_some());
    let graph = doc["@graph"].as_array().expect("several nodes go under @graph");
    let agent = graph
        .iter()
        .find(|n| n["@id"] == "mailto:t@example.com")
        .expect("agent node present");
    assert_eq!(agent["@type"], "prov:Agent");
    assert_eq!(agent["name"], USER_NAME);
}

#[test]
fn test_ntriples_and_jsonld_decode_alike() {
    let ws = Workspace::new();
    let builder = recorded_message(&ws);

    let from_nt = parse_objects(&builder.to_ntriples(), RdfFormat::NTriples.media_type()).unwrap();
    let doc = serde_json::to_string(&builder.finish().unwrap()).unwrap();
    let from_jsonld = parse_objects(&doc, RdfFormat::JsonLd.media_type()).unwrap();

    assert_eq!(from_nt.nodes.len(), from_jsonld.nodes.len());
    for node in &from_nt.nodes {
        assert_eq!(from_jsonld.node(node.uri()), Some(node));
    }
    let mut a = from_nt.traces.clone();
    let mut b = from_jsonld.traces.clone();
    a.sort_by(|x, y| x.object.cmp(&y.object));
    b.sort_by(|x, y| x.object.cmp(&y.object));
    assert_eq!(a, b);
}

#[test]
fn test_turtle_response_decodes() {
    let fmu = &inputs()[0];
    let body = format!(
        r#"@prefix prov: <http://www.w3.org/ns/prov#> .
@prefix intocps: <http://into-cps.org/ns#> .
@prefix schema: <https://schema.org/> .

<http://into-cps.org/ns#{local}> a prov:Entity ;
    intocps:EntityType intocps:Artefact ;
    intocps:ArtefactType intocps:fmu ;
    intocps:Path "FMUs/tank.fmu" ;
    schema:sha256 "h-tank" .
"#,
        local = fmu.uri.trim_start_matches("intocps:")
    );

    let graph = parse_objects(&body, "text/turtle").unwrap();
    assert_eq!(graph.nodes, vec![TrNode::from(fmu.clone())]);
}

#[test]
fn test_unsupported_content_type_is_empty() {
    let graph = parse_objects("hello", "text/plain").unwrap();
    assert!(graph.is_empty());
}

#[test]
fn test_malformed_body_is_error() {
    assert!(parse_objects("{ not json", "application/ld+json").is_err());
}

#[test]
fn test_snapshot_written_next_to_project() {
    let ws = Workspace::new();
    let snapshots = ws.path("traceability/messages");
    let builder = recorded_message(&ws).with_snapshot_dir(&snapshots);

    let doc = builder.finish().unwrap();

    let written: Vec<_> = std::fs::read_dir(&snapshots)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].extension().and_then(|e| e.to_str()), Some("jsonld"));
    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&written[0]).unwrap()).unwrap();
    assert_eq!(saved, doc);
}
