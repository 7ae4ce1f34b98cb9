use super::*;

#[test]
fn unknown_type_tag_deserializes_to_custom() {
    let event: Event = serde_json::from_str(r#"{"type":"totally:unknown"}"#).unwrap();
    assert_eq!(event, Event::Custom);
}

#[test]
fn host_created_round_trips_with_its_type_tag() {
    let id = HostId::new();
    let event = Event::HostCreated { id: id.clone() };
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("\"type\":\"host:created\""));
    let back: Event = serde_json::from_str(&json).unwrap();
    assert_eq!(back, Event::HostCreated { id });
}

#[test]
fn names_are_stable_identifiers() {
    assert_eq!(Event::Shutdown.name(), "system:shutdown");
    assert_eq!(Event::IdleFired { host_id: HostId::new() }.name(), "idle:fired");
}

#[test]
fn log_summary_includes_identifying_fields_for_agent_created() {
    let id = AgentId::new();
    let event = Event::AgentCreated { id: id.clone(), host_id: HostId::new(), name: "foo".into() };
    let summary = event.log_summary();
    assert!(summary.contains("foo"));
    assert!(summary.contains(&id.to_string()));
}
