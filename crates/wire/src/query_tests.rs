use super::*;

#[test]
fn list_hosts_round_trips_through_its_type_tag() {
    let json = serde_json::to_string(&Query::ListHosts).unwrap();
    assert_eq!(json, r#"{"type":"ListHosts"}"#);
    let back: Query = serde_json::from_str(&json).unwrap();
    assert_eq!(back, Query::ListHosts);
}

#[test]
fn get_agent_logs_defaults_offset_to_zero() {
    let json = r#"{"type":"GetAgentLogs","id":"agt-abc","lines":50}"#;
    let query: Query = serde_json::from_str(json).unwrap();
    assert_eq!(query, Query::GetAgentLogs { id: "agt-abc".into(), lines: 50, offset: 0 });
}

#[test]
fn list_agents_defaults_host_filter_to_none() {
    let json = r#"{"type":"ListAgents"}"#;
    let query: Query = serde_json::from_str(json).unwrap();
    assert_eq!(query, Query::ListAgents { host_id: None });
}
