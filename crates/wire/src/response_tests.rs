use super::*;

#[test]
fn ok_has_no_payload_fields() {
    let json = serde_json::to_string(&Response::Ok).unwrap();
    assert_eq!(json, r#"{"type":"Ok"}"#);
}

#[test]
fn hosts_round_trips_a_summary_list() {
    let response = Response::Hosts {
        hosts: vec![HostSummary {
            id: "hst-abc".into(),
            name: "box".into(),
            provider: fm_core::ProviderKind::Local,
            status: fm_core::HostStatus::Running,
            agent_count: 2,
            created_at_epoch_ms: 1,
        }],
    };
    let json = serde_json::to_string(&response).unwrap();
    let back: Response = serde_json::from_str(&json).unwrap();
    assert_eq!(response, back);
}

#[test]
fn host_with_no_match_serializes_none() {
    let response = Response::Host { host: None };
    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"host\":null"));
}

#[test]
fn error_round_trips_with_a_message() {
    let response = Response::Error { message: "host not found".into() };
    let json = serde_json::to_string(&response).unwrap();
    let back: Response = serde_json::from_str(&json).unwrap();
    assert_eq!(response, back);
}
