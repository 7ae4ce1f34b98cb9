use std::time::Duration;

use super::*;

#[test]
fn hello_omits_absent_token() {
    let req = Request::Hello { version: "1.0.0".into(), token: None };
    let json = serde_json::to_string(&req).unwrap();
    assert!(!json.contains("token"));
}

#[test]
fn exec_round_trips_timeouts_through_json() {
    let req = Request::Exec {
        agent_id: "agt-abc".into(),
        argv: vec!["ls".into()],
        cwd: None,
        hard_timeout: Duration::from_secs(30),
        warn_timeout: Some(Duration::from_secs(10)),
    };
    let json = serde_json::to_string(&req).unwrap();
    let back: Request = serde_json::from_str(&json).unwrap();
    assert_eq!(req, back);
}

#[test]
fn create_host_defaults_resource_and_ssh() {
    let json = r#"{"type":"CreateHost","name":"box","provider":"local"}"#;
    let req: Request = serde_json::from_str(json).unwrap();
    assert_eq!(
        req,
        Request::CreateHost {
            name: "box".into(),
            provider: ProviderKind::Local,
            image: None,
            resource: Resource::default(),
            ssh: None,
        }
    );
}

#[test]
fn stop_transfer_round_trips_through_json() {
    let req = Request::StopTransfer { agent_id: "agt-abc".into() };
    let json = serde_json::to_string(&req).unwrap();
    let back: Request = serde_json::from_str(&json).unwrap();
    assert_eq!(req, back);
}

#[test]
fn query_wraps_a_nested_query_variant() {
    let req = Request::Query { query: Query::ListHosts };
    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains("\"query\""));
    let back: Request = serde_json::from_str(&json).unwrap();
    assert_eq!(req, back);
}
