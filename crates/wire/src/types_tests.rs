use fm_core::test_support::{fake_agent, fake_host};

use super::*;

#[test]
fn agent_detail_redacts_secret_shaped_env() {
    let mut agent = fake_agent("agt-abc", "hst-xyz", "worker");
    agent.env.insert("API_TOKEN".into(), "shh".into());
    let detail = AgentDetail::from(&agent);
    assert_eq!(detail.env.get("API_TOKEN").map(String::as_str), Some("***"));
}

#[test]
fn host_detail_reports_lock_presence() {
    let host = fake_host("hst-abc", "box");
    let detail = HostDetail::from(&host);
    assert!(!detail.locked);
}

#[test]
fn agent_summary_round_trips_through_json() {
    let agent = fake_agent("agt-abc", "hst-xyz", "worker");
    let summary = AgentSummary::from(&agent);
    let json = serde_json::to_string(&summary).unwrap();
    let back: AgentSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(summary, back);
}
