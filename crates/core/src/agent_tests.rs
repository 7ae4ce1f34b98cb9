use super::*;

#[test]
fn activity_merge_is_monotonic() {
    assert_eq!(AgentDescriptor::bump_activity(Some(10), 5), Some(10));
    assert_eq!(AgentDescriptor::bump_activity(Some(10), 20), Some(20));
    assert_eq!(AgentDescriptor::bump_activity(None, 5), Some(5));
}

#[test]
fn redacts_secret_shaped_env_keys() {
    let agent = AgentDescriptor::builder()
        .env(BTreeMap::from([
            ("ANTHROPIC_API_KEY".to_string(), "sk-abc".to_string()),
            ("GITHUB_TOKEN".to_string(), "ghp_xyz".to_string()),
            ("HOME".to_string(), "/root".to_string()),
        ]))
        .build();
    let redacted = agent.redacted_env();
    assert_eq!(redacted["ANTHROPIC_API_KEY"], "***");
    assert_eq!(redacted["GITHUB_TOKEN"], "***");
    assert_eq!(redacted["HOME"], "/root");
}

#[test]
fn idle_modes_tamper_resistance() {
    assert!(IdleMode::Create.tamper_resistant());
    assert!(IdleMode::Boot.tamper_resistant());
    assert!(IdleMode::Disabled.tamper_resistant());
    assert!(!IdleMode::Io.tamper_resistant());
    assert!(!IdleMode::Agent.tamper_resistant());
}

#[test]
fn builder_defaults_to_creating() {
    let agent = AgentDescriptor::builder().name("foo").build();
    assert_eq!(agent.status, AgentStatus::Creating);
    assert!(!agent.is_running());
}
