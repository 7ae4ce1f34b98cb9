use super::*;

#[test]
fn names_identify_every_variant() {
    let host_id = HostId::new();
    assert_eq!(Effect::CreateHost { host_id: host_id.clone(), image: None }.name(), "create_host");
    assert_eq!(Effect::SnapshotHost { host_id: host_id.clone() }.name(), "snapshot_host");
    assert_eq!(
        Effect::KillSession { host_id, session: "fm-foo".into() }.name(),
        "kill_session"
    );
}

#[test]
fn fields_surface_host_id() {
    let host_id = HostId::new();
    let effect = Effect::StartHost { host_id: host_id.clone(), snapshot: Some("snap-1".into()) };
    let fields = effect.fields();
    assert!(fields.contains(&("host_id", host_id.to_string())));
    assert!(fields.contains(&("snapshot", "snap-1".to_string())));
}

#[test]
fn frequent_signaling_effects_are_not_verbose() {
    let id = TimerId::new("idle-poll:hst-x");
    assert!(!Effect::SetTimer { id: id.clone(), duration: Duration::from_secs(1) }.verbose());
    assert!(!Effect::CancelTimer { id }.verbose());
    assert!(Effect::DestroyHost { host_id: HostId::new(), purge_snapshots: true }.verbose());
}

#[test]
fn exec_effect_round_trips_through_json() {
    let effect = Effect::Exec {
        host_id: HostId::new(),
        argv: vec!["echo".into(), "hi".into()],
        cwd: None,
        hard_timeout: Duration::from_secs(30),
        warn_timeout: Some(Duration::from_secs(5)),
    };
    let json = serde_json::to_string(&effect).unwrap();
    let back: Effect = serde_json::from_str(&json).unwrap();
    assert_eq!(effect, back);
}
