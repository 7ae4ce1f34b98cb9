//! `fm config`: six-level command-default precedence (built-in, user,
//! project, local, environment, CLI flag), lowest first (§6
//! "Configuration").
//!
//! User-scope is skipped here (it lives outside the fleet root, at a
//! platform config dir this harness doesn't control) — project, local and
//! environment are exercised directly since they're addressable through
//! `FM_HOST_DIR` and the process's own cwd/env.

use crate::prelude::*;
use std::fs;

#[test]
fn unset_param_reports_no_value() {
    let fleet = Fleet::empty();
    fleet.fm().args(&["config", "get", "create", "provider"]).passes().stdout_has("no value set for create.provider");
}

#[test]
fn project_scope_file_is_picked_up() {
    let fleet = Fleet::empty();
    let settings_dir = fleet.root_path().join("profiles").join("default");
    fs::create_dir_all(&settings_dir).expect("mkdir");
    fs::write(settings_dir.join("settings.toml"), "[create]\nprovider = \"container\"\n").expect("write settings");

    fleet
        .fm()
        .args(&["config", "get", "create", "provider"])
        .passes()
        .stdout_has("container")
        .stdout_has("(project)");
}

#[test]
fn local_scope_file_overrides_project_scope() {
    let fleet = Fleet::empty();
    let settings_dir = fleet.root_path().join("profiles").join("default");
    fs::create_dir_all(&settings_dir).expect("mkdir");
    fs::write(settings_dir.join("settings.toml"), "[create]\nprovider = \"container\"\n").expect("write settings");

    let local_dir = tempfile::tempdir().expect("tempdir");
    fs::write(local_dir.path().join(".fm.toml"), "[create]\nprovider = \"cloud_sandbox\"\n").expect("write local");

    fleet
        .fm()
        .pwd(local_dir.path())
        .args(&["config", "get", "create", "provider"])
        .passes()
        .stdout_has("cloud_sandbox")
        .stdout_has("(local)");
}

#[test]
fn environment_override_outranks_every_file_scope() {
    let fleet = Fleet::empty();
    let settings_dir = fleet.root_path().join("profiles").join("default");
    fs::create_dir_all(&settings_dir).expect("mkdir");
    fs::write(settings_dir.join("settings.toml"), "[create]\nprovider = \"container\"\n").expect("write settings");

    fleet
        .fm()
        .env("FM_COMMANDS_CREATE_PROVIDER", "secure_shell")
        .args(&["config", "get", "create", "provider"])
        .passes()
        .stdout_has("secure_shell")
        .stdout_has("(environment)");
}

#[test]
fn create_honors_project_scope_agent_type_default() {
    let fleet = Fleet::empty();
    let settings_dir = fleet.root_path().join("profiles").join("default");
    fs::create_dir_all(&settings_dir).expect("mkdir");
    fs::write(settings_dir.join("settings.toml"), "[create]\nagent_type = \"not-a-real-type\"\n").expect("write settings");

    // No `--agent-type`/positional override: the project-scope default
    // must be what reaches the daemon, not clap's own "generic" default.
    fleet.fm().args(&["create", "worker-config-default"]).fails().stderr_has("not-a-real-type");
}

#[test]
fn config_list_enumerates_every_resolved_override() {
    let fleet = Fleet::empty();
    let settings_dir = fleet.root_path().join("profiles").join("default");
    fs::create_dir_all(&settings_dir).expect("mkdir");
    fs::write(settings_dir.join("settings.toml"), "[create]\nprovider = \"container\"\n").expect("write settings");

    fleet.fm().args(&["config", "list", "-o", "json"]).passes().stdout_has("create").stdout_has("provider").stdout_has("container");
}
