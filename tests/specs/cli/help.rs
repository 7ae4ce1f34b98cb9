//! CLI help output specs.

use crate::prelude::*;

#[test]
fn fm_no_args_fails_with_usage() {
    cli().fails().stderr_has("Usage:");
}

#[test]
fn fm_help_shows_usage() {
    cli().args(&["--help"]).passes().stdout_has("Usage:");
}

#[test]
fn fm_help_lists_primary_commands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("create")
        .stdout_has("connect")
        .stdout_has("list")
        .stdout_has("destroy")
        .stdout_has("exec");
}

#[test]
fn fm_create_help_shows_usage() {
    cli().args(&["create", "--help"]).passes().stdout_has("Usage:");
}

#[test]
fn fm_daemon_help_shows_subcommands() {
    cli()
        .args(&["daemon", "--help"])
        .passes()
        .stdout_has("start")
        .stdout_has("stop")
        .stdout_has("status");
}

#[test]
fn fm_version_exits_zero() {
    cli().args(&["--version"]).passes();
}
