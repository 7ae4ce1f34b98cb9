//! Behavioral specifications for the `fm` CLI.
//!
//! These tests are black-box: they invoke the `fm`/`fmd` binaries and
//! verify stdout, stderr, and exit codes against a real daemon.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// cli/
#[path = "specs/cli/help.rs"]
mod cli_help;
#[path = "specs/cli/output_formats.rs"]
mod cli_output_formats;

// fleet/
#[path = "specs/fleet/daemon_lifecycle.rs"]
mod fleet_daemon_lifecycle;
#[path = "specs/fleet/create_and_list.rs"]
mod fleet_create_and_list;
#[path = "specs/fleet/destroy.rs"]
mod fleet_destroy;
#[path = "specs/fleet/rename.rs"]
mod fleet_rename;
#[path = "specs/fleet/exec_and_message.rs"]
mod fleet_exec_and_message;
#[path = "specs/fleet/gc.rs"]
mod fleet_gc;

// config/
#[path = "specs/config/precedence.rs"]
mod config_precedence;
