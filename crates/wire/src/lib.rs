// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol for CLI<->daemon communication.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod query;
mod request;
mod response;
mod status;
mod types;
mod wire;

pub use query::Query;
pub use request::{GcCategory, OnError, Request};
pub use response::{MessageTargetResult, Response};
pub use status::FleetStatusEntry;
pub use types::{
    AgentDetail, AgentSummary, HostDetail, HostSummary, ProvisionRunSummary, ProvisionStepSummary,
};
pub use wire::{
    decode, encode, read_message, read_request, write_message, write_response, ProtocolError,
    DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE, PROTOCOL_VERSION,
};

#[cfg(test)]
mod property_tests;
