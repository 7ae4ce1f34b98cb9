// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Property tests: every `Query`/`Request`/`Response` that round-trips
//! through JSON must come back byte-for-byte equal in structure.

use fm_core::test_support::strategies::{arb_agent_status, arb_host_status};
use proptest::prelude::*;

use crate::{Query, Request};

proptest! {
    #[test]
    fn list_agents_host_filter_round_trips(host_id in "[a-z0-9-]{0,20}") {
        let query = Query::ListAgents { host_id: Some(host_id) };
        let json = serde_json::to_string(&query).unwrap();
        let back: Query = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(query, back);
    }

    #[test]
    fn get_host_logs_round_trips(id in "[a-z0-9-]{1,20}", lines in 0usize..10_000, offset in 0u64..1_000_000) {
        let query = Query::GetHostLogs { id, lines, offset };
        let json = serde_json::to_string(&query).unwrap();
        let back: Query = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(query, back);
    }

    #[test]
    fn agent_kill_request_round_trips(id in "[a-z0-9-]{1,20}") {
        let request = Request::DestroyAgent { id, force: false };
        let json = serde_json::to_string(&request).unwrap();
        let back: Request = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(request, back);
    }
}

proptest! {
    #[test]
    fn agent_status_serializes_to_known_variant(status in arb_agent_status()) {
        let json = serde_json::to_string(&status).unwrap();
        let back: fm_core::AgentStatus = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(status, back);
    }

    #[test]
    fn host_status_serializes_to_known_variant(status in arb_host_status()) {
        let json = serde_json::to_string(&status).unwrap();
        let back: fm_core::HostStatus = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(status, back);
    }
}
