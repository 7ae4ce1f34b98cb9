// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! fm-storage: the on-disk state store (C2, §4.2).
//!
//! Layout rooted at a configurable directory (spec §6):
//!
//! ```text
//! <root>/
//!   profiles/<profile-id>/settings.toml
//!   hosts/<host-id>/
//!     data.json
//!     lock
//!     logs/
//!     activity/{user,agent,ssh,create,boot}
//!     agents/<agent-id>/
//!       data.json
//!       work_dir/
//!       logs/
//! ```
//!
//! Grounded on the teacher's `daemon/src/storage/state/*` "derive the view,
//! persist atomically" discipline, restructured around spec §4.2's three
//! guarantees (atomic descriptor update, mutual exclusion, crash recovery)
//! instead of WAL replay: `data.json` is the unit of truth here, not an
//! event log.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod activity;
pub mod atomic;
pub mod layout;
pub mod lock;
pub mod store;
pub mod tombstone;

pub use activity::ActivityStore;
pub use layout::Layout;
pub use lock::{HostLockGuard, LockTable};
pub use store::{StateStore, StoreError};
pub use tombstone::TombstoneSweeper;
