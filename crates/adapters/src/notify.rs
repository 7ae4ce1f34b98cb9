// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Desktop notification side-channel. Distinct from the Messaging Adapter
//! (C10, §4.10), which speaks into an agent's session via `send_keys`; this
//! one speaks to the operator's own desktop, surfacing events (idle-stop,
//! gc summary, provisioning failure) the operator would otherwise have to
//! poll for. Kept close to the teacher's own `notify.rs`.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("send failed: {0}")]
    SendFailed(String),
}

#[async_trait]
pub trait NotifyAdapter: Clone + Send + Sync + 'static {
    /// Send a notification with a title and message body.
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError>;
}

/// Desktop notification adapter using notify-rust.
///
/// On macOS, `notify-rust` uses `mac-notification-sys` (Cocoa bindings) to
/// send notifications via the Notification Center. The first notification
/// triggers `ensure_application_set()`, which runs an AppleScript to look
/// up a bundle identifier; in a daemon without Automation permissions that
/// AppleScript blocks forever. The bundle identifier is pre-set at
/// construction time to bypass the lookup entirely.
#[derive(Clone, Copy, Debug, Default)]
pub struct DesktopNotifyAdapter;

impl DesktopNotifyAdapter {
    pub fn new() -> Self {
        #[cfg(target_os = "macos")]
        {
            let _ = mac_notification_sys::set_application("com.apple.Terminal");
        }
        Self
    }
}

#[async_trait]
impl NotifyAdapter for DesktopNotifyAdapter {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        let title = title.to_string();
        let message = message.to_string();
        // notify_rust's show() is synchronous on macOS; fire-and-forget on
        // tokio's bounded blocking pool so fmd's event loop never stalls on it.
        tokio::task::spawn_blocking(move || {
            tracing::info!(%title, %message, "sending desktop notification");
            match notify_rust::Notification::new().summary(&title).body(&message).show() {
                Ok(_) => tracing::info!(%title, "desktop notification sent"),
                Err(e) => tracing::warn!(%title, error = %e, "desktop notification failed"),
            }
        });
        Ok(())
    }
}

/// Never sends anything; used where notifications are configured off or
/// unsupported on the host platform.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifyAdapter;

impl NoopNotifyAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotifyAdapter for NoopNotifyAdapter {
    async fn notify(&self, _title: &str, _message: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use std::sync::Arc;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::{NotifyAdapter, NotifyError};

    #[derive(Debug, Clone)]
    pub struct NotifyCall {
        pub title: String,
        pub message: String,
    }

    struct FakeNotifyState {
        calls: Vec<NotifyCall>,
    }

    /// In-memory recorder standing in for a desktop notifier in tests.
    #[derive(Clone)]
    pub struct FakeNotifyAdapter {
        inner: Arc<Mutex<FakeNotifyState>>,
    }

    impl Default for FakeNotifyAdapter {
        fn default() -> Self {
            Self { inner: Arc::new(Mutex::new(FakeNotifyState { calls: Vec::new() })) }
        }
    }

    impl FakeNotifyAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<NotifyCall> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl NotifyAdapter for FakeNotifyAdapter {
        async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
            self.inner.lock().calls.push(NotifyCall { title: title.to_string(), message: message.to_string() });
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeNotifyAdapter, NotifyCall};

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_notify_returns_ok() {
        let adapter = NoopNotifyAdapter::new();
        assert!(adapter.notify("title", "message").await.is_ok());
    }

    #[tokio::test]
    async fn fake_notify_records_calls() {
        let adapter = FakeNotifyAdapter::new();
        adapter.notify("idle", "host h1 stopped").await.unwrap();
        let calls = adapter.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].title, "idle");
        assert_eq!(calls[0].message, "host h1 stopped");
    }
}
