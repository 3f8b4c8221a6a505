//! Context-menu button adapter.
//!
//! Models the per-button lifecycle the plugin drives in the host UI:
//! `Idle -> Sending -> Success | Failed -> Idle`, with a revert timer that
//! returns the label to its idle text. The timer is an explicit deadline
//! owned by the button and cancelled when a new click arrives, instead of a
//! fire-and-forget callback.

use std::time::{Duration, Instant};

use crate::config::ServerConfig;
use crate::error::SendError;
use crate::models::{DownloadRequest, MediaKind};
use crate::tidarr::{Ack, Dispatch};

/// How long a Success/Failed label stays before reverting to Idle.
pub const REVERT_DELAY: Duration = Duration::from_secs(3);

const SENDING_LABEL: &str = "Sending to Tidarr...";
const FAILED_LABEL: &str = "Failed to send to Tidarr";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Idle,
    Sending,
    Success,
    Failed,
}

#[derive(Debug)]
pub struct MenuButton {
    idle_label: String,
    state: ButtonState,
    label: String,
    revert_at: Option<Instant>,
}

impl MenuButton {
    pub fn new(idle_label: impl Into<String>) -> Self {
        let idle_label = idle_label.into();
        Self {
            label: idle_label.clone(),
            idle_label,
            state: ButtonState::Idle,
            revert_at: None,
        }
    }

    /// Button labeled for a planned set of requests.
    pub fn for_requests(requests: &[DownloadRequest]) -> Self {
        Self::new(idle_label_for(requests))
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Clicks are only accepted outside `Sending`.
    pub fn is_enabled(&self) -> bool {
        self.state != ButtonState::Sending
    }

    /// Start a send. Returns false (and does nothing) while one is already
    /// in flight, so a double click cannot submit twice. A click landing on
    /// a Success/Failed label cancels the pending revert.
    pub fn begin_send(&mut self) -> bool {
        if self.state == ButtonState::Sending {
            return false;
        }
        self.revert_at = None;
        self.state = ButtonState::Sending;
        self.label = SENDING_LABEL.to_string();
        true
    }

    /// Progress text for multi-item sends.
    pub fn progress(&mut self, done: usize, total: usize) {
        if self.state == ButtonState::Sending && total > 1 {
            self.label = format!("Sending {done} of {total} to Tidarr...");
        }
    }

    /// Record the outcome of a finished send and arm the revert timer.
    pub fn complete(&mut self, requests: &[DownloadRequest], sent: usize, now: Instant) {
        if sent == 0 {
            self.state = ButtonState::Failed;
            self.label = FAILED_LABEL.to_string();
        } else {
            self.state = ButtonState::Success;
            self.label = success_label(requests, sent);
        }
        self.revert_at = Some(now + REVERT_DELAY);
    }

    /// Advance the revert timer. Call with the current time; once the
    /// deadline passes, the button falls back to its idle label.
    pub fn tick(&mut self, now: Instant) {
        if let Some(deadline) = self.revert_at {
            if now >= deadline {
                self.revert_at = None;
                self.state = ButtonState::Idle;
                self.label = self.idle_label.clone();
            }
        }
    }

    /// Full click handling: run every request sequentially through the
    /// dispatcher and land in Success or Failed. Ignored while `Sending`.
    pub fn click<D: Dispatch>(
        &mut self,
        dispatch: &D,
        requests: &[DownloadRequest],
        server: &ServerConfig,
        mut observer: impl FnMut(usize, &DownloadRequest, &Result<Ack, SendError>),
    ) -> Vec<Result<Ack, SendError>> {
        if !self.begin_send() {
            return Vec::new();
        }

        let mut results = Vec::with_capacity(requests.len());
        for (index, request) in requests.iter().enumerate() {
            self.progress(index + 1, requests.len());
            let result = dispatch.dispatch(request, server);
            if let Err(err) = &result {
                log::warn!("failed to send \"{}\": {err}", request.title);
            }
            observer(index, request, &result);
            results.push(result);
        }

        let sent = results.iter().filter(|r| r.is_ok()).count();
        self.complete(requests, sent, Instant::now());
        results
    }
}

/// Idle label derived from what the click would send.
pub fn idle_label_for(requests: &[DownloadRequest]) -> String {
    match requests {
        [single] if single.kind == MediaKind::Album => "Send album to Tidarr".to_string(),
        other => format!("Send {} track(s) to Tidarr", other.len()),
    }
}

fn success_label(requests: &[DownloadRequest], sent: usize) -> String {
    match requests {
        [single] if single.kind == MediaKind::Album => "Sent album to Tidarr!".to_string(),
        _ => format!("Sent {sent} item(s) to Tidarr!"),
    }
}
