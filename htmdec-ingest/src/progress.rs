//! Import progress reporting
//!
//! Progress is best-effort: reporting never fails observably and never
//! blocks the walk.

use chrono::Utc;
use htmdec_common::events::{EventBus, HtmdecEvent, ProgressStatus};
use htmdec_common::models::User;
use std::cell::Cell;
use tracing::debug;
use uuid::Uuid;

/// Receiver of human-readable progress messages
pub trait ProgressReporter {
    fn update(&self, message: &str);
}

/// Scoped progress tracker for one import call
///
/// Emits `ImportProgress` per update and exactly one terminal
/// `ImportFinished`, either from [`close`](Self::close) or on drop.
pub struct ProgressContext {
    id: Uuid,
    enabled: bool,
    title: String,
    user_id: Uuid,
    events: EventBus,
    current: Cell<u64>,
    closed: bool,
}

impl ProgressContext {
    /// Open a context; a disabled context counts but emits nothing
    pub fn open(enabled: bool, title: impl Into<String>, user: &User, events: EventBus) -> Self {
        Self {
            id: Uuid::new_v4(),
            enabled,
            title: title.into(),
            user_id: user.id,
            events,
            current: Cell::new(0),
            closed: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Entries reported so far
    pub fn current(&self) -> u64 {
        self.current.get()
    }

    /// Emit the terminal update
    pub fn close(mut self, success: bool) {
        let status = if success {
            ProgressStatus::Success
        } else {
            ProgressStatus::Error
        };
        self.finish(status);
    }

    fn finish(&mut self, status: ProgressStatus) {
        if self.closed {
            return;
        }
        self.closed = true;
        debug!(progress_id = %self.id, title = %self.title, ?status, current = self.current.get(), "Progress closed");
        if self.enabled {
            self.events.emit_lossy(HtmdecEvent::ImportFinished {
                progress_id: self.id,
                title: self.title.clone(),
                user_id: self.user_id,
                status,
                current: self.current.get(),
                timestamp: Utc::now(),
            });
        }
    }
}

impl ProgressReporter for ProgressContext {
    fn update(&self, message: &str) {
        let current = self.current.get() + 1;
        self.current.set(current);
        if self.enabled {
            self.events.emit_lossy(HtmdecEvent::ImportProgress {
                progress_id: self.id,
                title: self.title.clone(),
                user_id: self.user_id,
                message: message.to_string(),
                current,
                timestamp: Utc::now(),
            });
        }
    }
}

impl Drop for ProgressContext {
    fn drop(&mut self) {
        // left open means the import bailed out before close()
        self.finish(ProgressStatus::Error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<HtmdecEvent>) -> Vec<HtmdecEvent> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[test]
    fn test_updates_then_single_terminal_event() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let user = User::new("tester");

        let ctx = ProgressContext::open(true, "pdv data import", &user, bus.clone());
        ctx.update("a.dat");
        ctx.update("b.dat");
        ctx.close(true);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 3);
        assert!(matches!(
            &events[1],
            HtmdecEvent::ImportProgress { message, current: 2, .. } if message == "b.dat"
        ));
        assert!(matches!(
            events[2],
            HtmdecEvent::ImportFinished { status: ProgressStatus::Success, current: 2, .. }
        ));
    }

    #[test]
    fn test_drop_without_close_reports_error() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let user = User::new("tester");

        {
            let ctx = ProgressContext::open(true, "sem data import", &user, bus.clone());
            ctx.update("x.tif");
        }

        let events = drain(&mut rx);
        assert!(matches!(
            events.last(),
            Some(HtmdecEvent::ImportFinished { status: ProgressStatus::Error, .. })
        ));
    }

    #[test]
    fn test_disabled_context_counts_silently() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let user = User::new("tester");

        let ctx = ProgressContext::open(false, "pdv data import", &user, bus.clone());
        ctx.update("a.dat");
        assert_eq!(ctx.current(), 1);
        ctx.close(true);

        assert!(drain(&mut rx).is_empty());
    }
}
