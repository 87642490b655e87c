//! services/admin_client/src/ui/notifications.rs
//!
//! The single-slot toast channel. Any controller may push; a new notification
//! replaces the visible one and restarts the auto-dismiss timer.

use inventory_admin_core::domain::{Notification, Severity};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Default)]
struct Slot {
    current: Option<Notification>,
    /// Cancels the auto-dismiss timer of `current`.
    timer: Option<CancellationToken>,
}

pub struct NotificationChannel {
    slot: Arc<Mutex<Slot>>,
    events: broadcast::Sender<Notification>,
    duration: Duration,
}

impl NotificationChannel {
    pub fn new(duration: Duration) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            events,
            duration,
        }
    }

    /// Shows `message`, replacing whatever is visible. Returns the new id.
    pub fn push(&self, message: impl Into<String>, severity: Severity) -> Uuid {
        let notification = Notification::new(message, severity);
        let id = notification.id;
        let token = CancellationToken::new();

        {
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(previous) = slot.timer.replace(token.clone()) {
                previous.cancel();
            }
            slot.current = Some(notification.clone());
        }
        debug!(%id, ?severity, "Notification shown");

        // Nobody listening is fine; the slot still holds the notification.
        let _ = self.events.send(notification);
        self.schedule_dismiss(id, token);
        id
    }

    pub fn info(&self, message: impl Into<String>) -> Uuid {
        self.push(message, Severity::Info)
    }

    pub fn success(&self, message: impl Into<String>) -> Uuid {
        self.push(message, Severity::Success)
    }

    pub fn warning(&self, message: impl Into<String>) -> Uuid {
        self.push(message, Severity::Warning)
    }

    pub fn error(&self, message: impl Into<String>) -> Uuid {
        self.push(message, Severity::Error)
    }

    /// Hides the visible notification, if any.
    pub fn dismiss(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = slot.timer.take() {
            timer.cancel();
        }
        slot.current = None;
    }

    pub fn current(&self) -> Option<Notification> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current
            .clone()
    }

    /// Every pushed notification, in order, for renderers.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.events.subscribe()
    }

    fn schedule_dismiss(&self, id: Uuid, token: CancellationToken) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(%id, "No async runtime; notification will not auto-dismiss");
            return;
        };
        let slot = Arc::clone(&self.slot);
        let duration = self.duration;
        handle.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(duration) => {
                    let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
                    if slot.current.as_ref().is_some_and(|n| n.id == id) {
                        slot.current = None;
                        slot.timer = None;
                        debug!(%id, "Notification expired");
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_millis(3000);

    #[tokio::test(start_paused = true)]
    async fn notification_expires_after_the_fixed_duration() {
        let channel = NotificationChannel::new(TTL);
        channel.error("boom");

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert_eq!(channel.current().map(|n| n.message), Some("boom".to_string()));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(channel.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn newer_notification_replaces_and_restarts_the_timer() {
        let channel = NotificationChannel::new(TTL);
        channel.info("first");
        tokio::time::sleep(Duration::from_millis(2000)).await;
        let second = channel.success("second");

        // The first timer would have fired here.
        tokio::time::sleep(Duration::from_millis(1500)).await;
        let current = channel.current().unwrap();
        assert_eq!(current.id, second);
        assert_eq!(current.severity, Severity::Success);

        tokio::time::sleep(Duration::from_millis(1600)).await;
        assert!(channel.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dismiss_hides_immediately() {
        let channel = NotificationChannel::new(TTL);
        channel.warning("careful");
        channel.dismiss();
        assert!(channel.current().is_none());
    }

    #[tokio::test]
    async fn subscribers_see_every_push() {
        let channel = NotificationChannel::new(TTL);
        let mut events = channel.subscribe();
        channel.info("one");
        channel.error("two");

        assert_eq!(events.try_recv().unwrap().message, "one");
        assert_eq!(events.try_recv().unwrap().message, "two");
        assert!(events.try_recv().is_err());
    }
}
