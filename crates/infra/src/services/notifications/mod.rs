mod inmemory;
mod local;

pub use inmemory::{InMemoryNotificationScheduler, SchedulerCall};
pub use local::{DeliveredNotification, LocalNotificationScheduler};
use medication_reminder_domain::{NotificationId, NotificationRequest};

/// The platform service that fires notifications at their `Trigger` times
#[async_trait::async_trait]
pub trait INotificationScheduler: Send + Sync {
    async fn register(&self, request: NotificationRequest) -> anyhow::Result<NotificationId>;
    /// Cancelling an unknown or already cancelled notification is not an error
    async fn cancel(&self, notification_id: &NotificationId) -> anyhow::Result<()>;
    /// Identifiers of all notifications that are still going to fire
    async fn scheduled(&self) -> Vec<NotificationId>;
}
