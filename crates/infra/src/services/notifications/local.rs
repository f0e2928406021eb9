use super::INotificationScheduler;
use crate::system::ISys;
use chrono::{offset::LocalResult, DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use medication_reminder_domain::{NotificationContent, NotificationId, NotificationRequest};
use medication_reminder_utils::create_notification_identifier;
use std::{collections::HashMap, sync::Arc, sync::Mutex};
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct DeliveredNotification {
    pub notification_id: NotificationId,
    pub content: NotificationContent,
    pub fired_at: DateTime<Utc>,
}

/// Notification scheduler running one tokio timer per registered notification.
///
/// `Trigger` times are wall clock times in `timezone`. Deliveries are logged
/// and broadcasted to everyone who subscribed.
pub struct LocalNotificationScheduler {
    timezone: Tz,
    sys: Arc<dyn ISys>,
    timers: Mutex<HashMap<NotificationId, JoinHandle<()>>>,
    deliveries: broadcast::Sender<DeliveredNotification>,
}

impl LocalNotificationScheduler {
    pub fn new(timezone: Tz, sys: Arc<dyn ISys>) -> Self {
        let (deliveries, _) = broadcast::channel(64);
        Self {
            timezone,
            sys,
            timers: Mutex::new(HashMap::new()),
            deliveries,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DeliveredNotification> {
        self.deliveries.subscribe()
    }
}

/// Resolves a wall clock time to an instant. Times skipped by a DST
/// transition fire one hour later, repeated times fire at the first instance.
fn resolve_local(timezone: &Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    match timezone.from_local_datetime(&local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.with_timezone(&Utc)),
        LocalResult::None => timezone
            .from_local_datetime(&(local + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

async fn run_timer(
    notification_id: NotificationId,
    request: NotificationRequest,
    timezone: Tz,
    mut now: DateTime<Utc>,
    first: NaiveDateTime,
    deliveries: broadcast::Sender<DeliveredNotification>,
) {
    let mut n = 0;
    while let Some(local) = request.trigger.occurrence(first, n) {
        n += 1;
        let fire_at = match resolve_local(&timezone, local) {
            Some(fire_at) if fire_at > now => fire_at,
            _ => continue,
        };
        if let Ok(wait) = (fire_at - now).to_std() {
            tokio::time::sleep(wait).await;
        }
        now = fire_at;

        info!(
            "Delivering notification {} at {}: {}",
            notification_id, fire_at, request.content.body
        );
        // Nobody listening is fine, the delivery is still logged
        let _ = deliveries.send(DeliveredNotification {
            notification_id: notification_id.clone(),
            content: request.content.clone(),
            fired_at: fire_at,
        });
    }
}

#[async_trait::async_trait]
impl INotificationScheduler for LocalNotificationScheduler {
    async fn register(&self, request: NotificationRequest) -> anyhow::Result<NotificationId> {
        let now = self.sys.now();
        let local_now = now.with_timezone(&self.timezone).naive_local();
        let first = request
            .trigger
            .first_occurrence_after(local_now)
            .ok_or_else(|| anyhow::anyhow!("Invalid trigger time: {:?}", request.trigger))?;

        let notification_id = NotificationId::new(create_notification_identifier());
        let timer = tokio::spawn(run_timer(
            notification_id.clone(),
            request,
            self.timezone,
            now,
            first,
            self.deliveries.clone(),
        ));
        self.timers
            .lock()
            .unwrap()
            .insert(notification_id.clone(), timer);

        info!("Scheduled notification {} first firing at {}", notification_id, first);
        Ok(notification_id)
    }

    async fn cancel(&self, notification_id: &NotificationId) -> anyhow::Result<()> {
        match self.timers.lock().unwrap().remove(notification_id) {
            Some(timer) => timer.abort(),
            None => warn!("Notification {} was not scheduled", notification_id),
        }
        Ok(())
    }

    async fn scheduled(&self) -> Vec<NotificationId> {
        let mut timers = self.timers.lock().unwrap();
        timers.retain(|_, timer| !timer.is_finished());
        timers.keys().cloned().collect()
    }
}
