use super::INotificationScheduler;
use medication_reminder_domain::{NotificationId, NotificationRequest, Trigger};
use medication_reminder_utils::create_notification_identifier;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerCall {
    Register(Trigger),
    Cancel(NotificationId),
}

/// Notification scheduler that only keeps track of what it has been asked to do.
/// Every call is recorded so that the order of calls can be inspected.
pub struct InMemoryNotificationScheduler {
    scheduled: Mutex<Vec<(NotificationId, NotificationRequest)>>,
    calls: Mutex<Vec<SchedulerCall>>,
    registrations_before_failure: Mutex<Option<usize>>,
    fail_cancellations: AtomicBool,
}

impl InMemoryNotificationScheduler {
    pub fn new() -> Self {
        Self {
            scheduled: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            registrations_before_failure: Mutex::new(None),
            fail_cancellations: AtomicBool::new(false),
        }
    }

    /// Lets the next `count` registrations succeed and rejects every one after that
    pub fn fail_registrations_after(&self, count: usize) {
        *self.registrations_before_failure.lock().unwrap() = Some(count);
    }

    pub fn accept_all_registrations(&self) {
        *self.registrations_before_failure.lock().unwrap() = None;
    }

    pub fn fail_cancellations(&self, fail: bool) {
        self.fail_cancellations.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<SchedulerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn request(&self, notification_id: &NotificationId) -> Option<NotificationRequest> {
        self.scheduled
            .lock()
            .unwrap()
            .iter()
            .find(|(id, _)| id == notification_id)
            .map(|(_, request)| request.clone())
    }
}

impl Default for InMemoryNotificationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl INotificationScheduler for InMemoryNotificationScheduler {
    async fn register(&self, request: NotificationRequest) -> anyhow::Result<NotificationId> {
        self.calls
            .lock()
            .unwrap()
            .push(SchedulerCall::Register(request.trigger));

        if let Some(remaining) = self.registrations_before_failure.lock().unwrap().as_mut() {
            if *remaining == 0 {
                anyhow::bail!("Notification scheduler rejected the trigger");
            }
            *remaining -= 1;
        }

        let notification_id = NotificationId::new(create_notification_identifier());
        self.scheduled
            .lock()
            .unwrap()
            .push((notification_id.clone(), request));
        Ok(notification_id)
    }

    async fn cancel(&self, notification_id: &NotificationId) -> anyhow::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(SchedulerCall::Cancel(notification_id.clone()));

        if self.fail_cancellations.load(Ordering::SeqCst) {
            anyhow::bail!("Notification scheduler is unavailable");
        }
        self.scheduled
            .lock()
            .unwrap()
            .retain(|(id, _)| id != notification_id);
        Ok(())
    }

    async fn scheduled(&self) -> Vec<NotificationId> {
        self.scheduled
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use medication_reminder_domain::{NotificationContent, NotificationData};

    fn request(hour: u32) -> NotificationRequest {
        let date = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap();
        NotificationRequest {
            content: NotificationContent {
                title: "title".into(),
                body: "body".into(),
                data: NotificationData {
                    start_date: date,
                    end_date: date,
                },
            },
            trigger: Trigger::daily_at(NaiveTime::from_hms_opt(hour, 0, 0).unwrap()),
        }
    }

    #[tokio::test]
    async fn registers_and_cancels() {
        let scheduler = InMemoryNotificationScheduler::new();
        let first = scheduler.register(request(8)).await.unwrap();
        let second = scheduler.register(request(20)).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(scheduler.scheduled().await, vec![first.clone(), second.clone()]);
        assert_eq!(scheduler.request(&second).unwrap().trigger.hour, 20);

        assert!(scheduler.cancel(&first).await.is_ok());
        assert!(scheduler.cancel(&first).await.is_ok());
        assert!(scheduler
            .cancel(&NotificationId::new("unknown"))
            .await
            .is_ok());
        assert_eq!(scheduler.scheduled().await, vec![second]);
        assert_eq!(scheduler.calls().len(), 5);
    }

    #[tokio::test]
    async fn injects_failures() {
        let scheduler = InMemoryNotificationScheduler::new();
        scheduler.fail_registrations_after(1);
        let registered = scheduler.register(request(8)).await.unwrap();
        assert!(scheduler.register(request(9)).await.is_err());
        assert!(scheduler.register(request(10)).await.is_err());

        scheduler.fail_cancellations(true);
        assert!(scheduler.cancel(&registered).await.is_err());
        assert_eq!(scheduler.scheduled().await, vec![registered]);
    }
}
