use medication_reminder_domain::{NotificationContent, NotificationId, NotificationRequest, Trigger};
use medication_reminder_infra::notifications::INotificationScheduler;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Notification registration failed after {} successful registrations. Error message: {error}", .registered.len())]
    RegistrationFailed {
        /// Registered earlier in the same call, still live in the scheduler
        registered: Vec<NotificationId>,
        error: anyhow::Error,
    },
}

/// Cancels every notification in `ids`, in order. A failed cancellation is logged and skipped.
pub async fn cancel_all(ids: &[NotificationId], scheduler: &dyn INotificationScheduler) {
    for id in ids {
        if let Err(e) = scheduler.cancel(id).await {
            warn!("Unable to cancel notification {}. Error: {:?}", id, e);
        }
    }
}

/// Replaces the notifications in `old_ids` with one notification per `Trigger`.
///
/// All the old notifications are cancelled before the first registration.
/// The returned identifiers are in the same order as `triggers`.
pub async fn reconcile(
    old_ids: &[NotificationId],
    triggers: Vec<Trigger>,
    content: &NotificationContent,
    scheduler: &dyn INotificationScheduler,
) -> Result<Vec<NotificationId>, ReconcileError> {
    cancel_all(old_ids, scheduler).await;

    let mut registered = Vec::with_capacity(triggers.len());
    for trigger in triggers {
        let request = NotificationRequest {
            content: content.clone(),
            trigger,
        };
        match scheduler.register(request).await {
            Ok(id) => registered.push(id),
            Err(e) => {
                error!(
                    "Unable to register notification for trigger {:?}. Error: {:?}",
                    trigger, e
                );
                return Err(ReconcileError::RegistrationFailed {
                    registered,
                    error: e,
                });
            }
        }
    }

    Ok(registered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use medication_reminder_domain::{derive_triggers, NotificationData, ScheduleLabel};
    use medication_reminder_infra::notifications::{InMemoryNotificationScheduler, SchedulerCall};

    fn content() -> NotificationContent {
        let date = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap();
        NotificationContent {
            title: "Hi there, time to take your medication.".into(),
            body: "Ibuprofen - 200mg Tablet".into(),
            data: NotificationData {
                start_date: date,
                end_date: date,
            },
        }
    }

    fn time(hour: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn registers_every_trigger_without_cancelling_when_nothing_was_scheduled() {
        let scheduler = InMemoryNotificationScheduler::new();
        let triggers =
            derive_triggers(ScheduleLabel::ThreeTimesADay, &[time(8), time(14), time(20)])
                .unwrap();

        let ids = reconcile(&[], triggers.clone(), &content(), &scheduler)
            .await
            .unwrap();

        assert_eq!(ids.len(), 3);
        assert_eq!(
            scheduler.calls(),
            triggers
                .into_iter()
                .map(SchedulerCall::Register)
                .collect::<Vec<_>>()
        );
        assert_eq!(scheduler.request(&ids[1]).unwrap().trigger.hour, 14);
    }

    #[tokio::test]
    async fn cancels_before_registering() {
        let scheduler = InMemoryNotificationScheduler::new();
        let old_ids = reconcile(
            &[],
            derive_triggers(ScheduleLabel::TwiceADay, &[time(8), time(20)]).unwrap(),
            &content(),
            &scheduler,
        )
        .await
        .unwrap();
        scheduler.clear_calls();

        let new_ids = reconcile(
            &old_ids,
            derive_triggers(ScheduleLabel::TwiceADay, &[time(9), time(21)]).unwrap(),
            &content(),
            &scheduler,
        )
        .await
        .unwrap();

        let calls = scheduler.calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(
            calls[..2],
            [
                SchedulerCall::Cancel(old_ids[0].clone()),
                SchedulerCall::Cancel(old_ids[1].clone())
            ]
        );
        assert!(calls[2..]
            .iter()
            .all(|call| matches!(call, SchedulerCall::Register(_))));
        assert_eq!(scheduler.scheduled().await, new_ids);
    }

    #[tokio::test]
    async fn empty_trigger_list_only_cancels() {
        let scheduler = InMemoryNotificationScheduler::new();
        let old_ids = reconcile(
            &[],
            derive_triggers(ScheduleLabel::OnceADay, &[time(8)]).unwrap(),
            &content(),
            &scheduler,
        )
        .await
        .unwrap();
        scheduler.clear_calls();

        let ids = reconcile(&old_ids, Vec::new(), &content(), &scheduler)
            .await
            .unwrap();
        assert!(ids.is_empty());
        assert_eq!(
            scheduler.calls(),
            vec![SchedulerCall::Cancel(old_ids[0].clone())]
        );
    }

    #[tokio::test]
    async fn failed_cancellations_do_not_stop_reconciliation() {
        let scheduler = InMemoryNotificationScheduler::new();
        scheduler.fail_cancellations(true);

        let ids = reconcile(
            &[NotificationId::new("stale")],
            derive_triggers(ScheduleLabel::OnceADay, &[time(8)]).unwrap(),
            &content(),
            &scheduler,
        )
        .await
        .unwrap();
        assert_eq!(ids.len(), 1);
    }

    #[tokio::test]
    async fn failed_registration_reports_what_was_registered() {
        let scheduler = InMemoryNotificationScheduler::new();
        scheduler.fail_registrations_after(2);

        let res = reconcile(
            &[],
            derive_triggers(
                ScheduleLabel::FourTimesADay,
                &[time(6), time(12), time(18), time(22)],
            )
            .unwrap(),
            &content(),
            &scheduler,
        )
        .await;

        match res {
            Err(ReconcileError::RegistrationFailed { registered, .. }) => {
                assert_eq!(registered.len(), 2);
                assert_eq!(scheduler.scheduled().await, registered);
            }
            Ok(_) => panic!("Expected registration to fail"),
        }
        // The remaining registration is not attempted
        assert_eq!(scheduler.calls().len(), 3);
    }
}
