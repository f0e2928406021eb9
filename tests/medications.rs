mod helpers;

use helpers::{
    setup::{spawn_app, spawn_app_signed_out},
    utils::{details, time},
};
use medication_reminder_api::MedReminderError;
use medication_reminder_domain::{Recurrence, ScheduleLabel, Trigger, ID, NOTIFICATION_TITLE};
use medication_reminder_infra::{
    identity::IIdentityProvider,
    notifications::{INotificationScheduler, SchedulerCall},
    IMedicationRepo,
};

#[tokio::test]
async fn test_twice_a_day_edit_replaces_notifications() {
    let mut t = spawn_app().await;

    let med = t
        .app
        .add_medication(details(
            "Ibuprofen",
            ScheduleLabel::TwiceADay,
            vec![time(8, 0), time(20, 0)],
        ))
        .await
        .unwrap();
    assert_eq!(med.notification_ids.len(), 2);
    assert_eq!(
        t.notifications.calls(),
        vec![
            SchedulerCall::Register(Trigger::daily_at(time(8, 0))),
            SchedulerCall::Register(Trigger::daily_at(time(20, 0))),
        ]
    );
    t.notifications.clear_calls();

    let updated = t
        .app
        .update_medication(
            med.id,
            details(
                "Ibuprofen",
                ScheduleLabel::TwiceADay,
                vec![time(9, 0), time(21, 0)],
            ),
        )
        .await
        .unwrap();

    assert_eq!(
        t.notifications.calls(),
        vec![
            SchedulerCall::Cancel(med.notification_ids[0].clone()),
            SchedulerCall::Cancel(med.notification_ids[1].clone()),
            SchedulerCall::Register(Trigger::daily_at(time(9, 0))),
            SchedulerCall::Register(Trigger::daily_at(time(21, 0))),
        ]
    );
    assert_eq!(updated.notification_ids.len(), 2);
    assert_eq!(t.notifications.scheduled().await, updated.notification_ids);

    // The stored record carries the new notifications
    let owner = t.identity.current_owner().unwrap();
    let stored = t.repo.find_by_owner(&owner).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].notification_ids, updated.notification_ids);
    assert_eq!(t.app.medications(), &[updated]);
}

#[tokio::test]
async fn test_as_needed_medication_has_no_notifications() {
    let mut t = spawn_app().await;

    let med = t
        .app
        .add_medication(details(
            "Antihistamine",
            ScheduleLabel::AsNeeded,
            vec![time(8, 0)],
        ))
        .await
        .unwrap();

    assert!(med.notification_ids.is_empty());
    assert!(med.times_of_day.is_empty());
    assert!(t.notifications.calls().is_empty());
    assert_eq!(t.app.medications().len(), 1);
}

#[tokio::test]
async fn test_notification_payload() {
    let mut t = spawn_app().await;

    let med = t
        .app
        .add_medication(details(
            "Ibuprofen",
            ScheduleLabel::OnceADay,
            vec![time(8, 30)],
        ))
        .await
        .unwrap();

    let request = t.notifications.request(&med.notification_ids[0]).unwrap();
    assert_eq!(request.content.title, NOTIFICATION_TITLE);
    assert_eq!(request.content.body, "Ibuprofen - 200mg Tablet");
    assert_eq!(request.content.data.start_date, med.start_date);
    assert_eq!(request.content.data.end_date, med.end_date);
    assert_eq!(request.trigger.hour, 8);
    assert_eq!(request.trigger.minute, 30);
    assert!(request.trigger.repeats);
}

#[tokio::test]
async fn test_interval_schedule_is_anchored_to_the_first_time() {
    let mut t = spawn_app().await;

    let med = t
        .app
        .add_medication(details(
            "Vitamin D",
            ScheduleLabel::EveryThreeDays,
            vec![time(7, 15), time(19, 0)],
        ))
        .await
        .unwrap();

    assert_eq!(med.times_of_day, vec![time(7, 15)]);
    assert_eq!(
        t.notifications.calls(),
        vec![SchedulerCall::Register(Trigger::recurring_at(
            time(7, 15),
            Recurrence::every_n_days(3)
        ))]
    );
}

#[tokio::test]
async fn test_too_few_times_is_invalid_schedule_input() {
    let mut t = spawn_app().await;

    let res = t
        .app
        .add_medication(details(
            "Ibuprofen",
            ScheduleLabel::ThreeTimesADay,
            vec![time(8, 0), time(14, 0)],
        ))
        .await;

    assert!(matches!(res, Err(MedReminderError::InvalidScheduleInput(_))));
    assert!(t.notifications.calls().is_empty());
    assert!(t.app.medications().is_empty());
}

#[tokio::test]
async fn test_failed_create_cancels_the_new_notifications() {
    let mut t = spawn_app().await;
    t.repo.set_unavailable(true);

    let res = t
        .app
        .add_medication(details(
            "Ibuprofen",
            ScheduleLabel::TwiceADay,
            vec![time(8, 0), time(20, 0)],
        ))
        .await;

    assert_eq!(res, Err(MedReminderError::StorageError));
    assert!(t.app.medications().is_empty());
    assert!(t.notifications.scheduled().await.is_empty());
}

#[tokio::test]
async fn test_failed_registration_cancels_partial_registrations() {
    let mut t = spawn_app().await;
    t.notifications.fail_registrations_after(2);

    let res = t
        .app
        .add_medication(details(
            "Ibuprofen",
            ScheduleLabel::FourTimesADay,
            vec![time(6, 0), time(12, 0), time(18, 0), time(22, 0)],
        ))
        .await;

    assert!(matches!(
        res,
        Err(MedReminderError::SchedulerRegistrationFailed(_))
    ));
    assert!(t.app.medications().is_empty());
    assert!(t.notifications.scheduled().await.is_empty());
    let owner = t.identity.current_owner().unwrap();
    assert!(t.repo.find_by_owner(&owner).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_edit_without_schedule_change_keeps_notifications() {
    let mut t = spawn_app().await;
    let med = t
        .app
        .add_medication(details(
            "Ibuprofen",
            ScheduleLabel::OnceADay,
            vec![time(8, 0)],
        ))
        .await
        .unwrap();
    t.notifications.clear_calls();

    let mut new_details = details("Ibuprofen forte", ScheduleLabel::OnceADay, vec![time(8, 0)]);
    new_details.dose = "400mg".into();
    let updated = t.app.update_medication(med.id, new_details).await.unwrap();

    assert!(t.notifications.calls().is_empty());
    assert_eq!(updated.notification_ids, med.notification_ids);
    assert_eq!(updated.name, "Ibuprofen forte");
    assert_eq!(t.app.medications()[0].dose, "400mg");
}

#[tokio::test]
async fn test_edit_to_as_needed_cancels_everything() {
    let mut t = spawn_app().await;
    let med = t
        .app
        .add_medication(details(
            "Ibuprofen",
            ScheduleLabel::TwiceADay,
            vec![time(8, 0), time(20, 0)],
        ))
        .await
        .unwrap();

    let updated = t
        .app
        .update_medication(med.id, details("Ibuprofen", ScheduleLabel::AsNeeded, vec![]))
        .await
        .unwrap();

    assert!(updated.notification_ids.is_empty());
    assert!(t.notifications.scheduled().await.is_empty());
}

#[tokio::test]
async fn test_invalid_edit_leaves_the_record_untouched() {
    let mut t = spawn_app().await;
    let med = t
        .app
        .add_medication(details(
            "Ibuprofen",
            ScheduleLabel::OnceADay,
            vec![time(8, 0)],
        ))
        .await
        .unwrap();
    t.notifications.clear_calls();

    let res = t
        .app
        .update_medication(med.id, details("Ibuprofen", ScheduleLabel::TwiceADay, vec![time(8, 0)]))
        .await;

    assert!(matches!(res, Err(MedReminderError::InvalidScheduleInput(_))));
    assert!(t.notifications.calls().is_empty());
    assert_eq!(t.app.medications(), &[med]);
}

#[tokio::test]
async fn test_update_unknown_medication_is_not_found() {
    let mut t = spawn_app().await;

    let res = t
        .app
        .update_medication(ID::new(), details("Ibuprofen", ScheduleLabel::OnceADay, vec![time(8, 0)]))
        .await;
    assert!(matches!(res, Err(MedReminderError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_medication() {
    let mut t = spawn_app().await;
    let keep = t
        .app
        .add_medication(details("Paracetamol", ScheduleLabel::OnceADay, vec![time(9, 0)]))
        .await
        .unwrap();
    let med = t
        .app
        .add_medication(details(
            "Ibuprofen",
            ScheduleLabel::TwiceADay,
            vec![time(8, 0), time(20, 0)],
        ))
        .await
        .unwrap();

    assert!(t.app.delete_medication(med.id).await.is_ok());
    assert_eq!(t.app.medications(), &[keep.clone()]);
    assert_eq!(t.notifications.scheduled().await, keep.notification_ids);

    let res = t.app.delete_medication(med.id).await;
    assert!(matches!(res, Err(MedReminderError::NotFound(_))));
    assert_eq!(t.app.medications(), &[keep]);
}

#[tokio::test]
async fn test_delete_all_then_fetch_is_empty() {
    let mut t = spawn_app().await;
    for name in &["Ibuprofen", "Paracetamol", "Vitamin D"] {
        t.app
            .add_medication(details(name, ScheduleLabel::OnceADay, vec![time(8, 0)]))
            .await
            .unwrap();
    }
    assert_eq!(t.notifications.scheduled().await.len(), 3);

    assert_eq!(t.app.delete_all_medications().await.unwrap(), 3);
    assert!(t.app.medications().is_empty());
    assert!(t.notifications.scheduled().await.is_empty());
    assert!(t.app.fetch_medications().await.unwrap().is_empty());

    let res = t.app.delete_all_medications().await;
    assert!(matches!(res, Err(MedReminderError::NotFound(_))));
}

#[tokio::test]
async fn test_signed_out_user_can_not_modify_medications() {
    let mut t = spawn_app_signed_out();

    let res = t
        .app
        .add_medication(details("Ibuprofen", ScheduleLabel::OnceADay, vec![time(8, 0)]))
        .await;
    assert!(matches!(res, Err(MedReminderError::Unauthenticated(_))));
    assert!(t.notifications.calls().is_empty());

    assert!(t.app.fetch_medications().await.unwrap().is_empty());
    assert!(matches!(
        t.app.delete_all_medications().await,
        Err(MedReminderError::Unauthenticated(_))
    ));
}

#[tokio::test]
async fn test_restore_reminders_after_restart() {
    let mut t = spawn_app().await;
    let med = t
        .app
        .add_medication(details(
            "Ibuprofen",
            ScheduleLabel::TwiceADay,
            vec![time(8, 0), time(20, 0)],
        ))
        .await
        .unwrap();
    let as_needed = t
        .app
        .add_medication(details("Antihistamine", ScheduleLabel::AsNeeded, vec![]))
        .await
        .unwrap();

    // Nothing to restore while every notification is live
    assert!(t.app.restore_reminders().await.unwrap().is_empty());

    // A restarted scheduler has lost its notifications
    for id in &med.notification_ids {
        t.notifications.cancel(id).await.unwrap();
    }
    t.notifications.clear_calls();

    let restored = t.app.restore_reminders().await.unwrap();
    assert_eq!(restored, vec![med.id]);

    let live = t.notifications.scheduled().await;
    assert_eq!(live.len(), 2);
    let restored_med = t
        .app
        .medications()
        .iter()
        .find(|m| m.id == med.id)
        .unwrap()
        .clone();
    assert_eq!(restored_med.notification_ids, live);
    assert!(t
        .app
        .medications()
        .iter()
        .any(|m| m.id == as_needed.id && m.notification_ids.is_empty()));

    let owner = t.identity.current_owner().unwrap();
    let stored = t.repo.find_by_owner(&owner).await.unwrap();
    assert!(stored
        .iter()
        .any(|m| m.id == med.id && m.notification_ids == live));
}

#[tokio::test]
async fn test_failed_edit_save_cancels_the_new_notifications() {
    let mut t = spawn_app().await;
    let med = t
        .app
        .add_medication(details(
            "Ibuprofen",
            ScheduleLabel::TwiceADay,
            vec![time(8, 0), time(20, 0)],
        ))
        .await
        .unwrap();

    t.repo.set_unavailable(true);
    let res = t
        .app
        .update_medication(
            med.id,
            details(
                "Ibuprofen",
                ScheduleLabel::TwiceADay,
                vec![time(9, 0), time(21, 0)],
            ),
        )
        .await;
    assert_eq!(res, Err(MedReminderError::StorageError));
    assert!(t.notifications.scheduled().await.is_empty());
    assert_eq!(t.app.medications(), &[med.clone()]);

    t.repo.set_unavailable(false);
    let owner = t.identity.current_owner().unwrap();
    let stored = t.repo.find_by_owner(&owner).await.unwrap();
    assert_eq!(stored, vec![med.clone()]);

    // Nothing keeps firing for the deleted medication
    assert!(t.app.delete_medication(med.id).await.is_ok());
    assert!(t.notifications.scheduled().await.is_empty());
    assert!(t.repo.find_by_owner(&owner).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_edit_save_is_restored_at_the_saved_times() {
    let mut t = spawn_app().await;
    let med = t
        .app
        .add_medication(details(
            "Ibuprofen",
            ScheduleLabel::TwiceADay,
            vec![time(8, 0), time(20, 0)],
        ))
        .await
        .unwrap();

    t.repo.set_unavailable(true);
    assert!(t
        .app
        .update_medication(
            med.id,
            details(
                "Ibuprofen",
                ScheduleLabel::TwiceADay,
                vec![time(9, 0), time(21, 0)],
            ),
        )
        .await
        .is_err());
    t.repo.set_unavailable(false);

    assert_eq!(t.app.restore_reminders().await.unwrap(), vec![med.id]);
    let live = t.notifications.scheduled().await;
    let hours = live
        .iter()
        .map(|id| t.notifications.request(id).unwrap().trigger.hour)
        .collect::<Vec<_>>();
    assert_eq!(hours, vec![8, 20]);
    assert_eq!(t.app.medications()[0].notification_ids, live);
}

#[tokio::test]
async fn test_failed_edit_registration_clears_the_notifications() {
    let mut t = spawn_app().await;
    let med = t
        .app
        .add_medication(details(
            "Ibuprofen",
            ScheduleLabel::TwiceADay,
            vec![time(8, 0), time(20, 0)],
        ))
        .await
        .unwrap();

    t.notifications.fail_registrations_after(1);
    let res = t
        .app
        .update_medication(
            med.id,
            details(
                "Ibuprofen",
                ScheduleLabel::FourTimesADay,
                vec![time(6, 0), time(12, 0), time(18, 0), time(22, 0)],
            ),
        )
        .await;
    assert!(matches!(
        res,
        Err(MedReminderError::SchedulerRegistrationFailed(_))
    ));
    assert!(t.notifications.scheduled().await.is_empty());

    // The record keeps its schedule but no longer claims cancelled notifications
    let current = t.app.medications()[0].clone();
    assert!(current.notification_ids.is_empty());
    assert_eq!(current.schedule, ScheduleLabel::TwiceADay);
    assert_eq!(current.times_of_day, med.times_of_day);
    let owner = t.identity.current_owner().unwrap();
    assert_eq!(t.repo.find_by_owner(&owner).await.unwrap(), vec![current]);

    t.notifications.accept_all_registrations();
    assert_eq!(t.app.restore_reminders().await.unwrap(), vec![med.id]);
    let live = t.notifications.scheduled().await;
    assert_eq!(live.len(), 2);
    assert_eq!(t.app.medications()[0].notification_ids, live);
}

#[tokio::test]
async fn test_failed_delete_keeps_the_record() {
    let mut t = spawn_app().await;
    let med = t
        .app
        .add_medication(details(
            "Ibuprofen",
            ScheduleLabel::TwiceADay,
            vec![time(8, 0), time(20, 0)],
        ))
        .await
        .unwrap();

    t.repo.set_unavailable(true);
    assert_eq!(
        t.app.delete_medication(med.id).await,
        Err(MedReminderError::StorageError)
    );
    // Notifications are cancelled before the remote delete
    assert!(t.notifications.scheduled().await.is_empty());
    assert_eq!(t.app.medications(), &[med.clone()]);

    t.repo.set_unavailable(false);
    let owner = t.identity.current_owner().unwrap();
    assert_eq!(t.repo.find_by_owner(&owner).await.unwrap(), vec![med.clone()]);

    assert!(t.app.delete_medication(med.id).await.is_ok());
    assert!(t.app.medications().is_empty());
    assert!(t.notifications.scheduled().await.is_empty());
}
