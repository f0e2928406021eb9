use medication_reminder_api::Application;
use medication_reminder_infra::{
    identity::{IIdentityProvider, InMemoryIdentityProvider},
    notifications::InMemoryNotificationScheduler,
    Config, InMemoryMedicationRepo, MedReminderContext, RealSys, Repos,
};
use std::sync::Arc;

pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "correct horse battery staple";

pub struct TestApp {
    pub app: Application,
    pub repo: Arc<InMemoryMedicationRepo>,
    pub identity: Arc<InMemoryIdentityProvider>,
    pub notifications: Arc<InMemoryNotificationScheduler>,
}

/// Application on in-memory collaborators, without a signed in user
pub fn spawn_app_signed_out() -> TestApp {
    let repo = Arc::new(InMemoryMedicationRepo::new());
    let identity = Arc::new(InMemoryIdentityProvider::new());
    let notifications = Arc::new(InMemoryNotificationScheduler::new());

    let context = MedReminderContext {
        repos: Repos {
            medications: repo.clone(),
        },
        identity: identity.clone(),
        notifications: notifications.clone(),
        config: Config::new(),
        sys: Arc::new(RealSys {}),
    };

    TestApp {
        app: Application::new(context),
        repo,
        identity,
        notifications,
    }
}

/// Application on in-memory collaborators with a freshly signed up user
pub async fn spawn_app() -> TestApp {
    let mut test_app = spawn_app_signed_out();
    test_app
        .app
        .sign_up(EMAIL, PASSWORD)
        .await
        .expect("Expected sign up to succeed");
    assert!(test_app.identity.current_owner().is_some());
    test_app
}
