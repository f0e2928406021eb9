mod config;
mod repos;
mod services;
mod system;

pub use config::{Config, Credentials, FirebaseConfig};
pub use repos::{DeleteResult, IMedicationRepo, InMemoryMedicationRepo, RepoError, Repos};
pub use services::*;
use services::{
    identity::{FirebaseIdentityProvider, IIdentityProvider, InMemoryIdentityProvider},
    notifications::{INotificationScheduler, LocalNotificationScheduler},
};
use std::sync::Arc;
pub use system::{ISys, RealSys, StaticTimeSys};
use tracing::info;

#[derive(Clone)]
pub struct MedReminderContext {
    pub repos: Repos,
    pub identity: Arc<dyn IIdentityProvider>,
    pub notifications: Arc<dyn INotificationScheduler>,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
}

impl MedReminderContext {
    fn create(config: Config) -> Self {
        let sys: Arc<dyn ISys> = Arc::new(RealSys {});
        let notifications = Arc::new(LocalNotificationScheduler::new(
            config.timezone,
            sys.clone(),
        ));

        match &config.firebase {
            Some(firebase) => {
                info!("Using Firebase project: {}", firebase.project_id);
                let identity: Arc<dyn IIdentityProvider> = Arc::new(
                    FirebaseIdentityProvider::new(firebase.api_key.clone(), sys.clone()),
                );
                Self {
                    repos: Repos::create_firestore(
                        firebase,
                        &config.medications_collection,
                        identity.clone(),
                    ),
                    identity,
                    notifications,
                    config,
                    sys,
                }
            }
            None => Self {
                repos: Repos::create_inmemory(),
                identity: Arc::new(InMemoryIdentityProvider::new()),
                notifications,
                config,
                sys,
            },
        }
    }

    /// Context where every collaborator lives in memory
    pub fn create_inmemory() -> Self {
        Self {
            repos: Repos::create_inmemory(),
            identity: Arc::new(InMemoryIdentityProvider::new()),
            notifications: Arc::new(notifications::InMemoryNotificationScheduler::new()),
            config: Config::new(),
            sys: Arc::new(RealSys {}),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub fn setup_context() -> MedReminderContext {
    MedReminderContext::create(Config::new())
}
