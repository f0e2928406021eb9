use chrono_tz::Tz;
use tracing::{info, warn};

const DEFAULT_MEDICATIONS_COLLECTION: &str = "medication-reminders";

#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    /// Web api key of the Firebase project, used by the identity toolkit
    pub api_key: String,
    pub project_id: String,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Firebase project backing identity and document storage.
    /// In-memory collaborators are used when this is not set.
    pub firebase: Option<FirebaseConfig>,
    /// Name of the document collection holding the `Medication`s
    pub medications_collection: String,
    /// Timezone in which the wall clock times of reminders are interpreted
    pub timezone: Tz,
    /// Account the binary signs in with on startup
    pub credentials: Option<Credentials>,
}

impl Config {
    pub fn new() -> Self {
        let firebase = match (
            std::env::var("FIREBASE_API_KEY"),
            std::env::var("FIREBASE_PROJECT_ID"),
        ) {
            (Ok(api_key), Ok(project_id)) => Some(FirebaseConfig {
                api_key,
                project_id,
            }),
            _ => {
                info!("Did not find FIREBASE_API_KEY and FIREBASE_PROJECT_ID environment variables. Going to use in-memory storage and identity.");
                None
            }
        };
        let medications_collection = std::env::var("MEDICATIONS_COLLECTION")
            .unwrap_or_else(|_| DEFAULT_MEDICATIONS_COLLECTION.into());

        let timezone = match std::env::var("REMINDER_TIMEZONE") {
            Ok(tz) => match tz.parse::<Tz>() {
                Ok(tz) => tz,
                Err(_) => {
                    warn!(
                        "The given REMINDER_TIMEZONE: {} is not valid, falling back to UTC.",
                        tz
                    );
                    Tz::UTC
                }
            },
            Err(_) => Tz::UTC,
        };

        let credentials = match (
            std::env::var("MEDREMINDER_EMAIL"),
            std::env::var("MEDREMINDER_PASSWORD"),
        ) {
            (Ok(email), Ok(password)) => Some(Credentials { email, password }),
            _ => None,
        };

        Self {
            firebase,
            medications_collection,
            timezone,
            credentials,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
