mod telemetry;

use medication_reminder_api::{Application, MedReminderError};
use medication_reminder_infra::{setup_context, Credentials};
use telemetry::{get_subscriber, init_subscriber};
use tracing::{error, info, warn};

enum Event {
    Shutdown,
    AuthStateChanged(Result<(), MedReminderError>),
}

async fn authenticate(app: &mut Application, credentials: &Credentials) -> anyhow::Result<()> {
    match app.sign_in(&credentials.email, &credentials.password).await {
        Ok(session) => info!("Signed in as user {}", session.owner_id),
        Err(MedReminderError::InvalidCredentials(msg)) => {
            warn!(
                "Unable to sign in with {}: {}. Trying to sign up instead.",
                credentials.email, msg
            );
            let session = app
                .sign_up(&credentials.email, &credentials.password)
                .await?;
            info!("Signed up as user {}", session.owner_id);
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn restore_reminders(app: &mut Application) {
    match app.restore_reminders().await {
        Ok(restored) => info!(
            "Loaded {} medications, restored the reminders of {}",
            app.medications().len(),
            restored.len()
        ),
        Err(e) => error!("Unable to restore reminders: {}", e),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    openssl_probe::init_ssl_cert_env_vars();

    let subscriber = get_subscriber("medication_reminder".into(), "info".into());
    init_subscriber(subscriber);

    let context = setup_context();
    let credentials = context.config.credentials.clone();
    let mut app = Application::new(context);

    match &credentials {
        Some(credentials) => authenticate(&mut app, credentials).await?,
        None => warn!("Did not find MEDREMINDER_EMAIL and MEDREMINDER_PASSWORD environment variables. No medications are going to be loaded."),
    }
    restore_reminders(&mut app).await;

    loop {
        let event = tokio::select! {
            res = tokio::signal::ctrl_c() => {
                res?;
                Event::Shutdown
            }
            res = app.auth_state_changed() => Event::AuthStateChanged(res),
        };

        match event {
            Event::Shutdown => {
                info!("Shutting down");
                break;
            }
            Event::AuthStateChanged(Ok(())) => restore_reminders(&mut app).await,
            Event::AuthStateChanged(Err(e)) => {
                error!("Unable to load medications after the session changed: {}", e)
            }
        }
    }

    Ok(())
}
