//! Backend entry-point: loads settings, wires storage and email, and serves
//! the REST API with its OpenAPI docs.

mod server;

use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultEnv;
use reqwest::Url;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use eptss::domain::NotificationSettings;
use eptss::domain::ports::EmailSender;
use eptss::inbound::http::health::HealthState;
use eptss::inbound::http::session_config::fingerprint::key_fingerprint;
use eptss::inbound::http::session_config::{BuildMode, session_settings_from_env};
use eptss::outbound::email::{LogOnlyEmailSender, RESEND_API_URL, ResendEmailSender};
use eptss::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use eptss::settings::AppSettings;
use ortho_config::OrthoConfig;
use server::{ServerConfig, create_server};

const EMAIL_TIMEOUT: Duration = Duration::from_secs(10);

fn build_email_sender(settings: &AppSettings) -> Result<Arc<dyn EmailSender>> {
    let Some(api_key) = settings.resend_api_key() else {
        warn!("EPTSS_RESEND_API_KEY not set; emails will only be logged");
        return Ok(Arc::new(LogOnlyEmailSender));
    };
    let endpoint = Url::parse(RESEND_API_URL).wrap_err("parse Resend endpoint")?;
    let sender = ResendEmailSender::new(endpoint, api_key, settings.email_from(), EMAIL_TIMEOUT)
        .wrap_err("build Resend client")?;
    Ok(Arc::new(sender))
}

async fn connect_database(settings: &AppSettings) -> Result<Option<DbPool>> {
    let Some(database_url) = settings.database_url.clone() else {
        warn!("EPTSS_DATABASE_URL not set; serving fixture data only");
        return Ok(None);
    };
    if settings.run_migrations() {
        run_pending_migrations(database_url.clone())
            .await
            .wrap_err("apply database migrations")?;
        info!("database migrations applied");
    }
    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(settings.pool_max_size()))
        .await
        .wrap_err("create database pool")?;
    Ok(Some(pool))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|err| eyre!("load settings: {err}"))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("load session settings")?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        "session key loaded"
    );

    let bind_addr = settings.bind_addr()?;
    let email_sender = build_email_sender(&settings)?;
    let notifications =
        NotificationSettings::new(settings.base_url(), settings.admin_email.clone());
    let mut config = ServerConfig::new(session, bind_addr)
        .with_cron_secret(settings.cron_secret.clone())
        .with_email(email_sender, notifications)
        .with_login_token_ttl(chrono::Duration::minutes(
            settings.login_token_ttl_minutes(),
        ));
    if settings.cron_secret.is_none() {
        warn!("EPTSS_CRON_SECRET not set; cron endpoints will refuse every call");
    }
    if let Some(pool) = connect_database(&settings).await? {
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    info!(addr = %config.bind_addr(), "starting server");
    create_server(health_state, config)?.await?;
    Ok(())
}
