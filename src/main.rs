#![forbid(unsafe_code)]

use std::{process::exit, sync::Arc};

use clipper_payouts::mailer::ResendMailer;
use clipper_payouts::repository::{PaymentRepository, ProfileRepository, SubmissionRepository};
use clipper_payouts::services::PayoutService;
use serde::Deserialize;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Deserialize)]
struct AppConfig {
    database_url: String,
    resend_api_key: String,
    #[serde(default = "default_mail_from")]
    mail_from: String,
}

fn default_mail_from() -> String {
    "Clipper <payouts@clipper.example>".to_owned()
}

#[tokio::main]
async fn main() {
    if let Err(err) = dotenvy::dotenv() {
        warn!("Could not load config from .env file: {err}");
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(
                    "clipper_payouts=info"
                        .parse()
                        .expect("Hard-coded default directive should be correct"),
                )
                .from_env_lossy(),
        )
        .init();

    let app_config = match envy::from_env::<AppConfig>() {
        Ok(config) => config,
        Err(err) => {
            error!("Could not load app config: {err}");
            exit(255);
        }
    };

    let db_pool = match setup_database(&app_config.database_url).await {
        Ok(pool) => pool,
        Err(err) => {
            error!("Could not setup database: {err}");
            exit(255);
        }
    };

    let payout_service = PayoutService::new(
        Arc::new(SubmissionRepository::new(db_pool.clone())),
        Arc::new(PaymentRepository::new(db_pool.clone())),
        Arc::new(ProfileRepository::new(db_pool.clone())),
        Arc::new(ResendMailer::new(
            app_config.resend_api_key,
            app_config.mail_from,
        )),
    );

    let result = refresh(&payout_service).await;
    db_pool.close().await;

    if let Err(err) = result {
        error!("Reconciliation pass failed: {err}");
        exit(1);
    }
}

/// The admin data-refresh action: one reconciliation pass over the stores,
/// reported through the log.
async fn refresh(payout_service: &PayoutService) -> Result<(), anyhow::Error> {
    let summaries = payout_service.contributor_summaries().await?;

    info!("{} contributors with submissions", summaries.len());
    for summary in &summaries {
        info!(
            "{}: {} views, ${} potential, ${} paid, ${} pending ({} submissions, {} pending)",
            summary.email,
            summary.total_views,
            summary.total_payment_potential,
            summary.paid_amount,
            summary.pending_payment,
            summary.submission_ids.len(),
            summary.pending_submission_ids.len(),
        );
    }

    let duplicate_groups = payout_service.duplicate_link_groups().await?;
    for group in &duplicate_groups {
        warn!(
            "{} submissions share the link {}",
            group.submission_ids.len(),
            group.link
        );
    }

    Ok(())
}

#[tracing::instrument(skip(url))]
async fn setup_database(url: &str) -> anyhow::Result<SqlitePool> {
    info!("Connecting to SQLite database at {url}");
    let pool = SqlitePoolOptions::new().connect(url).await?;
    info!("Running migrations");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Done!");
    Ok(pool)
}
