use std::sync::Arc;

use async_trait::async_trait;
use time::Duration;

use crate::models::types::UtcDateTime;
use crate::repository::SubmissionRepository;

/// The limiter's verdict for one upload attempt. Built into this shape at
/// the service boundary; a count that doesn't fit fails the check instead
/// of being trusted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadAllowance {
    pub allowed: bool,
    pub remaining_attempts: Option<u32>,
    pub message: Option<String>,
}

#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn check_upload(&self, owner_email: &str) -> Result<UploadAllowance, anyhow::Error>;
}

/// Caps how many submissions a contributor may create inside a rolling
/// 24-hour window.
pub struct DailyUploadLimiter {
    submission_repository: Arc<SubmissionRepository>,
    max_per_day: u32,
}

impl DailyUploadLimiter {
    pub fn new(
        submission_repository: Arc<SubmissionRepository>,
        max_per_day: u32,
    ) -> DailyUploadLimiter {
        DailyUploadLimiter {
            submission_repository,
            max_per_day,
        }
    }
}

#[async_trait]
impl RateLimiter for DailyUploadLimiter {
    async fn check_upload(&self, owner_email: &str) -> Result<UploadAllowance, anyhow::Error> {
        let cutoff = UtcDateTime::now() - Duration::hours(24);
        let count = self
            .submission_repository
            .count_by_owner_since(owner_email, cutoff)
            .await?;

        if count < 0 {
            anyhow::bail!("Upload count query returned a negative count: {count}");
        }

        let used = count as u32;
        if used >= self.max_per_day {
            Ok(UploadAllowance {
                allowed: false,
                remaining_attempts: Some(0),
                message: Some(format!(
                    "Upload limit of {} per day reached. Try again later.",
                    self.max_per_day
                )),
            })
        } else {
            Ok(UploadAllowance {
                allowed: true,
                remaining_attempts: Some(self.max_per_day - used - 1),
                message: None,
            })
        }
    }
}
