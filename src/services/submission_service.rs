use std::sync::Arc;

use anyhow::Context;
use thiserror::Error;
use tracing::warn;

use crate::mailer::Mailer;
use crate::models::{
    types::UtcDateTime, ClipCategory, NewSubmission, Submission, SubmissionId,
};
use crate::object_storage::ObjectStore;
use crate::rate_limiter::RateLimiter;
use crate::rates::RateTable;
use crate::repository::SubmissionRepository;

#[derive(Debug, Error)]
pub enum SubmitError {
    /// The limiter said no; the message is shown to the contributor.
    #[error("{message}")]
    Rejected { message: String },
    /// The limiter itself failed, so the attempt is blocked with a generic
    /// message rather than waved through.
    #[error("Could not verify your upload limit. Please try again.")]
    LimitCheckFailed(#[source] anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// A new clip as it arrives from the contributor form: exactly one of
/// `link` / `file_path` is normally set, and views start at zero until an
/// admin records them.
#[derive(Debug)]
pub struct NewClip {
    pub owner_email: String,
    pub link: Option<String>,
    pub file_path: Option<String>,
    pub category: Option<ClipCategory>,
}

/// Contributor-facing submission intake plus the admin edits that reprice
/// a clip.
pub struct SubmissionService {
    submission_repository: Arc<SubmissionRepository>,
    rate_limiter: Arc<dyn RateLimiter>,
    object_store: Arc<dyn ObjectStore>,
    mailer: Arc<dyn Mailer>,
    rates: RateTable,
}

impl SubmissionService {
    pub fn new(
        submission_repository: Arc<SubmissionRepository>,
        rate_limiter: Arc<dyn RateLimiter>,
        object_store: Arc<dyn ObjectStore>,
        mailer: Arc<dyn Mailer>,
        rates: RateTable,
    ) -> SubmissionService {
        SubmissionService {
            submission_repository,
            rate_limiter,
            object_store,
            mailer,
            rates,
        }
    }

    #[tracing::instrument(skip(self, clip), fields(owner = %clip.owner_email))]
    pub async fn submit(&self, clip: NewClip) -> Result<Submission, SubmitError> {
        let allowance = self
            .rate_limiter
            .check_upload(&clip.owner_email)
            .await
            .map_err(SubmitError::LimitCheckFailed)?;

        if !allowance.allowed {
            let message = allowance
                .message
                .unwrap_or_else(|| "Upload limit reached. Try again later.".to_owned());
            return Err(SubmitError::Rejected { message });
        }

        let link = clip.link.map(|link| link.trim().to_owned());
        let submission = self
            .submission_repository
            .insert(&NewSubmission {
                owner_email: clip.owner_email,
                link,
                file_path: clip.file_path,
                view_count: 0,
                payment_amount: self.rates.amount_for(0, clip.category),
                category: clip.category,
                created_at: UtcDateTime::now(),
            })
            .await?;

        // The confirmation email is a courtesy; the submission stands
        // whether or not it goes out.
        if let Some(email) = submission.owner_email.as_deref() {
            if let Err(err) = self.mailer.send_submission_received(email).await {
                warn!("Could not send the submission confirmation to {email}: {err}");
            }
        }

        Ok(submission)
    }

    /// Records a verified view count and reprices the clip from the rate
    /// table in the same update.
    pub async fn set_view_count(
        &self,
        id: SubmissionId,
        view_count: u64,
    ) -> Result<Submission, anyhow::Error> {
        let submission = self
            .submission_repository
            .get_by_id(id)
            .await?
            .with_context(|| format!("No submission {id:?}"))?;

        let amount = self.rates.amount_for(view_count, submission.category);

        self.submission_repository
            .update_views(id, view_count, amount)
            .await?
            .with_context(|| format!("Submission {id:?} disappeared during the update"))
    }

    /// Recategorizes a clip, repricing its current views under the new
    /// category's rate.
    pub async fn set_category(
        &self,
        id: SubmissionId,
        category: Option<ClipCategory>,
    ) -> Result<Submission, anyhow::Error> {
        let submission = self
            .submission_repository
            .get_by_id(id)
            .await?
            .with_context(|| format!("No submission {id:?}"))?;

        let amount = self.rates.amount_for(submission.view_count, category);

        self.submission_repository
            .update_category(id, category, amount)
            .await?
            .with_context(|| format!("Submission {id:?} disappeared during the update"))
    }

    /// Deletes a submission. The database row goes first; removing the
    /// backing stored file is best-effort and a failure there only warns.
    /// Returns false when the submission did not exist.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: SubmissionId) -> Result<bool, anyhow::Error> {
        let Some(file_path) = self.submission_repository.delete(id).await? else {
            return Ok(false);
        };

        if let Some(path) = file_path {
            if let Err(err) = self.object_store.delete_object(&path).await {
                warn!("Could not delete stored file {path} for submission {id:?}: {err}");
            }
        }

        Ok(true)
    }
}
