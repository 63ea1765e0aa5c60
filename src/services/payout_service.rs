use std::sync::Arc;

use anyhow::Context;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;

use crate::mailer::Mailer;
use crate::models::{
    types::UtcDateTime, ContributorSummary, NewPayment, Payment, PaymentId,
};
use crate::reconciliation::{duplicate_links, reconcile, DuplicateGroup};
use crate::repository::{PaymentRepository, ProfileRepository, SubmissionRepository};

#[derive(Debug, Error)]
pub enum PayoutError {
    #[error("No contributor profile matches {email}")]
    MissingProfile { email: String },
    #[error("Nothing is pending for {email}")]
    NothingPending { email: String },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Admin-facing payout workflows: the on-demand reconciliation pass over
/// both stores, payment issuance, and payment status transitions.
pub struct PayoutService {
    submission_repository: Arc<SubmissionRepository>,
    payment_repository: Arc<PaymentRepository>,
    profile_repository: Arc<ProfileRepository>,
    mailer: Arc<dyn Mailer>,
}

impl PayoutService {
    pub fn new(
        submission_repository: Arc<SubmissionRepository>,
        payment_repository: Arc<PaymentRepository>,
        profile_repository: Arc<ProfileRepository>,
        mailer: Arc<dyn Mailer>,
    ) -> PayoutService {
        PayoutService {
            submission_repository,
            payment_repository,
            profile_repository,
            mailer,
        }
    }

    /// One reconciliation pass: snapshot both stores, run the engine.
    #[tracing::instrument(skip(self))]
    pub async fn contributor_summaries(&self) -> Result<Vec<ContributorSummary>, anyhow::Error> {
        let submissions = self.submission_repository.get_all().await?;
        let payments = self.payment_repository.get_all().await?;

        Ok(reconcile(&submissions, &payments))
    }

    /// Groups submissions sharing a link, for admin review.
    pub async fn duplicate_link_groups(&self) -> Result<Vec<DuplicateGroup>, anyhow::Error> {
        let submissions = self.submission_repository.get_all().await?;

        Ok(duplicate_links(&submissions))
    }

    /// Issues a payment for everything currently pending for a contributor:
    /// re-reconciles, resolves the profile (no profile means no payment row
    /// is written), persists a pending payment snapshot and notifies the
    /// contributor.
    #[tracing::instrument(skip(self))]
    pub async fn issue_payment(&self, email: &str) -> Result<Payment, PayoutError> {
        let summaries = self.contributor_summaries().await?;
        let summary = summaries
            .into_iter()
            .find(|summary| summary.email == email && summary.pending_payment > Decimal::ZERO)
            .ok_or_else(|| PayoutError::NothingPending {
                email: email.to_owned(),
            })?;

        let profile = self
            .profile_repository
            .get_by_email(email)
            .await?
            .ok_or_else(|| PayoutError::MissingProfile {
                email: email.to_owned(),
            })?;

        let total_views = summary
            .pending_views
            .round()
            .to_u64()
            .context("Pending views should fit a view counter")?;

        let payment = self
            .payment_repository
            .insert(&NewPayment {
                profile_id: profile.id,
                owner_email: summary.email.clone(),
                total_views,
                amount: summary.pending_payment,
                submission_ids: summary.pending_submission_ids.clone(),
                created_at: UtcDateTime::now(),
            })
            .await?;

        info!(
            "Issued payment {:?} to {}: ${} for {} views",
            payment.id, payment.owner_email, payment.amount, payment.total_views
        );

        self.mailer
            .send_payment_request(email, total_views, summary.pending_payment)
            .await?;

        Ok(payment)
    }

    pub async fn mark_paid(&self, id: PaymentId) -> Result<bool, anyhow::Error> {
        self.payment_repository.mark_paid(id, UtcDateTime::now()).await
    }

    pub async fn cancel(&self, id: PaymentId) -> Result<bool, anyhow::Error> {
        self.payment_repository.cancel(id).await
    }
}
