use rust_decimal::Decimal;

use super::submission::SubmissionId;

/// Per-contributor reconciliation result. Derived on every pass over the
/// submission and payment history, never persisted.
///
/// `pending_views` can be fractional: when a payment's recorded view total
/// no longer matches the covered submissions' current views, the payment is
/// redistributed proportionally and partial views appear.
#[derive(Clone, Debug, PartialEq)]
pub struct ContributorSummary {
    pub email: String,
    pub total_views: u64,
    pub total_payment_potential: Decimal,
    pub paid_amount: Decimal,
    pub pending_payment: Decimal,
    pub pending_views: Decimal,
    pub submission_ids: Vec<SubmissionId>,
    pub pending_submission_ids: Vec<SubmissionId>,
}

impl ContributorSummary {
    pub fn empty(email: String) -> ContributorSummary {
        ContributorSummary {
            email,
            total_views: 0,
            total_payment_potential: Decimal::ZERO,
            paid_amount: Decimal::ZERO,
            pending_payment: Decimal::ZERO,
            pending_views: Decimal::ZERO,
            submission_ids: Vec::new(),
            pending_submission_ids: Vec::new(),
        }
    }
}
