use rust_decimal::Decimal;
use strum::{Display, EnumString};

use super::{profile::ProfileId, submission::SubmissionId, types::UtcDateTime};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PaymentId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Cancelled,
}

/// A payout issued for a bundle of submissions. `total_views` and `amount`
/// are snapshots taken at issuance time; view counts on the covered
/// submissions keep growing afterwards. Only `status` (and `paid_date`)
/// ever change after creation.
#[derive(Clone, Debug, PartialEq)]
pub struct Payment {
    pub id: PaymentId,
    pub profile_id: ProfileId,
    pub owner_email: String,
    pub total_views: u64,
    pub amount: Decimal,
    pub submission_ids: Vec<SubmissionId>,
    pub status: PaymentStatus,
    pub created_at: UtcDateTime,
    pub paid_date: Option<UtcDateTime>,
}

#[derive(Debug)]
pub struct NewPayment {
    pub profile_id: ProfileId,
    pub owner_email: String,
    pub total_views: u64,
    pub amount: Decimal,
    pub submission_ids: Vec<SubmissionId>,
    pub created_at: UtcDateTime,
}
