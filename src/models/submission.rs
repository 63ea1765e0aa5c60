use rust_decimal::Decimal;
use strum::{Display, EnumString};

use super::types::UtcDateTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubmissionId(pub u64);

/// Which rate-table row a clip is paid under.
///
/// Uncategorized clips (`None` at the submission level) earn nothing until
/// an admin assigns a category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ClipCategory {
    Shorts,
    LongForm,
}

/// One contributor-provided clip: either an uploaded file or a link to a
/// social-media post. View counts are edited by admins as platform stats
/// come in; `payment_amount` is recomputed from the rate table whenever the
/// view count or category changes, and is otherwise left as recorded.
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    pub id: SubmissionId,
    pub owner_email: Option<String>,
    pub link: Option<String>,
    pub file_path: Option<String>,
    pub view_count: u64,
    pub payment_amount: Decimal,
    pub category: Option<ClipCategory>,
    pub created_at: UtcDateTime,
}

#[derive(Debug)]
pub struct NewSubmission {
    pub owner_email: String,
    pub link: Option<String>,
    pub file_path: Option<String>,
    pub view_count: u64,
    pub payment_amount: Decimal,
    pub category: Option<ClipCategory>,
    pub created_at: UtcDateTime,
}
