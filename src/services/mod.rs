mod payout_service;
mod submission_service;

pub use payout_service::{PayoutError, PayoutService};
pub use submission_service::{NewClip, SubmissionService, SubmitError};
