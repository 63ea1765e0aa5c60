mod payment;
mod profile;
mod submission;
mod summary;

pub mod types;

pub use payment::{NewPayment, Payment, PaymentId, PaymentStatus};
pub use profile::{Profile, ProfileId};
pub use submission::{ClipCategory, NewSubmission, Submission, SubmissionId};
pub use summary::ContributorSummary;
