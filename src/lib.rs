#![forbid(unsafe_code)]

//! Service core for the Clipper platform: clip submissions, view-count
//! tracking and contributor payouts. The centerpiece is
//! [`reconciliation::reconcile`], which settles the full payment history
//! against current view counts.

pub mod mailer;
pub mod models;
pub mod object_storage;
pub mod rate_limiter;
pub mod rates;
pub mod reconciliation;
pub mod repository;
pub mod services;
