mod conversion;
mod payment_repository;
mod profile_repository;
mod submission_repository;

pub use conversion::{DbConvertible, DbFromConversionError, DbToConversionError};
pub use payment_repository::PaymentRepository;
pub use profile_repository::ProfileRepository;
pub use submission_repository::SubmissionRepository;

#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    use sqlx::sqlite::SqlitePoolOptions;

    // A single connection keeps every handle on the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("In-memory SQLite should always connect");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Migrations should apply to a fresh database");

    pool
}
