use rust_decimal::Decimal;
use sqlx::{query_as, FromRow, Pool, Sqlite};

use crate::models::{
    types::UtcDateTime, NewPayment, Payment, PaymentId, PaymentStatus, ProfileId, SubmissionId,
};

use super::conversion::{DbConvertible, DbFromConversionError, DbToConversionError};

pub struct PaymentRepository {
    pool: Pool<Sqlite>,
}

const PAYMENT_COLUMNS: &str = "id, profile_id, owner_email, total_views, amount, \
                               submission_ids, status, created_at, paid_date";

impl PaymentRepository {
    pub fn new(pool: Pool<Sqlite>) -> PaymentRepository {
        PaymentRepository { pool }
    }

    pub async fn get_all(&self) -> Result<Vec<Payment>, anyhow::Error> {
        let rows = query_as::<_, PaymentRow>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(|row| Ok(Payment::from_db(row)?)).collect()
    }

    /// Inserts a new payment snapshot. All payments start out pending;
    /// rows are never deleted afterwards, only transitioned.
    pub async fn insert(&self, payment: &NewPayment) -> Result<Payment, anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        let inserted = {
            let profile_id = payment.profile_id.to_db()?;
            let amount = payment.amount.to_db()?;
            let submission_ids = payment.submission_ids.to_db()?;
            let status = PaymentStatus::Pending.to_db()?;
            let created_at = payment.created_at.to_db()?;

            query_as::<_, PaymentRow>(&format!(
                "INSERT INTO payments
                     (profile_id, owner_email, total_views, amount, submission_ids, status, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 RETURNING {PAYMENT_COLUMNS}"
            ))
            .bind(profile_id)
            .bind(&payment.owner_email)
            .bind(payment.total_views as i64)
            .bind(amount)
            .bind(submission_ids)
            .bind(status)
            .bind(created_at)
            .fetch_one(&mut *transaction)
            .await?
        };

        transaction.commit().await?;

        Ok(Payment::from_db(&inserted)?)
    }

    /// Pending → paid, stamping the paid date. Returns false when the
    /// payment does not exist or already left the pending state.
    pub async fn mark_paid(
        &self,
        id: PaymentId,
        paid_date: UtcDateTime,
    ) -> Result<bool, anyhow::Error> {
        self.transition(id, PaymentStatus::Paid, Some(paid_date))
            .await
    }

    /// Pending → cancelled.
    pub async fn cancel(&self, id: PaymentId) -> Result<bool, anyhow::Error> {
        self.transition(id, PaymentStatus::Cancelled, None).await
    }

    async fn transition(
        &self,
        id: PaymentId,
        to: PaymentStatus,
        paid_date: Option<UtcDateTime>,
    ) -> Result<bool, anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        let pending = PaymentStatus::Pending.to_db()?;
        let result = sqlx::query(
            "UPDATE payments SET status = $2, paid_date = $3 WHERE id = $1 AND status = $4",
        )
        .bind(id.to_db()?)
        .bind(to.to_db()?)
        .bind(paid_date.as_ref().map(DbConvertible::to_db).transpose()?)
        .bind(pending)
        .execute(&mut *transaction)
        .await?;

        transaction.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, FromRow)]
pub struct PaymentRow {
    id: i64,
    profile_id: i64,
    owner_email: String,
    total_views: i64,
    amount: String,
    submission_ids: String,
    status: String,
    created_at: String,
    paid_date: Option<String>,
}

impl DbConvertible for Payment {
    type DbType = PaymentRow;

    fn to_db(&self) -> Result<Self::DbType, DbToConversionError> {
        Ok(PaymentRow {
            id: self.id.to_db()?,
            profile_id: self.profile_id.to_db()?,
            owner_email: self.owner_email.clone(),
            total_views: self.total_views as i64,
            amount: self.amount.to_db()?,
            submission_ids: self.submission_ids.to_db()?,
            status: self.status.to_db()?,
            created_at: self.created_at.to_db()?,
            paid_date: self.paid_date.as_ref().map(DbConvertible::to_db).transpose()?,
        })
    }

    fn from_db(value: &Self::DbType) -> Result<Self, DbFromConversionError> {
        if value.total_views < 0 {
            return Err(DbFromConversionError::InvalidNumber(value.total_views));
        }

        Ok(Payment {
            id: PaymentId::from_db(&value.id)?,
            profile_id: ProfileId::from_db(&value.profile_id)?,
            owner_email: value.owner_email.clone(),
            total_views: value.total_views as u64,
            amount: Decimal::from_db(&value.amount)?,
            submission_ids: Vec::<SubmissionId>::from_db(&value.submission_ids)?,
            status: PaymentStatus::from_db(&value.status)?,
            created_at: UtcDateTime::from_db(&value.created_at)?,
            paid_date: value
                .paid_date
                .as_ref()
                .map(UtcDateTime::from_db)
                .transpose()?,
        })
    }
}
