use rust_decimal::Decimal;
use sqlx::{query, query_as, FromRow, Pool, Sqlite};

use crate::models::{
    types::UtcDateTime, ClipCategory, NewSubmission, Submission, SubmissionId,
};

use super::conversion::{DbConvertible, DbFromConversionError, DbToConversionError};

pub struct SubmissionRepository {
    pool: Pool<Sqlite>,
}

const SUBMISSION_COLUMNS: &str =
    "id, owner_email, link, file_path, view_count, payment_amount, category, created_at";

impl SubmissionRepository {
    pub fn new(pool: Pool<Sqlite>) -> SubmissionRepository {
        SubmissionRepository { pool }
    }

    pub async fn get_all(&self) -> Result<Vec<Submission>, anyhow::Error> {
        let rows = query_as::<_, SubmissionRow>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Ok(Submission::from_db(row)?))
            .collect()
    }

    pub async fn get_by_owner(&self, owner_email: &str) -> Result<Vec<Submission>, anyhow::Error> {
        let rows = query_as::<_, SubmissionRow>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions
             WHERE owner_email = $1
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(owner_email)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Ok(Submission::from_db(row)?))
            .collect()
    }

    pub async fn get_by_id(&self, id: SubmissionId) -> Result<Option<Submission>, anyhow::Error> {
        let row = query_as::<_, SubmissionRow>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = $1"
        ))
        .bind(id.to_db()?)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Submission::from_db(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn count_by_owner_since(
        &self,
        owner_email: &str,
        since: UtcDateTime,
    ) -> Result<i64, anyhow::Error> {
        let count: (i64,) = query_as(
            "SELECT COUNT(*) FROM submissions WHERE owner_email = $1 AND created_at >= $2",
        )
        .bind(owner_email)
        .bind(since.to_db()?)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    pub async fn insert(&self, submission: &NewSubmission) -> Result<Submission, anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        let inserted = {
            let payment_amount = submission.payment_amount.to_db()?;
            let category = submission
                .category
                .as_ref()
                .map(DbConvertible::to_db)
                .transpose()?;
            let created_at = submission.created_at.to_db()?;

            query_as::<_, SubmissionRow>(&format!(
                "INSERT INTO submissions
                     (owner_email, link, file_path, view_count, payment_amount, category, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 RETURNING {SUBMISSION_COLUMNS}"
            ))
            .bind(&submission.owner_email)
            .bind(&submission.link)
            .bind(&submission.file_path)
            .bind(submission.view_count as i64)
            .bind(payment_amount)
            .bind(category)
            .bind(created_at)
            .fetch_one(&mut *transaction)
            .await?
        };

        transaction.commit().await?;

        Ok(Submission::from_db(&inserted)?)
    }

    /// Records an admin view-count edit together with the amount repriced
    /// for it. The two always change together.
    pub async fn update_views(
        &self,
        id: SubmissionId,
        view_count: u64,
        payment_amount: Decimal,
    ) -> Result<Option<Submission>, anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        let updated = query_as::<_, SubmissionRow>(&format!(
            "UPDATE submissions SET view_count = $2, payment_amount = $3
             WHERE id = $1
             RETURNING {SUBMISSION_COLUMNS}"
        ))
        .bind(id.to_db()?)
        .bind(view_count as i64)
        .bind(payment_amount.to_db()?)
        .fetch_optional(&mut *transaction)
        .await?;

        transaction.commit().await?;

        match updated {
            Some(row) => Ok(Some(Submission::from_db(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn update_category(
        &self,
        id: SubmissionId,
        category: Option<ClipCategory>,
        payment_amount: Decimal,
    ) -> Result<Option<Submission>, anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        let updated = query_as::<_, SubmissionRow>(&format!(
            "UPDATE submissions SET category = $2, payment_amount = $3
             WHERE id = $1
             RETURNING {SUBMISSION_COLUMNS}"
        ))
        .bind(id.to_db()?)
        .bind(category.as_ref().map(DbConvertible::to_db).transpose()?)
        .bind(payment_amount.to_db()?)
        .fetch_optional(&mut *transaction)
        .await?;

        transaction.commit().await?;

        match updated {
            Some(row) => Ok(Some(Submission::from_db(&row)?)),
            None => Ok(None),
        }
    }

    /// Deletes the row and hands back the stored-file path (if any) so the
    /// caller can clean up the object store.
    pub async fn delete(&self, id: SubmissionId) -> Result<Option<Option<String>>, anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        let file_path: Option<(Option<String>,)> =
            query_as("DELETE FROM submissions WHERE id = $1 RETURNING file_path")
                .bind(id.to_db()?)
                .fetch_optional(&mut *transaction)
                .await?;

        transaction.commit().await?;

        Ok(file_path.map(|(path,)| path))
    }
}

#[derive(Debug, FromRow)]
pub struct SubmissionRow {
    id: i64,
    owner_email: Option<String>,
    link: Option<String>,
    file_path: Option<String>,
    view_count: i64,
    payment_amount: String,
    category: Option<String>,
    created_at: String,
}

impl DbConvertible for Submission {
    type DbType = SubmissionRow;

    fn to_db(&self) -> Result<Self::DbType, DbToConversionError> {
        Ok(SubmissionRow {
            id: self.id.to_db()?,
            owner_email: self.owner_email.clone(),
            link: self.link.clone(),
            file_path: self.file_path.clone(),
            view_count: self.view_count as i64,
            payment_amount: self.payment_amount.to_db()?,
            category: self.category.as_ref().map(DbConvertible::to_db).transpose()?,
            created_at: self.created_at.to_db()?,
        })
    }

    fn from_db(value: &Self::DbType) -> Result<Self, DbFromConversionError> {
        if value.view_count < 0 {
            return Err(DbFromConversionError::InvalidNumber(value.view_count));
        }

        Ok(Submission {
            id: SubmissionId::from_db(&value.id)?,
            owner_email: value.owner_email.clone(),
            link: value.link.clone(),
            file_path: value.file_path.clone(),
            view_count: value.view_count as u64,
            payment_amount: Decimal::from_db(&value.payment_amount)?,
            category: value
                .category
                .as_ref()
                .map(ClipCategory::from_db)
                .transpose()?,
            created_at: UtcDateTime::from_db(&value.created_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::models::{types::UtcDateTime, ClipCategory, NewSubmission};
    use crate::repository::test_pool;

    use super::SubmissionRepository;

    fn new_submission(owner: &str, views: u64) -> NewSubmission {
        NewSubmission {
            owner_email: owner.to_owned(),
            link: Some("https://youtu.be/abc123".to_owned()),
            file_path: None,
            view_count: views,
            payment_amount: Decimal::new(100, 2),
            category: Some(ClipCategory::Shorts),
            created_at: UtcDateTime::now(),
        }
    }

    #[tokio::test]
    async fn insert_and_fetch_round_trip() {
        let repository = SubmissionRepository::new(test_pool().await);

        let inserted = repository
            .insert(&new_submission("a@x.com", 2000))
            .await
            .unwrap();

        let all = repository.get_all().await.unwrap();
        assert_eq!(all, vec![inserted.clone()]);
        assert_eq!(inserted.view_count, 2000);
        assert_eq!(inserted.payment_amount, Decimal::new(100, 2));
        assert_eq!(inserted.category, Some(ClipCategory::Shorts));
    }

    #[tokio::test]
    async fn update_views_reprices_in_one_statement() {
        let repository = SubmissionRepository::new(test_pool().await);
        let inserted = repository
            .insert(&new_submission("a@x.com", 2000))
            .await
            .unwrap();

        let updated = repository
            .update_views(inserted.id, 6000, Decimal::new(300, 2))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.view_count, 6000);
        assert_eq!(updated.payment_amount, Decimal::new(300, 2));
    }

    #[tokio::test]
    async fn delete_returns_stored_file_path() {
        let repository = SubmissionRepository::new(test_pool().await);
        let mut submission = new_submission("a@x.com", 0);
        submission.link = None;
        submission.file_path = Some("uploads/a/clip.mp4".to_owned());
        let inserted = repository.insert(&submission).await.unwrap();

        let deleted = repository.delete(inserted.id).await.unwrap();

        assert_eq!(deleted, Some(Some("uploads/a/clip.mp4".to_owned())));
        assert!(repository.get_all().await.unwrap().is_empty());
        assert_eq!(repository.delete(inserted.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn get_by_owner_filters_other_contributors() {
        let repository = SubmissionRepository::new(test_pool().await);
        repository
            .insert(&new_submission("a@x.com", 100))
            .await
            .unwrap();
        repository
            .insert(&new_submission("b@x.com", 200))
            .await
            .unwrap();

        let owned = repository.get_by_owner("a@x.com").await.unwrap();

        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].owner_email.as_deref(), Some("a@x.com"));
    }

    #[tokio::test]
    async fn counts_owner_submissions_in_window() {
        let repository = SubmissionRepository::new(test_pool().await);
        repository
            .insert(&new_submission("a@x.com", 0))
            .await
            .unwrap();
        repository
            .insert(&new_submission("a@x.com", 0))
            .await
            .unwrap();
        repository
            .insert(&new_submission("b@x.com", 0))
            .await
            .unwrap();

        let cutoff = UtcDateTime::now() - time::Duration::hours(24);
        let count = repository
            .count_by_owner_since("a@x.com", cutoff)
            .await
            .unwrap();

        assert_eq!(count, 2);
    }
}
