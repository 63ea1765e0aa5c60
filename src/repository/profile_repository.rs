use sqlx::{query_as, FromRow, Pool, Sqlite};

use crate::models::{types::UtcDateTime, Profile, ProfileId};

use super::conversion::{DbConvertible, DbFromConversionError, DbToConversionError};

pub struct ProfileRepository {
    pool: Pool<Sqlite>,
}

impl ProfileRepository {
    pub fn new(pool: Pool<Sqlite>) -> ProfileRepository {
        ProfileRepository { pool }
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<Profile>, anyhow::Error> {
        let row = query_as::<_, ProfileRow>(
            "SELECT id, email, created_at FROM profiles WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Profile::from_db(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn create(&self, email: &str) -> Result<Profile, anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        let created_at = UtcDateTime::now().to_db()?;
        let inserted = query_as::<_, ProfileRow>(
            "INSERT INTO profiles (email, created_at)
             VALUES ($1, $2)
             RETURNING id, email, created_at",
        )
        .bind(email)
        .bind(created_at)
        .fetch_one(&mut *transaction)
        .await?;

        transaction.commit().await?;

        Ok(Profile::from_db(&inserted)?)
    }
}

#[derive(Debug, FromRow)]
pub struct ProfileRow {
    id: i64,
    email: String,
    created_at: String,
}

impl DbConvertible for Profile {
    type DbType = ProfileRow;

    fn to_db(&self) -> Result<Self::DbType, DbToConversionError> {
        Ok(ProfileRow {
            id: self.id.to_db()?,
            email: self.email.clone(),
            created_at: self.created_at.to_db()?,
        })
    }

    fn from_db(value: &Self::DbType) -> Result<Self, DbFromConversionError> {
        Ok(Profile {
            id: ProfileId::from_db(&value.id)?,
            email: value.email.clone(),
            created_at: UtcDateTime::from_db(&value.created_at)?,
        })
    }
}
