use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;
use time::{format_description::well_known::Iso8601, OffsetDateTime};

use crate::models::{
    types::UtcDateTime, ClipCategory, PaymentId, PaymentStatus, ProfileId, SubmissionId,
};

/// Two-way mapping between a domain type and its SQLite column
/// representation. Conversions validate on the way out of the database and
/// fail with a typed error on unexpected shapes instead of trusting a cast.
pub trait DbConvertible: Sized {
    type DbType;

    fn to_db(&self) -> Result<Self::DbType, DbToConversionError>;

    fn from_db(value: &Self::DbType) -> Result<Self, DbFromConversionError>;
}

#[derive(Debug, Error)]
pub enum DbFromConversionError {
    #[error("Failed to parse datetime: {0}")]
    DateTime(#[from] time::error::Parse),
    #[error("Failed to parse enum variant: {0}")]
    NoSuchVariant(String),
    #[error("Failed to parse decimal amount: {0}")]
    Amount(#[from] rust_decimal::Error),
    #[error("Failed to parse id list: {0}")]
    IdList(#[from] serde_json::Error),
    #[error("Invalid number: {0}")]
    InvalidNumber(i64),
}

#[derive(Debug, Error)]
pub enum DbToConversionError {
    #[error("Failed to format datetime")]
    DateTime(#[from] time::error::Format),
    #[error("Failed to serialize id list: {0}")]
    IdList(#[from] serde_json::Error),
}

impl DbConvertible for UtcDateTime {
    type DbType = String;

    fn to_db(&self) -> Result<Self::DbType, DbToConversionError> {
        let string = OffsetDateTime::from(*self).format(&Iso8601::DEFAULT)?;
        Ok(string)
    }

    fn from_db(value: &Self::DbType) -> Result<Self, DbFromConversionError> {
        let datetime = OffsetDateTime::parse(value, &Iso8601::DEFAULT)?;
        Ok(UtcDateTime::from(datetime))
    }
}

impl DbConvertible for SubmissionId {
    type DbType = i64;

    fn to_db(&self) -> Result<Self::DbType, DbToConversionError> {
        Ok(self.0 as _)
    }

    fn from_db(value: &Self::DbType) -> Result<Self, DbFromConversionError> {
        if *value < 0 {
            return Err(DbFromConversionError::InvalidNumber(*value));
        }
        Ok(SubmissionId(*value as _))
    }
}

impl DbConvertible for PaymentId {
    type DbType = i64;

    fn to_db(&self) -> Result<Self::DbType, DbToConversionError> {
        Ok(self.0 as _)
    }

    fn from_db(value: &Self::DbType) -> Result<Self, DbFromConversionError> {
        if *value < 0 {
            return Err(DbFromConversionError::InvalidNumber(*value));
        }
        Ok(PaymentId(*value as _))
    }
}

impl DbConvertible for ProfileId {
    type DbType = i64;

    fn to_db(&self) -> Result<Self::DbType, DbToConversionError> {
        Ok(self.0 as _)
    }

    fn from_db(value: &Self::DbType) -> Result<Self, DbFromConversionError> {
        if *value < 0 {
            return Err(DbFromConversionError::InvalidNumber(*value));
        }
        Ok(ProfileId(*value as _))
    }
}

impl DbConvertible for Decimal {
    type DbType = String;

    fn to_db(&self) -> Result<Self::DbType, DbToConversionError> {
        Ok(self.to_string())
    }

    fn from_db(value: &Self::DbType) -> Result<Self, DbFromConversionError> {
        Ok(Decimal::from_str(value)?)
    }
}

impl DbConvertible for PaymentStatus {
    type DbType = String;

    fn to_db(&self) -> Result<Self::DbType, DbToConversionError> {
        Ok(self.to_string())
    }

    fn from_db(value: &Self::DbType) -> Result<Self, DbFromConversionError> {
        PaymentStatus::from_str(value)
            .map_err(|_| DbFromConversionError::NoSuchVariant(value.clone()))
    }
}

impl DbConvertible for ClipCategory {
    type DbType = String;

    fn to_db(&self) -> Result<Self::DbType, DbToConversionError> {
        Ok(self.to_string())
    }

    fn from_db(value: &Self::DbType) -> Result<Self, DbFromConversionError> {
        ClipCategory::from_str(value)
            .map_err(|_| DbFromConversionError::NoSuchVariant(value.clone()))
    }
}

// Covered-submission sets are stored as a JSON array in a single column,
// mirroring how payments recorded them upstream.
impl DbConvertible for Vec<SubmissionId> {
    type DbType = String;

    fn to_db(&self) -> Result<Self::DbType, DbToConversionError> {
        let raw: Vec<i64> = self.iter().map(|id| id.0 as i64).collect();
        Ok(serde_json::to_string(&raw)?)
    }

    fn from_db(value: &Self::DbType) -> Result<Self, DbFromConversionError> {
        let raw: Vec<i64> = serde_json::from_str(value)?;
        raw.iter().map(SubmissionId::from_db).collect()
    }
}
