//! Entry-sheet version records and projections

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::audit::{AuditAction, AuditPolicy, AuditTarget};
use crate::features::shared::OwnedResource;
use crate::storage::media_url;

pub const MAX_SUBMITTED_VIA_LENGTH: usize = 200;

pub static ES_AUDIT: AuditPolicy = AuditPolicy {
    target_type: "ESVersion",
    on_create: AuditAction::EsCreate,
    on_update: AuditAction::EsUpdate,
    on_delete: AuditAction::EsDelete,
};

pub(crate) const ES_COLUMNS: &str = "id, owner_id, company_id, body, submitted_at, submitted_via, \
                                     result, memo, file, created_at, updated_at";

const ES_SUMMARY_COLUMNS: &str = "id, owner_id, company_id, submitted_at, submitted_via, \
                                  result, memo, file, created_at, updated_at";

/// Selection outcome of a submission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum EsResult {
    #[default]
    Unknown,
    Pass,
    Fail,
}

impl EsResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }
}

impl fmt::Display for EsResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("\"{0}\" is not a valid choice.")]
pub struct InvalidEsResult(pub String);

impl FromStr for EsResult {
    type Err = InvalidEsResult;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNKNOWN" => Ok(Self::Unknown),
            "PASS" => Ok(Self::Pass),
            "FAIL" => Ok(Self::Fail),
            other => Err(InvalidEsResult(other.to_string())),
        }
    }
}

fn serialize_file_url<S: Serializer>(file: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    match file {
        Some(relative) if !relative.is_empty() => serializer.serialize_some(&media_url(relative)),
        _ => serializer.serialize_none(),
    }
}

/// Full projection, returned by retrieve, create and update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct EsVersion {
    pub id: i64,
    #[serde(skip)]
    pub owner_id: i64,
    #[serde(rename = "company")]
    pub company_id: i64,
    pub body: String,
    pub submitted_at: Option<NaiveDate>,
    pub submitted_via: String,
    pub result: EsResult,
    pub memo: String,
    /// Stored path relative to the media root
    #[serde(serialize_with = "serialize_file_url")]
    pub file: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for EsVersion {
    const TABLE: &'static str = "es_versions";
    const COLUMNS: &'static str = ES_COLUMNS;
}

impl AuditTarget for EsVersion {
    fn audit_target_id(&self) -> i64 {
        self.id
    }
}

/// List projection; everything except `body`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct EsVersionSummary {
    pub id: i64,
    #[serde(skip)]
    pub owner_id: i64,
    #[serde(rename = "company")]
    pub company_id: i64,
    pub submitted_at: Option<NaiveDate>,
    pub submitted_via: String,
    pub result: EsResult,
    pub memo: String,
    #[serde(serialize_with = "serialize_file_url")]
    pub file: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for EsVersionSummary {
    const TABLE: &'static str = "es_versions";
    const COLUMNS: &'static str = ES_SUMMARY_COLUMNS;
}
