//! Company record, list ordering and audit mapping

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::audit::{AuditAction, AuditPolicy, AuditTarget};
use crate::features::shared::OwnedResource;

pub const MAX_NAME_LENGTH: usize = 200;
pub const MAX_SHORT_TEXT_LENGTH: usize = 200;

pub static COMPANY_AUDIT: AuditPolicy = AuditPolicy {
    target_type: "Company",
    on_create: AuditAction::CompanyCreate,
    on_update: AuditAction::CompanyUpdate,
    on_delete: AuditAction::CompanyDelete,
};

pub(crate) const COMPANY_COLUMNS: &str = "id, owner_id, name, job_role, apply_route, deadline, \
                                          status_text, memo, created_at, updated_at";

/// A company the user is applying to
///
/// The owner is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Company {
    pub id: i64,
    #[serde(skip)]
    pub owner_id: i64,
    pub name: String,
    pub job_role: String,
    pub apply_route: String,
    pub deadline: Option<NaiveDate>,
    pub status_text: String,
    pub memo: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for Company {
    const TABLE: &'static str = "companies";
    const COLUMNS: &'static str = COMPANY_COLUMNS;
}

impl AuditTarget for Company {
    fn audit_target_id(&self) -> i64 {
        self.id
    }
}

/// `?ordering=` values accepted on the company list
///
/// Missing deadlines sort after present ones when ascending and before them
/// when descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompanyOrdering {
    /// Deadline ascending, then most recently updated first
    #[default]
    Default,
    Deadline,
    DeadlineDesc,
    UpdatedAt,
    UpdatedAtDesc,
}

impl CompanyOrdering {
    /// Anything outside the allow-list falls back to the default
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("deadline") => Self::Deadline,
            Some("-deadline") => Self::DeadlineDesc,
            Some("updated_at") => Self::UpdatedAt,
            Some("-updated_at") => Self::UpdatedAtDesc,
            _ => Self::Default,
        }
    }

    pub(crate) fn sql(&self) -> &'static str {
        match self {
            Self::Default => "deadline IS NULL, deadline ASC, updated_at DESC, id DESC",
            Self::Deadline => "deadline IS NULL, deadline ASC, id ASC",
            Self::DeadlineDesc => "deadline IS NULL DESC, deadline DESC, id DESC",
            Self::UpdatedAt => "updated_at ASC, id ASC",
            Self::UpdatedAtDesc => "updated_at DESC, id DESC",
        }
    }
}
