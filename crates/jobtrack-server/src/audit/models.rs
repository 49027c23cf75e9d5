//! Audit data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::ClientInfo;

/// Audit log entry from the database
///
/// Serialization exposes the client-facing projection only: the acting user,
/// the attempted login identity and the user agent stay server-side.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AuditEntry {
    pub id: i64,
    #[serde(skip)]
    pub user_id: Option<i64>,
    /// Identity submitted with a failed login
    #[serde(skip)]
    pub input_email: String,
    pub action: String,
    pub target_type: String,
    pub target_id: Option<i64>,
    pub ip_address: Option<String>,
    #[serde(skip)]
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
}

/// Column list matching [`AuditEntry`]
pub(crate) const AUDIT_COLUMNS: &str =
    "id, user_id, input_email, action, target_type, target_id, ip_address, user_agent, created_at";

/// Audit action types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    LoginSuccess,
    LoginFail,
    Logout,
    CompanyCreate,
    CompanyUpdate,
    CompanyDelete,
    EsCreate,
    EsUpdate,
    EsDelete,
    SettingsUpdate,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoginSuccess => "LOGIN_SUCCESS",
            Self::LoginFail => "LOGIN_FAIL",
            Self::Logout => "LOGOUT",
            Self::CompanyCreate => "COMPANY_CREATE",
            Self::CompanyUpdate => "COMPANY_UPDATE",
            Self::CompanyDelete => "COMPANY_DELETE",
            Self::EsCreate => "ES_CREATE",
            Self::EsUpdate => "ES_UPDATE",
            Self::EsDelete => "ES_DELETE",
            Self::SettingsUpdate => "SETTINGS_UPDATE",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// New audit entry to insert
#[derive(Debug, Clone)]
pub struct CreateAuditEntry {
    pub user_id: Option<i64>,
    pub input_email: String,
    pub action: AuditAction,
    pub target_type: String,
    pub target_id: Option<i64>,
    pub ip_address: Option<String>,
    pub user_agent: String,
}

impl CreateAuditEntry {
    pub fn builder(action: AuditAction) -> AuditEntryBuilder {
        AuditEntryBuilder {
            entry: CreateAuditEntry {
                user_id: None,
                input_email: String::new(),
                action,
                target_type: String::new(),
                target_id: None,
                ip_address: None,
                user_agent: String::new(),
            },
        }
    }
}

/// Builder for [`CreateAuditEntry`]
#[derive(Debug, Clone)]
pub struct AuditEntryBuilder {
    entry: CreateAuditEntry,
}

impl AuditEntryBuilder {
    pub fn user(mut self, user_id: i64) -> Self {
        self.entry.user_id = Some(user_id);
        self
    }

    pub fn input_email(mut self, identifier: impl Into<String>) -> Self {
        self.entry.input_email = identifier.into();
        self
    }

    pub fn target(mut self, target_type: impl Into<String>, target_id: i64) -> Self {
        self.entry.target_type = target_type.into();
        self.entry.target_id = Some(target_id);
        self
    }

    /// Copy IP address and user agent from the request
    pub fn client(mut self, client: &ClientInfo) -> Self {
        self.entry.ip_address = client.ip_address.clone();
        self.entry.user_agent = client.user_agent.clone();
        self
    }

    pub fn build(self) -> CreateAuditEntry {
        self.entry
    }
}

/// Sort order for audit listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuditOrdering {
    #[default]
    Newest,
    Oldest,
}

impl AuditOrdering {
    /// Unknown values fall back to the default
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("created_at") => Self::Oldest,
            _ => Self::Newest,
        }
    }

    pub(crate) fn sql(&self) -> &'static str {
        match self {
            Self::Newest => "created_at DESC, id DESC",
            Self::Oldest => "created_at ASC, id ASC",
        }
    }
}

/// Query parameters for listing audit logs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditQuery {
    pub action: Option<AuditAction>,
    pub ordering: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names_match_serde() {
        for action in [
            AuditAction::LoginSuccess,
            AuditAction::LoginFail,
            AuditAction::Logout,
            AuditAction::CompanyCreate,
            AuditAction::CompanyUpdate,
            AuditAction::CompanyDelete,
            AuditAction::EsCreate,
            AuditAction::EsUpdate,
            AuditAction::EsDelete,
            AuditAction::SettingsUpdate,
        ] {
            let json = serde_json::to_value(action).unwrap();
            assert_eq!(json, action.as_str());
        }
    }

    #[test]
    fn test_builder_sets_client_metadata() {
        let client = ClientInfo {
            ip_address: Some("203.0.113.9".into()),
            user_agent: "Mozilla/5.0".into(),
            ..ClientInfo::default()
        };
        let entry = CreateAuditEntry::builder(AuditAction::LoginFail)
            .input_email("who@example.com")
            .client(&client)
            .build();

        assert_eq!(entry.user_id, None);
        assert_eq!(entry.input_email, "who@example.com");
        assert_eq!(entry.ip_address.as_deref(), Some("203.0.113.9"));
        assert_eq!(entry.user_agent, "Mozilla/5.0");
        assert_eq!(entry.target_id, None);
    }

    #[test]
    fn test_ordering_parse() {
        assert_eq!(AuditOrdering::parse(None), AuditOrdering::Newest);
        assert_eq!(AuditOrdering::parse(Some("created_at")), AuditOrdering::Oldest);
        assert_eq!(AuditOrdering::parse(Some("-created_at")), AuditOrdering::Newest);
        assert_eq!(AuditOrdering::parse(Some("ip_address")), AuditOrdering::Newest);
    }
}
