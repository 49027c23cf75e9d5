//! Test helpers and fixtures for database tests
//!
//! Every test gets its own migrated in-memory database.
//!
//! ```rust,ignore
//! let pool = test_pool().await;
//! let user = TestUser::new("taro@example.com").insert(&pool).await?;
//! let company = TestCompany::new(&user, "Acme")
//!     .with_deadline("2026-03-01")
//!     .insert(&pool)
//!     .await?;
//! let es = TestEsVersion::new(&user, &company).with_body("draft").insert(&pool).await?;
//! ```

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;

/// Fresh in-memory database with all migrations applied
pub async fn test_pool() -> SqlitePool {
    crate::db::connect_in_memory()
        .await
        .expect("failed to create in-memory test database")
}

/// Inserted user row
#[derive(Debug, Clone)]
pub struct TestUserRecord {
    pub id: i64,
    pub email: String,
}

/// Builder for creating test users
///
/// The password hash is a placeholder; tests that log in go through the
/// HTTP register endpoint instead.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub email: String,
    pub password_hash: String,
}

impl TestUser {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            password_hash: "!unusable".to_string(),
        }
    }

    pub fn with_password_hash(mut self, hash: &str) -> Self {
        self.password_hash = hash.to_string();
        self
    }

    pub async fn insert(self, pool: &SqlitePool) -> Result<TestUserRecord, sqlx::Error> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (username, email, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&self.email)
        .bind(&self.email)
        .bind(&self.password_hash)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(TestUserRecord {
            id,
            email: self.email,
        })
    }
}

/// Inserted company row
#[derive(Debug, Clone)]
pub struct TestCompanyRecord {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
}

/// Builder for creating test companies
#[derive(Debug, Clone)]
pub struct TestCompany {
    pub owner_id: i64,
    pub name: String,
    pub deadline: Option<NaiveDate>,
    pub memo: String,
}

impl TestCompany {
    pub fn new(owner: &TestUserRecord, name: &str) -> Self {
        Self {
            owner_id: owner.id,
            name: name.to_string(),
            deadline: None,
            memo: String::new(),
        }
    }

    /// Deadline as `YYYY-MM-DD`
    pub fn with_deadline(mut self, deadline: &str) -> Self {
        self.deadline = NaiveDate::parse_from_str(deadline, "%Y-%m-%d").ok();
        self
    }

    pub fn with_memo(mut self, memo: &str) -> Self {
        self.memo = memo.to_string();
        self
    }

    pub async fn insert(self, pool: &SqlitePool) -> Result<TestCompanyRecord, sqlx::Error> {
        let now = Utc::now();
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO companies (owner_id, name, deadline, memo, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(self.owner_id)
        .bind(&self.name)
        .bind(self.deadline)
        .bind(&self.memo)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(TestCompanyRecord {
            id,
            owner_id: self.owner_id,
            name: self.name,
        })
    }
}

/// Inserted entry-sheet version row
#[derive(Debug, Clone)]
pub struct TestEsVersionRecord {
    pub id: i64,
    pub company_id: i64,
}

/// Builder for creating test entry-sheet versions
#[derive(Debug, Clone)]
pub struct TestEsVersion {
    pub owner_id: i64,
    pub company_id: i64,
    pub body: String,
    pub file: Option<String>,
}

impl TestEsVersion {
    pub fn new(owner: &TestUserRecord, company: &TestCompanyRecord) -> Self {
        Self {
            owner_id: owner.id,
            company_id: company.id,
            body: String::new(),
            file: None,
        }
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    /// Stored path relative to the media root, e.g. `es_files/abc_resume.pdf`
    pub fn with_file(mut self, file: &str) -> Self {
        self.file = Some(file.to_string());
        self
    }

    pub async fn insert(self, pool: &SqlitePool) -> Result<TestEsVersionRecord, sqlx::Error> {
        let now = Utc::now();
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO es_versions (owner_id, company_id, body, file, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(self.owner_id)
        .bind(self.company_id)
        .bind(&self.body)
        .bind(&self.file)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(TestEsVersionRecord {
            id,
            company_id: self.company_id,
        })
    }
}
