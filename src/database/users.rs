use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

use super::{DatabaseError, DatabaseManager};

/// A row of the auth service's user table
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub image: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Read access to registered users for the dashboard
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

const LIST_USERS: &str = r#"
    SELECT
        id, name, email,
        "emailVerified" AS email_verified,
        image,
        "createdAt" AS created_at,
        "updatedAt" AS updated_at
    FROM "user"
    ORDER BY "createdAt"
"#;

pub struct PgUserDirectory {
    manager: DatabaseManager,
}

impl PgUserDirectory {
    pub fn new(manager: DatabaseManager) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let users = sqlx::query_as::<_, User>(LIST_USERS)
            .fetch_all(self.manager.pool()?)
            .await?;
        Ok(users)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.manager.health_check().await
    }
}
