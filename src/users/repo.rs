use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String, // Argon2 PHC digest, not exposed in JSON
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub join_at: OffsetDateTime,
    pub last_login_at: OffsetDateTime,
}

/// Public part of a user, as embedded in listings and message parties.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSummary {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl User {
    /// Insert a new user. `join_at` and `last_login_at` are both stamped
    /// now: registration counts as a login.
    pub async fn create(
        db: &PgPool,
        username: &str,
        password_hash: &str,
        first_name: &str,
        last_name: &str,
        phone: &str,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password, first_name, last_name, phone, join_at, last_login_at)
            VALUES ($1, $2, $3, $4, $5, now(), now())
            RETURNING username, password, first_name, last_name, phone, join_at, last_login_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(first_name)
        .bind(last_name)
        .bind(phone)
        .fetch_one(db)
        .await
    }

    /// Find a user by username.
    pub async fn find_by_username(db: &PgPool, username: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT username, password, first_name, last_name, phone, join_at, last_login_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await
    }

    pub async fn update_last_login(db: &PgPool, username: &str) -> sqlx::Result<()> {
        sqlx::query("UPDATE users SET last_login_at = now() WHERE username = $1")
            .bind(username)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Basic info on all users, ordered by username.
    pub async fn list_all(db: &PgPool) -> sqlx::Result<Vec<UserSummary>> {
        sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT username, first_name, last_name, phone
            FROM users
            ORDER BY username
            "#,
        )
        .fetch_all(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn serialized_user_never_contains_the_password_hash() {
        let user = User {
            username: "alice".into(),
            password: "$argon2id$v=19$m=8,t=1,p=1$c29tZXNhbHQ$hash".into(),
            first_name: "Alice".into(),
            last_name: "Ames".into(),
            phone: "+14155550000".into(),
            join_at: datetime!(2024-01-01 00:00 UTC),
            last_login_at: datetime!(2024-01-02 00:00 UTC),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
        assert!(json.contains("\"username\":\"alice\""));
        assert!(json.contains("join_at"));
        assert!(json.contains("last_login_at"));
    }
}
