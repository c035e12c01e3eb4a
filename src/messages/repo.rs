use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// Message record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Message {
    pub id: i64,
    pub from_username: String,
    pub to_username: String,
    pub body: String,
    pub sent_at: OffsetDateTime,
    pub read_at: Option<OffsetDateTime>,
}

impl Message {
    /// Read access: sender or recipient only.
    pub fn involves(&self, username: &str) -> bool {
        self.from_username == username || self.to_username == username
    }

    /// Mark-read access: the recipient, exactly.
    pub fn sent_to(&self, username: &str) -> bool {
        self.to_username == username
    }

    pub async fn create(
        db: &PgPool,
        from_username: &str,
        to_username: &str,
        body: &str,
    ) -> sqlx::Result<Message> {
        sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (from_username, to_username, body, sent_at)
            VALUES ($1, $2, $3, now())
            RETURNING id, from_username, to_username, body, sent_at, read_at
            "#,
        )
        .bind(from_username)
        .bind(to_username)
        .bind(body)
        .fetch_one(db)
        .await
    }

    pub async fn find(db: &PgPool, id: i64) -> sqlx::Result<Option<Message>> {
        sqlx::query_as::<_, Message>(
            r#"
            SELECT id, from_username, to_username, body, sent_at, read_at
            FROM messages
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Re-stamps `read_at`; the route layer restricts this to the
    /// recipient and the column only ever moves null -> timestamp.
    pub async fn mark_read(db: &PgPool, id: i64) -> sqlx::Result<Message> {
        sqlx::query_as::<_, Message>(
            r#"
            UPDATE messages
            SET read_at = now()
            WHERE id = $1
            RETURNING id, from_username, to_username, body, sent_at, read_at
            "#,
        )
        .bind(id)
        .fetch_one(db)
        .await
    }

    pub async fn find_detail(db: &PgPool, id: i64) -> sqlx::Result<Option<MessageDetailRow>> {
        sqlx::query_as::<_, MessageDetailRow>(&detail_query("m.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Messages received by `username`, oldest id first.
    pub async fn list_to(db: &PgPool, username: &str) -> sqlx::Result<Vec<MessageDetailRow>> {
        sqlx::query_as::<_, MessageDetailRow>(&detail_query("m.to_username = $1"))
            .bind(username)
            .fetch_all(db)
            .await
    }

    /// Messages sent by `username`, oldest id first.
    pub async fn list_from(db: &PgPool, username: &str) -> sqlx::Result<Vec<MessageDetailRow>> {
        sqlx::query_as::<_, MessageDetailRow>(&detail_query("m.from_username = $1"))
            .bind(username)
            .fetch_all(db)
            .await
    }
}

/// Flat row for a message joined with both parties' public profiles.
#[derive(Debug, Clone, FromRow)]
pub struct MessageDetailRow {
    pub id: i64,
    pub body: String,
    pub sent_at: OffsetDateTime,
    pub read_at: Option<OffsetDateTime>,
    pub from_username: String,
    pub from_first_name: String,
    pub from_last_name: String,
    pub from_phone: String,
    pub to_username: String,
    pub to_first_name: String,
    pub to_last_name: String,
    pub to_phone: String,
}

impl MessageDetailRow {
    pub fn involves(&self, username: &str) -> bool {
        self.from_username == username || self.to_username == username
    }
}

fn detail_query(filter: &str) -> String {
    format!(
        r#"
        SELECT m.id, m.body, m.sent_at, m.read_at,
               f.username   AS from_username,
               f.first_name AS from_first_name,
               f.last_name  AS from_last_name,
               f.phone      AS from_phone,
               t.username   AS to_username,
               t.first_name AS to_first_name,
               t.last_name  AS to_last_name,
               t.phone      AS to_phone
        FROM messages m
        JOIN users f ON f.username = m.from_username
        JOIN users t ON t.username = m.to_username
        WHERE {filter}
        ORDER BY m.id
        "#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn message(from: &str, to: &str) -> Message {
        Message {
            id: 1,
            from_username: from.into(),
            to_username: to.into(),
            body: "hi".into(),
            sent_at: datetime!(2024-01-01 00:00 UTC),
            read_at: None,
        }
    }

    #[test]
    fn sender_and_recipient_are_parties() {
        let m = message("alice", "bob");
        assert!(m.involves("alice"));
        assert!(m.involves("bob"));
        assert!(!m.involves("mallory"));
    }

    #[test]
    fn only_the_recipient_may_mark_read() {
        let m = message("alice", "bob");
        assert!(m.sent_to("bob"));
        assert!(!m.sent_to("alice"));
        assert!(!m.sent_to("mallory"));
    }

    #[test]
    fn detail_row_party_check_compares_usernames() {
        let row = MessageDetailRow {
            id: 1,
            body: "hi".into(),
            sent_at: datetime!(2024-01-01 00:00 UTC),
            read_at: None,
            from_username: "alice".into(),
            from_first_name: "Alice".into(),
            from_last_name: "Ames".into(),
            from_phone: "+14155550000".into(),
            to_username: "bob".into(),
            to_first_name: "Bob".into(),
            to_last_name: "Burke".into(),
            to_phone: "+14155550001".into(),
        };
        assert!(row.involves("alice"));
        assert!(row.involves("bob"));
        assert!(!row.involves("mallory"));
    }
}
