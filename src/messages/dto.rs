use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::repo::MessageDetailRow;
use crate::users::repo::UserSummary;

/// Request body for sending a message. The sender is the authenticated
/// principal, never a request field.
#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub to_username: String,
    pub body: String,
}

/// A message with both parties expanded to public profiles.
#[derive(Debug, Serialize)]
pub struct MessageDetail {
    pub id: i64,
    pub body: String,
    pub sent_at: OffsetDateTime,
    pub read_at: Option<OffsetDateTime>,
    pub from_user: UserSummary,
    pub to_user: UserSummary,
}

/// A received message, expanded with the sender.
#[derive(Debug, Serialize)]
pub struct ReceivedMessage {
    pub id: i64,
    pub body: String,
    pub sent_at: OffsetDateTime,
    pub read_at: Option<OffsetDateTime>,
    pub from_user: UserSummary,
}

/// A sent message, expanded with the recipient.
#[derive(Debug, Serialize)]
pub struct SentMessage {
    pub id: i64,
    pub body: String,
    pub sent_at: OffsetDateTime,
    pub read_at: Option<OffsetDateTime>,
    pub to_user: UserSummary,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: MessageDetail,
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse<T> {
    pub messages: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct ReadReceipt {
    pub id: i64,
    pub read_at: Option<OffsetDateTime>,
}

#[derive(Debug, Serialize)]
pub struct ReadResponse {
    pub message: ReadReceipt,
}

impl MessageDetailRow {
    fn from_user(&self) -> UserSummary {
        UserSummary {
            username: self.from_username.clone(),
            first_name: self.from_first_name.clone(),
            last_name: self.from_last_name.clone(),
            phone: self.from_phone.clone(),
        }
    }

    fn to_user(&self) -> UserSummary {
        UserSummary {
            username: self.to_username.clone(),
            first_name: self.to_first_name.clone(),
            last_name: self.to_last_name.clone(),
            phone: self.to_phone.clone(),
        }
    }
}

impl From<MessageDetailRow> for MessageDetail {
    fn from(row: MessageDetailRow) -> Self {
        let from_user = row.from_user();
        let to_user = row.to_user();
        Self {
            id: row.id,
            body: row.body,
            sent_at: row.sent_at,
            read_at: row.read_at,
            from_user,
            to_user,
        }
    }
}

impl From<MessageDetailRow> for ReceivedMessage {
    fn from(row: MessageDetailRow) -> Self {
        let from_user = row.from_user();
        Self {
            id: row.id,
            body: row.body,
            sent_at: row.sent_at,
            read_at: row.read_at,
            from_user,
        }
    }
}

impl From<MessageDetailRow> for SentMessage {
    fn from(row: MessageDetailRow) -> Self {
        let to_user = row.to_user();
        Self {
            id: row.id,
            body: row.body,
            sent_at: row.sent_at,
            read_at: row.read_at,
            to_user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn row() -> MessageDetailRow {
        MessageDetailRow {
            id: 7,
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
        }
    }

    #[test]
    fn detail_expands_both_parties() {
        let detail = MessageDetail::from(row());
        assert_eq!(detail.from_user.username, "alice");
        assert_eq!(detail.to_user.username, "bob");

        let json = serde_json::to_value(&detail).unwrap();
        assert!(json["read_at"].is_null());
        assert_eq!(json["from_user"]["first_name"], "Alice");
        assert_eq!(json["to_user"]["phone"], "+14155550001");
        // public profile fields only
        assert!(json["from_user"].get("password").is_none());
    }

    #[test]
    fn received_message_expands_the_sender_only() {
        let json = serde_json::to_value(ReceivedMessage::from(row())).unwrap();
        assert_eq!(json["from_user"]["username"], "alice");
        assert!(json.get("to_user").is_none());
    }

    #[test]
    fn sent_message_expands_the_recipient_only() {
        let json = serde_json::to_value(SentMessage::from(row())).unwrap();
        assert_eq!(json["to_user"]["username"], "bob");
        assert!(json.get("from_user").is_none());
    }
}
