// SPDX-FileCopyrightText: 2023 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use serde::{Deserialize, Serialize};

use crate::identifiers::{RoomId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    Video,
    Image,
    Document,
    Links,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    #[default]
    Sent,
    Delivered,
    Seen,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub room_id: RoomId,
    pub sender_id: UserId,
    #[serde(default)]
    pub message_text: Option<String>,
    #[serde(default)]
    pub message_type: MessageType,
    pub created_at: String,
    #[serde(default)]
    pub file_links: Option<Vec<String>>,
    #[serde(default)]
    pub status: MessageStatus,
    #[serde(default)]
    pub seen_by: Vec<UserId>,
}

impl Message {
    pub fn is_seen_by(&self, user_id: UserId) -> bool {
        self.seen_by.contains(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_defaults() {
        let message: Message = serde_json::from_str(
            r#"{"id": "m1", "room_id": "r1", "sender_id": 2, "created_at": "2024-05-01 10:00"}"#,
        )
        .unwrap();
        assert_eq!(message.message_type, MessageType::Text);
        assert_eq!(message.status, MessageStatus::Sent);
        assert!(message.message_text.is_none());
        assert!(!message.is_seen_by(UserId::new(2)));
    }
}
