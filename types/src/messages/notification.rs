// SPDX-FileCopyrightText: 2023 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use serde::{Deserialize, Serialize};

use crate::identifiers::{NotificationId, UserId};

use super::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    FriendRequest,
    FriendRequestAccepted,
    FriendRequestRejected,
    FriendRequestCanceled,
    BlockFriend,
    UnblockFriend,
    Unfriend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub is_read: bool,
    pub created_at: String,
    #[serde(default)]
    pub read_at: Option<String>,
    pub notification_type: NotificationType,
    pub message: String,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    /// Free form state, e.g. whether a friend request is still active
    #[serde(default)]
    pub extra_data: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub linked_notification_id: Option<NotificationId>,
    #[serde(default)]
    pub sender_user: Option<User>,
    #[serde(default)]
    pub receiver_user: Option<User>,
    #[serde(default)]
    pub linked_notification: Option<Box<Notification>>,
}

impl Notification {
    /// Whether the notification still asks for an action (e.g. a pending friend request).
    pub fn is_active(&self) -> bool {
        self.extra_data
            .get("is_active")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }
}

/// Body of the "mark or change status" request. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_read: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl NotificationPatch {
    pub fn mark_read() -> Self {
        Self {
            is_read: Some(true),
            is_active: None,
        }
    }
}
