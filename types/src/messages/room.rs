// SPDX-FileCopyrightText: 2023 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use serde::{Deserialize, Serialize};

use crate::identifiers::{RoomId, UserId};

use super::{message::Message, user::User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Group,
    /// One-to-one room between two friends
    Friend,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomUser {
    pub user_id: UserId,
    #[serde(default)]
    pub added_by: Option<UserId>,
    pub joined_at: String,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub users: Vec<RoomUser>,
    pub created_at: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    #[serde(default)]
    pub created_by: Option<UserId>,
    pub is_active: bool,
}

impl Room {
    pub fn has_member(&self, user_id: UserId) -> bool {
        self.users.iter().any(|user| user.user_id == user_id)
    }
}

/// Members of a room other than the authenticated user.
///
/// Friend rooms resolve to the single peer, group rooms to all other members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoomFriends {
    Friend(User),
    Group(Vec<User>),
}

impl RoomFriends {
    pub fn users(&self) -> &[User] {
        match self {
            Self::Friend(user) => std::slice::from_ref(user),
            Self::Group(users) => users,
        }
    }
}

/// Entry of the chat history overview: a room, its peers and the latest message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatHistoryEntry {
    pub users: Vec<User>,
    pub room: Room,
    #[serde(default)]
    pub message: Option<Message>,
    /// Number of unseen messages among the latest ones
    pub quantity: u32,
}

/// A friend that is currently connected, with the room shared with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineUser {
    pub user: User,
    pub room: Option<Room>,
}
