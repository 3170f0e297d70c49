// SPDX-FileCopyrightText: 2023 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use serde::{Deserialize, Serialize};

use crate::identifiers::{Uid, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub uid: Uid,
    pub username: String,
    /// Url of the profile picture
    pub profile: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub contact_number_country_code: u32,
    pub contact_number: i64,
    pub address: String,
}

/// A user together with its relationships to other users.
///
/// Relationship lists are only populated for the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    #[serde(default)]
    pub blocked_user: Option<Vec<User>>,
    #[serde(default)]
    pub blocked_by: Option<Vec<User>>,
    #[serde(default)]
    pub friend: Option<Vec<User>>,
    #[serde(default)]
    pub friend_by: Option<Vec<User>>,
    #[serde(default)]
    pub requested_user: Option<Vec<User>>,
    #[serde(default)]
    pub requested_by: Option<Vec<User>>,
}

impl UserProfile {
    /// Friends in both directions of the friendship relation.
    pub fn friends(&self) -> impl Iterator<Item = &User> {
        self.friend
            .iter()
            .chain(self.friend_by.iter())
            .flatten()
    }

    pub fn has_blocked(&self, user_id: UserId) -> bool {
        self.blocked_user
            .iter()
            .flatten()
            .any(|user| user.id == user_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FriendStatus {
    Friend,
    Requested,
    Blocked,
    RequestedBy,
    #[default]
    None,
}

/// Search result as shown in the "add friend" view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendSearchResult {
    #[serde(flatten)]
    pub user: User,
    #[serde(default)]
    pub friend_status: FriendStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Name,
    Uid,
    Contact,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Uid => "uid",
            Self::Contact => "contact",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchUser {
    pub search_type: SearchType,
    pub search: String,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserParams {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub contact_number_country_code: u32,
    pub contact_number: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superuser_pass: Option<String>,
    pub username: String,
    pub password: String,
}

/// Partial update of the authenticated user. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUsernameParams {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePasswordParams {
    pub old: String,
    pub new: String,
}

/// Response of the profile picture upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedProfile {
    pub file: String,
    pub content: Option<String>,
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER_JSON: &str = r#"{
        "id": 3,
        "uid": "k2j4",
        "username": "jdoe",
        "profile": "files/profile/default.png",
        "email": "jdoe@example.com",
        "first_name": "John",
        "last_name": "Doe",
        "contact_number_country_code": 977,
        "contact_number": 9800000000,
        "address": "Kathmandu"
    }"#;

    #[test]
    fn profile_without_relations() {
        let profile: UserProfile = serde_json::from_str(USER_JSON).unwrap();
        assert_eq!(profile.user.id, UserId::new(3));
        assert!(profile.friend.is_none());
        assert_eq!(profile.friends().count(), 0);
    }

    #[test]
    fn profile_relations() {
        let user: serde_json::Value = serde_json::from_str(USER_JSON).unwrap();
        let mut profile = user.clone();
        profile["friend"] = serde_json::json!([user.clone()]);
        profile["friend_by"] = serde_json::json!([user.clone()]);
        profile["blocked_user"] = serde_json::json!([user]);
        let profile: UserProfile = serde_json::from_value(profile).unwrap();
        assert_eq!(profile.friends().count(), 2);
        assert!(profile.has_blocked(UserId::new(3)));
        assert!(!profile.has_blocked(UserId::new(4)));
    }

    #[test]
    fn search_result_status() {
        let mut value: serde_json::Value = serde_json::from_str(USER_JSON).unwrap();
        value["friend_status"] = "requested_by".into();
        let result: FriendSearchResult = serde_json::from_value(value).unwrap();
        assert_eq!(result.friend_status, FriendStatus::RequestedBy);
    }

    #[test]
    fn partial_update_skips_absent_fields() {
        let params = UpdateUserParams {
            address: Some("Pokhara".to_owned()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&params).unwrap(),
            r#"{"address":"Pokhara"}"#
        );
    }
}
