// SPDX-FileCopyrightText: 2023 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Relative paths of all REST endpoints used by the client.
//!
//! Fixed endpoints are constants, parameterized ones are pure functions. Parameters are
//! interpolated as they are; only query string values are form-urlencoded. No validation happens
//! here: a malformed parameter produces a malformed path which is rejected by the server.

use url::form_urlencoded;

pub const API_TAG: &str = "api";
pub const API_VERSION: &str = "v1";

/// Versioned base path all endpoints live under.
pub const BASE_PATH: &str = "/api/v1";

macro_rules! api_path {
    ($path:literal) => {
        concat!("/api/v1/", $path)
    };
}

fn encode_query_value(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Auth endpoints
pub mod auth {
    pub const LOGIN_USER: &str = api_path!("auth/token/");
    pub const REFRESH_TOKEN: &str = api_path!("auth/token/refresh/");
    pub const BLACKLISTED_TOKEN: &str = api_path!("auth/token/blacklisted/");
    pub const OUTSTANDING_TOKEN: &str = api_path!("auth/token/outstanding/");
    pub const DELETE_TOKEN_ALL: &str = api_path!("auth/token/deleteall/");
}

/// Message endpoints
pub mod message {
    use super::BASE_PATH;
    use crate::identifiers::RoomId;

    /// Page of the message history of a room.
    pub fn room_message(room_id: &RoomId, offset: u32, limit: u32) -> String {
        format!("{BASE_PATH}/message/msg/{room_id}/?offset={offset}&limit={limit}")
    }
}

/// Room endpoints
pub mod room {
    use super::BASE_PATH;
    use crate::identifiers::RoomId;

    pub const GET_ROOM: &str = api_path!("room/");
    pub const CHAT_HISTORY: &str = api_path!("room/history/");
    pub const INITIAL_ROOM: &str = api_path!("room/initialRoom/");

    pub fn get_room_by_id(room_id: &RoomId) -> String {
        format!("{BASE_PATH}/room/room/{room_id}/")
    }

    pub fn get_room_friends(room_id: &RoomId) -> String {
        format!("{BASE_PATH}/room/friend/{room_id}/")
    }
}

/// User endpoints
pub mod user {
    use super::{BASE_PATH, encode_query_value};
    use crate::{identifiers::UserLookup, messages::user::SearchUser};

    pub const CREATE_USER: &str = api_path!("user/createuser/");
    pub const UPDATE_USER: &str = api_path!("user/updateuser/");
    pub const UPLOAD_PROFILE: &str = api_path!("user/upload/profile/");
    pub const UPDATE_USER_NAME: &str = api_path!("user/updateusername/");
    pub const UPDATE_PASSWORD: &str = api_path!("user/updatepassword/");
    pub const DELETE_USER: &str = api_path!("user/delete/");
    pub const ONLINE_USER: &str = api_path!("user/onlineuser/");

    pub fn get_user(lookup: &UserLookup) -> String {
        match lookup {
            UserLookup::ByUid(uid) => format!(
                "{BASE_PATH}/user/getuser/?uid={}",
                encode_query_value(uid.as_str())
            ),
            UserLookup::ByUserId(user_id) => {
                format!("{BASE_PATH}/user/getuser/?user_id={user_id}")
            }
            UserLookup::Current => format!("{BASE_PATH}/user/getuser/"),
        }
    }

    pub fn search_user(query: &SearchUser) -> String {
        format!(
            "{BASE_PATH}/user/search/?search_type={}&search={}&limit={}&offset={}",
            query.search_type.as_str(),
            encode_query_value(&query.search),
            query.limit,
            query.offset,
        )
    }
}

/// Notification endpoints
pub mod notification {
    use super::BASE_PATH;
    use crate::identifiers::NotificationId;

    pub const DEFAULT_LIMIT: u32 = 10;
    pub const DEFAULT_OFFSET: u32 = 0;

    pub const MARK_ALL_READ: &str = api_path!("notification/mark/read/all/");
    pub const DELETE_ALL: &str = api_path!("notification/all/delete/");

    /// Pass `None` to use the server defaults of 10 and 0.
    pub fn get_notification(limit: Option<u32>, offset: Option<u32>) -> String {
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        let offset = offset.unwrap_or(DEFAULT_OFFSET);
        format!("{BASE_PATH}/notification/?limit={limit}&offset={offset}")
    }

    pub fn mark_or_change_status(notification_id: NotificationId) -> String {
        format!("{BASE_PATH}/notification/{notification_id}/")
    }

    pub fn notification_delete(notification_id: NotificationId) -> String {
        format!("{BASE_PATH}/notification/delete/{notification_id}/")
    }
}

/// Relationship endpoints. All of them act on the authenticated user and the given peer.
pub mod relation {
    use super::BASE_PATH;
    use crate::identifiers::UserId;

    pub fn accept_friend_request(user_id: UserId) -> String {
        format!("{BASE_PATH}/relation/accept/{user_id}/")
    }

    pub fn request(user_id: UserId) -> String {
        format!("{BASE_PATH}/relation/request/{user_id}/")
    }

    pub fn cancel_request(user_id: UserId) -> String {
        format!("{BASE_PATH}/relation/cancelrequest/{user_id}/")
    }

    pub fn unfriend(user_id: UserId) -> String {
        format!("{BASE_PATH}/relation/unfriend/{user_id}/")
    }

    pub fn block(user_id: UserId) -> String {
        format!("{BASE_PATH}/relation/block/{user_id}/")
    }

    pub fn unblock(user_id: UserId) -> String {
        format!("{BASE_PATH}/relation/unblock/{user_id}/")
    }
}
