// SPDX-FileCopyrightText: 2024 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Read operations
//!
//! Every query knows the key its response is cached under. The key contains all parameters the
//! response depends on, so distinct parameters never share an entry.

use chatapiclient::{ApiClient, RequestError};
use chattypes::{
    identifiers::{RoomId, UserLookup},
    messages::{
        message::Message,
        notification::Notification,
        room::{ChatHistoryEntry, OnlineUser, Room, RoomFriends},
        user::{FriendSearchResult, SearchUser, UserProfile},
    },
};
use tracing::debug;

use crate::{
    cache::{QueryCache, QueryKey},
    state::QueryState,
};

/// Resource names, i.e. the first token of each query key.
pub mod keys {
    pub const GET_USER: &str = "getUser";
    pub const ADD_FRIEND: &str = "addFriend";
    pub const ROOM: &str = "room";
    pub const ONLINE_USERS: &str = "onlineUsers";
    pub const ROOM_MESSAGES: &str = "roomMessages";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const CHAT_HISTORY: &str = "chatHistory";
    pub const ROOMS: &str = "rooms";
    pub const INITIAL_ROOM: &str = "initialRoom";
}

pub trait Query: Send + Sync {
    type Output: Send + Sync + 'static;

    fn key(&self) -> QueryKey;

    /// A disabled query is never sent to the server.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Issues the request. Only called while the query is enabled.
    fn fetch(
        &self,
        api: &ApiClient,
    ) -> impl Future<Output = Result<Self::Output, RequestError>> + Send + 'static;
}

/// Runs `query` against the cache and returns its state after the request finished.
pub async fn fetch_query<Q: Query>(
    api: &ApiClient,
    cache: &QueryCache,
    query: &Q,
) -> QueryState<Q::Output> {
    if !query.is_enabled() {
        debug!(key = %query.key(), "Query is disabled");
        return QueryState::idle();
    }
    let key = query.key();
    let previous = cache.state::<Q::Output>(&key).shared_data();
    let result = cache.fetch(key, || query.fetch(api)).await;
    QueryState::from_result(result, previous)
}

/// Friends of the authenticated user that are currently online.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnlineUsersQuery;

impl Query for OnlineUsersQuery {
    type Output = Vec<OnlineUser>;

    fn key(&self) -> QueryKey {
        QueryKey::new(keys::ONLINE_USERS)
    }

    fn fetch(
        &self,
        api: &ApiClient,
    ) -> impl Future<Output = Result<Self::Output, RequestError>> + Send + 'static {
        let api = api.clone();
        async move { api.online_users().await }
    }
}

/// A single room. Disabled while no room is selected.
#[derive(Debug, Clone, Default)]
pub struct RoomQuery {
    pub room_id: Option<RoomId>,
}

impl RoomQuery {
    pub fn new(room_id: impl Into<Option<RoomId>>) -> Self {
        Self {
            room_id: room_id.into(),
        }
    }
}

impl Query for RoomQuery {
    type Output = Option<Room>;

    fn key(&self) -> QueryKey {
        QueryKey::new(keys::ROOM).with(self.room_id.as_ref())
    }

    fn is_enabled(&self) -> bool {
        self.room_id.is_some()
    }

    fn fetch(
        &self,
        api: &ApiClient,
    ) -> impl Future<Output = Result<Self::Output, RequestError>> + Send + 'static {
        let api = api.clone();
        let room_id = self.room_id.clone();
        async move {
            match room_id {
                Some(room_id) => api.room(&room_id).await,
                None => Ok(None),
            }
        }
    }
}

/// The other members of a room. Shares the `room` key prefix with [`RoomQuery`], so both are
/// invalidated together.
#[derive(Debug, Clone, Default)]
pub struct RoomFriendsQuery {
    pub room_id: Option<RoomId>,
}

impl RoomFriendsQuery {
    pub fn new(room_id: impl Into<Option<RoomId>>) -> Self {
        Self {
            room_id: room_id.into(),
        }
    }
}

impl Query for RoomFriendsQuery {
    type Output = RoomFriends;

    fn key(&self) -> QueryKey {
        QueryKey::new(keys::ROOM)
            .with(self.room_id.as_ref())
            .with("friends")
    }

    fn is_enabled(&self) -> bool {
        self.room_id.is_some()
    }

    fn fetch(
        &self,
        api: &ApiClient,
    ) -> impl Future<Output = Result<Self::Output, RequestError>> + Send + 'static {
        let api = api.clone();
        let room_id = self.room_id.clone();
        async move {
            match room_id {
                Some(room_id) => api.room_friends(&room_id).await,
                None => Ok(RoomFriends::Group(Vec::new())),
            }
        }
    }
}

/// Profile of a user including the relations to other users.
#[derive(Debug, Clone)]
pub struct UserQuery {
    pub lookup: UserLookup,
}

impl UserQuery {
    pub fn new(lookup: impl Into<UserLookup>) -> Self {
        Self {
            lookup: lookup.into(),
        }
    }

    pub fn current() -> Self {
        Self::new(UserLookup::Current)
    }
}

impl Query for UserQuery {
    type Output = UserProfile;

    fn key(&self) -> QueryKey {
        let key = QueryKey::new(keys::GET_USER);
        match &self.lookup {
            UserLookup::ByUid(uid) => key.with("uid").with(uid),
            UserLookup::ByUserId(user_id) => key.with("userId").with(*user_id),
            UserLookup::Current => key.with("current"),
        }
    }

    fn fetch(
        &self,
        api: &ApiClient,
    ) -> impl Future<Output = Result<Self::Output, RequestError>> + Send + 'static {
        let api = api.clone();
        let lookup = self.lookup.clone();
        async move { api.user(&lookup).await }
    }
}

/// User search backing the "add friend" view.
#[derive(Debug, Clone)]
pub struct AddFriendQuery {
    pub search: SearchUser,
}

impl AddFriendQuery {
    pub fn new(search: SearchUser) -> Self {
        Self { search }
    }
}

impl Query for AddFriendQuery {
    type Output = Vec<FriendSearchResult>;

    fn key(&self) -> QueryKey {
        QueryKey::new(keys::ADD_FRIEND)
            .with(self.search.search_type.as_str())
            .with(self.search.search.as_str())
            .with(self.search.limit)
            .with(self.search.offset)
    }

    fn fetch(
        &self,
        api: &ApiClient,
    ) -> impl Future<Output = Result<Self::Output, RequestError>> + Send + 'static {
        let api = api.clone();
        let search = self.search.clone();
        async move { api.search_users(&search).await }
    }
}

/// One page of messages of a room.
#[derive(Debug, Clone)]
pub struct RoomMessagesQuery {
    pub room_id: RoomId,
    pub offset: u32,
    pub limit: u32,
}

impl Query for RoomMessagesQuery {
    type Output = Vec<Message>;

    fn key(&self) -> QueryKey {
        QueryKey::new(keys::ROOM_MESSAGES)
            .with(&self.room_id)
            .with(self.offset)
            .with(self.limit)
    }

    fn fetch(
        &self,
        api: &ApiClient,
    ) -> impl Future<Output = Result<Self::Output, RequestError>> + Send + 'static {
        let api = api.clone();
        let Self {
            room_id,
            offset,
            limit,
        } = self.clone();
        async move { api.room_messages(&room_id, offset, limit).await }
    }
}

/// Notifications of the authenticated user. Absent values fall back to the server defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationsQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl Query for NotificationsQuery {
    type Output = Vec<Notification>;

    fn key(&self) -> QueryKey {
        QueryKey::new(keys::NOTIFICATIONS)
            .with(self.limit)
            .with(self.offset)
    }

    fn fetch(
        &self,
        api: &ApiClient,
    ) -> impl Future<Output = Result<Self::Output, RequestError>> + Send + 'static {
        let api = api.clone();
        let Self { limit, offset } = *self;
        async move { api.notifications(limit, offset).await }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChatHistoryQuery;

impl Query for ChatHistoryQuery {
    type Output = Vec<ChatHistoryEntry>;

    fn key(&self) -> QueryKey {
        QueryKey::new(keys::CHAT_HISTORY)
    }

    fn fetch(
        &self,
        api: &ApiClient,
    ) -> impl Future<Output = Result<Self::Output, RequestError>> + Send + 'static {
        let api = api.clone();
        async move { api.chat_history().await }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RoomsQuery;

impl Query for RoomsQuery {
    type Output = Vec<Room>;

    fn key(&self) -> QueryKey {
        QueryKey::new(keys::ROOMS)
    }

    fn fetch(
        &self,
        api: &ApiClient,
    ) -> impl Future<Output = Result<Self::Output, RequestError>> + Send + 'static {
        let api = api.clone();
        async move { api.rooms().await }
    }
}

/// The room opened when the chat view is entered without a selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct InitialRoomQuery;

impl Query for InitialRoomQuery {
    type Output = Option<Room>;

    fn key(&self) -> QueryKey {
        QueryKey::new(keys::INITIAL_ROOM)
    }

    fn fetch(
        &self,
        api: &ApiClient,
    ) -> impl Future<Output = Result<Self::Output, RequestError>> + Send + 'static {
        let api = api.clone();
        async move { api.initial_room().await }
    }
}

#[cfg(test)]
mod tests {
    use chattypes::{
        identifiers::{Uid, UserId},
        messages::user::SearchType,
    };

    use super::*;

    #[test]
    fn user_keys_distinguish_lookups() {
        let by_uid = UserQuery::new(Uid::new("0")).key();
        let by_id = UserQuery::new(UserId::new(0)).key();
        let current = UserQuery::current().key();
        assert_eq!(by_uid.to_string(), r#"["getUser", "uid", "0"]"#);
        assert_eq!(by_id.to_string(), r#"["getUser", "userId", 0]"#);
        assert_eq!(current.to_string(), r#"["getUser", "current"]"#);
    }

    #[test]
    fn keys_contain_all_parameters() {
        let search = |offset| {
            AddFriendQuery::new(SearchUser {
                search_type: SearchType::Name,
                search: "jo".to_owned(),
                limit: 10,
                offset,
            })
            .key()
        };
        assert_ne!(search(0), search(10));
        assert_eq!(search(0).to_string(), r#"["addFriend", "name", "jo", 10, 0]"#);

        let page = |offset| {
            RoomMessagesQuery {
                room_id: RoomId::new("7"),
                offset,
                limit: 20,
            }
            .key()
        };
        assert_ne!(page(0), page(20));

        let defaults = NotificationsQuery::default().key();
        let explicit = NotificationsQuery {
            limit: Some(10),
            offset: Some(0),
        }
        .key();
        assert_eq!(defaults.to_string(), r#"["notifications", null, null]"#);
        assert_ne!(defaults, explicit);
    }

    #[test]
    fn room_queries_share_prefix() {
        let room = RoomQuery::new(RoomId::new("42"));
        let friends = RoomFriendsQuery::new(RoomId::new("42"));
        let prefix = QueryKey::new(keys::ROOM);
        assert!(room.key().starts_with(&prefix));
        assert!(friends.key().starts_with(&room.key()));
        assert!(!RoomQuery::default().is_enabled());
        assert!(room.is_enabled());
    }
}
