// SPDX-FileCopyrightText: 2024 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use chatapiclient::{
    ApiClient, ApiClientInitError,
    configurations::{ClientSettings, get_configuration},
};
use chattypes::{
    identifiers::{NotificationId, RoomId, UserId, UserLookup},
    messages::{
        StatusMessage,
        auth::{LoginParams, Token},
        message::Message,
        notification::{Notification, NotificationPatch},
        room::{ChatHistoryEntry, OnlineUser, Room, RoomFriends},
        user::{
            CreateUserParams, FriendSearchResult, SearchUser, UpdatePasswordParams,
            UpdateUserParams, UpdateUsernameParams, UploadedProfile, UserProfile,
        },
    },
};
use thiserror::Error;
use tracing::info;

use crate::{
    cache::QueryCache,
    mutations::*,
    observer::QueryObserver,
    queries::*,
    state::{MutationState, QueryState},
};

#[derive(Debug, Error)]
pub enum ChatClientError {
    #[error(transparent)]
    Settings(#[from] config::ConfigError),
    #[error(transparent)]
    Init(#[from] ApiClientInitError),
}

/// Entry point for views: runs queries and mutations against a shared cache.
///
/// Clones share the HTTP client, the session token and the cache.
#[derive(Debug, Clone)]
pub struct ChatClient {
    api: ApiClient,
    cache: QueryCache,
}

impl ChatClient {
    pub fn new(api: ApiClient, cache: QueryCache) -> Self {
        Self { api, cache }
    }

    /// Creates a client with an empty cache talking to the server at `domain`.
    pub fn with_domain(domain: impl AsRef<str>) -> Result<Self, ChatClientError> {
        let api = ApiClient::with_default_http_client(domain)?;
        Ok(Self::new(api, QueryCache::new()))
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ChatClientError> {
        let api = ApiClient::from_settings(settings)?;
        Ok(Self::new(api, QueryCache::new()))
    }

    /// Loads the settings from `{prefix}configuration` and creates a client from them.
    pub fn from_configuration(prefix: &str) -> Result<Self, ChatClientError> {
        let settings = get_configuration(prefix)?;
        Self::from_settings(&settings)
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub async fn query<Q: Query>(&self, query: &Q) -> QueryState<Q::Output> {
        fetch_query(&self.api, &self.cache, query).await
    }

    /// Starts observing `query`. Must be called from within a tokio runtime.
    pub fn observe<Q: Query + 'static>(&self, query: Q) -> QueryObserver<Q::Output> {
        QueryObserver::spawn(self.api.clone(), self.cache.clone(), query)
    }

    pub async fn mutate<M: Mutation>(
        &self,
        mutation: &M,
        input: M::Input,
    ) -> MutationState<M::Output> {
        run_mutation(&self.api, &self.cache, mutation, input).await
    }

    /// Forgets the session token and everything cached for the session.
    pub fn logout(&self) {
        self.api.logout();
        self.cache.clear();
        info!("Logged out");
    }

    // Queries

    pub async fn online_users(&self) -> QueryState<Vec<OnlineUser>> {
        self.query(&OnlineUsersQuery).await
    }

    /// Idle if no room id is given.
    pub async fn room(&self, room_id: Option<RoomId>) -> QueryState<Option<Room>> {
        self.query(&RoomQuery::new(room_id)).await
    }

    /// Idle if no room id is given.
    pub async fn room_friends(&self, room_id: Option<RoomId>) -> QueryState<RoomFriends> {
        self.query(&RoomFriendsQuery::new(room_id)).await
    }

    pub async fn user(&self, lookup: impl Into<UserLookup>) -> QueryState<UserProfile> {
        self.query(&UserQuery::new(lookup)).await
    }

    pub async fn current_user(&self) -> QueryState<UserProfile> {
        self.query(&UserQuery::current()).await
    }

    pub async fn search_users(&self, search: SearchUser) -> QueryState<Vec<FriendSearchResult>> {
        self.query(&AddFriendQuery::new(search)).await
    }

    pub async fn room_messages(
        &self,
        room_id: RoomId,
        offset: u32,
        limit: u32,
    ) -> QueryState<Vec<Message>> {
        self.query(&RoomMessagesQuery {
            room_id,
            offset,
            limit,
        })
        .await
    }

    pub async fn notifications(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> QueryState<Vec<Notification>> {
        self.query(&NotificationsQuery { limit, offset }).await
    }

    pub async fn chat_history(&self) -> QueryState<Vec<ChatHistoryEntry>> {
        self.query(&ChatHistoryQuery).await
    }

    pub async fn rooms(&self) -> QueryState<Vec<Room>> {
        self.query(&RoomsQuery).await
    }

    pub async fn initial_room(&self) -> QueryState<Option<Room>> {
        self.query(&InitialRoomQuery).await
    }

    // Mutations

    pub async fn block_user(&self, user_id: UserId) -> MutationState<serde_json::Value> {
        self.mutate(&BlockUser, user_id).await
    }

    pub async fn unblock_user(&self, user_id: UserId) -> MutationState<serde_json::Value> {
        self.mutate(&UnblockUser, user_id).await
    }

    pub async fn request_friend(&self, user_id: UserId) -> MutationState<serde_json::Value> {
        self.mutate(&RequestFriend, user_id).await
    }

    pub async fn cancel_friend_request(
        &self,
        user_id: UserId,
    ) -> MutationState<serde_json::Value> {
        self.mutate(&CancelFriendRequest, user_id).await
    }

    pub async fn accept_friend_request(
        &self,
        user_id: UserId,
    ) -> MutationState<serde_json::Value> {
        self.mutate(&AcceptFriendRequest, user_id).await
    }

    pub async fn unfriend(&self, user_id: UserId) -> MutationState<serde_json::Value> {
        self.mutate(&Unfriend, user_id).await
    }

    pub async fn mark_notification(
        &self,
        notification_id: NotificationId,
        patch: NotificationPatch,
    ) -> MutationState<StatusMessage> {
        self.mutate(&MarkNotification, (notification_id, patch))
            .await
    }

    pub async fn mark_all_notifications_read(&self) -> MutationState<StatusMessage> {
        self.mutate(&MarkAllNotificationsRead, ()).await
    }

    pub async fn delete_notification(
        &self,
        notification_id: NotificationId,
    ) -> MutationState<StatusMessage> {
        self.mutate(&DeleteNotification, notification_id).await
    }

    pub async fn delete_all_notifications(&self) -> MutationState<StatusMessage> {
        self.mutate(&DeleteAllNotifications, ()).await
    }

    pub async fn update_user(
        &self,
        params: UpdateUserParams,
    ) -> MutationState<serde_json::Value> {
        self.mutate(&UpdateUser, params).await
    }

    pub async fn update_username(
        &self,
        params: UpdateUsernameParams,
    ) -> MutationState<serde_json::Value> {
        self.mutate(&UpdateUsername, params).await
    }

    pub async fn update_password(
        &self,
        params: UpdatePasswordParams,
    ) -> MutationState<serde_json::Value> {
        self.mutate(&UpdatePassword, params).await
    }

    pub async fn upload_profile(&self, picture: ProfilePicture) -> MutationState<UploadedProfile> {
        self.mutate(&UploadProfile, picture).await
    }

    pub async fn login(&self, params: LoginParams) -> MutationState<Token> {
        self.mutate(&Login, params).await
    }

    pub async fn refresh_token(&self) -> MutationState<Token> {
        self.mutate(&RefreshToken, ()).await
    }

    pub async fn create_user(&self, params: CreateUserParams) -> MutationState<Token> {
        self.mutate(&CreateUser, params).await
    }

    pub async fn delete_user(&self) -> MutationState<serde_json::Value> {
        self.mutate(&DeleteUser, ()).await
    }
}
