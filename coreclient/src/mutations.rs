// SPDX-FileCopyrightText: 2024 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Write operations
//!
//! A successful mutation invalidates a fixed list of key prefixes. The invalidation only marks the
//! affected entries as stale and notifies observers, it doesn't wait for any refetch. A failed
//! mutation doesn't touch the cache.

use chatapiclient::{ApiClient, RequestError};
use chattypes::{
    identifiers::{NotificationId, UserId},
    messages::{
        StatusMessage,
        auth::{LoginParams, Token},
        notification::NotificationPatch,
        user::{
            CreateUserParams, UpdatePasswordParams, UpdateUserParams, UpdateUsernameParams,
            UploadedProfile,
        },
    },
};
use tracing::{info, warn};

use crate::{
    cache::{QueryCache, QueryKey},
    queries::keys,
    state::MutationState,
};

pub trait Mutation: Send + Sync {
    type Input: Send;
    type Output: Send;

    fn name(&self) -> &'static str;

    /// Key prefixes to invalidate after the mutation succeeded.
    fn invalidates(&self) -> Vec<QueryKey> {
        Vec::new()
    }

    /// Drop the whole cache after the mutation succeeded.
    fn clears_cache(&self) -> bool {
        false
    }

    fn mutate(
        &self,
        api: &ApiClient,
        input: Self::Input,
    ) -> impl Future<Output = Result<Self::Output, RequestError>> + Send;
}

/// Runs `mutation` and applies its invalidations on success.
pub async fn run_mutation<M: Mutation>(
    api: &ApiClient,
    cache: &QueryCache,
    mutation: &M,
    input: M::Input,
) -> MutationState<M::Output> {
    let result = mutation.mutate(api, input).await;
    match &result {
        Ok(_) if mutation.clears_cache() => {
            info!(mutation = mutation.name(), "Mutation succeeded, clearing cache");
            cache.clear();
        }
        Ok(_) => {
            info!(mutation = mutation.name(), "Mutation succeeded");
            cache.invalidate_many(mutation.invalidates());
        }
        Err(error) => {
            warn!(mutation = mutation.name(), %error, "Mutation failed");
        }
    }
    result.into()
}

macro_rules! mutation {
    (
        $(#[$meta:meta])*
        $name:ident($input:ty) -> $output:ty,
        invalidates [$($key:expr),* $(,)?],
        |$api:ident, $arg:pat_param| $body:expr
    ) => {
        mutation!(@impl $(#[$meta])* $name($input) -> $output, [$($key),*], false, |$api, $arg| $body);
    };
    (
        $(#[$meta:meta])*
        $name:ident($input:ty) -> $output:ty,
        clears cache,
        |$api:ident, $arg:pat_param| $body:expr
    ) => {
        mutation!(@impl $(#[$meta])* $name($input) -> $output, [], true, |$api, $arg| $body);
    };
    (
        @impl
        $(#[$meta:meta])*
        $name:ident($input:ty) -> $output:ty,
        [$($key:expr),*],
        $clears_cache:literal,
        |$api:ident, $arg:pat_param| $body:expr
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Mutation for $name {
            type Input = $input;
            type Output = $output;

            fn name(&self) -> &'static str {
                stringify!($name)
            }

            fn invalidates(&self) -> Vec<QueryKey> {
                vec![$(QueryKey::new($key)),*]
            }

            fn clears_cache(&self) -> bool {
                $clears_cache
            }

            async fn mutate(
                &self,
                $api: &ApiClient,
                $arg: Self::Input,
            ) -> Result<Self::Output, RequestError> {
                $body
            }
        }
    };
}

// Relations. Blocking and unfriending remove the user from room views as well.

mutation! {
    BlockUser(UserId) -> serde_json::Value,
    invalidates [keys::GET_USER, keys::ADD_FRIEND, keys::ROOM],
    |api, user_id| api.block_user(user_id).await
}

mutation! {
    UnblockUser(UserId) -> serde_json::Value,
    invalidates [keys::GET_USER, keys::ADD_FRIEND, keys::ROOM],
    |api, user_id| api.unblock_user(user_id).await
}

mutation! {
    RequestFriend(UserId) -> serde_json::Value,
    invalidates [keys::GET_USER, keys::ADD_FRIEND, keys::NOTIFICATIONS],
    |api, user_id| api.request_friend(user_id).await
}

mutation! {
    CancelFriendRequest(UserId) -> serde_json::Value,
    invalidates [keys::GET_USER, keys::ADD_FRIEND, keys::NOTIFICATIONS],
    |api, user_id| api.cancel_friend_request(user_id).await
}

mutation! {
    /// Accepting creates the shared room, so the chat history and the online list change too.
    AcceptFriendRequest(UserId) -> serde_json::Value,
    invalidates [
        keys::GET_USER,
        keys::ADD_FRIEND,
        keys::NOTIFICATIONS,
        keys::CHAT_HISTORY,
        keys::ONLINE_USERS,
    ],
    |api, user_id| api.accept_friend_request(user_id).await
}

mutation! {
    Unfriend(UserId) -> serde_json::Value,
    invalidates [
        keys::GET_USER,
        keys::ADD_FRIEND,
        keys::ROOM,
        keys::CHAT_HISTORY,
        keys::ONLINE_USERS,
    ],
    |api, user_id| api.unfriend(user_id).await
}

// Notifications

mutation! {
    /// Marks a notification read or (de)activates it.
    MarkNotification((NotificationId, NotificationPatch)) -> StatusMessage,
    invalidates [keys::NOTIFICATIONS],
    |api, (notification_id, patch)| api.change_notification_status(notification_id, &patch).await
}

mutation! {
    MarkAllNotificationsRead(()) -> StatusMessage,
    invalidates [keys::NOTIFICATIONS],
    |api, ()| api.mark_all_notifications_read().await
}

mutation! {
    DeleteNotification(NotificationId) -> StatusMessage,
    invalidates [keys::NOTIFICATIONS],
    |api, notification_id| api.delete_notification(notification_id).await
}

mutation! {
    DeleteAllNotifications(()) -> StatusMessage,
    invalidates [keys::NOTIFICATIONS],
    |api, ()| api.delete_all_notifications().await
}

// Profile

mutation! {
    UpdateUser(UpdateUserParams) -> serde_json::Value,
    invalidates [keys::GET_USER],
    |api, params| api.update_user(&params).await
}

mutation! {
    UpdateUsername(UpdateUsernameParams) -> serde_json::Value,
    invalidates [keys::GET_USER],
    |api, params| api.update_username(&params).await
}

mutation! {
    UpdatePassword(UpdatePasswordParams) -> serde_json::Value,
    invalidates [keys::GET_USER],
    |api, params| api.update_password(&params).await
}

/// Image to upload as profile picture.
#[derive(Debug, Clone)]
pub struct ProfilePicture {
    pub file_name: String,
    /// MIME type, e.g. `image/png`
    pub content_type: String,
    pub content: Vec<u8>,
}

mutation! {
    UploadProfile(ProfilePicture) -> UploadedProfile,
    invalidates [keys::GET_USER],
    |api, picture| {
        api.upload_profile(picture.file_name, &picture.content_type, picture.content)
            .await
    }
}

// Session. The client keeps the returned token for the following requests. Whatever was cached
// before belonged to another session, so starting or ending one drops the whole cache.

mutation! {
    Login(LoginParams) -> Token,
    clears cache,
    |api, params| api.login(&params).await
}

mutation! {
    /// Renews the token pair of the current session.
    RefreshToken(()) -> Token,
    invalidates [],
    |api, ()| api.refresh_session().await
}

mutation! {
    CreateUser(CreateUserParams) -> Token,
    clears cache,
    |api, params| api.create_user(&params).await
}

mutation! {
    /// Deletes the authenticated user.
    DeleteUser(()) -> serde_json::Value,
    clears cache,
    |api, ()| api.delete_user().await
}
