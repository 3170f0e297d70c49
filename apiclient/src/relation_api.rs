// SPDX-FileCopyrightText: 2023 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! API client implementation for the relationship endpoints
//!
//! Every endpoint responds with the updated record of the authenticated user. The payload is
//! returned without interpretation.

use chattypes::{endpoint_paths::relation, identifiers::UserId};

use crate::{ApiClient, RequestError};

impl ApiClient {
    pub async fn accept_friend_request(
        &self,
        user_id: UserId,
    ) -> Result<serde_json::Value, RequestError> {
        self.get(&relation::accept_friend_request(user_id)).await
    }

    pub async fn request_friend(&self, user_id: UserId) -> Result<serde_json::Value, RequestError> {
        self.get(&relation::request(user_id)).await
    }

    pub async fn cancel_friend_request(
        &self,
        user_id: UserId,
    ) -> Result<serde_json::Value, RequestError> {
        self.get(&relation::cancel_request(user_id)).await
    }

    pub async fn unfriend(&self, user_id: UserId) -> Result<serde_json::Value, RequestError> {
        self.get(&relation::unfriend(user_id)).await
    }

    pub async fn block_user(&self, user_id: UserId) -> Result<serde_json::Value, RequestError> {
        self.get(&relation::block(user_id)).await
    }

    pub async fn unblock_user(&self, user_id: UserId) -> Result<serde_json::Value, RequestError> {
        self.get(&relation::unblock(user_id)).await
    }
}
