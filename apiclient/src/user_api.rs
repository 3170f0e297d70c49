// SPDX-FileCopyrightText: 2023 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use chattypes::{
    endpoint_paths::user,
    identifiers::UserLookup,
    messages::{
        auth::Token,
        room::OnlineUser,
        user::{
            CreateUserParams, FriendSearchResult, SearchUser, UpdatePasswordParams,
            UpdateUserParams, UpdateUsernameParams, UploadedProfile, UserProfile,
        },
    },
};
use reqwest::{
    Method,
    multipart::{Form, Part},
};

use crate::{ApiClient, RequestError};

/// Name of the multipart field carrying the profile picture.
const PROFILE_FILE_FIELD: &str = "uploaded_file";

impl ApiClient {
    pub async fn user(&self, lookup: &UserLookup) -> Result<UserProfile, RequestError> {
        self.get(&user::get_user(lookup)).await
    }

    /// Registers a new user. The server logs the new user in right away; the returned token is
    /// used for all following requests.
    pub async fn create_user(&self, params: &CreateUserParams) -> Result<Token, RequestError> {
        let token: Token = self
            .send_json(Method::POST, user::CREATE_USER, params)
            .await?;
        self.set_token(token.clone());
        Ok(token)
    }

    pub async fn update_user(
        &self,
        params: &UpdateUserParams,
    ) -> Result<serde_json::Value, RequestError> {
        self.send_json(Method::PATCH, user::UPDATE_USER, params)
            .await
    }

    pub async fn update_username(
        &self,
        params: &UpdateUsernameParams,
    ) -> Result<serde_json::Value, RequestError> {
        self.send_json(Method::PUT, user::UPDATE_USER_NAME, params)
            .await
    }

    pub async fn update_password(
        &self,
        params: &UpdatePasswordParams,
    ) -> Result<serde_json::Value, RequestError> {
        self.send_json(Method::PUT, user::UPDATE_PASSWORD, params)
            .await
    }

    /// Uploads a new profile picture. The server resizes the image.
    pub async fn upload_profile(
        &self,
        file_name: impl Into<String>,
        content_type: &str,
        content: Vec<u8>,
    ) -> Result<UploadedProfile, RequestError> {
        let part = Part::bytes(content)
            .file_name(file_name.into())
            .mime_str(content_type)
            .map_err(|error| RequestError::Multipart(error.to_string()))?;
        let form = Form::new().part(PROFILE_FILE_FIELD, part);
        self.send(self.request(Method::POST, user::UPLOAD_PROFILE).multipart(form))
            .await
    }

    /// Deletes the authenticated user and forgets the session token.
    pub async fn delete_user(&self) -> Result<serde_json::Value, RequestError> {
        let res = self.delete(user::DELETE_USER).await?;
        self.clear_token();
        Ok(res)
    }

    pub async fn search_users(
        &self,
        query: &SearchUser,
    ) -> Result<Vec<FriendSearchResult>, RequestError> {
        self.get(&user::search_user(query)).await
    }

    /// Friends of the authenticated user that are currently connected.
    pub async fn online_users(&self) -> Result<Vec<OnlineUser>, RequestError> {
        self.get(user::ONLINE_USER).await
    }
}
