// SPDX-FileCopyrightText: 2023 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! API client implementation for the token endpoints

use chattypes::{
    endpoint_paths::auth,
    messages::auth::{LoginParams, RefreshTokenParams, Token},
};
use reqwest::{Method, StatusCode};
use tracing::info;

use crate::{ApiClient, RequestError};

impl ApiClient {
    /// Logs in with username and password.
    ///
    /// On success, the returned token is used to authenticate all following requests.
    pub async fn login(&self, params: &LoginParams) -> Result<Token, RequestError> {
        let token: Token = self
            .send_json(Method::POST, auth::LOGIN_USER, params)
            .await?;
        info!(username = %params.username, "Logged in");
        self.set_token(token.clone());
        Ok(token)
    }

    /// Exchanges the refresh token of the current session for a new token pair.
    pub async fn refresh_session(&self) -> Result<Token, RequestError> {
        let Some(current) = self.token() else {
            return Err(RequestError::Status {
                status: StatusCode::UNAUTHORIZED,
                detail: None,
            });
        };
        self.refresh_token(&current.refresh_token).await
    }

    /// Exchanges the given refresh token for a new token pair. The old refresh token is
    /// blacklisted by the server.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<Token, RequestError> {
        let params = RefreshTokenParams {
            token: refresh_token.to_owned(),
        };
        let token: Token = self
            .send_json(Method::POST, auth::REFRESH_TOKEN, &params)
            .await?;
        self.set_token(token.clone());
        Ok(token)
    }

    /// Forgets the token of the current session. This does not call the server.
    pub fn logout(&self) {
        self.clear_token();
    }

    // Superuser endpoints. Their payloads are server-side documents which are passed through as
    // they are.

    pub async fn blacklisted_tokens(&self) -> Result<Vec<serde_json::Value>, RequestError> {
        self.get(auth::BLACKLISTED_TOKEN).await
    }

    pub async fn outstanding_tokens(&self) -> Result<Vec<serde_json::Value>, RequestError> {
        self.get(auth::OUTSTANDING_TOKEN).await
    }

    pub async fn delete_all_tokens(&self) -> Result<serde_json::Value, RequestError> {
        self.get(auth::DELETE_TOKEN_ALL).await
    }
}
