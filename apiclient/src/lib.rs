// SPDX-FileCopyrightText: 2023 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! HTTP client for the server REST API

use std::{sync::Arc, time::Duration};

use chattypes::{DEFAULT_PORT_HTTP, DEFAULT_PORT_HTTPS, messages::auth::Token};
use configurations::{ClientSettings, HttpSettings};
use parking_lot::RwLock;
use reqwest::{
    Client, ClientBuilder, Method, RequestBuilder, Url,
    header::{AUTHORIZATION, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::ParseError;

pub use errors::RequestError;

pub mod auth_api;
pub mod configurations;
pub mod message_api;
pub mod notification_api;
pub mod relation_api;
pub mod room_api;
pub mod user_api;

mod errors;
#[cfg(test)]
mod tests;

// TODO: Turn this on once the deployed server terminates TLS itself.
const HTTPS_BY_DEFAULT: bool = false;

#[derive(Error, Debug)]
pub enum ApiClientInitError {
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),
    #[error("Failed to parse URL {0}")]
    UrlParsingError(String),
    #[error("Could not find hostname in URL {0}")]
    NoHostname(String),
}

pub type HttpClient = reqwest::Client;

// ApiClient is a wrapper around a reqwest client.
// It exposes a single function for each API endpoint.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: HttpClient,
    url: Url,
    token: Arc<RwLock<Option<Token>>>,
}

impl ApiClient {
    /// Creates a new HTTP client.
    pub fn new_http_client(settings: &HttpSettings) -> reqwest::Result<Client> {
        let mut builder = ClientBuilder::new()
            .pool_idle_timeout(Duration::from_secs(settings.pool_idle_timeout_secs))
            .user_agent(settings.user_agent.as_str());
        if let Some(timeout) = settings.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        builder.build()
    }

    pub fn with_default_http_client(domain: impl AsRef<str>) -> Result<Self, ApiClientInitError> {
        let client = Self::new_http_client(&HttpSettings::default())?;
        Self::initialize(client, domain)
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ApiClientInitError> {
        let client = Self::new_http_client(&settings.http)?;
        Self::initialize(client, &settings.application.base_url)
    }

    /// Creates a new API client that connects to the given base URL.
    ///
    /// # Arguments
    /// domain - The base URL or hostname:port tuple of the server. If the URL
    /// starts with `https`, TLS will be used. If the URL or hostname:port tuple
    /// includes a port, that port will be used, otherwise the default port of
    /// the scheme is used. A path in the base URL (e.g. `https://host/chat`) is
    /// kept as a prefix of every endpoint path.
    pub fn initialize(
        client: HttpClient,
        domain: impl AsRef<str>,
    ) -> Result<Self, ApiClientInitError> {
        // We first check if the domain is a valid URL.
        let domain = domain.as_ref();
        let url = match Url::parse(domain) {
            // `host:port` parses as a URL with scheme `host` and no hostname.
            Ok(url) if !url.cannot_be_a_base() => url,
            // If not, we try to parse it as a hostname.
            Ok(_) | Err(ParseError::RelativeUrlWithoutBase) => {
                let protocol = if HTTPS_BY_DEFAULT { "https" } else { "http" };
                let domain = format!("{protocol}://{domain}");
                Url::parse(&domain).map_err(|_| ApiClientInitError::UrlParsingError(domain))?
            }
            Err(_) => return Err(ApiClientInitError::UrlParsingError(domain.to_owned())),
        };
        if url.host_str().is_none() {
            return Err(ApiClientInitError::NoHostname(domain.to_owned()));
        }
        info!(%url, "Initialized API client");

        Ok(Self {
            client,
            url,
            token: Default::default(),
        })
    }

    /// Builds a URL for a given endpoint path (which may include a query string).
    fn build_url(&self, endpoint: &str) -> String {
        let tls_enabled = self.url.scheme() == "https";
        let protocol = if tls_enabled { "https" } else { "http" };
        format!(
            "{}://{}:{}{}{}",
            protocol,
            self.url.host_str().unwrap_or_default(),
            self.url.port().unwrap_or(if tls_enabled {
                DEFAULT_PORT_HTTPS
            } else {
                DEFAULT_PORT_HTTP
            }),
            self.url.path().trim_end_matches('/'),
            endpoint
        )
    }

    /// Token used to authenticate requests, if any.
    pub fn token(&self) -> Option<Token> {
        self.token.read().clone()
    }

    pub fn set_token(&self, token: Token) {
        *self.token.write() = Some(token);
    }

    pub fn clear_token(&self) {
        self.token.write().take();
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = self.build_url(endpoint);
        debug!(%method, %url, "Sending request");
        let request = self.client.request(method, url);
        let token = self.token.read();
        let Some(token) = token.as_ref() else {
            return request;
        };
        match HeaderValue::from_str(&format!("Bearer {}", token.access_token)) {
            Ok(value) => request.header(AUTHORIZATION, value),
            Err(error) => {
                warn!(%error, "Access token is not a valid header value");
                request
            }
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RequestError> {
        let res = request.send().await?;
        let status = res.status();
        let body = res.bytes().await?;
        if status.is_success() {
            serde_json::from_slice(&body).map_err(|error| {
                warn!(%status, %error, "Failed to decode response body");
                RequestError::BadResponse(error.to_string())
            })
        } else {
            let detail = serde_json::from_slice(&body).ok();
            debug!(%status, ?detail, "Server rejected request");
            Err(RequestError::Status { status, detail })
        }
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, RequestError> {
        self.send(self.request(Method::GET, endpoint)).await
    }

    async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, RequestError> {
        self.send(self.request(Method::DELETE, endpoint)).await
    }

    async fn send_json<B, T>(&self, method: Method, endpoint: &str, body: &B) -> Result<T, RequestError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(method, endpoint).json(body)).await
    }
}
