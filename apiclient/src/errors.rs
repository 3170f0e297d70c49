// SPDX-FileCopyrightText: 2023 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use chattypes::messages::ErrorDetail;
use reqwest::StatusCode;
use thiserror::Error;

/// Error returned by every API call.
///
/// Network failures, error status codes and undecodable bodies are reported as they are; the
/// client neither retries nor recovers.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Server responded with {status}{}", format_detail(.detail))]
    Status {
        status: StatusCode,
        detail: Option<ErrorDetail>,
    },
    #[error("Couldn't deserialize response body: {0}")]
    BadResponse(String),
    #[error("Invalid multipart body: {0}")]
    Multipart(String),
}

fn format_detail(detail: &Option<ErrorDetail>) -> String {
    detail
        .as_ref()
        .map(|detail| format!(": {detail}"))
        .unwrap_or_default()
}

impl RequestError {
    /// Status code of the server response, if the server responded at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network(error) => error.status(),
            Self::BadResponse(_) | Self::Multipart(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}
