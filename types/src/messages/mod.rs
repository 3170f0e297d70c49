// SPDX-FileCopyrightText: 2023 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Request and response bodies exchanged with the chat server.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod auth;
pub mod message;
pub mod notification;
pub mod room;
pub mod user;

/// Error body returned by the server on non-success status codes.
///
/// `detail` is usually a string, but validation errors carry a list of objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: serde_json::Value,
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            serde_json::Value::String(detail) => f.write_str(detail),
            detail => write!(f, "{detail}"),
        }
    }
}

/// Plain acknowledgement returned by some endpoints, e.g. `{"msg": "notification deleted"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub msg: String,
}
