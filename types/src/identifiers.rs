// SPDX-FileCopyrightText: 2023 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Identifier of a chat room (a hex encoded document id on the server).
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, From, Display,
)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Numeric database id of a user.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    From,
    Display,
)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Public, shareable unique id of a user.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, From, Display,
)]
#[serde(transparent)]
pub struct Uid(String);

impl Uid {
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Uid {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    From,
    Display,
)]
#[serde(transparent)]
pub struct NotificationId(i64);

impl NotificationId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Selects which user the "get user" endpoint returns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UserLookup {
    ByUid(Uid),
    ByUserId(UserId),
    /// The authenticated user.
    Current,
}

impl UserLookup {
    /// Builds a lookup from the optional parameters accepted by the endpoint.
    ///
    /// A non-empty `uid` takes precedence over `user_id`. Any present `user_id` is used as is,
    /// including `0`.
    pub fn from_parts(uid: Option<&str>, user_id: Option<UserId>) -> Self {
        match (uid.filter(|uid| !uid.is_empty()), user_id) {
            (Some(uid), _) => Self::ByUid(uid.into()),
            (None, Some(user_id)) => Self::ByUserId(user_id),
            (None, None) => Self::Current,
        }
    }
}

impl From<UserId> for UserLookup {
    fn from(user_id: UserId) -> Self {
        Self::ByUserId(user_id)
    }
}

impl From<Uid> for UserLookup {
    fn from(uid: Uid) -> Self {
        Self::ByUid(uid)
    }
}
