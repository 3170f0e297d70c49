// SPDX-FileCopyrightText: 2024 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt;

use chattypes::identifiers::{NotificationId, RoomId, Uid, UserId};

/// Single component of a [`QueryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyToken {
    /// An absent parameter
    Null,
    Int(i64),
    Str(String),
}

impl fmt::Display for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyToken::Null => f.write_str("null"),
            KeyToken::Int(value) => write!(f, "{value}"),
            KeyToken::Str(value) => write!(f, "{value:?}"),
        }
    }
}

impl From<&str> for KeyToken {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for KeyToken {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for KeyToken {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for KeyToken {
    fn from(value: u32) -> Self {
        Self::Int(value.into())
    }
}

impl From<&RoomId> for KeyToken {
    fn from(value: &RoomId) -> Self {
        value.as_str().into()
    }
}

impl From<&Uid> for KeyToken {
    fn from(value: &Uid) -> Self {
        value.as_str().into()
    }
}

impl From<UserId> for KeyToken {
    fn from(value: UserId) -> Self {
        value.value().into()
    }
}

impl From<NotificationId> for KeyToken {
    fn from(value: NotificationId) -> Self {
        value.value().into()
    }
}

impl<T: Into<KeyToken>> From<Option<T>> for KeyToken {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

/// Ordered sequence of tokens identifying a cached response.
///
/// The first token names the resource, the following ones carry every parameter the response
/// depends on. Invalidation works on prefixes: invalidating `["room"]` also invalidates
/// `["room", "42"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<KeyToken>);

impl QueryKey {
    pub fn new(resource: &str) -> Self {
        Self(vec![resource.into()])
    }

    #[must_use]
    pub fn with(mut self, token: impl Into<KeyToken>) -> Self {
        self.0.push(token.into());
        self
    }

    pub fn tokens(&self) -> &[KeyToken] {
        &self.0
    }

    /// Returns `true` if `prefix` is a prefix of this key (or equal to it).
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, token) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{token}")?;
        }
        f.write_str("]")
    }
}

impl From<&str> for QueryKey {
    fn from(resource: &str) -> Self {
        Self::new(resource)
    }
}
