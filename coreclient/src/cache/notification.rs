// SPDX-FileCopyrightText: 2024 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_stream::{
    Stream, StreamExt,
    wrappers::{BroadcastStream, errors::BroadcastStreamRecvError},
};
use tracing::error;

use super::QueryKey;

// 1024 * size_of::<Arc<CacheNotification>>() = 1024 * 8 = 8 KiB
const NOTIFICATION_CHANNEL_SIZE: usize = 1024;

#[derive(Debug, Clone)]
pub(crate) struct CacheNotificationsSender {
    tx: broadcast::Sender<Arc<CacheNotification>>,
}

impl CacheNotificationsSender {
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(NOTIFICATION_CHANNEL_SIZE);
        Self { tx }
    }

    pub(crate) fn notify(&self, notification: impl Into<Arc<CacheNotification>>) {
        let _no_receivers = self.tx.send(notification.into());
    }

    /// Stream of all notifications sent after subscribing.
    ///
    /// A lagging receiver gets a notification invalidating everything, since it can't know which
    /// keys it missed.
    pub(crate) fn subscribe(&self) -> impl Stream<Item = Arc<CacheNotification>> + Send + use<> {
        BroadcastStream::new(self.tx.subscribe()).map(|res| match res {
            Ok(notification) => notification,
            Err(BroadcastStreamRecvError::Lagged(n)) => {
                error!("cache notifications lagged by {} messages", n);
                Arc::new(CacheNotification::everything())
            }
        })
    }
}

impl Default for CacheNotificationsSender {
    fn default() -> Self {
        Self::new()
    }
}

/// Announces that cached responses became stale.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheNotification {
    /// Invalidated key prefixes, in the order they were requested
    pub invalidated: Vec<QueryKey>,
    /// All entries are affected
    pub everything: bool,
}

impl CacheNotification {
    pub(crate) fn invalidated(prefixes: Vec<QueryKey>) -> Self {
        Self {
            invalidated: prefixes,
            everything: false,
        }
    }

    pub(crate) fn everything() -> Self {
        Self {
            invalidated: Vec::new(),
            everything: true,
        }
    }

    /// Returns `true` if the entry under `key` is affected by this notification.
    pub fn affects(&self, key: &QueryKey) -> bool {
        self.everything || self.invalidated.iter().any(|prefix| key.starts_with(prefix))
    }
}
