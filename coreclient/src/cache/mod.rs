// SPDX-FileCopyrightText: 2024 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! In-memory cache of server responses
//!
//! Entries are stored under a [`QueryKey`]. Concurrent fetches of the same key share a single
//! request. Invalidating a key prefix marks all matching entries as stale and broadcasts a
//! [`CacheNotification`] to subscribers (see [`crate::QueryObserver`]).

use std::{
    any::Any,
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use chatapiclient::RequestError;
use futures_util::{
    FutureExt,
    future::{BoxFuture, Shared},
};
use parking_lot::Mutex;
use thiserror::Error;
use tokio_stream::Stream;
use tracing::{debug, warn};

use crate::state::QueryState;

pub use key::{KeyToken, QueryKey};
pub use notification::CacheNotification;
use notification::CacheNotificationsSender;

mod key;
mod notification;

type AnyData = Arc<dyn Any + Send + Sync>;
type SharedFetch = Shared<BoxFuture<'static, Result<AnyData, QueryError>>>;

/// Error of a query.
///
/// Cloneable since a single failed request is reported to every caller waiting for it.
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    #[error(transparent)]
    Request(Arc<RequestError>),
    #[error("Cached data under {0} has an unexpected type")]
    TypeMismatch(QueryKey),
}

impl QueryError {
    /// The underlying request error, if the failure came from the server or the network.
    pub fn request_error(&self) -> Option<&RequestError> {
        match self {
            Self::Request(error) => Some(error),
            Self::TypeMismatch(_) => None,
        }
    }
}

impl From<RequestError> for QueryError {
    fn from(error: RequestError) -> Self {
        Self::Request(Arc::new(error))
    }
}

/// Handle to the response cache.
///
/// Cloning the handle is cheap; all clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

#[derive(Default)]
struct CacheInner {
    entries: Mutex<HashMap<QueryKey, CacheEntry>>,
    notifications: CacheNotificationsSender,
    next_fetch_id: AtomicU64,
}

impl std::fmt::Debug for CacheInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheInner")
            .field("entries", &self.entries.lock().len())
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct CacheEntry {
    data: Option<AnyData>,
    error: Option<QueryError>,
    stale: bool,
    /// Incremented on every invalidation
    generation: u64,
    in_flight: Option<InFlight>,
}

impl CacheEntry {
    fn is_empty(&self) -> bool {
        self.data.is_none() && self.error.is_none() && self.in_flight.is_none()
    }
}

struct InFlight {
    id: u64,
    /// Generation of the entry when the request was started
    generation: u64,
    /// Callers currently awaiting `fetch`
    waiters: usize,
    fetch: SharedFetch,
}

/// Deregisters a caller from an in-flight request when its fetch is dropped.
struct Waiter<'a> {
    cache: &'a QueryCache,
    key: &'a QueryKey,
    id: u64,
}

impl Drop for Waiter<'_> {
    fn drop(&mut self) {
        self.cache.leave(self.key, self.id);
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the data cached under `key`, fetching it with `fetcher` if there is no fresh
    /// entry.
    ///
    /// If a request for `key` is already in flight and was started after the last invalidation
    /// of `key`, no new request is started and the result of the pending one is returned. A
    /// request started before the invalidation is superseded by a new one: its callers still get
    /// its result, but it does not populate the entry.
    ///
    /// When every caller of a request is dropped before it finished, the request is abandoned
    /// and the entry goes back to the state it had before.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<Arc<T>, QueryError>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, RequestError>> + Send + 'static,
    {
        let (id, fetch) = {
            let mut entries = self.inner.entries.lock();
            let entry = entries.entry(key.clone()).or_default();
            if let Some(data) = entry.data.as_ref().filter(|_| !entry.stale) {
                debug!(%key, "Serving cached data");
                return downcast(&key, data.clone());
            }
            let generation = entry.generation;
            match entry
                .in_flight
                .as_mut()
                .filter(|in_flight| in_flight.generation == generation)
            {
                Some(in_flight) => {
                    debug!(%key, "Joining in-flight request");
                    in_flight.waiters += 1;
                    (in_flight.id, in_flight.fetch.clone())
                }
                None => {
                    let id = self.inner.next_fetch_id.fetch_add(1, Ordering::Relaxed);
                    let request = fetcher();
                    let fetch = async move {
                        request
                            .await
                            .map(|data| Arc::new(data) as AnyData)
                            .map_err(QueryError::from)
                    }
                    .boxed()
                    .shared();
                    if let Some(superseded) = entry.in_flight.as_ref() {
                        debug!(
                            %key,
                            id,
                            superseded = superseded.id,
                            "Restarting invalidated request"
                        );
                    } else {
                        debug!(%key, id, "Starting request");
                    }
                    entry.in_flight = Some(InFlight {
                        id,
                        generation,
                        waiters: 1,
                        fetch: fetch.clone(),
                    });
                    (id, fetch)
                }
            }
        };

        let _waiter = Waiter {
            cache: self,
            key: &key,
            id,
        };
        let result = fetch.await;
        self.complete(&key, id, &result);
        result.and_then(|data| downcast(&key, data))
    }

    fn complete(&self, key: &QueryKey, id: u64, result: &Result<AnyData, QueryError>) {
        let mut entries = self.inner.entries.lock();
        // The entry is gone if the cache was cleared in the meantime.
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        // Already completed by another caller sharing the request, or superseded
        let Some(in_flight) = entry.in_flight.take_if(|in_flight| in_flight.id == id) else {
            return;
        };
        match result {
            Ok(data) => {
                entry.data = Some(data.clone());
                entry.error = None;
            }
            Err(error) => {
                warn!(%key, %error, "Request failed");
                entry.error = Some(error.clone());
            }
        }
        entry.stale = result.is_err() || entry.generation != in_flight.generation;
    }

    fn leave(&self, key: &QueryKey, id: u64) {
        let mut entries = self.inner.entries.lock();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        let Some(in_flight) = entry.in_flight.as_mut().filter(|in_flight| in_flight.id == id)
        else {
            return;
        };
        in_flight.waiters -= 1;
        if in_flight.waiters > 0 {
            return;
        }
        debug!(%key, id, "Abandoning request without waiters");
        entry.in_flight = None;
        if entry.is_empty() {
            entries.remove(key);
        }
    }

    /// Marks every entry whose key starts with `prefix` as stale.
    pub fn invalidate(&self, prefix: QueryKey) {
        self.invalidate_many(vec![prefix]);
    }

    /// Marks every entry whose key starts with one of `prefixes` as stale and notifies
    /// subscribers with a single notification.
    ///
    /// Does not refetch anything by itself.
    pub fn invalidate_many(&self, prefixes: Vec<QueryKey>) {
        if prefixes.is_empty() {
            return;
        }
        let mut num_invalidated = 0;
        {
            let mut entries = self.inner.entries.lock();
            for (key, entry) in entries.iter_mut() {
                if prefixes.iter().any(|prefix| key.starts_with(prefix)) {
                    entry.stale = true;
                    entry.generation += 1;
                    num_invalidated += 1;
                }
            }
        }
        debug!(?prefixes, num_invalidated, "Invalidated cache entries");
        self.inner
            .notifications
            .notify(CacheNotification::invalidated(prefixes));
    }

    /// Drops every entry whose key starts with `prefix`, including pending requests.
    ///
    /// Unlike [`Self::invalidate`], subscribers are not notified. Use this to forget responses
    /// nobody is going to read again, e.g. search results or message pages of a closed room.
    pub fn remove(&self, prefix: &QueryKey) {
        let mut entries = self.inner.entries.lock();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        debug!(%prefix, num_removed = before - entries.len(), "Removed cache entries");
    }

    /// Removes all entries.
    pub fn clear(&self) {
        self.inner.entries.lock().clear();
        debug!("Cleared cache");
        self.inner.notifications.notify(CacheNotification::everything());
    }

    /// Current state of the entry under `key`.
    pub fn state<T: Send + Sync + 'static>(&self, key: &QueryKey) -> QueryState<T> {
        let entries = self.inner.entries.lock();
        let Some(entry) = entries.get(key) else {
            return QueryState::idle();
        };
        let data = match entry.data.clone().map(|data| downcast::<T>(key, data)) {
            Some(Ok(data)) => Some(data),
            Some(Err(error)) => return QueryState::failed(error, None),
            None => None,
        };
        if entry.in_flight.is_some() {
            QueryState::loading(data)
        } else if let Some(error) = &entry.error {
            QueryState::failed(error.clone(), data)
        } else if let Some(data) = data {
            QueryState::succeeded(data)
        } else {
            QueryState::idle()
        }
    }

    /// Returns `true` if there is an entry under `key` and it must be refetched before use.
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.inner
            .entries
            .lock()
            .get(key)
            .is_some_and(|entry| entry.stale)
    }

    /// Stream of notifications sent after subscribing.
    pub fn subscribe(&self) -> impl Stream<Item = Arc<CacheNotification>> + Send + use<> {
        self.inner.notifications.subscribe()
    }
}

fn downcast<T: Send + Sync + 'static>(key: &QueryKey, data: AnyData) -> Result<Arc<T>, QueryError> {
    data.downcast::<T>()
        .map_err(|_| QueryError::TypeMismatch(key.clone()))
}
