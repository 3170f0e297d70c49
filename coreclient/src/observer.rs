// SPDX-FileCopyrightText: 2024 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{pin::pin, sync::Arc};

use chatapiclient::ApiClient;
use tokio::sync::watch;
use tokio_stream::{Stream, StreamExt};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, trace};

use crate::{
    cache::{CacheNotification, QueryCache},
    queries::{Query, fetch_query},
    state::QueryState,
};

/// Keeps the state of a query up to date.
///
/// The query is fetched once on creation and again whenever its key is invalidated. A disabled
/// query stays idle. The background task stops when the observer is dropped.
#[derive(Debug)]
pub struct QueryObserver<T> {
    state_rx: watch::Receiver<QueryState<T>>,
    _stop: DropGuard,
}

impl<T: Send + Sync + 'static> QueryObserver<T> {
    /// Spawns the observer task. Must be called from within a tokio runtime.
    pub(crate) fn spawn<Q>(api: ApiClient, cache: QueryCache, query: Q) -> Self
    where
        Q: Query<Output = T> + 'static,
    {
        let stop = CancellationToken::new();
        if !query.is_enabled() {
            let (_, state_rx) = watch::channel(QueryState::idle());
            return Self {
                state_rx,
                _stop: stop.drop_guard(),
            };
        }

        let previous = cache.state::<T>(&query.key()).shared_data();
        let (state_tx, state_rx) = watch::channel(QueryState::loading(previous));
        // Subscribe before the first fetch, so no invalidation is missed.
        let notifications = cache.subscribe();
        tokio::spawn(Self::observe_loop(
            api,
            cache,
            query,
            notifications,
            state_tx,
            stop.clone(),
        ));

        Self {
            state_rx,
            _stop: stop.drop_guard(),
        }
    }

    pub fn state(&self) -> QueryState<T> {
        self.state_rx.borrow().clone()
    }

    /// Waits for the next state change. Returns `None` once the observer stopped.
    pub async fn changed(&mut self) -> Option<QueryState<T>> {
        self.state_rx.changed().await.ok()?;
        Some(self.state_rx.borrow_and_update().clone())
    }

    /// Waits until the state satisfies `f`. Returns `None` if the observer stopped before.
    pub async fn wait_for(
        &mut self,
        f: impl FnMut(&QueryState<T>) -> bool,
    ) -> Option<QueryState<T>> {
        self.state_rx
            .wait_for(f)
            .await
            .ok()
            .map(|state| QueryState::clone(&state))
    }

    /// A new receiver of the state, e.g. for rendering from another task.
    pub fn subscribe(&self) -> watch::Receiver<QueryState<T>> {
        self.state_rx.clone()
    }

    async fn observe_loop<Q>(
        api: ApiClient,
        cache: QueryCache,
        query: Q,
        notifications: impl Stream<Item = Arc<CacheNotification>> + Send,
        state_tx: watch::Sender<QueryState<T>>,
        stop: CancellationToken,
    ) where
        Q: Query<Output = T>,
    {
        let key = query.key();
        let mut notifications = pin!(notifications);
        loop {
            let state = tokio::select! {
                state = fetch_query(&api, &cache, &query) => state,
                _ = stop.cancelled() => return,
            };
            trace!(%key, status = ?state.status(), "Emitting new state");
            state_tx.send_replace(state);

            loop {
                tokio::select! {
                    notification = notifications.next() => {
                        let Some(notification) = notification else { return };
                        if notification.affects(&key) {
                            break;
                        }
                    },
                    _ = stop.cancelled() => return,
                }
            }
            debug!(%key, "Refetching invalidated query");
            state_tx.send_modify(|state| *state = QueryState::loading(state.shared_data()));
        }
    }
}
