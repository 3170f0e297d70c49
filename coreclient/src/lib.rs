// SPDX-FileCopyrightText: 2023 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Client-side access layer of the chat application
//!
//! Views read server data through [`Query`]s, which are cached in a [`QueryCache`], and change
//! it through [`Mutation`]s, which invalidate the cached reads they affect.

pub mod cache;
mod client;
pub mod mutations;
mod observer;
pub mod queries;
pub mod state;

pub use cache::{CacheNotification, QueryCache, QueryError, QueryKey};
pub use client::{ChatClient, ChatClientError};
pub use mutations::Mutation;
pub use observer::QueryObserver;
pub use queries::Query;
pub use state::{MutationState, QueryState, Status};
