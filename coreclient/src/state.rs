// SPDX-FileCopyrightText: 2024 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::sync::Arc;

use chatapiclient::RequestError;

use crate::cache::QueryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    /// Nothing was requested yet, or the query is disabled
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Read-only view of a query.
///
/// While a query is refetched, the previous data stays available.
#[derive(Debug)]
pub struct QueryState<T> {
    status: Status,
    data: Option<Arc<T>>,
    error: Option<QueryError>,
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
        }
    }
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self::idle()
    }
}

impl<T> QueryState<T> {
    pub fn idle() -> Self {
        Self {
            status: Status::Idle,
            data: None,
            error: None,
        }
    }

    pub(crate) fn loading(previous: Option<Arc<T>>) -> Self {
        Self {
            status: Status::Loading,
            data: previous,
            error: None,
        }
    }

    pub(crate) fn succeeded(data: Arc<T>) -> Self {
        Self {
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }

    pub(crate) fn failed(error: QueryError, previous: Option<Arc<T>>) -> Self {
        Self {
            status: Status::Error,
            data: previous,
            error: Some(error),
        }
    }

    pub(crate) fn from_result(
        result: Result<Arc<T>, QueryError>,
        previous: Option<Arc<T>>,
    ) -> Self {
        match result {
            Ok(data) => Self::succeeded(data),
            Err(error) => Self::failed(error, previous),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_deref()
    }

    pub fn shared_data(&self) -> Option<Arc<T>> {
        self.data.clone()
    }

    pub fn error(&self) -> Option<&QueryError> {
        self.error.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.status == Status::Idle
    }

    pub fn is_loading(&self) -> bool {
        self.status == Status::Loading
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == Status::Error
    }
}

/// Outcome of a mutation.
#[derive(Debug)]
pub struct MutationState<T> {
    result: Result<T, Arc<RequestError>>,
}

impl<T> From<Result<T, RequestError>> for MutationState<T> {
    fn from(result: Result<T, RequestError>) -> Self {
        Self {
            result: result.map_err(Arc::new),
        }
    }
}

impl<T> MutationState<T> {
    pub fn status(&self) -> Status {
        match self.result {
            Ok(_) => Status::Success,
            Err(_) => Status::Error,
        }
    }

    /// The server response, passed through as it was received.
    pub fn data(&self) -> Option<&T> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&RequestError> {
        self.result.as_ref().err().map(|error| &**error)
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn is_error(&self) -> bool {
        self.result.is_err()
    }

    pub fn into_result(self) -> Result<T, Arc<RequestError>> {
        self.result
    }
}
