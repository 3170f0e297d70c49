// SPDX-FileCopyrightText: 2023 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use chattypes::{
    endpoint_paths::notification,
    identifiers::NotificationId,
    messages::{
        StatusMessage,
        notification::{Notification, NotificationPatch},
    },
};
use reqwest::Method;

use crate::{ApiClient, RequestError};

impl ApiClient {
    /// Notifications of the authenticated user, newest first.
    pub async fn notifications(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Notification>, RequestError> {
        self.get(&notification::get_notification(limit, offset))
            .await
    }

    pub async fn change_notification_status(
        &self,
        notification_id: NotificationId,
        patch: &NotificationPatch,
    ) -> Result<StatusMessage, RequestError> {
        self.send_json(
            Method::PATCH,
            &notification::mark_or_change_status(notification_id),
            patch,
        )
        .await
    }

    pub async fn mark_all_notifications_read(&self) -> Result<StatusMessage, RequestError> {
        self.send(self.request(Method::PATCH, notification::MARK_ALL_READ))
            .await
    }

    pub async fn delete_notification(
        &self,
        notification_id: NotificationId,
    ) -> Result<StatusMessage, RequestError> {
        self.delete(&notification::notification_delete(notification_id))
            .await
    }

    pub async fn delete_all_notifications(&self) -> Result<StatusMessage, RequestError> {
        self.delete(notification::DELETE_ALL).await
    }
}
