// SPDX-FileCopyrightText: 2023 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use chattypes::{endpoint_paths::message, identifiers::RoomId, messages::message::Message};

use crate::{ApiClient, RequestError};

impl ApiClient {
    /// Fetches a page of the room history, oldest message first.
    pub async fn room_messages(
        &self,
        room_id: &RoomId,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Message>, RequestError> {
        self.get(&message::room_message(room_id, offset, limit))
            .await
    }
}
