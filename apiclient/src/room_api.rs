// SPDX-FileCopyrightText: 2023 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use chattypes::{
    endpoint_paths::room,
    identifiers::RoomId,
    messages::room::{ChatHistoryEntry, Room, RoomFriends},
};

use crate::{ApiClient, RequestError};

impl ApiClient {
    /// All rooms the authenticated user is a member of.
    pub async fn rooms(&self) -> Result<Vec<Room>, RequestError> {
        self.get(room::GET_ROOM).await
    }

    pub async fn chat_history(&self) -> Result<Vec<ChatHistoryEntry>, RequestError> {
        self.get(room::CHAT_HISTORY).await
    }

    /// The most recently created room of the user, if there is any.
    pub async fn initial_room(&self) -> Result<Option<Room>, RequestError> {
        self.get(room::INITIAL_ROOM).await
    }

    pub async fn room(&self, room_id: &RoomId) -> Result<Option<Room>, RequestError> {
        self.get(&room::get_room_by_id(room_id)).await
    }

    pub async fn room_friends(&self, room_id: &RoomId) -> Result<RoomFriends, RequestError> {
        self.get(&room::get_room_friends(room_id)).await
    }
}
