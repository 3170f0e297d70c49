// SPDX-FileCopyrightText: 2023 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Endpoint registry and data model of the chat server REST API.

pub mod endpoint_paths;
pub mod identifiers;
pub mod messages;

pub const DEFAULT_PORT_HTTP: u16 = 80;
pub const DEFAULT_PORT_HTTPS: u16 = 443;
