// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! Exchange names, routing keys and shared records used by publishers and
//! subscribers of the game's message bus.

use serde::{Deserialize, Serialize};

/// Direct exchange for exact-key control messages
pub const EXCHANGE_PERIL_DIRECT: &str = "peril_direct";
/// Topic exchange for wildcard-routed traffic
pub const EXCHANGE_PERIL_TOPIC: &str = "peril_topic";
/// Exchange receiving every rejected message
pub const EXCHANGE_PERIL_DLX: &str = "peril_dlx";

pub const PAUSE_KEY: &str = "pause";
pub const ARMY_MOVES_PREFIX: &str = "army_moves";
pub const GAME_LOG_SLUG: &str = "game_logs";

/// Published on [`PAUSE_KEY`] to pause or resume every client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayingState {
    pub is_paused: bool,
}

/// `<prefix>.<suffix>`, e.g. the per-player queue `pause.alice`.
pub fn key(prefix: &str, suffix: &str) -> String {
    format!("{}.{}", prefix, suffix)
}

/// `<prefix>.*`, the binding that receives every player's messages under `prefix`.
pub fn wildcard(prefix: &str) -> String {
    format!("{}.*", prefix)
}
