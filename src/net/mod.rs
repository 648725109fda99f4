//=========================================================================
// Networking
//=========================================================================
//
// Lobby and game-state traffic between island players over TCP.
//
//   packet  Packet enum and its byte layout
//   codec   u16-length framing, FrameDecoder for partial reads
//   lobby   pure lobby state machine (no sockets)
//   server  ServerHandle: background thread driving Lobby
//   client  NetClient: non-blocking connection used by the scenes
//
// Frame layout (all integers little-endian):
//
//   ┌────────────┬───────────┬─────────────────┐
//   │ len: u16   │ id: u8    │ payload          │
//   └────────────┴───────────┴─────────────────┘
//                 └──────── len bytes ─────────┘
//
//=========================================================================

//=== External Dependencies ===============================================

use std::io;

use thiserror::Error;

//=== Module Declarations =================================================

mod client;
mod codec;
mod lobby;
mod packet;
mod server;

//=== Public API ==========================================================

pub use client::NetClient;
pub use codec::{encode_frame, FrameDecoder, MAX_BODY_LEN};
pub use lobby::{JoinOutcome, Lobby, Outgoing, Target, DEFAULT_MAX_PLAYERS};
pub use packet::{Packet, PlayerId, PlayerInfo, MAX_STRING_LEN};
pub use server::ServerHandle;

//=== NetError ============================================================

#[derive(Debug, Error)]
pub enum NetError {
    #[error("network I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("could not resolve address '{0}'")]
    BadAddress(String),

    #[error("timed out connecting to {0}")]
    ConnectTimeout(String),

    #[error("connection closed by peer")]
    Disconnected,

    #[error("server rejected join: {0}")]
    Rejected(String),

    #[error("server failed to start: {0}")]
    ServerStartup(String),

    #[error("packet ended early")]
    UnexpectedEof,

    #[error("unknown packet id {0}")]
    UnknownPacket(u8),

    #[error("{0} trailing bytes after packet")]
    TrailingBytes(usize),

    #[error("string of {0} bytes exceeds {max}", max = MAX_STRING_LEN)]
    StringTooLong(usize),

    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    #[error("packet body of {0} bytes exceeds {max}", max = MAX_BODY_LEN)]
    PacketTooLarge(usize),
}
