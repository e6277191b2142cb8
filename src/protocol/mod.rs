//! Wire protocol shared by the relay server and its clients
//!
//! Every frame on the wire is a 4-byte length prefix in network order
//! followed by exactly one fixed-layout message record. The record
//! layout and the stable type/result codes live in [`message`]; the
//! framed read/write functions live in [`framing`].

pub mod framing;
pub mod message;

pub use framing::{read_message, write_message};
pub use message::{Message, ProtocolError, RoomInfo, MESSAGE_LEN, ROOM_INFO_LEN};

/// Default listen port for the relay server
pub const DEFAULT_PORT: u16 = 9999;

/// Maximum simultaneously connected clients
pub const MAX_CLIENTS: usize = 20;
/// Maximum simultaneously active rooms
pub const MAX_ROOMS: usize = 10;

/// Fixed room-name field width (bytes, NUL-padded)
pub const ROOM_NAME_LEN: usize = 32;
/// Fixed nickname field width (bytes, NUL-padded)
pub const NICKNAME_LEN: usize = 50;
/// Fixed status-text field width (bytes, NUL-padded)
pub const TEXT_LEN: usize = 256;

/// Message type codes (stable wire values)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum MessageType {
    Connect = 1,
    ConnectAck = 2,
    Disconnect = 3,

    RoomCreate = 10,
    RoomCreateAck = 11,
    RoomList = 12,
    RoomListResp = 13,
    RoomJoin = 14,
    RoomJoinAck = 15,
    RoomLeave = 16,
    RoomFull = 17,
    RoomNotFound = 18,

    GameStart = 20,
    Move = 21,
    MoveAck = 22,
    GameEnd = 23,
    OpponentLeft = 24,

    Ping = 40,
    Pong = 41,
    Error = 99,
}

impl MessageType {
    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        use MessageType::*;
        Some(match code {
            1 => Connect,
            2 => ConnectAck,
            3 => Disconnect,
            10 => RoomCreate,
            11 => RoomCreateAck,
            12 => RoomList,
            13 => RoomListResp,
            14 => RoomJoin,
            15 => RoomJoinAck,
            16 => RoomLeave,
            17 => RoomFull,
            18 => RoomNotFound,
            20 => GameStart,
            21 => Move,
            22 => MoveAck,
            23 => GameEnd,
            24 => OpponentLeft,
            40 => Ping,
            41 => Pong,
            99 => Error,
            _ => return None,
        })
    }
}

/// Game outcome codes carried in `GameEnd.result`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum GameResult {
    None = 0,
    BlackWin = 1,
    WhiteWin = 2,
    Draw = 3,
    Disconnect = 4,
}

impl GameResult {
    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => GameResult::None,
            1 => GameResult::BlackWin,
            2 => GameResult::WhiteWin,
            3 => GameResult::Draw,
            4 => GameResult::Disconnect,
            _ => return None,
        })
    }

    /// The result that declares `winner` the victor.
    pub fn win_for(winner: crate::board::Stone) -> Self {
        match winner {
            crate::board::Stone::Black => GameResult::BlackWin,
            crate::board::Stone::White => GameResult::WhiteWin,
            crate::board::Stone::Empty => GameResult::Draw,
        }
    }
}
