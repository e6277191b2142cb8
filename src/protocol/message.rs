//! Fixed-layout message record and its codec
//!
//! One record shape serves every message direction. Integer fields are
//! little-endian; string fields are fixed-width and NUL-padded, always
//! keeping at least one terminating NUL (so the longest nickname is 49
//! bytes and the longest room name 31). The `rooms` array is only
//! meaningful in `RoomListResp`, where `y` carries the valid prefix
//! length; all other messages transmit it zeroed.
//!
//! Record layout, `MESSAGE_LEN` = 1266 bytes total:
//!
//! | field    | type      | bytes |
//! |----------|-----------|-------|
//! | type     | i32       | 4     |
//! | x        | i32       | 4     |
//! | y        | i32       | 4     |
//! | player   | i32       | 4     |
//! | result   | i32       | 4     |
//! | nickname | NUL-padded| 50    |
//! | text     | NUL-padded| 256   |
//! | rooms    | RoomInfo  | 940   |
//!
//! `RoomInfo` (94 bytes): `room_id: i32`, `name: [u8; 32]`,
//! `host_name: [u8; 50]`, `player_count: i32`, `in_game: i32`.

use thiserror::Error;

use crate::board::Stone;

use super::{GameResult, MessageType, MAX_ROOMS, NICKNAME_LEN, ROOM_NAME_LEN, TEXT_LEN};

/// Encoded size of one `RoomInfo` entry
pub const ROOM_INFO_LEN: usize = 4 + ROOM_NAME_LEN + NICKNAME_LEN + 4 + 4; // 94

/// Encoded size of the message record (the value every length prefix
/// must carry)
pub const MESSAGE_LEN: usize = 5 * 4 + NICKNAME_LEN + TEXT_LEN + MAX_ROOMS * ROOM_INFO_LEN; // 1266

/// Errors raised while decoding or framing a message
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("bad frame length: expected {expected}, got {got}")]
    BadLength { expected: usize, got: usize },
    #[error("unknown message type {0}")]
    UnknownType(i32),
    #[error("room count {0} out of range")]
    BadRoomCount(i32),
    #[error("string field is not valid utf-8")]
    BadString(#[from] std::str::Utf8Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One row of a room-list response
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoomInfo {
    pub room_id: i32,
    pub name: String,
    pub host_name: String,
    pub player_count: i32,
    pub in_game: bool,
}

/// The protocol's single message record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageType,
    /// Board x, or room id for room-scoped messages
    pub x: i32,
    /// Board y, or room count for list responses
    pub y: i32,
    /// Color code: 1 = Black, 2 = White ("your color" in `GameStart`)
    pub player: i32,
    /// Game outcome code when `kind == GameEnd`
    pub result: i32,
    /// Player nickname or room name, depending on `kind`
    pub nickname: String,
    /// Human-readable status or error text
    pub text: String,
    /// Valid only for `RoomListResp` (`y` entries)
    pub rooms: Vec<RoomInfo>,
}

impl Message {
    /// A zeroed record of the given type
    #[must_use]
    pub fn new(kind: MessageType) -> Self {
        Self {
            kind,
            x: 0,
            y: 0,
            player: 0,
            result: 0,
            nickname: String::new(),
            text: String::new(),
            rooms: Vec::new(),
        }
    }

    pub fn connect(nickname: &str) -> Self {
        let mut msg = Self::new(MessageType::Connect);
        msg.nickname = truncated(nickname, NICKNAME_LEN);
        msg
    }

    pub fn connect_ack(text: &str) -> Self {
        let mut msg = Self::new(MessageType::ConnectAck);
        msg.text = truncated(text, TEXT_LEN);
        msg
    }

    pub fn room_create(room_name: &str) -> Self {
        let mut msg = Self::new(MessageType::RoomCreate);
        msg.nickname = truncated(room_name, NICKNAME_LEN);
        msg
    }

    pub fn room_create_ack(room_id: i32, text: &str) -> Self {
        let mut msg = Self::new(MessageType::RoomCreateAck);
        msg.x = room_id;
        msg.text = truncated(text, TEXT_LEN);
        msg
    }

    pub fn room_list() -> Self {
        Self::new(MessageType::RoomList)
    }

    pub fn room_list_resp(rooms: Vec<RoomInfo>) -> Self {
        let mut msg = Self::new(MessageType::RoomListResp);
        msg.y = rooms.len().min(MAX_ROOMS) as i32;
        msg.rooms = rooms;
        msg.rooms.truncate(MAX_ROOMS);
        msg
    }

    pub fn room_join(room_id: i32) -> Self {
        let mut msg = Self::new(MessageType::RoomJoin);
        msg.x = room_id;
        msg
    }

    pub fn room_join_ack(room_id: i32, text: &str) -> Self {
        let mut msg = Self::new(MessageType::RoomJoinAck);
        msg.x = room_id;
        msg.text = truncated(text, TEXT_LEN);
        msg
    }

    pub fn room_leave() -> Self {
        Self::new(MessageType::RoomLeave)
    }

    pub fn room_full(text: &str) -> Self {
        let mut msg = Self::new(MessageType::RoomFull);
        msg.text = truncated(text, TEXT_LEN);
        msg
    }

    pub fn room_not_found(text: &str) -> Self {
        let mut msg = Self::new(MessageType::RoomNotFound);
        msg.text = truncated(text, TEXT_LEN);
        msg
    }

    pub fn game_start(your_color: Stone, opponent_nick: &str) -> Self {
        let mut msg = Self::new(MessageType::GameStart);
        msg.player = your_color.code();
        msg.nickname = truncated(opponent_nick, NICKNAME_LEN);
        msg
    }

    pub fn game_move(x: i32, y: i32, color: Stone) -> Self {
        let mut msg = Self::new(MessageType::Move);
        msg.x = x;
        msg.y = y;
        msg.player = color.code();
        msg
    }

    pub fn move_ack(x: i32, y: i32, color: Stone) -> Self {
        let mut msg = Self::new(MessageType::MoveAck);
        msg.x = x;
        msg.y = y;
        msg.player = color.code();
        msg
    }

    pub fn game_end(result: GameResult) -> Self {
        let mut msg = Self::new(MessageType::GameEnd);
        msg.result = result.code();
        msg
    }

    pub fn opponent_left(text: &str) -> Self {
        let mut msg = Self::new(MessageType::OpponentLeft);
        msg.text = truncated(text, TEXT_LEN);
        msg
    }

    pub fn ping() -> Self {
        Self::new(MessageType::Ping)
    }

    pub fn pong() -> Self {
        Self::new(MessageType::Pong)
    }

    pub fn error(text: &str) -> Self {
        let mut msg = Self::new(MessageType::Error);
        msg.text = truncated(text, TEXT_LEN);
        msg
    }

    /// Encode into the fixed wire layout.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(MESSAGE_LEN);
        put_i32(&mut buf, self.kind.code());
        put_i32(&mut buf, self.x);
        put_i32(&mut buf, self.y);
        put_i32(&mut buf, self.player);
        put_i32(&mut buf, self.result);
        put_str(&mut buf, &self.nickname, NICKNAME_LEN);
        put_str(&mut buf, &self.text, TEXT_LEN);

        for i in 0..MAX_ROOMS {
            match self.rooms.get(i) {
                Some(room) => {
                    put_i32(&mut buf, room.room_id);
                    put_str(&mut buf, &room.name, ROOM_NAME_LEN);
                    put_str(&mut buf, &room.host_name, NICKNAME_LEN);
                    put_i32(&mut buf, room.player_count);
                    put_i32(&mut buf, i32::from(room.in_game));
                }
                None => buf.extend(std::iter::repeat(0u8).take(ROOM_INFO_LEN)),
            }
        }

        debug_assert_eq!(buf.len(), MESSAGE_LEN);
        buf
    }

    /// Decode a fixed-layout record. The slice length must be exactly
    /// [`MESSAGE_LEN`].
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() != MESSAGE_LEN {
            return Err(ProtocolError::BadLength {
                expected: MESSAGE_LEN,
                got: bytes.len(),
            });
        }

        let mut cursor = 0usize;
        let type_code = get_i32(bytes, &mut cursor);
        let kind = MessageType::from_code(type_code).ok_or(ProtocolError::UnknownType(type_code))?;
        let x = get_i32(bytes, &mut cursor);
        let y = get_i32(bytes, &mut cursor);
        let player = get_i32(bytes, &mut cursor);
        let result = get_i32(bytes, &mut cursor);
        let nickname = get_str(bytes, &mut cursor, NICKNAME_LEN)?;
        let text = get_str(bytes, &mut cursor, TEXT_LEN)?;

        let rooms = if kind == MessageType::RoomListResp {
            if y < 0 || y > MAX_ROOMS as i32 {
                return Err(ProtocolError::BadRoomCount(y));
            }
            let mut rooms = Vec::with_capacity(y as usize);
            for _ in 0..y {
                let room_id = get_i32(bytes, &mut cursor);
                let name = get_str(bytes, &mut cursor, ROOM_NAME_LEN)?;
                let host_name = get_str(bytes, &mut cursor, NICKNAME_LEN)?;
                let player_count = get_i32(bytes, &mut cursor);
                let in_game = get_i32(bytes, &mut cursor) != 0;
                rooms.push(RoomInfo {
                    room_id,
                    name,
                    host_name,
                    player_count,
                    in_game,
                });
            }
            rooms
        } else {
            Vec::new()
        };

        Ok(Self {
            kind,
            x,
            y,
            player,
            result,
            nickname,
            text,
            rooms,
        })
    }
}

/// Truncate `s` to fit within `width - 1` bytes (leaving room for the
/// terminating NUL), truncating on a char boundary.
fn truncated(s: &str, width: usize) -> String {
    let mut take = s.len().min(width - 1);
    while !s.is_char_boundary(take) {
        take -= 1;
    }
    s[..take].to_owned()
}

#[inline]
fn put_i32(buf: &mut Vec<u8>, value: i32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Write `s` into a fixed-width NUL-padded field, truncating on a char
/// boundary so the field always ends with at least one NUL.
fn put_str(buf: &mut Vec<u8>, s: &str, width: usize) {
    let mut take = s.len().min(width - 1);
    while !s.is_char_boundary(take) {
        take -= 1;
    }
    buf.extend_from_slice(&s.as_bytes()[..take]);
    buf.extend(std::iter::repeat(0u8).take(width - take));
}

#[inline]
fn get_i32(bytes: &[u8], cursor: &mut usize) -> i32 {
    let value = i32::from_le_bytes(bytes[*cursor..*cursor + 4].try_into().expect("4 bytes"));
    *cursor += 4;
    value
}

fn get_str(bytes: &[u8], cursor: &mut usize, width: usize) -> Result<String, ProtocolError> {
    let field = &bytes[*cursor..*cursor + width];
    *cursor += width;
    let end = field.iter().position(|&b| b == 0).unwrap_or(width);
    Ok(std::str::from_utf8(&field[..end])?.to_owned())
}
