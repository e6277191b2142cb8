//! Server-side client and room bookkeeping
//!
//! Fixed-capacity slot arrays indexed by handle, with first-free-slot
//! allocation. All state is owned exclusively by the event loop; there
//! is no sharing and no locking.

use std::net::SocketAddr;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::task::JoinHandle;

use crate::board::{Board, Stone};
use crate::protocol::{RoomInfo, MAX_CLIENTS, MAX_ROOMS};

/// One connected client.
///
/// Created on accept, destroyed on disconnect. The reader half of the
/// socket lives in `reader_task`; the event loop owns the writer so all
/// outbound messages to one client are strictly ordered.
pub struct ClientSlot {
    pub writer: OwnedWriteHalf,
    pub reader_task: JoinHandle<()>,
    pub addr: SocketAddr,
    /// Distinguishes this occupancy of the slot from earlier ones, so
    /// stale reader events cannot touch a reused slot.
    pub generation: u64,
    pub nickname: String,
    pub in_room: bool,
    pub room_id: Option<i32>,
    pub in_game: bool,
    pub color: Stone,
    pub opponent: Option<usize>,
}

impl ClientSlot {
    pub fn new(
        writer: OwnedWriteHalf,
        reader_task: JoinHandle<()>,
        addr: SocketAddr,
        generation: u64,
    ) -> Self {
        Self {
            writer,
            reader_task,
            addr,
            generation,
            nickname: String::new(),
            in_room: false,
            room_id: None,
            in_game: false,
            color: Stone::Empty,
            opponent: None,
        }
    }

    /// Reset all room and game membership (back to the lobby).
    pub fn leave_game(&mut self) {
        self.in_room = false;
        self.room_id = None;
        self.in_game = false;
        self.color = Stone::Empty;
        self.opponent = None;
    }
}

/// One active room: a host, at most one guest, and its game state.
///
/// Created on `RoomCreate`, destroyed at game end, on leave, or when
/// either occupant disconnects.
pub struct Room {
    pub room_id: i32,
    pub name: String,
    pub host: usize,
    pub guest: Option<usize>,
    pub in_game: bool,
    pub board: Board,
    pub current_turn: Stone,
    pub move_count: u32,
}

impl Room {
    pub fn new(room_id: i32, name: String, host: usize) -> Self {
        Self {
            room_id,
            name,
            host,
            guest: None,
            in_game: false,
            board: Board::new(),
            current_turn: Stone::Black,
            move_count: 0,
        }
    }

    /// The other occupant, if `client` is in this room.
    pub fn opponent_of(&self, client: usize) -> Option<usize> {
        if self.host == client {
            self.guest
        } else if self.guest == Some(client) {
            Some(self.host)
        } else {
            None
        }
    }

    pub fn contains(&self, client: usize) -> bool {
        self.host == client || self.guest == Some(client)
    }
}

/// All relay-server state, owned by the event loop.
pub struct ServerState {
    pub clients: [Option<ClientSlot>; MAX_CLIENTS],
    pub rooms: [Option<Room>; MAX_ROOMS],
    next_room_id: i32,
    next_generation: u64,
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            clients: std::array::from_fn(|_| None),
            rooms: std::array::from_fn(|_| None),
            next_room_id: 1,
            next_generation: 0,
        }
    }

    /// Monotonically increasing room ids.
    pub fn next_room_id(&mut self) -> i32 {
        let id = self.next_room_id;
        self.next_room_id += 1;
        id
    }

    /// Generation stamp for a newly accepted client.
    pub fn next_generation(&mut self) -> u64 {
        let gen = self.next_generation;
        self.next_generation += 1;
        gen
    }

    /// First free client slot, if any.
    pub fn free_client_slot(&self) -> Option<usize> {
        self.clients.iter().position(Option::is_none)
    }

    /// First free room slot, if any.
    pub fn free_room_slot(&self) -> Option<usize> {
        self.rooms.iter().position(Option::is_none)
    }

    /// Index of the active room with the given id.
    pub fn find_room(&self, room_id: i32) -> Option<usize> {
        self.rooms
            .iter()
            .position(|room| room.as_ref().is_some_and(|r| r.room_id == room_id))
    }

    /// Index of the room containing the given client, if any.
    pub fn find_client_room(&self, client: usize) -> Option<usize> {
        self.rooms
            .iter()
            .position(|room| room.as_ref().is_some_and(|r| r.contains(client)))
    }

    /// Room-list rows for a `RoomListResp`.
    pub fn room_infos(&self) -> Vec<RoomInfo> {
        self.rooms
            .iter()
            .flatten()
            .map(|room| RoomInfo {
                room_id: room.room_id,
                name: room.name.clone(),
                host_name: self.clients[room.host]
                    .as_ref()
                    .map(|c| c.nickname.clone())
                    .unwrap_or_default(),
                player_count: if room.guest.is_some() { 2 } else { 1 },
                in_game: room.in_game,
            })
            .collect()
    }

    /// (connected clients, clients in rooms, active rooms) for the
    /// status log line.
    pub fn status(&self) -> (usize, usize, usize) {
        let connected = self.clients.iter().flatten().count();
        let in_room = self.clients.iter().flatten().filter(|c| c.in_room).count();
        let active_rooms = self.rooms.iter().flatten().count();
        (connected, in_room, active_rooms)
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}
