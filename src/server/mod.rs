//! Room-based matchmaking and relay server
//!
//! Accepts TCP clients, identifies them by nickname, manages rooms, and
//! relays moves between the two players of each room. The server is the
//! authority on move legality (turn order, bounds, cell occupancy) and
//! on win/draw detection.
//!
//! # Architecture
//!
//! A single event-loop task owns every client slot and room exclusively.
//! Per-connection reader tasks do nothing but decode frames and forward
//! them over an mpsc channel, so all state transitions and all outbound
//! writes happen sequentially on one task. That makes the ordering
//! guarantees structural: a mover's `MoveAck` is written before the
//! peer's `Move` relay, and `GameEnd` follows the final move pair with
//! no interleaving within a room.

pub mod state;

use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::board::{Pos, Stone, TOTAL_CELLS};
use crate::protocol::{
    read_message, write_message, GameResult, Message, MessageType, MAX_CLIENTS,
};
use crate::rules::check_win_at;

use state::{ClientSlot, Room, ServerState};

/// Events forwarded from reader tasks to the event loop.
///
/// The generation stamp ties an event to one specific occupancy of a
/// client slot; events from a connection that has since been torn down
/// are dropped instead of touching the slot's new occupant.
#[derive(Debug)]
enum Event {
    Message {
        slot: usize,
        generation: u64,
        msg: Message,
    },
    Closed {
        slot: usize,
        generation: u64,
    },
}

/// The relay server: the listener plus the state-owning relay core.
pub struct Server {
    listener: TcpListener,
    rx: mpsc::Receiver<Event>,
    relay: Relay,
}

/// All server state and every message handler. The event loop in
/// [`Server::run`] is its only caller, so state transitions and
/// outbound writes are strictly sequential.
struct Relay {
    state: ServerState,
    tx: mpsc::Sender<Event>,
}

impl Server {
    /// Bind the listener with `SO_REUSEADDR` and a modest backlog.
    pub async fn bind(addr: SocketAddr) -> std::io::Result<Self> {
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(MAX_CLIENTS as u32)?;

        let (tx, rx) = mpsc::channel(256);
        Ok(Self {
            listener,
            rx,
            relay: Relay {
                state: ServerState::new(),
                tx,
            },
        })
    }

    /// The bound address (useful when listening on port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the accept/dispatch loop forever.
    pub async fn run(self) -> anyhow::Result<()> {
        let Self {
            listener,
            mut rx,
            mut relay,
        } = self;
        info!(addr = %listener.local_addr()?, "server listening");

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => relay.accept_client(stream, addr),
                        Err(err) => warn!(%err, "accept failed"),
                    }
                }
                event = rx.recv() => {
                    // The relay holds a sender, so the channel never closes.
                    let Some(event) = event else { break };
                    relay.handle_event(event).await;
                }
            }
        }

        Ok(())
    }
}

impl Relay {
    fn accept_client(&mut self, stream: TcpStream, addr: SocketAddr) {
        let Some(slot) = self.state.free_client_slot() else {
            // Capacity exhausted: close immediately, no message.
            info!(%addr, "client slots exhausted, refusing connection");
            drop(stream);
            return;
        };

        let generation = self.state.next_generation();
        let (mut read_half, write_half) = stream.into_split();
        let tx = self.tx.clone();
        let reader_task = tokio::spawn(async move {
            loop {
                match read_message(&mut read_half).await {
                    Ok(msg) => {
                        if tx
                            .send(Event::Message {
                                slot,
                                generation,
                                msg,
                            })
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    Err(err) => {
                        debug!(slot, %err, "connection read ended");
                        let _ = tx.send(Event::Closed { slot, generation }).await;
                        break;
                    }
                }
            }
        });

        self.state.clients[slot] =
            Some(ClientSlot::new(write_half, reader_task, addr, generation));
        info!(slot, %addr, "client connected");
        self.log_status();
    }

    async fn handle_event(&mut self, event: Event) {
        match event {
            Event::Message {
                slot,
                generation,
                msg,
            } => {
                if self.is_current(slot, generation) {
                    self.dispatch(slot, msg).await;
                }
            }
            Event::Closed { slot, generation } => {
                if self.is_current(slot, generation) {
                    self.disconnect(slot).await;
                }
            }
        }
    }

    fn is_current(&self, slot: usize, generation: u64) -> bool {
        self.state.clients[slot]
            .as_ref()
            .is_some_and(|c| c.generation == generation)
    }

    async fn dispatch(&mut self, slot: usize, msg: Message) {
        match msg.kind {
            MessageType::Connect => {
                if let Some(client) = self.state.clients[slot].as_mut() {
                    client.nickname = msg.nickname.clone();
                    info!(slot, nickname = %msg.nickname, "client identified");
                }
                self.send_to(slot, &Message::connect_ack("connected; create or join a room"))
                    .await;
            }
            MessageType::RoomCreate => self.create_room(slot, &msg.nickname).await,
            MessageType::RoomList => self.send_room_list(slot).await,
            MessageType::RoomJoin => self.join_room(slot, msg.x).await,
            MessageType::RoomLeave => self.leave_room(slot).await,
            MessageType::Move => self.handle_move(slot, &msg).await,
            MessageType::Disconnect => self.disconnect(slot).await,
            MessageType::Ping => self.send_to(slot, &Message::pong()).await,
            other => {
                // Server-to-client message kinds arriving from a client
                // are a protocol violation: drop the connection.
                warn!(slot, kind = ?other, "unexpected message kind from client");
                self.disconnect(slot).await;
            }
        }
    }

    async fn create_room(&mut self, slot: usize, room_name: &str) {
        let already_in_room = self.state.clients[slot]
            .as_ref()
            .is_some_and(|c| c.in_room);
        if already_in_room {
            self.send_to(slot, &Message::error("already in a room")).await;
            return;
        }

        let Some(room_slot) = self.state.free_room_slot() else {
            self.send_to(slot, &Message::error("no more rooms can be created"))
                .await;
            return;
        };

        let room_id = self.state.next_room_id();
        self.state.rooms[room_slot] = Some(Room::new(room_id, room_name.to_owned(), slot));
        if let Some(client) = self.state.clients[slot].as_mut() {
            client.in_room = true;
            client.room_id = Some(room_id);
        }

        info!(slot, room_id, name = %room_name, "room created");
        let text = format!("room '{room_name}' created, waiting for an opponent");
        self.send_to(slot, &Message::room_create_ack(room_id, &text))
            .await;
        self.log_status();
    }

    async fn send_room_list(&mut self, slot: usize) {
        let rooms = self.state.room_infos();
        debug!(slot, count = rooms.len(), "room list requested");
        self.send_to(slot, &Message::room_list_resp(rooms)).await;
    }

    async fn join_room(&mut self, slot: usize, room_id: i32) {
        let already_in_room = self.state.clients[slot]
            .as_ref()
            .is_some_and(|c| c.in_room);
        if already_in_room {
            self.send_to(slot, &Message::error("already in a room")).await;
            return;
        }

        let Some(room_idx) = self.state.find_room(room_id) else {
            self.send_to(slot, &Message::room_not_found("no such room"))
                .await;
            return;
        };

        let (guest_taken, in_game, room_name) = {
            let room = self.state.rooms[room_idx].as_ref().expect("room exists");
            (room.guest.is_some(), room.in_game, room.name.clone())
        };
        if guest_taken {
            self.send_to(slot, &Message::room_full("room is full")).await;
            return;
        }
        if in_game {
            self.send_to(slot, &Message::error("game already in progress"))
                .await;
            return;
        }

        if let Some(room) = self.state.rooms[room_idx].as_mut() {
            room.guest = Some(slot);
        }
        if let Some(client) = self.state.clients[slot].as_mut() {
            client.in_room = true;
            client.room_id = Some(room_id);
        }

        info!(slot, room_id, "client joined room");
        let text = format!("joined room '{room_name}'");
        self.send_to(slot, &Message::room_join_ack(room_id, &text))
            .await;

        self.start_game(room_idx).await;
        self.log_status();
    }

    async fn start_game(&mut self, room_idx: usize) {
        let (host, guest, room_id) = {
            let room = self.state.rooms[room_idx].as_mut().expect("room exists");
            room.board = crate::board::Board::new();
            room.current_turn = Stone::Black;
            room.move_count = 0;
            room.in_game = true;
            (room.host, room.guest.expect("guest just joined"), room.room_id)
        };

        let mut host_nick = String::new();
        let mut guest_nick = String::new();
        if let Some(client) = self.state.clients[host].as_mut() {
            client.in_game = true;
            client.color = Stone::Black;
            client.opponent = Some(guest);
            host_nick = client.nickname.clone();
        }
        if let Some(client) = self.state.clients[guest].as_mut() {
            client.in_game = true;
            client.color = Stone::White;
            client.opponent = Some(host);
            guest_nick = client.nickname.clone();
        }

        info!(room_id, host = %host_nick, guest = %guest_nick, "game started");
        self.send_to(host, &Message::game_start(Stone::Black, &guest_nick))
            .await;
        self.send_to(guest, &Message::game_start(Stone::White, &host_nick))
            .await;
    }

    async fn handle_move(&mut self, slot: usize, msg: &Message) {
        // A move from a client with no game in progress is dropped.
        let Some(room_idx) = self.state.find_client_room(slot) else {
            return;
        };
        if !self.state.rooms[room_idx].as_ref().is_some_and(|r| r.in_game) {
            return;
        }

        let (color, opponent) = {
            let client = self.state.clients[slot].as_ref().expect("client exists");
            (client.color, client.opponent)
        };
        let (x, y) = (msg.x, msg.y);

        let current_turn = self.state.rooms[room_idx]
            .as_ref()
            .expect("room exists")
            .current_turn;
        if current_turn != color {
            self.send_to(slot, &Message::error("opponent's turn")).await;
            return;
        }

        if !Pos::is_valid(y, x) {
            self.send_to(slot, &Message::error("bad coord")).await;
            return;
        }
        let pos = Pos::new(y as u8, x as u8);

        let occupied = !self.state.rooms[room_idx]
            .as_ref()
            .expect("room exists")
            .board
            .is_empty(pos);
        if occupied {
            self.send_to(slot, &Message::error("occupied")).await;
            return;
        }

        let (room_id, won, full) = {
            let room = self.state.rooms[room_idx].as_mut().expect("room exists");
            room.board.place_stone(pos, color);
            room.move_count += 1;
            (
                room.room_id,
                check_win_at(&room.board, pos, color),
                room.move_count >= TOTAL_CELLS as u32,
            )
        };
        debug!(room_id, slot, x, y, color = color.code(), "move accepted");

        self.send_to(slot, &Message::move_ack(x, y, color)).await;
        if let Some(opp) = opponent {
            self.send_to(opp, &Message::game_move(x, y, color)).await;
        }

        if won {
            self.end_game(room_idx, GameResult::win_for(color)).await;
        } else if full {
            self.end_game(room_idx, GameResult::Draw).await;
        } else if let Some(room) = self.state.rooms[room_idx].as_mut() {
            room.current_turn = color.opponent();
        }
    }

    async fn end_game(&mut self, room_idx: usize, result: GameResult) {
        let Some(room) = self.state.rooms[room_idx].take() else {
            return;
        };
        info!(room_id = room.room_id, ?result, "game over, room closed");

        let msg = Message::game_end(result);
        for occupant in [Some(room.host), room.guest].into_iter().flatten() {
            if let Some(client) = self.state.clients[occupant].as_mut() {
                client.leave_game();
            }
            self.send_to(occupant, &msg).await;
        }
        self.log_status();
    }

    async fn leave_room(&mut self, slot: usize) {
        let Some(room_idx) = self.state.find_client_room(slot) else {
            return;
        };
        let room = self.state.rooms[room_idx].take().expect("room exists");
        info!(room_id = room.room_id, slot, "client left room");

        if let Some(other) = room.opponent_of(slot) {
            if let Some(client) = self.state.clients[other].as_mut() {
                client.leave_game();
            }
            self.send_to(other, &Message::opponent_left("opponent left the room"))
                .await;
        }
        if let Some(client) = self.state.clients[slot].as_mut() {
            client.leave_game();
        }
        self.log_status();
    }

    async fn disconnect(&mut self, slot: usize) {
        let Some(client) = self.state.clients[slot].take() else {
            return;
        };
        client.reader_task.abort();
        info!(slot, nickname = %client.nickname, "client disconnected");
        // Dropping the slot closes the write half of the socket.
        drop(client);

        if let Some(room_idx) = self.state.find_client_room(slot) {
            let room = self.state.rooms[room_idx].take().expect("room exists");
            info!(room_id = room.room_id, "room destroyed after disconnect");

            if let Some(other) = room.opponent_of(slot) {
                if let Some(survivor) = self.state.clients[other].as_mut() {
                    survivor.leave_game();
                }
                self.send_to(other, &Message::opponent_left("opponent disconnected"))
                    .await;
            }
        }
        self.log_status();
    }

    /// Write one message to a client. Write failures are only logged:
    /// the reader task will observe the dead socket and raise the
    /// disconnect flow.
    async fn send_to(&mut self, slot: usize, msg: &Message) {
        if let Some(client) = self.state.clients[slot].as_mut() {
            if let Err(err) = write_message(&mut client.writer, msg).await {
                debug!(slot, %err, "write failed");
            }
        }
    }

    fn log_status(&self) {
        let (connected, in_room, rooms) = self.state.status();
        info!(connected, in_room, rooms, "status");
    }
}
