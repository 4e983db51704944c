/// WebSocket server for live table views
use actix::prelude::*;
use actix_web_actors::ws;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::content::ContentTable;
use crate::messages::{ClientMessage, ServerMessage};

/// How often heartbeat pings are sent
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
/// How long before lack of client response causes a timeout
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// What to do with the result of a client request
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// Send to the requesting client only
    Reply(ServerMessage),
    /// Send to every subscriber of the table
    Broadcast { table_name: String, message: ServerMessage },
}

/// Shared state for all WebSocket connections.
///
/// Tables are stored as `Arc` snapshots. A query clones the `Arc` and
/// computes without holding the lock; an edit copies the table on write if a
/// query still holds the old snapshot, so a computation never observes a
/// table changing under it.
#[derive(Default)]
pub struct AppState {
    pub tables: Arc<Mutex<HashMap<String, Arc<ContentTable>>>>,
    pub subscribers: Arc<Mutex<HashMap<String, Vec<Addr<TableWebSocket>>>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.csv` file in `dir` as a table named by its file stem.
    /// Files that fail to parse are skipped with a warning.
    pub fn load_dir(&self, dir: &Path) -> io::Result<usize> {
        let mut loaded = 0;
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let text = fs::read_to_string(&path)?;
            match ContentTable::from_csv(&text) {
                Ok(table) => {
                    log::info!("loaded table '{}' ({} rows) from {}", name, table.len(), path.display());
                    self.insert_table(name, table);
                    loaded += 1;
                }
                Err(e) => log::warn!("skipping {}: {}", path.display(), e),
            }
        }
        Ok(loaded)
    }

    pub fn insert_table(&self, name: &str, table: ContentTable) {
        lock(&self.tables).insert(name.to_string(), Arc::new(table));
    }

    /// Current snapshot of a table
    pub fn snapshot(&self, name: &str) -> Option<Arc<ContentTable>> {
        lock(&self.tables).get(name).cloned()
    }

    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = lock(&self.tables).keys().cloned().collect();
        names.sort();
        names
    }

    /// Subscribe a WebSocket connection to a table
    pub fn subscribe(&self, table_name: &str, addr: Addr<TableWebSocket>) {
        lock(&self.subscribers)
            .entry(table_name.to_string())
            .or_default()
            .push(addr);
    }

    pub fn unsubscribe(&self, table_name: &str, addr: &Addr<TableWebSocket>) {
        if let Some(addrs) = lock(&self.subscribers).get_mut(table_name) {
            addrs.retain(|a| a != addr);
        }
    }

    /// Broadcast a message to all subscribers of a table
    pub fn broadcast(&self, table_name: &str, msg: ServerMessage) {
        let subscribers = lock(&self.subscribers);
        if let Some(addrs) = subscribers.get(table_name) {
            for addr in addrs {
                addr.do_send(BroadcastMessage(msg.clone()));
            }
        }
    }

    /// Handle every request that does not need the connection itself.
    pub fn handle_request(&self, msg: ClientMessage) -> Outcome {
        match msg {
            ClientMessage::Subscribe { table_name } => {
                if self.snapshot(&table_name).is_none() {
                    return Outcome::Reply(ServerMessage::error("Table not found"));
                }
                Outcome::Reply(ServerMessage::Subscribed { table_name })
            }

            ClientMessage::ListTables => Outcome::Reply(ServerMessage::Tables {
                names: self.table_names(),
            }),

            ClientMessage::LoadCsv { table_name, csv } => match ContentTable::from_csv(&csv) {
                Ok(table) => {
                    let columns = table.columns().to_vec();
                    let row_count = table.len();
                    self.insert_table(&table_name, table);
                    log::info!("table '{}' loaded with {} rows", table_name, row_count);
                    Outcome::Broadcast {
                        table_name: table_name.clone(),
                        message: ServerMessage::TableLoaded {
                            table_name,
                            columns,
                            row_count,
                        },
                    }
                }
                Err(e) => Outcome::Reply(ServerMessage::error(format!("Cannot load '{}': {}", table_name, e))),
            },

            ClientMessage::Query { table_name, spec } => {
                let Some(table) = self.snapshot(&table_name) else {
                    return Outcome::Reply(ServerMessage::error("Table not found"));
                };
                let view = spec.apply(&table);
                Outcome::Reply(ServerMessage::view(table_name, table.columns().to_vec(), view))
            }

            ClientMessage::UpdateCell {
                table_name,
                row_index,
                column,
                value,
            } => {
                let mut tables = lock(&self.tables);
                let Some(table) = tables.get_mut(&table_name) else {
                    return Outcome::Reply(ServerMessage::error("Table not found"));
                };
                match Arc::make_mut(table).set_cell(row_index, &column, value.clone()) {
                    Ok(_) => Outcome::Broadcast {
                        table_name: table_name.clone(),
                        message: ServerMessage::CellUpdated {
                            table_name,
                            row_index,
                            column,
                            value,
                        },
                    },
                    Err(e) => Outcome::Reply(ServerMessage::error(e.to_string())),
                }
            }
        }
    }
}

/// Message to broadcast to clients
#[derive(Message)]
#[rtype(result = "()")]
struct BroadcastMessage(ServerMessage);

/// WebSocket connection actor
pub struct TableWebSocket {
    hb: Instant,
    state: actix_web::web::Data<AppState>,
    subscribed_table: Option<String>,
}

impl TableWebSocket {
    pub fn new(state: actix_web::web::Data<AppState>) -> Self {
        Self {
            hb: Instant::now(),
            state,
            subscribed_table: None,
        }
    }

    fn hb(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.hb) > CLIENT_TIMEOUT {
                log::info!("WebSocket client heartbeat failed, disconnecting");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    fn send(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMessage) {
        match serde_json::to_string(msg) {
            Ok(text) => ctx.text(text),
            Err(e) => log::error!("failed to serialize server message: {}", e),
        }
    }

    fn handle_client_message(&mut self, msg: ClientMessage, ctx: &mut ws::WebsocketContext<Self>) {
        if let ClientMessage::Subscribe { table_name } = &msg {
            if self.state.snapshot(table_name).is_none() {
                Self::send(ctx, &ServerMessage::error("Table not found"));
                return;
            }
            let addr = ctx.address();
            if let Some(previous) = self.subscribed_table.take() {
                self.state.unsubscribe(&previous, &addr);
            }
            self.state.subscribe(table_name, addr);
            self.subscribed_table = Some(table_name.clone());
        }

        match self.state.handle_request(msg) {
            Outcome::Reply(reply) => Self::send(ctx, &reply),
            Outcome::Broadcast { table_name, message } => {
                let subscribed = self.subscribed_table.as_deref() == Some(table_name.as_str());
                if !subscribed {
                    Self::send(ctx, &message);
                }
                self.state.broadcast(&table_name, message);
            }
        }
    }
}

impl Actor for TableWebSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.hb(ctx);
    }

    fn stopped(&mut self, ctx: &mut Self::Context) {
        if let Some(table_name) = self.subscribed_table.take() {
            self.state.unsubscribe(&table_name, &ctx.address());
        }
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for TableWebSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => self.handle_client_message(client_msg, ctx),
                Err(e) => Self::send(ctx, &ServerMessage::error(format!("Invalid message format: {}", e))),
            },
            Ok(ws::Message::Binary(_)) => {
                log::warn!("unexpected binary message");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            _ => ctx.stop(),
        }
    }
}

impl Handler<BroadcastMessage> for TableWebSocket {
    type Result = ();

    fn handle(&mut self, msg: BroadcastMessage, ctx: &mut Self::Context) {
        Self::send(ctx, &msg.0);
    }
}
