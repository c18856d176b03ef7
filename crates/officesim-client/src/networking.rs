//! Server connection handling.
//!
//! The TCP stream lives on background threads; the Bevy side talks to it
//! through mpsc channels held in [`ConnectionState`]. Wire format is one
//! JSON object per line in both directions. Undecodable lines are logged
//! and skipped — a bad event never takes the connection down. Reconnects
//! use exponential backoff (1s doubling to 30s).

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Mutex;
use std::thread;

use bevy::prelude::*;

use officesim_logic::dispatch::{self, Applied};
use officesim_logic::session::RunOutcome;
use officesim_proto::{ClientEvent, ServerEvent};

use crate::state::{
    ConnectionConfig, ConnectionState, EventLink, LinkUpdate, PromptState, SimState, UiState,
};

/// Spawn the connection thread and hand back its channel pair.
fn spawn_link(server_addr: String) -> EventLink {
    let (tx_out, rx_out) = mpsc::channel::<ClientEvent>();
    let (tx_in, rx_in) = mpsc::channel::<LinkUpdate>();

    thread::spawn(move || run_connection(server_addr, tx_in, rx_out));

    EventLink {
        tx: tx_out,
        rx: Mutex::new(rx_in),
    }
}

/// Connection thread body: connect, then pump events both ways until the
/// stream or a channel dies.
fn run_connection(server_addr: String, tx_in: Sender<LinkUpdate>, rx_out: Receiver<ClientEvent>) {
    let stream = match TcpStream::connect(&server_addr) {
        Ok(s) => s,
        Err(e) => {
            let _ = tx_in.send(LinkUpdate::Closed {
                reason: format!("connect to {server_addr} failed: {e}"),
            });
            return;
        }
    };
    if let Err(e) = stream.set_nodelay(true) {
        warn!("set_nodelay failed: {e}");
    }

    let reader_stream = match stream.try_clone() {
        Ok(s) => s,
        Err(e) => {
            let _ = tx_in.send(LinkUpdate::Closed {
                reason: format!("stream clone failed: {e}"),
            });
            return;
        }
    };

    let _ = tx_in.send(LinkUpdate::Opened);

    let reader_tx = tx_in.clone();
    thread::spawn(move || read_events(reader_stream, reader_tx));

    // Writer loop: ends when the Bevy side drops the link.
    let mut stream = stream;
    for event in rx_out {
        let mut line = match serde_json::to_string(&event) {
            Ok(json) => json,
            Err(e) => {
                error!("failed to encode outbound event: {e}");
                continue;
            }
        };
        line.push('\n');
        if let Err(e) = stream.write_all(line.as_bytes()) {
            let _ = tx_in.send(LinkUpdate::Closed {
                reason: format!("write failed: {e}"),
            });
            return;
        }
    }
}

/// Reader thread body: one JSON event per line until EOF.
fn read_events(stream: TcpStream, tx_in: Sender<LinkUpdate>) {
    let reader = BufReader::new(stream);
    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                let _ = tx_in.send(LinkUpdate::Closed {
                    reason: format!("read failed: {e}"),
                });
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ServerEvent>(&line) {
            Ok(event) => {
                if tx_in.send(LinkUpdate::Event(event)).is_err() {
                    return;
                }
            }
            Err(e) => warn!("discarding undecodable event: {e}"),
        }
    }
    let _ = tx_in.send(LinkUpdate::Closed {
        reason: "server closed the connection".to_string(),
    });
}

/// Establish (or re-establish) the link when disconnected.
pub fn connect_to_server(
    mut conn_state: ResMut<ConnectionState>,
    mut config: ResMut<ConnectionConfig>,
    mut ui: ResMut<UiState>,
    time: Res<Time>,
) {
    match &*conn_state {
        ConnectionState::Disconnected => {
            info!("Connecting to {}", config.server_addr);
            *conn_state = ConnectionState::Connected(spawn_link(config.server_addr.clone()));
        }
        ConnectionState::Reconnecting => {
            config.reconnect_timer -= time.delta_secs();
            if config.reconnect_timer <= 0.0 {
                info!(
                    "Reconnecting to {} (attempt {})",
                    config.server_addr,
                    config.reconnect_attempts + 1
                );
                ui.notice(format!(
                    "Reconnecting (attempt {})...",
                    config.reconnect_attempts + 1
                ));
                *conn_state = ConnectionState::Connected(spawn_link(config.server_addr.clone()));
            }
        }
        ConnectionState::Connected(_) => {}
    }
}

/// Drain the inbound channel and reduce every event into [`SimState`].
/// Each event is applied whole before the next is read.
pub fn drain_events(
    mut conn_state: ResMut<ConnectionState>,
    mut config: ResMut<ConnectionConfig>,
    mut sim: ResMut<SimState>,
    mut ui: ResMut<UiState>,
) {
    let mut drop_reason: Option<String> = None;

    if let ConnectionState::Connected(link) = &*conn_state {
        let rx = match link.rx.lock() {
            Ok(rx) => rx,
            Err(poisoned) => poisoned.into_inner(),
        };
        loop {
            match rx.try_recv() {
                Ok(LinkUpdate::Opened) => {
                    info!("Connected to simulation server");
                    config.reset_backoff();
                    ui.toast("Connected to server", Color::srgb(0.3, 1.0, 0.4), 4.0);
                }
                Ok(LinkUpdate::Event(event)) => {
                    let state = &mut *sim;
                    let applied = dispatch::apply(&mut state.registry, &mut state.session, event);
                    report(applied, &mut sim, &mut ui);
                }
                Ok(LinkUpdate::Closed { reason }) => {
                    drop_reason = Some(reason);
                    break;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    drop_reason = Some("connection thread exited".to_string());
                    break;
                }
            }
        }
    }

    if let Some(reason) = drop_reason {
        warn!("Connection lost: {reason}");
        ui.toast(
            format!("Connection lost: {reason}"),
            Color::srgb(1.0, 0.4, 0.3),
            6.0,
        );
        config.advance_backoff();
        *conn_state = ConnectionState::Reconnecting;
    }
}

/// Map one reduction result to its user-visible effects.
fn report(applied: Applied, sim: &mut SimState, ui: &mut UiState) {
    match applied {
        Applied::AgentCreated { agent_id } => {
            if let Some(agent) = sim.registry.get(&agent_id) {
                info!("Agent joined: {} ({})", agent.display_name, agent.role);
            }
        }
        Applied::AgentUpdated { .. } => {}
        Applied::AgentRejected { agent_id, reason } => {
            warn!("Rejected update for {agent_id}: {reason}");
        }
        Applied::AgentRemoved { agent_id, existed } => {
            if existed {
                info!("Agent left: {agent_id}");
            }
        }
        Applied::EventDiscarded { reason } => {
            warn!("Discarded event: {reason}");
        }
        Applied::RunCompleted { success, output } => {
            let color = if success {
                Color::srgb(0.3, 1.0, 0.4)
            } else {
                Color::srgb(1.0, 0.7, 0.3)
            };
            ui.toast(
                RunOutcome::Completed { success, output }.summary(),
                color,
                10.0,
            );
            ui.prompt = None;
        }
        Applied::RunErrored { message } => {
            error!("Simulation error: {message}");
            ui.toast(
                RunOutcome::Errored { message }.summary(),
                Color::srgb(1.0, 0.4, 0.3),
                10.0,
            );
            ui.prompt = None;
        }
        Applied::StatusNote { status, message } => {
            let text = match message {
                Some(m) => format!("Server: {status} — {m}"),
                None => format!("Server: {status}"),
            };
            info!("{text}");
            ui.notice(text);
        }
        Applied::UserInputRequested { task_id, question } => {
            info!("User input requested for task {task_id}");
            if ui.prompt.is_none() {
                ui.prompt = Some(PromptState {
                    task_id,
                    question,
                    input: String::new(),
                });
            }
        }
    }
}

/// Surface the next queued input request once the current prompt closes.
pub fn open_next_prompt(sim: Res<SimState>, mut ui: ResMut<UiState>) {
    if ui.prompt.is_some() || !sim.session.is_active() {
        return;
    }
    if let Some((task_id, question)) = sim.session.next_request() {
        ui.prompt = Some(PromptState {
            task_id: task_id.to_string(),
            question: question.to_string(),
            input: String::new(),
        });
    }
}

/// Push one event to the server, if connected. Failures surface as a
/// toast; the closed link is then torn down by `drain_events`.
pub fn send_event(conn_state: &ConnectionState, ui: &mut UiState, event: ClientEvent) -> bool {
    match conn_state {
        ConnectionState::Connected(link) => {
            if link.tx.send(event).is_err() {
                ui.toast(
                    "Not connected — event not sent",
                    Color::srgb(1.0, 0.4, 0.3),
                    5.0,
                );
                false
            } else {
                true
            }
        }
        _ => {
            ui.toast(
                "Not connected — event not sent",
                Color::srgb(1.0, 0.4, 0.3),
                5.0,
            );
            false
        }
    }
}
