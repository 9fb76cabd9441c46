//! WebSocket client for the game server.
//!
//! Speaks just enough socket.io v4 to exchange game events: the Engine.IO
//! handshake, ping/pong keepalive and `42[...]` event frames. Both platform
//! clients collect [`SyncEvent`]s that the caller polls with `poll_events()`.

use crate::protocol::{self, ClientEvent, Packet, ProtocolError, ServerEvent};
use thiserror::Error;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    /// Socket open, waiting for the namespace connect.
    Connecting,
    Connected,
    Error,
}

/// Events from the WebSocket client
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// Namespace connected; game events may flow.
    Connected,
    Disconnected,
    Event(ServerEvent),
    Error { message: String },
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Already connected")]
    AlreadyConnected,
    #[error("Not connected")]
    NotConnected,
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid WebSocket URL scheme: {0}")]
    InvalidScheme(String),
    #[error("Failed to create WebSocket: {0}")]
    Create(String),
    #[error("Send failed: {0}")]
    Send(String),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// What to do with one received frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameAction {
    /// Frame to write back immediately.
    pub reply: Option<&'static str>,
    pub event: Option<SyncEvent>,
}

/// Decide how to react to a text frame from the server.
///
/// Malformed frames and unknown events are logged and dropped.
pub fn route_frame(frame: &str) -> FrameAction {
    match protocol::decode_frame(frame) {
        Ok(Packet::Open(handshake)) => {
            log::debug!("Engine.IO open: {}", handshake);
            FrameAction { reply: Some(protocol::CONNECT_FRAME), event: None }
        }
        Ok(Packet::Ping) => FrameAction { reply: Some(protocol::PONG_FRAME), event: None },
        Ok(Packet::Connected) => FrameAction { reply: None, event: Some(SyncEvent::Connected) },
        Ok(Packet::Close) | Ok(Packet::Disconnected) => {
            FrameAction { reply: None, event: Some(SyncEvent::Disconnected) }
        }
        Ok(Packet::ConnectError(message)) => {
            log::error!("Socket.IO connect error: {}", message);
            FrameAction { reply: None, event: Some(SyncEvent::Error { message }) }
        }
        Ok(Packet::Event(event)) => FrameAction { reply: None, event: Some(SyncEvent::Event(event)) },
        Ok(Packet::Pong) | Ok(Packet::Ignored) => FrameAction::default(),
        Err(e) => {
            log::warn!("Dropping frame {}: {}", preview(frame), e);
            FrameAction::default()
        }
    }
}

fn preview(frame: &str) -> &str {
    match frame.char_indices().nth(100) {
        Some((cut, _)) => &frame[..cut],
        None => frame,
    }
}

fn track_state(state: &mut ConnectionState, event: &SyncEvent) {
    match event {
        SyncEvent::Connected => *state = ConnectionState::Connected,
        SyncEvent::Disconnected => *state = ConnectionState::Disconnected,
        SyncEvent::Error { .. } => *state = ConnectionState::Error,
        SyncEvent::Event(_) => {}
    }
}

// ============================================================================
// WASM WebSocket Client
// ============================================================================

#[cfg(target_arch = "wasm32")]
mod wasm_client {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{CloseEvent, ErrorEvent, MessageEvent, WebSocket};

    /// WebSocket client for WASM.
    ///
    /// Events are collected and must be polled via `poll_events()`.
    pub struct WasmWebSocket {
        ws: Option<WebSocket>,
        state: ConnectionState,
        events: Rc<RefCell<Vec<SyncEvent>>>,
        // Store closures to prevent them from being dropped
        _on_message: Option<Closure<dyn Fn(MessageEvent)>>,
        _on_close: Option<Closure<dyn Fn(CloseEvent)>>,
        _on_error: Option<Closure<dyn Fn(ErrorEvent)>>,
    }

    impl WasmWebSocket {
        pub fn new() -> Self {
            Self {
                ws: None,
                state: ConnectionState::Disconnected,
                events: Rc::new(RefCell::new(Vec::new())),
                _on_message: None,
                _on_close: None,
                _on_error: None,
            }
        }

        pub fn connect(&mut self, url: &str) -> Result<(), SyncError> {
            if self.ws.is_some() {
                return Err(SyncError::AlreadyConnected);
            }

            let ws = WebSocket::new(url).map_err(|e| SyncError::Create(format!("{:?}", e)))?;
            ws.set_binary_type(web_sys::BinaryType::Arraybuffer);

            self.state = ConnectionState::Connecting;
            let events = self.events.clone();

            // onmessage
            let events_msg = events.clone();
            let ws_reply = ws.clone();
            let on_message = Closure::wrap(Box::new(move |e: MessageEvent| {
                let Ok(txt) = e.data().dyn_into::<js_sys::JsString>() else {
                    return;
                };
                let frame: String = txt.into();
                let action = route_frame(&frame);
                if let Some(reply) = action.reply {
                    if let Err(err) = ws_reply.send_with_str(reply) {
                        log::error!("WebSocket reply failed: {:?}", err);
                    }
                }
                if let Some(event) = action.event {
                    events_msg.borrow_mut().push(event);
                }
            }) as Box<dyn Fn(MessageEvent)>);
            ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

            // onclose
            let events_close = events.clone();
            let on_close = Closure::wrap(Box::new(move |_e: CloseEvent| {
                events_close.borrow_mut().push(SyncEvent::Disconnected);
            }) as Box<dyn Fn(CloseEvent)>);
            ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));

            // onerror
            let events_err = events;
            let on_error = Closure::wrap(Box::new(move |_e: ErrorEvent| {
                events_err.borrow_mut().push(SyncEvent::Error {
                    message: "WebSocket error".to_string(),
                });
            }) as Box<dyn Fn(ErrorEvent)>);
            ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));

            self.ws = Some(ws);
            self._on_message = Some(on_message);
            self._on_close = Some(on_close);
            self._on_error = Some(on_error);

            Ok(())
        }

        pub fn disconnect(&mut self) {
            if let Some(ws) = self.ws.take() {
                let _ = ws.close();
            }
            self.state = ConnectionState::Disconnected;
            self._on_message = None;
            self._on_close = None;
            self._on_error = None;
        }

        /// Send a game event.
        pub fn send_event(&self, event: &ClientEvent) -> Result<(), SyncError> {
            let frame = event.encode()?;
            match self.ws {
                Some(ref ws) => ws
                    .send_with_str(&frame)
                    .map_err(|e| SyncError::Send(format!("{:?}", e))),
                None => Err(SyncError::NotConnected),
            }
        }

        /// Poll for pending events (non-blocking).
        pub fn poll_events(&mut self) -> Vec<SyncEvent> {
            let mut events = self.events.borrow_mut();
            for event in events.iter() {
                track_state(&mut self.state, event);
            }
            std::mem::take(&mut *events)
        }

        pub fn state(&self) -> ConnectionState {
            self.state
        }

        pub fn is_connected(&self) -> bool {
            self.state == ConnectionState::Connected
        }
    }

    impl Default for WasmWebSocket {
        fn default() -> Self {
            Self::new()
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_client::WasmWebSocket;

// ============================================================================
// Native WebSocket Client
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
mod native_client {
    use super::*;
    use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
    use std::thread::{self, JoinHandle};
    use std::time::Duration;
    use tungstenite::{Message, connect};
    use url::Url;

    /// Commands sent to the WebSocket thread.
    enum WsCommand {
        Send(String),
        Close,
    }

    /// WebSocket client for native platforms.
    ///
    /// Uses a background thread for non-blocking operation.
    pub struct NativeWebSocket {
        state: ConnectionState,
        events: Vec<SyncEvent>,
        /// Channel to send commands to the WebSocket thread.
        cmd_tx: Option<Sender<WsCommand>>,
        /// Channel to receive events from the WebSocket thread.
        event_rx: Option<Receiver<SyncEvent>>,
        _thread: Option<JoinHandle<()>>,
    }

    impl NativeWebSocket {
        pub fn new() -> Self {
            Self {
                state: ConnectionState::Disconnected,
                events: Vec::new(),
                cmd_tx: None,
                event_rx: None,
                _thread: None,
            }
        }

        /// Connect to a socket.io endpoint (`ws://host/socket.io/?EIO=4&transport=websocket`).
        pub fn connect(&mut self, url: &str) -> Result<(), SyncError> {
            if self.cmd_tx.is_some() {
                return Err(SyncError::AlreadyConnected);
            }

            let parsed_url = Url::parse(url).map_err(|e| SyncError::InvalidUrl(e.to_string()))?;
            if parsed_url.scheme() != "ws" && parsed_url.scheme() != "wss" {
                return Err(SyncError::InvalidScheme(parsed_url.scheme().to_string()));
            }

            self.state = ConnectionState::Connecting;

            let (cmd_tx, cmd_rx) = channel::<WsCommand>();
            let (event_tx, event_rx) = channel::<SyncEvent>();

            let url = url.to_string();

            let handle = thread::spawn(move || {
                log::info!("WebSocket thread: connecting to {}", url);

                let (mut socket, response) = match connect(&url) {
                    Ok(pair) => pair,
                    Err(e) => {
                        log::error!("WebSocket connection failed: {}", e);
                        let _ = event_tx.send(SyncEvent::Error {
                            message: format!("Connection failed: {}", e),
                        });
                        return;
                    }
                };
                log::info!("WebSocket connected, status: {}", response.status());

                // Short read timeout so the loop can service outgoing commands
                if let tungstenite::stream::MaybeTlsStream::Plain(tcp) = socket.get_mut() {
                    let _ = tcp.set_read_timeout(Some(Duration::from_millis(50)));
                    let _ = tcp.set_write_timeout(Some(Duration::from_secs(5)));
                }

                loop {
                    match cmd_rx.try_recv() {
                        Ok(WsCommand::Send(msg)) => {
                            log::debug!("WebSocket sending: {}", preview(&msg));
                            if let Err(e) = socket.send(Message::Text(msg)) {
                                log::error!("WebSocket send error: {}", e);
                                break;
                            }
                        }
                        Ok(WsCommand::Close) => {
                            log::info!("WebSocket close requested");
                            let _ = socket.close(None);
                            break;
                        }
                        Err(TryRecvError::Disconnected) => {
                            log::info!("WebSocket command channel disconnected");
                            break;
                        }
                        Err(TryRecvError::Empty) => {}
                    }

                    match socket.read() {
                        Ok(Message::Text(txt)) => {
                            log::debug!("WebSocket received: {}", preview(&txt));
                            let action = route_frame(&txt);
                            if let Some(reply) = action.reply {
                                if let Err(e) = socket.send(Message::Text(reply.to_string())) {
                                    log::error!("WebSocket reply error: {}", e);
                                    break;
                                }
                            }
                            if let Some(event) = action.event {
                                let closing = event == SyncEvent::Disconnected;
                                let _ = event_tx.send(event);
                                if closing {
                                    let _ = socket.close(None);
                                    return;
                                }
                            }
                        }
                        Ok(Message::Ping(data)) => {
                            let _ = socket.send(Message::Pong(data));
                        }
                        Ok(Message::Close(_)) => {
                            log::info!("WebSocket received close frame");
                            break;
                        }
                        Ok(_) => {}
                        Err(tungstenite::Error::Io(ref e))
                            if e.kind() == std::io::ErrorKind::WouldBlock
                                || e.kind() == std::io::ErrorKind::TimedOut =>
                        {
                            continue;
                        }
                        Err(e) => {
                            log::error!("WebSocket read error: {}", e);
                            break;
                        }
                    }
                }

                log::info!("WebSocket thread exiting");
                let _ = event_tx.send(SyncEvent::Disconnected);
            });

            self.cmd_tx = Some(cmd_tx);
            self.event_rx = Some(event_rx);
            self._thread = Some(handle);

            Ok(())
        }

        pub fn disconnect(&mut self) {
            if let Some(tx) = self.cmd_tx.take() {
                let _ = tx.send(WsCommand::Close);
            }
            self.event_rx = None;
            self._thread = None;
            self.state = ConnectionState::Disconnected;
        }

        /// Queue a game event for the socket thread.
        pub fn send_event(&self, event: &ClientEvent) -> Result<(), SyncError> {
            let frame = event.encode()?;
            match self.cmd_tx {
                Some(ref tx) => tx
                    .send(WsCommand::Send(frame))
                    .map_err(|e| SyncError::Send(e.to_string())),
                None => Err(SyncError::NotConnected),
            }
        }

        /// Poll for pending events (non-blocking).
        pub fn poll_events(&mut self) -> Vec<SyncEvent> {
            if let Some(ref rx) = self.event_rx {
                while let Ok(event) = rx.try_recv() {
                    track_state(&mut self.state, &event);
                    self.events.push(event);
                }
            }
            std::mem::take(&mut self.events)
        }

        pub fn state(&self) -> ConnectionState {
            self.state
        }

        pub fn is_connected(&self) -> bool {
            self.state == ConnectionState::Connected
        }
    }

    impl Default for NativeWebSocket {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Drop for NativeWebSocket {
        fn drop(&mut self) {
            self.disconnect();
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native_client::NativeWebSocket;

/// Platform-specific WebSocket client type.
#[cfg(target_arch = "wasm32")]
pub type PlatformWebSocket = WasmWebSocket;

#[cfg(not(target_arch = "wasm32"))]
pub type PlatformWebSocket = NativeWebSocket;
