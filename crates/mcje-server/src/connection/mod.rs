//! Per-connection state machine.
//!
//! Each connection runs three cooperative tasks over one byte stream:
//! a receive task that parses serverbound packets and owns the
//! authoritative [`ClientContext`], a keep-alive task ticking while the
//! connection is in Play, and a writer task that emits pre-framed packets
//! one at a time so frames never interleave.

mod login;
mod movement;
mod outbound;
mod status;
#[cfg(test)]
mod tests;

pub use outbound::{EntityTranslation, EntityVelocityUpdate, PlayerInfoToAdd, PlayerToSpawn};

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use mcje_proto::dispatch::{emit_clientbound, parse_serverbound};
use mcje_proto::error::{ErrorKind, ProtoError};
use mcje_proto::frame::ProtocolConfig;
use mcje_proto::packets::{ClientboundPacket, KeepAlive, ServerboundPacket};
use mcje_proto::{ClientContext, ProtocolState};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, warn};

use crate::config::ConnectionConfig;
use crate::handlers::EventHandlers;

/// Outbound frames queued per connection before the writer backpressures.
const FRAME_QUEUE_DEPTH: usize = 64;

type CloseCallback = Box<dyn FnOnce() + Send>;

/// State shared between the three tasks and the [`Connection`] handle.
struct Shared {
    ctx_tx: watch::Sender<ClientContext>,
    closed_tx: watch::Sender<bool>,
    close_callback: Mutex<Option<CloseCallback>>,
}

impl Shared {
    /// Invoke the close callback exactly once and flip the closed flag;
    /// every task observes it at its next loop boundary.
    fn close(&self) {
        let callback = self
            .close_callback
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(callback) = callback {
            callback();
        }
        self.ctx_tx.send_modify(|ctx| ctx.closed = true);
        let _ = self.closed_tx.send(true);
    }
}

/// Handle to one client connection.
///
/// Cheap to clone. Dropping every handle does not close the connection;
/// that happens on stream end, a malformed frame, or a write failure.
#[derive(Clone)]
pub struct Connection {
    ctx_rx: watch::Receiver<ClientContext>,
    frame_tx: mpsc::Sender<Bytes>,
}

impl Connection {
    /// Take ownership of a byte stream and drive the protocol over it.
    /// `close_callback` fires exactly once when the connection dies.
    pub fn open<S, F>(
        stream: S,
        close_callback: F,
        handlers: EventHandlers,
        config: ConnectionConfig,
    ) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + Sync + 'static,
        F: FnOnce() + Send + 'static,
    {
        let (reader, writer) = tokio::io::split(stream);
        let (ctx_tx, ctx_rx) = watch::channel(ClientContext::INITIAL);
        let (closed_tx, closed_rx) = watch::channel(false);
        let (frame_tx, frame_rx) = mpsc::channel::<Bytes>(FRAME_QUEUE_DEPTH);

        let shared = Arc::new(Shared {
            ctx_tx,
            closed_tx,
            close_callback: Mutex::new(Some(Box::new(close_callback))),
        });

        tokio::spawn(write_loop(writer, frame_rx, closed_rx.clone(), shared.clone()));
        tokio::spawn(keep_alive_loop(
            ctx_rx.clone(),
            closed_rx,
            frame_tx.clone(),
            config.clone(),
        ));

        let driver = Driver {
            reader,
            handlers,
            proto: config.protocol(),
            config,
            frame_tx: frame_tx.clone(),
            shared,
            ctx: ClientContext::INITIAL,
        };
        tokio::spawn(driver.run());

        Self { ctx_rx, frame_tx }
    }

    /// Snapshot of the connection's protocol context.
    pub fn context(&self) -> ClientContext {
        *self.ctx_rx.borrow()
    }

    pub fn is_closed(&self) -> bool {
        self.context().closed
    }

    pub(crate) async fn send(&self, packet: ClientboundPacket) -> Result<(), ProtoError> {
        let ctx = self.context();
        send_packet(&ctx, &packet, &self.frame_tx).await
    }
}

/// Emit a packet for the given context and queue the frame.
async fn send_packet(
    ctx: &ClientContext,
    packet: &ClientboundPacket,
    frame_tx: &mpsc::Sender<Bytes>,
) -> Result<(), ProtoError> {
    let frame = emit_clientbound(packet, ctx)?;
    frame_tx
        .send(frame.freeze())
        .await
        .map_err(|_| writer_gone())
}

fn writer_gone() -> ProtoError {
    std::io::Error::new(std::io::ErrorKind::BrokenPipe, "connection writer is gone").into()
}

/// Run an application callback, isolating panics to this connection.
fn guard<T>(f: impl FnOnce() -> T) -> Result<T, ProtoError> {
    std::panic::catch_unwind(AssertUnwindSafe(f)).map_err(|_| ProtoError::HandlerPanic)
}

/// Seconds since the Unix epoch, the keep-alive payload.
fn unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// The receive task: parses serverbound packets and owns the context.
struct Driver<R> {
    reader: R,
    handlers: EventHandlers,
    config: ConnectionConfig,
    proto: ProtocolConfig,
    frame_tx: mpsc::Sender<Bytes>,
    shared: Arc<Shared>,
    ctx: ClientContext,
}

impl<R: AsyncRead + Unpin + Send> Driver<R> {
    async fn run(mut self) {
        loop {
            if *self.shared.closed_tx.borrow() {
                break;
            }

            let packet = match parse_serverbound(
                &mut self.reader,
                &mut self.ctx,
                &self.proto,
                self.config.legacy_probe(),
            )
            .await
            {
                Ok(packet) => packet,
                Err(e) if e.is_eof() => {
                    debug!("stream ended");
                    self.shared.close();
                    break;
                }
                Err(e) => match e.kind() {
                    ErrorKind::Unsupported => {
                        warn!("unsupported payload from client: {e}");
                        continue;
                    }
                    ErrorKind::Malformed => {
                        warn!("malformed packet from client, closing connection: {e}");
                        self.shared.close();
                        break;
                    }
                    ErrorKind::Internal => {
                        error!("internal protocol error: {e}");
                        self.shared.close();
                        break;
                    }
                },
            };

            if let Err(e) = self.handle_packet(packet).await {
                match e.kind() {
                    ErrorKind::Unsupported => warn!("dropped response: {e}"),
                    ErrorKind::Malformed => {
                        warn!("connection failed while responding: {e}");
                        self.shared.close();
                        break;
                    }
                    ErrorKind::Internal => {
                        error!("handler failure: {e}");
                        self.shared.close();
                        break;
                    }
                }
            }

            self.publish_ctx();
            if self.ctx.closed {
                self.shared.close();
                break;
            }
        }
    }

    async fn handle_packet(&mut self, packet: ServerboundPacket) -> Result<(), ProtoError> {
        match packet {
            ServerboundPacket::ProtocolDetermined(data) => {
                self.ctx.state = data.next_state;
                Ok(())
            }
            ServerboundPacket::Handshake(handshake) => {
                debug!(
                    "handshake: protocol {} next state {:?}",
                    handshake.protocol, handshake.next_state
                );
                self.ctx.protocol = handshake.protocol;
                self.ctx.state = handshake.next_state;
                Ok(())
            }
            ServerboundPacket::StatusRequest(_) => self.process_status_request().await,
            ServerboundPacket::Ping(ping) => self.process_ping(ping).await,
            ServerboundPacket::LoginStart(data) => self.process_login_start(data).await,
            ServerboundPacket::PlayerPos(data) => self.process_move_pos(data),
            ServerboundPacket::PlayerLook(data) => self.process_move_look(data),
            ServerboundPacket::PlayerPosAndLook(data) => self.process_move_all(data),
            ServerboundPacket::LegacyStatusRequest(_) => self.process_legacy_status().await,
            ServerboundPacket::VeryLegacyStatusRequest(_) => {
                self.process_very_legacy_status().await
            }
        }
    }

    async fn send(&self, packet: ClientboundPacket) -> Result<(), ProtoError> {
        send_packet(&self.ctx, &packet, &self.frame_tx).await
    }

    fn publish_ctx(&self) {
        self.shared.ctx_tx.send_modify(|ctx| {
            let closed = ctx.closed;
            *ctx = self.ctx;
            ctx.closed = closed || self.ctx.closed;
        });
    }
}

/// The writer task: one whole frame per write, flushed before the next,
/// so concurrent senders serialise into a clean byte stream.
async fn write_loop<W: AsyncWrite + Unpin>(
    mut writer: W,
    mut frame_rx: mpsc::Receiver<Bytes>,
    mut closed_rx: watch::Receiver<bool>,
    shared: Arc<Shared>,
) {
    loop {
        tokio::select! {
            biased;
            frame = frame_rx.recv() => match frame {
                Some(frame) => {
                    if let Err(e) = write_one(&mut writer, &frame).await {
                        warn!("write failed: {e}");
                        shared.close();
                        break;
                    }
                }
                None => break,
            },
            _ = closed_rx.changed() => {
                if *closed_rx.borrow() {
                    // Drain what was queued before the close so terminal
                    // replies (legacy kicks) still reach the peer.
                    while let Ok(frame) = frame_rx.try_recv() {
                        if write_one(&mut writer, &frame).await.is_err() {
                            break;
                        }
                    }
                    break;
                }
            }
        }
    }
}

async fn write_one<W: AsyncWrite + Unpin>(writer: &mut W, frame: &[u8]) -> std::io::Result<()> {
    writer.write_all(frame).await?;
    writer.flush().await
}

/// The keep-alive task: every interval, while the context says Play and
/// the connection is open, queue a KeepAlive stamped with the unix second.
async fn keep_alive_loop(
    ctx_rx: watch::Receiver<ClientContext>,
    mut closed_rx: watch::Receiver<bool>,
    frame_tx: mpsc::Sender<Bytes>,
    config: ConnectionConfig,
) {
    let mut timer = tokio::time::interval(config.keep_alive_interval());
    timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick of a tokio interval completes immediately.
    timer.tick().await;

    loop {
        tokio::select! {
            _ = timer.tick() => {}
            _ = closed_rx.changed() => {
                if *closed_rx.borrow() {
                    break;
                }
                continue;
            }
        }

        let ctx = *ctx_rx.borrow();
        if ctx.closed {
            break;
        }
        if ctx.state != ProtocolState::Play {
            continue;
        }

        let packet = ClientboundPacket::KeepAlive(KeepAlive {
            payload: unix_seconds(),
        });
        if send_packet(&ctx, &packet, &frame_tx).await.is_err() {
            break;
        }
    }
}
