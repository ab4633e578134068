//! End-to-end connection scenarios over in-memory duplex streams, driving
//! the real byte protocol from a simulated client.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use mcje_proto::codec::{read_string, write_string, ProtoDecode, ProtoEncode};
use mcje_proto::frame::{self, ProtocolConfig};
use mcje_proto::types::{Uuid, VarInt};
use mcje_proto::ProtocolState;
use tokio::io::{AsyncReadExt, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::oneshot;

use super::{Connection, EntityTranslation, EntityVelocityUpdate, PlayerInfoToAdd, PlayerToSpawn};
use crate::config::ConnectionConfig;
use crate::handlers::*;

type ClientReader = ReadHalf<tokio::io::DuplexStream>;
type ClientWriter = WriteHalf<tokio::io::DuplexStream>;

fn frame_bytes(id: i32, body: &[u8]) -> Vec<u8> {
    frame::write_frame(id, body).to_vec()
}

fn handshake_frame(protocol: i32, next_state: i32) -> Vec<u8> {
    let mut body = BytesMut::new();
    VarInt(protocol).proto_encode(&mut body);
    write_string(&mut body, "localhost");
    body.put_u16(25565);
    VarInt(next_state).proto_encode(&mut body);
    frame_bytes(0x00, &body)
}

fn login_start_frame(username: &str) -> Vec<u8> {
    let mut body = BytesMut::new();
    write_string(&mut body, username);
    frame_bytes(0x00, &body)
}

async fn read_client_frame(reader: &mut ClientReader) -> (i32, Bytes) {
    let mut scoped = frame::read_frame(reader, &ProtocolConfig::default())
        .await
        .expect("client failed to read a frame");
    let id = VarInt::proto_decode(&mut scoped).unwrap().0;
    (id, scoped)
}

struct TestClient {
    reader: ClientReader,
    writer: ClientWriter,
    connection: Connection,
    close_rx: oneshot::Receiver<()>,
    close_count: Arc<AtomicUsize>,
}

fn connect(handlers: EventHandlers) -> TestClient {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();

    let (client, server) = tokio::io::duplex(1 << 20);
    let (reader, writer) = tokio::io::split(client);
    let close_count = Arc::new(AtomicUsize::new(0));
    let (close_tx, close_rx) = oneshot::channel();
    let callback_count = close_count.clone();
    let connection = Connection::open(
        server,
        move || {
            callback_count.fetch_add(1, Ordering::SeqCst);
            let _ = close_tx.send(());
        },
        handlers,
        ConnectionConfig::default(),
    );
    TestClient {
        reader,
        writer,
        connection,
        close_rx,
        close_count,
    }
}

fn status_handlers() -> EventHandlers {
    EventHandlers {
        on_status_request_v1: Some(Box::new(|| StatusResponseV1 {
            prevent_response: false,
            description: "Hello, World!".into(),
            max_players: 20,
            online_players: 3,
        })),
        on_status_request_v2: Some(Box::new(|| StatusResponseV2 {
            prevent_response: false,
            is_client_supported: false,
            version: "1.14-1.15".into(),
            description: "Hello, World!".into(),
            max_players: 20,
            online_players: 3,
        })),
        on_status_request_v3: Some(Box::new(|| StatusResponseV3 {
            prevent_response: false,
            is_client_supported: true,
            version: "1.14-1.15".into(),
            description: "Hello, World!".into(),
            favicon_png: None,
            max_players: 20,
            online_players: 3,
            player_sample: vec!["line one".into(), "line two".into()],
        })),
        ..Default::default()
    }
}

fn join_handlers(uuid: Uuid) -> (EventHandlers, Arc<AtomicUsize>) {
    let join_count = Arc::new(AtomicUsize::new(0));
    let counter = join_count.clone();
    let handlers = EventHandlers {
        on_player_join_request: Some(Box::new(move |_request| PlayerJoinResponse {
            prevent_response: false,
            uuid,
        })),
        on_player_join: Some(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })),
        ..Default::default()
    };
    (handlers, join_count)
}

/// Drive a client through handshake and login, consuming the whole burst.
/// Returns the chunk coordinates seen, in arrival order.
async fn login_burst(client: &mut TestClient, protocol: i32) -> Vec<(i32, i32)> {
    client
        .writer
        .write_all(&handshake_frame(protocol, 2))
        .await
        .unwrap();
    client
        .writer
        .write_all(&login_start_frame("alice"))
        .await
        .unwrap();

    let (id, _) = read_client_frame(&mut client.reader).await;
    assert_eq!(id, 0x02, "LoginSuccess");
    for _ in 0..3 {
        read_client_frame(&mut client.reader).await;
    }

    let mut chunks = Vec::new();
    for _ in 0..49 {
        let (_, mut body) = read_client_frame(&mut client.reader).await;
        let x = body.get_i32();
        let z = body.get_i32();
        chunks.push((x, z));
    }
    chunks
}

// S1: modern status. Handshake, StatusRequest, Ping; the connection
// stays open and answers again.
#[tokio::test]
async fn modern_status_flow() {
    let mut client = connect(status_handlers());

    client
        .writer
        .write_all(&handshake_frame(578, 1))
        .await
        .unwrap();
    client
        .writer
        .write_all(&frame_bytes(0x00, &[]))
        .await
        .unwrap();
    client
        .writer
        .write_all(&frame_bytes(0x01, &0xDEADBEEFi64.to_be_bytes()))
        .await
        .unwrap();

    let (id, mut body) = read_client_frame(&mut client.reader).await;
    assert_eq!(id, 0x00, "StatusResponse");
    let json: serde_json::Value =
        serde_json::from_str(&read_string(&mut body).unwrap()).unwrap();
    assert_eq!(json["version"]["name"], "1.14-1.15");
    assert_eq!(json["version"]["protocol"], 578, "supported client echoed");
    assert_eq!(json["players"]["max"], 20);
    assert_eq!(json["players"]["online"], 3);
    assert_eq!(json["description"]["text"], "Hello, World!");

    let (id, mut body) = read_client_frame(&mut client.reader).await;
    assert_eq!(id, 0x01, "Pong");
    assert_eq!(body.get_i64(), 0xDEADBEEF);

    // Still open: a second ping answers too.
    client
        .writer
        .write_all(&frame_bytes(0x01, &7i64.to_be_bytes()))
        .await
        .unwrap();
    let (id, mut body) = read_client_frame(&mut client.reader).await;
    assert_eq!(id, 0x01);
    assert_eq!(body.get_i64(), 7);
    assert_eq!(client.close_count.load(Ordering::SeqCst), 0);
}

// S2: login to play. The full clientbound burst in order, join callback
// exactly once after the last chunk, context in Play.
#[tokio::test]
async fn login_to_play() {
    let uuid = Uuid::new(0x0123456789ABCDEF, 0x0FEDCBA987654321);
    let (handlers, join_count) = join_handlers(uuid);
    let mut client = connect(handlers);

    client
        .writer
        .write_all(&handshake_frame(578, 2))
        .await
        .unwrap();
    client
        .writer
        .write_all(&login_start_frame("alice"))
        .await
        .unwrap();

    let (id, mut body) = read_client_frame(&mut client.reader).await;
    assert_eq!(id, 0x02, "LoginSuccess");
    assert_eq!(read_string(&mut body).unwrap(), uuid.to_string());
    assert_eq!(read_string(&mut body).unwrap(), "alice");

    let (id, body) = read_client_frame(&mut client.reader).await;
    assert_eq!(id, 0x26, "JoinGame at the 1.15 id");
    assert_eq!(&body[0..4], &0i32.to_be_bytes(), "entity id 0");
    assert_eq!(body[4], 1, "creative");

    let (id, body) = read_client_frame(&mut client.reader).await;
    assert_eq!(id, 0x4E, "CompassPosition");
    assert_eq!(&body[..], &64u64.to_be_bytes(), "packed (0, 64, 0)");

    let (id, body) = read_client_frame(&mut client.reader).await;
    assert_eq!(id, 0x36, "PlayerPositionAndLook");
    assert_eq!(&body[8..16], &64f64.to_be_bytes(), "y = 64");

    let mut seen = std::collections::HashSet::new();
    for i in 0..49 {
        let (id, mut body) = read_client_frame(&mut client.reader).await;
        assert_eq!(id, 0x22, "ChunkData {i}");
        let x = body.get_i32();
        let z = body.get_i32();
        assert!((-3..=3).contains(&x) && (-3..=3).contains(&z));
        assert_eq!(body.get_u8(), 1, "full chunk");
        assert_eq!(body.get_u8(), 0b1110, "sections 1..3 present");
        seen.insert((x, z));
    }
    assert_eq!(seen.len(), 49, "every chunk of the 7x7 grid exactly once");

    assert_eq!(join_count.load(Ordering::SeqCst), 1, "join fired once");
    let ctx = client.connection.context();
    assert_eq!(ctx.state, ProtocolState::Play);
    assert_eq!(ctx.protocol, 578);
    assert_eq!(client.close_count.load(Ordering::SeqCst), 0);
}

// The same login against a 1.14 client lands on the 1.14 id table.
#[tokio::test]
async fn login_uses_the_1_14_table_for_old_clients() {
    let (handlers, _) = join_handlers(Uuid::new(1, 2));
    let mut client = connect(handlers);

    client
        .writer
        .write_all(&handshake_frame(498, 2))
        .await
        .unwrap();
    client
        .writer
        .write_all(&login_start_frame("bob"))
        .await
        .unwrap();

    let (id, _) = read_client_frame(&mut client.reader).await;
    assert_eq!(id, 0x02);
    let (id, _) = read_client_frame(&mut client.reader).await;
    assert_eq!(id, 0x25, "JoinGame at the 1.14 id");
    let (id, _) = read_client_frame(&mut client.reader).await;
    assert_eq!(id, 0x4D, "CompassPosition at the 1.14 id");
}

// A login from a version with no Play id table still consults the join
// handler and sends LoginSuccess; the JoinGame emission then fails as an
// internal error and the connection closes instead of idling in Login.
#[tokio::test]
async fn login_from_unknown_era_closes_after_login_success() {
    let request_count = Arc::new(AtomicUsize::new(0));
    let join_count = Arc::new(AtomicUsize::new(0));
    let requests = request_count.clone();
    let joins = join_count.clone();
    let handlers = EventHandlers {
        on_player_join_request: Some(Box::new(move |_request| {
            requests.fetch_add(1, Ordering::SeqCst);
            PlayerJoinResponse {
                prevent_response: false,
                uuid: Uuid::new(1, 2),
            }
        })),
        on_player_join: Some(Box::new(move || {
            joins.fetch_add(1, Ordering::SeqCst);
        })),
        ..Default::default()
    };
    let mut client = connect(handlers);

    client
        .writer
        .write_all(&handshake_frame(300, 2))
        .await
        .unwrap();
    client
        .writer
        .write_all(&login_start_frame("carol"))
        .await
        .unwrap();

    let (id, _) = read_client_frame(&mut client.reader).await;
    assert_eq!(id, 0x02, "LoginSuccess is version-independent");

    client.close_rx.await.unwrap();
    assert_eq!(request_count.load(Ordering::SeqCst), 1, "handler consulted");
    assert_eq!(join_count.load(Ordering::SeqCst), 0, "join never completed");
    assert_eq!(client.close_count.load(Ordering::SeqCst), 1);
}

// S3: keep-alive cadence. One KeepAlive per 20-second interval once the
// connection is in Play, stamped with the unix second.
#[tokio::test(start_paused = true)]
async fn keep_alive_cadence() {
    let (handlers, _) = join_handlers(Uuid::new(1, 2));
    let mut client = connect(handlers);
    login_burst(&mut client, 578).await;

    tokio::time::advance(Duration::from_secs(20)).await;
    let (id, mut body) = read_client_frame(&mut client.reader).await;
    assert_eq!(id, 0x21, "KeepAlive");
    let payload = body.get_i64();
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;
    assert!((payload - now).abs() < 300, "payload is the unix second");

    // Exactly one per interval: nothing more until the next tick.
    let extra = tokio::time::timeout(
        Duration::from_millis(10),
        read_client_frame(&mut client.reader),
    )
    .await;
    assert!(extra.is_err(), "no keep-alive before the next interval");

    tokio::time::advance(Duration::from_secs(20)).await;
    let (id, _) = read_client_frame(&mut client.reader).await;
    assert_eq!(id, 0x21);
}

// Keep-alive stays silent outside the Play state.
#[tokio::test(start_paused = true)]
async fn keep_alive_only_in_play() {
    let mut client = connect(status_handlers());
    client
        .writer
        .write_all(&handshake_frame(578, 1))
        .await
        .unwrap();
    tokio::time::advance(Duration::from_secs(61)).await;
    let extra = tokio::time::timeout(
        Duration::from_millis(10),
        read_client_frame(&mut client.reader),
    )
    .await;
    assert!(extra.is_err());
}

// S4: a bare 0xFE yields the very-legacy kick string and then a close.
#[tokio::test(start_paused = true)]
async fn very_legacy_ping() {
    let mut client = connect(status_handlers());
    client.writer.write_all(&[0xFE]).await.unwrap();

    let mut response = Vec::new();
    client.reader.read_to_end(&mut response).await.unwrap();
    assert_eq!(response[0], 0xFF);
    let units: Vec<u16> = response[3..]
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    assert_eq!(String::from_utf16(&units).unwrap(), "Hello, World!§3§20");

    client.close_rx.await.unwrap();
    assert_eq!(client.close_count.load(Ordering::SeqCst), 1);
}

// The pre-Netty 0xFE 0x01 form gets the NUL-separated reply.
#[tokio::test(start_paused = true)]
async fn pre_netty_ping() {
    let mut client = connect(status_handlers());
    client.writer.write_all(&[0xFE, 0x01]).await.unwrap();

    let mut response = Vec::new();
    client.reader.read_to_end(&mut response).await.unwrap();
    assert_eq!(response[0], 0xFF);
    let units: Vec<u16> = response[3..]
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    let text = String::from_utf16(&units).unwrap();
    let fields: Vec<&str> = text.split('\0').collect();
    assert_eq!(
        fields,
        ["§1", "0", "1.14-1.15", "Hello, World!", "3", "20"],
        "unsupported client gets protocol 0"
    );
}

// S5: an oversized length VarInt closes the connection and fires the
// close callback exactly once.
#[tokio::test]
async fn oversized_frame_closes() {
    let mut client = connect(status_handlers());
    let mut length = BytesMut::new();
    VarInt(1 << 25).proto_encode(&mut length);
    client.writer.write_all(&length).await.unwrap();

    client.close_rx.await.unwrap();
    assert_eq!(client.close_count.load(Ordering::SeqCst), 1);

    let mut rest = Vec::new();
    client.reader.read_to_end(&mut rest).await.unwrap();
    assert!(rest.is_empty(), "nothing was emitted");
    assert!(client.connection.is_closed());
}

// S6: the three movement variants fold into three PlayerMove events with
// the right flag combinations.
#[tokio::test]
async fn movement_fold() {
    let uuid = Uuid::new(1, 2);
    let moves: Arc<Mutex<Vec<PlayerMove>>> = Arc::new(Mutex::new(Vec::new()));
    let recorded = moves.clone();
    let (mut handlers, _) = join_handlers(uuid);
    handlers.on_player_move = Some(Box::new(move |event| {
        recorded.lock().unwrap().push(event);
    }));
    let mut client = connect(handlers);
    login_burst(&mut client, 578).await;

    let mut pos = BytesMut::new();
    pos.put_f64(1.0);
    pos.put_f64(64.0);
    pos.put_f64(0.0);
    pos.put_u8(1);
    client.writer.write_all(&frame_bytes(0x11, &pos)).await.unwrap();

    let mut look = BytesMut::new();
    look.put_f32(90.0);
    look.put_f32(0.0);
    look.put_u8(1);
    client.writer.write_all(&frame_bytes(0x13, &look)).await.unwrap();

    let mut both = BytesMut::new();
    both.put_f64(2.0);
    both.put_f64(64.0);
    both.put_f64(0.0);
    both.put_f32(90.0);
    both.put_f32(0.0);
    both.put_u8(1);
    client.writer.write_all(&frame_bytes(0x12, &both)).await.unwrap();

    // End the stream so the receive loop drains and closes.
    drop(client.writer);
    client.close_rx.await.unwrap();

    let moves = moves.lock().unwrap();
    assert_eq!(moves.len(), 3);
    assert!(moves[0].has_pos && !moves[0].has_look);
    assert_eq!((moves[0].x, moves[0].y, moves[0].z), (1.0, 64.0, 0.0));
    assert!(!moves[1].has_pos && moves[1].has_look);
    assert_eq!(moves[1].yaw, 90.0);
    assert_eq!(moves[1].x, 0.0, "absent fields stay zero");
    assert!(moves[2].has_pos && moves[2].has_look);
    assert_eq!(moves[2].x, 2.0);
}

// Concurrent output operations serialise into clean, parseable frames;
// no frame is ever split by another.
#[tokio::test]
async fn concurrent_writes_do_not_interleave() {
    let (handlers, _) = join_handlers(Uuid::new(1, 2));
    let mut client = connect(handlers);
    login_burst(&mut client, 578).await;

    let conn_a = client.connection.clone();
    let task_a = tokio::spawn(async move {
        for i in 0..20 {
            conn_a
                .add_player_info(vec![PlayerInfoToAdd {
                    uuid: Uuid::new(i, i),
                    username: format!("player{i}"),
                    ping: i as i32,
                }])
                .await
                .unwrap();
        }
    });
    let conn_b = client.connection.clone();
    let task_b = tokio::spawn(async move {
        for i in 0..20 {
            conn_b
                .set_entity_velocity(EntityVelocityUpdate {
                    entity_id: i,
                    x: 0.1,
                    y: 0.0,
                    z: -0.1,
                })
                .await
                .unwrap();
        }
    });

    let mut info_frames = 0;
    let mut velocity_frames = 0;
    for _ in 0..40 {
        let (id, _) = read_client_frame(&mut client.reader).await;
        match id {
            0x34 => info_frames += 1,
            0x46 => velocity_frames += 1,
            other => panic!("unexpected frame id 0x{other:02X}"),
        }
    }
    assert_eq!(info_frames, 20);
    assert_eq!(velocity_frames, 20);
    task_a.await.unwrap();
    task_b.await.unwrap();
}

// Output operations emit on the Play-state id table with the fixed-point
// conversions applied.
#[tokio::test]
async fn output_operations_in_play() {
    let (handlers, _) = join_handlers(Uuid::new(1, 2));
    let mut client = connect(handlers);
    login_burst(&mut client, 578).await;

    client
        .connection
        .spawn_player(PlayerToSpawn {
            entity_id: 11,
            uuid: Uuid::new(5, 6),
            x: 0.5,
            y: 64.0,
            z: 0.5,
            yaw: 90.0,
            pitch: 0.0,
        })
        .await
        .unwrap();
    let (id, mut body) = read_client_frame(&mut client.reader).await;
    assert_eq!(id, 0x05, "SpawnPlayer");
    assert_eq!(body.get_u8(), 11, "entity id");
    assert_eq!(Uuid::proto_decode(&mut body).unwrap(), Uuid::new(5, 6));
    assert_eq!(body.get_f64(), 0.5);
    body.advance(16);
    assert_eq!(body.get_u8(), 64, "yaw 90° is angle 64");

    client
        .connection
        .translate_entity(EntityTranslation {
            entity_id: 11,
            delta_x: 1.0,
            delta_y: 0.0,
            delta_z: -1.0,
            yaw: 90.0,
            pitch: 0.0,
            on_ground: true,
        })
        .await
        .unwrap();
    let (id, mut body) = read_client_frame(&mut client.reader).await;
    assert_eq!(id, 0x2A, "EntityTranslate");
    assert_eq!(body.get_u8(), 11);
    assert_eq!(body.get_i16(), 4096, "1 block east");
    assert_eq!(body.get_i16(), 0);
    assert_eq!(body.get_i16(), -4096);
}

// The application can push a status response while the connection sits in
// the Status state.
#[tokio::test]
async fn push_status_from_the_application() {
    let mut client = connect(EventHandlers::default());
    client
        .writer
        .write_all(&handshake_frame(578, 1))
        .await
        .unwrap();
    // A ping round-trip guarantees the handshake has been processed.
    client
        .writer
        .write_all(&frame_bytes(0x01, &1i64.to_be_bytes()))
        .await
        .unwrap();
    let (id, _) = read_client_frame(&mut client.reader).await;
    assert_eq!(id, 0x01);

    client
        .connection
        .send_status(StatusResponseV3 {
            prevent_response: false,
            is_client_supported: true,
            version: "1.15.2".into(),
            description: "pushed".into(),
            favicon_png: None,
            max_players: 10,
            online_players: 1,
            player_sample: vec![],
        })
        .await
        .unwrap();
    let (id, mut body) = read_client_frame(&mut client.reader).await;
    assert_eq!(id, 0x00);
    let json: serde_json::Value =
        serde_json::from_str(&read_string(&mut body).unwrap()).unwrap();
    assert_eq!(json["description"]["text"], "pushed");
    assert_eq!(json["version"]["protocol"], 578);
}

// A handler panic is isolated: logged as internal and only this
// connection closes.
#[tokio::test]
async fn handler_panic_closes_connection() {
    let handlers = EventHandlers {
        on_status_request_v3: Some(Box::new(|| panic!("boom"))),
        ..Default::default()
    };
    let mut client = connect(handlers);
    client
        .writer
        .write_all(&handshake_frame(578, 1))
        .await
        .unwrap();
    client
        .writer
        .write_all(&frame_bytes(0x00, &[]))
        .await
        .unwrap();

    client.close_rx.await.unwrap();
    assert_eq!(client.close_count.load(Ordering::SeqCst), 1);
}

// A missing handler behaves like prevent_response: the request is
// silently dropped and the stream stays open.
#[tokio::test]
async fn absent_handler_is_silent() {
    let mut client = connect(EventHandlers::default());
    client
        .writer
        .write_all(&handshake_frame(578, 1))
        .await
        .unwrap();
    client
        .writer
        .write_all(&frame_bytes(0x00, &[]))
        .await
        .unwrap();
    // A ping still answers even though the status request was dropped.
    client
        .writer
        .write_all(&frame_bytes(0x01, &1i64.to_be_bytes()))
        .await
        .unwrap();
    let (id, _) = read_client_frame(&mut client.reader).await;
    assert_eq!(id, 0x01, "Pong");
}

// Unknown packet ids are logged and skipped, not fatal.
#[tokio::test]
async fn unknown_id_keeps_the_stream_alive() {
    let mut client = connect(status_handlers());
    client
        .writer
        .write_all(&handshake_frame(578, 1))
        .await
        .unwrap();
    client
        .writer
        .write_all(&frame_bytes(0x55, &[1, 2, 3]))
        .await
        .unwrap();
    client
        .writer
        .write_all(&frame_bytes(0x01, &5i64.to_be_bytes()))
        .await
        .unwrap();
    let (id, mut body) = read_client_frame(&mut client.reader).await;
    assert_eq!(id, 0x01);
    assert_eq!(body.get_i64(), 5);
    assert_eq!(client.close_count.load(Ordering::SeqCst), 0);
}
