//! Integration tests for the client transport and screens
//!
//! These tests run the real socket code against an in-process WebSocket server
//! that plays the part of the game server.

use client::game::GameScene;
use client::input::FrameInput;
use client::lobby::{Lobby, LobbyTransition};
use client::network::{run_socket, Connection, NetworkEvent};
use futures::{SinkExt, StreamExt};
use shared::protocol::{
    self, ClientEvent, Detonation, LobbySnapshot, PlayerRef, PlayerSnapshot, ServerEvent,
};
use shared::Board;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

const WAIT: Duration = Duration::from_secs(5);

/// MOCK SERVER HELPERS
mod mock {
    use super::*;

    pub async fn listen() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let url = format!("ws://{}", listener.local_addr().unwrap());
        (listener, url)
    }

    pub async fn accept(listener: &TcpListener) -> WebSocketStream<TcpStream> {
        let (stream, _) = listener.accept().await.expect("No client connected");
        accept_async(stream).await.expect("Handshake failed")
    }

    pub async fn send(ws: &mut WebSocketStream<TcpStream>, event: &ServerEvent) {
        let text = protocol::encode(event).unwrap();
        ws.send(Message::text(text)).await.unwrap();
    }

    /// Next client event, skipping control frames.
    pub async fn recv(ws: &mut WebSocketStream<TcpStream>) -> ClientEvent {
        loop {
            let frame = timeout(WAIT, ws.next())
                .await
                .expect("Timed out waiting for client")
                .expect("Client hung up")
                .expect("Bad frame");

            if let Message::Text(text) = frame {
                return protocol::decode(text.as_str()).expect("Client sent malformed event");
            }
        }
    }
}

async fn next_event(inbound: &mut mpsc::UnboundedReceiver<NetworkEvent>) -> NetworkEvent {
    timeout(WAIT, inbound.recv())
        .await
        .expect("Timed out waiting for server")
        .expect("Inbound channel closed")
}

async fn next_message(inbound: &mut mpsc::UnboundedReceiver<NetworkEvent>) -> ServerEvent {
    loop {
        match next_event(inbound).await {
            NetworkEvent::Message(event) => return event,
            NetworkEvent::Connected => continue,
            NetworkEvent::Disconnected { reason } => panic!("Disconnected: {}", reason),
        }
    }
}

/// TRANSPORT TESTS
mod transport_tests {
    use super::*;

    /// Events queued before the handshake are delivered once it completes
    #[tokio::test]
    async fn queued_events_flush_after_connect() {
        let (listener, url) = mock::listen().await;

        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, mut in_rx) = mpsc::unbounded_channel();

        let (_lobby, join) = Lobby::enter("sala1");
        out_tx.send(join.clone()).unwrap();

        let client = tokio::spawn(async move { run_socket(&url, out_rx, in_tx).await });

        let mut ws = mock::accept(&listener).await;
        assert_eq!(mock::recv(&mut ws).await, join);
        assert_eq!(next_event(&mut in_rx).await, NetworkEvent::Connected);

        drop(out_tx);
        assert!(timeout(WAIT, client).await.unwrap().unwrap().is_ok());
    }

    /// A close frame from the server surfaces its reason exactly once
    #[tokio::test]
    async fn server_close_reports_reason() {
        let (listener, url) = mock::listen().await;

        let (_out_tx, out_rx) = mpsc::unbounded_channel::<ClientEvent>();
        let (in_tx, mut in_rx) = mpsc::unbounded_channel();
        let client = tokio::spawn(async move { run_socket(&url, out_rx, in_tx).await });

        let mut ws = mock::accept(&listener).await;
        ws.close(Some(CloseFrame {
            code: CloseCode::Normal,
            reason: "room closed".into(),
        }))
        .await
        .unwrap();

        assert_eq!(next_event(&mut in_rx).await, NetworkEvent::Connected);
        assert_eq!(
            next_event(&mut in_rx).await,
            NetworkEvent::Disconnected {
                reason: "room closed".to_string()
            }
        );

        assert!(timeout(WAIT, client).await.unwrap().unwrap().is_ok());
        assert!(in_rx.recv().await.is_none());
    }

    /// Frames that are not valid events are skipped without dropping the socket
    #[tokio::test]
    async fn malformed_frames_are_skipped() {
        let (listener, url) = mock::listen().await;

        let (_out_tx, out_rx) = mpsc::unbounded_channel::<ClientEvent>();
        let (in_tx, mut in_rx) = mpsc::unbounded_channel();
        tokio::spawn(async move { run_socket(&url, out_rx, in_tx).await });

        let mut ws = mock::accept(&listener).await;
        ws.send(Message::text("not json")).await.unwrap();
        ws.send(Message::text(r#"{"event":"chat","data":"hola"}"#))
            .await
            .unwrap();
        ws.send(Message::binary(vec![1u8, 2, 3])).await.unwrap();
        mock::send(&mut ws, &ServerEvent::RoomsList(vec!["sala1".to_string()])).await;

        assert_eq!(
            next_message(&mut in_rx).await,
            ServerEvent::RoomsList(vec!["sala1".to_string()])
        );
    }

    /// Dropping the sender closes the socket politely
    #[tokio::test]
    async fn dropping_sender_closes_socket() {
        let (listener, url) = mock::listen().await;

        let (out_tx, out_rx) = mpsc::unbounded_channel::<ClientEvent>();
        let (in_tx, mut in_rx) = mpsc::unbounded_channel();
        tokio::spawn(async move { run_socket(&url, out_rx, in_tx).await });

        let mut ws = mock::accept(&listener).await;
        assert_eq!(next_event(&mut in_rx).await, NetworkEvent::Connected);

        drop(out_tx);

        match timeout(WAIT, ws.next()).await.unwrap() {
            Some(Ok(Message::Close(_))) | None => {}
            other => panic!("Expected close, got {:?}", other),
        }
        assert_eq!(
            next_event(&mut in_rx).await,
            NetworkEvent::Disconnected {
                reason: "client closed".to_string()
            }
        );
    }

    /// The threaded connection used by the render loop
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn threaded_connection_round_trip() {
        let (listener, url) = mock::listen().await;

        let mut connection = Connection::open(&url).unwrap();
        let (lobby, join) = Lobby::enter("sala2");
        connection.emit(join).unwrap();
        connection.emit(lobby.set_ready()).unwrap();

        let mut ws = mock::accept(&listener).await;
        assert!(matches!(mock::recv(&mut ws).await, ClientEvent::JoinRoom(_)));
        assert!(matches!(mock::recv(&mut ws).await, ClientEvent::SetReady(_)));
        mock::send(&mut ws, &ServerEvent::GameStart).await;

        let mut received = Vec::new();
        for _ in 0..500 {
            received.extend(connection.poll());
            if received.contains(&NetworkEvent::Message(ServerEvent::GameStart)) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(received.first(), Some(&NetworkEvent::Connected));
        assert!(received.contains(&NetworkEvent::Message(ServerEvent::GameStart)));
        assert!(connection.is_connected());
    }
}

/// SCREEN FLOW TESTS
mod flow_tests {
    use super::*;

    /// Lobby updates and game start drive the client into a game scene
    #[tokio::test]
    async fn lobby_to_game_flow() {
        let (listener, url) = mock::listen().await;

        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, mut in_rx) = mpsc::unbounded_channel();
        tokio::spawn(async move { run_socket(&url, out_rx, in_tx).await });

        let mut ws = mock::accept(&listener).await;
        mock::send(
            &mut ws,
            &ServerEvent::Connected(PlayerRef {
                id: "sock-1".to_string(),
            }),
        )
        .await;

        let local_id = match next_message(&mut in_rx).await {
            ServerEvent::Connected(player) => player.id,
            other => panic!("Expected id, got {:?}", other),
        };

        let (mut lobby, join) = Lobby::enter("sala3");
        out_tx.send(join).unwrap();
        match mock::recv(&mut ws).await {
            ClientEvent::JoinRoom(join) => assert_eq!(join.room, "sala3"),
            other => panic!("Expected joinRoom, got {:?}", other),
        }

        let mut snapshot = LobbySnapshot::default();
        snapshot
            .players
            .insert("rival".to_string(), serde_json::Value::Bool(true));
        snapshot
            .characters
            .insert("rival".to_string(), "bomber1".to_string());
        mock::send(&mut ws, &ServerEvent::UpdateLobby(snapshot)).await;

        let update = next_message(&mut in_rx).await;
        assert!(lobby.handle(&update).is_none());
        assert!(lobby.select_character("bomber1").is_none());

        out_tx.send(lobby.select_character("bomber2").unwrap()).unwrap();
        out_tx.send(lobby.set_ready()).unwrap();
        match mock::recv(&mut ws).await {
            ClientEvent::SelectCharacter(choice) => assert_eq!(choice.character, "bomber2"),
            other => panic!("Expected selectCharacter, got {:?}", other),
        }
        assert!(matches!(mock::recv(&mut ws).await, ClientEvent::SetReady(_)));

        mock::send(&mut ws, &ServerEvent::GameStart).await;
        let start = next_message(&mut in_rx).await;
        assert_eq!(
            lobby.handle(&start),
            Some(LobbyTransition::StartGame {
                room: "sala3".to_string()
            })
        );

        let (_scene, announce) = GameScene::new(local_id, Board::default());
        out_tx.send(announce).unwrap();
        match mock::recv(&mut ws).await {
            ClientEvent::NewPlayer(position) => {
                assert_eq!(position.id, "sock-1");
                assert_eq!((position.x, position.y), (1.5, 1.5));
            }
            other => panic!("Expected newPlayer, got {:?}", other),
        }
    }

    /// Server pushes reconcile the scene and its reactions reach the server
    #[tokio::test]
    async fn explosion_damage_round_trip() {
        let (listener, url) = mock::listen().await;

        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, mut in_rx) = mpsc::unbounded_channel();
        tokio::spawn(async move { run_socket(&url, out_rx, in_tx).await });

        let mut ws = mock::accept(&listener).await;
        let (mut scene, _) = GameScene::new("me", Board::default());

        let mut players = BTreeMap::new();
        players.insert(
            "rival".to_string(),
            PlayerSnapshot {
                x: 3.5,
                y: 1.5,
                health: Some(100),
            },
        );
        mock::send(&mut ws, &ServerEvent::Players(players)).await;
        mock::send(
            &mut ws,
            &ServerEvent::BombExploded(Detonation {
                tile_x: 2,
                tile_y: 1,
                players_hit: vec!["me".to_string(), "rival".to_string()],
            }),
        )
        .await;

        let mut now = 1.0;
        for _ in 0..2 {
            let event = next_message(&mut in_rx).await;
            for reply in scene.handle(&event, now) {
                out_tx.send(reply).unwrap();
            }
            now += 0.01;
        }

        assert_eq!(scene.remote_count(), 1);
        assert_eq!(scene.board().get(2, 2), Some(shared::Tile::Empty));
        assert_eq!(scene.health(), 75);

        match mock::recv(&mut ws).await {
            ClientEvent::UpdateHealth(report) => {
                assert_eq!(report.id, "me");
                assert_eq!(report.health, 75);
            }
            other => panic!("Expected updateHealth, got {:?}", other),
        }

        // Movement during the damage flash is held back, then reported.
        let right = FrameInput {
            right: true,
            ..FrameInput::default()
        };
        assert!(scene.update(&right, now, 1.0 / 60.0).is_empty());
        for event in scene.update(&FrameInput::default(), now + 0.5, 1.0 / 60.0) {
            out_tx.send(event).unwrap();
        }
        match mock::recv(&mut ws).await {
            ClientEvent::Move(position) => assert!(position.x > 1.5),
            other => panic!("Expected move, got {:?}", other),
        }
    }
}
