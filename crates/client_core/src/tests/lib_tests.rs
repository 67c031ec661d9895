use std::time::Duration;

use super::*;
use axum::{
    extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
    Router,
};
use shared::protocol::{ClientRequest, InboundMessage};
use tokio::net::TcpListener;

const PEER_NAME: &str = "Bob";

async fn ws_handler(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(serve_socket)
}

/// Minimal single-user stand-in for the chat server.
async fn serve_socket(mut socket: WebSocket) {
    let mut name = String::from("127.0.0.1:50000");
    while let Some(Ok(message)) = socket.recv().await {
        let WsMessage::Text(text) = message else {
            continue;
        };
        let reply = match serde_json::from_str::<ClientRequest>(&text) {
            Ok(ClientRequest::Rename { new_name }) => {
                name = new_name.clone();
                InboundMessage::Rename { new_name }
            }
            Ok(ClientRequest::Chat { content }) => InboundMessage::Chat {
                from: name.clone(),
                content,
            },
            Ok(ClientRequest::Who) => InboundMessage::UserList {
                users: vec![name.clone(), PEER_NAME.into()],
            },
            Ok(ClientRequest::Private { to, content }) => InboundMessage::Private {
                from: to,
                content,
            },
            Err(_) => continue,
        };
        let Ok(frame) = serde_json::to_string(&reply) else {
            break;
        };
        if socket.send(WsMessage::Text(frame)).await.is_err() {
            break;
        }
    }
}

async fn spawn_chat_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new().route("/ws", get(ws_handler));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("ws://{addr}/ws")
}

fn settings_for(server_url: String) -> ClientSettings {
    ClientSettings {
        server_url,
        connect_timeout_secs: 5,
        ..ClientSettings::default()
    }
}

async fn wait_for(
    events: &mut broadcast::Receiver<ClientEvent>,
    mut matches: impl FnMut(&ClientEvent) -> bool,
) -> ClientEvent {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match events.recv().await {
                Ok(event) if matches(&event) => return event,
                Ok(_) => continue,
                Err(err) => panic!("event stream ended: {err}"),
            }
        }
    })
    .await
    .expect("timed out waiting for client event")
}

#[tokio::test]
async fn public_chat_round_trip_marks_own_messages() {
    let server_url = spawn_chat_server().await;
    let (client, mut events) = ChatClient::connect(&settings_for(server_url)).expect("connect");

    wait_for(&mut events, |e| *e == ClientEvent::IdentityRequested).await;
    client.set_identity("Alice").expect("identity");
    wait_for(&mut events, |e| {
        *e == ClientEvent::System("your display name is now Alice".into())
    })
    .await;

    client.send("hi").expect("send");
    let event = wait_for(&mut events, |e| matches!(e, ClientEvent::Chat { .. })).await;
    assert_eq!(
        event,
        ClientEvent::Chat {
            from: "Alice".into(),
            content: "hi".into(),
            is_own: true
        }
    );
}

#[tokio::test]
async fn private_mode_lists_peers_and_sends_direct_messages() {
    let server_url = spawn_chat_server().await;
    let (client, mut events) = ChatClient::connect(&settings_for(server_url)).expect("connect");

    wait_for(&mut events, |e| *e == ClientEvent::IdentityRequested).await;
    client.set_identity("Alice").expect("identity");
    client.enter_private().expect("private");

    let roster = wait_for(&mut events, |e| matches!(e, ClientEvent::PeerList(_))).await;
    assert_eq!(roster, ClientEvent::PeerList(vec![PEER_NAME.into()]));

    client.select_peer(PEER_NAME).expect("select");
    client.send("psst").expect("send");
    let event = wait_for(&mut events, |e| matches!(e, ClientEvent::Chat { .. })).await;
    assert_eq!(
        event,
        ClientEvent::Chat {
            from: PEER_NAME.into(),
            content: "(private) psst".into(),
            is_own: false
        }
    );
}

#[tokio::test]
async fn close_emits_terminal_notice() {
    let server_url = spawn_chat_server().await;
    let (client, mut events) = ChatClient::connect(&settings_for(server_url)).expect("connect");

    wait_for(&mut events, |e| *e == ClientEvent::IdentityRequested).await;
    client.close().expect("close");

    wait_for(&mut events, |e| {
        *e == ClientEvent::System("disconnected from server".into())
    })
    .await;
    wait_for(&mut events, |e| {
        *e == ClientEvent::ConnectionStatus(ConnectionState::Closed)
    })
    .await;
}

#[tokio::test]
async fn refused_connection_reports_error_then_close() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let (_client, mut events) =
        ChatClient::connect(&settings_for(format!("ws://{addr}/ws"))).expect("connect");

    let error = wait_for(&mut events, |e| matches!(e, ClientEvent::System(_))).await;
    assert!(matches!(error, ClientEvent::System(text) if text.starts_with("connection error")));
    wait_for(&mut events, |e| {
        *e == ClientEvent::ConnectionStatus(ConnectionState::Errored)
    })
    .await;
    wait_for(&mut events, |e| {
        *e == ClientEvent::ConnectionStatus(ConnectionState::Closed)
    })
    .await;
}

#[tokio::test]
async fn rejects_non_websocket_urls() {
    let result = ChatClient::connect(&settings_for("http://localhost:8081/ws".into()));
    assert!(matches!(
        result,
        Err(ClientError::Transport(TransportError::InvalidEndpoint { .. }))
    ));
}
