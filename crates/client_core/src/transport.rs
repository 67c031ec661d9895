//! WebSocket transport task. Reads are forwarded as [`TransportEvent`]s into
//! the engine queue; writes are drained from an unbounded frame queue.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::TransportError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Frame(String),
    Errored(String),
    Closed,
}

/// Spawns the connection task and returns the outbound frame queue. Dropping
/// every sender of that queue closes the socket.
pub fn spawn<E>(
    endpoint: Url,
    connect_timeout: Duration,
    events: mpsc::UnboundedSender<E>,
) -> mpsc::UnboundedSender<String>
where
    E: From<TransportEvent> + Send + 'static,
{
    let (writer_tx, writer_rx) = mpsc::unbounded_channel();
    tokio::spawn(run(endpoint, connect_timeout, events, writer_rx));
    writer_tx
}

async fn run<E>(
    endpoint: Url,
    connect_timeout: Duration,
    events: mpsc::UnboundedSender<E>,
    mut writer_rx: mpsc::UnboundedReceiver<String>,
) where
    E: From<TransportEvent> + Send + 'static,
{
    let emit = |event: TransportEvent| {
        let _ = events.send(E::from(event));
    };

    let ws_stream = match tokio::time::timeout(connect_timeout, connect_async(endpoint.as_str()))
        .await
    {
        Ok(Ok((ws_stream, _))) => ws_stream,
        Ok(Err(err)) => {
            let err = TransportError::Connect {
                url: endpoint.to_string(),
                reason: err.to_string(),
            };
            warn!(error = %err, "transport: connect failed");
            emit(TransportEvent::Errored(err.to_string()));
            emit(TransportEvent::Closed);
            return;
        }
        Err(_) => {
            let err = TransportError::ConnectTimeout {
                url: endpoint.to_string(),
                seconds: connect_timeout.as_secs(),
            };
            warn!(error = %err, "transport: connect timed out");
            emit(TransportEvent::Errored(err.to_string()));
            emit(TransportEvent::Closed);
            return;
        }
    };

    info!(url = %endpoint, "transport: websocket connected");
    emit(TransportEvent::Opened);

    let (mut ws_writer, mut ws_reader) = ws_stream.split();
    let writer_task = tokio::spawn(async move {
        while let Some(frame) = writer_rx.recv().await {
            if let Err(err) = ws_writer.send(Message::Text(frame)).await {
                warn!(error = %err, "transport: websocket send failed");
                return;
            }
        }
        debug!("transport: outbound queue closed, closing websocket");
        let _ = ws_writer.close().await;
    });

    while let Some(msg) = ws_reader.next().await {
        match msg {
            Ok(Message::Text(text)) => emit(TransportEvent::Frame(text)),
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                emit(TransportEvent::Errored(format!(
                    "websocket receive failed: {err}"
                )));
                break;
            }
        }
    }

    writer_task.abort();
    emit(TransportEvent::Closed);
}
