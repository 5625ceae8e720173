use crate::app_state::{LinkCommand, LinkEvent};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

enum SessionEnd {
    /// Socket closed or errored; reconnect after the delay.
    Dropped,
    /// Teardown requested, or the controller went away.
    Shutdown,
}

/// Keeps one socket open to `endpoint`, forwarding inbound text to `events`
/// and outbound commands from `rx`. A dropped or failed connection is retried
/// after `reconnect_delay`, forever, until `shutdown` is cancelled.
pub async fn run(
    endpoint: Url,
    reconnect_delay: Duration,
    mut rx: mpsc::Receiver<LinkCommand>,
    events: mpsc::Sender<LinkEvent>,
    shutdown: CancellationToken,
) {
    loop {
        debug!(%endpoint, "connecting");
        let connected = tokio::select! {
            _ = shutdown.cancelled() => return,
            result = tokio_tungstenite::connect_async(endpoint.as_str()) => result,
        };

        match connected {
            Ok((socket, _)) => {
                let stale = discard_queued(&mut rx);
                if stale > 0 {
                    debug!(stale, "discarded commands queued while disconnected");
                }
                info!(%endpoint, "connected");
                if events.send(LinkEvent::Connected).await.is_err() {
                    return;
                }

                if let SessionEnd::Shutdown = serve(socket, &mut rx, &events, &shutdown).await {
                    return;
                }
                if events.send(LinkEvent::Disconnected).await.is_err() {
                    return;
                }
            }
            Err(e) => debug!(error = %e, "connect failed"),
        }

        warn!(
            delay_ms = reconnect_delay.as_millis() as u64,
            "connection dropped, attempting to reconnect"
        );
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = tokio::time::sleep(reconnect_delay) => {}
        }
    }
}

async fn serve(
    socket: Socket,
    rx: &mut mpsc::Receiver<LinkCommand>,
    events: &mpsc::Sender<LinkEvent>,
    shutdown: &CancellationToken,
) -> SessionEnd {
    let (mut write, mut read) = socket.split();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                let _ = write.send(Message::Close(None)).await;
                return SessionEnd::Shutdown;
            }
            cmd = rx.recv() => {
                let Some(LinkCommand::Send(cmd)) = cmd else {
                    let _ = write.send(Message::Close(None)).await;
                    return SessionEnd::Shutdown;
                };
                let text = cmd.encode();
                debug!(%text, "sending");
                if let Err(e) = write.send(Message::Text(text.into())).await {
                    debug!(error = %e, "send failed");
                    return SessionEnd::Dropped;
                }
            }
            incoming = read.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if events.send(LinkEvent::Message(text.as_str().to_owned())).await.is_err() {
                            return SessionEnd::Shutdown;
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        debug!(?frame, "endpoint closed the connection");
                        return SessionEnd::Dropped;
                    }
                    Some(Ok(Message::Binary(bytes))) => {
                        debug!(len = bytes.len(), "ignoring binary message");
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(error = %e, "read failed");
                        return SessionEnd::Dropped;
                    }
                    None => return SessionEnd::Dropped,
                }
            }
        }
    }
}

/// Commands have no meaning across a reconnect gap.
fn discard_queued(rx: &mut mpsc::Receiver<LinkCommand>) -> usize {
    let mut n = 0;
    while rx.try_recv().is_ok() {
        n += 1;
    }
    n
}
