use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use uuid::Uuid;

use crate::live::protocol::{encode_line, parse_message};
use crate::live::{LiveFlagBroadcaster, RosterStore, ServerEvent};

/// TCP front of the live channel. Every accepted socket is one viewer.
pub struct LiveServer<S: RosterStore> {
    listener: TcpListener,
    broadcaster: Arc<LiveFlagBroadcaster<S>>,
}

impl<S: RosterStore> LiveServer<S> {
    pub async fn bind(addr: &str, broadcaster: Arc<LiveFlagBroadcaster<S>>) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, broadcaster })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept viewers until `shutdown` resolves
    pub async fn run_until<F>(self, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        log::info!("Live channel listening on {}", self.local_addr()?);

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let broadcaster = Arc::clone(&self.broadcaster);
                            tokio::spawn(handle_connection(stream, peer, broadcaster));
                        }
                        Err(e) => log::warn!("Failed to accept connection: {}", e),
                    }
                }
                _ = &mut shutdown => {
                    log::info!("Live channel shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}

async fn handle_connection<S: RosterStore>(
    stream: TcpStream,
    peer: SocketAddr,
    broadcaster: Arc<LiveFlagBroadcaster<S>>,
) {
    let id = Uuid::new_v4();
    let mut viewer = broadcaster.hub().subscribe();
    log::info!("Viewer {} connected from {}", id, peer);

    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        match parse_message(&line) {
                            Ok(message) => {
                                log::debug!("Viewer {} sent {}", id, message.event_name());
                                // Handled in line so one connection has at most one
                                // message in flight. The sender gets no reply.
                                broadcaster.handle_message(message).await;
                            }
                            Err(e) => log::warn!("Viewer {} sent a malformed message: {}", id, e),
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        log::warn!("Viewer {} read error: {}", id, e);
                        break;
                    }
                }
            }
            event = viewer.changed() => {
                let Some(event) = event else { break };
                let line = match encode_line(&ServerEvent::from(event)) {
                    Ok(line) => line,
                    Err(e) => {
                        log::error!("Failed to encode notification: {}", e);
                        continue;
                    }
                };
                if let Err(e) = write_half.write_all(line.as_bytes()).await {
                    log::debug!("Viewer {} write failed: {}", id, e);
                    break;
                }
            }
        }
    }

    log::info!("Viewer {} disconnected", id);
}

/// Resolves on Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        log::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                log::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                log::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
