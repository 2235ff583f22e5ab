// Small clients of the live channel used by the `toggle` and `watch` commands

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::live::protocol::{encode_line, parse_event};
use crate::live::{ChangeNotice, ServerEvent, ToggleIntent};

const NOTICE_TIMEOUT: Duration = Duration::from_secs(2);

/// Send one toggle intent and hang up. No reply is expected.
pub async fn send_intent(addr: &str, intent: &ToggleIntent) -> Result<()> {
    send_line(addr, intent).await
}

/// Tell a running server that the roster was edited. Gives up after a short timeout.
pub async fn send_change_notice(addr: &str, notice: &ChangeNotice) -> Result<()> {
    tokio::time::timeout(NOTICE_TIMEOUT, send_line(addr, notice))
        .await
        .with_context(|| format!("Timed out notifying live server at {}", addr))?
}

async fn send_line<T: Serialize>(addr: &str, message: &T) -> Result<()> {
    let mut stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("Failed to connect to live server at {}", addr))?;

    let line = encode_line(message)?;
    stream.write_all(line.as_bytes()).await
        .context("Failed to send message to live server")?;
    stream.shutdown().await
        .context("Failed to close live connection")?;
    Ok(())
}

/// Subscribe and call `on_event` for each notification.
///
/// An error from `on_event` ends the watch.
/// Stops after `count` events if given, or when the server closes the connection.
/// Returns the number of events seen.
pub async fn watch<F>(addr: &str, count: Option<usize>, mut on_event: F) -> Result<usize>
where
    F: FnMut(ServerEvent) -> Result<()>,
{
    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("Failed to connect to live server at {}", addr))?;
    let mut lines = BufReader::new(stream).lines();
    let mut seen = 0;

    while count.map_or(true, |limit| seen < limit) {
        let Some(line) = lines.next_line().await.context("Failed to read from live server")? else {
            break;
        };
        match parse_event(&line) {
            Ok(event) => {
                seen += 1;
                on_event(event)?;
            }
            Err(e) => log::warn!("Ignoring unexpected message from server: {}", e),
        }
    }

    Ok(seen)
}
