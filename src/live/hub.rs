use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 64;

/// Events fanned out to viewers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterEvent {
    /// Something in the roster changed; re-fetch it
    RosterChanged,
}

/// Registry of connected viewers.
///
/// Owned by whoever starts the live server and handed to the broadcaster;
/// cloning shares the same set of viewers.
#[derive(Debug, Clone)]
pub struct ConnectionHub {
    tx: broadcast::Sender<RosterEvent>,
}

impl Default for ConnectionHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ConnectionHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Register a new viewer. No snapshot is pushed; the viewer fetches state itself.
    pub fn subscribe(&self) -> Viewer {
        Viewer { rx: self.tx.subscribe() }
    }

    /// Tell every connected viewer the roster changed.
    ///
    /// Returns how many viewers were connected at send time.
    pub fn notify(&self) -> usize {
        // Err only means nobody is listening
        self.tx.send(RosterEvent::RosterChanged).unwrap_or(0)
    }

    pub fn viewer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// One subscribed viewer. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Viewer {
    rx: broadcast::Receiver<RosterEvent>,
}

impl Viewer {
    /// Wait for the next change.
    ///
    /// A viewer that fell behind gets a single event for everything it missed.
    /// Returns `None` once the hub is gone.
    pub async fn changed(&mut self) -> Option<RosterEvent> {
        match self.rx.recv().await {
            Ok(event) => Some(event),
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                log::debug!("Viewer lagged by {} notifications, coalescing", missed);
                self.rx = self.rx.resubscribe();
                Some(RosterEvent::RosterChanged)
            }
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }

    /// Non-blocking check for a pending change
    pub fn try_changed(&mut self) -> Option<RosterEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(broadcast::error::TryRecvError::Lagged(_)) => {
                self.rx = self.rx.resubscribe();
                Some(RosterEvent::RosterChanged)
            }
            Err(_) => None,
        }
    }
}
