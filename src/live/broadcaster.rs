use std::sync::Arc;

use crate::live::{ChangeNotice, ClientMessage, ConnectionHub, LiveError, RosterStore, ToggleIntent};
use crate::models::ToggleAxis;

/// What happened to a toggle intent. Used for logging and tests only;
/// nothing is reported back to the viewer that sent the intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Flag flipped to `value` and `notified` viewers were signalled
    Applied { value: bool, notified: usize },
    /// No contestant with that stage name
    NotFound,
    /// Intent lacked a valid admin key while keys are required
    Rejected,
    /// Storage failed; nobody was notified
    Failed,
}

/// Flips live flags in durable storage and signals every connected viewer.
pub struct LiveFlagBroadcaster<S: RosterStore> {
    store: Arc<S>,
    hub: ConnectionHub,
    require_key: bool,
}

impl<S: RosterStore> LiveFlagBroadcaster<S> {
    pub fn new(store: Arc<S>, hub: ConnectionHub) -> Self {
        Self { store, hub, require_key: false }
    }

    /// Require an admin key on every intent handled by `handle_intent`
    pub fn with_require_key(mut self, require_key: bool) -> Self {
        self.require_key = require_key;
        self
    }

    pub fn hub(&self) -> &ConnectionHub {
        &self.hub
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Dispatch one message received over the live channel
    pub async fn handle_message(&self, message: ClientMessage) {
        match message {
            ClientMessage::Toggle(intent) => {
                self.handle_intent(intent).await;
            }
            ClientMessage::Changed(notice) => {
                self.relay_change(notice).await;
            }
        }
    }

    /// Tell every viewer about an edit made outside the live channel.
    ///
    /// Returns the number of viewers notified, or `None` if the notice was
    /// dropped for lack of an admin key.
    pub async fn relay_change(&self, notice: ChangeNotice) -> Option<usize> {
        if self.require_key {
            if let Err(e) = self.authorize(notice.key.as_deref()).await {
                log::warn!("roster-changed notice dropped: {}", e);
                return None;
            }
        }
        let notified = self.hub.notify();
        log::info!("Roster edited, {} viewers notified", notified);
        Some(notified)
    }

    /// Handle an intent received over the live channel
    pub async fn handle_intent(&self, intent: ToggleIntent) -> ToggleOutcome {
        if self.require_key {
            if let Err(e) = self.authorize(intent.key.as_deref()).await {
                log::warn!("{} for '{}' dropped: {}", intent.event, intent.stage_name, e);
                return ToggleOutcome::Rejected;
            }
        }
        self.toggle(&intent.stage_name, intent.event).await
    }

    /// Invert one flag of `stage_name` and notify every viewer.
    ///
    /// Errors are logged and swallowed; a failed toggle notifies nobody.
    pub async fn toggle(&self, stage_name: &str, axis: ToggleAxis) -> ToggleOutcome {
        let store = Arc::clone(&self.store);
        let name = stage_name.to_string();
        let result = tokio::task::spawn_blocking(move || store.toggle_flag(&name, axis))
            .await
            .map_err(LiveError::from)
            .and_then(|r| r);

        match result {
            Ok(value) => {
                let notified = self.hub.notify();
                log::info!(
                    "Toggled {} for '{}' to {} ({} viewers notified)",
                    axis, stage_name, value, notified
                );
                ToggleOutcome::Applied { value, notified }
            }
            Err(LiveError::NotFound(name)) => {
                log::error!("Contestant not found for {}: {}", axis, name);
                ToggleOutcome::NotFound
            }
            Err(e) => {
                log::error!("Error toggling {} for '{}': {}", axis, stage_name, e);
                ToggleOutcome::Failed
            }
        }
    }

    async fn authorize(&self, key: Option<&str>) -> Result<(), LiveError> {
        let key = match key.map(str::trim) {
            Some(k) if !k.is_empty() => k.to_string(),
            _ => return Err(LiveError::Unauthorized("access key is required".to_string())),
        };

        let store = Arc::clone(&self.store);
        let access = tokio::task::spawn_blocking(move || store.verify_key(&key)).await??;
        match access {
            Some(access) if access.is_admin() => Ok(()),
            Some(_) => Err(LiveError::Unauthorized("admin access required".to_string())),
            None => Err(LiveError::Unauthorized("invalid access key".to_string())),
        }
    }
}
