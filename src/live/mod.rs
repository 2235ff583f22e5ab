//! Live flag board: toggles flags durably and tells every connected viewer
//! to re-fetch the roster.
//!
//! Notifications never carry the new value. The stored flags are the only
//! source of truth and a `roster-changed` event is a cache-invalidation
//! signal, so duplicated, coalesced or reordered notifications all converge
//! on the same state after the viewer re-reads the roster.

pub mod error;
pub mod hub;
pub mod store;
pub mod broadcaster;
pub mod protocol;
pub mod server;
pub mod client;

pub use error::LiveError;
pub use hub::{ConnectionHub, RosterEvent, Viewer};
pub use store::{RosterStore, SqliteRosterStore};
pub use broadcaster::{LiveFlagBroadcaster, ToggleOutcome};
pub use protocol::{ChangeNotice, ClientMessage, ServerEvent, ToggleIntent};
pub use server::LiveServer;
