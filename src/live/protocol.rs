// Wire format of the live channel: one JSON object per line.
//
//   viewer -> server  {"event":"crossout-main","stage_name":"Akira","key":"..."}
//   viewer -> server  {"event":"roster-changed","key":"..."}
//   server -> viewer  {"event":"roster-changed"}

use serde::{Deserialize, Serialize};

use crate::live::RosterEvent;
use crate::models::ToggleAxis;

/// A request to flip one flag. The event name selects the axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleIntent {
    pub event: ToggleAxis,
    pub stage_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// Announces that the roster was edited outside the live channel.
/// The server relays it to every viewer as a `roster-changed` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeNotice {
    pub event: NoticeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl ChangeNotice {
    pub fn new(key: Option<String>) -> Self {
        Self { event: NoticeKind::RosterChanged, key }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoticeKind {
    RosterChanged,
}

/// Anything a client may send. The event name tells the two apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClientMessage {
    Toggle(ToggleIntent),
    Changed(ChangeNotice),
}

impl ClientMessage {
    /// Wire name of the event, for logging without the key
    pub fn event_name(&self) -> &'static str {
        match self {
            ClientMessage::Toggle(intent) => intent.event.as_str(),
            ClientMessage::Changed(_) => "roster-changed",
        }
    }
}

/// Events the server pushes to viewers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ServerEvent {
    RosterChanged,
}

impl From<RosterEvent> for ServerEvent {
    fn from(event: RosterEvent) -> Self {
        match event {
            RosterEvent::RosterChanged => ServerEvent::RosterChanged,
        }
    }
}

/// Parse one line received from a viewer
pub fn parse_message(line: &str) -> Result<ClientMessage, serde_json::Error> {
    serde_json::from_str(line.trim())
}

/// Parse one line received from the server
pub fn parse_event(line: &str) -> Result<ServerEvent, serde_json::Error> {
    serde_json::from_str(line.trim())
}

/// Encode a message as a newline-terminated JSON line
pub fn encode_line<T: Serialize>(message: &T) -> Result<String, serde_json::Error> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_intent(line: &str) -> Result<ToggleIntent, String> {
        match parse_message(line).map_err(|e| e.to_string())? {
            ClientMessage::Toggle(intent) => Ok(intent),
            other => Err(format!("not a toggle: {:?}", other)),
        }
    }

    #[test]
    fn test_parse_each_event_name() {
        let cases = [
            ("crossout-main", ToggleAxis::CrossoutMain),
            ("glow-main", ToggleAxis::GlowMain),
            ("crossout-prejudge", ToggleAxis::CrossoutPrejudge),
            ("glow-prejudge", ToggleAxis::GlowPrejudge),
        ];
        for (name, axis) in cases {
            let line = format!(r#"{{"event":"{}","stage_name":"Akira"}}"#, name);
            let intent = parse_intent(&line).unwrap();
            assert_eq!(intent.event, axis);
            assert_eq!(intent.stage_name, "Akira");
            assert_eq!(intent.key, None);
        }
    }

    #[test]
    fn test_parse_intent_with_key() {
        let intent = parse_intent(r#" {"event":"glow-main","stage_name":"Rei","key":"k"} "#).unwrap();
        assert_eq!(intent.key.as_deref(), Some("k"));
    }

    #[test]
    fn test_parse_rejects_unknown_event() {
        assert!(parse_intent(r#"{"event":"explode","stage_name":"Akira"}"#).is_err());
        assert!(parse_intent(r#"{"event":"glow-main"}"#).is_err());
        assert!(parse_intent("not json").is_err());
    }

    #[test]
    fn test_roster_changed_line() {
        let line = encode_line(&ServerEvent::RosterChanged).unwrap();
        assert_eq!(line, "{\"event\":\"roster-changed\"}\n");
        assert_eq!(parse_event(&line).unwrap(), ServerEvent::RosterChanged);
    }

    #[test]
    fn test_keyless_intent_omits_key() {
        let intent = ToggleIntent {
            event: ToggleAxis::GlowMain,
            stage_name: "Akira".to_string(),
            key: None,
        };
        let line = encode_line(&intent).unwrap();
        assert!(!line.contains("key"));
    }

    #[test]
    fn test_parse_change_notice() {
        let message = parse_message(r#"{"event":"roster-changed"}"#).unwrap();
        assert_eq!(message, ClientMessage::Changed(ChangeNotice::new(None)));

        let message = parse_message(r#"{"event":"roster-changed","key":"backstage"}"#).unwrap();
        assert_eq!(
            message,
            ClientMessage::Changed(ChangeNotice::new(Some("backstage".to_string())))
        );
    }

    #[test]
    fn test_change_notice_line() {
        let line = encode_line(&ChangeNotice::new(None)).unwrap();
        assert_eq!(line, "{\"event\":\"roster-changed\"}\n");
    }
}
