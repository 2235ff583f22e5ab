use serde::{Deserialize, Serialize};

/// One of the four independent live flags of a contestant.
///
/// Each axis maps to exactly one column and to one event name on the live channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToggleAxis {
    CrossoutMain,
    GlowMain,
    CrossoutPrejudge,
    GlowPrejudge,
}

impl ToggleAxis {
    pub const ALL: [ToggleAxis; 4] = [
        ToggleAxis::CrossoutMain,
        ToggleAxis::GlowMain,
        ToggleAxis::CrossoutPrejudge,
        ToggleAxis::GlowPrejudge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToggleAxis::CrossoutMain => "crossout-main",
            ToggleAxis::GlowMain => "glow-main",
            ToggleAxis::CrossoutPrejudge => "crossout-prejudge",
            ToggleAxis::GlowPrejudge => "glow-prejudge",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "crossout-main" => Some(ToggleAxis::CrossoutMain),
            "glow-main" => Some(ToggleAxis::GlowMain),
            "crossout-prejudge" => Some(ToggleAxis::CrossoutPrejudge),
            "glow-prejudge" => Some(ToggleAxis::GlowPrejudge),
            _ => None,
        }
    }

    /// Column backing this axis in the contestants table
    pub fn column(&self) -> &'static str {
        match self {
            ToggleAxis::CrossoutMain => "crossed_out_main",
            ToggleAxis::GlowMain => "glowing_main",
            ToggleAxis::CrossoutPrejudge => "crossed_out_prejudge",
            ToggleAxis::GlowPrejudge => "glowing_prejudge",
        }
    }
}

impl std::fmt::Display for ToggleAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Live state flags of a contestant, all false at creation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageFlags {
    pub crossed_out_main: bool,
    pub glowing_main: bool,
    pub crossed_out_prejudge: bool,
    pub glowing_prejudge: bool,
}

impl StageFlags {
    pub fn get(&self, axis: ToggleAxis) -> bool {
        match axis {
            ToggleAxis::CrossoutMain => self.crossed_out_main,
            ToggleAxis::GlowMain => self.glowing_main,
            ToggleAxis::CrossoutPrejudge => self.crossed_out_prejudge,
            ToggleAxis::GlowPrejudge => self.glowing_prejudge,
        }
    }
}

/// Contestant model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contestant {
    pub id: Option<i64>,
    pub stage_name: String,
    pub character: String,
    pub cosplay_ts: i64,
    pub prejudge: bool,
    pub prejudge_ts: Option<i64>,
    pub comment: Option<String>,
    pub audio_url: Option<String>,
    pub video_url: Option<String>,
    pub flags: StageFlags,
    pub created_ts: i64,
    pub modified_ts: i64,
}

/// Fields supplied when adding a contestant to the roster
#[derive(Debug, Clone, Default)]
pub struct NewContestant {
    pub stage_name: String,
    pub character: String,
    pub cosplay_ts: i64,
    pub prejudge_ts: Option<i64>,
    pub comment: Option<String>,
    pub audio_url: Option<String>,
    pub video_url: Option<String>,
}

impl NewContestant {
    pub fn new(stage_name: &str, character: &str, cosplay_ts: i64) -> Self {
        Self {
            stage_name: stage_name.to_string(),
            character: character.to_string(),
            cosplay_ts,
            ..Default::default()
        }
    }
}

/// Partial update of a contestant's descriptive fields.
///
/// `None` leaves a field untouched; `Some(None)` clears an optional field.
/// Flags are never part of a patch.
#[derive(Debug, Clone, Default)]
pub struct ContestantPatch {
    pub character: Option<String>,
    pub cosplay_ts: Option<i64>,
    pub prejudge_ts: Option<Option<i64>>,
    pub comment: Option<Option<String>>,
    pub audio_url: Option<Option<String>>,
    pub video_url: Option<Option<String>>,
}

impl ContestantPatch {
    pub fn is_empty(&self) -> bool {
        self.character.is_none()
            && self.cosplay_ts.is_none()
            && self.prejudge_ts.is_none()
            && self.comment.is_none()
            && self.audio_url.is_none()
            && self.video_url.is_none()
    }
}
