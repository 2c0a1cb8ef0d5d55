use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Refresh rates closer than this are the same mode (Hz).
pub const REFRESH_TOLERANCE: f64 = 0.1;

/// Scales closer than this are the same scale.
pub const SCALE_TOLERANCE: f64 = 0.01;

/// Scales applied by the scale sweep, in order.
pub const SCALE_SWEEP: [f64; 6] = [0.5, 0.7, 0.9, 1.1, 1.3, 1.5];

/// A (width, height, refresh rate) triple an output can be driven at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayMode {
    pub width: u32,
    pub height: u32,
    /// Refresh rate in Hz.
    pub refresh: f64,
}

impl DisplayMode {
    pub fn new(width: u32, height: u32, refresh: f64) -> Self {
        Self {
            width,
            height,
            refresh,
        }
    }

    /// Same resolution, refresh within [`REFRESH_TOLERANCE`].
    pub fn matches(&self, other: &DisplayMode) -> bool {
        self.width == other.width
            && self.height == other.height
            && (self.refresh - other.refresh).abs() < REFRESH_TOLERANCE
    }

    /// Value for `wlr-randr --mode`.
    pub fn to_arg(&self) -> String {
        format!("{}x{}@{}Hz", self.width, self.height, self.refresh)
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}@{}Hz", self.width, self.height, self.refresh)
    }
}

/// Rotation/flip applied to an output's image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Transform {
    #[default]
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "90")]
    Rotate90,
    #[serde(rename = "180")]
    Rotate180,
    #[serde(rename = "270")]
    Rotate270,
    #[serde(rename = "flipped")]
    Flipped,
    #[serde(rename = "flipped-90")]
    Flipped90,
    #[serde(rename = "flipped-180")]
    Flipped180,
    #[serde(rename = "flipped-270")]
    Flipped270,
}

impl Transform {
    /// Every transform, in sweep order.
    pub const ALL: [Transform; 8] = [
        Transform::Normal,
        Transform::Rotate90,
        Transform::Rotate180,
        Transform::Rotate270,
        Transform::Flipped,
        Transform::Flipped90,
        Transform::Flipped180,
        Transform::Flipped270,
    ];

    /// Name used by `wlr-randr`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Transform::Normal => "normal",
            Transform::Rotate90 => "90",
            Transform::Rotate180 => "180",
            Transform::Rotate270 => "270",
            Transform::Flipped => "flipped",
            Transform::Flipped90 => "flipped-90",
            Transform::Flipped180 => "flipped-180",
            Transform::Flipped270 => "flipped-270",
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Transform::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown transform '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// Point-in-time configuration of one output.
///
/// Rebuilt from scratch on every query; never updated in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplaySnapshot {
    pub name: String,
    pub description: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    /// Supported modes in the tool's enumeration order.
    pub modes: Vec<DisplayMode>,
    pub current_mode: Option<DisplayMode>,
    pub preferred_mode: Option<DisplayMode>,
    pub position: Position,
    pub transform: Transform,
    pub scale: f64,
    pub enabled: bool,
    pub adaptive_sync: bool,
}

/// Outputs of one query, in enumeration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Displays(Vec<DisplaySnapshot>);

impl Displays {
    pub fn new(displays: Vec<DisplaySnapshot>) -> Self {
        Self(displays)
    }

    pub fn get(&self, name: &str) -> Option<&DisplaySnapshot> {
        self.0.iter().find(|display| display.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DisplaySnapshot> {
        self.0.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|display| display.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for Displays {
    type Item = DisplaySnapshot;
    type IntoIter = std::vec::IntoIter<DisplaySnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Result of applying one setting.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// The command succeeded and a re-query shows the new value.
    Applied,
    /// The command succeeded but a re-query disagrees.
    Unverified { reason: String },
    /// The tool rejected the command.
    CommandFailed { error: String },
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied)
    }

    pub fn command_succeeded(&self) -> bool {
        !matches!(self, ApplyOutcome::CommandFailed { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Modes,
    Transforms,
    Scales,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Modes => write!(f, "modes"),
            Phase::Transforms => write!(f, "transforms"),
            Phase::Scales => write!(f, "scales"),
        }
    }
}

/// What one sweep phase achieved on one output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseReport {
    pub output: String,
    pub phase: Phase,
    /// Items the phase meant to apply.
    pub total: usize,
    /// Items actually tried before finishing or being interrupted.
    pub attempted: usize,
    /// Labels of the items that took effect, in sweep order.
    pub succeeded: Vec<String>,
    /// Whether the pre-phase value was restored and verified.
    pub restored: bool,
    pub interrupted: bool,
}

impl PhaseReport {
    pub fn all_succeeded(&self) -> bool {
        self.succeeded.len() == self.total
    }
}

/// Timing and verbosity of a display test run.
#[derive(Debug, Clone)]
pub struct DisplayOptions {
    /// Pause after each sweep item.
    pub interval: Duration,
    /// Wait after a mode or preferred-mode change before re-querying.
    pub mode_settle: Duration,
    /// Wait after a scale change before re-querying.
    pub scale_settle: Duration,
    /// Print raw tool output and parsed outputs on every query.
    pub debug: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            mode_settle: Duration::from_secs(1),
            scale_settle: Duration::from_millis(500),
            debug: false,
        }
    }
}
