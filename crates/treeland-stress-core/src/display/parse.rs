//! Parsing of `wlr-randr --json` output.
//!
//! ```json
//! [
//!   {
//!     "name": "HDMI-A-1",
//!     "enabled": true,
//!     "modes": [
//!       { "width": 1920, "height": 1080, "refresh": 60.0, "preferred": true, "current": true }
//!     ],
//!     "position": { "x": 0, "y": 0 },
//!     "transform": "normal",
//!     "scale": 1.0,
//!     "adaptive_sync": false
//!   }
//! ]
//! ```
//!
//! Disabled outputs omit position, transform and scale; those fall back to
//! the origin, `normal` and `1.0`.

use serde::Deserialize;

use super::errors::DisplayError;
use super::types::{DisplayMode, DisplaySnapshot, Displays, Position, Transform};

#[derive(Debug, Deserialize)]
struct RawOutput {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    make: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default)]
    modes: Vec<RawMode>,
    #[serde(default)]
    position: Option<Position>,
    #[serde(default)]
    transform: Option<Transform>,
    #[serde(default)]
    scale: Option<f64>,
    #[serde(default)]
    adaptive_sync: bool,
}

#[derive(Debug, Deserialize)]
struct RawMode {
    width: u32,
    height: u32,
    refresh: f64,
    #[serde(default)]
    preferred: bool,
    #[serde(default)]
    current: bool,
}

fn default_true() -> bool {
    true
}

impl From<RawOutput> for DisplaySnapshot {
    fn from(raw: RawOutput) -> Self {
        let modes: Vec<DisplayMode> = raw
            .modes
            .iter()
            .map(|m| DisplayMode::new(m.width, m.height, m.refresh))
            .collect();
        let current_mode = raw
            .modes
            .iter()
            .find(|m| m.current)
            .map(|m| DisplayMode::new(m.width, m.height, m.refresh));
        let preferred_mode = raw
            .modes
            .iter()
            .find(|m| m.preferred)
            .map(|m| DisplayMode::new(m.width, m.height, m.refresh));

        DisplaySnapshot {
            name: raw.name,
            description: raw.description,
            make: raw.make,
            model: raw.model,
            modes,
            current_mode,
            preferred_mode,
            position: raw.position.unwrap_or_default(),
            transform: raw.transform.unwrap_or_default(),
            scale: raw.scale.unwrap_or(1.0),
            enabled: raw.enabled,
            adaptive_sync: raw.adaptive_sync,
        }
    }
}

/// Parse the tool's JSON output into snapshots, keeping enumeration order.
pub fn parse_displays(json: &str) -> Result<Displays, DisplayError> {
    let raw: Vec<RawOutput> =
        serde_json::from_str(json).map_err(|e| DisplayError::InvalidOutput {
            message: e.to_string(),
        })?;
    Ok(Displays::new(raw.into_iter().map(DisplaySnapshot::from).collect()))
}
