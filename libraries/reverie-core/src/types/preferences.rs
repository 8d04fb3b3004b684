/// Persisted playback preferences
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Volume used when nothing valid has been stored
pub const DEFAULT_VOLUME: f32 = 0.7;

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RepeatMode {
    /// Stop when the queue ends
    #[default]
    None,

    /// Loop the current track
    One,

    /// Loop the whole queue
    All,
}

impl RepeatMode {
    /// Next mode in the repeat toggle cycle: None → All → One → None
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::None => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::None,
        }
    }

    /// Convert repeat mode to its storage string
    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatMode::None => "None",
            RepeatMode::One => "One",
            RepeatMode::All => "All",
        }
    }
}

impl FromStr for RepeatMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "off" => Ok(RepeatMode::None),
            "one" => Ok(RepeatMode::One),
            "all" => Ok(RepeatMode::All),
            other => Err(format!("unknown repeat mode: {other}")),
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The subset of session state that survives a restart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Volume in `[0, 1]`
    pub volume: f32,

    /// Mute flag (stored volume is kept while muted)
    pub muted: bool,

    /// Shuffle enabled
    pub shuffle: bool,

    /// Repeat mode
    pub repeat: RepeatMode,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            muted: false,
            shuffle: false,
            repeat: RepeatMode::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_preferences() {
        let prefs = Preferences::default();
        assert_eq!(prefs.volume, 0.7);
        assert!(!prefs.muted);
        assert!(!prefs.shuffle);
        assert_eq!(prefs.repeat, RepeatMode::None);
    }

    #[test]
    fn repeat_cycle_is_total() {
        let mut mode = RepeatMode::None;
        let mut seen = Vec::new();
        for _ in 0..3 {
            mode = mode.cycle();
            seen.push(mode);
        }
        assert_eq!(seen, vec![RepeatMode::All, RepeatMode::One, RepeatMode::None]);
    }

    #[test]
    fn repeat_serializes_as_variant_name() {
        assert_eq!(serde_json::to_string(&RepeatMode::All).unwrap(), "\"All\"");
        assert_eq!("off".parse::<RepeatMode>(), Ok(RepeatMode::None));
    }
}
