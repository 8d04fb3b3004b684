//! Volume control
//!
//! Linear volume in `[0, 1]` with a mute flag that preserves the level.

use reverie_core::types::DEFAULT_VOLUME;

/// Volume controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume {
    /// Volume level in `[0, 1]`
    level: f32,

    /// Mute state (preserves volume level)
    muted: bool,
}

impl Volume {
    /// Create a volume controller
    ///
    /// Out-of-range levels are clamped; non-finite levels fall back to the
    /// default.
    pub fn new(level: f32, muted: bool) -> Self {
        let level = if level.is_finite() {
            level.clamp(0.0, 1.0)
        } else {
            DEFAULT_VOLUME
        };
        Self { level, muted }
    }

    /// Set volume level
    ///
    /// Returns `false` (and changes nothing) for NaN or infinite input.
    pub fn set_level(&mut self, level: f32) -> bool {
        if !level.is_finite() {
            return false;
        }
        self.level = level.clamp(0.0, 1.0);
        true
    }

    /// Current level in `[0, 1]`
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Gain to hand to the engine: 0.0 while muted, otherwise the level
    pub fn gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.level
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_levels() {
        let mut vol = Volume::default();

        assert!(vol.set_level(-0.5));
        assert_eq!(vol.level(), 0.0);

        assert!(vol.set_level(1.7));
        assert_eq!(vol.level(), 1.0);
    }

    #[test]
    fn ignores_non_finite_levels() {
        let mut vol = Volume::new(0.4, false);

        assert!(!vol.set_level(f32::NAN));
        assert!(!vol.set_level(f32::INFINITY));
        assert_eq!(vol.level(), 0.4);

        assert_eq!(Volume::new(f32::NAN, false).level(), DEFAULT_VOLUME);
    }

    #[test]
    fn mute_preserves_level() {
        let mut vol = Volume::new(0.6, false);
        vol.toggle_mute();

        assert!(vol.is_muted());
        assert_eq!(vol.gain(), 0.0);
        assert_eq!(vol.level(), 0.6);

        vol.toggle_mute();
        assert_eq!(vol.gain(), 0.6);
    }
}
