//! Application settings structs, defaults and TOML persistence.
//!
//! Every empirically-chosen threshold in the classifier and dispatcher lives
//! here as a named, tunable field rather than a literal in control flow.
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// GestureConfig
// ---------------------------------------------------------------------------

/// Thresholds for per-frame gesture classification and the rolling-window
/// motion detector.  Distances are in normalized image units (`0..1`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureConfig {
    /// A joint with confidence at or below this is treated as missing.
    pub min_joint_confidence: f32,

    /// Maximum thumb-tip-to-index-tip distance that still counts as a pinch.
    pub pinch_max_distance: f32,
    /// Minimum thumb-tip and index-tip confidence required for a pinch.
    pub pinch_min_confidence: f32,
    /// A finger counts as extended when its tip-to-wrist distance is at
    /// least this fraction of its PIP-to-wrist distance.
    pub extension_ratio: f32,

    /// A finger counts as curled when its tip-to-wrist distance is below
    /// this fraction of its PIP-to-wrist distance.  All four non-thumb
    /// fingers curled = fist.
    pub fist_curl_ratio: f32,

    /// Wrist-Y delta (window average vs window average) that counts as motion.
    pub motion_threshold: f32,
    /// Maximum number of wrist-Y samples retained per hand.
    pub history_size: usize,
    /// Minimum samples before any motion is reported.
    pub min_history: usize,
    /// Samples averaged at each end of the history when computing the delta.
    pub averaging_window: usize,

    /// Wrist-to-middle-MCP vertical component beyond which the palm counts
    /// as facing the screen (positive) or away (negative).
    pub palm_y_threshold: f32,
}

impl GestureConfig {
    /// Replace values that would panic downstream with their defaults.
    fn sanitize(&mut self) {
        if self.history_size == 0 {
            let fallback = Self::default().history_size;
            log::warn!("config: history_size must be at least 1; using {fallback}");
            self.history_size = fallback;
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            min_joint_confidence: 0.3,
            pinch_max_distance: 0.05,
            pinch_min_confidence: 0.7,
            extension_ratio: 0.95,
            fist_curl_ratio: 0.85,
            motion_threshold: 0.08,
            history_size: 12,
            min_history: 8,
            averaging_window: 4,
            palm_y_threshold: 0.05,
        }
    }
}

// ---------------------------------------------------------------------------
// DispatchConfig
// ---------------------------------------------------------------------------

/// Timing windows for the action dispatcher.  Stored as seconds so they read
/// naturally in `settings.toml`; use the `Duration` accessors in code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// How long the right palm must face the screen before the app switcher
    /// activates.
    pub activation_delay_secs: f64,
    /// How long the palm may flicker away (or the hand disappear) before an
    /// active app switcher is dropped.
    pub drop_grace_secs: f64,

    /// Minimum interval between two `Confirm` emissions per hand.
    pub confirm_cooldown_secs: f64,
    /// Minimum interval between two `AppSwitcherCycle` emissions per hand.
    pub cycle_cooldown_secs: f64,
    /// Minimum interval between two scroll emissions per hand and direction.
    pub scroll_cooldown_secs: f64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            activation_delay_secs: 0.3,
            drop_grace_secs: 0.3,
            confirm_cooldown_secs: 0.5,
            cycle_cooldown_secs: 0.4,
            scroll_cooldown_secs: 0.15,
        }
    }
}

/// Timing fields feed `Duration::from_secs_f64`, which panics on negative
/// or non-finite input; replace such values with the default and warn.
fn sanitize_secs(name: &str, value: &mut f64, default: f64) {
    if !value.is_finite() || *value < 0.0 {
        log::warn!("config: {name} = {value} is invalid; using {default}");
        *value = default;
    }
}

impl DispatchConfig {
    fn sanitize(&mut self) {
        let defaults = Self::default();
        sanitize_secs(
            "activation_delay_secs",
            &mut self.activation_delay_secs,
            defaults.activation_delay_secs,
        );
        sanitize_secs(
            "drop_grace_secs",
            &mut self.drop_grace_secs,
            defaults.drop_grace_secs,
        );
        sanitize_secs(
            "confirm_cooldown_secs",
            &mut self.confirm_cooldown_secs,
            defaults.confirm_cooldown_secs,
        );
        sanitize_secs(
            "cycle_cooldown_secs",
            &mut self.cycle_cooldown_secs,
            defaults.cycle_cooldown_secs,
        );
        sanitize_secs(
            "scroll_cooldown_secs",
            &mut self.scroll_cooldown_secs,
            defaults.scroll_cooldown_secs,
        );
    }

    pub fn activation_delay(&self) -> Duration {
        Duration::from_secs_f64(self.activation_delay_secs)
    }

    pub fn drop_grace(&self) -> Duration {
        Duration::from_secs_f64(self.drop_grace_secs)
    }

    pub fn confirm_cooldown(&self) -> Duration {
        Duration::from_secs_f64(self.confirm_cooldown_secs)
    }

    pub fn cycle_cooldown(&self) -> Duration {
        Duration::from_secs_f64(self.cycle_cooldown_secs)
    }

    pub fn scroll_cooldown(&self) -> Duration {
        Duration::from_secs_f64(self.scroll_cooldown_secs)
    }
}

// ---------------------------------------------------------------------------
// SinkConfig
// ---------------------------------------------------------------------------

/// Settings for the OS input sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Scroll-wheel lines per scroll tick.
    pub scroll_lines: i32,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self { scroll_lines: 3 }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use handwave::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Classifier thresholds.
    pub gesture: GestureConfig,
    /// Dispatcher timing windows.
    pub dispatch: DispatchConfig,
    /// Input sink settings.
    pub sink: SinkConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    ///
    /// Hand-edited values that would panic downstream (a zero history
    /// size, a negative or non-finite timing window) are replaced with
    /// their defaults and logged.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.gesture.sanitize();
        config.dispatch.sanitize();
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Verify that a default `AppConfig` can be serialised to TOML and
    /// deserialised back without any data loss.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(
            original.gesture.pinch_max_distance,
            loaded.gesture.pinch_max_distance
        );
        assert_eq!(original.gesture.history_size, loaded.gesture.history_size);
        assert_eq!(
            original.dispatch.confirm_cooldown_secs,
            loaded.dispatch.confirm_cooldown_secs
        );
        assert_eq!(
            original.dispatch.drop_grace_secs,
            loaded.dispatch.drop_grace_secs
        );
        assert_eq!(original.sink.scroll_lines, loaded.sink.scroll_lines);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(
            config.gesture.motion_threshold,
            default.gesture.motion_threshold
        );
        assert_eq!(
            config.dispatch.activation_delay_secs,
            default.dispatch.activation_delay_secs
        );
    }

    /// Default thresholds are the empirically tuned production values.
    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.gesture.min_joint_confidence, 0.3);
        assert_eq!(cfg.gesture.pinch_max_distance, 0.05);
        assert_eq!(cfg.gesture.pinch_min_confidence, 0.7);
        assert_eq!(cfg.gesture.extension_ratio, 0.95);
        assert_eq!(cfg.gesture.fist_curl_ratio, 0.85);
        assert_eq!(cfg.gesture.motion_threshold, 0.08);
        assert_eq!(cfg.gesture.history_size, 12);
        assert_eq!(cfg.gesture.min_history, 8);
        assert_eq!(cfg.gesture.averaging_window, 4);
        assert_eq!(cfg.gesture.palm_y_threshold, 0.05);

        assert_eq!(cfg.dispatch.activation_delay_secs, 0.3);
        assert_eq!(cfg.dispatch.drop_grace_secs, 0.3);
        assert_eq!(cfg.dispatch.confirm_cooldown_secs, 0.5);
        assert_eq!(cfg.dispatch.cycle_cooldown_secs, 0.4);
        assert_eq!(cfg.dispatch.scroll_cooldown_secs, 0.15);

        assert_eq!(cfg.sink.scroll_lines, 3);
    }

    /// Modified non-default values survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.gesture.pinch_max_distance = 0.07;
        cfg.gesture.history_size = 16;
        cfg.dispatch.confirm_cooldown_secs = 0.8;
        cfg.sink.scroll_lines = 1;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.gesture.pinch_max_distance, 0.07);
        assert_eq!(loaded.gesture.history_size, 16);
        assert_eq!(loaded.dispatch.confirm_cooldown_secs, 0.8);
        assert_eq!(loaded.sink.scroll_lines, 1);
    }

    /// Hand-edited values that would panic downstream are replaced with
    /// their defaults on load instead of taking the process down later.
    #[test]
    fn invalid_values_fall_back_to_defaults_on_load() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("broken.toml");

        let mut cfg = AppConfig::default();
        cfg.gesture.history_size = 0;
        cfg.dispatch.drop_grace_secs = -0.3;
        cfg.dispatch.scroll_cooldown_secs = f64::NAN;
        cfg.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");
        assert_eq!(loaded.gesture.history_size, 12);
        assert_eq!(loaded.dispatch.drop_grace_secs, 0.3);
        assert_eq!(loaded.dispatch.scroll_cooldown_secs, 0.15);

        // Valid non-default values are left alone.
        assert_eq!(loaded.dispatch.confirm_cooldown_secs, 0.5);
    }

    /// The `Duration` accessors agree with the raw second fields.
    #[test]
    fn duration_accessors() {
        let cfg = DispatchConfig::default();
        assert_eq!(cfg.activation_delay(), Duration::from_millis(300));
        assert_eq!(cfg.drop_grace(), Duration::from_millis(300));
        assert_eq!(cfg.confirm_cooldown(), Duration::from_millis(500));
        assert_eq!(cfg.cycle_cooldown(), Duration::from_millis(400));
        assert_eq!(cfg.scroll_cooldown(), Duration::from_millis(150));
    }
}
