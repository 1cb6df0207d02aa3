#![forbid(unsafe_code)]

//! Grid configuration.
//!
//! All fields have defaults (`#[serde(default)]`), so a config file only
//! needs to name what it overrides. Durations are integer milliseconds on
//! the wire.
//!
//! # Example (TOML)
//!
//! ```toml
//! layout_duration = 200
//! layout_easing = "ease_in_out"
//!
//! [layout]
//! strategy = "fill_gaps"
//! gutter_x = 8.0
//!
//! [drag_sort]
//! threshold = 0.4
//! action = "swap"
//! sort_interval = 100
//! ```

#[cfg(feature = "config-file")]
use std::path::Path;
use std::time::Duration;

use flowgrid_core::animation::Easing;
use flowgrid_core::geometry::Sides;
use flowgrid_layout::{FillStrategy, PackOptions};
use serde::{Deserialize, Serialize};

const DEFAULT_DURATION: Duration = Duration::from_millis(300);
const DEFAULT_SORT_INTERVAL: Duration = Duration::from_millis(100);

/// Packing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub strategy: FillStrategy,
    pub horizontal: bool,
    pub align_right: bool,
    pub align_bottom: bool,
    /// Round measured dimensions to whole pixels before packing.
    pub rounding: bool,
    pub gutter_x: f64,
    pub gutter_y: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            strategy: FillStrategy::RowFill,
            horizontal: false,
            align_right: false,
            align_bottom: false,
            rounding: false,
            gutter_x: 0.0,
            gutter_y: 0.0,
        }
    }
}

impl LayoutConfig {
    /// Packer options for a container with the given padding.
    #[must_use]
    pub fn pack_options(&self, padding: Sides) -> PackOptions {
        PackOptions::new(self.strategy)
            .horizontal(self.horizontal)
            .align_right(self.align_right)
            .align_bottom(self.align_bottom)
            .gutter(self.gutter_x, self.gutter_y)
            .padding(padding)
    }
}

/// What happens to the order when a dragged item crosses a neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortAction {
    /// Remove the item and reinsert it at the neighbor's index.
    #[default]
    Move,
    /// Exchange the two items.
    Swap,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragSortConfig {
    pub enabled: bool,
    /// Minimum overlap, as a fraction of the smaller of the two areas.
    pub threshold: f64,
    pub action: SortAction,
    /// Pointer travel required between two sort checks.
    pub min_drag_distance: f64,
    /// Direction change (radians) needed before reordering against the same
    /// neighbor again.
    pub min_bounce_back_angle: f64,
    /// Quiet period after a reorder during which no sort check runs.
    #[serde(with = "duration_ms")]
    pub sort_interval: Duration,
}

impl Default for DragSortConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 0.5,
            action: SortAction::Move,
            min_drag_distance: 10.0,
            min_bounce_back_angle: 1.0,
            sort_interval: DEFAULT_SORT_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub layout: LayoutConfig,

    #[serde(with = "duration_ms")]
    pub layout_duration: Duration,
    pub layout_easing: Easing,

    #[serde(with = "duration_ms")]
    pub show_duration: Duration,
    pub show_easing: Easing,

    #[serde(with = "duration_ms")]
    pub hide_duration: Duration,
    pub hide_easing: Easing,

    #[serde(with = "duration_ms")]
    pub drag_release_duration: Duration,
    pub drag_release_easing: Easing,

    pub drag_sort: DragSortConfig,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            layout_duration: DEFAULT_DURATION,
            layout_easing: Easing::EaseOut,
            show_duration: DEFAULT_DURATION,
            show_easing: Easing::EaseOut,
            hide_duration: DEFAULT_DURATION,
            hide_easing: Easing::EaseOut,
            drag_release_duration: DEFAULT_DURATION,
            drag_release_easing: Easing::EaseOut,
            drag_sort: DragSortConfig::default(),
        }
    }
}

impl GridConfig {
    /// Every transition applied instantly.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            layout_duration: Duration::ZERO,
            show_duration: Duration::ZERO,
            hide_duration: Duration::ZERO,
            drag_release_duration: Duration::ZERO,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: FillStrategy) -> Self {
        self.layout.strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_layout_duration(mut self, duration: Duration) -> Self {
        self.layout_duration = duration;
        self
    }

    #[must_use]
    pub fn with_drag_sort(mut self, drag_sort: DragSortConfig) -> Self {
        self.drag_sort = drag_sort;
        self
    }

    /// Load from a TOML string.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str::<Self>(s)
            .map_err(ConfigError::Toml)?
            .validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config-file")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str::<Self>(s)
            .map_err(ConfigError::Json)?
            .validated()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    #[cfg(feature = "config-file")]
    fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (name, value) in [
            ("layout.gutter_x", self.layout.gutter_x),
            ("layout.gutter_y", self.layout.gutter_y),
            ("drag_sort.min_drag_distance", self.drag_sort.min_drag_distance),
        ] {
            if !value.is_finite() || value < 0.0 {
                errors.push(format!("{name} must be finite and >= 0, got {value}"));
            }
        }

        let threshold = self.drag_sort.threshold;
        if !(0.0..=1.0).contains(&threshold) {
            errors.push(format!(
                "drag_sort.threshold must be in [0, 1], got {threshold}"
            ));
        }

        let angle = self.drag_sort.min_bounce_back_angle;
        if !(0.0..=std::f64::consts::PI).contains(&angle) {
            errors.push(format!(
                "drag_sort.min_bounce_back_angle must be in [0, PI], got {angle}"
            ));
        }

        errors
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let ms = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(ms)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Errors from loading a [`GridConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config-file")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config-file")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config-file")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config-file")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config-file")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config-file")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GridConfig::default().validate().is_empty());
        assert!(GridConfig::instant().validate().is_empty());
    }

    #[test]
    fn validate_catches_bad_threshold() {
        let mut config = GridConfig::default();
        config.drag_sort.threshold = 1.5;
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("threshold"));
    }

    #[test]
    fn validate_rejects_nan_threshold() {
        let mut config = GridConfig::default();
        config.drag_sort.threshold = f64::NAN;
        assert!(config.validate()[0].contains("drag_sort.threshold"));
    }

    #[test]
    fn validate_catches_negative_gutter() {
        let mut config = GridConfig::default();
        config.layout.gutter_y = -1.0;
        assert!(config.validate()[0].contains("gutter_y"));
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn partial_toml_keeps_defaults() {
        let config = GridConfig::from_toml_str(
            r#"
            layout_duration = 120
            layout_easing = "ease_in_out"

            [layout]
            strategy = "fill_gaps"

            [drag_sort]
            action = "swap"
            "#,
        )
        .expect("valid toml");
        assert_eq!(config.layout_duration, Duration::from_millis(120));
        assert_eq!(config.layout_easing, Easing::EaseInOut);
        assert_eq!(config.layout.strategy, FillStrategy::FillGaps);
        assert_eq!(config.drag_sort.action, SortAction::Swap);
        assert_eq!(config.drag_sort.threshold, 0.5);
        assert_eq!(config.drag_sort.sort_interval, DEFAULT_SORT_INTERVAL);
        assert_eq!(config.show_duration, DEFAULT_DURATION);
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn json_round_trip_preserves_durations() {
        let config = GridConfig::default().with_layout_duration(Duration::from_millis(42));
        let json = serde_json::to_string(&config).expect("serialize");
        assert!(json.contains("\"layout_duration\":42"));
        assert_eq!(GridConfig::from_json_str(&json).expect("parse"), config);
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn invalid_file_reports_validation_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("grid.toml");
        std::fs::write(&path, "[drag_sort]\nthreshold = -0.1\n").expect("write");
        match GridConfig::from_toml_file(&path) {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = GridConfig::from_json_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
