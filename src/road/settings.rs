//! Road generation settings.
//!
//! Settings travel as JSON (camelCase) between a host and the engine. Missing
//! fields take their defaults, so `{}` is a valid configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sampling never steps finer than this.
pub const MIN_SPACING: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("setting `{field}` must be finite")]
    NonFinite { field: &'static str },
    #[error("setting `{field}` must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("smoothing strength must lie in [0, 1] (got {0})")]
    StrengthOutOfRange(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoadSettings {
    /// Half of the road width.
    pub half_width: f64,
    /// Extrusion height; the top surface is raised by the same amount.
    pub thickness: f64,
    /// Target distance between samples along the road.
    pub spacing: f64,
    pub smoothing_enabled: bool,
    pub smoothing_strength: f64,
    pub smoothing_iterations: usize,
    pub self_intersection_enabled: bool,
    pub adaptive_spacing_enabled: bool,
    /// Quads with a side edge longer than this are bisected. `0` disables
    /// subdivision.
    pub max_quad_edge_length: f64,
    pub debug_visualization: bool,
    /// Index window used when matching center points to boundary points.
    pub max_index_distance: usize,
    /// Boundary self-intersection tolerance as a fraction of `spacing`.
    pub clip_min_distance_factor: f64,
    pub clip_max_iterations: usize,
}

impl Default for RoadSettings {
    fn default() -> Self {
        Self {
            half_width: 1.0,
            thickness: 0.2,
            spacing: 1.0,
            smoothing_enabled: true,
            smoothing_strength: 0.5,
            smoothing_iterations: 3,
            self_intersection_enabled: true,
            adaptive_spacing_enabled: true,
            max_quad_edge_length: 0.0,
            debug_visualization: false,
            max_index_distance: 8,
            clip_min_distance_factor: 0.25,
            clip_max_iterations: 64,
        }
    }
}

impl RoadSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_half_width(mut self, half_width: f64) -> Self {
        self.half_width = half_width;
        self
    }

    #[must_use]
    pub const fn with_thickness(mut self, thickness: f64) -> Self {
        self.thickness = thickness;
        self
    }

    #[must_use]
    pub const fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    #[must_use]
    pub const fn with_smoothing(mut self, enabled: bool, strength: f64, iterations: usize) -> Self {
        self.smoothing_enabled = enabled;
        self.smoothing_strength = strength;
        self.smoothing_iterations = iterations;
        self
    }

    #[must_use]
    pub const fn with_self_intersection(mut self, enabled: bool) -> Self {
        self.self_intersection_enabled = enabled;
        self
    }

    #[must_use]
    pub const fn with_adaptive_spacing(mut self, enabled: bool) -> Self {
        self.adaptive_spacing_enabled = enabled;
        self
    }

    #[must_use]
    pub const fn with_max_quad_edge_length(mut self, length: f64) -> Self {
        self.max_quad_edge_length = length;
        self
    }

    #[must_use]
    pub const fn with_debug_visualization(mut self, enabled: bool) -> Self {
        self.debug_visualization = enabled;
        self
    }

    #[must_use]
    pub const fn with_max_index_distance(mut self, distance: usize) -> Self {
        self.max_index_distance = distance;
        self
    }

    /// Full road width.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.half_width * 2.0
    }

    /// Spacing actually used for sampling.
    #[must_use]
    pub fn effective_spacing(&self) -> f64 {
        self.spacing.max(MIN_SPACING)
    }

    /// Separation below which two boundary segments count as crossing.
    #[must_use]
    pub fn clip_min_distance(&self) -> f64 {
        self.clip_min_distance_factor * self.effective_spacing()
    }

    /// Rejects settings a host should not be sending.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let numeric = [
            ("halfWidth", self.half_width),
            ("thickness", self.thickness),
            ("spacing", self.spacing),
            ("smoothingStrength", self.smoothing_strength),
            ("maxQuadEdgeLength", self.max_quad_edge_length),
            ("clipMinDistanceFactor", self.clip_min_distance_factor),
        ];
        for (field, value) in numeric {
            if !value.is_finite() {
                return Err(SettingsError::NonFinite { field });
            }
            if value < 0.0 {
                return Err(SettingsError::Negative { field, value });
            }
        }
        if self.smoothing_strength > 1.0 {
            return Err(SettingsError::StrengthOutOfRange(self.smoothing_strength));
        }
        Ok(())
    }

    /// Clamps every option into its legal range. Non-finite values fall back
    /// to the defaults.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let clean = |value: f64, fallback: f64| {
            if value.is_finite() { value.max(0.0) } else { fallback }
        };

        Self {
            half_width: clean(self.half_width, defaults.half_width),
            thickness: clean(self.thickness, defaults.thickness),
            spacing: clean(self.spacing, defaults.spacing).max(MIN_SPACING),
            smoothing_strength: clean(self.smoothing_strength, defaults.smoothing_strength).min(1.0),
            max_quad_edge_length: clean(self.max_quad_edge_length, 0.0),
            clip_min_distance_factor: clean(self.clip_min_distance_factor, defaults.clip_min_distance_factor),
            max_index_distance: self.max_index_distance.max(1),
            ..self.clone()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(RoadSettings::default().validate().is_ok());
        assert!((RoadSettings::default().width() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn empty_json_is_default() {
        let settings = RoadSettings::from_json("{}").unwrap();
        assert_eq!(settings, RoadSettings::default());
    }

    #[test]
    fn json_uses_camel_case() {
        let settings = RoadSettings::from_json(r#"{"halfWidth": 3.5, "smoothingEnabled": false}"#).unwrap();
        assert!((settings.half_width - 3.5).abs() < 1e-12);
        assert!(!settings.smoothing_enabled);
        assert_eq!(settings.smoothing_iterations, 3);
        assert!(settings.to_json().unwrap().contains("\"maxQuadEdgeLength\""));
    }

    #[test]
    fn validation_reports_offending_field() {
        let err = RoadSettings::default().with_spacing(-1.0).validate().unwrap_err();
        assert_eq!(err, SettingsError::Negative { field: "spacing", value: -1.0 });

        let err = RoadSettings::default().with_half_width(f64::NAN).validate().unwrap_err();
        assert_eq!(err, SettingsError::NonFinite { field: "halfWidth" });

        let err = RoadSettings::default().with_smoothing(true, 1.5, 3).validate().unwrap_err();
        assert!(matches!(err, SettingsError::StrengthOutOfRange(_)));
    }

    #[test]
    fn sanitized_clamps_instead_of_failing() {
        let settings = RoadSettings::default()
            .with_spacing(0.0)
            .with_thickness(f64::INFINITY)
            .with_smoothing(true, 4.0, 2)
            .with_max_index_distance(0)
            .sanitized();
        assert!((settings.spacing - MIN_SPACING).abs() < 1e-12);
        assert!((settings.thickness - 0.2).abs() < 1e-12);
        assert!((settings.smoothing_strength - 1.0).abs() < 1e-12);
        assert_eq!(settings.max_index_distance, 1);
        assert!(settings.validate().is_ok());
    }
}
