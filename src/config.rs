use serde::{Deserialize, Serialize};

use crate::error::{Result, SunburstError};
use crate::layout::Visibility;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Side of the square viewport in logical units.
    pub width: f64,
    /// Duration of a click-to-zoom transition.
    pub zoom_duration_ms: f64,
    /// Duration of each whole-chart fade (out or in).
    pub fade_duration_ms: f64,
    /// Number of rings drawn around the hub.
    pub visible_rings: f64,
    /// Minimum window area (radians x depth units) for a label.
    pub label_min_area: f64,
    /// Upper bound on the pad angle between neighbouring arcs.
    pub max_pad_angle: f64,
    pub parent_opacity: f64,
    pub leaf_opacity: f64,
    pub font: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 540.0,
            zoom_duration_ms: 750.0,
            fade_duration_ms: 1500.0,
            visible_rings: 3.0,
            label_min_area: 0.03,
            max_pad_angle: 0.005,
            parent_opacity: 0.6,
            leaf_opacity: 0.4,
            font: r#"10px "Roboto", sans-serif"#.to_string(),
        }
    }
}

impl ChartConfig {
    pub fn from_json(input: &str) -> Result<Self> {
        let cfg: ChartConfig = serde_json::from_str(input)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.width > 0.0) || !self.width.is_finite() {
            return Err(SunburstError::Config(format!("width must be positive, got {}", self.width)));
        }
        if !(self.zoom_duration_ms >= 0.0) || !(self.fade_duration_ms >= 0.0) {
            return Err(SunburstError::Config("durations must be non-negative".to_string()));
        }
        if !(self.visible_rings >= 1.0) {
            return Err(SunburstError::Config(format!(
                "visible_rings must be at least 1, got {}",
                self.visible_rings
            )));
        }
        Ok(())
    }

    /// Radius of one depth band in logical units.
    pub fn radius(&self) -> f64 {
        self.width / 6.0
    }

    pub fn visibility(&self) -> Visibility {
        Visibility { rings: self.visible_rings, label_min_area: self.label_min_area }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ChartConfig::default();
        assert_eq!(cfg.radius(), 90.0);
        assert_eq!(cfg.visibility(), Visibility::default());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg = ChartConfig::from_json(r#"{"width": 600, "zoom_duration_ms": 300}"#).unwrap();
        assert_eq!(cfg.width, 600.0);
        assert_eq!(cfg.zoom_duration_ms, 300.0);
        assert_eq!(cfg.fade_duration_ms, 1500.0);
        assert_eq!(cfg.radius(), 100.0);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(ChartConfig::from_json(r#"{"width": 0}"#).is_err());
        assert!(ChartConfig::from_json(r#"{"fade_duration_ms": -1}"#).is_err());
        assert!(ChartConfig::from_json(r#"{"visible_rings": 0.5}"#).is_err());
        assert!(ChartConfig::from_json("not json").is_err());
    }
}
