// Angular/radial rectangle of a node and the pure functions over it.
//
// x0..x1 is the angle span in radians, y0..y1 the radial band in depth units.

use std::f64::consts::TAU;

use serde::Serialize;

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize)]
pub struct Window {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

impl Window {
    pub fn new(x0: f64, x1: f64, y0: f64, y1: f64) -> Self {
        Self { x0, x1, y0, y1 }
    }

    pub fn angle_span(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn band(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Angle/radius area in radians times depth units.
    pub fn area(&self) -> f64 {
        self.band() * self.angle_span()
    }

    /// Linear interpolation toward `to`; `t` is clamped to [0, 1] and
    /// `t = 1` yields `to` exactly.
    pub fn lerp(&self, to: &Window, t: f64) -> Window {
        if t >= 1.0 {
            return *to;
        }
        let t = t.max(0.0);
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Window {
            x0: mix(self.x0, to.x0),
            x1: mix(self.x1, to.x1),
            y0: mix(self.y0, to.y0),
            y1: mix(self.y1, to.y1),
        }
    }

    /// Rescale this window so that `focus` fills the full circle and sits at
    /// radius 0. Parts outside the focus span are clamped away, and bands
    /// at or above the focus depth collapse to 0.
    ///
    /// Returns `None` when `focus` has no angular width.
    pub fn relative_to(&self, focus: &Window) -> Option<Window> {
        let span = focus.angle_span();
        if !(span > 0.0) {
            return None;
        }
        let angle = |x: f64| ((x - focus.x0) / span).clamp(0.0, 1.0) * TAU;
        Some(Window {
            x0: angle(self.x0),
            x1: angle(self.x1),
            y0: (self.y0 - focus.y0).max(0.0),
            y1: (self.y1 - focus.y0).max(0.0),
        })
    }

    pub fn approx_eq(&self, other: &Window, eps: f64) -> bool {
        (self.x0 - other.x0).abs() <= eps
            && (self.x1 - other.x1).abs() <= eps
            && (self.y0 - other.y0).abs() <= eps
            && (self.y1 - other.y1).abs() <= eps
    }
}

/// Which window predicates apply. Both fields come from `ChartConfig`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Visibility {
    /// Outermost ring that is drawn (depth units from the hub).
    pub rings: f64,
    /// Minimum window area for a label to be shown.
    pub label_min_area: f64,
}

impl Default for Visibility {
    fn default() -> Self {
        Self { rings: 3.0, label_min_area: 0.03 }
    }
}

impl Visibility {
    fn in_rings(&self, w: &Window) -> bool {
        w.y1 <= self.rings && w.y0 >= 1.0
    }

    pub fn arc_visible(&self, w: &Window) -> bool {
        self.in_rings(w) && w.x1 > w.x0
    }

    pub fn label_visible(&self, w: &Window) -> bool {
        self.in_rings(w) && w.area() > self.label_min_area
    }
}

/// Arc visibility under the default three rings.
pub fn arc_visible(w: &Window) -> bool {
    Visibility::default().arc_visible(w)
}

/// Label visibility under the default three rings and 0.03 area threshold.
pub fn label_visible(w: &Window) -> bool {
    Visibility::default().label_visible(w)
}
