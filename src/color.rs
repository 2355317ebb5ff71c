// Ordinal rainbow palette for depth-1 subtrees.

use std::collections::HashMap;
use std::f64::consts::PI;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Cyclical rainbow in the cubehelix color space; `t` wraps around 1.
pub fn rainbow(t: f64) -> Rgb {
    let t = t - t.floor();
    let ts = (t - 0.5).abs();
    cubehelix(360.0 * t - 100.0, 1.5 - 1.5 * ts, 0.8 - 0.9 * ts)
}

fn cubehelix(h: f64, s: f64, l: f64) -> Rgb {
    const A: f64 = -0.14861;
    const B: f64 = 1.78277;
    const C: f64 = -0.29227;
    const D: f64 = -0.90649;
    const E: f64 = 1.97294;

    let h = (h + 120.0) * PI / 180.0;
    let a = s * l * (1.0 - l);
    let (sin_h, cos_h) = h.sin_cos();
    let channel = |v: f64| (255.0 * v).round().clamp(0.0, 255.0) as u8;
    Rgb(
        channel(l + a * (A * cos_h + B * sin_h)),
        channel(l + a * (C * cos_h + D * sin_h)),
        channel(l + a * (E * cos_h)),
    )
}

/// `n` evenly spaced samples of the rainbow, first at t=0 and last at t=1.
pub fn quantize(n: usize) -> Vec<Rgb> {
    match n {
        0 => Vec::new(),
        1 => vec![rainbow(0.0)],
        _ => (0..n).map(|i| rainbow(i as f64 / (n - 1) as f64)).collect(),
    }
}

/// Assigns colors to names in first-seen order, cycling when the range runs out.
#[derive(Debug, Clone)]
pub struct OrdinalPalette {
    range: Vec<Rgb>,
    assigned: HashMap<String, usize>,
}

impl OrdinalPalette {
    /// One color per depth-1 subtree plus one, so the first and last
    /// subtrees never share the wrapped-around hue.
    pub fn for_subtrees(count: usize) -> Self {
        Self { range: quantize(count + 1), assigned: HashMap::new() }
    }

    pub fn color(&mut self, name: &str) -> Rgb {
        let next = self.assigned.len();
        let idx = *self.assigned.entry(name.to_string()).or_insert(next);
        self.range[idx % self.range.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rainbow_wraps() {
        assert_eq!(rainbow(0.0), rainbow(1.0));
        assert_eq!(rainbow(0.25), rainbow(1.25));
    }

    #[test]
    fn test_rainbow_midpoint() {
        // t = 0.5: h = 80, s = 1.5, l = 0.8
        assert_eq!(rainbow(0.5), Rgb(175, 240, 91));
        assert_eq!(rainbow(0.5).hex(), "#aff05b");
    }

    #[test]
    fn test_quantize_lengths() {
        assert!(quantize(0).is_empty());
        assert_eq!(quantize(1).len(), 1);
        let samples = quantize(4);
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0], samples[3]);
        assert_ne!(samples[0], samples[1]);
    }

    #[test]
    fn test_ordinal_first_seen_order() {
        let mut palette = OrdinalPalette::for_subtrees(3);
        let a = palette.color("a");
        let b = palette.color("b");
        assert_ne!(a, b);
        assert_eq!(palette.color("a"), a);
        assert_eq!(a, rainbow(0.0));
        assert_eq!(b, rainbow(1.0 / 3.0));
    }
}
