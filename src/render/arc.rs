// Annular-sector path generation.
//
// Angles are measured clockwise from 12 o'clock. Neighbouring wedges are
// separated by a pad angle applied at a fixed pad radius, so the gap has the
// same width at every ring.

use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::fmt::Write;

use crate::layout::Window;

const EPSILON: f64 = 1e-12;
const PATH_EPSILON: f64 = 1e-6;

fn asin_clamped(x: f64) -> f64 {
    if x >= 1.0 {
        FRAC_PI_2
    } else if x <= -1.0 {
        -FRAC_PI_2
    } else {
        x.asin()
    }
}

/// Format a coordinate with at most three decimals.
pub fn num(v: f64) -> String {
    let r = (v * 1000.0).round() / 1000.0;
    // avoid "-0"
    let r = if r == 0.0 { 0.0 } else { r };
    format!("{r}")
}

/// Minimal SVG path writer tracking the current point.
#[derive(Debug, Default)]
pub struct PathBuilder {
    out: String,
    last: Option<(f64, f64)>,
}

impl PathBuilder {
    pub fn move_to(&mut self, x: f64, y: f64) {
        let _ = write!(self.out, "M{},{}", num(x), num(y));
        self.last = Some((x, y));
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        let _ = write!(self.out, "L{},{}", num(x), num(y));
        self.last = Some((x, y));
    }

    /// Circular arc around (cx, cy) from angle `a0` to `a1` (radians,
    /// counter-clockwise when `ccw`). Connects from the current point with a
    /// line when the arc does not start there.
    pub fn arc(&mut self, cx: f64, cy: f64, r: f64, a0: f64, a1: f64, ccw: bool) {
        let (dx, dy) = (r * a0.cos(), r * a0.sin());
        let (x0, y0) = (cx + dx, cy + dy);
        let sweep = if ccw { 0 } else { 1 };
        let raw = if ccw { a0 - a1 } else { a1 - a0 };
        // decided before wrapping: a span of -2π minus rounding must not wrap to ~0
        let full = raw.abs() > TAU - PATH_EPSILON;
        let mut da = raw;

        match self.last {
            None => self.move_to(x0, y0),
            Some((lx, ly)) if (lx - x0).abs() > PATH_EPSILON || (ly - y0).abs() > PATH_EPSILON => {
                self.line_to(x0, y0)
            }
            Some(_) => {}
        }

        if r <= 0.0 {
            return;
        }
        if da < 0.0 {
            da = da % TAU + TAU;
        }

        let r_s = num(r);
        if full || da > TAU - PATH_EPSILON {
            // full circle: two half arcs through the opposite point
            let _ = write!(
                self.out,
                "A{r_s},{r_s},0,1,{sweep},{},{}A{r_s},{r_s},0,1,{sweep},{},{}",
                num(cx - dx),
                num(cy - dy),
                num(x0),
                num(y0)
            );
            self.last = Some((x0, y0));
        } else if da > PATH_EPSILON {
            let (x1, y1) = (cx + r * a1.cos(), cy + r * a1.sin());
            let large = if da >= PI { 1 } else { 0 };
            let _ = write!(self.out, "A{r_s},{r_s},0,{large},{sweep},{},{}", num(x1), num(y1));
            self.last = Some((x1, y1));
        }
    }

    pub fn close(&mut self) {
        self.out.push('Z');
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Turns windows into wedge paths at a given band radius.
#[derive(Debug, Clone, Copy)]
pub struct ArcGenerator {
    pub radius: f64,
    pub pad_radius: f64,
    pub max_pad_angle: f64,
}

impl ArcGenerator {
    pub fn new(radius: f64, max_pad_angle: f64) -> Self {
        Self { radius, pad_radius: radius * 1.5, max_pad_angle }
    }

    pub fn inner_radius(&self, w: &Window) -> f64 {
        w.y0 * self.radius
    }

    /// One unit short of the band edge so neighbouring rings do not touch.
    pub fn outer_radius(&self, w: &Window) -> f64 {
        (w.y0 * self.radius).max(w.y1 * self.radius - 1.0)
    }

    pub fn pad_angle(&self, w: &Window) -> f64 {
        (w.angle_span() / 2.0).min(self.max_pad_angle)
    }

    pub fn path(&self, w: &Window) -> String {
        let mut r0 = self.inner_radius(w);
        let mut r1 = self.outer_radius(w);
        if r1 < r0 {
            std::mem::swap(&mut r0, &mut r1);
        }
        let a0 = w.x0 - FRAC_PI_2;
        let a1 = w.x1 - FRAC_PI_2;
        let da = (a1 - a0).abs();
        let cw = a1 > a0;

        let mut p = PathBuilder::default();

        if !(r1 > EPSILON) {
            p.move_to(0.0, 0.0);
        } else if da > TAU - EPSILON {
            p.move_to(r1 * a0.cos(), r1 * a0.sin());
            p.arc(0.0, 0.0, r1, a0, a1, !cw);
            if r0 > EPSILON {
                p.move_to(r0 * a1.cos(), r0 * a1.sin());
                p.arc(0.0, 0.0, r0, a1, a0, cw);
            }
        } else {
            let (mut a01, mut a11, mut a00, mut a10) = (a0, a1, a0, a1);
            let (mut da0, mut da1) = (da, da);
            let ap = self.pad_angle(w) / 2.0;
            let dir = if cw { 1.0 } else { -1.0 };

            if ap > EPSILON && self.pad_radius > EPSILON {
                let p0 = asin_clamped(self.pad_radius / r0 * ap.sin());
                let p1 = asin_clamped(self.pad_radius / r1 * ap.sin());

                da0 -= p0 * 2.0;
                if da0 > EPSILON {
                    a00 += p0 * dir;
                    a10 -= p0 * dir;
                } else {
                    da0 = 0.0;
                    a00 = (a0 + a1) / 2.0;
                    a10 = a00;
                }

                da1 -= p1 * 2.0;
                if da1 > EPSILON {
                    a01 += p1 * dir;
                    a11 -= p1 * dir;
                } else {
                    da1 = 0.0;
                    a01 = (a0 + a1) / 2.0;
                    a11 = a01;
                }
            }

            p.move_to(r1 * a01.cos(), r1 * a01.sin());
            if da1 > EPSILON {
                p.arc(0.0, 0.0, r1, a01, a11, !cw);
            }

            if !(r0 > EPSILON) || !(da0 > EPSILON) {
                p.line_to(r0 * a10.cos(), r0 * a10.sin());
            } else {
                p.arc(0.0, 0.0, r0, a10, a00, cw);
            }
        }

        p.close();
        p.finish()
    }
}
