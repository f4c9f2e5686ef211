//! Curve fitting and arc-length parameterization.
//!
//! [`SmoothSpline3`] interpolates an ordered chain of control points with a
//! piecewise cubic Bezier whose handles are derived automatically from each
//! knot's neighbours (auto-smooth tangents). The curve is addressed by a
//! normalized parameter `t ∈ [0, 1]`; a cumulative arc-length table converts
//! travelled distance back into that parameter.

use super::core::{Point3, Tolerance, Vec3};

pub trait Curve3 {
    fn point_at(&self, t: f64) -> Point3;

    #[must_use]
    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    #[must_use]
    fn is_closed(&self) -> bool {
        false
    }

    /// Central-difference derivative; implementors with an analytic form override it.
    #[must_use]
    fn derivative_at(&self, t: f64) -> Vec3 {
        let (a, b) = self.domain();
        let span = b - a;
        if !span.is_finite() || span == 0.0 {
            return Vec3::ZERO;
        }

        let h = 1e-6 * span.abs();
        let t0 = (t - h).max(a);
        let t1 = (t + h).min(b);
        if t1 == t0 {
            return Vec3::ZERO;
        }

        let p0 = self.point_at(t0);
        let p1 = self.point_at(t1);
        p1.sub_point(p0).mul_scalar(1.0 / (t1 - t0))
    }

    /// Returns the unit tangent vector at parameter `t`.
    /// Returns `None` if the derivative is zero or degenerate.
    #[must_use]
    fn tangent_at(&self, t: f64) -> Option<Vec3> {
        self.derivative_at(t).normalized()
    }
}

/// Result of sampling a curve at a parameter.
#[derive(Debug, Clone, Copy)]
pub struct CurveSample {
    /// The point on the curve at the given parameter.
    pub point: Point3,
    /// Unit tangent, or zero when the curve is degenerate there.
    pub tangent: Vec3,
    /// The parameter value at which the sample was taken.
    pub parameter: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ArcLengthEntry {
    parameter: f64,
    arc_length: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CubicSpan {
    p0: Point3,
    c0: Point3,
    c1: Point3,
    p1: Point3,
}

impl CubicSpan {
    fn point_at(&self, t: f64) -> Point3 {
        let u = 1.0 - t;
        let b0 = u * u * u;
        let b1 = 3.0 * u * u * t;
        let b2 = 3.0 * u * t * t;
        let b3 = t * t * t;
        Point3::new(
            b0 * self.p0.x + b1 * self.c0.x + b2 * self.c1.x + b3 * self.p1.x,
            b0 * self.p0.y + b1 * self.c0.y + b2 * self.c1.y + b3 * self.p1.y,
            b0 * self.p0.z + b1 * self.c0.z + b2 * self.c1.z + b3 * self.p1.z,
        )
    }

    fn derivative_at(&self, t: f64) -> Vec3 {
        let u = 1.0 - t;
        let d0 = self.c0.sub_point(self.p0);
        let d1 = self.c1.sub_point(self.c0);
        let d2 = self.p1.sub_point(self.c1);
        d0 * (3.0 * u * u) + d1 * (6.0 * u * t) + d2 * (3.0 * t * t)
    }

    fn chord(&self) -> Vec3 {
        self.p1.sub_point(self.p0)
    }
}

/// Interpolating spline through an ordered (optionally closed) point chain.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothSpline3 {
    knots: Vec<Point3>,
    spans: Vec<CubicSpan>,
    closed: bool,
    arc_table: Vec<ArcLengthEntry>,
}

const ARC_SAMPLES_PER_SPAN: usize = 48;
const MAX_ARC_SAMPLES: usize = 16_384;

impl SmoothSpline3 {
    /// Fits a spline through `points`.
    ///
    /// Consecutive duplicates are dropped, and for closed chains a trailing
    /// copy of the first point is ignored. Returns `None` when fewer than two
    /// distinct points remain; callers skip such chains.
    #[must_use]
    pub fn new(points: &[Point3], closed: bool) -> Option<Self> {
        let mut knots: Vec<Point3> = Vec::with_capacity(points.len());
        for &p in points {
            if !p.is_finite() {
                continue;
            }
            if knots
                .last()
                .is_some_and(|last| Tolerance::WELD.approx_eq_point3(*last, p))
            {
                continue;
            }
            knots.push(p);
        }
        if closed && knots.len() > 2 {
            if let (Some(first), Some(last)) = (knots.first(), knots.last()) {
                if Tolerance::WELD.approx_eq_point3(*first, *last) {
                    knots.pop();
                }
            }
        }
        if knots.len() < 2 {
            return None;
        }

        let spans = build_spans(&knots, closed);
        let mut spline = Self {
            knots,
            spans,
            closed,
            arc_table: Vec::new(),
        };
        spline.arc_table = spline.build_arc_length_table();
        Some(spline)
    }

    #[must_use]
    pub fn knots(&self) -> &[Point3] {
        &self.knots
    }

    #[must_use]
    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    /// Total arc length of the curve (including the closing span when closed).
    #[must_use]
    pub fn length(&self) -> f64 {
        self.arc_table.last().map_or(0.0, |e| e.arc_length)
    }

    /// Evaluates position and unit tangent at normalized parameter `t`.
    #[must_use]
    pub fn evaluate(&self, t: f64) -> CurveSample {
        let parameter = t.clamp(0.0, 1.0);
        let point = self.point_at(parameter);
        let tangent = self.tangent_at(parameter).unwrap_or(Vec3::ZERO);
        CurveSample {
            point,
            tangent,
            parameter,
        }
    }

    /// Converts an arc-length distance from the curve start into a normalized parameter.
    #[must_use]
    pub fn parameter_at_length(&self, distance: f64) -> f64 {
        let table = &self.arc_table;
        if table.len() < 2 || distance <= 0.0 {
            return 0.0;
        }

        let total = self.length();
        if distance >= total {
            return 1.0;
        }

        let idx = table
            .binary_search_by(|entry| entry.arc_length.total_cmp(&distance))
            .unwrap_or_else(|i| i.saturating_sub(1))
            .min(table.len() - 2);

        let e0 = table[idx];
        let e1 = table[idx + 1];
        let segment_length = e1.arc_length - e0.arc_length;
        if segment_length.abs() < 1e-14 {
            return e0.parameter;
        }

        let ratio = (distance - e0.arc_length) / segment_length;
        e0.parameter + (e1.parameter - e0.parameter) * ratio
    }

    fn locate(&self, t: f64) -> (usize, f64) {
        let n = self.spans.len();
        let scaled = t.clamp(0.0, 1.0) * n as f64;
        let index = (scaled.floor() as usize).min(n - 1);
        (index, scaled - index as f64)
    }

    fn build_arc_length_table(&self) -> Vec<ArcLengthEntry> {
        let samples = (self.spans.len() * ARC_SAMPLES_PER_SPAN).clamp(64, MAX_ARC_SAMPLES);
        let mut table = Vec::with_capacity(samples + 1);
        let mut prev = self.point_at(0.0);
        let mut cumulative = 0.0;
        table.push(ArcLengthEntry {
            parameter: 0.0,
            arc_length: 0.0,
        });

        for i in 1..=samples {
            let t = i as f64 / samples as f64;
            let curr = self.point_at(t);
            cumulative += curr.distance_to(prev);
            table.push(ArcLengthEntry {
                parameter: t,
                arc_length: cumulative,
            });
            prev = curr;
        }

        table
    }
}

impl Curve3 for SmoothSpline3 {
    fn point_at(&self, t: f64) -> Point3 {
        let (index, local) = self.locate(t);
        self.spans[index].point_at(local)
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn derivative_at(&self, t: f64) -> Vec3 {
        let (index, local) = self.locate(t);
        let span = &self.spans[index];
        let d = span.derivative_at(local);
        if d.length_squared() > Tolerance::ZERO_LENGTH.eps {
            return d * self.spans.len() as f64;
        }
        // Zero-length handles flatten the derivative at span ends.
        span.chord() * self.spans.len() as f64
    }
}

fn build_spans(knots: &[Point3], closed: bool) -> Vec<CubicSpan> {
    let n = knots.len();
    let span_count = if closed { n } else { n - 1 };
    let directions: Vec<Vec3> = (0..n).map(|i| auto_tangent(knots, i, closed)).collect();

    (0..span_count)
        .map(|i| {
            let j = (i + 1) % n;
            let p0 = knots[i];
            let p1 = knots[j];
            let handle = p1.distance_to(p0) / 3.0;
            CubicSpan {
                p0,
                c0: p0 + directions[i] * handle,
                c1: p1 - directions[j] * handle,
                p1,
            }
        })
        .collect()
}

/// Unit tangent direction at knot `i`: along `next - prev` for interior
/// knots, along the adjacent chord at open ends.
fn auto_tangent(knots: &[Point3], i: usize, closed: bool) -> Vec3 {
    let n = knots.len();
    let curr = knots[i];
    let prev = if i > 0 {
        Some(knots[i - 1])
    } else if closed {
        Some(knots[n - 1])
    } else {
        None
    };
    let next = if i + 1 < n {
        Some(knots[i + 1])
    } else if closed {
        Some(knots[0])
    } else {
        None
    };

    let direction = match (prev, next) {
        (Some(p), Some(q)) => q
            .sub_point(p)
            .normalized()
            .or_else(|| q.sub_point(curr).normalized()),
        (None, Some(q)) => q.sub_point(curr).normalized(),
        (Some(p), None) => curr.sub_point(p).normalized(),
        (None, None) => None,
    };
    direction.unwrap_or(Vec3::ZERO)
}
