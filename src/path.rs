use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::PathError;

/// Default resolution of the arc length lookup table.
pub const DEFAULT_ARC_LENGTH_DIVISIONS: usize = 200;

const TANGENT_DELTA: f32 = 0.0001;

/// Parameterization used between control points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveType {
    /// Uniform Catmull-Rom with configurable tension.
    #[default]
    CatmullRom,
    /// Knot spacing by the square root of chord length.
    Centripetal,
    /// Knot spacing by chord length.
    Chordal,
}

/// Immutable open Catmull-Rom spline with an arc length table.
///
/// `point(t)` walks the raw curve parameter, which moves faster through long
/// segments. `point_at(u)` maps `u` through the arc length table first, so
/// equal steps of `u` cover equal distances along the curve.
#[derive(Debug, Clone, PartialEq)]
pub struct CatmullRomPath {
    points: Vec<Vec3>,
    curve_type: CurveType,
    tension: f32,
    arc_lengths: Vec<f32>,
}

impl CatmullRomPath {
    pub fn new(points: Vec<Vec3>, curve_type: CurveType, tension: f32) -> Result<Self, PathError> {
        Self::with_arc_length_divisions(points, curve_type, tension, DEFAULT_ARC_LENGTH_DIVISIONS)
    }

    pub fn with_arc_length_divisions(
        points: Vec<Vec3>,
        curve_type: CurveType,
        tension: f32,
        divisions: usize,
    ) -> Result<Self, PathError> {
        if points.len() < 2 {
            return Err(PathError::TooFewPoints(points.len()));
        }
        if divisions == 0 {
            return Err(PathError::NoDivisions);
        }
        let mut path = Self {
            points,
            curve_type,
            tension,
            arc_lengths: Vec::new(),
        };
        path.arc_lengths = path.measure(divisions);
        Ok(path)
    }

    pub fn control_points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn curve_type(&self) -> CurveType {
        self.curve_type
    }

    /// Cumulative distances sampled at evenly spaced curve parameters.
    pub fn arc_lengths(&self) -> &[f32] {
        &self.arc_lengths
    }

    /// Total length of the curve.
    pub fn length(&self) -> f32 {
        self.arc_lengths.last().copied().unwrap_or(0.0)
    }

    /// Evaluates the curve at raw parameter `t` in `[0, 1]`.
    pub fn point(&self, t: f32) -> Vec3 {
        let points = &self.points;
        let count = points.len();
        let scaled = (count - 1) as f32 * t;
        let mut index = scaled.floor() as isize;
        let mut weight = scaled - index as f32;

        if weight == 0.0 && index == count as isize - 1 {
            index = count as isize - 2;
            weight = 1.0;
        }
        let index = index.clamp(0, count as isize - 2) as usize;

        let p0 = if index > 0 {
            points[index - 1]
        } else {
            points[0] - points[1] + points[0]
        };
        let p1 = points[index];
        let p2 = points[index + 1];
        let p3 = if index + 2 < count {
            points[index + 2]
        } else {
            points[count - 1] - points[count - 2] + points[count - 1]
        };

        let poly = match self.curve_type {
            CurveType::CatmullRom => CubicPoly::uniform(p0, p1, p2, p3, self.tension),
            CurveType::Centripetal => CubicPoly::chord_spaced(p0, p1, p2, p3, 0.25),
            CurveType::Chordal => CubicPoly::chord_spaced(p0, p1, p2, p3, 0.5),
        };
        poly.eval(weight)
    }

    /// Evaluates the curve at normalized distance `u` in `[0, 1]`.
    pub fn point_at(&self, u: f32) -> Vec3 {
        self.point(self.u_to_t(u))
    }

    /// Unit tangent at raw parameter `t`, by central difference.
    pub fn tangent(&self, t: f32) -> Vec3 {
        let t1 = (t - TANGENT_DELTA).max(0.0);
        let t2 = (t + TANGENT_DELTA).min(1.0);
        (self.point(t2) - self.point(t1)).normalize_or_zero()
    }

    pub fn tangent_at(&self, u: f32) -> Vec3 {
        self.tangent(self.u_to_t(u))
    }

    /// Samples `divisions + 1` points at evenly spaced curve parameters,
    /// both endpoints included.
    pub fn points(&self, divisions: usize) -> Vec<Vec3> {
        if divisions == 0 {
            return vec![self.point(0.0)];
        }
        (0..=divisions)
            .map(|d| self.point(d as f32 / divisions as f32))
            .collect()
    }

    /// Maps normalized distance `u` to the raw curve parameter covering it.
    pub fn u_to_t(&self, u: f32) -> f32 {
        let lengths = &self.arc_lengths;
        let last = lengths.len() - 1;
        let target = u.clamp(0.0, 1.0) * lengths[last];

        let i = lengths
            .partition_point(|&length| length <= target)
            .saturating_sub(1);
        if lengths[i] == target || i == last {
            return i as f32 / last as f32;
        }
        let before = lengths[i];
        let segment = lengths[i + 1] - before;
        if segment <= 0.0 {
            return i as f32 / last as f32;
        }
        (i as f32 + (target - before) / segment) / last as f32
    }

    fn measure(&self, divisions: usize) -> Vec<f32> {
        let mut lengths = Vec::with_capacity(divisions + 1);
        let mut previous = self.point(0.0);
        let mut total = 0.0;
        lengths.push(0.0);
        for d in 1..=divisions {
            let current = self.point(d as f32 / divisions as f32);
            total += current.distance(previous);
            lengths.push(total);
            previous = current;
        }
        lengths
    }
}

/// Cubic `c0 + c1 t + c2 t^2 + c3 t^3` evaluated on whole vectors.
#[derive(Debug, Clone, Copy)]
struct CubicPoly {
    c0: Vec3,
    c1: Vec3,
    c2: Vec3,
    c3: Vec3,
}

impl CubicPoly {
    fn hermite(x0: Vec3, x1: Vec3, t0: Vec3, t1: Vec3) -> Self {
        Self {
            c0: x0,
            c1: t0,
            c2: -3.0 * x0 + 3.0 * x1 - 2.0 * t0 - t1,
            c3: 2.0 * x0 - 2.0 * x1 + t0 + t1,
        }
    }

    fn uniform(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, tension: f32) -> Self {
        Self::hermite(p1, p2, tension * (p2 - p0), tension * (p3 - p1))
    }

    fn chord_spaced(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, power: f32) -> Self {
        let mut dt0 = p0.distance_squared(p1).powf(power);
        let mut dt1 = p1.distance_squared(p2).powf(power);
        let mut dt2 = p2.distance_squared(p3).powf(power);

        // coincident points
        if dt1 < 1e-4 {
            dt1 = 1.0;
        }
        if dt0 < 1e-4 {
            dt0 = dt1;
        }
        if dt2 < 1e-4 {
            dt2 = dt1;
        }

        let t1 = (p1 - p0) / dt0 - (p2 - p0) / (dt0 + dt1) + (p2 - p1) / dt1;
        let t2 = (p2 - p1) / dt1 - (p3 - p1) / (dt1 + dt2) + (p3 - p2) / dt2;
        Self::hermite(p1, p2, t1 * dt1, t2 * dt1)
    }

    fn eval(&self, t: f32) -> Vec3 {
        let t2 = t * t;
        let t3 = t2 * t;
        self.c0 + self.c1 * t + self.c2 * t2 + self.c3 * t3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vessel() -> CatmullRomPath {
        let points = [
            Vec3::new(163.0, 452.0, 56.0),
            Vec3::new(63.0, 471.0, 180.0),
            Vec3::new(-29.0, 470.0, 16.0),
            Vec3::new(-144.0, 465.0, 181.0),
            Vec3::new(-257.0, 471.0, 42.0),
        ]
        .into_iter()
        .map(|p| p / 1000.0)
        .collect();
        CatmullRomPath::new(points, CurveType::CatmullRom, 0.5).unwrap()
    }

    #[test]
    fn interpolates_control_points() {
        let path = vessel();
        let points = path.control_points().to_vec();
        for (i, control) in points.iter().enumerate() {
            let t = i as f32 / (points.len() - 1) as f32;
            assert!(path.point(t).distance(*control) < 1e-5, "point {i}");
        }
    }

    #[test]
    fn every_curve_type_hits_endpoints() {
        let points = vessel().control_points().to_vec();
        for curve_type in [CurveType::Centripetal, CurveType::Chordal] {
            let path = CatmullRomPath::new(points.clone(), curve_type, 0.5).unwrap();
            assert!(path.point(0.0).distance(points[0]) < 1e-5);
            assert!(path.point(1.0).distance(points[4]) < 1e-5);
        }
    }

    #[test]
    fn sampling_returns_divisions_plus_one() {
        let path = vessel();
        assert_eq!(path.points(1000).len(), 1001);
        assert_eq!(path.points(1).len(), 2);
        assert_eq!(path.points(0).len(), 1);
    }

    #[test]
    fn arc_length_mapping_is_monotonic_and_anchored() {
        let path = vessel();
        assert_eq!(path.u_to_t(0.0), 0.0);
        assert!((path.u_to_t(1.0) - 1.0).abs() < 1e-6);
        assert!(path.point_at(0.0).distance(path.point(0.0)) < 1e-6);
        assert!(path.point_at(1.0).distance(path.point(1.0)) < 1e-5);

        let mut previous = 0.0;
        for step in 1..=100 {
            let t = path.u_to_t(step as f32 / 100.0);
            assert!(t >= previous);
            previous = t;
        }
    }

    #[test]
    fn arc_length_sampling_is_evenly_spaced() {
        let path = vessel();
        let step = path.length() / 50.0;
        for i in 0..50 {
            let a = path.point_at(i as f32 / 50.0);
            let b = path.point_at((i + 1) as f32 / 50.0);
            assert!((a.distance(b) - step).abs() < step * 0.05, "segment {i}");
        }
    }

    #[test]
    fn point_queries_are_continuous() {
        let path = vessel();
        let epsilon = 1e-3;
        for i in 0..999 {
            let t = i as f32 / 1000.0;
            let jump = path.point(t).distance(path.point(t + epsilon));
            assert!(jump < path.length() * epsilon * 4.0, "jump at {t}");
        }
    }

    #[test]
    fn length_exceeds_straight_chords() {
        let path = vessel();
        let points = path.control_points();
        let chords: f32 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
        assert!(path.length() >= chords * 0.999);
        assert_eq!(path.arc_lengths().len(), DEFAULT_ARC_LENGTH_DIVISIONS + 1);
    }

    #[test]
    fn tangents_are_unit_length() {
        let path = vessel();
        for i in 0..=10 {
            let tangent = path.tangent_at(i as f32 / 10.0);
            assert!((tangent.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn rejects_single_point() {
        assert_eq!(
            CatmullRomPath::new(vec![Vec3::ZERO], CurveType::CatmullRom, 0.5),
            Err(PathError::TooFewPoints(1))
        );
    }
}
