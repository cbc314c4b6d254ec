//! Planar coordinate type and polyline shapes.
//!
//! Network coordinates are metres in a local Cartesian frame, as produced by
//! the topology importer.  `f64` keeps sub-millimetre precision over city
//! extents, which matters when lane lengths are derived from shapes.

/// A point in the network's local Cartesian frame (metres).
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in metres.
    #[inline]
    pub fn distance(self, other: Point2) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Linear interpolation; `t = 0` is `self`, `t = 1` is `other`.
    #[inline]
    pub fn lerp(self, other: Point2, t: f64) -> Point2 {
        Point2::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }
}

impl std::fmt::Display for Point2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// An open polyline used for rendering and hit-testing.
///
/// A junction's shape is its outline; a lane's shape is its centre line.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shape {
    points: Vec<Point2>,
}

impl Shape {
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `true` if every vertex has finite coordinates.
    pub fn is_finite(&self) -> bool {
        self.points.iter().all(|p| p.is_finite())
    }

    /// Sum of segment lengths.  Zero for shapes with fewer than two points.
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| w[0].distance(w[1]))
            .sum()
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for an empty shape.
    pub fn bounds(&self) -> Option<(Point2, Point2)> {
        let first = *self.points.first()?;
        Some(self.points.iter().fold((first, first), |(lo, hi), p| {
            (
                Point2::new(lo.x.min(p.x), lo.y.min(p.y)),
                Point2::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        }))
    }

    /// Bounding-box containment, used to pick junctions by point.
    pub fn bounds_contain(&self, p: Point2) -> bool {
        match self.bounds() {
            Some((lo, hi)) => p.x >= lo.x && p.x <= hi.x && p.y >= lo.y && p.y <= hi.y,
            None => false,
        }
    }

    /// The point `distance` metres along the polyline, clamped to its ends.
    ///
    /// Returns `None` for an empty shape.
    pub fn point_at(&self, distance: f64) -> Option<Point2> {
        let first = *self.points.first()?;
        if distance <= 0.0 {
            return Some(first);
        }
        let mut remaining = distance;
        for w in self.points.windows(2) {
            let seg = w[0].distance(w[1]);
            if remaining <= seg && seg > 0.0 {
                return Some(w[0].lerp(w[1], remaining / seg));
            }
            remaining -= seg;
        }
        self.points.last().copied()
    }
}

impl From<Vec<Point2>> for Shape {
    fn from(points: Vec<Point2>) -> Self {
        Shape::new(points)
    }
}
