//! Geometric primitives shared by the vector and raster renderers.

/// `√3`, the ratio between a hexagon's half-width and its radius parameter.
pub const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// A 2D point with floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point {
    /// Origin point (0, 0).
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate the distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned rectangle, top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X coordinate of the top-left corner.
    pub x: f64,
    /// Y coordinate of the top-left corner.
    pub y: f64,
    /// Width of the rectangle.
    pub width: f64,
    /// Height of the rectangle.
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Vertices of the hexagon drawn for a map cell.
///
/// For radius `r` the vertices are `(x ± √3·r, y ∓ r)`, `(x, y ± 2r)` in the order
/// right-top, right-bottom, bottom, left-bottom, left-top, top. Neighbouring cells
/// in a row sit `2√3·r` apart and share their vertical edges.
#[must_use]
pub fn hexagon_vertices(center: Point, radius: f64) -> [Point; 6] {
    let Point { x, y } = center;
    let w = SQRT_3 * radius;
    [
        Point::new(x + w, y - radius),
        Point::new(x + w, y + radius),
        Point::new(x, y + 2.0 * radius),
        Point::new(x - w, y + radius),
        Point::new(x - w, y - radius),
        Point::new(x, y - 2.0 * radius),
    ]
}

/// Axis-aligned bounds of a set of points.
#[must_use]
pub fn bounds(points: &[Point]) -> Option<Rect> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert_relative_eq!(p1.distance(p2), 5.0);
    }

    #[test]
    fn test_bounds() {
        let rect = bounds(&[Point::new(1.0, 4.0), Point::new(-2.0, 0.5), Point::new(3.0, 2.0)])
            .unwrap();
        assert_eq!(rect, Rect::new(-2.0, 0.5, 5.0, 3.5));
    }

    #[test]
    fn test_hexagon_vertices_symmetric() {
        let c = Point::new(10.0, 20.0);
        let v = hexagon_vertices(c, 0.25);
        // Opposite vertices mirror through the center.
        for i in 0..3 {
            let a = v[i];
            let b = v[i + 3];
            assert_relative_eq!((a.x + b.x) / 2.0, c.x, epsilon = 1e-12);
            assert_relative_eq!((a.y + b.y) / 2.0, c.y, epsilon = 1e-12);
        }
        // All vertices equidistant from the center.
        let d = v[0].distance(c);
        for p in v {
            assert_relative_eq!(p.distance(c), d, epsilon = 1e-12);
        }
        assert_relative_eq!(d, 2.0 * 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_hexagon_neighbours_touch() {
        let r = 0.5;
        let left = hexagon_vertices(Point::new(0.0, 0.0), r);
        let right = hexagon_vertices(Point::new(2.0 * SQRT_3 * r, 0.0), r);
        let left_bounds = bounds(&left).unwrap();
        let right_bounds = bounds(&right).unwrap();
        // Right edge of the left hexagon is the left edge of its neighbour.
        assert_relative_eq!(
            left_bounds.x + left_bounds.width,
            right_bounds.x,
            epsilon = 1e-12
        );
        assert_relative_eq!(left[0].x, right[4].x, epsilon = 1e-12);
        assert_relative_eq!(left[1].x, right[3].x, epsilon = 1e-12);
    }

    #[test]
    fn test_bounds_empty() {
        assert!(bounds(&[]).is_none());
    }
}
