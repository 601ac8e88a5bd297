//! Primitive rendering functions.
//!
//! Scan-line rasterization of the two dot shapes the map uses. Coordinates are physical
//! pixels as `f64`; a pixel is covered when its center lies inside the shape.

use crate::color::Rgba;
use crate::framebuffer::Framebuffer;
use crate::geometry::{bounds, hexagon_vertices, Point};
use serde::{Deserialize, Serialize};

/// Dot shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Filled circle of the given radius.
    #[default]
    Circle,
    /// Pointy-top hexagon, see [`hexagon_vertices`].
    Hexagon,
}

impl Shape {
    /// Rasterize this shape centered on `center`.
    pub fn fill(self, fb: &mut Framebuffer, center: Point, radius: f64, color: Rgba) {
        match self {
            Self::Circle => fill_circle(fb, center, radius, color),
            Self::Hexagon => fill_hexagon(fb, center, radius, color),
        }
    }
}

/// Draw a filled circle.
///
/// Circles smaller than a pixel still mark the pixel under their center so that dense
/// maps rendered at small sizes do not vanish.
pub fn fill_circle(fb: &mut Framebuffer, center: Point, radius: f64, color: Rgba) {
    if !(center.x.is_finite() && center.y.is_finite() && radius.is_finite()) || radius < 0.0 {
        return;
    }
    if radius < 0.5 {
        mark_center(fb, center, color);
        return;
    }

    // Rows outside the surface are skipped without visiting them.
    let top = (center.y - radius).floor().max(-1.0) as i64;
    let bottom = (center.y + radius).ceil().min(f64::from(fb.height()) + 1.0) as i64;
    for py in top..bottom {
        let dy = py as f64 + 0.5 - center.y;
        if dy.abs() > radius {
            continue;
        }
        let half = (radius * radius - dy * dy).sqrt();
        let x0 = (center.x - half).round() as i64;
        let x1 = (center.x + half).round() as i64;
        fb.fill_span(x0, x1, py, color);
    }
}

/// Draw a filled hexagon with the map's vertex layout.
pub fn fill_hexagon(fb: &mut Framebuffer, center: Point, radius: f64, color: Rgba) {
    if !(center.x.is_finite() && center.y.is_finite() && radius.is_finite()) || radius < 0.0 {
        return;
    }
    if radius < 0.25 {
        mark_center(fb, center, color);
        return;
    }
    fill_convex_polygon(fb, &hexagon_vertices(center, radius), color);
}

/// Draw a filled convex polygon.
///
/// Each scan line is sampled at pixel centers and filled between the leftmost and
/// rightmost edge crossing, which is exact for convex outlines.
pub fn fill_convex_polygon(fb: &mut Framebuffer, vertices: &[Point], color: Rgba) {
    if vertices.len() < 3 {
        return;
    }
    let Some(extent) = bounds(vertices) else {
        return;
    };
    let (min_y, max_y) = (extent.y, extent.y + extent.height);
    if !(min_y.is_finite() && max_y.is_finite()) {
        return;
    }

    let top = min_y.floor().max(-1.0) as i64;
    let bottom = max_y.ceil().min(f64::from(fb.height()) + 1.0) as i64;
    for py in top..bottom {
        let sample = py as f64 + 0.5;
        let mut left = f64::INFINITY;
        let mut right = f64::NEG_INFINITY;

        for (i, a) in vertices.iter().enumerate() {
            let b = vertices[(i + 1) % vertices.len()];
            let crosses = (a.y <= sample && sample < b.y) || (b.y <= sample && sample < a.y);
            if crosses {
                let x = a.x + (sample - a.y) * (b.x - a.x) / (b.y - a.y);
                left = left.min(x);
                right = right.max(x);
            }
        }

        if left <= right {
            fb.fill_span(left.round() as i64, right.round() as i64, py, color);
        }
    }
}

fn mark_center(fb: &mut Framebuffer, center: Point, color: Rgba) {
    if center.x >= 0.0 && center.y >= 0.0 {
        fb.blend_pixel(center.x as u32, center.y as u32, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> Framebuffer {
        let mut fb = Framebuffer::new(40, 40).unwrap();
        fb.clear(Rgba::WHITE);
        fb
    }

    #[test]
    fn test_fill_circle() {
        let mut fb = canvas();
        fill_circle(&mut fb, Point::new(20.0, 20.0), 5.0, Rgba::RED);

        assert_eq!(fb.get_pixel(20, 20), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(20, 16), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(20, 10), Some(Rgba::WHITE));
        assert_eq!(fb.get_pixel(15, 15), Some(Rgba::WHITE));

        // Roughly pi * r^2 pixels.
        let area = fb.count_color(Rgba::RED) as f64;
        assert!((area - 78.5).abs() < 12.0, "area {area}");
    }

    #[test]
    fn test_tiny_circle_marks_center() {
        let mut fb = canvas();
        fill_circle(&mut fb, Point::new(3.2, 4.7), 0.1, Rgba::BLUE);
        assert_eq!(fb.get_pixel(3, 4), Some(Rgba::BLUE));
        assert_eq!(fb.count_color(Rgba::BLUE), 1);
    }

    #[test]
    fn test_circle_clipped_at_edges() {
        let mut fb = canvas();
        fill_circle(&mut fb, Point::new(0.0, 0.0), 6.0, Rgba::RED);
        fill_circle(&mut fb, Point::new(45.0, 45.0), 8.0, Rgba::RED);
        assert_eq!(fb.get_pixel(0, 0), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(39, 39), Some(Rgba::RED));
    }

    #[test]
    fn test_huge_circle_covers_surface() {
        let mut fb = canvas();
        fill_circle(&mut fb, Point::new(20.0, 20.0), 1e12, Rgba::GREEN);
        assert_eq!(fb.count_color(Rgba::GREEN), 40 * 40);

        let mut fb = canvas();
        fill_circle(&mut fb, Point::new(20.0, -1e12), 1e9, Rgba::GREEN);
        assert_eq!(fb.count_color(Rgba::GREEN), 0);
    }

    #[test]
    fn test_non_finite_center_is_ignored() {
        let mut fb = canvas();
        fill_circle(&mut fb, Point::new(f64::NAN, 3.0), 4.0, Rgba::RED);
        fill_hexagon(&mut fb, Point::new(3.0, f64::INFINITY), 4.0, Rgba::RED);
        assert_eq!(fb.count_color(Rgba::RED), 0);
    }

    #[test]
    fn test_fill_hexagon() {
        let mut fb = canvas();
        // Spans x 20 +- 5.2, y 20 +- 6.
        fill_hexagon(&mut fb, Point::new(20.0, 20.0), 3.0, Rgba::GREEN);

        assert_eq!(fb.get_pixel(20, 20), Some(Rgba::GREEN));
        assert_eq!(fb.get_pixel(20, 15), Some(Rgba::GREEN));
        assert_eq!(fb.get_pixel(24, 20), Some(Rgba::GREEN));
        assert_eq!(fb.get_pixel(20, 27), Some(Rgba::WHITE));
        // Corners of the bounding box lie outside the slanted edges.
        assert_eq!(fb.get_pixel(15, 14), Some(Rgba::WHITE));
        assert_eq!(fb.get_pixel(25, 25), Some(Rgba::WHITE));
    }

    #[test]
    fn test_fill_convex_polygon_square() {
        let mut fb = canvas();
        let square = [
            Point::new(10.0, 10.0),
            Point::new(20.0, 10.0),
            Point::new(20.0, 20.0),
            Point::new(10.0, 20.0),
        ];
        fill_convex_polygon(&mut fb, &square, Rgba::BLUE);
        assert_eq!(fb.count_color(Rgba::BLUE), 100);
    }

    #[test]
    fn test_degenerate_polygon() {
        let mut fb = canvas();
        fill_convex_polygon(&mut fb, &[Point::new(1.0, 1.0), Point::new(5.0, 5.0)], Rgba::RED);
        assert_eq!(fb.count_color(Rgba::RED), 0);
    }

    #[test]
    fn test_shape_dispatch() {
        let mut circle = canvas();
        let mut hexagon = canvas();
        Shape::Circle.fill(&mut circle, Point::new(20.0, 20.0), 4.0, Rgba::RED);
        Shape::Hexagon.fill(&mut hexagon, Point::new(20.0, 20.0), 4.0, Rgba::RED);
        assert!(circle.count_color(Rgba::RED) > 0);
        assert!(hexagon.count_color(Rgba::RED) > circle.count_color(Rgba::RED));
    }
}
