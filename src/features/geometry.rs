//! Vector geometries and their centroids
//!
//! Centroids follow the usual GIS definition: the highest dimension part
//! decides. Polygons use the area-weighted shoelace centroid with holes
//! subtracted, lines the length-weighted segment midpoints, points the mean.
//! Degenerate shapes (zero area or length) fall back to the vertex mean.

use crate::coordinate::Point;

/// A linear ring or path
pub type Ring = Vec<Point>;

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point),
    MultiPoint(Vec<Point>),
    LineString(Ring),
    MultiLineString(Vec<Ring>),
    /// Exterior ring followed by holes
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

impl Geometry {
    /// Centroid of the geometry, `None` when it has no vertices
    pub fn centroid(&self) -> Option<Point> {
        match self {
            Geometry::Point(point) => Some(*point),
            Geometry::MultiPoint(points) => vertex_mean(points.iter()),
            Geometry::LineString(line) => line_centroid(std::slice::from_ref(line)),
            Geometry::MultiLineString(lines) => line_centroid(lines),
            Geometry::Polygon(rings) => polygon_centroid(std::slice::from_ref(rings)),
            Geometry::MultiPolygon(polygons) => polygon_centroid(polygons),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::LineString(_) => "LineString",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }
}

fn vertex_mean<'a>(points: impl Iterator<Item = &'a Point>) -> Option<Point> {
    let (mut sum_x, mut sum_y, mut count) = (0.0, 0.0, 0usize);
    for point in points {
        sum_x += point.x;
        sum_y += point.y;
        count += 1;
    }

    if count == 0 {
        None
    } else {
        Some(Point::new(sum_x / count as f64, sum_y / count as f64))
    }
}

fn line_centroid(lines: &[Ring]) -> Option<Point> {
    let (mut sum_x, mut sum_y, mut total) = (0.0, 0.0, 0.0);

    for line in lines {
        for segment in line.windows(2) {
            let (a, b) = (segment[0], segment[1]);
            let length = (b.x - a.x).hypot(b.y - a.y);
            sum_x += length * (a.x + b.x) / 2.0;
            sum_y += length * (a.y + b.y) / 2.0;
            total += length;
        }
    }

    if total > 0.0 {
        Some(Point::new(sum_x / total, sum_y / total))
    } else {
        vertex_mean(lines.iter().flatten())
    }
}

/// Signed shoelace area and first moments of a ring, relative to `origin`
fn ring_moments(ring: &[Point], origin: Point) -> (f64, f64, f64) {
    let (mut area2, mut moment_x, mut moment_y) = (0.0, 0.0, 0.0);

    for segment in ring.windows(2) {
        let (x0, y0) = (segment[0].x - origin.x, segment[0].y - origin.y);
        let (x1, y1) = (segment[1].x - origin.x, segment[1].y - origin.y);
        let cross = x0 * y1 - x1 * y0;
        area2 += cross;
        moment_x += (x0 + x1) * cross;
        moment_y += (y0 + y1) * cross;
    }

    // Close the ring if the input did not repeat the first vertex
    if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
        if first != last {
            let (x0, y0) = (last.x - origin.x, last.y - origin.y);
            let (x1, y1) = (first.x - origin.x, first.y - origin.y);
            let cross = x0 * y1 - x1 * y0;
            area2 += cross;
            moment_x += (x0 + x1) * cross;
            moment_y += (y0 + y1) * cross;
        }
    }

    (area2 / 2.0, moment_x / 6.0, moment_y / 6.0)
}

fn polygon_centroid(polygons: &[Vec<Ring>]) -> Option<Point> {
    let origin = polygons.iter().flatten().flatten().next().copied()?;
    let (mut area, mut moment_x, mut moment_y) = (0.0, 0.0, 0.0);

    for rings in polygons {
        for (index, ring) in rings.iter().enumerate() {
            let (ring_area, ring_x, ring_y) = ring_moments(ring, origin);
            // Exterior rings add, holes subtract, whatever their winding
            let sign = if (index == 0) == (ring_area >= 0.0) { 1.0 } else { -1.0 };
            area += sign * ring_area;
            moment_x += sign * ring_x;
            moment_y += sign * ring_y;
        }
    }

    if area.abs() > f64::EPSILON {
        Some(Point::new(origin.x + moment_x / area, origin.y + moment_y / area))
    } else {
        vertex_mean(polygons.iter().flatten().flatten())
    }
}
