//! Splits a drawn profile line into segments and assigns each survey point
//! its distance along the line.

use tracing::debug;

use crate::model::{Coord, SurveyPoint};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Coord,
    pub end: Coord,
    pub length: f64,
}

impl Segment {
    pub fn new(start: Coord, end: Coord) -> Self {
        Self {
            start,
            end,
            length: start.distance(end),
        }
    }

    /// Closest point on the segment to `p`. Zero-length segments collapse to `start`.
    pub fn closest_point(&self, p: Coord) -> Coord {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let len2 = dx * dx + dy * dy;
        if len2 == 0.0 {
            return self.start;
        }
        let t = (((p.x - self.start.x) * dx + (p.y - self.start.y) * dy) / len2).clamp(0.0, 1.0);
        Coord::new(self.start.x + t * dx, self.start.y + t * dy)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentedLine {
    pub segments: Vec<Segment>,
    pub total_length: f64,
}

impl SegmentedLine {
    pub fn cumulative_lengths(&self) -> Vec<f64> {
        cumulative_lengths(&self.segments)
    }
}

/// Along-line distance at the start of each segment.
pub fn cumulative_lengths(segments: &[Segment]) -> Vec<f64> {
    let mut cumulative = Vec::with_capacity(segments.len());
    let mut sum = 0.0;
    for segment in segments {
        cumulative.push(sum);
        sum += segment.length;
    }
    cumulative
}

/// One segment per consecutive vertex pair. A line with fewer than two
/// vertices has no segments and zero length.
pub fn segment(vertices: &[Coord]) -> SegmentedLine {
    let segments: Vec<Segment> = vertices
        .windows(2)
        .map(|pair| Segment::new(pair[0], pair[1]))
        .collect();
    let total_length = segments.iter().map(|s| s.length).sum();

    SegmentedLine {
        segments,
        total_length,
    }
}

#[derive(Debug, Clone, Default)]
pub struct Projection {
    pub updated_points: Vec<SurveyPoint>,
    pub duplicated_points: Vec<SurveyPoint>,
}

#[derive(Debug, Clone, Copy)]
pub struct ProjectionInput<'a> {
    pub segments: &'a [Segment],
    pub search_distance: f64,
}

/// Assigns along-line positions.
///
/// A point within the search distance of several segments (the inside of a
/// sharp bend) keeps the first position and gets one copy per additional
/// qualifying segment. Points that qualify for no segment are returned
/// without a position. With no segments, or a single survey point, every
/// point is placed at `search_distance`.
pub fn project_positions(points: Vec<SurveyPoint>, input: ProjectionInput<'_>) -> Projection {
    let ProjectionInput {
        segments,
        search_distance,
    } = input;

    if segments.is_empty() || points.len() <= 1 {
        let updated_points = points
            .into_iter()
            .map(|mut point| {
                point.set_profile_position(search_distance);
                point
            })
            .collect();
        return Projection {
            updated_points,
            duplicated_points: Vec::new(),
        };
    }

    let cumulative = cumulative_lengths(segments);

    let mut duplicated_points = Vec::new();
    let mut updated_points = Vec::with_capacity(points.len());
    for mut point in points {
        let location = point.location();
        for (segment, offset) in segments.iter().zip(&cumulative) {
            let closest = segment.closest_point(location);
            if closest.distance(location) >= search_distance {
                continue;
            }
            let position = offset + segment.start.distance(closest);
            if point.profile_position().is_some() {
                let mut copy = point.clone();
                copy.set_profile_position(position);
                duplicated_points.push(copy);
            } else {
                point.set_profile_position(position);
            }
        }
        updated_points.push(point);
    }

    debug!(
        "Projected {} survey points onto {} segments, {} duplicates",
        updated_points.len(),
        segments.len(),
        duplicated_points.len()
    );

    Projection {
        updated_points,
        duplicated_points,
    }
}

/// Survey points ready for layout: positioned, sorted along the line.
#[derive(Debug, Clone)]
pub struct PlacedPoints {
    pub points: Vec<SurveyPoint>,
    pub total_length: f64,
}

/// Projects, merges duplicates, drops unplaced points and sorts by position.
pub fn place_points(points: Vec<SurveyPoint>, line: &SegmentedLine, search_distance: f64) -> PlacedPoints {
    let degenerate = line.segments.is_empty() || points.len() <= 1 || line.total_length <= 0.0;
    let segments: &[Segment] = if degenerate { &[] } else { &line.segments };

    let projection = project_positions(
        points,
        ProjectionInput {
            segments,
            search_distance,
        },
    );

    let mut points: Vec<SurveyPoint> = projection
        .updated_points
        .into_iter()
        .chain(projection.duplicated_points)
        .filter(|point| {
            let placed = point.profile_position().is_some();
            if !placed {
                debug!("Survey point {} is outside the search distance", point.id());
            }
            placed
        })
        .collect();

    points.sort_by(|a, b| {
        let a = a.profile_position().unwrap_or(f64::INFINITY);
        let b = b.profile_position().unwrap_or(f64::INFINITY);
        a.total_cmp(&b)
    });

    let total_length = if degenerate {
        search_distance
    } else {
        line.total_length
    };

    PlacedPoints {
        points,
        total_length,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn point(id: &str, x: f64, y: f64) -> SurveyPoint {
        SurveyPoint::new(id, Coord::new(x, y), vec![-1.0, -0.5]).unwrap()
    }

    #[test]
    fn test_segment_lengths() {
        let line = segment(&[Coord::new(0.0, 0.0), Coord::new(3.0, 4.0), Coord::new(3.0, 10.0)]);
        assert_eq!(line.segments.len(), 2);
        assert!((line.total_length - 11.0).abs() < EPS);
        assert_eq!(line.cumulative_lengths(), vec![0.0, 5.0]);
    }

    #[test]
    fn test_single_vertex_line_is_empty() {
        let line = segment(&[Coord::new(1.0, 1.0)]);
        assert!(line.segments.is_empty());
        assert_eq!(line.total_length, 0.0);
    }

    #[test]
    fn test_closest_point_is_clamped() {
        let s = Segment::new(Coord::new(0.0, 0.0), Coord::new(10.0, 0.0));
        assert_eq!(s.closest_point(Coord::new(4.0, 3.0)), Coord::new(4.0, 0.0));
        assert_eq!(s.closest_point(Coord::new(-5.0, 1.0)), Coord::new(0.0, 0.0));
        assert_eq!(s.closest_point(Coord::new(15.0, -1.0)), Coord::new(10.0, 0.0));
    }

    #[test]
    fn test_projection_along_line() {
        let line = segment(&[Coord::new(0.0, 0.0), Coord::new(100.0, 0.0), Coord::new(100.0, 100.0)]);
        let projection = project_positions(
            vec![point("a", 20.0, 5.0), point("b", 95.0, 60.0)],
            ProjectionInput {
                segments: &line.segments,
                search_distance: 10.0,
            },
        );
        assert!(projection.duplicated_points.is_empty());
        assert!((projection.updated_points[0].profile_position().unwrap() - 20.0).abs() < EPS);
        assert!((projection.updated_points[1].profile_position().unwrap() - 160.0).abs() < EPS);
    }

    #[test]
    fn test_sharp_bend_duplicates_point() {
        // V shape, point inside the bend near both legs.
        let line = segment(&[Coord::new(0.0, 0.0), Coord::new(10.0, 0.0), Coord::new(0.0, 1.0)]);
        let projection = project_positions(
            vec![point("a", 8.0, 0.3), point("far", 50.0, 50.0)],
            ProjectionInput {
                segments: &line.segments,
                search_distance: 1.0,
            },
        );

        assert_eq!(projection.duplicated_points.len(), 1);
        let first = projection.updated_points[0].profile_position().unwrap();
        let second = projection.duplicated_points[0].profile_position().unwrap();
        assert!((first - 8.0).abs() < EPS);
        assert!(second > 10.0);
        assert_ne!(first, second);
        assert_eq!(projection.duplicated_points[0].id(), "a");
        assert!(projection.updated_points[1].profile_position().is_none());
    }

    #[test]
    fn test_duplicates_are_uncapped() {
        // Zig-zag with three short legs all close to the point.
        let line = segment(&[
            Coord::new(0.0, 0.0),
            Coord::new(1.0, 0.0),
            Coord::new(0.0, 0.5),
            Coord::new(1.0, 1.0),
        ]);
        let projection = project_positions(
            vec![point("a", 0.5, 0.4), point("b", 40.0, 0.0)],
            ProjectionInput {
                segments: &line.segments,
                search_distance: 1.0,
            },
        );
        assert_eq!(projection.duplicated_points.len(), 2);
    }

    #[test]
    fn test_single_point_degenerate_placement() {
        let line = segment(&[Coord::new(0.0, 0.0), Coord::new(100.0, 0.0)]);
        let placed = place_points(vec![point("a", 60.0, 0.0)], &line, 25.0);
        assert_eq!(placed.points.len(), 1);
        assert_eq!(placed.points[0].profile_position(), Some(25.0));
        assert_eq!(placed.total_length, 25.0);

        let placed = place_points(vec![point("a", 3.0, 3.0)], &SegmentedLine::default(), 35.36);
        assert_eq!(placed.points[0].profile_position(), Some(35.36));
        assert_eq!(placed.total_length, 35.36);
    }

    #[test]
    fn test_place_points_sorts_and_drops_unplaced() {
        let line = segment(&[Coord::new(0.0, 0.0), Coord::new(10.0, 0.0), Coord::new(0.0, 1.0)]);
        let placed = place_points(
            vec![point("late", 1.0, 0.95), point("a", 8.0, 0.3), point("far", 50.0, 50.0)],
            &line,
            1.0,
        );

        let ids: Vec<&str> = placed.points.iter().map(|p| p.id()).collect();
        assert!(!ids.contains(&"far"));
        let positions: Vec<f64> = placed
            .points
            .iter()
            .map(|p| p.profile_position().unwrap())
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(placed.total_length, line.total_length);
    }
}
