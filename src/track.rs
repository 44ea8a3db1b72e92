//! Track geometry and the text formats it is loaded from.

use crate::error::{LineError, TrackError};
use crate::math::{LineSegment2d, Point2d};
use crate::surface::TrackSurface;
use itertools::Itertools;
use std::path::Path;

/// The static geometry of a race track.
#[derive(Clone, Debug, Default)]
pub struct Track {
    /// The wall segments bounding the drivable surface.
    walls: Vec<LineSegment2d>,
    /// The checkpoint gates, in order.
    gates: Vec<LineSegment2d>,
    /// The rasterised track, if there is one.
    surface: Option<TrackSurface>,
}

impl Track {
    /// Creates an empty track.
    pub fn new() -> Self {
        Default::default()
    }

    /// Loads a track from an inner and an outer boundary file and a checkpoint file.
    pub fn load(
        inner: impl AsRef<Path>,
        outer: impl AsRef<Path>,
        checkpoints: impl AsRef<Path>,
    ) -> Result<Self, TrackError> {
        let mut track = Self::new();
        track.add_boundary(&parse_polyline(&read(inner.as_ref())?));
        track.add_boundary(&parse_polyline(&read(outer.as_ref())?));
        for gate in parse_gates(&read(checkpoints.as_ref())?) {
            track.add_gate(gate);
        }
        log::info!(
            "loaded track with {} walls and {} gates",
            track.walls.len(),
            track.gates.len()
        );
        Ok(track)
    }

    /// Adds a closed boundary polyline; the last point connects back to the first.
    pub fn add_boundary(&mut self, points: &[Point2d]) {
        self.walls.extend(closed_polyline(points));
    }

    /// Adds a single wall segment.
    pub fn add_wall(&mut self, wall: LineSegment2d) {
        self.walls.push(wall);
    }

    /// Appends a checkpoint gate.
    pub fn add_gate(&mut self, gate: LineSegment2d) {
        self.gates.push(gate);
    }

    /// Sets the rasterised track surface.
    pub fn set_surface(&mut self, surface: TrackSurface) {
        self.surface = Some(surface);
    }

    /// The wall segments.
    pub fn walls(&self) -> &[LineSegment2d] {
        &self.walls
    }

    /// The checkpoint gates, in order.
    pub fn gates(&self) -> &[LineSegment2d] {
        &self.gates
    }

    /// The rasterised track surface, if there is one.
    pub fn surface(&self) -> Option<&TrackSurface> {
        self.surface.as_ref()
    }
}

fn read(path: &Path) -> Result<String, TrackError> {
    std::fs::read_to_string(path).map_err(|source| TrackError::Io {
        path: path.to_owned(),
        source,
    })
}

/// Converts a closed polyline into segments, wrapping the last point back to the first.
pub fn closed_polyline(points: &[Point2d]) -> Vec<LineSegment2d> {
    if points.len() < 2 {
        return vec![];
    }
    points
        .iter()
        .circular_tuple_windows()
        .map(|(a, b)| LineSegment2d::from_ends(*a, *b))
        .collect()
}

/// Parses one point per line in the form `x,y`. Malformed lines are skipped.
pub fn parse_polyline(text: &str) -> Vec<Point2d> {
    parse_lines(text, parse_point)
}

/// Parses one gate per line in the form `(x1,y1),(x2,y2)`. Malformed lines are skipped.
pub fn parse_gates(text: &str) -> Vec<LineSegment2d> {
    parse_lines(text, parse_segment)
}

fn parse_lines<T>(text: &str, parse: impl Fn(&str) -> Result<T, LineError>) -> Vec<T> {
    text.lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .filter_map(|(num, line)| match parse(line) {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("skipping line {num} {line:?}: {err}");
                None
            }
        })
        .collect()
}

fn parse_point(text: &str) -> Result<Point2d, LineError> {
    let fields = text.split(',').map(str::trim).collect::<Vec<_>>();
    let &[x, y] = fields.as_slice() else {
        return Err(LineError::FieldCount {
            expected: 2,
            found: fields.len(),
        });
    };
    let coord = |s: &str| {
        s.parse::<i64>()
            .map(|v| v as f64)
            .map_err(|_| LineError::Coordinate(s.to_owned()))
    };
    Ok(Point2d::new(coord(x)?, coord(y)?))
}

fn parse_segment(text: &str) -> Result<LineSegment2d, LineError> {
    let (a, b) = text.split_once("),(").ok_or(LineError::SegmentSyntax)?;
    let a = a.strip_prefix('(').ok_or(LineError::SegmentSyntax)?;
    let b = b.strip_suffix(')').ok_or(LineError::SegmentSyntax)?;
    Ok(LineSegment2d::from_ends(parse_point(a)?, parse_point(b)?))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn polyline_wraps() {
        let points = parse_polyline("0, 0\n10, 0\n10, 10\n");
        let segs = closed_polyline(&points);
        assert_eq!(segs.len(), 3);
        assert_eq!(segs[2].start, Point2d::new(10.0, 10.0));
        assert_eq!(segs[2].end, Point2d::new(0.0, 0.0));
    }

    #[test]
    fn degenerate_polylines() {
        assert!(closed_polyline(&[]).is_empty());
        assert!(closed_polyline(&[Point2d::new(1.0, 1.0)]).is_empty());
        assert_eq!(
            closed_polyline(&[Point2d::new(0.0, 0.0), Point2d::new(1.0, 0.0)]).len(),
            2
        );
    }

    #[test]
    fn malformed_points_are_skipped() {
        let points = parse_polyline("1,2\n3\nfoo, 4\n\n5 , 6\n7,8,9\n");
        assert_eq!(points, vec![Point2d::new(1.0, 2.0), Point2d::new(5.0, 6.0)]);
    }

    #[test]
    fn point_errors() {
        assert_eq!(
            parse_point("1,2,3"),
            Err(LineError::FieldCount {
                expected: 2,
                found: 3
            })
        );
        assert_eq!(parse_point("1.5,2"), Err(LineError::Coordinate("1.5".into())));
    }

    #[test]
    fn gates() {
        let gates = parse_gates(
            "(655,417),(690,417)\n(655,538), (690,538)\n655,538,690,538\n(1,2),(3,4)",
        );
        assert_eq!(gates.len(), 2);
        assert_eq!(gates[0].start, Point2d::new(655.0, 417.0));
        assert_eq!(gates[0].end, Point2d::new(690.0, 417.0));
        assert_eq!(gates[1].end, Point2d::new(3.0, 4.0));
    }

    #[test]
    fn builds_walls_from_boundaries() {
        let mut track = Track::new();
        let square = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]
            .map(|(x, y)| Point2d::new(x, y));
        track.add_boundary(&square);
        track.add_boundary(&square[..2]);
        assert_eq!(track.walls().len(), 6);
        assert!(track.gates().is_empty());
        assert!(track.surface().is_none());
    }

    #[test]
    fn missing_file() {
        let err = Track::load("/nonexistent/inner.txt", "outer.txt", "gates.txt").unwrap_err();
        assert!(matches!(err, TrackError::Io { .. }));
    }
}
