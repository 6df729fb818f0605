//! Arc-length parameterised sampling over an ordered list of segments.
//!
//! Each segment is tessellated once at construction; its polyline length
//! feeds the cumulative table used to turn a normalised progress `t` into a
//! point. Inside the owning segment the position is interpolated linearly
//! between the anchors, the curve itself is not re-evaluated.

use super::core::{Point3, Tolerance, Vec3};
use super::curve::polyline_length;
use super::segment::{CurveSegment, SegmentTag};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathError {
    #[error("path requires at least one segment")]
    Empty,
    #[error("segment {index} has non-finite coordinates")]
    NonFiniteSegment { index: usize },
    #[error("segment {index} has degenerate length {length}")]
    DegenerateSegment { index: usize, length: f64 },
    #[error("path length overflows at segment {index}")]
    LengthOverflow { index: usize },
}

/// Where a progress value lands inside the path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentCursor {
    pub index: usize,
    pub local_t: f64,
    pub tag: SegmentTag,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    segments: Vec<CurveSegment>,
    polylines: Vec<Vec<Point3>>,
    segment_lengths: Vec<f64>,
    cumulative_lengths: Vec<f64>,
    total_length: f64,
}

/// Running sum of `lengths`. Fails as soon as the sum stops being finite.
fn cumulative(lengths: &[f64]) -> Result<Vec<f64>, PathError> {
    let mut total = 0.0;
    let mut sums = Vec::with_capacity(lengths.len());
    for (index, length) in lengths.iter().enumerate() {
        total += length;
        if !total.is_finite() {
            return Err(PathError::LengthOverflow { index });
        }
        sums.push(total);
    }
    Ok(sums)
}

impl Path {
    /// Builds a path, tessellating every segment with `steps` chords.
    ///
    /// # Errors
    /// Rejects an empty segment list and any segment whose coordinates are
    /// not finite or whose polyline length is zero or not finite, and a total
    /// length that overflows.
    pub fn build(segments: Vec<CurveSegment>, steps: usize) -> Result<Self, PathError> {
        if segments.is_empty() {
            return Err(PathError::Empty);
        }

        let mut polylines = Vec::with_capacity(segments.len());
        let mut segment_lengths = Vec::with_capacity(segments.len());

        for (index, segment) in segments.iter().enumerate() {
            if !segment.is_finite() {
                return Err(PathError::NonFiniteSegment { index });
            }
            let polyline = segment.tessellate(steps);
            let length = polyline_length(&polyline);
            if !length.is_finite() || Tolerance::ZERO_LENGTH.is_zero_length(length) {
                return Err(PathError::DegenerateSegment { index, length });
            }
            polylines.push(polyline);
            segment_lengths.push(length);
        }

        let cumulative_lengths = cumulative(&segment_lengths)?;
        let total = cumulative_lengths.last().copied().unwrap_or(0.0);

        log::debug!(
            "path built: {} segments, {steps} steps each, length {total:.3}",
            segments.len()
        );

        Ok(Self {
            segments,
            polylines,
            segment_lengths,
            cumulative_lengths,
            total_length: total,
        })
    }

    #[must_use]
    pub fn segments(&self) -> &[CurveSegment] {
        &self.segments
    }

    /// Tessellated polyline of every segment, in path order.
    #[must_use]
    pub fn polylines(&self) -> &[Vec<Point3>] {
        &self.polylines
    }

    #[must_use]
    pub fn segment_lengths(&self) -> &[f64] {
        &self.segment_lengths
    }

    #[must_use]
    pub fn cumulative_lengths(&self) -> &[f64] {
        &self.cumulative_lengths
    }

    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    /// All tessellated points joined into one strip. Shared anchors between
    /// consecutive segments are emitted once.
    #[must_use]
    pub fn joined_points(&self) -> Vec<Point3> {
        let mut points: Vec<Point3> = Vec::new();
        for polyline in &self.polylines {
            let skip = match (points.last(), polyline.first()) {
                (Some(last), Some(first)) if Tolerance::DEFAULT.approx_eq_point3(*last, *first) => 1,
                _ => 0,
            };
            points.extend(polyline.iter().skip(skip).copied());
        }
        points
    }

    /// Finds the owning segment for progress `t`. A target that lands exactly
    /// on a boundary belongs to the later segment.
    #[must_use]
    pub fn segment_at_progress(&self, t: f64) -> SegmentCursor {
        let t = clamp_progress(t);
        let last = self.segments.len() - 1;
        if t >= 1.0 {
            return self.cursor(last, 1.0);
        }

        let target = t * self.total_length;
        let mut accumulated = 0.0;
        for (index, &next) in self.cumulative_lengths.iter().enumerate() {
            if target < next || index == last {
                let local_t = (target - accumulated) / self.segment_lengths[index];
                return self.cursor(index, local_t.clamp(0.0, 1.0));
            }
            accumulated = next;
        }
        self.cursor(last, 1.0)
    }

    /// Maps progress `t` to a point. Out-of-range input is clamped, `0`
    /// returns the first start anchor and `1` the last end anchor exactly.
    #[must_use]
    pub fn position_at_progress(&self, t: f64) -> Point3 {
        let t = clamp_progress(t);
        if t <= 0.0 {
            return self.segments[0].start;
        }
        if t >= 1.0 {
            return self.segments[self.segments.len() - 1].end;
        }
        let cursor = self.segment_at_progress(t);
        let segment = &self.segments[cursor.index];
        segment.start.lerp(segment.end, cursor.local_t)
    }

    /// Unit travel direction at progress `t`: the chord of the owning
    /// segment, or of its polyline when the anchors coincide.
    #[must_use]
    pub fn heading_at_progress(&self, t: f64) -> Vec3 {
        let cursor = self.segment_at_progress(t);
        let segment = &self.segments[cursor.index];
        segment
            .end
            .sub_point(segment.start)
            .normalized()
            .or_else(|| polyline_heading(&self.polylines[cursor.index], cursor.local_t))
            .unwrap_or(Vec3::Z)
    }

    fn cursor(&self, index: usize, local_t: f64) -> SegmentCursor {
        SegmentCursor {
            index,
            local_t,
            tag: self.segments[index].tag,
        }
    }
}

/// NaN maps to the start of the path, infinities to the nearest end.
#[must_use]
pub fn clamp_progress(t: f64) -> f64 {
    if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) }
}

fn polyline_heading(points: &[Point3], local_t: f64) -> Option<Vec3> {
    let chords = points.len().checked_sub(1)?;
    if chords == 0 {
        return None;
    }
    let start = ((local_t * chords as f64).floor() as usize).min(chords - 1);
    points[start..]
        .windows(2)
        .chain(points[..=start].windows(2).rev())
        .find_map(|pair| pair[1].sub_point(pair[0]).normalized())
}
