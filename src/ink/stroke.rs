//! Defines the [InkStroke] struct, a single continuous pen movement captured by an
//! [InkSurface].

use itertools::Itertools;
use vecmath::Vector2;

#[cfg(doc)]
use crate::ink::surface::InkSurface;

/// A single point in an ink stroke, in surface-local pixel coordinates with the origin at
/// the top-left corner of the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InkStrokePoint {
    pub x: f32,
    pub y: f32,
}

impl InkStrokePoint {
    /// Creates a new [InkStrokePoint] with the given coordinates.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub(crate) fn as_vector(&self) -> Vector2<f32> {
        [self.x, self.y]
    }
}

/// A single stroke in a signature, representing one continuous pen movement.
///
/// Points can only be appended by the owning surface while the pointer is pressed;
/// once the pointer is released the stroke is read-only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InkStroke {
    points: Vec<InkStrokePoint>,
}

impl InkStroke {
    #[inline]
    pub(crate) fn starting_at(point: InkStrokePoint) -> Self {
        Self {
            points: vec![point],
        }
    }

    /// Appends a point, returning the previous last point so the caller can render
    /// the connecting segment.
    #[inline]
    pub(crate) fn push(&mut self, point: InkStrokePoint) -> Option<InkStrokePoint> {
        let previous = self.points.last().copied();

        self.points.push(point);

        previous
    }

    /// Returns the points in this stroke, in capture order.
    #[inline]
    pub fn points(&self) -> &[InkStrokePoint] {
        &self.points
    }

    /// Returns the number of points in this stroke.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if this stroke contains no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns `true` if this stroke is a single tap without any movement.
    #[inline]
    pub fn is_dot(&self) -> bool {
        self.points.len() == 1
    }

    /// Returns an iterator over the line segments joining consecutive points in this stroke.
    pub fn segments(&self) -> impl Iterator<Item = (InkStrokePoint, InkStrokePoint)> + '_ {
        self.points.iter().copied().tuple_windows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_join_consecutive_points() {
        let mut stroke = InkStroke::starting_at(InkStrokePoint::new(0.0, 0.0));

        assert!(stroke.is_dot());
        assert_eq!(stroke.segments().count(), 0);

        assert_eq!(
            stroke.push(InkStrokePoint::new(1.0, 1.0)),
            Some(InkStrokePoint::new(0.0, 0.0))
        );
        stroke.push(InkStrokePoint::new(2.0, 0.0));

        let segments: Vec<_> = stroke.segments().collect();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].0, InkStrokePoint::new(1.0, 1.0));
        assert_eq!(segments[1].1, InkStrokePoint::new(2.0, 0.0));
    }
}
