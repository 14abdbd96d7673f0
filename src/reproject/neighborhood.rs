// SPDX-License-Identifier: GPL-3.0-only

//! Depth neighborhood sampling and vertex validity

use crate::calibration::BorderClip;
use crate::ingest::DepthFrame;
use glam::Vec2;

/// Neighbor offsets in units of the simplification step:
/// right, down, left, up, lower-left, upper-right
const NEIGHBOR_OFFSETS: [Vec2; 6] = [
    Vec2::new(1.0, 0.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(-1.0, 0.0),
    Vec2::new(0.0, -1.0),
    Vec2::new(-1.0, 1.0),
    Vec2::new(1.0, -1.0),
];

/// Center depth plus its six neighbors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighborhood {
    pub center: f32,
    pub neighbors: [f32; 6],
}

impl Neighborhood {
    /// Sample around a vertex at depth-pixel position `vertex`
    pub fn sample(vertex: Vec2, frame: &DepthFrame, border: &BorderClip, step: Vec2) -> Self {
        let center = depth_at_position(frame, border, texel_center(vertex));
        let neighbors = NEIGHBOR_OFFSETS
            .map(|offset| depth_at_position(frame, border, texel_center(vertex + offset * step)));
        Self { center, neighbors }
    }

    /// All samples strictly inside `(near, far)` and no neighbor differs
    /// from the center by `edge` or more
    pub fn is_valid(&self, near: f32, far: f32, edge: f32) -> bool {
        let in_range = |d: f32| d > near && d < far;
        in_range(self.center)
            && self
                .neighbors
                .iter()
                .all(|&d| in_range(d) && (d - self.center).abs() < edge)
    }
}

#[inline]
fn texel_center(position: Vec2) -> Vec2 {
    position.floor() + Vec2::splat(0.5)
}

/// Depth under a texel-center position, 0 outside the border clip or frame
#[inline]
fn depth_at_position(frame: &DepthFrame, border: &BorderClip, position: Vec2) -> f32 {
    let width = frame.width() as f32;
    let height = frame.height() as f32;

    let inside_border = position.x >= width * border.left
        && position.x <= width * border.right
        && position.y >= height * border.top
        && position.y <= height * border.bottom;
    if !inside_border || position.x < 0.0 || position.y < 0.0 {
        return 0.0;
    }

    frame
        .depth_at(position.x as u32, position.y as u32)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_positions() {
        // Encode each texel's index so the sampled neighbor is identifiable
        let samples: Vec<u16> = (0..25).collect();
        let frame = DepthFrame::new(5, 5, samples).unwrap();
        let hood = Neighborhood::sample(
            Vec2::new(2.0, 2.0),
            &frame,
            &BorderClip::default(),
            Vec2::ONE,
        );
        assert_eq!(hood.center, 12.0);
        // right, down, left, up, lower-left, upper-right
        assert_eq!(hood.neighbors, [13.0, 17.0, 11.0, 7.0, 16.0, 8.0]);
    }

    #[test]
    fn test_outside_frame_reads_zero() {
        let frame = DepthFrame::filled(3, 3, 500);
        let hood = Neighborhood::sample(Vec2::ZERO, &frame, &BorderClip::default(), Vec2::ONE);
        assert_eq!(hood.center, 500.0);
        assert_eq!(hood.neighbors[2], 0.0);
        assert_eq!(hood.neighbors[3], 0.0);
    }

    #[test]
    fn test_border_clip_reads_zero() {
        let frame = DepthFrame::filled(10, 10, 500);
        let border = BorderClip {
            left: 0.5,
            ..Default::default()
        };
        let hood = Neighborhood::sample(Vec2::new(2.0, 5.0), &frame, &border, Vec2::ONE);
        assert_eq!(hood.center, 0.0);
        let hood = Neighborhood::sample(Vec2::new(7.0, 5.0), &frame, &border, Vec2::ONE);
        assert_eq!(hood.center, 500.0);
    }

    #[test]
    fn test_step_scales_offsets() {
        let samples: Vec<u16> = (0..25).collect();
        let frame = DepthFrame::new(5, 5, samples).unwrap();
        let hood = Neighborhood::sample(
            Vec2::new(2.0, 2.0),
            &frame,
            &BorderClip::default(),
            Vec2::new(2.0, 2.0),
        );
        assert_eq!(hood.neighbors[0], 14.0);
        assert_eq!(hood.neighbors[3], 2.0);
    }
}
