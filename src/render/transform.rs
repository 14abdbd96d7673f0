// SPDX-License-Identifier: GPL-3.0-only

//! Model transform stack applied to reprojected positions

use glam::{Mat4, Vec3};

/// Orientation applied while the renderer is bound
///
/// Flips y so the sensor's y-down image becomes y-up, flips x unless the
/// output should be mirrored, then applies the world rotation (degrees)
/// about x, y and z.
pub fn bind_transform(mirror: bool, world_rotation: Vec3) -> Mat4 {
    let mut transform = Mat4::from_scale(Vec3::new(1.0, -1.0, 1.0));
    if !mirror {
        transform *= Mat4::from_scale(Vec3::new(-1.0, 1.0, 1.0));
    }
    transform
        * Mat4::from_rotation_x(world_rotation.x.to_radians())
        * Mat4::from_rotation_y(world_rotation.y.to_radians())
        * Mat4::from_rotation_z(world_rotation.z.to_radians())
}

/// Push/pop stack of model transforms
#[derive(Debug, Clone)]
pub struct TransformStack {
    current: Mat4,
    saved: Vec<Mat4>,
}

impl Default for TransformStack {
    fn default() -> Self {
        Self {
            current: Mat4::IDENTITY,
            saved: Vec::new(),
        }
    }
}

impl TransformStack {
    pub fn current(&self) -> Mat4 {
        self.current
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn push(&mut self) {
        self.saved.push(self.current);
    }

    /// Restore the last pushed transform; false when nothing was pushed
    pub fn pop(&mut self) -> bool {
        match self.saved.pop() {
            Some(previous) => {
                self.current = previous;
                true
            }
            None => false,
        }
    }

    /// Post-multiply the current transform
    pub fn apply(&mut self, transform: Mat4) {
        self.current *= transform;
    }
}
