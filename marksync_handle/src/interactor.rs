// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The viewport side of a handle: pointer-to-world mapping.
//!
//! Rendering and camera management belong to the viewer. Handles only need
//! to project their world geometry to display coordinates for hit testing
//! and to unproject pointer positions at a given depth while dragging.
//!
//! Display coordinates are pixels with the origin at the top-left corner of
//! the viewport and `y` pointing down. The third component of a display
//! point is a normalized depth as produced by the projection.

use core::fmt;

use glam::{DMat4, DVec3};
use kurbo::{Point, Size};

/// Pointer-event source and projection of one viewport.
pub trait Interactor: fmt::Debug {
    /// Viewport size in pixels.
    fn viewport_size(&self) -> Size;

    /// Projects a world point to `(x, y, depth)` display coordinates.
    ///
    /// Returns `None` when the point cannot be projected (for example when it
    /// lies on the camera plane).
    fn world_to_display(&self, world: DVec3) -> Option<DVec3>;

    /// Unprojects `(x, y, depth)` display coordinates to a world point.
    fn display_to_world(&self, display: DVec3) -> Option<DVec3>;

    /// Returns `true` if `position` lies inside the viewport.
    fn contains(&self, position: Point) -> bool {
        let size = self.viewport_size();
        (0.0..=size.width).contains(&position.x) && (0.0..=size.height).contains(&position.y)
    }
}

/// An [`Interactor`] defined by a view-projection matrix and a viewport size.
///
/// This is enough for headless use and tests. Interactive viewers usually
/// implement [`Interactor`] on top of their own camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewProjection {
    view_proj: DMat4,
    inverse: DMat4,
    size: Size,
}

impl ViewProjection {
    /// Creates an interactor from a world-to-clip matrix.
    ///
    /// Returns `None` if the matrix cannot be inverted or the viewport is empty.
    pub fn new(view_proj: DMat4, size: Size) -> Option<Self> {
        if size.width <= 0.0 || size.height <= 0.0 || view_proj.determinant() == 0.0 {
            return None;
        }
        let inverse = view_proj.inverse();
        inverse.is_finite().then_some(Self {
            view_proj,
            inverse,
            size,
        })
    }

    /// An orthographic camera looking down `-z` at `center`.
    ///
    /// `half_height` is the world distance from the viewport center to its
    /// top edge; the horizontal extent follows the viewport aspect ratio.
    pub fn orthographic(center: DVec3, half_height: f64, size: Size) -> Option<Self> {
        const DEPTH: f64 = 1.0e4;
        if half_height <= 0.0 || size.height <= 0.0 {
            return None;
        }
        let half_width = half_height * size.width / size.height;
        let eye = center + DVec3::Z * DEPTH;
        let view = DMat4::look_at_rh(eye, center, DVec3::Y);
        let proj =
            DMat4::orthographic_rh(-half_width, half_width, -half_height, half_height, 0.0, 2.0 * DEPTH);
        Self::new(proj * view, size)
    }

    /// The world-to-clip matrix.
    pub fn matrix(&self) -> DMat4 {
        self.view_proj
    }
}

impl Interactor for ViewProjection {
    fn viewport_size(&self) -> Size {
        self.size
    }

    fn world_to_display(&self, world: DVec3) -> Option<DVec3> {
        let clip = self.view_proj * world.extend(1.0);
        if clip.w == 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if !ndc.is_finite() {
            return None;
        }
        Some(DVec3::new(
            (ndc.x * 0.5 + 0.5) * self.size.width,
            (0.5 - ndc.y * 0.5) * self.size.height,
            ndc.z,
        ))
    }

    fn display_to_world(&self, display: DVec3) -> Option<DVec3> {
        let ndc = DVec3::new(
            display.x / self.size.width * 2.0 - 1.0,
            1.0 - display.y / self.size.height * 2.0,
            display.z,
        );
        let world = self.inverse.project_point3(ndc);
        world.is_finite().then_some(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> ViewProjection {
        ViewProjection::orthographic(DVec3::ZERO, 10.0, Size::new(200.0, 200.0)).unwrap()
    }

    fn close(a: DVec3, b: DVec3) -> bool {
        (a - b).abs().max_element() < 1e-9
    }

    #[test]
    fn origin_projects_to_viewport_center() {
        let d = camera().world_to_display(DVec3::ZERO).unwrap();
        assert!((d.x - 100.0).abs() < 1e-9);
        assert!((d.y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn y_axis_points_up_on_screen() {
        let d = camera().world_to_display(DVec3::new(1.0, 1.0, 0.0)).unwrap();
        assert!((d.x - 110.0).abs() < 1e-9);
        assert!((d.y - 90.0).abs() < 1e-9);
    }

    #[test]
    fn unproject_inverts_project() {
        let cam = camera();
        let p = DVec3::new(3.0, -4.0, 2.5);
        let d = cam.world_to_display(p).unwrap();
        assert!(close(cam.display_to_world(d).unwrap(), p));
    }

    #[test]
    fn contains_checks_viewport() {
        let cam = camera();
        assert!(cam.contains(Point::new(0.0, 200.0)));
        assert!(!cam.contains(Point::new(-1.0, 10.0)));
        assert!(!cam.contains(Point::new(10.0, 201.0)));
    }

    #[test]
    fn degenerate_viewport_is_rejected() {
        assert!(ViewProjection::orthographic(DVec3::ZERO, 10.0, Size::new(0.0, 0.0)).is_none());
        assert!(ViewProjection::new(DMat4::ZERO, Size::new(10.0, 10.0)).is_none());
    }
}
