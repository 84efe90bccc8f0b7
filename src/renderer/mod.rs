//! Drawing interface
//!
//! The simulation only emits primitives through [`Viewer`]; a graphical
//! backend implements it. [`DrawList`] records the calls for headless runs.

pub mod draw_list;
pub mod shapes;

pub use draw_list::{DrawCommand, DrawList};

use glam::DVec2;

/// RGBA, each channel in [0, 1]
pub type Color = [f32; 4];

pub const PATH_COLOR: Color = [0.3, 0.3, 0.3, 1.0];
pub const PROGRESS_COLOR: Color = [0.8, 0.3, 0.3, 1.0];
pub const OBSTACLE_COLOR: Color = [0.5, 0.5, 0.5, 1.0];
pub const DETECTED_OBSTACLE_COLOR: Color = [0.9, 0.6, 0.2, 1.0];
pub const VESSEL_COLOR: Color = [0.9, 0.9, 0.9, 1.0];
pub const REFERENCE_COLOR: Color = [0.2, 0.8, 0.3, 1.0];

/// Sink for 2D drawing primitives in world coordinates
pub trait Viewer {
    fn draw_polyline(&mut self, points: &[DVec2], color: Color, width: f64);

    fn draw_circle(&mut self, center: DVec2, radius: f64, color: Color, filled: bool);

    /// Closed filled polygon
    fn draw_shape(&mut self, vertices: &[DVec2], color: Color);

    fn draw_arrow(&mut self, origin: DVec2, angle: f64, length: f64, color: Color) {
        let tip = origin + DVec2::from_angle(angle) * length;
        self.draw_polyline(&[origin, tip], color, 2.0);
        let head = shapes::arrow_head(tip, angle, (0.15 * length).clamp(0.0, 7.0));
        self.draw_shape(&head, color);
    }
}
