//! Recording viewer for headless runs and tests

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::{Color, Viewer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    Polyline {
        points: Vec<DVec2>,
        color: Color,
        width: f64,
    },
    Circle {
        center: DVec2,
        radius: f64,
        color: Color,
        filled: bool,
    },
    Shape {
        vertices: Vec<DVec2>,
        color: Color,
    },
}

/// Frame of recorded draw commands, in call order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn circles(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
    }

    /// Serialize the frame for an external plotting tool
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Viewer for DrawList {
    fn draw_polyline(&mut self, points: &[DVec2], color: Color, width: f64) {
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            color,
            width,
        });
    }

    fn draw_circle(&mut self, center: DVec2, radius: f64, color: Color, filled: bool) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
            filled,
        });
    }

    fn draw_shape(&mut self, vertices: &[DVec2], color: Color) {
        self.commands.push(DrawCommand::Shape {
            vertices: vertices.to_vec(),
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::VESSEL_COLOR;

    #[test]
    fn test_records_in_order() {
        let mut list = DrawList::new();
        list.draw_circle(DVec2::ZERO, 1.0, VESSEL_COLOR, true);
        list.draw_arrow(DVec2::ZERO, 0.0, 10.0, VESSEL_COLOR);
        assert_eq!(list.len(), 3);
        assert!(matches!(list.commands[0], DrawCommand::Circle { .. }));
        assert!(matches!(list.commands[1], DrawCommand::Polyline { .. }));
        assert!(matches!(list.commands[2], DrawCommand::Shape { .. }));
        assert_eq!(list.circles().count(), 1);
        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn test_to_json() {
        let mut list = DrawList::new();
        list.draw_polyline(&[DVec2::ZERO, DVec2::X], VESSEL_COLOR, 1.0);
        let json = list.to_json().unwrap();
        assert!(json.contains("Polyline"));
    }
}
