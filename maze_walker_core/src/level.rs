use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Position, WorldPosition, element::Element, map::Map};

/// Default height offset for key props, slightly below floor level so they
/// read differently from walls.
pub const DEFAULT_KEY_ELEVATION: f32 = -0.25;

/// Errors raised by level queries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    #[error("Map has no start position ('S')")]
    NoStartPosition,
}

/// A key prop placed in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneKey {
    pub id: usize,
    pub location: WorldPosition,
}

/// A door cell, kept for renderers that tint doors by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneDoor {
    pub id: usize,
    pub position: Position,
}

/// Read-only spatial queries over a loaded map.
///
/// Keys and doors are gathered once on construction; the map is never
/// modified afterwards.
#[derive(Debug, Clone)]
pub struct Level {
    map: Map,
    keys: Vec<SceneKey>,
    doors: Vec<SceneDoor>,
}

impl Level {
    pub fn new(map: Map) -> Self {
        Self::with_key_elevation(map, DEFAULT_KEY_ELEVATION)
    }

    /// Builds a level placing key props at `key_elevation` on the z axis.
    pub fn with_key_elevation(map: Map, key_elevation: f32) -> Self {
        let mut keys = Vec::new();
        let mut doors = Vec::new();
        let mut starts = 0usize;

        for ((x, y), element) in map.enumerate() {
            match element {
                Element::Key { id } => keys.push(SceneKey {
                    id,
                    location: WorldPosition::new(x as f32, y as f32, key_elevation),
                }),
                Element::Door { id } => doors.push(SceneDoor {
                    id,
                    position: Position::new(x, y),
                }),
                Element::Start => starts += 1,
                _ => {}
            }
        }

        if starts > 1 {
            warn!(starts, "map has several start cells, the first in row-major order is used");
        }
        debug!(
            width = map.width(),
            height = map.height(),
            keys = keys.len(),
            doors = doors.len(),
            "level ready"
        );

        Level { map, keys, doors }
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    /// Keys in row-major order.
    pub fn keys(&self) -> &[SceneKey] {
        &self.keys
    }

    /// Doors in row-major order.
    pub fn doors(&self) -> &[SceneDoor] {
        &self.doors
    }

    /// World position of the first Start cell in row-major order.
    pub fn start_position(&self) -> Result<WorldPosition, LevelError> {
        self.map
            .enumerate()
            .find(|(_, element)| *element == Element::Start)
            .map(|((x, y), _)| Position::new(x, y).to_world())
            .ok_or(LevelError::NoStartPosition)
    }

    /// Every Finish cell, row-major.
    pub fn finish_cells(&self) -> Vec<Position> {
        self.map
            .enumerate()
            .filter(|(_, element)| *element == Element::Finish)
            .map(|((x, y), _)| Position::new(x, y))
            .collect()
    }

    /// Rounds a world coordinate to the grid cell it falls in.
    ///
    /// Rounding is half away from zero (`f32::round`). Returns `None` for
    /// points outside the grid, including the padded half-cell border.
    pub fn cell_at(&self, x: f32, y: f32) -> Option<Position> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let max_x = self.map.width() as f32 - 0.5;
        let max_y = self.map.height() as f32 - 0.5;
        if x < -0.5 || y < -0.5 || x > max_x || y > max_y {
            return None;
        }

        let (rx, ry) = (x.round(), y.round());
        // -0.5 rounds to -1 and width - 0.5 rounds to width.
        if rx < 0.0 || ry < 0.0 {
            return None;
        }
        let position = Position::new(rx as usize, ry as usize);
        self.map.contains(position).then_some(position)
    }

    /// Point-sample collision test at a world position.
    ///
    /// Walls and doors collide; everything else, and anything outside the
    /// grid, does not.
    pub fn is_collision(&self, x: f32, y: f32) -> bool {
        self.cell_at(x, y)
            .is_some_and(|cell| self.map[cell].is_blocking())
    }

    /// Whether the world position rounds onto a Finish cell.
    pub fn is_finish(&self, x: f32, y: f32) -> bool {
        self.cell_at(x, y)
            .is_some_and(|cell| self.map[cell] == Element::Finish)
    }
}
