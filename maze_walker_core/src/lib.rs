use serde::{Deserialize, Serialize};

pub mod config;
pub mod element;
pub mod level;
pub mod map;
pub mod parser;
pub mod pilot;
pub mod player;

pub use config::{ConfigError, WalkerConfig};
pub use element::Element;
pub use level::{Level, LevelError, SceneDoor, SceneKey};
pub use map::{Grid, GridError, Map};
pub use parser::{MapParser, ParseError};
pub use player::{Look, Movement, Player, StepOutcome, Strafe};

/// Integer grid coordinates of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Centre of this cell in world space, on the floor plane.
    pub fn to_world(self) -> WorldPosition {
        WorldPosition::new(self.x as f32, self.y as f32, 0.0)
    }
}

/// Continuous world-space coordinates. One unit is one grid cell and cell
/// centres sit on integer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPosition {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WorldPosition {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}
