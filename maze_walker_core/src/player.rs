use serde::{Deserialize, Serialize};

use crate::{
    Position, WorldPosition,
    config::WalkerConfig,
    level::{Level, LevelError},
};

/// Turning intent for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Look {
    #[default]
    None,
    Left,
    Right,
}

/// Forward/backward intent for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Strafe {
    #[default]
    None,
    Forward,
    Backward,
}

/// What the player wants to do this tick. Reset to the default every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Movement {
    pub look: Look,
    pub strafe: Strafe,
}

impl Movement {
    pub fn new(look: Look, strafe: Strafe) -> Self {
        Self { look, strafe }
    }

    pub fn is_idle(&self) -> bool {
        self.look == Look::None && self.strafe == Strafe::None
    }
}

/// Result of applying one tick of movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Idle,
    Turned,
    Moved,
    /// The target point collides; position is unchanged.
    Blocked,
    /// Moved onto a Finish cell.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub position: WorldPosition,
    /// Heading in radians. Angle 0 faces negative x.
    pub angle: f32,
}

impl Player {
    pub fn new(position: WorldPosition, angle: f32) -> Self {
        Self { position, angle }
    }

    /// Places a player on the level's start cell, facing angle 0.
    pub fn spawn(level: &Level) -> Result<Self, LevelError> {
        Ok(Self::new(level.start_position()?, 0.0))
    }

    /// Unit heading vector on the floor plane.
    pub fn direction(&self) -> (f32, f32) {
        (-self.angle.cos(), self.angle.sin())
    }

    pub fn on_ground(&self) -> bool {
        self.position.z == 0.0
    }

    pub fn cell(&self, level: &Level) -> Option<Position> {
        level.cell_at(self.position.x, self.position.y)
    }

    /// Applies one tick: look first, then strafe. A strafe whose target point
    /// collides is dropped.
    pub fn step(&mut self, movement: Movement, level: &Level, config: &WalkerConfig) -> StepOutcome {
        match movement.look {
            Look::None => {}
            Look::Left => self.angle -= config.look_speed,
            Look::Right => self.angle += config.look_speed,
        }

        let sign = match movement.strafe {
            Strafe::None => {
                return if movement.look == Look::None {
                    StepOutcome::Idle
                } else {
                    StepOutcome::Turned
                };
            }
            Strafe::Forward => 1.0,
            Strafe::Backward => -1.0,
        };

        let (dx, dy) = self.direction();
        let x = self.position.x + sign * dx * config.strafe_speed;
        let y = self.position.y + sign * dy * config.strafe_speed;
        if level.is_collision(x, y) {
            return StepOutcome::Blocked;
        }

        self.position.x = x;
        self.position.y = y;
        if level.is_finish(x, y) {
            StepOutcome::Finished
        } else {
            StepOutcome::Moved
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::MapParser;

    fn level(text: &str) -> Level {
        Level::new(MapParser::parse_str(text).unwrap())
    }

    fn forward() -> Movement {
        Movement::new(Look::None, Strafe::Forward)
    }

    #[test]
    fn spawns_on_start_cell() {
        let level = level("3 1\n0S0\n");
        let player = Player::spawn(&level).unwrap();
        assert_eq!(player.position, WorldPosition::new(1.0, 0.0, 0.0));
        assert_eq!(player.angle, 0.0);
        assert!(player.on_ground());
        assert_eq!(player.cell(&level), Some(Position::new(1, 0)));
    }

    #[test]
    fn spawn_without_start_fails() {
        assert_eq!(
            Player::spawn(&level("1 1\n0\n")),
            Err(LevelError::NoStartPosition)
        );
    }

    #[test]
    fn idle_and_turning() {
        let level = level("1 1\nS\n");
        let config = WalkerConfig::default();
        let mut player = Player::spawn(&level).unwrap();

        assert_eq!(
            player.step(Movement::default(), &level, &config),
            StepOutcome::Idle
        );
        assert_eq!(
            player.step(Movement::new(Look::Right, Strafe::None), &level, &config),
            StepOutcome::Turned
        );
        assert_eq!(player.angle, config.look_speed);
        player.step(Movement::new(Look::Left, Strafe::None), &level, &config);
        player.step(Movement::new(Look::Left, Strafe::None), &level, &config);
        assert_eq!(player.angle, -config.look_speed);
        assert_eq!(player.position, WorldPosition::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn walls_stop_forward_motion() {
        let level = level("3 1\nWS0\n");
        let config = WalkerConfig::default();
        let mut player = Player::spawn(&level).unwrap();

        let mut last = StepOutcome::Idle;
        for _ in 0..20 {
            last = player.step(forward(), &level, &config);
            assert!(player.position.x > 0.5, "walked into the wall");
        }
        assert_eq!(last, StepOutcome::Blocked);
        assert_eq!(player.cell(&level), Some(Position::new(1, 0)));
    }

    #[test]
    fn blocked_step_leaves_position_unchanged() {
        let level = level("2 1\nWS\n");
        let config = WalkerConfig {
            strafe_speed: 1.0,
            ..WalkerConfig::default()
        };
        let mut player = Player::spawn(&level).unwrap();
        assert_eq!(player.step(forward(), &level, &config), StepOutcome::Blocked);
        assert_eq!(player.position, WorldPosition::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn backward_moves_against_heading() {
        let level = level("3 1\n0S0\n");
        let config = WalkerConfig::default();
        let mut player = Player::spawn(&level).unwrap();
        assert_eq!(
            player.step(Movement::new(Look::None, Strafe::Backward), &level, &config),
            StepOutcome::Moved
        );
        assert!((player.position.x - 1.07).abs() < 1e-5);
        assert_eq!(player.position.y, 0.0);
    }

    #[test]
    fn reaching_finish_is_reported() {
        let level = level("3 1\nGS0\n");
        let config = WalkerConfig::default();
        let mut player = Player::spawn(&level).unwrap();

        let finished = (0..20).any(|_| player.step(forward(), &level, &config) == StepOutcome::Finished);
        assert!(finished);
        assert_eq!(player.cell(&level), Some(Position::new(0, 0)));
    }

    #[test]
    fn keys_do_not_block() {
        let level = level("3 1\naS0\n");
        let config = WalkerConfig {
            strafe_speed: 1.0,
            ..WalkerConfig::default()
        };
        let mut player = Player::spawn(&level).unwrap();
        assert_eq!(player.step(forward(), &level, &config), StepOutcome::Moved);
        assert_eq!(player.cell(&level), Some(Position::new(0, 0)));
    }
}
