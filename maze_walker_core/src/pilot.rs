use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap, VecDeque},
    f32::consts::{PI, TAU},
};

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::debug;

use crate::{
    Position,
    config::WalkerConfig,
    level::Level,
    player::{Look, Movement, Player, Strafe},
};

/// What a pilot can see when choosing its next movement.
#[derive(Debug)]
pub struct PilotView<'a> {
    pub level: &'a Level,
    pub player: &'a Player,
    pub config: &'a WalkerConfig,
}

/// Trait defining something that steers the player.
pub trait Pilot {
    /// Determines the movement for the next tick.
    /// `&mut self` lets a pilot keep state between ticks (e.g. a planned route).
    fn next_movement(&mut self, view: &PilotView) -> Movement;
}

/// Wanders by picking a random look/strafe combination every tick.
#[derive(Debug)]
pub struct RandomPilot {
    rng: StdRng,
}

impl RandomPilot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Pilot for RandomPilot {
    fn next_movement(&mut self, _view: &PilotView) -> Movement {
        let look = match self.rng.random_range(0..3) {
            0 => Look::Left,
            1 => Look::Right,
            _ => Look::None,
        };
        // Bias towards walking forward so the walk actually covers ground.
        let strafe = match self.rng.random_range(0..4) {
            0 => Strafe::None,
            1 => Strafe::Backward,
            _ => Strafe::Forward,
        };
        Movement::new(look, strafe)
    }
}

/// Walks to the nearest reachable Finish cell along an A* route through
/// cell centres.
#[derive(Debug, Default)]
pub struct PlanningPilot {
    current_plan: VecDeque<Position>, // Cells still to visit
}

impl PlanningPilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining waypoints, nearest first.
    pub fn plan(&self) -> impl Iterator<Item = &Position> {
        self.current_plan.iter()
    }

    /// Returns manhattan distance between two positions
    fn manhattan_distance(a: &Position, b: &Position) -> usize {
        a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
    }

    /// A* over non-blocking cells, 4-connected.
    pub fn a_star_path(level: &Level, start: Position, goal: Position) -> Option<Vec<Position>> {
        // For priority queue
        #[derive(Clone, Eq, PartialEq)]
        struct PrioritizedItem {
            priority: usize,
            position: Position,
        }

        impl Ord for PrioritizedItem {
            fn cmp(&self, other: &Self) -> Ordering {
                // Reverse ordering for min-heap behavior
                other.priority.cmp(&self.priority)
            }
        }

        impl PartialOrd for PrioritizedItem {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        let mut frontier = BinaryHeap::new();
        let mut came_from: HashMap<Position, Position> = HashMap::new();
        let mut cost_so_far: HashMap<Position, usize> = HashMap::new();

        frontier.push(PrioritizedItem {
            priority: 0,
            position: start,
        });
        cost_so_far.insert(start, 0);

        let mut goal_reached = false;

        while let Some(PrioritizedItem {
            position: current, ..
        }) = frontier.pop()
        {
            if current == goal {
                goal_reached = true;
                break;
            }

            let new_cost = cost_so_far.get(&current).copied().unwrap_or(usize::MAX) + 1;
            for neighbor in Self::walkable_neighbors(level, current) {
                let better = cost_so_far
                    .get(&neighbor)
                    .is_none_or(|&known| new_cost < known);
                if better {
                    cost_so_far.insert(neighbor, new_cost);
                    frontier.push(PrioritizedItem {
                        priority: new_cost + Self::manhattan_distance(&neighbor, &goal),
                        position: neighbor,
                    });
                    came_from.insert(neighbor, current);
                }
            }
        }

        if !goal_reached {
            return None;
        }

        // Reconstruct path
        let mut path = vec![goal];
        let mut current = goal;
        while current != start {
            current = *came_from.get(&current)?;
            path.push(current);
        }
        path.reverse();
        Some(path)
    }

    fn walkable_neighbors(level: &Level, position: Position) -> Vec<Position> {
        let map = level.map();
        let directions = [(0, 1), (0, -1), (1, 0), (-1, 0)];

        directions
            .iter()
            .filter_map(|&(dx, dy)| {
                let x = position.x.checked_add_signed(dx)?;
                let y = position.y.checked_add_signed(dy)?;
                let element = map.get(x, y)?;
                (!element.is_blocking()).then_some(Position::new(x, y))
            })
            .collect()
    }

    /// Shortest route to any Finish cell.
    fn plan_to_nearest_finish(level: &Level, start: Position) -> Option<Vec<Position>> {
        level
            .finish_cells()
            .into_iter()
            .filter_map(|goal| Self::a_star_path(level, start, goal))
            .min_by_key(|path| path.len())
    }

    /// Turns towards `target` until the heading error is within one look
    /// step, then walks.
    fn steer(player: &Player, target: Position, config: &WalkerConfig) -> Movement {
        let dx = target.x as f32 - player.position.x;
        let dy = target.y as f32 - player.position.y;
        // Heading vector is (-cos a, sin a).
        let desired = dy.atan2(-dx);
        let error = wrap_angle(desired - player.angle);

        if error.abs() > config.look_speed {
            let look = if error > 0.0 { Look::Right } else { Look::Left };
            Movement::new(look, Strafe::None)
        } else {
            Movement::new(Look::None, Strafe::Forward)
        }
    }
}

impl Pilot for PlanningPilot {
    fn next_movement(&mut self, view: &PilotView) -> Movement {
        let player = view.player;
        let Some(current) = player.cell(view.level) else {
            return Movement::default();
        };

        if self.current_plan.is_empty() {
            if let Some(path) = Self::plan_to_nearest_finish(view.level, current) {
                debug!(from = ?current, steps = path.len() - 1, "planned route to finish");
                // Skip the first position (current position)
                self.current_plan.extend(path.into_iter().skip(1));
            }
        }

        while let Some(&waypoint) = self.current_plan.front() {
            let dx = waypoint.x as f32 - player.position.x;
            let dy = waypoint.y as f32 - player.position.y;
            if dx.hypot(dy) < view.config.strafe_speed {
                self.current_plan.pop_front();
                continue;
            }
            return Self::steer(player, waypoint, view.config);
        }

        Movement::default()
    }
}

/// Wraps an angle into (-PI, PI].
fn wrap_angle(angle: f32) -> f32 {
    let mut wrapped = angle % TAU;
    if wrapped > PI {
        wrapped -= TAU;
    } else if wrapped <= -PI {
        wrapped += TAU;
    }
    wrapped
}
