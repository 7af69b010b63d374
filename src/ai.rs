//! Computer opponent
//!
//! Picks the own-colour piece sitting closest to any pocket, aims the
//! striker at the ghost point behind it, then spoils the aim according to
//! difficulty. All randomness comes from a seeded PCG so self-play is
//! reproducible.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::settings::Difficulty;
use crate::sim::body::{BodyId, BodyKind, PieceColor, RigidBody};
use crate::sim::state::{Game, GamePhase};

/// Power used when there is nothing sensible to aim at
const FALLBACK_POWER: f64 = 0.5;

/// A shot the AI intends to take
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedShot {
    pub target: Option<BodyId>,
    pub pocket: Option<DVec2>,
    /// Unit launch direction
    pub direction: DVec2,
    /// Power fraction in (0, 1]
    pub power: f64,
}

impl PlannedShot {
    fn fallback() -> Self {
        Self {
            target: None,
            pocket: None,
            direction: DVec2::NEG_Y,
            power: FALLBACK_POWER,
        }
    }

    pub fn velocity(&self, max_launch_speed: f64) -> DVec2 {
        self.direction * self.power * max_launch_speed
    }
}

#[derive(Debug, Clone)]
pub struct AiPlayer {
    difficulty: Difficulty,
    rng: Pcg32,
    thinking: bool,
    think_timer: f64,
    think_duration: f64,
    planned: Option<PlannedShot>,
}

impl AiPlayer {
    pub fn new(difficulty: Difficulty, seed: u64) -> Self {
        Self {
            difficulty,
            rng: Pcg32::seed_from_u64(seed),
            thinking: false,
            think_timer: 0.0,
            think_duration: 0.0,
            planned: None,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn is_thinking(&self) -> bool {
        self.thinking
    }

    pub fn planned(&self) -> Option<&PlannedShot> {
        self.planned.as_ref()
    }

    /// Choose a shot for a player of `color` (any carrom man when unassigned)
    pub fn plan_shot(
        &mut self,
        striker: &RigidBody,
        bodies: &[RigidBody],
        pockets: &[DVec2; 4],
        color: Option<PieceColor>,
    ) -> PlannedShot {
        let own = |b: &&RigidBody| match color {
            Some(c) => b.kind.color() == Some(c),
            None => b.kind.color().is_some(),
        };
        let mut candidates: Vec<&RigidBody> = bodies.iter().filter(own).collect();
        if candidates.is_empty() {
            candidates.extend(bodies.iter().filter(|b| b.kind == BodyKind::Queen));
        }

        let mut best: Option<(f64, &RigidBody, DVec2)> = None;
        for piece in candidates {
            for &pocket in pockets {
                let dist_sq = piece.pos.distance_squared(pocket);
                if best.is_none_or(|(d, _, _)| dist_sq < d) {
                    best = Some((dist_sq, piece, pocket));
                }
            }
        }
        let Some((_, target, pocket)) = best else {
            log::debug!("AI has nothing to aim at");
            return PlannedShot::fallback();
        };

        // Where the striker must be at impact to send the target pocketwards
        let to_pocket = (pocket - target.pos).normalize_or_zero();
        let ghost = target.pos - to_pocket * (striker.radius + target.radius);
        let mut aim = ghost - striker.pos;

        let spread = self.difficulty.aim_error();
        if spread > 0.0 {
            let error = (self.rng.random::<f64>() - 0.5) * spread;
            aim += DVec2::splat(error * aim.length());
        }

        let direction = aim.normalize_or_zero();
        if direction == DVec2::ZERO {
            return PlannedShot::fallback();
        }

        let power = match self.difficulty {
            Difficulty::Easy => self.rng.random_range(0.4..0.8),
            Difficulty::Medium => 0.6,
            Difficulty::Hard => 0.8,
        };

        PlannedShot {
            target: Some(target.id),
            pocket: Some(pocket),
            direction,
            power,
        }
    }

    /// Plan now, shoot after a short think
    pub fn start_turn(&mut self, game: &Game) {
        let (min, spread) = self.difficulty.think_time();
        self.think_duration = min + self.rng.random::<f64>() * spread;
        self.think_timer = 0.0;
        self.thinking = true;

        let color = game.turns().and_then(|t| t.active_player().color);
        let planned = match game.striker() {
            Some(striker) => Some(self.plan_shot(
                striker,
                game.world().bodies(),
                &game.config().geometry.pockets,
                color,
            )),
            None => None,
        };
        self.planned = planned;
        log::debug!(
            "AI ({}) thinking for {:.2}s",
            self.difficulty.as_str(),
            self.think_duration
        );
    }

    /// Count down the think time; returns true once the shot is fired
    pub fn update(&mut self, game: &mut Game, dt: f64) -> bool {
        if !self.thinking {
            return false;
        }
        self.think_timer += dt;
        if self.think_timer < self.think_duration {
            return false;
        }

        self.thinking = false;
        if game.phase() != GamePhase::Playing {
            return false;
        }
        let Some(shot) = self.planned.take() else {
            return false;
        };
        game.launch(shot.velocity(game.config().aim.max_launch_speed))
    }
}
