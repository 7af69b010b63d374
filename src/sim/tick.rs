//! Fixed timestep simulation tick
//!
//! One call advances the match by exactly one physics step: bodies move,
//! pockets capture, and once the board is at rest the shot is evaluated.

use super::events::GameEvent;
use super::state::{Game, GamePhase};
use crate::config::PhysicsConfig;
use crate::rules::ShotOutcome;

/// Advance the game by one fixed step of `dt` seconds
pub fn tick(game: &mut Game, dt: f64) {
    match game.phase {
        GamePhase::Simulating => {
            game.world.step(dt, &mut game.events);

            for piece in game.pockets.update(&mut game.world) {
                game.events.push(GameEvent::PiecePocketed(piece));
                if let Some(turns) = game.turns.as_mut() {
                    turns.on_piece_pocketed(piece);
                }
            }

            if game.world.is_settled() {
                game.set_phase(GamePhase::Evaluating);
                evaluate(game);
            }
        }

        GamePhase::Evaluating => evaluate(game),

        GamePhase::ScoreScreen => {
            game.score_screen_timer -= dt;
            if game.score_screen_timer <= 0.0 {
                game.score_screen_timer = 0.0;
                if let Some(turns) = game.turns.as_mut() {
                    turns.start_new_board(&mut game.world, &mut game.events);
                }
                game.set_phase(GamePhase::Playing);
            }
        }

        GamePhase::Menu | GamePhase::Playing | GamePhase::GameOver => return,
    }

    game.time_ticks += 1;
}

/// Hand the settled shot to the rules and pick the next phase
fn evaluate(game: &mut Game) {
    let Some(turns) = game.turns.as_mut() else {
        return;
    };
    let outcome = turns.evaluate_shot(&mut game.world, &mut game.events);

    match outcome {
        ShotOutcome::Continue { .. } => {
            game.set_phase(GamePhase::Playing);
        }
        ShotOutcome::BoardEnded { .. } => {
            game.score_screen_timer = game.config.rules.score_screen_delay;
            game.set_phase(GamePhase::ScoreScreen);
        }
        ShotOutcome::MatchEnded { .. } => {
            game.set_phase(GamePhase::GameOver);
        }
    }
}

/// Fixed-step accumulator for a variable frame rate driver
#[derive(Debug, Clone)]
pub struct FrameClock {
    accumulator: f64,
    dt: f64,
    max_substeps: u32,
    max_frame_time: f64,
}

impl FrameClock {
    pub fn new(physics: &PhysicsConfig) -> Self {
        Self {
            accumulator: 0.0,
            dt: physics.dt(),
            max_substeps: physics.max_substeps,
            max_frame_time: physics.max_frame_time,
        }
    }

    /// Unspent time carried to the next frame
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Feed one frame of real time; returns the number of steps run
    pub fn advance(&mut self, game: &mut Game, frame_time: f64) -> u32 {
        // Prevent spiral of death on long frames
        self.accumulator += frame_time.clamp(0.0, self.max_frame_time);

        let mut substeps = 0;
        while self.accumulator >= self.dt && substeps < self.max_substeps {
            tick(game, self.dt);
            self.accumulator -= self.dt;
            substeps += 1;
        }

        self.accumulator = self.accumulator.min(self.max_frame_time);
        substeps
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec2;

    use super::*;
    use crate::config::GameConfig;
    use crate::consts::SIM_DT;
    use crate::rules::PlayerId;
    use crate::sim::body::{BodyKind, PieceColor};

    fn started(players: usize) -> Game {
        let mut game = Game::new(GameConfig::default()).unwrap();
        game.start_match(players).unwrap();
        game.drain_events();
        game
    }

    /// Tick until the phase leaves `Simulating`/`Evaluating`
    fn run_shot(game: &mut Game) {
        for _ in 0..5_000 {
            if !matches!(game.phase(), GamePhase::Simulating | GamePhase::Evaluating) {
                return;
            }
            tick(game, SIM_DT);
        }
        panic!("shot never settled");
    }

    #[test]
    fn test_ticks_ignored_before_shot() {
        let mut game = started(2);
        let before = game.world().bodies().to_vec();
        for _ in 0..10 {
            tick(&mut game, SIM_DT);
        }
        assert_eq!(game.time_ticks(), 0);
        assert_eq!(game.world().bodies().len(), before.len());
    }

    #[test]
    fn test_empty_shot_passes_turn() {
        let mut game = started(2);
        // Slide along the baseline, clear of the pieces
        assert!(game.launch(DVec2::new(300.0, 0.0)));
        run_shot(&mut game);

        assert_eq!(game.phase(), GamePhase::Playing);
        let turns = game.turns().unwrap();
        assert_eq!(turns.active_player().id, PlayerId(2));
        assert_eq!(game.striker().unwrap().pos, DVec2::new(450.0, 200.0));

        let events = game.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::TurnChanged(PlayerId(2)))));
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::PhaseChanged {
                from: GamePhase::Simulating,
                to: GamePhase::Evaluating
            }
        )));
    }

    #[test]
    fn test_capture_feeds_rules() {
        let mut game = started(2);
        let pocket = game.config().geometry.pockets[0];
        game.world.spawn(BodyKind::White, pocket);

        assert!(game.launch(DVec2::new(300.0, 0.0)));
        tick(&mut game, SIM_DT);
        let p1 = &game.turns().unwrap().players()[0];
        assert_eq!(p1.color, Some(PieceColor::White));
        assert_eq!(p1.score, 10);

        run_shot(&mut game);
        assert_eq!(game.turns().unwrap().active_index(), 0);
        assert!(game
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::PiecePocketed(p) if p.kind == BodyKind::White)));
    }

    #[test]
    fn test_board_end_goes_through_score_screen() {
        let mut game = started(2);
        let geometry = game.config().geometry.clone();
        game.world.clear();
        game.world.spawn(BodyKind::White, geometry.pockets[3]);
        game.world.spawn(BodyKind::Black, DVec2::new(450.0, 300.0));
        game.world.spawn(BodyKind::Striker, geometry.bottom.midpoint());

        assert!(game.launch(DVec2::new(300.0, 0.0)));
        run_shot(&mut game);
        assert_eq!(game.phase(), GamePhase::ScoreScreen);
        // 10 live for the white, 10 for the black left standing
        assert_eq!(game.turns().unwrap().players()[0].score, 20);

        let delay = game.config().rules.score_screen_delay;
        let steps = (delay / SIM_DT).ceil() as usize + 1;
        for _ in 0..steps {
            tick(&mut game, SIM_DT);
        }

        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.world().len(), 20);
        let turns = game.turns().unwrap();
        assert_eq!(turns.active_player().id, PlayerId(2));
        assert_eq!(game.striker().unwrap().pos, DVec2::new(450.0, 200.0));
    }

    #[test]
    fn test_match_end_is_terminal() {
        let mut config = GameConfig::default();
        config.rules.winning_score = 10;
        let mut game = Game::new(config).unwrap();
        game.start_match(2).unwrap();

        let pocket = game.config().geometry.pockets[1];
        game.world.spawn(BodyKind::Black, pocket);
        assert!(game.launch(DVec2::new(300.0, 0.0)));
        run_shot(&mut game);

        assert_eq!(game.phase(), GamePhase::GameOver);
        assert!(!game.launch(DVec2::new(0.0, -500.0)));
        assert!(!game.set_phase(GamePhase::Playing));
        assert!(game
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::MatchEnded { winner: PlayerId(1), .. })));
    }

    #[test]
    fn test_frame_clock_clamps_and_carries() {
        let mut game = started(2);
        game.launch(DVec2::new(300.0, 0.0));
        let mut clock = FrameClock::new(&game.config().physics);

        assert_eq!(clock.advance(&mut game, 0.004), 0);
        assert_eq!(clock.advance(&mut game, 0.005), 1);
        assert!((clock.accumulator() - (0.009 - SIM_DT)).abs() < 1e-12);

        // A long stall is clamped and capped at ten steps
        let mut clock = FrameClock::new(&game.config().physics);
        assert_eq!(clock.advance(&mut game, 5.0), 10);
        assert!((clock.accumulator() - (0.25 - 10.0 * SIM_DT)).abs() < 1e-12);
    }

    #[test]
    fn test_clock_always_reaches_a_step() {
        let mut config = GameConfig::default();
        config.physics.sim_rate_hz = 2.0;
        assert!(Game::new(config.clone()).is_err());

        // Slow steps are fine once the frame clamp covers one of them
        config.physics.max_frame_time = 0.5;
        let mut game = Game::new(config).unwrap();
        game.start_match(2).unwrap();
        game.launch(DVec2::new(300.0, 0.0));
        let mut clock = FrameClock::new(&game.config().physics);
        let steps: u32 = (0..45).map(|_| clock.advance(&mut game, 1.0 / 60.0)).sum();
        assert_eq!(steps, 1);
    }

    #[test]
    fn test_determinism() {
        let shot = DVec2::new(-150.0, -2600.0);
        let mut a = started(2);
        let mut b = started(2);
        a.launch(shot);
        b.launch(shot);
        run_shot(&mut a);
        run_shot(&mut b);

        assert_eq!(a.time_ticks(), b.time_ticks());
        let pa: Vec<_> = a.world().bodies().iter().map(|body| body.pos).collect();
        let pb: Vec<_> = b.world().bodies().iter().map(|body| body.pos).collect();
        assert_eq!(pa, pb);
    }
}
