//! Match phases and the game context
//!
//! `Game` owns every component of a running match and is passed explicitly
//! to whoever drives it. Nothing here is global.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::body::{BodyKind, RigidBody};
use super::events::{EventQueue, GameEvent};
use super::pocket::PocketDetector;
use super::predictor::{Prediction, ShotPredictor};
use super::setup::arrange_standard;
use super::world::PhysicsWorld;
use crate::aiming::{AimState, AimUpdate, Aimer};
use crate::config::{Baseline, GameConfig};
use crate::error::Error;
use crate::rules::TurnManager;

/// Top-level phase of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for a player count
    Menu,
    /// Striker at rest, waiting for a shot
    Playing,
    /// Shot in flight
    Simulating,
    /// Everything stopped, rules being applied
    Evaluating,
    /// Board over, next board coming up
    ScoreScreen,
    /// Match over
    GameOver,
}

impl GamePhase {
    /// Whether the machine may move from `self` to `next`
    pub fn can_transition_to(self, next: GamePhase) -> bool {
        use GamePhase::*;
        matches!(
            (self, next),
            (Menu, Playing)
                | (Playing, Simulating)
                | (Simulating, Evaluating)
                | (Evaluating, Playing)
                | (Evaluating, ScoreScreen)
                | (Evaluating, GameOver)
                | (ScoreScreen, Playing)
        )
    }

    /// Aim and shot input is only taken while the board is at rest
    pub fn accepts_input(self) -> bool {
        self == GamePhase::Playing
    }
}

/// A match in progress
#[derive(Debug)]
pub struct Game {
    pub(crate) config: GameConfig,
    pub(crate) world: PhysicsWorld,
    pub(crate) pockets: PocketDetector,
    pub(crate) predictor: ShotPredictor,
    pub(crate) aimer: Aimer,
    /// Created when the match starts
    pub(crate) turns: Option<TurnManager>,
    pub(crate) phase: GamePhase,
    pub(crate) events: EventQueue,
    /// Seconds left on the score screen
    pub(crate) score_screen_timer: f64,
    /// Fixed steps taken since the match started
    pub(crate) time_ticks: u64,
    /// Live aim forecast
    preview: Option<Prediction>,
}

impl Game {
    /// Build an idle game in the menu; rejects unusable configurations
    pub fn new(config: GameConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            world: PhysicsWorld::new(config.geometry.bounds, config.physics.clone()),
            pockets: PocketDetector::new(&config.geometry),
            predictor: ShotPredictor::new(&config.aim),
            aimer: Aimer::new(config.aim.clone()),
            turns: None,
            phase: GamePhase::Menu,
            events: EventQueue::new(),
            score_screen_timer: 0.0,
            time_ticks: 0,
            preview: None,
            config,
        })
    }

    /// Seat the players, rack the first board and start play
    pub fn start_match(&mut self, player_count: usize) -> Result<(), Error> {
        let turns = TurnManager::new(
            player_count,
            self.config.rules.clone(),
            self.config.geometry.clone(),
        )?;

        if self.phase != GamePhase::Menu {
            log::warn!("Match already running, ignoring start in {:?}", self.phase);
            return Ok(());
        }

        self.world.clear();
        let breaker = turns.active_player();
        arrange_standard(&mut self.world, &self.config.geometry, breaker.baseline);
        log::info!("Match started with {} players", player_count);
        self.events.push(GameEvent::TurnChanged(breaker.id));

        self.turns = Some(turns);
        self.time_ticks = 0;
        self.set_phase(GamePhase::Playing);
        Ok(())
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn turns(&self) -> Option<&TurnManager> {
        self.turns.as_ref()
    }

    pub fn aim_state(&self) -> AimState {
        self.aimer.state()
    }

    pub fn aimer(&self) -> &Aimer {
        &self.aimer
    }

    /// Predicted path for the aim in progress
    pub fn preview(&self) -> Option<&Prediction> {
        self.preview.as_ref()
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn striker(&self) -> Option<&RigidBody> {
        self.world.find_kind(BodyKind::Striker)
    }

    /// Baseline of the player on strike
    pub fn active_baseline(&self) -> Option<Baseline> {
        self.turns.as_ref().map(|t| t.active_player().baseline)
    }

    /// Move to `next`; returns true if the phase changed
    ///
    /// Re-entering the current phase does nothing. Entering `Playing` drops
    /// any aim in progress.
    pub fn set_phase(&mut self, next: GamePhase) -> bool {
        if next == self.phase {
            return false;
        }
        if !self.phase.can_transition_to(next) {
            log::warn!("Rejected phase change {:?} -> {:?}", self.phase, next);
            return false;
        }

        log::info!("Phase {:?} -> {:?}", self.phase, next);
        self.events.push(GameEvent::PhaseChanged {
            from: self.phase,
            to: next,
        });
        self.phase = next;

        if next == GamePhase::Playing {
            self.aimer.reset();
            self.preview = None;
        }
        true
    }

    /// Pointer pressed during aiming
    pub fn begin_aim(&mut self, pos: DVec2, baseline: Baseline) {
        if !self.phase.accepts_input() {
            log::warn!("Aim ignored in {:?}", self.phase);
            return;
        }
        let segment = *self.config.geometry.baseline(baseline);
        let Some(striker) = self.world.find_kind(BodyKind::Striker) else {
            return;
        };
        let id = striker.id;
        let moved = self.aimer.begin(pos, striker, baseline, &segment);
        self.preview = None;
        if let (Some(to), Some(striker)) = (moved, self.world.get_mut(id)) {
            striker.place(to);
        }
    }

    /// Pointer dragged from `start` to `pos`
    pub fn update_aim(&mut self, pos: DVec2, start: DVec2, baseline: Baseline) -> AimUpdate {
        if !self.phase.accepts_input() {
            return AimUpdate::None;
        }
        let segment = *self.config.geometry.baseline(baseline);
        let update = self.aimer.update(pos, start, baseline, &segment);
        match update {
            AimUpdate::Reposition(to) => {
                let id = self.striker().map(|s| s.id);
                if let Some(striker) = id.and_then(|id| self.world.get_mut(id)) {
                    striker.place(to);
                }
                self.preview = None;
            }
            AimUpdate::Aim(vel) => self.preview = self.predict(vel),
            AimUpdate::None => self.preview = None,
        }
        update
    }

    /// Pointer released; true iff a shot was launched
    pub fn commit_shot(&mut self, pos: DVec2, start: DVec2) -> bool {
        if !self.phase.accepts_input() {
            return false;
        }
        if let Some(baseline) = self.active_baseline() {
            self.update_aim(pos, start, baseline);
        }
        self.preview = None;
        match self.aimer.end() {
            Some(vel) => self.launch(vel),
            None => false,
        }
    }

    /// Fire the striker with `vel` and start simulating
    pub fn launch(&mut self, vel: DVec2) -> bool {
        if !self.phase.accepts_input() || vel == DVec2::ZERO || !vel.is_finite() {
            log::warn!("Launch rejected in {:?}", self.phase);
            return false;
        }
        let id = self.striker().map(|s| s.id);
        let Some(striker) = id.and_then(|id| self.world.get_mut(id)) else {
            return false;
        };
        striker.launch(vel);
        log::debug!("Striker launched at ({:.1}, {:.1})", vel.x, vel.y);
        self.aimer.reset();
        self.set_phase(GamePhase::Simulating)
    }

    /// Forecast a shot from the striker's current spot
    pub fn predict(&self, vel: DVec2) -> Option<Prediction> {
        let striker = self.striker()?;
        Some(
            self.predictor
                .predict(striker, vel, self.world.bodies(), self.world.bounds()),
        )
    }

    /// Take every event produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use GamePhase::*;
        assert!(Menu.can_transition_to(Playing));
        assert!(Evaluating.can_transition_to(ScoreScreen));
        assert!(ScoreScreen.can_transition_to(Playing));
        assert!(!Playing.can_transition_to(Evaluating));
        for next in [Menu, Playing, Simulating, Evaluating, ScoreScreen] {
            assert!(!GameOver.can_transition_to(next));
        }
    }

    #[test]
    fn test_start_match_racks_board() {
        let mut game = Game::new(GameConfig::default()).unwrap();
        assert_eq!(game.phase(), GamePhase::Menu);
        game.start_match(2).unwrap();

        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.world().len(), 20);
        assert_eq!(game.striker().unwrap().pos, DVec2::new(450.0, 700.0));
        let events = game.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::PhaseChanged {
                from: GamePhase::Menu,
                to: GamePhase::Playing
            }
        )));
    }

    #[test]
    fn test_bad_player_count_keeps_menu() {
        let mut game = Game::new(GameConfig::default()).unwrap();
        assert!(matches!(game.start_match(5), Err(Error::PlayerCount(5))));
        assert_eq!(game.phase(), GamePhase::Menu);
    }

    #[test]
    fn test_reentry_is_noop() {
        let mut game = Game::new(GameConfig::default()).unwrap();
        game.start_match(2).unwrap();
        game.drain_events();
        assert!(!game.set_phase(GamePhase::Playing));
        assert!(game.drain_events().is_empty());
    }

    #[test]
    fn test_input_ignored_outside_playing() {
        let mut game = Game::new(GameConfig::default()).unwrap();
        assert!(!game.launch(DVec2::new(0.0, -1000.0)));

        game.start_match(2).unwrap();
        assert!(game.launch(DVec2::new(0.0, -1000.0)));
        assert_eq!(game.phase(), GamePhase::Simulating);
        assert!(!game.launch(DVec2::new(0.0, -1000.0)));
        assert!(!game.commit_shot(DVec2::ZERO, DVec2::new(0.0, 100.0)));
    }

    #[test]
    fn test_drag_and_release_fires() {
        let mut game = Game::new(GameConfig::default()).unwrap();
        game.start_match(2).unwrap();
        let start = game.striker().unwrap().pos;

        game.begin_aim(start, Baseline::Bottom);
        assert_eq!(game.aim_state(), AimState::DragCheck);
        let update = game.update_aim(start + DVec2::new(0.0, 150.0), start, Baseline::Bottom);
        assert!(matches!(update, AimUpdate::Aim(_)));
        let preview = game.preview().unwrap();
        assert_eq!(preview.path[0], start);

        assert!(game.commit_shot(start + DVec2::new(0.0, 150.0), start));
        assert_eq!(game.phase(), GamePhase::Simulating);
        assert!(game.preview().is_none());
        let striker = game.striker().unwrap();
        assert!(!striker.sleeping);
        assert!(striker.vel.y < 0.0);
    }

    #[test]
    fn test_positioning_moves_striker() {
        let mut game = Game::new(GameConfig::default()).unwrap();
        game.start_match(2).unwrap();

        game.begin_aim(DVec2::new(300.0, 690.0), Baseline::Bottom);
        assert_eq!(game.aim_state(), AimState::Positioning);
        assert_eq!(game.striker().unwrap().pos, DVec2::new(300.0, 700.0));

        game.update_aim(DVec2::new(250.0, 700.0), DVec2::new(300.0, 690.0), Baseline::Bottom);
        assert_eq!(game.striker().unwrap().pos, DVec2::new(250.0, 700.0));
        assert!(!game.commit_shot(DVec2::new(250.0, 700.0), DVec2::new(300.0, 690.0)));
        assert_eq!(game.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = GameConfig::default();
        config.physics.solver_iterations = 0;
        assert!(matches!(Game::new(config), Err(Error::InvalidConfig { .. })));
    }
}
