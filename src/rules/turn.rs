//! Turn manager: turns shot results into rule outcomes
//!
//! Pocketed bodies arrive one at a time while the shot is in flight (colour
//! claims and live points happen then). Once everything is asleep the whole
//! shot is evaluated: fouls, dues, queen cover, turn transfer, board end.

use super::foul::{charge_striker_foul, restore_queen, settle_dues};
use super::player::{Player, PlayerId, assign_colors, create_players};
use super::queen::{CoverOutcome, QueenState};
use super::score::board_points;
use crate::config::{BoardGeometry, RulesConfig};
use crate::error::Error;
use crate::sim::body::{BodyId, BodyKind, PieceColor, PocketedPiece};
use crate::sim::events::{EventQueue, GameEvent};
use crate::sim::setup::arrange_standard;
use crate::sim::world::PhysicsWorld;

/// What happened once a shot was evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotOutcome {
    /// Board continues; `extra_turn` when the shooter goes again
    Continue { extra_turn: bool },
    /// Board over, match still running
    BoardEnded { winner: PlayerId, points: u32 },
    MatchEnded { winner: PlayerId },
}

/// Pocketed bodies of one shot, split by role
#[derive(Debug, Default, Clone, Copy)]
struct ShotTally {
    striker: bool,
    queen: bool,
    own: u32,
    opponent: u32,
}

#[derive(Debug, Clone)]
pub struct TurnManager {
    players: Vec<Player>,
    active: usize,
    /// Seat that broke the current board
    breaker: usize,
    queen: QueenState,
    pocketed: Vec<PocketedPiece>,
    /// Live points credited during the current shot
    shot_points: u32,
    rules: RulesConfig,
    geometry: BoardGeometry,
}

impl TurnManager {
    pub fn new(
        player_count: usize,
        rules: RulesConfig,
        geometry: BoardGeometry,
    ) -> Result<Self, Error> {
        let players = create_players(player_count, rules.color_assignment)?;
        Ok(Self {
            players,
            active: 0,
            breaker: 0,
            queen: QueenState::new(),
            pocketed: Vec::new(),
            shot_points: 0,
            rules,
            geometry,
        })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_player(&self) -> &Player {
        &self.players[self.active]
    }

    pub fn queen(&self) -> &QueenState {
        &self.queen
    }

    /// Bodies captured since the last evaluation, in capture order
    pub fn pocketed_this_shot(&self) -> &[PocketedPiece] {
        &self.pocketed
    }

    /// Record a capture while the shot is still running
    pub fn on_piece_pocketed(&mut self, piece: PocketedPiece) {
        self.pocketed.push(piece);

        let Some(color) = piece.kind.color() else {
            log::debug!("{:?} pocketed by {}", piece.kind, self.players[self.active].name);
            return;
        };

        if self.players[self.active].color.is_none() {
            self.claim_color(color);
        }

        if self.players[self.active].color == Some(color) {
            let player = &mut self.players[self.active];
            player.score += self.rules.piece_points;
            self.shot_points += self.rules.piece_points;
            log::debug!("{} pocketed own {:?}, score {}", player.name, color, player.score);
        }
    }

    /// Evaluate the finished shot and set up the next one
    pub fn evaluate_shot(
        &mut self,
        world: &mut PhysicsWorld,
        events: &mut EventQueue,
    ) -> ShotOutcome {
        let shooter = self.active;
        let shooter_id = self.players[shooter].id;
        let tally = self.tally();
        let is_foul = tally.striker;
        let center = self.geometry.center;

        log::debug!(
            "Evaluating shot by {}: striker={} queen={} own={} opponent={}",
            self.players[shooter].name,
            tally.striker,
            tally.queen,
            tally.own,
            tally.opponent
        );

        if is_foul {
            // Own pieces on a foul shot earn nothing and are owed back
            let player = &mut self.players[shooter];
            player.score = player.score.saturating_sub(self.shot_points);
            charge_striker_foul(player, tally.own, events);
        }
        settle_dues(&mut self.players[shooter], world, center, events);

        if tally.queen {
            self.queen.on_pocketed(shooter_id);
        }
        match self.queen.evaluate_cover(shooter_id, tally.own, is_foul) {
            CoverOutcome::Covered(player) => events.push(GameEvent::QueenCovered(player)),
            CoverOutcome::Returned => restore_queen(world, center, events),
            CoverOutcome::NotPending | CoverOutcome::Deferred => {}
        }

        let extra_turn = !is_foul && (tally.own > 0 || tally.queen);

        self.pocketed.clear();
        self.shot_points = 0;

        if let Some(outcome) = self.check_board_end(shooter, world, events) {
            return outcome;
        }
        if let Some(winner) = self.match_winner() {
            return self.end_match(winner, events);
        }

        if !extra_turn {
            self.advance_turn(events);
        }
        self.reset_striker(world);

        ShotOutcome::Continue { extra_turn }
    }

    /// Clear the board and rack up the next one, rotating the break
    pub fn start_new_board(&mut self, world: &mut PhysicsWorld, events: &mut EventQueue) {
        let n = self.players.len();
        self.breaker = (self.breaker + 1) % n;
        self.active = self.breaker;
        self.queen.reset();
        self.pocketed.clear();
        self.shot_points = 0;
        for player in &mut self.players {
            player.dues = 0;
        }
        assign_colors(&mut self.players, self.breaker, self.rules.color_assignment);

        world.clear();
        arrange_standard(world, &self.geometry, self.players[self.active].baseline);

        log::info!("New board, {} breaks", self.players[self.active].name);
        events.push(GameEvent::TurnChanged(self.players[self.active].id));
    }

    /// Put the striker at rest on the active player's baseline
    pub fn reset_striker(&self, world: &mut PhysicsWorld) -> BodyId {
        let pos = self.geometry.baseline(self.players[self.active].baseline).midpoint();
        if let Some(id) = world.find_kind(BodyKind::Striker).map(|b| b.id) {
            if let Some(striker) = world.get_mut(id) {
                striker.place(pos);
            }
            return id;
        }
        world.spawn(BodyKind::Striker, pos)
    }

    fn tally(&self) -> ShotTally {
        let own_color = self.players[self.active].color;
        let mut tally = ShotTally::default();
        for piece in &self.pocketed {
            match piece.kind {
                BodyKind::Striker => tally.striker = true,
                BodyKind::Queen => tally.queen = true,
                kind if kind.color() == own_color => tally.own += 1,
                _ => tally.opponent += 1,
            }
        }
        tally
    }

    fn claim_color(&mut self, color: PieceColor) {
        let active = &mut self.players[self.active];
        active.color = Some(color);
        log::info!("{} claims {:?}", active.name, color);

        if self.players.len() == 2 {
            let other = &mut self.players[1 - self.active];
            if other.color.is_none() {
                other.color = Some(color.opposite());
            }
        }
    }

    /// The seat the shooter plays against: the next seat holding the other
    /// colour, falling back to the next seat in rotation
    fn opponent_of(&self, seat: usize) -> usize {
        let n = self.players.len();
        let color = self.players[seat].color;
        (1..n)
            .map(|step| (seat + step) % n)
            .find(|&i| self.players[i].color.is_some() && self.players[i].color != color)
            .unwrap_or((seat + 1) % n)
    }

    fn check_board_end(
        &mut self,
        shooter: usize,
        world: &mut PhysicsWorld,
        events: &mut EventQueue,
    ) -> Option<ShotOutcome> {
        let color = self.players[shooter].color?;
        if world.count_kind(color.kind()) > 0 {
            return None;
        }

        let opponent = self.opponent_of(shooter);
        let winner = if world.contains_kind(BodyKind::Queen) {
            log::info!(
                "{} cleared their pieces with the queen still on the board",
                self.players[shooter].name
            );
            opponent
        } else {
            shooter
        };

        let counted = self.players[opponent].color.unwrap_or(color.opposite());
        let winner_id = self.players[winner].id;
        let has_queen = self.queen.covered_by() == Some(winner_id);
        let points = board_points(&self.rules, world.bodies(), counted, has_queen);
        self.players[winner].score += points;

        log::info!(
            "Board won by {} for {} points",
            self.players[winner].name,
            points
        );
        events.push(GameEvent::BoardEnded {
            players: self.players.clone(),
            winner: Some(winner_id),
            points,
        });

        Some(match self.match_winner() {
            Some(champion) => self.end_match(champion, events),
            None => ShotOutcome::BoardEnded {
                winner: winner_id,
                points,
            },
        })
    }

    /// Highest scorer at or above the winning score
    fn match_winner(&self) -> Option<PlayerId> {
        self.players
            .iter()
            .filter(|p| p.score >= self.rules.winning_score)
            .max_by_key(|p| p.score)
            .map(|p| p.id)
    }

    fn end_match(&self, winner: PlayerId, events: &mut EventQueue) -> ShotOutcome {
        log::info!("Match won by P{}", winner.0);
        events.push(GameEvent::MatchEnded {
            winner,
            players: self.players.clone(),
        });
        ShotOutcome::MatchEnded { winner }
    }

    fn advance_turn(&mut self, events: &mut EventQueue) {
        self.active = (self.active + 1) % self.players.len();
        let player = &self.players[self.active];
        log::debug!("Turn passes to {}", player.name);
        events.push(GameEvent::TurnChanged(player.id));
    }

    #[cfg(test)]
    fn player_mut(&mut self, index: usize) -> &mut Player {
        &mut self.players[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    use super::*;
    use crate::config::GameConfig;
    use crate::sim::setup::PIECES_PER_COLOR;

    struct Table {
        turns: TurnManager,
        world: PhysicsWorld,
        events: EventQueue,
    }

    impl Table {
        fn new(players: usize) -> Self {
            let config = GameConfig::default();
            let mut world = PhysicsWorld::new(config.geometry.bounds, config.physics.clone());
            arrange_standard(&mut world, &config.geometry, crate::config::Baseline::Bottom);
            let turns = TurnManager::new(players, config.rules, config.geometry).unwrap();
            Self {
                turns,
                world,
                events: EventQueue::new(),
            }
        }

        /// Drop the first live body of `kind` into a pocket
        fn pocket(&mut self, kind: BodyKind) {
            let id = self.world.find_kind(kind).unwrap().id;
            let body = self.world.remove_body(id).unwrap();
            self.turns.on_piece_pocketed(body.snapshot());
        }

        fn evaluate(&mut self) -> ShotOutcome {
            self.turns.evaluate_shot(&mut self.world, &mut self.events)
        }

        fn events(&mut self) -> Vec<GameEvent> {
            self.events.drain().collect()
        }
    }

    #[test]
    fn test_claim_scores_and_keeps_turn() {
        let mut table = Table::new(2);
        table.pocket(BodyKind::White);
        assert_eq!(table.turns.players()[0].color, Some(PieceColor::White));
        assert_eq!(table.turns.players()[0].score, 10);

        let outcome = table.evaluate();
        assert_eq!(outcome, ShotOutcome::Continue { extra_turn: true });
        assert_eq!(table.turns.active_index(), 0);
        assert_eq!(table.turns.players()[1].color, Some(PieceColor::Black));
        assert!(!table.events().iter().any(|e| matches!(e, GameEvent::TurnChanged(_))));
    }

    #[test]
    fn test_striker_foul_passes_turn_and_due_is_paid_later() {
        let mut table = Table::new(2);
        table.turns.player_mut(0).color = Some(PieceColor::White);
        table.turns.player_mut(1).color = Some(PieceColor::Black);

        table.pocket(BodyKind::Striker);
        let outcome = table.evaluate();
        assert_eq!(outcome, ShotOutcome::Continue { extra_turn: false });
        assert_eq!(table.turns.players()[0].fouls, 1);
        assert_eq!(table.turns.players()[0].dues, 1);
        assert_eq!(table.turns.active_index(), 1);
        assert!(table.world.contains_kind(BodyKind::Striker));
        assert!(table
            .events()
            .iter()
            .any(|e| matches!(e, GameEvent::TurnChanged(PlayerId(2)))));

        // P2 misses, P1 pockets a white and the due goes straight back
        table.evaluate();
        assert_eq!(table.turns.active_index(), 0);
        table.pocket(BodyKind::White);
        table.evaluate();
        assert_eq!(table.turns.players()[0].dues, 0);
        assert_eq!(table.world.count_kind(BodyKind::White), PIECES_PER_COLOR);
        let center = DVec2::new(450.0, 450.0);
        assert!(table
            .world
            .bodies()
            .iter()
            .any(|b| b.kind == BodyKind::White && b.pos == center));
    }

    #[test]
    fn test_foul_voids_live_points_and_owes_pieces() {
        let mut table = Table::new(2);
        table.turns.player_mut(0).color = Some(PieceColor::White);
        table.turns.player_mut(1).color = Some(PieceColor::Black);

        table.pocket(BodyKind::White);
        table.pocket(BodyKind::Striker);
        table.evaluate();

        let p1 = &table.turns.players()[0];
        assert_eq!(p1.score, 0);
        // One for the striker and one for the white; only the white can come back
        assert_eq!(p1.dues, 1);
        assert_eq!(table.world.count_kind(BodyKind::White), PIECES_PER_COLOR);
    }

    #[test]
    fn test_queen_with_cover_same_shot() {
        let mut table = Table::new(2);
        table.turns.player_mut(0).color = Some(PieceColor::White);
        table.turns.player_mut(1).color = Some(PieceColor::Black);

        table.pocket(BodyKind::Queen);
        table.pocket(BodyKind::White);
        let outcome = table.evaluate();

        assert_eq!(outcome, ShotOutcome::Continue { extra_turn: true });
        assert_eq!(table.turns.queen().covered_by(), Some(PlayerId(1)));
        assert!(!table.world.contains_kind(BodyKind::Queen));
        assert!(table
            .events()
            .iter()
            .any(|e| matches!(e, GameEvent::QueenCovered(PlayerId(1)))));
    }

    #[test]
    fn test_uncovered_queen_returns_to_center() {
        let mut table = Table::new(2);
        table.turns.player_mut(0).color = Some(PieceColor::White);
        table.turns.player_mut(1).color = Some(PieceColor::Black);

        table.pocket(BodyKind::Queen);
        let outcome = table.evaluate();
        assert_eq!(outcome, ShotOutcome::Continue { extra_turn: true });
        assert!(table.turns.queen().needs_cover);
        assert!(!table.turns.queen().just_pocketed);
        assert_eq!(table.turns.active_index(), 0);

        table.evaluate();
        assert_eq!(table.turns.queen().custodian, None);
        assert_eq!(
            table.world.find_kind(BodyKind::Queen).unwrap().pos,
            DVec2::new(450.0, 450.0)
        );
        assert!(table.events().iter().any(|e| matches!(e, GameEvent::QueenReturned)));
    }

    #[test]
    fn test_clearing_before_queen_loses_board() {
        let mut table = Table::new(2);
        table.turns.player_mut(0).color = Some(PieceColor::White);
        table.turns.player_mut(1).color = Some(PieceColor::Black);

        for _ in 0..PIECES_PER_COLOR {
            table.pocket(BodyKind::White);
        }
        let outcome = table.evaluate();

        // 9 blacks left at 10 each
        assert_eq!(
            outcome,
            ShotOutcome::BoardEnded {
                winner: PlayerId(2),
                points: 90
            }
        );
        assert_eq!(table.turns.players()[1].score, 90);
        assert_eq!(table.turns.players()[0].score, 90);
    }

    #[test]
    fn test_clearing_after_queen_wins_board() {
        let mut table = Table::new(2);
        table.turns.player_mut(0).color = Some(PieceColor::White);
        table.turns.player_mut(1).color = Some(PieceColor::Black);
        let queen = table.world.find_kind(BodyKind::Queen).unwrap().id;
        table.world.remove_body(queen);
        for _ in 0..4 {
            let id = table.world.find_kind(BodyKind::Black).unwrap().id;
            table.world.remove_body(id);
        }

        for _ in 0..PIECES_PER_COLOR {
            table.pocket(BodyKind::White);
        }
        let outcome = table.evaluate();
        assert_eq!(
            outcome,
            ShotOutcome::BoardEnded {
                winner: PlayerId(1),
                points: 50
            }
        );
        assert_eq!(table.turns.players()[0].score, 90 + 50);
    }

    #[test]
    fn test_board_award_can_end_match() {
        let mut table = Table::new(2);
        table.turns.player_mut(0).color = Some(PieceColor::White);
        table.turns.player_mut(1).color = Some(PieceColor::Black);
        table.turns.player_mut(1).score = 100;

        for _ in 0..PIECES_PER_COLOR {
            table.pocket(BodyKind::White);
        }
        let outcome = table.evaluate();

        assert_eq!(outcome, ShotOutcome::MatchEnded { winner: PlayerId(2) });
        let events = table.events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::BoardEnded { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::MatchEnded { winner: PlayerId(2), .. })));
    }

    #[test]
    fn test_new_board_rotates_break() {
        let mut table = Table::new(3);
        table.pocket(BodyKind::Black);
        table.evaluate();
        table.turns.start_new_board(&mut table.world, &mut table.events);

        assert_eq!(table.turns.active_index(), 1);
        assert!(table.turns.players().iter().all(|p| p.color.is_none()));
        assert_eq!(table.world.len(), 20);
        let striker = table.world.find_kind(BodyKind::Striker).unwrap();
        assert_eq!(striker.pos, DVec2::new(700.0, 450.0));
        assert_eq!(table.turns.players()[0].score, 10);
    }

    #[test]
    fn test_opponent_color_does_not_earn_turn() {
        let mut table = Table::new(2);
        table.turns.player_mut(0).color = Some(PieceColor::White);
        table.turns.player_mut(1).color = Some(PieceColor::Black);
        table.pocket(BodyKind::Black);
        assert_eq!(table.evaluate(), ShotOutcome::Continue { extra_turn: false });
        assert_eq!(table.turns.players()[0].score, 0);
        assert_eq!(table.turns.active_index(), 1);
        assert_eq!(
            table.world.find_kind(BodyKind::Striker).unwrap().pos,
            DVec2::new(450.0, 200.0)
        );
    }
}
