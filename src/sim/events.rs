//! Outbound game events
//!
//! The core never calls into audio, particles or UI. It appends events here
//! and the driving loop drains them once per frame.

use std::collections::VecDeque;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::body::{PieceColor, PocketedPiece};
use super::state::GamePhase;
use crate::rules::{Player, PlayerId};

/// What a collision was against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionKind {
    /// Two disks
    Body,
    /// A disk and a rail
    Wall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GameEvent {
    /// Impact above the reporting threshold
    Collision {
        kind: CollisionKind,
        point: DVec2,
        impulse: f64,
    },

    /// A body dropped into a pocket
    PiecePocketed(PocketedPiece),

    /// A different player is now on strike
    TurnChanged(PlayerId),

    /// Striker pocketed
    Foul { player: PlayerId, dues: u32 },

    /// A due was paid by returning a piece to the center
    DueReturned { player: PlayerId, color: PieceColor },

    /// The queen was covered and banked
    QueenCovered(PlayerId),

    /// The queen went back to the center
    QueenReturned,

    PhaseChanged { from: GamePhase, to: GamePhase },

    /// A board finished
    BoardEnded {
        players: Vec<Player>,
        winner: Option<PlayerId>,
        points: u32,
    },

    /// Someone reached the winning score
    MatchEnded {
        winner: PlayerId,
        players: Vec<Player>,
    },
}

/// FIFO of pending events
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take every pending event, oldest first
    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }
}
