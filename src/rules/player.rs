//! Players and seating

use serde::{Deserialize, Serialize};

use crate::config::{Baseline, ColorAssignment};
use crate::error::Error;
use crate::sim::body::PieceColor;

/// 1-based seat number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
    pub fouls: u32,
    /// Pieces owed back to the board
    pub dues: u32,
    pub color: Option<PieceColor>,
    pub baseline: Baseline,
}

impl Player {
    pub fn new(id: PlayerId, baseline: Baseline) -> Self {
        Self {
            id,
            name: format!("P{}", id.0),
            score: 0,
            fouls: 0,
            dues: 0,
            color: None,
            baseline,
        }
    }
}

/// Seat order around the board for each table size
fn seating(count: usize) -> &'static [Baseline] {
    match count {
        2 => &[Baseline::Bottom, Baseline::Top],
        3 => &[Baseline::Bottom, Baseline::Right, Baseline::Top],
        _ => &[Baseline::Bottom, Baseline::Right, Baseline::Top, Baseline::Left],
    }
}

/// Seat `count` players
pub fn create_players(count: usize, mode: ColorAssignment) -> Result<Vec<Player>, Error> {
    if !(2..=4).contains(&count) {
        return Err(Error::PlayerCount(count));
    }
    let mut players: Vec<Player> = seating(count)
        .iter()
        .enumerate()
        .map(|(i, &baseline)| Player::new(PlayerId(i as u8 + 1), baseline))
        .collect();
    assign_colors(&mut players, 0, mode);
    Ok(players)
}

/// Hand out colours for a new board
///
/// In `Fixed` mode the breaking seat takes white and seats alternate from
/// there; three-player tables have no partner seating and always claim.
pub fn assign_colors(players: &mut [Player], breaker: usize, mode: ColorAssignment) {
    let n = players.len();
    for (i, player) in players.iter_mut().enumerate() {
        player.color = match mode {
            ColorAssignment::Fixed if n != 3 => {
                let seat = (i + n - breaker) % n;
                Some(if seat % 2 == 0 { PieceColor::White } else { PieceColor::Black })
            }
            _ => None,
        };
    }
}
