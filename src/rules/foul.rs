//! Striker fouls and dues
//!
//! Pocketing the striker costs the turn and one due. Own-colour pieces that
//! dropped on the same shot are owed back as well. A due is paid by putting
//! one of the player's pocketed pieces back in the center; if they have
//! nothing pocketed yet the due stays outstanding.

use glam::DVec2;

use super::player::Player;
use crate::sim::body::BodyKind;
use crate::sim::events::{EventQueue, GameEvent};
use crate::sim::setup::PIECES_PER_COLOR;
use crate::sim::world::PhysicsWorld;

/// Record a striker foul; returns the player's outstanding dues
pub fn charge_striker_foul(player: &mut Player, own_pocketed: u32, events: &mut EventQueue) -> u32 {
    player.fouls += 1;
    player.dues += 1 + own_pocketed;
    log::info!("FOUL: {} pocketed the striker, owes {} due(s)", player.name, player.dues);
    events.push(GameEvent::Foul {
        player: player.id,
        dues: player.dues,
    });
    player.dues
}

/// Pay as many dues as the board allows; returns how many were paid
pub fn settle_dues(
    player: &mut Player,
    world: &mut PhysicsWorld,
    center: DVec2,
    events: &mut EventQueue,
) -> u32 {
    let Some(color) = player.color else {
        return 0;
    };

    let mut paid = 0;
    while player.dues > 0 && world.count_kind(color.kind()) < PIECES_PER_COLOR {
        world.spawn(color.kind(), center);
        player.dues -= 1;
        paid += 1;
        events.push(GameEvent::DueReturned {
            player: player.id,
            color,
        });
    }

    if player.dues > 0 {
        log::debug!("{} still owes {} due(s)", player.name, player.dues);
    }
    paid
}

/// Put the queen back in the center
pub fn restore_queen(world: &mut PhysicsWorld, center: DVec2, events: &mut EventQueue) {
    if !world.contains_kind(BodyKind::Queen) {
        world.spawn(BodyKind::Queen, center);
    }
    events.push(GameEvent::QueenReturned);
}
