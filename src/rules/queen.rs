//! Queen custody and cover
//!
//! Pocketing the queen puts it in the player's custody, pending cover. Cover
//! means pocketing an own-colour piece on the same shot or the very next one.
//! A failed cover sends the queen back to the center.

use serde::{Deserialize, Serialize};

use super::player::PlayerId;

/// Result of a cover check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverOutcome {
    /// No cover pending
    NotPending,
    /// Queen banked by this player
    Covered(PlayerId),
    /// Pocketed this shot without cover; the next shot decides
    Deferred,
    /// Cover failed; the caller must put the queen back on the board
    Returned,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueenState {
    /// Player holding the queen, pending or confirmed
    pub custodian: Option<PlayerId>,
    pub needs_cover: bool,
    pub just_pocketed: bool,
}

impl QueenState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Custodian whose cover has been confirmed
    pub fn covered_by(&self) -> Option<PlayerId> {
        self.custodian.filter(|_| !self.needs_cover)
    }

    pub fn on_pocketed(&mut self, player: PlayerId) {
        log::info!("Queen pocketed by P{}, must cover", player.0);
        self.custodian = Some(player);
        self.needs_cover = true;
        self.just_pocketed = true;
    }

    /// Decide the cover for the shot just played by `player`
    pub fn evaluate_cover(
        &mut self,
        player: PlayerId,
        own_pocketed: u32,
        is_foul: bool,
    ) -> CoverOutcome {
        if !self.needs_cover {
            return CoverOutcome::NotPending;
        }

        if self.just_pocketed {
            if is_foul {
                log::info!("Foul on the queen shot, queen returns");
                self.reset();
                return CoverOutcome::Returned;
            }
            if own_pocketed > 0 {
                return self.mark_covered();
            }
            log::debug!("Queen needs cover on the next shot");
            self.just_pocketed = false;
            return CoverOutcome::Deferred;
        }

        if self.custodian != Some(player) {
            log::info!("Cover shot taken by another player, queen returns");
            self.reset();
            return CoverOutcome::Returned;
        }

        if own_pocketed > 0 && !is_foul {
            self.mark_covered()
        } else {
            log::info!("Cover failed (foul: {is_foul}), queen returns");
            self.reset();
            CoverOutcome::Returned
        }
    }

    fn mark_covered(&mut self) -> CoverOutcome {
        self.needs_cover = false;
        self.just_pocketed = false;
        // Custody is kept so the board-end bonus can be credited
        match self.custodian {
            Some(player) => {
                log::info!("Queen covered by P{}", player.0);
                CoverOutcome::Covered(player)
            }
            None => CoverOutcome::NotPending,
        }
    }
}
