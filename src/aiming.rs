//! Drag-to-shoot aiming
//!
//! A press on the striker waits to see which way the drag goes: along the
//! baseline slides the striker, across it pulls back for a shot. A press on
//! the baseline slides straight away; anywhere else starts aiming. The shot
//! flies opposite to the drag, with power proportional to drag length.

use glam::DVec2;

use crate::config::{AimConfig, Baseline, BaselineSegment};
use crate::heading_degrees;
use crate::sim::body::RigidBody;

/// Extra room past either end of a baseline that still counts as a press on it
const BASELINE_SLACK: f64 = 20.0;

/// Aiming sub-state while a player is on strike
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AimState {
    #[default]
    Idle,
    /// Pressed on the striker, drag direction not decided yet
    DragCheck,
    /// Sliding the striker along the baseline
    Positioning,
    /// Pulling back for a shot
    Aiming,
}

/// Effect of a pointer move
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AimUpdate {
    None,
    /// Move the striker here
    Reposition(DVec2),
    /// Current shot if released now
    Aim(DVec2),
}

#[derive(Debug, Clone)]
pub struct Aimer {
    config: AimConfig,
    state: AimState,
    /// Unit shot direction; kept when the drag shrinks below the threshold
    direction: DVec2,
    power: f64,
}

impl Aimer {
    pub fn new(config: AimConfig) -> Self {
        Self {
            config,
            state: AimState::Idle,
            direction: DVec2::NEG_Y,
            power: 0.0,
        }
    }

    pub fn state(&self) -> AimState {
        self.state
    }

    /// Power fraction in [0, 1]
    pub fn power(&self) -> f64 {
        self.power
    }

    pub fn direction(&self) -> DVec2 {
        self.direction
    }

    /// Shot heading in degrees, [0, 360)
    pub fn angle_degrees(&self) -> f64 {
        heading_degrees(self.direction)
    }

    /// Drop any aim in progress
    pub fn reset(&mut self) {
        self.state = AimState::Idle;
        self.power = 0.0;
    }

    /// Launch velocity for the current drag, if strong enough to count
    pub fn launch_velocity(&self) -> Option<DVec2> {
        (self.state == AimState::Aiming && self.power > self.config.min_power)
            .then(|| self.direction * self.power * self.config.max_launch_speed)
    }

    /// Pointer pressed; returns a new striker position when the press lands
    /// on the baseline
    pub fn begin(
        &mut self,
        pos: DVec2,
        striker: &RigidBody,
        baseline: Baseline,
        segment: &BaselineSegment,
    ) -> Option<DVec2> {
        self.power = 0.0;

        let tap_radius = striker.radius * self.config.tap_radius_factor;
        if striker.pos.distance_squared(pos) <= tap_radius * tap_radius {
            self.state = AimState::DragCheck;
            return None;
        }

        if self.on_baseline(pos, baseline, segment) {
            self.state = AimState::Positioning;
            return Some(segment.clamp(pos));
        }

        self.state = AimState::Aiming;
        None
    }

    /// Pointer moved from `start` to `pos`
    pub fn update(
        &mut self,
        pos: DVec2,
        start: DVec2,
        baseline: Baseline,
        segment: &BaselineSegment,
    ) -> AimUpdate {
        let drag = start - pos;
        let dist = drag.length();

        if self.state == AimState::DragCheck && dist > self.config.drag_threshold {
            let along = if baseline.is_horizontal() {
                drag.x.abs() > drag.y.abs()
            } else {
                drag.y.abs() > drag.x.abs()
            };
            self.state = if along { AimState::Positioning } else { AimState::Aiming };
        }

        match self.state {
            AimState::Positioning => AimUpdate::Reposition(segment.clamp(pos)),
            AimState::Aiming => {
                if dist > self.config.drag_threshold {
                    self.direction = drag / dist;
                }
                self.power = (dist / self.config.max_drag).min(1.0);
                self.launch_velocity().map_or(AimUpdate::None, AimUpdate::Aim)
            }
            AimState::Idle | AimState::DragCheck => AimUpdate::None,
        }
    }

    /// Pointer released; returns the launch velocity if a shot was fired
    pub fn end(&mut self) -> Option<DVec2> {
        let shot = self.launch_velocity();
        self.reset();
        shot
    }

    fn on_baseline(&self, pos: DVec2, baseline: Baseline, segment: &BaselineSegment) -> bool {
        let tolerance = self.config.baseline_tolerance;
        let (a, b) = (segment.start, segment.end);
        if baseline.is_horizontal() {
            (pos.y - a.y).abs() < tolerance
                && pos.x > a.x.min(b.x) - BASELINE_SLACK
                && pos.x < a.x.max(b.x) + BASELINE_SLACK
        } else {
            (pos.x - a.x).abs() < tolerance
                && pos.y > a.y.min(b.y) - BASELINE_SLACK
                && pos.y < a.y.max(b.y) + BASELINE_SLACK
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::body::{BodyId, BodyKind};

    fn setup() -> (Aimer, RigidBody, BaselineSegment) {
        let config = GameConfig::default();
        let segment = *config.geometry.baseline(Baseline::Bottom);
        let striker = RigidBody::new(
            BodyId(1),
            BodyKind::Striker,
            segment.midpoint(),
            config.physics.striker,
        );
        (Aimer::new(config.aim), striker, segment)
    }

    #[test]
    fn test_press_on_striker_waits_for_drag() {
        let (mut aimer, striker, segment) = setup();
        let start = striker.pos + DVec2::new(10.0, 0.0);
        assert_eq!(aimer.begin(start, &striker, Baseline::Bottom, &segment), None);
        assert_eq!(aimer.state(), AimState::DragCheck);

        // Below the drag threshold nothing is decided
        let update = aimer.update(start + DVec2::new(3.0, 0.0), start, Baseline::Bottom, &segment);
        assert_eq!(update, AimUpdate::None);
        assert_eq!(aimer.state(), AimState::DragCheck);

        // Sideways drag slides the striker
        let pos = start + DVec2::new(40.0, 2.0);
        let update = aimer.update(pos, start, Baseline::Bottom, &segment);
        assert_eq!(aimer.state(), AimState::Positioning);
        assert_eq!(update, AimUpdate::Reposition(DVec2::new(pos.x, 700.0)));
    }

    #[test]
    fn test_pull_back_fires_opposite_way() {
        let (mut aimer, striker, segment) = setup();
        let start = striker.pos;
        aimer.begin(start, &striker, Baseline::Bottom, &segment);

        // Pull 100 units straight down: half power, shot goes up
        let pos = start + DVec2::new(0.0, 100.0);
        let update = aimer.update(pos, start, Baseline::Bottom, &segment);
        assert_eq!(aimer.state(), AimState::Aiming);
        assert_eq!(aimer.power(), 0.5);
        assert_eq!(update, AimUpdate::Aim(DVec2::new(0.0, -1700.0)));
        assert!((aimer.angle_degrees() - 270.0).abs() < 1e-9);

        assert_eq!(aimer.end(), Some(DVec2::new(0.0, -1700.0)));
        assert_eq!(aimer.state(), AimState::Idle);
    }

    #[test]
    fn test_power_is_capped() {
        let (mut aimer, striker, segment) = setup();
        let start = DVec2::new(450.0, 450.0);
        aimer.begin(start, &striker, Baseline::Bottom, &segment);
        assert_eq!(aimer.state(), AimState::Aiming);

        aimer.update(start + DVec2::new(0.0, 500.0), start, Baseline::Bottom, &segment);
        assert_eq!(aimer.power(), 1.0);
        assert_eq!(aimer.end(), Some(DVec2::new(0.0, -3400.0)));
    }

    #[test]
    fn test_weak_shot_is_discarded() {
        let (mut aimer, striker, segment) = setup();
        let start = DVec2::new(450.0, 450.0);
        aimer.begin(start, &striker, Baseline::Bottom, &segment);
        let update = aimer.update(start + DVec2::new(0.0, 3.0), start, Baseline::Bottom, &segment);
        assert_eq!(update, AimUpdate::None);
        assert_eq!(aimer.end(), None);
    }

    #[test]
    fn test_press_on_baseline_positions() {
        let (mut aimer, striker, segment) = setup();
        let moved = aimer.begin(DVec2::new(200.0, 720.0), &striker, Baseline::Bottom, &segment);
        assert_eq!(aimer.state(), AimState::Positioning);
        assert_eq!(moved, Some(DVec2::new(200.0, 700.0)));

        // Past the end of the line the striker stops at the end
        let update = aimer.update(
            DVec2::new(900.0, 700.0),
            DVec2::new(200.0, 720.0),
            Baseline::Bottom,
            &segment,
        );
        assert_eq!(update, AimUpdate::Reposition(DVec2::new(715.0, 700.0)));
        assert_eq!(aimer.end(), None);
    }

    #[test]
    fn test_vertical_baseline_drag_check() {
        let config = GameConfig::default();
        let segment = *config.geometry.baseline(Baseline::Left);
        let striker = RigidBody::new(
            BodyId(1),
            BodyKind::Striker,
            segment.midpoint(),
            config.physics.striker,
        );
        let mut aimer = Aimer::new(config.aim);

        aimer.begin(striker.pos, &striker, Baseline::Left, &segment);
        let pos = striker.pos + DVec2::new(1.0, 30.0);
        aimer.update(pos, striker.pos, Baseline::Left, &segment);
        assert_eq!(aimer.state(), AimState::Positioning);
    }
}
