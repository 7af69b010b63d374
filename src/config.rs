//! Board geometry and simulation tuning
//!
//! Every constant the core depends on lives here so tests and board themes
//! can override it without touching simulation code. All sections use
//! `#[serde(default)]`, so a JSON override only needs the fields it changes.

use glam::DVec2;
use serde::{Deserialize, Deserializer, Serialize};

use crate::consts::*;
use crate::error::Error;
use crate::sim::body::BodyKind;

/// Axis-aligned playing surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// The four board edges a player can sit at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Baseline {
    Bottom,
    Top,
    Left,
    Right,
}

impl Baseline {
    /// Bottom and top baselines run along x; left and right along y
    pub fn is_horizontal(self) -> bool {
        matches!(self, Baseline::Bottom | Baseline::Top)
    }
}

/// Segment the striker may slide along before a shot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineSegment {
    pub start: DVec2,
    pub end: DVec2,
}

impl BaselineSegment {
    pub fn new(start: DVec2, end: DVec2) -> Self {
        Self { start, end }
    }

    pub fn midpoint(&self) -> DVec2 {
        (self.start + self.end) * 0.5
    }

    /// Clamp a point onto the segment
    pub fn clamp(&self, p: DVec2) -> DVec2 {
        crate::closest_point_on_segment(p, self.start, self.end)
    }

    fn is_axis_aligned(&self) -> bool {
        self.start.x == self.end.x || self.start.y == self.end.y
    }
}

/// Fixed board layout (pockets, rails, baselines)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardGeometry {
    pub bounds: Bounds,
    pub center: DVec2,
    pub pockets: [DVec2; 4],
    pub pocket_trigger_radius: f64,
    pub bottom: BaselineSegment,
    pub top: BaselineSegment,
    pub left: BaselineSegment,
    pub right: BaselineSegment,
}

impl Default for BoardGeometry {
    fn default() -> Self {
        let c = BOARD_CENTER;
        let d = POCKET_OFFSET;
        // The striker sits midway between the inner and outer rail lines
        let mid = (INNER_BASE + OUTER_BASE) / 2.0;
        let start = c - OUTER_BASE;
        let end = c + OUTER_BASE;
        Self {
            bounds: Bounds {
                min_x: BOUNDS_MIN,
                min_y: BOUNDS_MIN,
                max_x: BOUNDS_MAX,
                max_y: BOUNDS_MAX,
            },
            center: DVec2::new(c, c),
            pockets: [
                DVec2::new(c - d, c - d),
                DVec2::new(c + d, c - d),
                DVec2::new(c - d, c + d),
                DVec2::new(c + d, c + d),
            ],
            pocket_trigger_radius: POCKET_TRIGGER_RADIUS,
            bottom: BaselineSegment::new(DVec2::new(start, c + mid), DVec2::new(end, c + mid)),
            top: BaselineSegment::new(DVec2::new(start, c - mid), DVec2::new(end, c - mid)),
            left: BaselineSegment::new(DVec2::new(c - mid, start), DVec2::new(c - mid, end)),
            right: BaselineSegment::new(DVec2::new(c + mid, start), DVec2::new(c + mid, end)),
        }
    }
}

impl BoardGeometry {
    pub fn baseline(&self, baseline: Baseline) -> &BaselineSegment {
        match baseline {
            Baseline::Bottom => &self.bottom,
            Baseline::Top => &self.top,
            Baseline::Left => &self.left,
            Baseline::Right => &self.right,
        }
    }
}

/// Per-kind physical attributes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KindAttributes {
    pub radius: f64,
    pub mass: f64,
    pub restitution: f64,
}

impl KindAttributes {
    /// Carrom men and queen
    pub const PIECE: Self = Self {
        radius: PIECE_RADIUS,
        mass: PIECE_MASS,
        restitution: PIECE_RESTITUTION,
    };

    pub const STRIKER: Self = Self {
        radius: STRIKER_RADIUS,
        mass: STRIKER_MASS,
        restitution: STRIKER_RESTITUTION,
    };
}

/// Attribute fields present in a JSON override
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AttributesOverride {
    radius: Option<f64>,
    mass: Option<f64>,
    restitution: Option<f64>,
}

impl AttributesOverride {
    fn apply(self, base: KindAttributes) -> KindAttributes {
        KindAttributes {
            radius: self.radius.unwrap_or(base.radius),
            mass: self.mass.unwrap_or(base.mass),
            restitution: self.restitution.unwrap_or(base.restitution),
        }
    }
}

fn piece_attributes<'de, D: Deserializer<'de>>(de: D) -> Result<KindAttributes, D::Error> {
    Ok(AttributesOverride::deserialize(de)?.apply(KindAttributes::PIECE))
}

fn striker_attributes<'de, D: Deserializer<'de>>(de: D) -> Result<KindAttributes, D::Error> {
    Ok(AttributesOverride::deserialize(de)?.apply(KindAttributes::STRIKER))
}

/// Solver and material tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Carrom men and queen
    #[serde(deserialize_with = "piece_attributes")]
    pub piece: KindAttributes,
    #[serde(deserialize_with = "striker_attributes")]
    pub striker: KindAttributes,
    pub wall_restitution: f64,
    pub friction_base: f64,
    pub sleep_speed_sq: f64,
    pub sim_rate_hz: f64,
    pub solver_iterations: u32,
    pub max_substeps: u32,
    pub max_frame_time: f64,
    pub position_correction: f64,
    pub penetration_slop: f64,
    pub collision_event_threshold: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            piece: KindAttributes::PIECE,
            striker: KindAttributes::STRIKER,
            wall_restitution: WALL_RESTITUTION,
            friction_base: FRICTION_BASE,
            sleep_speed_sq: SLEEP_SPEED_SQ,
            sim_rate_hz: SIM_RATE_HZ,
            solver_iterations: SOLVER_ITERATIONS,
            max_substeps: MAX_SUBSTEPS,
            max_frame_time: MAX_FRAME_TIME,
            position_correction: POSITION_CORRECTION,
            penetration_slop: PENETRATION_SLOP,
            collision_event_threshold: COLLISION_EVENT_THRESHOLD,
        }
    }
}

impl PhysicsConfig {
    /// Attribute table lookup by body kind
    pub fn attributes(&self, kind: BodyKind) -> KindAttributes {
        match kind {
            BodyKind::Striker => self.striker,
            BodyKind::White | BodyKind::Black | BodyKind::Queen => self.piece,
        }
    }

    /// Fixed step length
    pub fn dt(&self) -> f64 {
        1.0 / self.sim_rate_hz
    }
}

/// How players get their piece colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorAssignment {
    /// The first carrom man a player pockets decides their colour
    #[default]
    Claim,
    /// Seats alternate white/black; the breaking player takes white
    Fixed,
}

/// Scoring and match flow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub winning_score: u32,
    /// Points credited when an own-colour piece drops
    pub piece_points: u32,
    /// Board-end value of each remaining white piece
    pub white_value: u32,
    /// Board-end value of each remaining black piece
    pub black_value: u32,
    pub queen_bonus: u32,
    /// Seconds spent on the score screen before the next board
    pub score_screen_delay: f64,
    pub color_assignment: ColorAssignment,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            winning_score: WINNING_SCORE,
            piece_points: 10,
            white_value: 20,
            black_value: 10,
            queen_bonus: 50,
            score_screen_delay: 3.0,
            color_assignment: ColorAssignment::Claim,
        }
    }
}

/// Drag-to-shoot and aim-assist tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AimConfig {
    /// Drag distance for full power
    pub max_drag: f64,
    pub max_launch_speed: f64,
    /// Shots below this power fraction are discarded
    pub min_power: f64,
    /// Pointer travel before a drag picks a mode
    pub drag_threshold: f64,
    pub baseline_tolerance: f64,
    /// Striker tap zone, in striker radii
    pub tap_radius_factor: f64,
    pub max_reflections: u32,
    /// Predicted travel distance per unit of launch speed
    pub travel_factor: f64,
    pub min_travel: f64,
}

impl Default for AimConfig {
    fn default() -> Self {
        Self {
            max_drag: 200.0,
            max_launch_speed: 3400.0,
            min_power: 0.02,
            drag_threshold: 5.0,
            baseline_tolerance: 60.0,
            tap_radius_factor: 2.0,
            max_reflections: 3,
            travel_factor: 1.5,
            min_travel: 10.0,
        }
    }
}

/// Complete core configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub geometry: BoardGeometry,
    pub physics: PhysicsConfig,
    pub rules: RulesConfig,
    pub aim: AimConfig,
}

impl GameConfig {
    /// Parse a (possibly partial) JSON override and validate it
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject configurations the simulation cannot run with
    pub fn validate(&self) -> Result<(), Error> {
        let g = &self.geometry;
        if !(g.bounds.width() > 0.0 && g.bounds.height() > 0.0) {
            return Err(Error::invalid("geometry.bounds", "empty playing area"));
        }
        if g.pocket_trigger_radius <= 0.0 {
            return Err(Error::invalid(
                "geometry.pocket_trigger_radius",
                "must be positive",
            ));
        }
        for (field, seg) in [
            ("geometry.bottom", &g.bottom),
            ("geometry.top", &g.top),
            ("geometry.left", &g.left),
            ("geometry.right", &g.right),
        ] {
            if !seg.is_axis_aligned() {
                return Err(Error::invalid(field, "baseline must be axis-aligned"));
            }
        }

        let p = &self.physics;
        for (field, attrs) in [("physics.piece", p.piece), ("physics.striker", p.striker)] {
            validate_attributes(field, attrs)?;
        }
        if !(0.0..=1.0).contains(&p.wall_restitution) {
            return Err(Error::invalid("physics.wall_restitution", "must be in [0, 1]"));
        }
        if !(p.friction_base > 0.0 && p.friction_base <= 1.0) {
            return Err(Error::invalid("physics.friction_base", "must be in (0, 1]"));
        }
        if p.sim_rate_hz.is_nan() || p.sim_rate_hz <= 0.0 {
            return Err(Error::invalid("physics.sim_rate_hz", "must be positive"));
        }
        if p.max_frame_time.is_nan() || p.max_frame_time <= 0.0 {
            return Err(Error::invalid("physics.max_frame_time", "must be positive"));
        }
        // A frame clamp shorter than one step would never let the clock advance
        if p.dt() > p.max_frame_time {
            return Err(Error::invalid(
                "physics.max_frame_time",
                format!(
                    "{} is shorter than one {:.4}s step",
                    p.max_frame_time,
                    p.dt()
                ),
            ));
        }
        if p.solver_iterations == 0 {
            return Err(Error::invalid("physics.solver_iterations", "must be at least 1"));
        }
        if p.max_substeps == 0 {
            return Err(Error::invalid("physics.max_substeps", "must be at least 1"));
        }
        if p.sleep_speed_sq < 0.0 {
            return Err(Error::invalid("physics.sleep_speed_sq", "must not be negative"));
        }

        if self.rules.winning_score == 0 {
            return Err(Error::invalid("rules.winning_score", "must be positive"));
        }
        if self.aim.max_drag <= 0.0 {
            return Err(Error::invalid("aim.max_drag", "must be positive"));
        }
        Ok(())
    }
}

fn validate_attributes(field: &'static str, attrs: KindAttributes) -> Result<(), Error> {
    if attrs.radius <= 0.0 {
        return Err(Error::invalid(field, format!("radius {} must be positive", attrs.radius)));
    }
    if attrs.mass < 0.0 {
        return Err(Error::invalid(field, format!("mass {} must not be negative", attrs.mass)));
    }
    if !(0.0..=1.0).contains(&attrs.restitution) {
        return Err(Error::invalid(
            field,
            format!("restitution {} must be in [0, 1]", attrs.restitution),
        ));
    }
    Ok(())
}
