//! Actions: the timed units a track plays back.
//!
//! `Action` carries what every kind shares (duration, derived speed,
//! comment); `ActionKind` holds the per-kind payload. Dispatch is a match
//! over the closed set {Move, Pick, Wait}.

use std::fmt;

use crate::host::DataField;
use crate::interp::{distance3, lerp_f64};
use crate::pose::Pose;
use crate::track::Track;

/// Duration of actions created without an explicit one, in seconds.
pub const DEFAULT_DURATION: f64 = 1.0;
/// Every action lasts at least this long, in seconds.
pub const MIN_DURATION: f64 = 0.2;
/// Comment buffer size, terminator included.
pub const COMMENT_SIZE: usize = 18;

/// Interpolation kind of a move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MoveType {
    #[default]
    Line,
}

impl MoveType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Line => "line",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "line" => Some(Self::Line),
            _ => None,
        }
    }
}

/// Visualization handle of a move: mirrors `[initial_point, waypoint]`.
/// Hosts read it to draw the segment in the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    positions: [Pose; 2],
    pub highlight: bool,
    pub draw: bool,
}

impl Trajectory {
    fn new(initial_point: Pose, waypoint: Pose) -> Self {
        Self {
            positions: [initial_point, waypoint],
            highlight: false,
            draw: true,
        }
    }

    #[inline]
    pub fn positions(&self) -> &[Pose; 2] {
        &self.positions
    }
}

/// Move payload. Also used for a track's start anchor, which has no trajectory.
#[derive(Clone, Debug, PartialEq)]
pub struct Move {
    initial_point: Pose,
    waypoint: Pose,
    pub free_in_rotation: bool,
    pub move_type: MoveType,
    trajectory: Option<Trajectory>,
}

impl Move {
    pub fn new(initial_point: Pose, waypoint: Pose, free_in_rotation: bool) -> Self {
        Self {
            initial_point,
            waypoint,
            free_in_rotation,
            move_type: MoveType::Line,
            trajectory: Some(Trajectory::new(initial_point, waypoint)),
        }
    }

    /// Start anchor: both ends at `pose`, nothing drawn.
    pub fn anchor(pose: Pose) -> Self {
        Self {
            initial_point: pose,
            waypoint: pose,
            free_in_rotation: true,
            move_type: MoveType::Line,
            trajectory: None,
        }
    }

    #[inline]
    pub fn initial_point(&self) -> &Pose {
        &self.initial_point
    }

    #[inline]
    pub fn waypoint(&self) -> &Pose {
        &self.waypoint
    }

    #[inline]
    pub fn trajectory(&self) -> Option<&Trajectory> {
        self.trajectory.as_ref()
    }

    pub(crate) fn set_initial_point(&mut self, initial_point: Pose) {
        self.initial_point = initial_point;
        self.sync_trajectory();
    }

    pub(crate) fn set_waypoint(&mut self, waypoint: Pose) {
        self.waypoint = waypoint;
        self.sync_trajectory();
    }

    pub fn set_draw_trajectory(&mut self, draw: bool) {
        if let Some(t) = self.trajectory.as_mut() {
            t.draw = draw;
        }
    }

    pub fn highlight_trajectory(&mut self, highlight: bool) {
        if let Some(t) = self.trajectory.as_mut() {
            t.highlight = highlight;
        }
    }

    fn sync_trajectory(&mut self) {
        if let Some(t) = self.trajectory.as_mut() {
            t.positions = [self.initial_point, self.waypoint];
        }
    }

    /// Straight-line distance between the two ends.
    #[inline]
    pub fn distance(&self) -> f64 {
        distance3(self.initial_point.center, self.waypoint.center)
    }

    /// Pose at `time` seconds into a move lasting `duration`.
    /// `time / duration` is not clamped; callers keep `0 <= time <= duration`.
    pub fn interpolated_position(&self, time: f64, duration: f64) -> Pose {
        match self.move_type {
            MoveType::Line => {
                let coef = time / duration;
                self.initial_point.lerp(&self.waypoint, coef)
            }
        }
    }
}

/// Pick payload. `release == true` makes it a Place.
#[derive(Clone, Debug, PartialEq)]
pub struct Pick {
    pub release: bool,
    pub closing_distance: f64,
    pub opening_distance: f64,
}

impl Pick {
    pub fn new(release: bool, closing_distance: f64, opening_distance: f64) -> Self {
        Self {
            release,
            closing_distance,
            opening_distance,
        }
    }

    /// Pick spanning the full range the gripper allows.
    pub fn from_gripper(gripper: &Gripper, release: bool) -> Self {
        Self::new(
            release,
            gripper.min_closing_distance,
            gripper.max_opening_distance,
        )
    }

    /// Gripper opening `time` seconds into a pick lasting `duration`.
    pub fn distance_at(&self, time: f64, duration: f64) -> f64 {
        let alpha = time / duration;
        if self.release {
            lerp_f64(self.closing_distance, self.opening_distance, alpha)
        } else {
            lerp_f64(self.opening_distance, self.closing_distance, alpha)
        }
    }
}

/// Gripper capability: the actuator field picks write to, and its travel bounds.
/// A program without one ignores picks.
pub struct Gripper {
    pub min_closing_distance: f64,
    pub max_opening_distance: f64,
    field: Box<dyn DataField>,
}

impl Gripper {
    pub fn new(
        field: Box<dyn DataField>,
        min_closing_distance: f64,
        max_opening_distance: f64,
    ) -> Self {
        Self {
            min_closing_distance,
            max_opening_distance,
            field,
        }
    }

    #[inline]
    pub fn field(&self) -> &dyn DataField {
        self.field.as_ref()
    }

    /// Write an opening distance through the field's text form.
    pub fn write_distance(&mut self, distance: f64) -> bool {
        self.field.read(&distance.to_string())
    }
}

impl fmt::Debug for Gripper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gripper")
            .field("min_closing_distance", &self.min_closing_distance)
            .field("max_opening_distance", &self.max_opening_distance)
            .field("value", &self.field.value_string())
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ActionKind {
    Move(Move),
    Pick(Pick),
    Wait,
}

/// A timed unit of a track.
#[derive(Clone, Debug, PartialEq)]
pub struct Action {
    duration: f64,
    min_duration: f64,
    speed: f64,
    comment: String,
    kind: ActionKind,
}

impl Action {
    fn with_kind(duration: f64, comment: &str, kind: ActionKind) -> Self {
        let mut action = Self {
            duration,
            min_duration: MIN_DURATION,
            speed: 0.0,
            comment: String::new(),
            kind,
        };
        action.set_comment(comment);
        action.check_duration();
        action.compute_speed();
        action
    }

    pub fn new_move(
        initial_point: Pose,
        waypoint: Pose,
        duration: f64,
        free_in_rotation: bool,
    ) -> Self {
        Self::with_kind(
            duration,
            "Move to waypoint",
            ActionKind::Move(Move::new(initial_point, waypoint, free_in_rotation)),
        )
    }

    /// Track anchor at `pose`. Not part of a track's action list.
    pub fn start_move(pose: Pose, duration: f64) -> Self {
        Self::with_kind(duration, "Start", ActionKind::Move(Move::anchor(pose)))
    }

    pub fn pick(duration: f64, pick: Pick) -> Self {
        let comment = if pick.release { "Place" } else { "Pick" };
        Self::with_kind(duration, comment, ActionKind::Pick(pick))
    }

    pub fn wait(duration: f64) -> Self {
        Self::with_kind(duration, "Wait", ActionKind::Wait)
    }

    #[inline]
    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    #[inline]
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ActionKind::Move(_) => "move",
            ActionKind::Pick(p) if p.release => "place",
            ActionKind::Pick(_) => "pick",
            ActionKind::Wait => "wait",
        }
    }

    #[inline]
    pub fn is_move(&self) -> bool {
        matches!(self.kind, ActionKind::Move(_))
    }

    pub fn as_move(&self) -> Option<&Move> {
        match &self.kind {
            ActionKind::Move(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_move_mut(&mut self) -> Option<&mut Move> {
        match &mut self.kind {
            ActionKind::Move(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_pick(&self) -> Option<&Pick> {
        match &self.kind {
            ActionKind::Pick(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_pick_mut(&mut self) -> Option<&mut Pick> {
        match &mut self.kind {
            ActionKind::Pick(p) => Some(p),
            _ => None,
        }
    }

    /// Independent copy, trajectory included.
    pub fn duplicate(&self) -> Action {
        self.clone()
    }

    #[inline]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    #[inline]
    pub fn min_duration(&self) -> f64 {
        self.min_duration
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration;
        self.check_duration();
        // a pick's duration is free-standing
        if !matches!(self.kind, ActionKind::Pick(_)) {
            self.compute_speed();
        }
    }

    /// Change the duration lower bound; the current duration is re-clamped.
    pub fn set_min_duration(&mut self, min_duration: f64) {
        if !min_duration.is_finite() || min_duration <= 0.0 {
            log::warn!("ignoring minimum duration {min_duration}");
            return;
        }
        self.min_duration = min_duration;
        let duration = self.duration;
        self.set_duration(duration);
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
        self.compute_duration();
    }

    /// Waypoint setter for moves; keeps speed consistent with the new distance.
    /// Tracks call it through [`Track::set_move_waypoint`].
    pub(crate) fn set_waypoint(&mut self, waypoint: Pose) {
        if let ActionKind::Move(m) = &mut self.kind {
            m.set_waypoint(waypoint);
            self.compute_speed();
        }
    }

    pub(crate) fn set_initial_point(&mut self, initial_point: Pose) {
        if let ActionKind::Move(m) = &mut self.kind {
            m.set_initial_point(initial_point);
            self.compute_speed();
        }
    }

    fn check_duration(&mut self) {
        if self.duration.is_nan() || self.duration < self.min_duration {
            self.duration = self.min_duration;
        }
    }

    fn compute_speed(&mut self) {
        if let ActionKind::Move(m) = &self.kind {
            self.speed = m.distance() / self.duration;
        }
    }

    fn compute_duration(&mut self) {
        if let ActionKind::Move(m) = &self.kind {
            if self.speed > 0.0 {
                self.duration = m.distance() / self.speed;
                self.check_duration();
            }
        }
    }

    #[inline]
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Store at most `COMMENT_SIZE - 1` bytes, cut on a char boundary.
    pub fn set_comment(&mut self, comment: &str) {
        self.comment = bounded_comment(comment);
    }

    /// Pose at `time` seconds into this action, for moves.
    pub fn interpolated_position(&self, time: f64) -> Option<Pose> {
        self.as_move()
            .map(|m| m.interpolated_position(time, self.duration))
    }

    /// Apply this action at `time` seconds into its window.
    ///
    /// Moves overwrite `position` and return true so the caller forwards it
    /// to the controller. Picks drive the gripper field and leave `position`
    /// alone; waits do nothing.
    pub fn apply(&self, position: &mut Pose, time: f64, gripper: Option<&mut Gripper>) -> bool {
        match &self.kind {
            ActionKind::Move(m) => {
                *position = m.interpolated_position(time, self.duration);
                true
            }
            ActionKind::Pick(p) => {
                if let Some(g) = gripper {
                    let distance = p.distance_at(time, self.duration);
                    if !g.write_distance(distance) {
                        log::warn!("gripper field rejected distance {distance}");
                    }
                }
                false
            }
            ActionKind::Wait => false,
        }
    }

    /// Append to `track`, fixing up the chained initial point for moves.
    pub fn push_to_track(self, track: &mut Track) {
        track.push_action(self);
    }

    /// Insert at `index` (append when past the end), fixing up neighbouring moves.
    pub fn insert_in_track(self, track: &mut Track, index: usize) {
        track.insert_action(index, self);
    }

    /// Take the action at `index` out of `track`, re-chaining the next move.
    pub fn delete_from_track(track: &mut Track, index: usize) -> Option<Action> {
        track.delete_action(index)
    }
}

/// First `COMMENT_SIZE - 1` bytes of `comment`, cut on a char boundary.
pub(crate) fn bounded_comment(comment: &str) -> String {
    let mut end = comment.len().min(COMMENT_SIZE - 1);
    while !comment.is_char_boundary(end) {
        end -= 1;
    }
    comment[..end].to_string()
}
