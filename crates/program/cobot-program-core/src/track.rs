//! Track: a start anchor, an ordered list of actions and a list of modifiers.
//!
//! Chaining invariant: the initial point of every move equals the waypoint
//! of the previous move on the track, or the start anchor's waypoint when
//! there is none. Every structural edit below re-establishes it.

use crate::action::Action;
use crate::modifier::{Modifier, ModifierKind};
use crate::pose::Pose;

/// Duration of the anchor move a new track starts with, in seconds.
pub const START_MOVE_DURATION: f64 = 0.5;

#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    start_move: Action,
    actions: Vec<Action>,
    modifiers: Vec<Modifier>,
}

impl Track {
    /// Empty track anchored at `start_pose`.
    pub fn new(start_pose: Pose) -> Self {
        Self::with_start(start_pose, START_MOVE_DURATION)
    }

    pub fn with_start(start_pose: Pose, start_duration: f64) -> Self {
        Self {
            start_move: Action::start_move(start_pose, start_duration),
            actions: Vec::new(),
            modifiers: Vec::new(),
        }
    }

    /// Empties actions and modifiers; the start anchor stays.
    pub fn clear(&mut self) {
        self.actions.clear();
        self.modifiers.clear();
    }

    #[inline]
    pub fn start_move(&self) -> &Action {
        &self.start_move
    }

    pub fn start_move_waypoint(&self) -> Pose {
        self.start_move
            .as_move()
            .map(|m| *m.waypoint())
            .unwrap_or_default()
    }

    /// Overwrite the anchor pose and re-chain the first move.
    pub fn set_start_move_waypoint(&mut self, waypoint: Pose) {
        self.start_move.set_initial_point(waypoint);
        self.start_move.set_waypoint(waypoint);
        self.update_first_move_initial_point(waypoint);
    }

    #[inline]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Mutable view of the actions. Waypoints and initial points can only
    /// change through the track's edit methods, so the chain holds.
    #[inline]
    pub fn actions_mut(&mut self) -> &mut [Action] {
        &mut self.actions
    }

    #[inline]
    pub fn action(&self, index: usize) -> Option<&Action> {
        self.actions.get(index)
    }

    #[inline]
    pub fn action_mut(&mut self, index: usize) -> Option<&mut Action> {
        self.actions.get_mut(index)
    }

    #[inline]
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    #[inline]
    pub fn modifiers_mut(&mut self) -> &mut [Modifier] {
        &mut self.modifiers
    }

    #[inline]
    pub fn modifier(&self, index: usize) -> Option<&Modifier> {
        self.modifiers.get(index)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Sum of the action durations.
    pub fn duration(&self) -> f64 {
        self.actions.iter().map(Action::duration).sum()
    }

    /// Index of the closest move strictly before `index`.
    pub fn previous_move(&self, index: usize) -> Option<usize> {
        if index == 0 || self.actions.is_empty() {
            return None;
        }
        let end = index.min(self.actions.len());
        (0..end).rev().find(|&i| self.actions[i].is_move())
    }

    /// Index of the closest move strictly after `index`.
    pub fn next_move(&self, index: usize) -> Option<usize> {
        if self.actions.is_empty() || index + 1 >= self.actions.len() {
            return None;
        }
        (index + 1..self.actions.len()).find(|&i| self.actions[i].is_move())
    }

    /// Index of the first move on the track.
    pub fn first_move(&self) -> Option<usize> {
        self.actions.iter().position(Action::is_move)
    }

    /// Point a move at `index` has to start from to keep the chain.
    pub fn chained_initial_point(&self, index: usize) -> Pose {
        self.previous_move(index)
            .and_then(|i| self.actions[i].as_move())
            .map(|m| *m.waypoint())
            .unwrap_or_else(|| self.start_move_waypoint())
    }

    /// Overwrite the initial point of the next move after `index`.
    pub fn update_next_move_initial_point(&mut self, index: usize, initial_point: Pose) {
        if let Some(next) = self.next_move(index) {
            self.actions[next].set_initial_point(initial_point);
        }
    }

    pub fn update_first_move_initial_point(&mut self, initial_point: Pose) {
        if let Some(first) = self.first_move() {
            self.actions[first].set_initial_point(initial_point);
        }
    }

    /// Overwrite a move's waypoint and re-chain the move after it.
    /// Returns false if `index` is not a move.
    pub fn set_move_waypoint(&mut self, index: usize, waypoint: Pose) -> bool {
        match self.actions.get_mut(index) {
            Some(action) if action.is_move() => {
                action.set_waypoint(waypoint);
                self.update_next_move_initial_point(index, waypoint);
                true
            }
            _ => false,
        }
    }

    pub fn push_action(&mut self, mut action: Action) {
        if action.is_move() {
            action.set_initial_point(self.chained_initial_point(self.actions.len()));
        }
        self.actions.push(action);
    }

    /// Insert at `index`; past the end appends.
    pub fn insert_action(&mut self, index: usize, mut action: Action) {
        if index >= self.actions.len() {
            self.push_action(action);
            return;
        }
        let waypoint = action.as_move().map(|m| *m.waypoint());
        if waypoint.is_some() {
            action.set_initial_point(self.chained_initial_point(index));
        }
        self.actions.insert(index, action);
        if let Some(waypoint) = waypoint {
            self.update_next_move_initial_point(index, waypoint);
        }
    }

    /// Remove the action at `index`. Out of range is logged and ignored.
    pub fn delete_action(&mut self, index: usize) -> Option<Action> {
        if index >= self.actions.len() {
            log::error!(
                "delete_action: index {index} out of range ({} actions)",
                self.actions.len()
            );
            return None;
        }
        let removed = self.actions.remove(index);
        if removed.is_move() {
            // whatever now sits at `index` onwards must start where the removed move did
            let initial_point = self.chained_initial_point(index);
            if let Some(next) = (index..self.actions.len()).find(|&i| self.actions[i].is_move()) {
                self.actions[next].set_initial_point(initial_point);
            }
        }
        Some(removed)
    }

    /// Insert a copy of the action at `index` right after it.
    pub fn duplicate_action(&mut self, index: usize) -> bool {
        match self.actions.get(index) {
            Some(action) => {
                let copy = action.duplicate();
                self.insert_action(index + 1, copy);
                true
            }
            None => {
                log::error!("duplicate_action: index {index} out of range");
                false
            }
        }
    }

    /// Replace the action at `index` with `action`.
    pub fn replace_action(&mut self, index: usize, action: Action) -> bool {
        if index >= self.actions.len() {
            log::error!("replace_action: index {index} out of range");
            return false;
        }
        self.insert_action(index + 1, action);
        self.delete_action(index).is_some()
    }

    /// Append a modifier; a repeat covers every action on the track.
    pub fn push_modifier(&mut self, mut modifier: Modifier) {
        let end_time = self.duration();
        Self::anchor_modifier(&mut modifier, end_time);
        self.modifiers.push(modifier);
    }

    /// Insert a modifier at `index`; a repeat covers the first `index` actions.
    /// Past the end of the modifier list it is appended, still covering
    /// `index` actions.
    pub fn insert_modifier(&mut self, index: usize, mut modifier: Modifier) {
        let end_time: f64 = self
            .actions
            .iter()
            .take(index)
            .map(Action::duration)
            .sum();
        Self::anchor_modifier(&mut modifier, end_time);
        let at = index.min(self.modifiers.len());
        self.modifiers.insert(at, modifier);
    }

    fn anchor_modifier(modifier: &mut Modifier, end_time: f64) {
        if let Some(repeat) = modifier.as_repeat_mut() {
            repeat.set_end_time(end_time);
        }
    }

    /// Keep a modifier exactly as given (used when loading a program file).
    pub(crate) fn restore_modifier(&mut self, modifier: Modifier) {
        self.modifiers.push(modifier);
    }

    /// A repeat running once over the whole track.
    pub fn push_repeat(&mut self) {
        self.push_modifier(Modifier::repeat(1, 0.0, 0.0));
    }

    pub fn insert_repeat(&mut self, index: usize) {
        self.insert_modifier(index, Modifier::repeat(1, 0.0, 0.0));
    }

    pub fn pop_modifier(&mut self) -> Option<Modifier> {
        self.modifiers.pop()
    }

    pub fn delete_modifier(&mut self, index: usize) -> Option<Modifier> {
        if index >= self.modifiers.len() {
            log::error!(
                "delete_modifier: index {index} out of range ({} modifiers)",
                self.modifiers.len()
            );
            return None;
        }
        Some(self.modifiers.remove(index))
    }

    /// Let every modifier rewrite `time`. Returns whether any of them did.
    pub fn apply_modifiers(&mut self, time: &mut f64) -> bool {
        let mut changed = false;
        for modifier in self.modifiers.iter_mut() {
            changed |= modifier.modify(time);
        }
        changed
    }

    pub fn reset_modifiers(&mut self) {
        for modifier in self.modifiers.iter_mut() {
            modifier.reset();
        }
    }

    /// Repeat sections currently on the track.
    pub fn repeats(&self) -> impl Iterator<Item = &crate::modifier::Repeat> {
        self.modifiers.iter().filter_map(|m| match m.kind() {
            ModifierKind::Repeat(r) => Some(r),
        })
    }

    /// The one action active across a step starting at `time`, with its block start.
    ///
    /// Forward play picks the first block with `end - time > eps`; reverse play
    /// picks the first with `end - time - dt > eps`, i.e. the block holding the
    /// end of the step in the current direction.
    pub fn active_action(
        &self,
        time: f64,
        dt: f64,
        reverse: bool,
        eps: f64,
    ) -> Option<(usize, f64)> {
        let mut block_start = 0.0;
        let mut block_end = 0.0;
        for (index, action) in self.actions.iter().enumerate() {
            block_end += action.duration();
            let inside = if reverse {
                block_end - time - dt > eps
            } else {
                block_end - time > eps
            };
            if inside {
                return Some((index, block_start));
            }
            block_start = block_end;
        }
        None
    }

    pub fn set_draw_trajectory(&mut self, draw: bool) {
        for action in self.actions.iter_mut() {
            if let Some(m) = action.as_move_mut() {
                m.set_draw_trajectory(draw);
            }
        }
    }

    pub fn highlight_trajectory(&mut self, index: usize, highlight: bool) {
        if let Some(m) = self.actions.get_mut(index).and_then(Action::as_move_mut) {
            m.highlight_trajectory(highlight);
        }
    }

    /// Whether every move starts where the chain says it should.
    pub fn is_chained(&self) -> bool {
        self.actions.iter().enumerate().all(|(i, action)| match action.as_move() {
            Some(m) => *m.initial_point() == self.chained_initial_point(i),
            None => true,
        })
    }
}
