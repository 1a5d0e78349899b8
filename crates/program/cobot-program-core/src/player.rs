//! Program playback controller.
//!
//! The host calls [`ProgramPlayer::animate_begin`] and
//! [`ProgramPlayer::animate_end`] around every simulation step. Between the
//! two the host advances its own clock; `animate_end` writes the player's
//! time back so modifier rewinds and end-of-program clamping win.
//!
//! Per step, while driving:
//! - modifiers of every track rewrite the time first,
//! - at the end of the program: repeat restarts from zero, reverse turns
//!   around, otherwise time freezes at the program duration,
//! - a reverse run turns forward again once it is back at zero,
//! - each track applies its one active action at the end of the step.

use std::path::Path;

use crate::action::{Action, Gripper, Pick};
use crate::config::Config;
use crate::host::{IpController, SimulationClock};
use crate::pose::Pose;
use crate::program::Program;
use crate::program_file::ProgramFilePaths;
use crate::status::StatusMessage;
use crate::track::Track;

/// Entries of the "add action" menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionChoice {
    Move,
    Pick,
    Place,
    Wait,
}

impl ActionChoice {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Move => "Move",
            Self::Pick => "Pick",
            Self::Place => "Place",
            Self::Wait => "Wait",
        }
    }

    #[inline]
    pub fn needs_gripper(&self) -> bool {
        matches!(self, Self::Pick | Self::Place)
    }
}

#[derive(Debug)]
pub struct ProgramPlayer {
    config: Config,
    program: Program,
    time: f64,
    attached: bool,
    driving: bool,
    repeat: bool,
    reverse: bool,
    playing_reverse: bool,
    time_based_display: bool,
    draw_trajectory: bool,
    paths: ProgramFilePaths,
    status: Option<StatusMessage>,
}

impl Default for ProgramPlayer {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl ProgramPlayer {
    /// Detached player with an empty program.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            program: Program::default(),
            time: 0.0,
            attached: false,
            driving: false,
            repeat: false,
            reverse: false,
            playing_reverse: false,
            time_based_display: true,
            draw_trajectory: true,
            paths: ProgramFilePaths::new(),
            status: None,
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn program(&self) -> &Program {
        &self.program
    }

    #[inline]
    pub fn program_mut(&mut self) -> &mut Program {
        &mut self.program
    }

    /// Start a fresh program anchored at the controller's initial target pose.
    /// An installed gripper carries over.
    pub fn attach_controller(&mut self, controller: &dyn IpController) {
        let start = controller.tcp_target_init_position();
        let gripper = self.program.take_gripper();
        self.program =
            Program::from_tracks(vec![Track::with_start(start, self.config.start_move_duration)]);
        self.program.set_gripper(gripper);
        self.time = 0.0;
        self.playing_reverse = false;
        self.attached = true;
        log::info!("controller attached, program anchored at {:?}", start.center);
    }

    pub fn detach_controller(&mut self) {
        self.attached = false;
        log::info!("controller detached");
    }

    /// Whether a controller is attached.
    #[inline]
    pub fn enabled(&self) -> bool {
        self.attached
    }

    #[inline]
    fn is_active(&self) -> bool {
        self.attached && self.driving
    }

    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    #[inline]
    pub fn is_driving(&self) -> bool {
        self.driving
    }

    pub fn set_driving(&mut self, driving: bool) {
        self.driving = driving;
    }

    #[inline]
    pub fn repeat(&self) -> bool {
        self.repeat
    }

    /// Turning repeat on turns reverse off.
    pub fn set_repeat(&mut self, repeat: bool) {
        self.repeat = repeat;
        if repeat {
            self.reverse = false;
        }
    }

    #[inline]
    pub fn reverse(&self) -> bool {
        self.reverse
    }

    /// Turning reverse on turns repeat off.
    pub fn set_reverse(&mut self, reverse: bool) {
        self.reverse = reverse;
        if reverse {
            self.repeat = false;
        }
    }

    /// Whether time currently runs backwards.
    #[inline]
    pub fn is_playing_reverse(&self) -> bool {
        self.playing_reverse
    }

    #[inline]
    pub fn time_based_display(&self) -> bool {
        self.time_based_display
    }

    pub fn set_time_based_display(&mut self, on: bool) {
        self.time_based_display = on;
    }

    #[inline]
    pub fn draw_trajectory(&self) -> bool {
        self.draw_trajectory
    }

    pub fn set_draw_trajectory(&mut self, draw: bool) {
        self.draw_trajectory = draw;
        for track in self.program.tracks_mut() {
            track.set_draw_trajectory(draw);
        }
    }

    pub fn set_gripper(&mut self, gripper: Option<Gripper>) {
        self.program.set_gripper(gripper);
    }

    /// Menu entries offered for a track: picks only with a gripper installed.
    pub fn available_actions(&self) -> Vec<ActionChoice> {
        [
            ActionChoice::Move,
            ActionChoice::Pick,
            ActionChoice::Place,
            ActionChoice::Wait,
        ]
        .into_iter()
        .filter(|choice| !choice.needs_gripper() || self.program.has_gripper())
        .collect()
    }

    /// Insert a new action of kind `choice` at `index` of track `track`.
    /// A move heads for the controller's current target pose.
    pub fn add_action(
        &mut self,
        track: usize,
        index: usize,
        choice: ActionChoice,
        controller: &dyn IpController,
    ) -> bool {
        let duration = self.config.default_action_duration;
        let mut action = match choice {
            ActionChoice::Move => Action::new_move(
                Pose::identity(),
                controller.tcp_target_position(),
                duration,
                true,
            ),
            ActionChoice::Wait => Action::wait(duration),
            ActionChoice::Pick | ActionChoice::Place => match self.program.gripper() {
                Some(gripper) => Action::pick(
                    duration,
                    Pick::from_gripper(gripper, choice == ActionChoice::Place),
                ),
                None => {
                    log::warn!("{} needs a gripper", choice.name());
                    return false;
                }
            },
        };
        action.set_min_duration(self.config.min_action_duration);
        let draw = self.draw_trajectory;
        match self.program.track_mut(track) {
            Some(t) => {
                t.insert_action(index, action);
                t.set_draw_trajectory(draw);
                true
            }
            None => {
                log::error!("add_action: track {track} out of range");
                false
            }
        }
    }

    /// Add a repeat over the whole track. Offered only for a track with
    /// actions and no modifier yet.
    pub fn add_repeat(&mut self, track: usize) -> bool {
        match self.program.track_mut(track) {
            Some(t) if !t.is_empty() && t.modifiers().is_empty() => {
                t.push_repeat();
                true
            }
            _ => false,
        }
    }

    /// Back to time zero with every repeat counter refilled. Edits are kept.
    pub fn restart(&mut self, clock: &mut dyn SimulationClock) {
        clock.set_time(0.0);
        self.time = 0.0;
        self.playing_reverse = false;
        self.program.reset_modifiers();
    }

    pub fn animate_begin(
        &mut self,
        clock: &mut dyn SimulationClock,
        controller: &mut dyn IpController,
    ) {
        if !self.is_active() || self.program.is_empty() {
            return;
        }

        let eps = self.config.time_epsilon;
        let step = clock.dt();
        let mut dt = if self.playing_reverse { -step } else { step };
        let duration = self.program.duration();

        for track in self.program.tracks_mut() {
            for modifier in track.modifiers_mut() {
                modifier.modify(&mut self.time);
                clock.set_time(self.time);
            }
        }

        if clock.time() >= duration - eps {
            if self.repeat {
                clock.set_time(0.0);
                self.program.reset_modifiers();
                log::debug!("end of program, restarting");
            } else if self.reverse {
                if !self.playing_reverse {
                    log::debug!("end of program, playing backwards");
                }
                self.playing_reverse = true;
                dt = -step;
            } else {
                clock.set_time(duration);
                self.time = duration;
                return;
            }
        }

        if self.playing_reverse && clock.time() <= eps {
            self.playing_reverse = false;
            dt = step;
        }

        self.time = clock.time();
        self.step_program(dt, self.playing_reverse, controller);
        self.time += dt;
    }

    /// Apply the active action of every track over a step of `dt` from the current time.
    pub fn step_program(&mut self, dt: f64, reverse: bool, controller: &mut dyn IpController) {
        if !self.is_active() {
            return;
        }
        let eps = self.config.time_epsilon;
        self.program.step_tracks(self.time, dt, reverse, eps, controller);
    }

    pub fn animate_end(&mut self, clock: &mut dyn SimulationClock) {
        if self.is_active() {
            clock.set_time(self.time);
        }
    }

    /// Horizontal cursor position on the timeline.
    ///
    /// With time-based display every action block is as wide as its duration,
    /// otherwise one unit; the first track's blocks define the mapping.
    pub fn cursor_position(&self, one_second_size: f64) -> f64 {
        if self.time_based_display {
            return self.time * one_second_size;
        }
        let Some(track) = self.program.track(0) else {
            return 0.0;
        };
        let mut block_start = 0.0;
        for (i, action) in track.actions().iter().enumerate() {
            let d = action.duration();
            if self.time < block_start + d {
                let frac = ((self.time - block_start) / d).max(0.0);
                return (i as f64 + frac) * one_second_size;
            }
            block_start += d;
        }
        track.actions().len() as f64 * one_second_size
    }

    /// Inverse of [`cursor_position`](Self::cursor_position).
    pub fn time_at_cursor(&self, position: f64, one_second_size: f64) -> f64 {
        if one_second_size <= 0.0 {
            return 0.0;
        }
        let units = (position / one_second_size).max(0.0);
        if self.time_based_display {
            return units;
        }
        let Some(track) = self.program.track(0) else {
            return 0.0;
        };
        let mut block_start = 0.0;
        for (i, action) in track.actions().iter().enumerate() {
            if units < (i + 1) as f64 {
                return block_start + (units - i as f64) * action.duration();
            }
            block_start += action.duration();
        }
        block_start
    }

    /// Jump to the time under a dragged cursor and re-evaluate the pose at once.
    pub fn scrub_to_cursor(
        &mut self,
        position: f64,
        one_second_size: f64,
        clock: &mut dyn SimulationClock,
        controller: &mut dyn IpController,
    ) {
        self.time = self.time_at_cursor(position, one_second_size);
        clock.set_time(self.time);
        self.step_program(0.0, false, controller);
    }

    #[inline]
    pub fn file_paths(&self) -> &ProgramFilePaths {
        &self.paths
    }

    /// Fill in the default program location from the scene file.
    pub fn init_file_paths(&mut self, scene_file: Option<&Path>, user_dir: &Path) {
        self.paths
            .init_with_stem(scene_file, user_dir, &self.config.default_program_filename);
    }

    /// Latest status-bar message.
    #[inline]
    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn take_status(&mut self) -> Option<StatusMessage> {
        self.status.take()
    }

    /// Import `path`; the current program is kept on failure.
    pub fn import_from(&mut self, path: &Path) -> bool {
        match self.program.import_program(path) {
            Ok(()) => {
                let draw = self.draw_trajectory;
                for track in self.program.tracks_mut() {
                    track.set_draw_trajectory(draw);
                }
                self.paths.remember(path);
                self.status = Some(StatusMessage::info(format!(
                    "Imported program [{}]",
                    path.display()
                )));
                true
            }
            Err(err) => {
                log::error!("import of {} failed ({}): {err}", path.display(), err.category());
                self.status = Some(StatusMessage::error("Import failed to proceed."));
                false
            }
        }
    }

    /// Export to `path`, adding the program extension when it has none.
    pub fn export_to(&mut self, path: &Path) -> bool {
        let path = ProgramFilePaths::with_program_extension(path);
        match self.program.export_program(&path) {
            Ok(()) => {
                self.paths.remember(&path);
                self.status = Some(StatusMessage::info(format!(
                    "Exported program [{}]",
                    path.display()
                )));
                true
            }
            Err(err) => {
                log::error!("export to {} failed ({}): {err}", path.display(), err.category());
                self.status = Some(StatusMessage::error("Export failed to proceed."));
                false
            }
        }
    }

    /// Export to the remembered location.
    pub fn export(&mut self) -> bool {
        match self.paths.path() {
            Some(path) => self.export_to(&path),
            None => {
                self.status = Some(StatusMessage::error("Export failed to proceed."));
                false
            }
        }
    }
}
