//! Program: the set of tracks forming one robot motion script.

use std::path::Path;

use crate::action::{Action, Gripper};
use crate::config::TIME_EPSILON;
use crate::error::{ProgramError, Result};
use crate::host::IpController;
use crate::pose::Pose;
use crate::program_file;
use crate::track::Track;

/// Program file extension, without the dot.
pub const EXTENSION: &str = "crprog";

#[derive(Debug, Default)]
pub struct Program {
    tracks: Vec<Track>,
    gripper: Option<Gripper>,
}

impl Program {
    /// Program with a single empty track anchored at `start_pose`.
    pub fn new(start_pose: Pose) -> Self {
        Self {
            tracks: vec![Track::new(start_pose)],
            gripper: None,
        }
    }

    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            gripper: None,
        }
    }

    #[inline]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    #[inline]
    pub fn tracks_mut(&mut self) -> &mut [Track] {
        &mut self.tracks
    }

    #[inline]
    pub fn nb_tracks(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    #[inline]
    pub fn track_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.tracks.get_mut(index)
    }

    pub fn try_track(&self, index: usize) -> Result<&Track> {
        self.tracks.get(index).ok_or(ProgramError::TrackOutOfRange {
            index,
            len: self.tracks.len(),
        })
    }

    pub fn try_action(&self, track: usize, index: usize) -> Result<&Action> {
        let t = self.try_track(track)?;
        t.action(index).ok_or(ProgramError::ActionOutOfRange {
            track,
            index,
            len: t.actions().len(),
        })
    }

    pub fn add_track(&mut self, track: Track) {
        self.tracks.push(track);
    }

    /// Remove a track. Out of range is logged and ignored.
    pub fn remove_track(&mut self, index: usize) -> Option<Track> {
        match self.try_remove_track(index) {
            Ok(track) => Some(track),
            Err(err) => {
                log::error!("remove_track: {err}");
                None
            }
        }
    }

    pub fn try_remove_track(&mut self, index: usize) -> Result<Track> {
        if index >= self.tracks.len() {
            return Err(ProgramError::TrackOutOfRange {
                index,
                len: self.tracks.len(),
            });
        }
        Ok(self.tracks.remove(index))
    }

    /// Append `action` to the track at `track`.
    pub fn add_action(&mut self, action: Action, track: usize) {
        match self.tracks.get_mut(track) {
            Some(t) => t.push_action(action),
            None => log::error!(
                "add_action: track {track} out of range ({} tracks)",
                self.tracks.len()
            ),
        }
    }

    pub fn remove_action(&mut self, action_index: usize, track: usize) -> Option<Action> {
        match self.tracks.get_mut(track) {
            Some(t) => t.delete_action(action_index),
            None => {
                log::error!(
                    "remove_action: track {track} out of range ({} tracks)",
                    self.tracks.len()
                );
                None
            }
        }
    }

    /// Clear every track's actions and modifiers. Tracks and anchors stay.
    pub fn clear(&mut self) {
        for track in self.tracks.iter_mut() {
            track.clear();
        }
    }

    pub fn reset_modifiers(&mut self) {
        for track in self.tracks.iter_mut() {
            track.reset_modifiers();
        }
    }

    /// Longest track duration.
    pub fn duration(&self) -> f64 {
        self.tracks
            .iter()
            .map(Track::duration)
            .fold(0.0, f64::max)
    }

    /// True without tracks or when no track holds an action.
    pub fn is_empty(&self) -> bool {
        self.tracks.iter().all(Track::is_empty)
    }

    #[inline]
    pub fn extension(&self) -> &'static str {
        EXTENSION
    }

    pub fn set_gripper(&mut self, gripper: Option<Gripper>) {
        self.gripper = gripper;
    }

    #[inline]
    pub fn gripper(&self) -> Option<&Gripper> {
        self.gripper.as_ref()
    }

    #[inline]
    pub fn gripper_mut(&mut self) -> Option<&mut Gripper> {
        self.gripper.as_mut()
    }

    pub fn take_gripper(&mut self) -> Option<Gripper> {
        self.gripper.take()
    }

    #[inline]
    pub fn has_gripper(&self) -> bool {
        self.gripper.is_some()
    }

    /// Evaluate one step of every track starting at `time`.
    ///
    /// Each track applies its single active action at `time + dt` relative to
    /// the action's block start; a move's pose is forwarded to the controller.
    pub fn step_tracks(
        &mut self,
        time: f64,
        dt: f64,
        reverse: bool,
        eps: f64,
        controller: &mut dyn IpController,
    ) {
        let Self { tracks, gripper } = self;
        for track in tracks.iter() {
            let Some((index, block_start)) = track.active_action(time, dt, reverse, eps) else {
                continue;
            };
            let action = &track.actions()[index];
            let mut position = controller.tcp_position();
            if action.apply(&mut position, time + dt - block_start, gripper.as_mut()) {
                controller.set_tcp_target_position(&position);
            }
        }
    }

    /// Evaluate the program at an absolute `time`, without advancing.
    pub fn interpolate(&mut self, time: f64, controller: &mut dyn IpController) {
        self.step_tracks(time, 0.0, false, TIME_EPSILON, controller);
    }

    /// Write the program to `path`, which must carry the program extension.
    pub fn export_program(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        program_file::export(self, path)?;
        log::info!("exported program to {}", path.display());
        Ok(())
    }

    /// Replace the tracks with the ones stored at `path`.
    /// On error the current tracks are left untouched.
    pub fn import_program(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let tracks = program_file::import(path)?;
        log::info!(
            "imported program from {} ({} tracks)",
            path.display(),
            tracks.len()
        );
        self.tracks = tracks;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_program_has_one_empty_track() {
        let program = Program::new(Pose::from_center([1.0, 2.0, 3.0]));
        assert_eq!(program.nb_tracks(), 1);
        assert!(program.is_empty());
        assert_eq!(program.duration(), 0.0);
        assert!(Program::default().is_empty());
    }

    #[test]
    fn duration_is_longest_track() {
        let mut program = Program::new(Pose::identity());
        program.add_track(Track::new(Pose::identity()));
        program.add_action(Action::wait(1.0), 0);
        program.add_action(Action::wait(2.0), 1);
        program.add_action(Action::wait(2.5), 1);
        assert_eq!(program.duration(), 4.5);
        assert!(!program.is_empty());

        program.clear();
        assert!(program.is_empty());
        assert_eq!(program.nb_tracks(), 2);
    }

    #[test]
    fn bad_indices_are_ignored_or_reported() {
        let mut program = Program::new(Pose::identity());
        program.add_action(Action::wait(1.0), 4);
        assert!(program.is_empty());
        assert!(program.remove_track(3).is_none());
        assert_eq!(
            program.try_remove_track(3).unwrap_err(),
            ProgramError::TrackOutOfRange { index: 3, len: 1 }
        );
        assert!(matches!(
            program.try_action(0, 0),
            Err(ProgramError::ActionOutOfRange { track: 0, index: 0, len: 0 })
        ));
        assert!(program.remove_action(0, 9).is_none());
    }

    #[test]
    fn import_from_missing_file_keeps_tracks() {
        let mut program = Program::new(Pose::identity());
        program.add_action(Action::wait(1.0), 0);
        let err = program
            .import_program("/definitely/not/here.crprog")
            .unwrap_err();
        assert_eq!(err.category(), "io");
        assert_eq!(program.track(0).unwrap().actions().len(), 1);
    }
}
