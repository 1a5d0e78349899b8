//! Program file (`.crprog`): versioned pretty JSON.
//!
//! ```json
//! {
//!   "version": 1,
//!   "tracks": [{
//!     "startMove": { "waypoint": { "center": [..], "orientation": [..] }, "duration": 0.5 },
//!     "actions": [
//!       { "kind": "move", "duration": 1.0, "waypoint": {..},
//!         "freeInRotation": true, "type": "line" },
//!       { "kind": "pick", "duration": 1.0, "release": false,
//!         "closingDistance": 0.0, "openingDistance": 10.0 },
//!       { "kind": "wait", "duration": 1.0 }
//!     ],
//!     "modifiers": [{ "kind": "repeat", "iterations": 2, "startTime": 0.0, "endTime": 3.0 }]
//!   }]
//! }
//! ```
//!
//! Move initial points are not stored: they are re-derived from the chain
//! when the track is rebuilt.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionKind, MoveType, Pick};
use crate::error::{ProgramError, Result};
use crate::modifier::{Modifier, ModifierKind};
use crate::pose::Pose;
use crate::program::{Program, EXTENSION};
use crate::track::Track;

/// Schema version written by `export`.
pub const FORMAT_VERSION: u32 = 1;

/// Check that `path` ends in `.crprog`.
pub fn check_extension(path: &Path) -> Result<()> {
    match path.extension().and_then(OsStr::to_str) {
        Some(ext) if ext == EXTENSION => Ok(()),
        _ => Err(ProgramError::UnsupportedExtension {
            path: path.display().to_string(),
            expected: EXTENSION.to_string(),
        }),
    }
}

pub fn export(program: &Program, path: &Path) -> Result<()> {
    check_extension(path)?;
    let text = to_json_string(program)?;
    fs::write(path, text)?;
    Ok(())
}

pub fn import(path: &Path) -> Result<Vec<Track>> {
    check_extension(path)?;
    let text = fs::read_to_string(path)?;
    parse_program_json(&text)
}

/// Encode the tracks of `program` as pretty JSON.
pub fn to_json_string(program: &Program) -> Result<String> {
    let stored = StoredProgram {
        version: FORMAT_VERSION,
        tracks: program.tracks().iter().map(StoredTrack::from_track).collect(),
    };
    Ok(serde_json::to_string_pretty(&stored)?)
}

/// Parse and validate program JSON into tracks.
pub fn parse_program_json(s: &str) -> Result<Vec<Track>> {
    let stored: StoredProgram = serde_json::from_str(s)?;
    if stored.version != FORMAT_VERSION {
        return Err(ProgramError::UnsupportedVersion {
            found: stored.version,
            supported: FORMAT_VERSION,
        });
    }
    stored
        .tracks
        .into_iter()
        .enumerate()
        .map(|(i, st)| st.into_track(i))
        .collect()
}

// ----- JSON schema (serde) -----

#[derive(Serialize, Deserialize)]
struct StoredProgram {
    version: u32,
    #[serde(default)]
    tracks: Vec<StoredTrack>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTrack {
    start_move: StoredStartMove,
    #[serde(default)]
    actions: Vec<StoredAction>,
    #[serde(default)]
    modifiers: Vec<StoredModifier>,
}

#[derive(Serialize, Deserialize)]
struct StoredStartMove {
    waypoint: Pose,
    duration: f64,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum StoredAction {
    #[serde(rename_all = "camelCase")]
    Move {
        duration: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        comment: Option<String>,
        waypoint: Pose,
        #[serde(default = "default_true")]
        free_in_rotation: bool,
        #[serde(rename = "type", default = "default_move_type")]
        move_type: String,
    },
    #[serde(rename_all = "camelCase")]
    Pick {
        duration: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        comment: Option<String>,
        #[serde(default)]
        release: bool,
        closing_distance: f64,
        opening_distance: f64,
    },
    Wait {
        duration: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        comment: Option<String>,
    },
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum StoredModifier {
    #[serde(rename_all = "camelCase")]
    Repeat {
        iterations: u32,
        #[serde(default)]
        start_time: f64,
        end_time: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        comment: Option<String>,
    },
}

fn default_true() -> bool {
    true
}

fn default_move_type() -> String {
    MoveType::Line.name().to_string()
}

fn finite_or_err(what: &str, track: usize, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ProgramError::Serialization {
            reason: format!("track {track}: {what} is not a finite number"),
        })
    }
}

fn check_pose(what: &str, track: usize, pose: &Pose) -> Result<()> {
    for v in pose.center.iter().chain(pose.orientation.iter()) {
        finite_or_err(what, track, *v)?;
    }
    Ok(())
}

impl StoredTrack {
    fn from_track(track: &Track) -> Self {
        Self {
            start_move: StoredStartMove {
                waypoint: track.start_move_waypoint(),
                duration: track.start_move().duration(),
            },
            actions: track.actions().iter().map(StoredAction::from_action).collect(),
            modifiers: track
                .modifiers()
                .iter()
                .map(StoredModifier::from_modifier)
                .collect(),
        }
    }

    fn into_track(self, index: usize) -> Result<Track> {
        check_pose("start waypoint", index, &self.start_move.waypoint)?;
        let start_duration = finite_or_err("start duration", index, self.start_move.duration)?;
        let mut track = Track::with_start(self.start_move.waypoint, start_duration);
        for stored in self.actions {
            track.push_action(stored.into_action(index)?);
        }
        for stored in self.modifiers {
            track.restore_modifier(stored.into_modifier(index)?);
        }
        Ok(track)
    }
}

fn stored_comment(action_comment: &str, default: &str) -> Option<String> {
    (action_comment != default).then(|| action_comment.to_string())
}

impl StoredAction {
    fn from_action(action: &Action) -> Self {
        let duration = action.duration();
        match action.kind() {
            ActionKind::Move(m) => StoredAction::Move {
                duration,
                comment: stored_comment(action.comment(), "Move to waypoint"),
                waypoint: *m.waypoint(),
                free_in_rotation: m.free_in_rotation,
                move_type: m.move_type.name().to_string(),
            },
            ActionKind::Pick(p) => StoredAction::Pick {
                duration,
                comment: stored_comment(
                    action.comment(),
                    if p.release { "Place" } else { "Pick" },
                ),
                release: p.release,
                closing_distance: p.closing_distance,
                opening_distance: p.opening_distance,
            },
            ActionKind::Wait => StoredAction::Wait {
                duration,
                comment: stored_comment(action.comment(), "Wait"),
            },
        }
    }

    fn into_action(self, track: usize) -> Result<Action> {
        let (mut action, comment) = match self {
            StoredAction::Move {
                duration,
                comment,
                waypoint,
                free_in_rotation,
                move_type,
            } => {
                check_pose("move waypoint", track, &waypoint)?;
                let duration = finite_or_err("move duration", track, duration)?;
                let mut action =
                    Action::new_move(Pose::identity(), waypoint, duration, free_in_rotation);
                if let Some(m) = action.as_move_mut() {
                    m.move_type = MoveType::from_name(&move_type).unwrap_or_else(|| {
                        log::warn!("track {track}: unknown move type '{move_type}', using line");
                        MoveType::Line
                    });
                }
                (action, comment)
            }
            StoredAction::Pick {
                duration,
                comment,
                release,
                closing_distance,
                opening_distance,
            } => {
                let duration = finite_or_err("pick duration", track, duration)?;
                let closing = finite_or_err("closing distance", track, closing_distance)?;
                let opening = finite_or_err("opening distance", track, opening_distance)?;
                (
                    Action::pick(duration, Pick::new(release, closing, opening)),
                    comment,
                )
            }
            StoredAction::Wait { duration, comment } => {
                let duration = finite_or_err("wait duration", track, duration)?;
                (Action::wait(duration), comment)
            }
        };
        if let Some(comment) = comment {
            action.set_comment(&comment);
        }
        Ok(action)
    }
}

impl StoredModifier {
    fn from_modifier(modifier: &Modifier) -> Self {
        match modifier.kind() {
            ModifierKind::Repeat(r) => StoredModifier::Repeat {
                iterations: r.iterations(),
                start_time: r.start_time(),
                end_time: r.end_time(),
                comment: (modifier.comment() != "Repeat").then(|| modifier.comment().to_string()),
            },
        }
    }

    fn into_modifier(self, track: usize) -> Result<Modifier> {
        match self {
            StoredModifier::Repeat {
                iterations,
                start_time,
                end_time,
                comment,
            } => {
                let start_time = finite_or_err("repeat start", track, start_time)?;
                let end_time = finite_or_err("repeat end", track, end_time)?;
                let mut modifier = Modifier::repeat(iterations, end_time, start_time);
                if let Some(comment) = comment {
                    modifier.set_comment(comment);
                }
                Ok(modifier)
            }
        }
    }
}

/// Last used program directory and filename, with the control panel's defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgramFilePaths {
    directory: Option<PathBuf>,
    filename: Option<String>,
}

impl ProgramFilePaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill whatever is still unset.
    ///
    /// The directory defaults to the scene file's directory when it exists,
    /// else `user_dir`. The filename defaults to the scene file name with the
    /// program extension, else `output.crprog`.
    pub fn init(&mut self, scene_file: Option<&Path>, user_dir: &Path) {
        self.init_with_stem(scene_file, user_dir, "output");
    }

    /// Same as [`init`](Self::init) with `default_stem` replacing `output`.
    pub fn init_with_stem(
        &mut self,
        scene_file: Option<&Path>,
        user_dir: &Path,
        default_stem: &str,
    ) {
        if self.directory.is_none() {
            let scene_dir = scene_file
                .and_then(Path::parent)
                .filter(|dir| !dir.as_os_str().is_empty() && dir.is_dir());
            self.directory = Some(scene_dir.unwrap_or(user_dir).to_path_buf());
        }
        if self.filename.is_none() {
            let from_scene = scene_file
                .filter(|f| f.file_name().is_some())
                .map(|f| f.with_extension(EXTENSION))
                .and_then(|f| f.file_name().map(|n| n.to_string_lossy().into_owned()));
            self.filename =
                Some(from_scene.unwrap_or_else(|| format!("{default_stem}.{EXTENSION}")));
        }
    }

    #[inline]
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    #[inline]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// `directory/filename`, once both are known.
    pub fn path(&self) -> Option<PathBuf> {
        match (&self.directory, &self.filename) {
            (Some(dir), Some(name)) => Some(dir.join(name)),
            _ => None,
        }
    }

    /// Store the directory and filename of a path the user chose.
    pub fn remember(&mut self, path: &Path) {
        if let Some(dir) = path.parent() {
            self.directory = Some(dir.to_path_buf());
        }
        if let Some(name) = path.file_name() {
            self.filename = Some(name.to_string_lossy().into_owned());
        }
    }

    /// Append the program extension when `path` has none.
    pub fn with_program_extension(path: &Path) -> PathBuf {
        if path.extension().is_some() {
            path.to_path_buf()
        } else {
            path.with_extension(EXTENSION)
        }
    }
}
