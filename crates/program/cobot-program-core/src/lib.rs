//! Cobot Program Core (host-agnostic)
//!
//! Timeline engine behind the robot control panel: a [`Program`] owns
//! [`Track`]s, each track owns an ordered list of [`Action`]s (moves, picks,
//! waits) and [`Modifier`]s (repeat sections). [`ProgramPlayer`] steps the
//! program once per simulation tick and writes the interpolated pose into
//! the host's IK controller.
//!
//! The host application (scene graph, simulation clock, IK solver, gripper
//! actuator) is reached only through the traits in [`host`].

pub mod action;
pub mod config;
pub mod error;
pub mod host;
pub mod interp;
pub mod modifier;
pub mod player;
pub mod pose;
pub mod program;
pub mod program_file;
pub mod settings;
pub mod status;
pub mod target;
pub mod track;

// Re-exports for consumers (host adapters)
pub use action::{Action, ActionKind, Gripper, Move, MoveType, Pick, Trajectory};
pub use config::Config;
pub use error::{ProgramError, Result};
pub use host::{DataField, IpController, MechanicalState, SceneNode, SimulationClock};
pub use modifier::{Modifier, ModifierKind, Repeat};
pub use player::{ActionChoice, ProgramPlayer};
pub use pose::Pose;
pub use program::Program;
pub use program_file::ProgramFilePaths;
pub use settings::{AppSettings, ProjectSettings, WindowState};
pub use status::{StatusLevel, StatusMessage};
pub use target::TcpTarget;
pub use track::Track;
