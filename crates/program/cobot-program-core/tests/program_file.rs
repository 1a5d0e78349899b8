mod common;

use cobot_program_core::program_file::{parse_program_json, to_json_string};
use cobot_program_core::{
    Action, Modifier, Pick, Pose, Program, ProgramError, ProgramPlayer, StatusLevel, Track,
};
use cobot_test_fixtures::programs;
use common::approx;

fn sample_program() -> Program {
    let mut program = Program::new(Pose::from_center([0.0, 0.0, 200.0]));
    program.add_action(
        Action::new_move(
            Pose::identity(),
            Pose::new([10.0, -5.0, 180.0], [0.0, 0.38268343, 0.0, 0.92387953]),
            1.5,
            false,
        ),
        0,
    );
    program.add_action(Action::pick(0.8, Pick::new(true, 1.0, 12.0)), 0);
    let mut wait = Action::wait(2.25);
    wait.set_comment("settle");
    program.add_action(wait, 0);
    Modifier::repeat(3, 0.0, 0.0).push_to_track(program.track_mut(0).unwrap());

    let mut second = Track::new(Pose::from_center([1.0, 1.0, 1.0]));
    Action::new_move(Pose::identity(), Pose::from_center([2.0, 2.0, 2.0]), 0.7, true)
        .push_to_track(&mut second);
    program.add_track(second);
    program
}

#[test]
fn export_then_import_reconstructs_the_program() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.crprog");
    let original = sample_program();
    original.export_program(&path).unwrap();

    let mut loaded = Program::default();
    loaded.import_program(&path).unwrap();

    assert_eq!(loaded.nb_tracks(), original.nb_tracks());
    for (a, b) in original.tracks().iter().zip(loaded.tracks()) {
        assert_eq!(a.actions().len(), b.actions().len());
        assert!(b.is_chained());
        assert!(a.start_move_waypoint().approx_eq(&b.start_move_waypoint(), 1e-12));
        for (x, y) in a.actions().iter().zip(b.actions()) {
            assert_eq!(x.kind_name(), y.kind_name());
            assert_eq!(x.comment(), y.comment());
            approx(x.duration(), y.duration(), 1e-12);
            if let (Some(mx), Some(my)) = (x.as_move(), y.as_move()) {
                assert!(mx.waypoint().approx_eq(my.waypoint(), 1e-12));
                assert!(mx.initial_point().approx_eq(my.initial_point(), 1e-12));
                assert_eq!(mx.free_in_rotation, my.free_in_rotation);
            }
        }
        assert_eq!(a.modifiers(), b.modifiers());
    }
    approx(loaded.duration(), original.duration(), 1e-12);
}

#[test]
fn json_text_is_versioned() {
    let text = to_json_string(&sample_program()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["version"], 1);
    assert_eq!(value["tracks"][0]["actions"][1]["kind"], "pick");
    assert_eq!(value["tracks"][0]["actions"][1]["release"], true);
    assert_eq!(value["tracks"][0]["modifiers"][0]["kind"], "repeat");
    assert_eq!(parse_program_json(&text).unwrap().len(), 2);
}

#[test]
fn square_fixture_imports() {
    let mut program = Program::default();
    program
        .import_program(programs::path("square").unwrap())
        .unwrap();
    assert_eq!(program.nb_tracks(), 1);
    let track = program.track(0).unwrap();
    assert_eq!(track.actions().len(), 4);
    assert!(track.is_chained());
    approx(program.duration(), 4.0, 1e-12);
    assert_eq!(track.action(3).unwrap().comment(), "Back home");
    let first = track.action(0).unwrap().as_move().unwrap();
    assert_eq!(first.initial_point().center, [0.0, 0.0, 250.0]);
    // 50 mm in one second
    approx(track.action(0).unwrap().speed(), 50.0, 1e-12);
    assert_eq!(track.modifier(0).unwrap().as_repeat().unwrap().iterations(), 2);
}

#[test]
fn pick_and_place_fixture_imports() {
    let tracks = parse_program_json(&programs::json("pick-and-place").unwrap()).unwrap();
    let program = Program::from_tracks(tracks);
    assert_eq!(program.nb_tracks(), 2);
    let kinds: Vec<_> = program
        .track(0)
        .unwrap()
        .actions()
        .iter()
        .map(Action::kind_name)
        .collect();
    assert_eq!(kinds, ["move", "pick", "wait", "move", "place"]);
    assert_eq!(program.track(0).unwrap().action(4).unwrap().comment(), "Place");
    assert_eq!(program.track(1).unwrap().action(0).unwrap().comment(), "Idle");
    approx(program.duration(), 6.5, 1e-12);
    assert!(!program.track(0).unwrap().action(0).unwrap().as_move().unwrap().free_in_rotation);
}

#[test]
fn failed_imports_leave_the_program_alone() {
    let mut program = sample_program();
    let err = program
        .import_program(programs::path("future-version").unwrap())
        .unwrap_err();
    assert_eq!(err, ProgramError::UnsupportedVersion { found: 2, supported: 1 });
    assert_eq!(program.nb_tracks(), 2);

    let err = program.import_program("program.json").unwrap_err();
    assert!(matches!(err, ProgramError::UnsupportedExtension { .. }));
    assert_eq!(program.track(0).unwrap().actions().len(), 3);
}

#[test]
fn player_reports_file_operations_in_the_status_bar() {
    let dir = tempfile::tempdir().unwrap();
    let mut player = ProgramPlayer::default();
    player.attach_controller(&common::Solver::default());
    player.program_mut().add_action(Action::wait(1.0), 0);

    assert!(player.export_to(&dir.path().join("my_prog")));
    let written = dir.path().join("my_prog.crprog");
    assert!(written.exists());
    let status = player.take_status().unwrap();
    assert_eq!(status.level, StatusLevel::Info);
    assert_eq!(status.text, format!("Exported program [{}]", written.display()));
    assert_eq!(player.file_paths().filename(), Some("my_prog.crprog"));

    assert!(!player.export_to(&dir.path().join("notes.txt")));
    assert_eq!(player.status().unwrap().text, "Export failed to proceed.");

    let mut other = ProgramPlayer::default();
    assert!(!other.import_from(&dir.path().join("missing.crprog")));
    assert!(other.status().unwrap().is_error());
    assert_eq!(other.status().unwrap().text, "Import failed to proceed.");
    assert_eq!(other.program().nb_tracks(), 0);

    assert!(other.import_from(&written));
    assert_eq!(
        other.status().unwrap().text,
        format!("Imported program [{}]", written.display())
    );
    assert_eq!(other.program().track(0).unwrap().actions().len(), 1);
}

#[test]
fn export_uses_remembered_location() {
    let dir = tempfile::tempdir().unwrap();
    let mut player = ProgramPlayer::default();
    assert!(!player.export());
    player.init_file_paths(None, dir.path());
    assert!(player.export());
    assert!(dir.path().join("output.crprog").exists());
}

#[test]
fn only_current_version_fixtures_parse() {
    let mut keys = programs::keys();
    keys.sort();
    assert_eq!(keys, ["future-version", "pick-and-place", "square"]);
    for key in keys {
        let doc: serde_json::Value = programs::load(&key).unwrap();
        let version = doc["version"].as_u64().unwrap();
        let parsed = parse_program_json(&programs::json(&key).unwrap());
        assert_eq!(parsed.is_ok(), version == 1, "{key}");
    }
}
