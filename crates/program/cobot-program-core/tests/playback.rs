mod common;

use cobot_program_core::{Action, ActionChoice, Gripper, Pose, ProgramPlayer};
use common::{approx, tick, Clock, SharedField, Solver};

fn move_to(x: f64, duration: f64) -> Action {
    Action::new_move(Pose::identity(), Pose::from_center([x, 0.0, 0.0]), duration, true)
}

fn driving_player(solver: &Solver, actions: Vec<Action>) -> ProgramPlayer {
    let mut player = ProgramPlayer::default();
    player.attach_controller(solver);
    for action in actions {
        player.program_mut().add_action(action, 0);
    }
    player.set_driving(true);
    player
}

#[test]
fn playback_freezes_at_program_end() {
    let mut solver = Solver::default();
    let mut clock = Clock::with_dt(0.1);
    let mut player = driving_player(&solver, vec![move_to(10.0, 2.0), Action::wait(1.0)]);
    approx(player.program().duration(), 3.0, 1e-12);

    for _ in 0..50 {
        tick(&mut player, &mut clock, &mut solver);
    }
    assert_eq!(player.time(), 3.0);
    assert_eq!(clock.time, 3.0);
    approx(solver.target.center[0], 10.0, 1e-9);

    let writes = solver.writes;
    for _ in 0..10 {
        tick(&mut player, &mut clock, &mut solver);
    }
    player.step_program(0.1, false, &mut solver);
    assert_eq!(solver.writes, writes);
    assert_eq!(player.time(), 3.0);
}

#[test]
fn repeat_flag_restarts_from_zero() {
    let mut solver = Solver::default();
    let mut clock = Clock::with_dt(0.1);
    let mut player = driving_player(&solver, vec![move_to(4.0, 1.0), Action::wait(1.0)]);
    player.set_repeat(true);

    let mut max_time: f64 = 0.0;
    for _ in 0..25 {
        tick(&mut player, &mut clock, &mut solver);
        max_time = max_time.max(player.time());
    }
    assert!(max_time <= 2.0 + 1e-9, "max_time={max_time}");
    assert!(player.time() > 0.0 && player.time() < 1.0, "time={}", player.time());
    // second lap is on the move again
    approx(solver.target.center[0], 4.0 * player.time(), 1e-9);
}

#[test]
fn reverse_flag_plays_back_and_forth() {
    let mut solver = Solver::default();
    let mut clock = Clock::with_dt(0.1);
    let mut player = driving_player(&solver, vec![move_to(10.0, 3.0)]);
    player.set_reverse(true);

    for _ in 0..35 {
        tick(&mut player, &mut clock, &mut solver);
    }
    assert!(player.is_playing_reverse());
    assert!(player.time() > 2.0 && player.time() < 2.95, "time={}", player.time());
    // the pose tracks the end of the last step in either direction
    approx(solver.target.center[0], 10.0 * player.time() / 3.0, 1e-9);

    for _ in 0..30 {
        tick(&mut player, &mut clock, &mut solver);
    }
    assert!(!player.is_playing_reverse());
    assert!(player.time() > 0.0 && player.time() < 1.0, "time={}", player.time());
    approx(solver.target.center[0], 10.0 * player.time() / 3.0, 1e-9);
}

#[test]
fn repeat_modifier_rewinds_then_program_ends() {
    let mut solver = Solver::default();
    let mut clock = Clock::with_dt(0.1);
    let mut player = driving_player(&solver, vec![Action::wait(1.0), Action::wait(1.0)]);
    player.program_mut().track_mut(0).unwrap().push_repeat();
    player
        .program_mut()
        .track_mut(0)
        .unwrap()
        .modifiers_mut()[0]
        .as_repeat_mut()
        .unwrap()
        .set_iterations(2);
    player.restart(&mut clock);

    let mut rewinds = 0;
    let mut previous = player.time();
    for _ in 0..100 {
        tick(&mut player, &mut clock, &mut solver);
        if player.time() < previous - 0.5 {
            rewinds += 1;
        }
        previous = player.time();
    }
    assert_eq!(rewinds, 2);
    assert_eq!(player.time(), 2.0);
}

#[test]
fn pick_drives_the_gripper_during_playback() {
    let field = SharedField::default();
    let mut solver = Solver::default();
    let mut clock = Clock::with_dt(0.25);
    let mut player = driving_player(&solver, vec![]);
    player.set_gripper(Some(Gripper::new(Box::new(field.clone()), 2.0, 20.0)));
    assert!(player.available_actions().contains(&ActionChoice::Pick));
    assert!(player.add_action(0, 0, ActionChoice::Pick, &solver));

    tick(&mut player, &mut clock, &mut solver);
    approx(field.value(), 15.5, 1e-12);
    tick(&mut player, &mut clock, &mut solver);
    approx(field.value(), 11.0, 1e-12);
    // picks never move the target
    assert_eq!(solver.writes, 0);
}

#[test]
fn reattaching_keeps_the_gripper() {
    let solver = Solver {
        init: Pose::from_center([0.0, 0.0, 100.0]),
        ..Default::default()
    };
    let mut player = ProgramPlayer::default();
    player.set_gripper(Some(Gripper::new(Box::new(SharedField::default()), 0.0, 10.0)));
    player.attach_controller(&solver);
    assert!(player.program().has_gripper());
    assert_eq!(player.available_actions().len(), 4);
    assert_eq!(
        player.program().track(0).unwrap().start_move_waypoint().center,
        [0.0, 0.0, 100.0]
    );
}

#[test]
fn added_moves_head_for_the_current_target() {
    let mut solver = Solver::default();
    let mut player = driving_player(&solver, vec![]);
    solver.target = Pose::from_center([1.0, 2.0, 3.0]);
    assert!(player.add_action(0, 0, ActionChoice::Move, &solver));
    solver.target = Pose::from_center([4.0, 5.0, 6.0]);
    assert!(player.add_action(0, 1, ActionChoice::Move, &solver));

    let track = player.program().track(0).unwrap();
    assert!(track.is_chained());
    let second = track.action(1).unwrap().as_move().unwrap();
    assert_eq!(second.initial_point().center, [1.0, 2.0, 3.0]);
    assert_eq!(second.waypoint().center, [4.0, 5.0, 6.0]);
    assert_eq!(track.action(1).unwrap().duration(), 1.0);
}
