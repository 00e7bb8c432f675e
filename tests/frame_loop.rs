use glam::Vec3;

use raymarching::config::MAX_PHYSICS_STEP;
use raymarching::controller::bouncy_balls::{BALL_CAPACITY, WALL_COUNT};
use raymarching::controller::{BouncyBalls, CursorMode, FrameLoopContext, InputEvent, Key, MouseButton};
use raymarching::model::{Camera, SceneId, SceneUniforms, ShaderUniforms};

const RESOLUTION: (u32, u32) = (900, 900);

fn context() -> FrameLoopContext {
    FrameLoopContext::with_rng(0.0, fastrand::Rng::with_seed(42))
}

fn press(ctx: &mut FrameLoopContext, key: Key) {
    ctx.push_event(InputEvent::KeyPressed(key));
}

fn release(ctx: &mut FrameLoopContext, key: Key) {
    ctx.push_event(InputEvent::KeyReleased(key));
}

#[test]
fn combined_movement_keys_add_up() {
    let mut ctx = context();
    press(&mut ctx, Key::W);
    press(&mut ctx, Key::E);
    ctx.update(0.1, RESOLUTION);

    let start = Camera::default();
    let step = start.move_speed * 0.1;
    let expected = start.eye + start.forward() * step + Vec3::Y * step;
    assert!((ctx.camera.eye - expected).length() < 1e-4, "eye = {:?}", ctx.camera.eye);
}

#[test]
fn opposite_keys_cancel() {
    let mut ctx = context();
    press(&mut ctx, Key::A);
    press(&mut ctx, Key::D);
    ctx.update(0.1, RESOLUTION);
    assert!((ctx.camera.eye - Camera::default().eye).length() < 1e-5);
}

#[test]
fn menu_toggles_once_per_release() {
    let mut ctx = context();
    ctx.push_event(InputEvent::MouseButtonPressed(MouseButton::Right));
    assert_eq!(ctx.update(0.01, RESOLUTION).cursor_mode, None);
    assert_eq!(ctx.update(0.02, RESOLUTION).cursor_mode, None, "holding must not toggle");

    ctx.push_event(InputEvent::MouseButtonReleased(MouseButton::Right));
    assert_eq!(ctx.update(0.03, RESOLUTION).cursor_mode, Some(CursorMode::Free));
    assert_eq!(ctx.update(0.04, RESOLUTION).cursor_mode, None);
    assert!(ctx.input_state.menu_mode_on);

    ctx.push_event(InputEvent::MouseButtonPressed(MouseButton::Right));
    ctx.push_event(InputEvent::MouseButtonReleased(MouseButton::Right));
    assert_eq!(ctx.update(0.05, RESOLUTION).cursor_mode, Some(CursorMode::Captured));
}

#[test]
fn mouse_look_only_while_captured() {
    let mut ctx = context();
    let yaw = ctx.camera.yaw;
    ctx.push_event(InputEvent::MouseMoved { dx: 50.0, dy: 0.0 });
    ctx.update(0.01, RESOLUTION);
    assert!(ctx.camera.yaw != yaw);

    ctx.input_state.menu_mode_on = true;
    let yaw = ctx.camera.yaw;
    ctx.push_event(InputEvent::MouseMoved { dx: 50.0, dy: 0.0 });
    ctx.update(0.02, RESOLUTION);
    assert_eq!(ctx.camera.yaw, yaw);
}

#[test]
fn at_most_one_ball_spawns_per_frame() {
    let mut ctx = context();
    let initial = BouncyBalls::live_balls(&ctx.physics);
    ctx.settings.ball_amount = initial as i32 + 3;

    for frame in 1..=3 {
        ctx.update(frame as f32 * 0.01, RESOLUTION);
        assert_eq!(BouncyBalls::live_balls(&ctx.physics), initial + frame);
    }
    for frame in 4..10 {
        ctx.update(frame as f32 * 0.01, RESOLUTION);
    }
    assert_eq!(BouncyBalls::live_balls(&ctx.physics), initial + 3);
}

#[test]
fn lowering_the_target_keeps_existing_balls() {
    let mut ctx = context();
    let initial = BouncyBalls::live_balls(&ctx.physics);
    ctx.settings.ball_amount = 5;
    ctx.update(0.01, RESOLUTION);
    assert_eq!(BouncyBalls::live_balls(&ctx.physics), initial);
}

#[test]
fn ball_count_never_exceeds_capacity() {
    let mut ctx = context();
    ctx.settings.ball_amount = 101;
    for frame in 0..120 {
        ctx.update(frame as f32 * 0.001, RESOLUTION);
    }
    assert_eq!(BouncyBalls::live_balls(&ctx.physics), BALL_CAPACITY);
    assert_eq!(ctx.physics.num_collision_objects(), WALL_COUNT + BALL_CAPACITY);
}

#[test]
fn scene_selection_precedence() {
    let mut ctx = context();
    assert_eq!(ctx.update(0.01, RESOLUTION).scene, SceneId::BouncyBalls);

    press(&mut ctx, Key::Digit1);
    press(&mut ctx, Key::Digit3);
    assert_eq!(ctx.update(0.02, RESOLUTION).scene, SceneId::Test);

    release(&mut ctx, Key::Digit1);
    release(&mut ctx, Key::Digit3);
    assert_eq!(ctx.update(0.03, RESOLUTION).scene, SceneId::Test, "scene persists after release");

    press(&mut ctx, Key::Digit2);
    press(&mut ctx, Key::Digit3);
    assert_eq!(ctx.update(0.04, RESOLUTION).scene, SceneId::Fractal);
}

#[test]
fn stalled_frame_steps_physics_once() {
    let mut ctx = context();
    let output = ctx.update(1.0, RESOLUTION);
    assert!((output.timing.delta - 1.0).abs() < 1e-6);
    assert_eq!(output.timing.physics_delta, MAX_PHYSICS_STEP);
    assert_eq!(output.physics_steps, 1);
}

#[test]
fn collision_size_change_rescales_every_ball() {
    let mut ctx = context();
    ctx.update(0.01, RESOLUTION);
    ctx.settings.collision_size = 1.5;
    ctx.update(0.02, RESOLUTION);

    for index in WALL_COUNT..ctx.physics.num_collision_objects() {
        let radius = ctx.physics.collision_radius(index).unwrap_or_default();
        assert!((radius - 1.5).abs() < 1e-5, "ball {index} has radius {radius}");
    }
}

#[test]
fn fractal_scene_carries_iteration() {
    let mut ctx = context();
    ctx.settings.fractal_iteration = 4;
    press(&mut ctx, Key::Digit2);
    let output = ctx.update(0.01, RESOLUTION);
    assert_eq!(output.scene, SceneId::Fractal);
    assert_eq!(output.uniforms.scene, SceneUniforms::Fractal { fractal_iteration: 4 });
}

#[test]
fn bouncy_uniforms_are_bounded_by_live_balls() {
    let mut ctx = context();
    ctx.settings.ball_amount = 60;
    let output = ctx.update(0.01, RESOLUTION);

    let mut block = ShaderUniforms::default();
    block.apply(&output.uniforms);
    let live = BouncyBalls::live_balls(&ctx.physics) as i32;
    assert_eq!(block.ball_amount, live);
    assert_eq!(block.resolution, [900.0, 900.0, 0.0]);
}

#[test]
fn time_uniform_is_unclamped() {
    let mut ctx = context();
    let output = ctx.update(5.0, RESOLUTION);
    assert_eq!(output.uniforms.common.time, 5.0);
    assert_eq!(output.timing.physics_delta, MAX_PHYSICS_STEP);
}

#[test]
fn escape_requests_close() {
    let mut ctx = context();
    assert!(!ctx.update(0.01, RESOLUTION).close_requested);
    press(&mut ctx, Key::Escape);
    assert!(ctx.update(0.02, RESOLUTION).close_requested);
}

fn ball_positions(ctx: &mut FrameLoopContext, now: f32) -> Vec<Vec3> {
    match ctx.update(now, RESOLUTION).uniforms.scene {
        SceneUniforms::BouncyBalls { ball_pos, .. } => ball_pos,
        other => panic!("expected bouncy balls uniforms, got {other:?}"),
    }
}

#[test]
fn ball_positions_move_between_physics_steps() {
    let mut ctx = context();
    let mut now = 0.0;
    for _ in 0..10 {
        now += MAX_PHYSICS_STEP;
        ctx.update(now, RESOLUTION);
    }

    // Frames much shorter than the fixed step must still show motion
    let mut last = ball_positions(&mut ctx, now);
    for _ in 0..10 {
        now += 0.001;
        let positions = ball_positions(&mut ctx, now);
        assert_ne!(positions, last, "frame at {now} repeated the previous positions");
        last = positions;
    }
}

fn ball_radii(ctx: &FrameLoopContext) -> Vec<f32> {
    (WALL_COUNT..ctx.physics.num_collision_objects())
        .filter_map(|index| ctx.physics.collision_radius(index))
        .collect()
}

#[test]
fn ball_scene_is_frozen_outside_scene_one() {
    for (key, scene) in [(Key::Digit2, SceneId::Fractal), (Key::Digit3, SceneId::Test)] {
        let mut ctx = context();
        ctx.update(0.01, RESOLUTION);
        let live = BouncyBalls::live_balls(&ctx.physics);
        let radii = ball_radii(&ctx);

        press(&mut ctx, key);
        assert_eq!(ctx.update(0.02, RESOLUTION).scene, scene);
        release(&mut ctx, key);

        ctx.settings.ball_amount = 60;
        ctx.settings.collision_size = 2.5;
        press(&mut ctx, Key::Space);
        for frame in 3..13 {
            let output = ctx.update(frame as f32 * 0.01, RESOLUTION);
            assert_eq!(output.scene, scene);
            assert!(!matches!(output.uniforms.scene, SceneUniforms::BouncyBalls { .. }));
        }

        assert_eq!(BouncyBalls::live_balls(&ctx.physics), live, "no spawns in {scene:?}");
        assert_eq!(ball_radii(&ctx), radii, "no rescale in {scene:?}");
        for index in WALL_COUNT..ctx.physics.num_collision_objects() {
            let v = ctx.physics.linear_velocity(index).unwrap_or_default();
            assert!(v.x.abs() < 1e-3 && v.z.abs() < 1e-3, "ball {index} was kicked in {scene:?}");
        }
    }
}
