use bevy::prelude::*;

use crate::components::{Platform, PlayerState};
use crate::config::MovementTuning;

/// Per-frame movement intent after edge detection.
#[derive(Clone, Copy, Debug, Default)]
pub struct MoveIntent {
    pub move_x: f32,
    pub move_z: f32,
    /// True only on the frame the jump key went down.
    pub jump_pressed: bool,
    pub fly_up: bool,
    pub fly_down: bool,
}

#[derive(Clone, Copy)]
pub struct MotionParams {
    pub speed: f32,
    pub jump_velocity: f32,
    pub gravity: f32,
    pub gravity_enabled: bool,
    pub max_jumps: u32,
    pub fly_up_speed: f32,
    pub fly_down_speed: f32,
    pub ground_height: f32,
    pub ground_half_extent: f32,
    pub half_height: f32,
    pub platform_tolerance: f32,
    pub landing_window: f32,
    pub fall_threshold: f32,
}

impl MotionParams {
    pub fn from_tuning(
        tuning: &MovementTuning,
        speed_multiplier: f32,
        jump_multiplier: f32,
        gravity_enabled: bool,
    ) -> Self {
        Self {
            speed: tuning.move_speed * speed_multiplier,
            jump_velocity: tuning.jump_force * jump_multiplier,
            gravity: tuning.gravity,
            gravity_enabled,
            max_jumps: tuning.max_jumps,
            fly_up_speed: tuning.fly_up_speed,
            fly_down_speed: tuning.fly_down_speed,
            ground_height: tuning.ground_height,
            ground_half_extent: tuning.ground_half_extent,
            half_height: tuning.player_half_height,
            platform_tolerance: tuning.platform_tolerance,
            landing_window: tuning.landing_window,
            fall_threshold: tuning.fall_threshold,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionReport {
    pub jumped: Option<u32>,
    pub landed_on: Option<Support>,
    pub fell_out: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Support {
    Ground,
    Platform(usize),
}

/// Normalized direction scaled to a per-frame displacement. No inertia.
pub fn horizontal_displacement(move_x: f32, move_z: f32, speed: f32, dt: f32) -> Vec2 {
    let dir = Vec2::new(move_x, move_z);
    if dir == Vec2::ZERO {
        return Vec2::ZERO;
    }
    dir.normalize_or_zero() * speed * dt
}

pub fn apply_gravity(vy: &mut f32, gravity: f32, enabled: bool, dt: f32) {
    if enabled {
        *vy += gravity * dt;
    }
}

pub fn try_jump(
    jump_pressed: bool,
    jump_count: &mut u32,
    max_jumps: u32,
    jump_velocity: f32,
    vy: &mut f32,
) -> bool {
    if !jump_pressed || *jump_count >= max_jumps {
        return false;
    }
    *vy = jump_velocity;
    *jump_count += 1;
    true
}

pub fn flight_velocity(fly_up: bool, fly_down: bool, up_speed: f32, down_speed: f32) -> f32 {
    if fly_up {
        up_speed
    } else if fly_down {
        down_speed
    } else {
        0.0
    }
}

pub fn over_ground(position: Vec3, half_extent: f32) -> bool {
    position.x.abs() <= half_extent && position.z.abs() <= half_extent
}

/// First platform (level order) the player should snap onto this frame.
pub fn find_platform_landing(
    position: Vec3,
    vy: f32,
    platforms: &[Platform],
    params: &MotionParams,
) -> Option<usize> {
    if vy > 0.0 {
        return None;
    }
    let feet = position.y - params.half_height;
    platforms.iter().position(|p| {
        let top = p.top();
        p.covers(position.x, position.z, params.platform_tolerance)
            && top >= feet
            && top <= feet + params.landing_window
    })
}

fn settle(player: &mut PlayerState, y: f32) {
    player.position.y = y;
    player.velocity.y = 0.0;
    player.grounded = true;
    player.jump_count = 0;
}

pub fn step_player(
    player: &mut PlayerState,
    intent: &MoveIntent,
    platforms: &[Platform],
    params: &MotionParams,
    dt: f32,
) -> MotionReport {
    let mut report = MotionReport::default();

    let step = horizontal_displacement(intent.move_x, intent.move_z, params.speed, dt);
    player.position.x += step.x;
    player.position.z += step.y;

    if player.flying {
        player.velocity.y = flight_velocity(
            intent.fly_up,
            intent.fly_down,
            params.fly_up_speed,
            params.fly_down_speed,
        );
    } else {
        if try_jump(
            intent.jump_pressed,
            &mut player.jump_count,
            params.max_jumps,
            params.jump_velocity,
            &mut player.velocity.y,
        ) {
            report.jumped = Some(player.jump_count);
        }
        apply_gravity(
            &mut player.velocity.y,
            params.gravity,
            params.gravity_enabled,
            dt,
        );
    }
    player.position.y += player.velocity.y * dt;

    let mut landed = false;
    if player.position.y <= params.ground_height
        && over_ground(player.position, params.ground_half_extent)
    {
        settle(player, params.ground_height);
        report.landed_on = Some(Support::Ground);
        landed = true;
    }

    if let Some(index) = find_platform_landing(player.position, player.velocity.y, platforms, params)
    {
        settle(player, platforms[index].top() + params.half_height);
        report.landed_on = Some(Support::Platform(index));
        landed = true;
    }

    if !landed {
        player.grounded = false;
    }

    report.fell_out = player.position.y < params.fall_threshold;
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn params() -> MotionParams {
        MotionParams::from_tuning(&MovementTuning::default(), 1.0, 1.0, true)
    }

    fn player_at(x: f32, y: f32, z: f32) -> PlayerState {
        PlayerState::spawn_at(Vec3::new(x, y, z), 3)
    }

    #[test]
    fn idle_on_ground_does_not_drift() {
        let mut player = player_at(-3.0, 0.5, 0.0);
        let intent = MoveIntent::default();
        for _ in 0..600 {
            step_player(&mut player, &intent, &[], &params(), DT);
            assert_eq!(player.position.y, 0.5);
            assert!(player.grounded);
            assert_eq!(player.jump_count, 0);
        }
        assert_eq!(player.position.x, -3.0);
    }

    #[test]
    fn idle_on_platform_stays_on_top() {
        let platforms = vec![Platform::square(Vec3::new(10.0, 2.0, 0.0))];
        let mut player = player_at(10.0, 2.65, 0.0);
        for _ in 0..300 {
            step_player(&mut player, &MoveIntent::default(), &platforms, &params(), DT);
        }
        assert!((player.position.y - 2.65).abs() < 1e-5);
        assert!(player.grounded);
    }

    #[test]
    fn diagonal_input_is_normalized() {
        let step = horizontal_displacement(1.0, 1.0, 5.0, 1.0);
        assert!((step.length() - 5.0).abs() < 1e-4);
        assert_eq!(horizontal_displacement(0.0, 0.0, 5.0, 1.0), Vec2::ZERO);
    }

    #[test]
    fn jump_count_never_exceeds_max() {
        let mut player = player_at(-3.0, 0.5, 0.0);
        let press = MoveIntent {
            jump_pressed: true,
            ..default()
        };
        let p = params();
        assert_eq!(step_player(&mut player, &press, &[], &p, DT).jumped, Some(1));
        assert_eq!(step_player(&mut player, &press, &[], &p, DT).jumped, Some(2));
        for _ in 0..10 {
            let report = step_player(&mut player, &press, &[], &p, DT);
            assert_eq!(report.jumped, None);
            assert!(player.jump_count <= 2);
        }
        assert!(!player.grounded);
    }

    #[test]
    fn landing_resets_jump_count() {
        let mut player = player_at(-3.0, 0.5, 0.0);
        let p = params();
        step_player(
            &mut player,
            &MoveIntent {
                jump_pressed: true,
                ..default()
            },
            &[],
            &p,
            DT,
        );
        let mut frames = 0;
        while !player.grounded && frames < 600 {
            step_player(&mut player, &MoveIntent::default(), &[], &p, DT);
            frames += 1;
        }
        assert!(player.grounded);
        assert_eq!(player.jump_count, 0);
        assert_eq!(player.position.y, 0.5);
    }

    #[test]
    fn flight_holds_altitude_without_input() {
        let mut player = player_at(20.0, 12.0, 0.0);
        player.flying = true;
        player.grounded = false;
        for _ in 0..120 {
            step_player(&mut player, &MoveIntent::default(), &[], &params(), DT);
        }
        assert_eq!(player.position.y, 12.0);
        assert_eq!(player.velocity.y, 0.0);

        let up = MoveIntent {
            fly_up: true,
            ..default()
        };
        step_player(&mut player, &up, &[], &params(), DT);
        assert_eq!(player.velocity.y, 8.0);
    }

    #[test]
    fn platform_snap_uses_first_match() {
        let platforms = vec![
            Platform::square(Vec3::new(0.0, 2.0, 0.0)),
            Platform::square(Vec3::new(0.5, 2.1, 0.0)),
        ];
        let p = params();
        let landing = find_platform_landing(Vec3::new(0.2, 2.6, 0.0), -1.0, &platforms, &p);
        assert_eq!(landing, Some(0));
        // rising players pass through
        assert_eq!(
            find_platform_landing(Vec3::new(0.2, 2.6, 0.0), 3.0, &platforms, &p),
            None
        );
    }

    #[test]
    fn platform_edge_tolerance() {
        let platforms = vec![Platform::square(Vec3::new(0.0, 2.0, 0.0))];
        let p = params();
        // footprint half size 1.0 plus tolerance 0.5
        assert!(find_platform_landing(Vec3::new(1.5, 2.6, 0.0), 0.0, &platforms, &p).is_some());
        assert!(find_platform_landing(Vec3::new(1.6, 2.6, 0.0), 0.0, &platforms, &p).is_none());
    }

    #[test]
    fn falling_outside_ground_reports_out_of_bounds() {
        let mut player = player_at(40.0, 0.0, 40.0);
        player.grounded = false;
        let mut fell = false;
        for _ in 0..600 {
            if step_player(&mut player, &MoveIntent::default(), &[], &params(), DT).fell_out {
                fell = true;
                break;
            }
        }
        assert!(fell);
        assert!(player.position.y < -10.0);
    }

    #[test]
    fn disabled_gravity_leaves_player_hanging() {
        let mut player = player_at(40.0, 5.0, 0.0);
        player.grounded = false;
        let p = MotionParams::from_tuning(&MovementTuning::default(), 1.0, 1.0, false);
        for _ in 0..60 {
            step_player(&mut player, &MoveIntent::default(), &[], &p, DT);
        }
        assert_eq!(player.position.y, 5.0);
    }
}
