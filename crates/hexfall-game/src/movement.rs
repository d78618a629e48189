use glam::{Quat, Vec3};
use hexfall_core::player::{Animation, PlayerUpdate};

use crate::config::MovementConfig;

/// The rigid body of a character, owned by the physics engine.
pub trait PhysicsBody {
    fn linvel(&self) -> Vec3;
    fn set_linvel(&mut self, linvel: Vec3);
    fn set_angvel(&mut self, angvel: Vec3);
    fn translation(&self) -> Vec3;
    fn set_translation(&mut self, translation: Vec3);
    fn rotation(&self) -> Quat;
    fn set_rotation(&mut self, rotation: Quat);
}

/// On-screen joystick snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Joystick {
    /// Stick direction in radians.
    pub angle: f32,
    pub pressed: bool,
    /// The joystick's jump button.
    pub jump: bool,
}

impl Joystick {
    /// Stick deflection as (x, y), with y negative when pushed forward.
    pub fn axes(&self) -> (f32, f32) {
        (self.angle.sin(), self.angle.cos())
    }
}

/// Everything the local player asked for this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MovementInput {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub joystick: Joystick,
}

impl MovementInput {
    fn resolve(&self, dead_zone: f32) -> (bool, bool, bool, bool, bool) {
        let stick = self.joystick;
        let (x, y) = stick.axes();
        let pushed = |cond: bool| stick.pressed && cond;
        (
            self.forward || pushed(y < -dead_zone),
            self.back || pushed(y > dead_zone),
            self.left || pushed(x < -dead_zone),
            self.right || pushed(x > dead_zone),
            self.jump || stick.jump,
        )
    }
}

/// Outcome of one simulated frame for the local character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionFrame {
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub position: Vec3,
    pub rotation: Quat,
    pub animation: Animation,
    pub airborne: bool,
    /// A jump impulse was applied this frame.
    pub jumped: bool,
}

impl MotionFrame {
    /// The replicated write for this frame.
    pub fn to_update(&self) -> PlayerUpdate {
        PlayerUpdate::Motion {
            position: self.position,
            rotation: self.rotation,
            animation: self.animation,
        }
    }
}

/// Per-character movement state with airborne/landed hysteresis.
///
/// A fresh controller starts airborne and not landed, so a character must
/// touch down once before it can jump. After a jump the body must be seen
/// falling before it counts as landed again; the slow frames around the apex
/// are not a landing.
#[derive(Debug, Clone)]
pub struct MovementController {
    config: MovementConfig,
    airborne: bool,
    landed: bool,
    awaiting_descent: bool,
}

impl MovementController {
    pub fn new(config: MovementConfig) -> Self {
        Self {
            config,
            airborne: true,
            landed: false,
            awaiting_descent: false,
        }
    }

    pub fn is_airborne(&self) -> bool {
        self.airborne
    }

    pub fn has_landed(&self) -> bool {
        self.landed
    }

    /// Put the controller back in its spawn state.
    pub fn reset(&mut self) {
        self.airborne = true;
        self.landed = false;
        self.awaiting_descent = false;
    }

    /// Read the body's velocity, apply input and write velocity back.
    pub fn step(&mut self, body: &mut impl PhysicsBody, input: &MovementInput) -> MotionFrame {
        let current = body.linvel();
        let (forward, back, left, right, jump) = input.resolve(self.config.joystick_dead_zone);

        let mut intent_z = 0.0;
        if forward {
            intent_z += self.config.speed;
        }
        if back {
            intent_z -= self.config.speed;
        }
        let mut yaw = 0.0;
        if left {
            yaw += self.config.rotation_speed;
        }
        if right {
            yaw -= self.config.rotation_speed;
        }
        let angular_velocity = Vec3::new(0.0, yaw, 0.0);
        body.set_angvel(angular_velocity);

        let horizontal = body.rotation() * Vec3::new(0.0, 0.0, intent_z);
        let mut jumped = false;
        let vy = if jump && !self.airborne && self.landed {
            self.awaiting_descent = true;
            jumped = true;
            self.config.jump_force
        } else {
            current.y
        };

        if vy < -self.config.airborne_threshold {
            self.awaiting_descent = false;
        }
        self.airborne = vy.abs() > self.config.airborne_threshold;
        self.landed = !self.airborne && !self.awaiting_descent;

        let velocity = Vec3::new(horizontal.x, vy, horizontal.z);
        body.set_linvel(velocity);

        MotionFrame {
            velocity,
            angular_velocity,
            position: body.translation(),
            rotation: body.rotation(),
            animation: select_animation(&self.config, self.airborne, velocity),
            airborne: self.airborne,
            jumped,
        }
    }
}

/// Pick the animation clip for a velocity, highest priority first.
pub fn select_animation(config: &MovementConfig, airborne: bool, velocity: Vec3) -> Animation {
    let horizontal = velocity.x.abs() + velocity.z.abs();
    if airborne && velocity.y > config.jump_up_speed {
        Animation::JumpUp
    } else if airborne && velocity.y < -config.fall_speed {
        Animation::Fall
    } else if horizontal > config.run_speed || airborne {
        Animation::Run
    } else {
        Animation::Idle
    }
}

/// True when a body at `y` is below the bottom of the arena.
pub fn has_fallen_out(y: f32, elimination_height: f32) -> bool {
    y < elimination_height
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use super::*;

    /// Minimal rigid body that just stores what it is told.
    #[derive(Debug, Clone, Default)]
    struct TestBody {
        linvel: Vec3,
        angvel: Vec3,
        translation: Vec3,
        rotation: Quat,
    }

    impl PhysicsBody for TestBody {
        fn linvel(&self) -> Vec3 {
            self.linvel
        }
        fn set_linvel(&mut self, linvel: Vec3) {
            self.linvel = linvel;
        }
        fn set_angvel(&mut self, angvel: Vec3) {
            self.angvel = angvel;
        }
        fn translation(&self) -> Vec3 {
            self.translation
        }
        fn set_translation(&mut self, translation: Vec3) {
            self.translation = translation;
        }
        fn rotation(&self) -> Quat {
            self.rotation
        }
        fn set_rotation(&mut self, rotation: Quat) {
            self.rotation = rotation;
        }
    }

    fn controller() -> MovementController {
        MovementController::new(MovementConfig::default())
    }

    fn grounded() -> MovementController {
        let mut c = controller();
        c.step(&mut TestBody::default(), &MovementInput::default());
        c
    }

    #[test]
    fn starts_airborne_and_cannot_jump() {
        let mut c = controller();
        assert!(c.is_airborne());
        let mut body = TestBody::default();
        let frame = c.step(
            &mut body,
            &MovementInput {
                jump: true,
                ..Default::default()
            },
        );
        assert!(!frame.jumped);
        assert!(c.has_landed());
    }

    #[test]
    fn jump_after_landing() {
        let mut c = grounded();
        let mut body = TestBody::default();
        let frame = c.step(
            &mut body,
            &MovementInput {
                jump: true,
                ..Default::default()
            },
        );
        assert!(frame.jumped);
        assert!((body.linvel.y - 8.0).abs() < f32::EPSILON);
        assert_eq!(frame.animation, Animation::JumpUp);

        // No double jump while still rising.
        let frame = c.step(
            &mut body,
            &MovementInput {
                jump: true,
                ..Default::default()
            },
        );
        assert!(!frame.jumped);
    }

    #[test]
    fn no_jump_at_the_apex() {
        let mut c = grounded();
        let mut body = TestBody::default();
        let jump = MovementInput {
            jump: true,
            ..Default::default()
        };
        assert!(c.step(&mut body, &jump).jumped);

        // Vertical speed crosses the grounded band near the top of the arc.
        body.translation = Vec3::new(0.0, 3.0, 0.0);
        for vy in [0.5, 0.0, -0.5] {
            body.linvel = Vec3::new(0.0, vy, 0.0);
            let frame = c.step(&mut body, &jump);
            assert!(!frame.jumped, "jumped mid-air at vy={vy}");
            assert!(!frame.airborne);
            assert!(!c.has_landed());
        }

        // Falling, then touching down, re-arms the jump.
        body.linvel = Vec3::new(0.0, -6.0, 0.0);
        assert!(!c.step(&mut body, &jump).jumped);
        body.linvel = Vec3::ZERO;
        c.step(&mut body, &MovementInput::default());
        assert!(c.has_landed());
        assert!(c.step(&mut body, &jump).jumped);
    }

    #[test]
    fn reset_clears_a_pending_jump() {
        let mut c = grounded();
        let mut body = TestBody::default();
        c.step(
            &mut body,
            &MovementInput {
                jump: true,
                ..Default::default()
            },
        );
        c.reset();
        body.linvel = Vec3::ZERO;
        c.step(&mut body, &MovementInput::default());
        assert!(c.has_landed());
    }

    #[test]
    fn forward_follows_body_yaw() {
        let mut c = grounded();
        let mut body = TestBody {
            rotation: Quat::from_rotation_y(PI / 2.0),
            ..Default::default()
        };
        let frame = c.step(
            &mut body,
            &MovementInput {
                forward: true,
                ..Default::default()
            },
        );
        assert!((frame.velocity.x - 4.2).abs() < 1e-4);
        assert!(frame.velocity.z.abs() < 1e-4);
        assert_eq!(frame.animation, Animation::Run);
    }

    #[test]
    fn left_and_right_set_yaw_speed() {
        let mut c = grounded();
        let mut body = TestBody::default();
        c.step(
            &mut body,
            &MovementInput {
                left: true,
                ..Default::default()
            },
        );
        assert!((body.angvel.y - 2.5).abs() < f32::EPSILON);
        c.step(
            &mut body,
            &MovementInput {
                left: true,
                right: true,
                ..Default::default()
            },
        );
        assert!(body.angvel.y.abs() < f32::EPSILON);
    }

    #[test]
    fn joystick_needs_press_and_leaves_dead_zone() {
        let mut c = grounded();
        let mut body = TestBody::default();
        // angle PI points the stick at y = -1, forward.
        let stick = Joystick {
            angle: PI,
            pressed: false,
            jump: false,
        };
        let frame = c.step(
            &mut body,
            &MovementInput {
                joystick: stick,
                ..Default::default()
            },
        );
        assert!(frame.velocity.z.abs() < f32::EPSILON);

        let frame = c.step(
            &mut body,
            &MovementInput {
                joystick: Joystick {
                    pressed: true,
                    ..stick
                },
                ..Default::default()
            },
        );
        assert!((frame.velocity.z - 4.2).abs() < 1e-4);
    }

    #[test]
    fn falling_body_keeps_its_vertical_speed() {
        let mut c = grounded();
        let mut body = TestBody {
            linvel: Vec3::new(0.0, -7.0, 0.0),
            ..Default::default()
        };
        let frame = c.step(&mut body, &MovementInput::default());
        assert!(frame.airborne);
        assert!((body.linvel.y + 7.0).abs() < f32::EPSILON);
        assert_eq!(frame.animation, Animation::Fall);
    }

    #[test]
    fn animation_priority() {
        let config = MovementConfig::default();
        assert_eq!(
            select_animation(&config, true, Vec3::new(0.0, 3.0, 0.0)),
            Animation::JumpUp
        );
        assert_eq!(
            select_animation(&config, true, Vec3::new(0.0, -6.0, 0.0)),
            Animation::Fall
        );
        assert_eq!(
            select_animation(&config, true, Vec3::new(0.0, -3.0, 0.0)),
            Animation::Run
        );
        // Vertical clips win over horizontal speed.
        assert_eq!(
            select_animation(&config, true, Vec3::new(5.0, 3.0, 5.0)),
            Animation::JumpUp
        );
        assert_eq!(
            select_animation(&config, true, Vec3::new(5.0, -6.0, 0.0)),
            Animation::Fall
        );
        assert_eq!(
            select_animation(&config, false, Vec3::new(0.6, 0.0, 0.6)),
            Animation::Run
        );
        assert_eq!(
            select_animation(&config, false, Vec3::new(0.4, 0.0, 0.4)),
            Animation::Idle
        );
    }

    #[test]
    fn fallen_out_below_bottom_floor() {
        assert!(has_fallen_out(-50.5, -50.0));
        assert!(!has_fallen_out(-50.0, -50.0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn grounded_bodies_never_pick_airborne_clips(
                vx in -10.0f32..10.0,
                vy in -10.0f32..10.0,
                vz in -10.0f32..10.0,
            ) {
                let anim = select_animation(&MovementConfig::default(), false, Vec3::new(vx, vy, vz));
                prop_assert!(matches!(anim, Animation::Run | Animation::Idle));
            }

            #[test]
            fn airborne_vertical_clips_ignore_horizontal_speed(
                vx in -10.0f32..10.0,
                vz in -10.0f32..10.0,
                rising in 2.01f32..20.0,
                falling in 5.01f32..20.0,
            ) {
                let config = MovementConfig::default();
                prop_assert_eq!(
                    select_animation(&config, true, Vec3::new(vx, rising, vz)),
                    Animation::JumpUp
                );
                prop_assert_eq!(
                    select_animation(&config, true, Vec3::new(vx, -falling, vz)),
                    Animation::Fall
                );
            }

            #[test]
            fn airborne_flag_tracks_vertical_speed(vy in -20.0f32..20.0) {
                let mut c = grounded();
                let mut body = TestBody {
                    linvel: Vec3::new(0.0, vy, 0.0),
                    ..Default::default()
                };
                let frame = c.step(&mut body, &MovementInput::default());
                prop_assert_eq!(frame.airborne, vy.abs() > 1.0);
                prop_assert_eq!(c.has_landed(), vy.abs() <= 1.0);
            }
        }
    }
}
