use glam::{Quat, Vec3};
use hexfall_core::player::{Animation, PlayerState};
use hexfall_game::config::MovementConfig;
use hexfall_game::movement::{MotionFrame, MovementController, MovementInput, PhysicsBody, has_fallen_out};

/// Result of simulating the local character for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    pub motion: MotionFrame,
    /// The character dropped below the arena this frame and was alive until now.
    pub eliminated: bool,
}

/// Drives the physics body of the player this client owns.
#[derive(Debug, Clone)]
pub struct LocalCharacter {
    movement: MovementController,
    elimination_height: f32,
}

impl LocalCharacter {
    pub fn new(config: MovementConfig, elimination_height: f32) -> Self {
        Self {
            movement: MovementController::new(config),
            elimination_height,
        }
    }

    pub fn step(
        &mut self,
        body: &mut impl PhysicsBody,
        input: &MovementInput,
        state: &PlayerState,
    ) -> LocalFrame {
        let motion = self.movement.step(body, input);
        let eliminated = !state.dead && has_fallen_out(body.translation().y, self.elimination_height);
        LocalFrame { motion, eliminated }
    }

    /// Put the body back on its spawn point for a new round.
    pub fn respawn(&mut self, body: &mut impl PhysicsBody, starting_pos: Option<Vec3>) {
        self.movement.reset();
        body.set_linvel(Vec3::ZERO);
        body.set_angvel(Vec3::ZERO);
        body.set_rotation(Quat::IDENTITY);
        if let Some(pos) = starting_pos {
            body.set_translation(pos);
        }
    }
}

/// Rigid body state copied in from an external physics engine for one frame
/// and copied back out after the controller wrote to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub linvel: Vec3,
    pub angvel: Vec3,
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for BodySnapshot {
    fn default() -> Self {
        Self {
            linvel: Vec3::ZERO,
            angvel: Vec3::ZERO,
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl BodySnapshot {
    /// Number of floats in [`BodySnapshot::to_floats`].
    pub const FLOATS: usize = 13;

    /// Short slices fall back to zero vectors and the identity rotation.
    pub fn from_slices(linvel: &[f32], translation: &[f32], rotation: &[f32]) -> Self {
        let vec3 = |v: &[f32]| match v {
            [x, y, z, ..] => Vec3::new(*x, *y, *z),
            _ => Vec3::ZERO,
        };
        let rotation = match rotation {
            [x, y, z, w, ..] => Quat::from_xyzw(*x, *y, *z, *w).normalize(),
            _ => Quat::IDENTITY,
        };
        Self {
            linvel: vec3(linvel),
            angvel: Vec3::ZERO,
            translation: vec3(translation),
            rotation,
        }
    }

    /// linvel, angvel, translation (xyz each), then rotation (xyzw).
    pub fn to_floats(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(Self::FLOATS);
        out.extend_from_slice(&self.linvel.to_array());
        out.extend_from_slice(&self.angvel.to_array());
        out.extend_from_slice(&self.translation.to_array());
        out.extend_from_slice(&self.rotation.to_array());
        out
    }
}

impl PhysicsBody for BodySnapshot {
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

/// Pose handed to the renderer for one character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub animation: Animation,
}

impl Default for RenderTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            animation: Animation::Idle,
        }
    }
}

impl RenderTransform {
    /// Copy a remote player's replicated pose. Unset fields keep last frame's value.
    pub fn observe_remote(&mut self, state: &PlayerState) {
        if let Some(position) = state.position {
            self.position = position;
        }
        if let Some(rotation) = state.rotation {
            self.rotation = rotation;
        }
        self.animation = state.animation;
    }

    pub fn from_motion(frame: &MotionFrame) -> Self {
        Self {
            position: frame.position,
            rotation: frame.rotation,
            animation: frame.animation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Body {
        linvel: Vec3,
        translation: Vec3,
        rotation: Quat,
    }

    impl PhysicsBody for Body {
        fn linvel(&self) -> Vec3 {
            self.linvel
        }
        fn set_linvel(&mut self, linvel: Vec3) {
            self.linvel = linvel;
        }
        fn set_angvel(&mut self, _angvel: Vec3) {}
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

    #[test]
    fn eliminated_once_below_the_arena() {
        let mut character = LocalCharacter::new(MovementConfig::default(), -50.0);
        let mut body = Body {
            translation: Vec3::new(0.0, -51.0, 0.0),
            linvel: Vec3::new(0.0, -20.0, 0.0),
            ..Default::default()
        };
        let mut state = PlayerState::default();
        let frame = character.step(&mut body, &MovementInput::default(), &state);
        assert!(frame.eliminated);
        assert_eq!(frame.motion.animation, Animation::Fall);

        state.dead = true;
        let frame = character.step(&mut body, &MovementInput::default(), &state);
        assert!(!frame.eliminated);
    }

    #[test]
    fn respawn_moves_body_to_start() {
        let mut character = LocalCharacter::new(MovementConfig::default(), -50.0);
        let mut body = Body {
            translation: Vec3::new(0.0, -60.0, 0.0),
            linvel: Vec3::new(1.0, -20.0, 0.0),
            ..Default::default()
        };
        character.respawn(&mut body, Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(body.translation, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(body.linvel, Vec3::ZERO);
    }

    #[test]
    fn remote_pose_skips_unset_fields() {
        let mut transform = RenderTransform {
            position: Vec3::X,
            ..Default::default()
        };
        let state = PlayerState {
            rotation: Some(Quat::from_rotation_y(1.0)),
            animation: Animation::Run,
            ..Default::default()
        };
        transform.observe_remote(&state);
        assert_eq!(transform.position, Vec3::X);
        assert_eq!(transform.rotation, Quat::from_rotation_y(1.0));
        assert_eq!(transform.animation, Animation::Run);
    }

    #[test]
    fn snapshot_round_trips_through_floats() {
        let mut body = BodySnapshot::from_slices(&[0.0, -2.0, 0.0], &[1.0, 2.0, 3.0], &[]);
        assert_eq!(body.rotation, Quat::IDENTITY);
        body.set_angvel(Vec3::new(0.0, 2.5, 0.0));
        let floats = body.to_floats();
        assert_eq!(floats.len(), BodySnapshot::FLOATS);
        assert_eq!(&floats[..9], &[0.0, -2.0, 0.0, 0.0, 2.5, 0.0, 1.0, 2.0, 3.0]);
        assert_eq!(&floats[9..], &[0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn short_slices_use_neutral_values() {
        let body = BodySnapshot::from_slices(&[1.0], &[], &[0.0, 0.0]);
        assert_eq!(body, BodySnapshot::default());
    }
}
