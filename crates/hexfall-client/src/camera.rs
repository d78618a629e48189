use glam::{Mat4, Vec3};
use hexfall_core::session::Stage;

/// Where the camera sits and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFraming {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
}

impl CameraFraming {
    /// Looking down on the whole arena.
    pub const OVERVIEW: Self = Self {
        position: Vec3::new(0.0, 16.0, 10.0),
        target: Vec3::ZERO,
        fov: 42.0,
    };

    /// Close-up on the podium.
    pub const PODIUM: Self = Self {
        position: Vec3::new(5.0, 4.0, 12.0),
        target: Vec3::new(0.0, 2.0, 0.0),
        fov: 42.0,
    };

    pub fn for_stage(stage: Stage) -> Self {
        match stage {
            Stage::Winner => Self::PODIUM,
            Stage::Lobby | Stage::Countdown | Stage::Game => Self::OVERVIEW,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov.to_radians(), aspect, 0.1, 200.0)
    }
}

/// Tracks the active framing and reports changes.
#[derive(Debug, Default)]
pub struct CameraRig {
    current: Option<CameraFraming>,
}

impl CameraRig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> CameraFraming {
        self.current.unwrap_or(CameraFraming::OVERVIEW)
    }

    /// Returns the new framing when the stage calls for a different one.
    pub fn sync(&mut self, stage: Stage) -> Option<CameraFraming> {
        let wanted = CameraFraming::for_stage(stage);
        if self.current == Some(wanted) {
            return None;
        }
        self.current = Some(wanted);
        Some(wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sync_always_reports() {
        let mut rig = CameraRig::new();
        assert_eq!(rig.sync(Stage::Lobby), Some(CameraFraming::OVERVIEW));
        assert_eq!(rig.sync(Stage::Game), None);
    }

    #[test]
    fn podium_while_winner_then_back() {
        let mut rig = CameraRig::new();
        rig.sync(Stage::Game);
        assert_eq!(rig.sync(Stage::Winner), Some(CameraFraming::PODIUM));
        assert_eq!(rig.current().target, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(rig.sync(Stage::Lobby), Some(CameraFraming::OVERVIEW));
    }

    #[test]
    fn view_matrix_looks_at_target() {
        let view = CameraFraming::OVERVIEW.view_matrix();
        let target_in_view = view.transform_point3(Vec3::ZERO);
        // Right-handed view space looks down -Z.
        assert!(target_in_view.z < 0.0);
        assert!(target_in_view.x.abs() < 1e-4);
    }
}
