use bevy::prelude::*;

/// Marker component for the editor camera entity.
#[derive(Component, Reflect)]
pub struct BuilderCamera;

/// Spherical camera placement around a focus point.
#[derive(Component, Clone, Debug, Reflect)]
pub struct OrbitRig {
    /// Point the camera looks at.
    pub focus: Vec3,
    /// Distance from the focus.
    pub distance: f32,
    /// Rotation around +Y in radians.
    pub yaw: f32,
    /// Tilt in radians; negative looks down.
    pub pitch: f32,
}

impl OrbitRig {
    /// Camera orientation.
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Camera transform looking at the focus from `distance` away.
    pub fn transform(&self) -> Transform {
        let rotation = self.rotation();
        Transform {
            translation: self.focus + rotation * Vec3::Z * self.distance,
            rotation,
            ..default()
        }
    }
}
