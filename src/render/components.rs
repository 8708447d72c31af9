use bevy::prelude::*;

use crate::grid::TileCoordinate;

/// A spawned tile. The coordinate is fixed at spawn time.
#[derive(Component, Clone, Copy, Debug)]
pub struct GridTile {
    pub coord: TileCoordinate,
    pub base: Color,
    pub hover: Color,
}

#[derive(Component)]
pub struct SceneCamera;

/// Marker for the tooltip panel
#[derive(Component)]
pub struct TooltipPanel;

/// Marker for the tooltip's text
#[derive(Component)]
pub struct TooltipText;

#[derive(Component)]
pub struct ResetViewButton;

/// Floating coordinate label, kept over `anchor` in world space.
#[derive(Component, Clone, Copy, Debug)]
pub struct TileLabel {
    pub anchor: Vec3,
}

#[derive(Component)]
pub struct AxisArrow;

#[derive(Component)]
pub struct FloorGrid;

/// Orbit camera state.
///
/// `pitch` is the camera's elevation above the target in radians, `yaw` the
/// heading around +Y measured from +Z.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct View3D {
    pub target: Vec3,
    pub radius: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub pan_speed: f32,
    pub orbit_speed: f32,
}

impl Default for View3D {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            radius: 8.0,
            yaw: 0.0,
            pitch: 0.4,
            pan_speed: 0.002,
            orbit_speed: 0.01,
        }
    }
}

pub const MAX_PITCH: f32 = 1.5;

impl View3D {
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let offset = position - target;
        let radius = offset.length().max(1e-3);
        Self {
            target,
            radius,
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / radius).clamp(-1.0, 1.0).asin(),
            ..default()
        }
    }

    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + Vec3::new(sy * cp, sp, cy * cp) * self.radius
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(self.target, Vec3::Y)
    }

    pub fn orbit(&mut self, delta: Vec2) {
        self.yaw -= delta.x * self.orbit_speed;
        self.pitch = (self.pitch + delta.y * self.orbit_speed).clamp(-MAX_PITCH, MAX_PITCH);
    }

    pub fn pan(&mut self, delta: Vec2) {
        let right = Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin());
        let fwd = Vec3::new(self.yaw.sin(), 0.0, self.yaw.cos());
        self.target += (-right * delta.x - fwd * delta.y) * self.pan_speed * self.radius;
    }

    pub fn zoom(&mut self, scroll: f32) {
        self.radius = (self.radius * (1.0 - 0.1 * scroll)).clamp(0.5, 5000.0);
    }
}
