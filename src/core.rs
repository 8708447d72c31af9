use bevy_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::grid::{GridLayout, TileCoordinate, TileGrid};
use crate::pick::PerspectiveRig;
use crate::{Result, TilescopeError};
use error_stack::Report;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
    pub const fn with_a(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// From a packed `0xRRGGBB` value.
    pub const fn hex(rgb: u32) -> Self {
        Self::rgb(
            ((rgb >> 16) & 0xff) as f32 / 255.0,
            ((rgb >> 8) & 0xff) as f32 / 255.0,
            (rgb & 0xff) as f32 / 255.0,
        )
    }

    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);
    pub const INDIGO: Self = Self::hex(0x433f81);
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<Color> for bevy::prelude::Color {
    #[inline]
    fn from(c: Color) -> Self {
        bevy::prelude::Color::srgba(c.r, c.g, c.b, c.a)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub color: Color,
    pub hover_color: Color,
    pub opacity: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: Color::INDIGO,
            hover_color: Color::hex(0xffd166),
            opacity: 1.0,
        }
    }
}

/// One tile to place. `color` overrides the scene style.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileSpec {
    pub at: TileCoordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl TileSpec {
    pub fn new(column: i32, layer: u32, row: i32) -> Self {
        Self {
            at: TileCoordinate::new(column, layer, row),
            name: None,
            color: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSpec {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSpec {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 5.0),
            target: Vec3::ZERO,
            fov_degrees: 50.0,
            near: 0.01,
            far: 1000.0,
        }
    }
}

impl CameraSpec {
    /// Pick rig for this camera at the given aspect ratio.
    pub fn rig(&self, aspect: f32) -> Option<PerspectiveRig> {
        PerspectiveRig::looking_at(
            self.position,
            self.target,
            self.fov_degrees.to_radians(),
            aspect,
        )
        .map(|rig| rig.with_far(self.far))
    }
}

/// Linear distance fog.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FogSpec {
    pub color: Color,
    pub start: f32,
    pub end: f32,
}

/// Which overlay pieces are shown on top of the tiles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Overlay {
    pub tooltip: bool,
    pub reset_button: bool,
    pub axes: bool,
    pub floor_grid: bool,
    /// Coordinate label floating above every tile.
    pub tile_labels: bool,
    pub bounds_helper: bool,
    /// Tile the bounds helper wraps. The whole grid when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds_target: Option<String>,
}

impl Default for Overlay {
    fn default() -> Self {
        Self {
            tooltip: true,
            reset_button: true,
            axes: true,
            floor_grid: true,
            tile_labels: false,
            bounds_helper: false,
            bounds_target: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub title: Option<String>,
    pub background: Color,
    pub fog: Option<FogSpec>,
    pub layout: GridLayout,
    pub style: Style,
    pub camera: CameraSpec,
    /// Name of a tile the camera should target at startup.
    pub focus: Option<String>,
    pub overlay: Overlay,
    pub tiles: Vec<TileSpec>,
}

impl Scene {
    /// Place every tile into a fresh registry.
    pub fn build_grid(&self) -> Result<TileGrid> {
        let mut grid = TileGrid::new(self.layout)?;
        for spec in &self.tiles {
            grid.insert(spec.at, spec.name.as_deref())?;
        }
        Ok(grid)
    }

    /// Append a tile, leaving the scene untouched if it would not build.
    pub fn add_tile(&mut self, spec: TileSpec) -> Result<()> {
        self.tiles.push(spec);
        if let Err(report) = self.build_grid() {
            self.tiles.pop();
            return Err(report);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let fov = self.camera.fov_degrees;
        if !(fov > 0.0 && fov < 180.0) {
            return Err(Report::new(TilescopeError::Config(format!(
                "camera fov must be within (0, 180) degrees, got {fov}"
            ))));
        }
        if !(self.camera.near > 0.0 && self.camera.far > self.camera.near) {
            return Err(Report::new(TilescopeError::Config(format!(
                "camera clip range {}..{} is empty",
                self.camera.near, self.camera.far
            ))));
        }
        if self.camera.position == self.camera.target {
            return Err(Report::new(TilescopeError::Config(
                "camera position and target coincide".into(),
            )));
        }
        if let Some(fog) = &self.fog {
            if !(fog.start >= 0.0 && fog.end > fog.start) {
                return Err(Report::new(TilescopeError::Config(format!(
                    "fog range {}..{} is empty",
                    fog.start, fog.end
                ))));
            }
        }
        self.build_grid()
            .map(|_| ())
            .map_err(|e| e.change_context(TilescopeError::Config("tile grid".into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors() {
        assert_eq!(Color::hex(0xff0000), Color::RED);
        assert_eq!(Color::hex(0x000000), Color::BLACK);
        let c = Color::hex(0x433f81);
        assert!((c.r - 67.0 / 255.0).abs() < 1e-6);
        assert!((c.b - 129.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn default_scene_is_valid_and_empty() {
        let scene = Scene::default();
        scene.validate().unwrap();
        assert!(scene.build_grid().unwrap().is_empty());
    }

    #[test]
    fn duplicate_tiles_fail_validation() {
        let scene = Scene {
            tiles: vec![TileSpec::new(0, 0, 0), TileSpec::new(0, 0, 0)],
            ..Scene::default()
        };
        let err = scene.validate().unwrap_err();
        assert!(matches!(err.current_context(), TilescopeError::Config(_)));
    }

    #[test]
    fn rejected_tile_leaves_scene_unchanged() {
        let mut scene = Scene::default();
        scene.add_tile(TileSpec::new(0, 0, 0)).unwrap();
        scene
            .add_tile(TileSpec {
                name: Some("Box".into()),
                ..TileSpec::new(1, 0, 1)
            })
            .unwrap();

        assert!(scene.add_tile(TileSpec::new(0, 0, 0)).is_err());
        let renamed = TileSpec {
            name: Some("Box".into()),
            ..TileSpec::new(2, 0, 2)
        };
        assert!(scene.add_tile(renamed).is_err());
        assert_eq!(scene.tiles.len(), 2);
        scene.validate().unwrap();
    }

    #[test]
    fn overlay_extras_default_off() {
        let overlay = Overlay::default();
        assert!(!overlay.tile_labels);
        assert!(!overlay.bounds_helper);
        assert_eq!(overlay.bounds_target, None);
    }

    #[test]
    fn camera_checks() {
        let mut scene = Scene::default();
        scene.camera.fov_degrees = 180.0;
        assert!(scene.validate().is_err());

        let mut scene = Scene::default();
        scene.camera.target = scene.camera.position;
        assert!(scene.validate().is_err());

        let mut scene = Scene::default();
        scene.camera.far = scene.camera.near;
        assert!(scene.validate().is_err());
    }

    #[test]
    fn camera_rig_uses_degrees() {
        let rig = CameraSpec::default().rig(2.0).unwrap();
        assert!((rig.fov_y - 50f32.to_radians()).abs() < 1e-6);
        assert_eq!(rig.far, 1000.0);
        assert_eq!(rig.aspect, 2.0);
    }
}
