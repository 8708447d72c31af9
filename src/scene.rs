use crate::core::{CameraSpec, Color, FogSpec, Scene, Style, TileSpec};
use crate::Result;
use bevy_math::Vec3;

pub fn scene() -> SceneBuilder {
    SceneBuilder {
        scene: Scene::default(),
        frame: false,
    }
}

pub struct SceneBuilder {
    scene: Scene,
    frame: bool,
}

impl SceneBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.scene.title = Some(title.into());
        self
    }

    pub fn background_color(mut self, c: Color) -> Self {
        self.scene.background = c;
        self
    }

    pub fn fog(mut self, color: Color, start: f32, end: f32) -> Self {
        self.scene.fog = Some(FogSpec { color, start, end });
        self
    }

    /// Tile edge length. Layers keep their own height, see [`Self::layer_height`].
    pub fn tile_size(mut self, size: f32) -> Self {
        self.scene.layout.tile_size = size;
        self
    }

    pub fn layer_height(mut self, height: f32) -> Self {
        self.scene.layout.layer_height = height;
        self
    }

    pub fn origin(mut self, origin: Vec3) -> Self {
        self.scene.layout.origin = origin;
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.scene.style = style;
        self
    }

    pub fn tile_color(mut self, c: Color) -> Self {
        self.scene.style.color = c;
        self
    }

    pub fn camera(mut self, position: Vec3, target: Vec3) -> Self {
        self.scene.camera.position = position;
        self.scene.camera.target = target;
        self.frame = false;
        self
    }

    pub fn fov(mut self, degrees: f32) -> Self {
        self.scene.camera.fov_degrees = degrees;
        self
    }

    /// Target the tile with this name once the scene starts.
    pub fn focus(mut self, name: impl Into<String>) -> Self {
        self.scene.focus = Some(name.into());
        self
    }

    /// Place the camera so the whole grid is in view when built.
    pub fn frame_grid(mut self) -> Self {
        self.frame = true;
        self
    }

    pub fn add_tile(mut self, column: i32, layer: u32, row: i32) -> Self {
        self.scene.tiles.push(TileSpec::new(column, layer, row));
        self
    }

    pub fn add_named_tile(mut self, name: impl Into<String>, column: i32, layer: u32, row: i32) -> Self {
        self.scene.tiles.push(TileSpec {
            name: Some(name.into()),
            ..TileSpec::new(column, layer, row)
        });
        self
    }

    pub fn add_tile_spec(mut self, spec: TileSpec) -> Self {
        self.scene.tiles.push(spec);
        self
    }

    /// Fill `columns x rows` ground tiles starting at `(0, 0)`.
    pub fn grid(self, columns: u32, rows: u32) -> Self {
        self.layer(0, columns, rows)
    }

    /// Fill `columns x rows` tiles on one layer starting at `(0, 0)`.
    pub fn layer(mut self, layer: u32, columns: u32, rows: u32) -> Self {
        let columns = columns.min(i32::MAX as u32) as i32;
        let rows = rows.min(i32::MAX as u32) as i32;
        for row in 0..rows {
            for column in 0..columns {
                self.scene.tiles.push(TileSpec::new(column, layer, row));
            }
        }
        self
    }

    pub fn tooltip(mut self, on: bool) -> Self {
        self.scene.overlay.tooltip = on;
        self
    }

    pub fn reset_button(mut self, on: bool) -> Self {
        self.scene.overlay.reset_button = on;
        self
    }

    pub fn axes(mut self, on: bool) -> Self {
        self.scene.overlay.axes = on;
        self
    }

    pub fn floor_grid(mut self, on: bool) -> Self {
        self.scene.overlay.floor_grid = on;
        self
    }

    pub fn bounds_helper(mut self, on: bool) -> Self {
        self.scene.overlay.bounds_helper = on;
        self
    }

    /// Draw the bounds helper around one named tile instead of the grid.
    pub fn bounds_of(mut self, name: impl Into<String>) -> Self {
        self.scene.overlay.bounds_helper = true;
        self.scene.overlay.bounds_target = Some(name.into());
        self
    }

    pub fn tile_labels(mut self, on: bool) -> Self {
        self.scene.overlay.tile_labels = on;
        self
    }

    /// Validate and return the scene without running it.
    pub fn build(mut self) -> Result<Scene> {
        if self.frame {
            frame_camera(&mut self.scene)?;
        }
        self.scene.validate()?;
        Ok(self.scene)
    }

    /// Run the scene in a native window.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn run_local(self) -> Result<()> {
        let scene = self.build()?;
        crate::runtime::run_scene(scene);
        Ok(())
    }
}

/// Aim the camera at the grid center from a distance that fits its extent.
pub fn frame_camera(scene: &mut Scene) -> Result<()> {
    let grid = scene.build_grid()?;
    let Some((min, max)) = grid.bounds() else {
        return Ok(());
    };
    let center = (min + max) * 0.5;
    let radius = ((max - min).length() * 0.5).max(scene.layout.tile_size);
    let half_fov = (scene.camera.fov_degrees.to_radians() * 0.5).max(0.05);
    let distance = radius / half_fov.sin() * 1.1;

    scene.camera = CameraSpec {
        position: center + Vec3::new(0.0, 0.6, 0.8) * distance,
        target: center,
        far: scene.camera.far.max(distance * 4.0),
        ..scene.camera
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TileCoordinate;
    use crate::pick::{PointerSample, resolve_pick};
    use bevy_math::Vec2;

    #[test]
    fn builder_collects_tiles() {
        let scene = scene()
            .tile_size(2.0)
            .grid(3, 2)
            .add_named_tile("Box", 0, 1, 0)
            .tooltip(false)
            .build()
            .unwrap();

        assert_eq!(scene.tiles.len(), 7);
        assert_eq!(scene.layout.tile_size, 2.0);
        assert!(!scene.overlay.tooltip);
        let grid = scene.build_grid().unwrap();
        assert_eq!(
            grid.find_by_name("Box").unwrap().coordinate(),
            TileCoordinate::new(0, 1, 0)
        );
        assert!(grid.get(TileCoordinate::new(2, 0, 1)).is_some());
        assert!(grid.get(TileCoordinate::new(3, 0, 0)).is_none());
    }

    #[test]
    fn overlay_switches() {
        let scene = scene()
            .add_named_tile("Box", 0, 0, 0)
            .tile_labels(true)
            .bounds_of("Box")
            .build()
            .unwrap();
        assert!(scene.overlay.tile_labels);
        assert!(scene.overlay.bounds_helper);
        assert_eq!(scene.overlay.bounds_target.as_deref(), Some("Box"));
    }

    #[test]
    fn overlapping_fills_fail_to_build() {
        assert!(scene().grid(2, 2).add_tile(1, 0, 1).build().is_err());
    }

    #[test]
    fn framed_camera_sees_every_tile() {
        let scene = scene().grid(6, 4).layer(1, 2, 2).frame_grid().build().unwrap();
        let rig = scene.camera.rig(16.0 / 9.0).unwrap();
        let grid = scene.build_grid().unwrap();
        for tile in grid.tiles() {
            let ndc = rig.project(tile.center()).unwrap();
            assert!(ndc.x.abs() < 1.0 && ndc.y.abs() < 1.0, "{} off screen", tile.label());
        }
    }

    #[test]
    fn framed_camera_center_pick() {
        let scene = scene().add_tile(0, 0, 0).frame_grid().build().unwrap();
        let grid = scene.build_grid().unwrap();
        let viewport = Vec2::new(640.0, 480.0);
        let rig = scene.camera.rig(viewport.x / viewport.y).unwrap();
        let pointer = PointerSample { ndc: Vec2::ZERO }.to_pixel(viewport);
        let picked = resolve_pick(pointer, viewport, &rig, grid.tiles()).unwrap();
        assert_eq!(picked.label(), "1.A.1");
    }

    #[test]
    fn explicit_camera_cancels_framing() {
        let eye = Vec3::new(1.0, 2.0, 3.0);
        let scene = scene()
            .grid(2, 2)
            .frame_grid()
            .camera(eye, Vec3::ZERO)
            .build()
            .unwrap();
        assert_eq!(scene.camera.position, eye);
    }
}
