pub mod components;
pub mod overlay;
pub mod resources;
pub mod systems;

pub use components::*;
use overlay::*;
pub use resources::*;
use systems::*;

use bevy::prelude::*;

#[derive(Default)]
pub struct TileScenePlugin;

impl Plugin for TileScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TileRegistry>()
            .init_resource::<HoveredTile>()
            .init_resource::<PointerPosition>()
            .init_resource::<BoundsBox>()
            .add_systems(
                Startup,
                (
                    setup_unit_meshes,
                    setup_scene,
                    spawn_grid_tiles,
                    focus_named_tile,
                    resolve_bounds_box,
                    spawn_floor_grid,
                    spawn_axes,
                    spawn_overlay,
                    spawn_tile_labels,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    track_pointer,
                    orbit_camera_input,
                    reset_view,
                    apply_orbit_camera,
                    update_hovered_tile,
                    highlight_hovered_tile,
                    update_tooltip,
                    place_tile_labels,
                    draw_bounds_helper,
                )
                    .chain(),
            );
    }
}
