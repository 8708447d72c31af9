use super::*;
use crate::pick::{ViewportCamera, resolve_pick_in};
use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::input::touch::Touches;
use bevy::log::{debug, error, info, warn};
use bevy::pbr::{DistanceFog, FogFalloff};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_asset::RenderAssetUsages;
use bevy_camera::{PerspectiveProjection, Projection};
use bevy_mesh::PrimitiveTopology;
use std::collections::HashMap;

/// Camera, lights and fog.
pub fn setup_scene(mut commands: Commands, scene: Res<SceneRes>) {
    let spec = &scene.0.camera;
    let view = View3D::looking_at(spec.position, spec.target);

    commands.insert_resource(AmbientLight {
        brightness: 400.0,
        ..default()
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            ..default()
        },
        Transform::from_xyz(6.0, 12.0, 8.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let mut camera = commands.spawn((
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            fov: spec.fov_degrees.to_radians(),
            near: spec.near,
            far: spec.far,
            ..default()
        }),
        view.transform(),
        view,
        SceneCamera,
    ));

    if let Some(fog) = &scene.0.fog {
        camera.insert(DistanceFog {
            color: fog.color.into(),
            falloff: FogFalloff::Linear {
                start: fog.start,
                end: fog.end,
            },
            ..default()
        });
    }

    commands.insert_resource(HomeView(view));
}

/// Place every tile of the scene and register it.
pub fn spawn_grid_tiles(
    mut commands: Commands,
    scene: Res<SceneRes>,
    unit: Res<UnitMeshes>,
    mut registry: ResMut<TileRegistry>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let grid = match scene.0.build_grid() {
        Ok(grid) => grid,
        Err(report) => {
            error!("cannot place tiles: {report:?}");
            return;
        }
    };

    let style = scene.0.style;
    let colors: HashMap<_, _> = scene
        .0
        .tiles
        .iter()
        .filter_map(|spec| spec.color.map(|c| (spec.at, c)))
        .collect();

    let mut entity_of = HashMap::with_capacity(grid.len());
    for tile in grid.tiles() {
        let coord = tile.coordinate();
        let base: Color = colors
            .get(&coord)
            .copied()
            .unwrap_or(style.color)
            .with_a(style.opacity)
            .into();
        let hover: Color = style.hover_color.with_a(style.opacity).into();

        let material = materials.add(StandardMaterial {
            base_color: base,
            perceptual_roughness: 0.6,
            alpha_mode: if style.opacity < 1.0 {
                AlphaMode::Blend
            } else {
                AlphaMode::Opaque
            },
            ..default()
        });

        let entity = commands
            .spawn((
                Mesh3d(unit.cube.clone()),
                MeshMaterial3d(material),
                Transform {
                    translation: tile.center(),
                    // Slight inset so neighbouring faces don't z-fight.
                    scale: tile.size() * 0.98,
                    ..default()
                },
                GridTile { coord, base, hover },
            ))
            .id();
        entity_of.insert(coord, entity);
    }

    info!("placed {} tiles", grid.len());
    registry.grid = grid;
    registry.entity_of = entity_of;
}

/// Retarget the camera on the tile named by `Scene::focus`, keeping the
/// configured viewing offset.
pub fn focus_named_tile(
    scene: Res<SceneRes>,
    registry: Res<TileRegistry>,
    mut home: ResMut<HomeView>,
    mut views: Query<&mut View3D, With<SceneCamera>>,
) {
    let Some(name) = scene.0.focus.as_deref() else {
        return;
    };
    let Some(tile) = registry.grid.find_by_name(name) else {
        warn!("focus tile {name:?} not found in scene");
        return;
    };
    let Ok(mut view) = views.single_mut() else {
        return;
    };

    view.target = tile.center();
    home.0 = *view;
    info!("camera focused on {name:?} at {}", tile.label());
}

/// Line grid on the ground plane, one cell larger than the tiles on each side.
pub fn spawn_floor_grid(
    mut commands: Commands,
    scene: Res<SceneRes>,
    registry: Res<TileRegistry>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if !scene.0.overlay.floor_grid {
        return;
    }
    let layout = registry.grid.layout();
    let size = layout.tile_size;
    let origin = layout.origin;

    let (min, max) = registry
        .grid
        .bounds()
        .unwrap_or((origin, origin + Vec3::new(size, 0.0, size)));
    let min = min - Vec3::new(size, 0.0, size);
    let max = max + Vec3::new(size, 0.0, size);

    let mesh = floor_grid_mesh(min.x, max.x, min.z, max.z, size, origin);
    let material = materials.add(StandardMaterial {
        base_color: Color::srgba(0.45, 0.45, 0.5, 0.6),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    });

    commands.spawn((
        Mesh3d(meshes.add(mesh)),
        MeshMaterial3d(material),
        Transform::default(),
        FloorGrid,
    ));
}

/// Line-list mesh of cell borders at y = 0 between the given extents.
fn floor_grid_mesh(x0: f32, x1: f32, z0: f32, z1: f32, step: f32, origin: Vec3) -> Mesh {
    let first = |lo: f32, off: f32| ((lo - off) / step).ceil() * step + off;
    let mut positions: Vec<[f32; 3]> = Vec::new();

    let mut x = first(x0, origin.x);
    while x <= x1 {
        positions.push([x, 0.0, z0]);
        positions.push([x, 0.0, z1]);
        x += step;
    }
    let mut z = first(z0, origin.z);
    while z <= z1 {
        positions.push([x0, 0.0, z]);
        positions.push([x1, 0.0, z]);
        z += step;
    }

    let normals = vec![[0.0_f32, 1.0, 0.0]; positions.len()];
    Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
}

/// X/Y/Z arrows from the grid origin, red/green/blue.
pub fn spawn_axes(
    mut commands: Commands,
    scene: Res<SceneRes>,
    unit: Res<UnitMeshes>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if !scene.0.overlay.axes {
        return;
    }
    let layout = scene.0.layout;
    let origin = Vec3::new(layout.origin.x, 0.0, layout.origin.z);
    let len = layout.tile_size * 3.0;
    let thickness = layout.tile_size * 0.03;

    let axes = [
        (Vec3::X, Color::srgb(1.0, 0.3, 0.3)),
        (Vec3::Y, Color::srgb(0.3, 1.0, 0.3)),
        (Vec3::Z, Color::srgb(0.3, 0.5, 1.0)),
    ];

    for (dir, color) in axes {
        let mat = materials.add(StandardMaterial {
            base_color: color,
            emissive: LinearRgba::from(color) * 0.6,
            unlit: true,
            ..default()
        });
        let shaft_size = dir * len + (Vec3::ONE - dir) * thickness;
        let shaft = meshes.add(Cuboid::from_size(shaft_size));

        commands.spawn((
            Mesh3d(shaft),
            MeshMaterial3d(mat.clone()),
            Transform::from_translation(origin + dir * len * 0.5),
            AxisArrow,
        ));
        commands.spawn((
            Mesh3d(unit.sphere.clone()),
            MeshMaterial3d(mat),
            Transform::from_translation(origin + dir * (len + thickness * 3.0))
                .with_scale(Vec3::splat(thickness * 6.0)),
            AxisArrow,
        ));
    }
}

/// Pointer over an overlay button is off the scene.
pub fn track_pointer(
    windows: Query<&Window, With<PrimaryWindow>>,
    touches: Res<Touches>,
    buttons: Query<&Interaction, With<ResetViewButton>>,
    mut pointer: ResMut<PointerPosition>,
) {
    if buttons.iter().any(|i| *i != Interaction::None) {
        pointer.set_if_neq(PointerPosition(None));
        return;
    }
    let position = windows
        .single()
        .ok()
        .and_then(|window| window.cursor_position())
        .or_else(|| touches.iter().next().map(|touch| touch.position()));
    pointer.set_if_neq(PointerPosition(position));
}

/// Left drag orbits, right drag pans, wheel zooms.
pub fn orbit_camera_input(
    mut wheel: MessageReader<MouseWheel>,
    mut motion: MessageReader<MouseMotion>,
    mouse: Res<ButtonInput<MouseButton>>,
    buttons: Query<&Interaction, With<ResetViewButton>>,
    mut views: Query<&mut View3D, With<SceneCamera>>,
) {
    let mut scroll = 0.0;
    for event in wheel.read() {
        scroll += event.y;
    }
    let mut delta = Vec2::ZERO;
    for event in motion.read() {
        delta += event.delta;
    }

    if buttons.iter().any(|i| *i != Interaction::None) {
        return;
    }
    let Ok(mut view) = views.single_mut() else {
        return;
    };

    if scroll != 0.0 {
        view.zoom(scroll);
    }
    if delta != Vec2::ZERO {
        if mouse.pressed(MouseButton::Left) {
            view.orbit(delta);
        } else if mouse.pressed(MouseButton::Right) {
            view.pan(delta);
        }
    }
}

/// Restore the initial view from the overlay button or the `R` key.
pub fn reset_view(
    home: Res<HomeView>,
    keys: Res<ButtonInput<KeyCode>>,
    buttons: Query<&Interaction, (Changed<Interaction>, With<ResetViewButton>)>,
    mut views: Query<&mut View3D, With<SceneCamera>>,
) {
    let clicked = buttons.iter().any(|i| *i == Interaction::Pressed);
    if !clicked && !keys.just_pressed(KeyCode::KeyR) {
        return;
    }
    if let Ok(mut view) = views.single_mut() {
        *view = home.0;
        info!("camera reset");
    }
}

pub fn apply_orbit_camera(mut cams: Query<(&View3D, &mut Transform), Changed<View3D>>) {
    for (view, mut tf) in cams.iter_mut() {
        *tf = view.transform();
    }
}

/// Resolve the tile under the pointer through the scene camera.
pub fn update_hovered_tile(
    pointer: Res<PointerPosition>,
    cameras: Query<(&Camera, &GlobalTransform, &Projection), With<SceneCamera>>,
    registry: Res<TileRegistry>,
    mut hovered: ResMut<HoveredTile>,
) {
    let picked = (|| {
        let pointer = pointer.0?;
        let (camera, transform, projection) = cameras.single().ok()?;
        let viewport = camera.logical_viewport_rect()?;
        let view = ViewportCamera {
            camera,
            transform,
            far: far_clip(projection),
        };
        resolve_pick_in(pointer, viewport, &view, registry.grid.tiles()).map(|tile| tile.coordinate())
    })();

    if hovered.set_if_neq(HoveredTile(picked)) {
        match picked {
            Some(coord) => debug!("hovering {coord}"),
            None => debug!("hover cleared"),
        }
    }
}

fn far_clip(projection: &Projection) -> f32 {
    match projection {
        Projection::Perspective(p) => p.far,
        Projection::Orthographic(o) => o.far,
        _ => f32::INFINITY,
    }
}

pub fn highlight_hovered_tile(
    hovered: Res<HoveredTile>,
    tiles: Query<(&GridTile, &MeshMaterial3d<StandardMaterial>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if !hovered.is_changed() {
        return;
    }
    for (tile, material) in tiles.iter() {
        let Some(mat) = materials.get_mut(&material.0) else {
            continue;
        };
        let color = if hovered.0 == Some(tile.coord) {
            tile.hover
        } else {
            tile.base
        };
        if mat.base_color != color {
            mat.base_color = color;
        }
    }
}

/// Pick the box the bounds helper draws: the named tile, or every tile.
pub fn resolve_bounds_box(
    scene: Res<SceneRes>,
    registry: Res<TileRegistry>,
    mut bounds: ResMut<BoundsBox>,
) {
    let overlay = &scene.0.overlay;
    if !overlay.bounds_helper {
        bounds.0 = None;
        return;
    }
    bounds.0 = match overlay.bounds_target.as_deref() {
        None => registry.grid.bounds(),
        Some(name) => match registry.grid.find_by_name(name) {
            Some(tile) => Some((tile.center() - tile.half_size(), tile.center() + tile.half_size())),
            None => {
                warn!("bounds helper target {name:?} not found in scene");
                None
            }
        },
    };
}

pub fn draw_bounds_helper(bounds: Res<BoundsBox>, mut gizmos: Gizmos) {
    let Some((min, max)) = bounds.0 else {
        return;
    };
    gizmos.cuboid(
        Transform::from_translation((min + max) * 0.5).with_scale(max - min),
        Color::srgb(1.0, 0.0, 0.0),
    );
}
