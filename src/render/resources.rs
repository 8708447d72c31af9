use super::components::View3D;
use crate::grid::{TileCoordinate, TileGrid};
use bevy::prelude::*;
use std::collections::HashMap;

#[derive(Resource, Clone)]
pub struct SceneRes(pub crate::core::Scene);

impl SceneRes {
    pub fn new(scene: crate::core::Scene) -> Self {
        Self(scene)
    }
}

/// Owns the placed tiles for the running scene. Populated once at startup;
/// the hover system reads picks from here.
#[derive(Resource, Default)]
pub struct TileRegistry {
    pub grid: TileGrid,
    pub entity_of: HashMap<TileCoordinate, Entity>,
}

#[derive(Resource, Default, Clone, Copy, PartialEq, Debug)]
pub struct HoveredTile(pub Option<TileCoordinate>);

/// Last pointer position in logical window pixels, mouse or first touch.
#[derive(Resource, Default, Clone, Copy, PartialEq, Debug)]
pub struct PointerPosition(pub Option<Vec2>);

/// World-space box drawn by the bounds helper, if any.
#[derive(Resource, Default, Clone, Copy, PartialEq, Debug)]
pub struct BoundsBox(pub Option<(Vec3, Vec3)>);

/// Camera state restored by the reset button.
#[derive(Resource, Clone, Copy, Debug)]
pub struct HomeView(pub View3D);

#[derive(Resource)]
pub struct UnitMeshes {
    pub cube: Handle<Mesh>,
    pub sphere: Handle<Mesh>,
}

pub fn setup_unit_meshes(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    let cube = meshes.add(Mesh::from(Cuboid::new(1.0, 1.0, 1.0)));
    let sphere = meshes.add(Mesh::from(Sphere::new(0.5)));
    commands.insert_resource(UnitMeshes { cube, sphere });
}
