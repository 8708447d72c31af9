//! Pointer picking: pixel -> NDC -> camera ray -> nearest tile.

use bevy::prelude::GlobalTransform;
use bevy_camera::Camera;
use bevy_math::bounding::RayCast3d;
use bevy_math::{Dir3, Ray3d, Rect, Vec2, Vec3};

use crate::grid::PlacedTile;

/// Pointer position in normalized device coordinates, both axes in `[-1, 1]`
/// with +Y up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    pub ndc: Vec2,
}

impl PointerSample {
    /// Convert a pixel position (origin top-left, +Y down) to NDC.
    ///
    /// Returns `None` for an empty viewport or a pixel outside it.
    pub fn from_pixel(pixel: Vec2, viewport: Vec2) -> Option<Self> {
        if !pixel.is_finite() || !viewport.is_finite() || viewport.x <= 0.0 || viewport.y <= 0.0 {
            return None;
        }
        let ndc = Vec2::new(
            (pixel.x / viewport.x) * 2.0 - 1.0,
            -(pixel.y / viewport.y) * 2.0 + 1.0,
        );
        (ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0).then_some(Self { ndc })
    }

    /// Inverse of [`PointerSample::from_pixel`].
    pub fn to_pixel(&self, viewport: Vec2) -> Vec2 {
        Vec2::new(
            (self.ndc.x + 1.0) * 0.5 * viewport.x,
            (1.0 - self.ndc.y) * 0.5 * viewport.y,
        )
    }
}

/// Anything that can turn an NDC point into a world-space ray.
pub trait PickCamera {
    fn ray_through(&self, ndc: Vec2) -> Option<Ray3d>;

    /// Hits farther than this along the ray are ignored.
    fn max_distance(&self) -> f32 {
        f32::INFINITY
    }
}

/// Plain perspective camera description, detached from the ECS so scene
/// files and headless callers can pick without a window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerspectiveRig {
    pub eye: Vec3,
    pub forward: Dir3,
    pub up: Dir3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width over height.
    pub aspect: f32,
    pub far: f32,
}

impl PerspectiveRig {
    pub fn looking_at(eye: Vec3, target: Vec3, fov_y: f32, aspect: f32) -> Option<Self> {
        let forward = Dir3::new(target - eye).ok()?;
        Some(Self {
            eye,
            forward,
            up: Dir3::Y,
            fov_y,
            aspect,
            far: 1000.0,
        })
    }

    pub fn with_far(mut self, far: f32) -> Self {
        self.far = far;
        self
    }

    /// Orthonormal (right, up, forward) basis.
    fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = *self.forward;
        let right = forward
            .cross(*self.up)
            .try_normalize()
            .unwrap_or_else(|| forward.any_orthonormal_vector());
        (right, right.cross(forward), forward)
    }

    /// Project a world point to NDC. `None` when behind the camera.
    pub fn project(&self, world: Vec3) -> Option<Vec2> {
        let (right, up, forward) = self.basis();
        let rel = world - self.eye;
        let depth = rel.dot(forward);
        if depth <= f32::EPSILON {
            return None;
        }
        let half_h = (self.fov_y * 0.5).tan();
        Some(Vec2::new(
            rel.dot(right) / (depth * half_h * self.aspect),
            rel.dot(up) / (depth * half_h),
        ))
    }
}

impl PickCamera for PerspectiveRig {
    fn ray_through(&self, ndc: Vec2) -> Option<Ray3d> {
        let (right, up, forward) = self.basis();
        let half_h = (self.fov_y * 0.5).tan();
        let direction =
            Dir3::new(forward + right * (ndc.x * half_h * self.aspect) + up * (ndc.y * half_h))
                .ok()?;
        Some(Ray3d {
            origin: self.eye,
            direction,
        })
    }

    fn max_distance(&self) -> f32 {
        self.far
    }
}

/// A live Bevy camera. Rays come from the camera's own projection and
/// global transform, so parented cameras and custom viewports pick what they
/// draw.
#[derive(Clone, Copy)]
pub struct ViewportCamera<'a> {
    pub camera: &'a Camera,
    pub transform: &'a GlobalTransform,
    pub far: f32,
}

impl PickCamera for ViewportCamera<'_> {
    fn ray_through(&self, ndc: Vec2) -> Option<Ray3d> {
        // reverse-z: the near plane is at depth 1
        let near = self.camera.ndc_to_world(self.transform, ndc.extend(1.0))?;
        let far = self.camera.ndc_to_world(self.transform, ndc.extend(f32::EPSILON))?;
        let direction = Dir3::new(far - near).ok()?;
        Some(Ray3d {
            origin: near,
            direction,
        })
    }

    fn max_distance(&self) -> f32 {
        self.far
    }
}

/// A resolved pick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickHit<'a> {
    pub tile: &'a PlacedTile,
    /// Distance from the ray origin to the entry point.
    pub distance: f32,
    pub point: Vec3,
}

/// Cast through `sample` and return the nearest tile hit. Ties keep the tile
/// that comes first in `tiles`.
pub fn cast_pick<'a, C, I>(sample: PointerSample, camera: &C, tiles: I) -> Option<PickHit<'a>>
where
    C: PickCamera + ?Sized,
    I: IntoIterator<Item = &'a PlacedTile>,
{
    let ray = camera.ray_through(sample.ndc)?;
    let cast = RayCast3d::from_ray(ray, camera.max_distance());

    let mut best: Option<(&'a PlacedTile, f32)> = None;
    for tile in tiles {
        let Some(t) = cast.aabb_intersection_at(&tile.aabb()) else {
            continue;
        };
        let closer = match best {
            Some((_, best_t)) => t < best_t,
            None => true,
        };
        if closer {
            best = Some((tile, t));
        }
    }

    best.map(|(tile, distance)| PickHit {
        tile,
        distance,
        point: ray.origin + *ray.direction * distance,
    })
}

/// Resolve the tile under a pointer pixel, if any.
pub fn resolve_pick<'a, C, I>(
    pointer: Vec2,
    viewport: Vec2,
    camera: &C,
    tiles: I,
) -> Option<&'a PlacedTile>
where
    C: PickCamera + ?Sized,
    I: IntoIterator<Item = &'a PlacedTile>,
{
    let sample = PointerSample::from_pixel(pointer, viewport)?;
    cast_pick(sample, camera, tiles).map(|hit| hit.tile)
}

/// Like [`resolve_pick`] for a camera that draws into `viewport`, a
/// sub-rectangle of the window. `pointer` is in window pixels.
pub fn resolve_pick_in<'a, C, I>(
    pointer: Vec2,
    viewport: Rect,
    camera: &C,
    tiles: I,
) -> Option<&'a PlacedTile>
where
    C: PickCamera + ?Sized,
    I: IntoIterator<Item = &'a PlacedTile>,
{
    resolve_pick(pointer - viewport.min, viewport.size(), camera, tiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridLayout, TileCoordinate, TileGrid, place_tile};

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    fn rig(eye: Vec3, target: Vec3) -> PerspectiveRig {
        PerspectiveRig::looking_at(eye, target, 50f32.to_radians(), VIEWPORT.x / VIEWPORT.y)
            .unwrap()
    }

    fn pixel_of(rig: &PerspectiveRig, world: Vec3) -> Vec2 {
        PointerSample {
            ndc: rig.project(world).unwrap(),
        }
        .to_pixel(VIEWPORT)
    }

    #[test]
    fn pixel_to_ndc() {
        let center = PointerSample::from_pixel(VIEWPORT * 0.5, VIEWPORT).unwrap();
        assert_eq!(center.ndc, Vec2::ZERO);
        let top_left = PointerSample::from_pixel(Vec2::ZERO, VIEWPORT).unwrap();
        assert_eq!(top_left.ndc, Vec2::new(-1.0, 1.0));
        let bottom_right = PointerSample::from_pixel(VIEWPORT, VIEWPORT).unwrap();
        assert_eq!(bottom_right.ndc, Vec2::new(1.0, -1.0));
        let quarter = PointerSample::from_pixel(Vec2::new(200.0, 450.0), VIEWPORT).unwrap();
        assert_eq!(quarter.ndc, Vec2::new(-0.5, -0.5));
        assert_eq!(quarter.to_pixel(VIEWPORT), Vec2::new(200.0, 450.0));
    }

    #[test]
    fn degenerate_pointer_input() {
        assert!(PointerSample::from_pixel(Vec2::new(10.0, 10.0), Vec2::ZERO).is_none());
        assert!(PointerSample::from_pixel(Vec2::new(-1.0, 10.0), VIEWPORT).is_none());
        assert!(PointerSample::from_pixel(Vec2::new(10.0, 601.0), VIEWPORT).is_none());
        assert!(PointerSample::from_pixel(Vec2::new(f32::NAN, 0.0), VIEWPORT).is_none());
    }

    #[test]
    fn center_ray_follows_forward() {
        let cam = rig(Vec3::new(0.0, 2.0, 5.0), Vec3::ZERO);
        let ray = cam.ray_through(Vec2::ZERO).unwrap();
        assert_eq!(ray.origin, cam.eye);
        assert!(ray.direction.dot(*cam.forward) > 0.9999);
    }

    #[test]
    fn projection_inverts_ray() {
        let cam = rig(Vec3::new(3.0, 6.0, 9.0), Vec3::new(1.0, 0.0, 0.5));
        let target = Vec3::new(2.0, 0.5, 1.5);
        let ndc = cam.project(target).unwrap();
        let ray = cam.ray_through(ndc).unwrap();
        let to_target = (target - ray.origin).normalize();
        assert!(ray.direction.dot(to_target) > 0.9999);
        assert!(cam.project(cam.eye - *cam.forward).is_none());
    }

    #[test]
    fn no_tiles_no_pick() {
        let cam = rig(Vec3::new(0.0, 5.0, 5.0), Vec3::ZERO);
        let tiles: Vec<PlacedTile> = Vec::new();
        assert!(resolve_pick(VIEWPORT * 0.5, VIEWPORT, &cam, &tiles).is_none());
    }

    #[test]
    fn every_tile_is_pickable_at_its_center() {
        let mut grid = TileGrid::new(GridLayout::default()).unwrap();
        for c in 0..5 {
            for r in 0..5 {
                grid.insert(TileCoordinate::new(c, 0, r), None).unwrap();
            }
        }
        let cam = rig(Vec3::new(2.5, 15.0, 9.0), Vec3::new(2.5, 0.0, 2.5));

        for tile in grid.tiles() {
            let pixel = pixel_of(&cam, tile.center());
            let picked = resolve_pick(pixel, VIEWPORT, &cam, grid.tiles());
            assert_eq!(picked, Some(tile), "aimed at {}", tile.label());
        }
    }

    #[test]
    fn nearest_tile_wins_regardless_of_order() {
        let near = place_tile(0, 0, 0, 1.0, Vec3::ZERO);
        let far = place_tile(0, 0, -4, 1.0, Vec3::ZERO);
        let cam = rig(Vec3::new(0.5, 0.5, 10.0), Vec3::new(0.5, 0.5, 0.0));
        let pointer = VIEWPORT * 0.5;

        let forward = [near.clone(), far.clone()];
        let backward = [far.clone(), near.clone()];
        assert_eq!(resolve_pick(pointer, VIEWPORT, &cam, &forward), Some(&near));
        assert_eq!(resolve_pick(pointer, VIEWPORT, &cam, &backward), Some(&near));

        let hit = cast_pick(
            PointerSample::from_pixel(pointer, VIEWPORT).unwrap(),
            &cam,
            &backward,
        )
        .unwrap();
        assert!((hit.distance - 9.0).abs() < 1e-4);
        assert!((hit.point - Vec3::new(0.5, 0.5, 1.0)).length() < 1e-4);
    }

    #[test]
    fn upper_layer_shadows_lower_from_above() {
        let mut grid = TileGrid::new(GridLayout::default()).unwrap();
        grid.insert(TileCoordinate::new(0, 0, 0), None).unwrap();
        grid.insert(TileCoordinate::new(0, 1, 0), None).unwrap();
        let cam = rig(Vec3::new(0.5, 8.0, 1.5), Vec3::new(0.5, 0.0, 0.5));

        let pixel = pixel_of(&cam, Vec3::new(0.5, 0.5, 0.5));
        let picked = resolve_pick(pixel, VIEWPORT, &cam, grid.tiles()).unwrap();
        assert_eq!(picked.coordinate(), TileCoordinate::new(0, 1, 0));
    }

    #[test]
    fn hits_beyond_far_are_ignored() {
        let tile = place_tile(0, 0, 0, 1.0, Vec3::ZERO);
        let cam = rig(Vec3::new(0.5, 0.5, 10.0), Vec3::new(0.5, 0.5, 0.0)).with_far(5.0);
        assert!(resolve_pick(VIEWPORT * 0.5, VIEWPORT, &cam, [&tile]).is_none());
    }

    #[test]
    fn offset_viewport_shifts_the_pointer() {
        let tile = place_tile(0, 0, 0, 1.0, Vec3::ZERO);
        let cam = rig(Vec3::new(0.5, 4.0, 4.0), tile.center());
        let viewport = Rect::new(200.0, 100.0, 1000.0, 700.0);
        assert_eq!(viewport.size(), VIEWPORT);

        let inside = viewport.min + VIEWPORT * 0.5;
        assert_eq!(resolve_pick_in(inside, viewport, &cam, [&tile]), Some(&tile));
        // the window center is off the tile once the viewport is shifted
        assert!(resolve_pick_in(VIEWPORT * 0.5, viewport, &cam, [&tile]).is_none());
        assert!(resolve_pick_in(Vec2::new(50.0, 50.0), viewport, &cam, [&tile]).is_none());
    }

    #[test]
    fn bevy_camera_ray_follows_global_transform() {
        // Until Bevy computes its projection a camera maps NDC straight to
        // view space, looking down -Z from z = 1.
        let camera = Camera::default();
        let transform = GlobalTransform::from_translation(Vec3::new(2.0, 0.0, 0.0));
        let view = ViewportCamera {
            camera: &camera,
            transform: &transform,
            far: 100.0,
        };

        let ray = view.ray_through(Vec2::new(0.5, 0.5)).unwrap();
        assert!((ray.origin - Vec3::new(2.5, 0.5, 1.0)).length() < 1e-4);
        assert!(ray.direction.dot(Vec3::NEG_Z) > 0.9999);

        let tiles = [
            place_tile(0, 0, 0, 1.0, Vec3::new(0.0, 0.0, -3.0)),
            place_tile(2, 0, 0, 1.0, Vec3::new(0.0, 0.0, -3.0)),
        ];
        let sample = PointerSample {
            ndc: Vec2::new(0.5, 0.5),
        };
        let hit = cast_pick(sample, &view, &tiles).unwrap();
        assert_eq!(hit.tile.label(), "3.A.1");
        assert!((hit.distance - 3.0).abs() < 1e-4);

        let short = ViewportCamera { far: 2.0, ..view };
        assert!(cast_pick(sample, &short, &tiles).is_none());
    }

    #[test]
    fn sky_is_empty() {
        let tile = place_tile(0, 0, 0, 1.0, Vec3::ZERO);
        let cam = rig(Vec3::new(0.5, 2.0, 5.0), Vec3::new(0.5, 0.5, 0.5));
        assert!(resolve_pick(Vec2::new(400.0, 0.0), VIEWPORT, &cam, [&tile]).is_none());
    }
}
