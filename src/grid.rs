//! Tile grid mapping.
//!
//! A tile is addressed by an integer `(column, layer, row)` triple and sits at
//! the center of its cell in world space. Columns run along X, rows along Z
//! and layers stack upward along Y from the ground plane.

use bevy_math::Vec3;
use bevy_math::bounding::Aabb3d;
use error_stack::Report;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::{Result, TilescopeError};

/// Logical address of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoordinate {
    pub column: i32,
    pub layer: u32,
    pub row: i32,
}

impl TileCoordinate {
    pub const fn new(column: i32, layer: u32, row: i32) -> Self {
        Self { column, layer, row }
    }

    /// Label such as `"1.A.1"` for `(0, 0, 0)`.
    pub fn label(&self) -> String {
        format_label(*self)
    }
}

impl fmt::Display for TileCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            i64::from(self.column) + 1,
            layer_letters(self.layer),
            i64::from(self.row) + 1
        )
    }
}

impl FromStr for TileCoordinate {
    type Err = Report<TilescopeError>;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        parse_label(s)
    }
}

/// World-space sizing of a grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLayout {
    /// Edge length of a tile on the ground plane.
    pub tile_size: f32,
    /// Height of one layer.
    pub layer_height: f32,
    /// Offset added to the X and Z of every tile center. Y is ignored:
    /// layers always stack from the ground plane.
    pub origin: Vec3,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            tile_size: 1.0,
            layer_height: 1.0,
            origin: Vec3::ZERO,
        }
    }
}

impl GridLayout {
    /// Square layout where a layer is as tall as a tile is wide.
    pub fn uniform(tile_size: f32, origin: Vec3) -> Self {
        Self {
            tile_size,
            layer_height: tile_size,
            origin,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(Report::new(TilescopeError::Grid(format!(
                "tile size must be positive and finite, got {}",
                self.tile_size
            ))));
        }
        if !(self.layer_height.is_finite() && self.layer_height > 0.0) {
            return Err(Report::new(TilescopeError::Grid(format!(
                "layer height must be positive and finite, got {}",
                self.layer_height
            ))));
        }
        if !self.origin.is_finite() {
            return Err(Report::new(TilescopeError::Grid(format!(
                "origin must be finite, got {}",
                self.origin
            ))));
        }
        Ok(())
    }

    /// Compute the placed tile for `coord`.
    pub fn place(&self, coord: TileCoordinate) -> PlacedTile {
        let size = self.tile_size;
        let height = self.layer_height;
        let center = Vec3::new(
            coord.column as f32 * size + size * 0.5 + self.origin.x,
            coord.layer as f32 * height + height * 0.5,
            coord.row as f32 * size + size * 0.5 + self.origin.z,
        );
        PlacedTile {
            coordinate: coord,
            center,
            half_size: Vec3::new(size * 0.5, height * 0.5, size * 0.5),
        }
    }

    /// Coordinate of the cell containing `world`, or `None` below the ground
    /// plane or for non-finite input.
    pub fn coordinate_at(&self, world: Vec3) -> Option<TileCoordinate> {
        if !world.is_finite() || world.y < 0.0 {
            return None;
        }
        let column = ((world.x - self.origin.x) / self.tile_size).floor();
        let row = ((world.z - self.origin.z) / self.tile_size).floor();
        let layer = (world.y / self.layer_height).floor();

        let in_range = |v: f32| v >= i32::MIN as f32 && v <= i32::MAX as f32;
        if !in_range(column) || !in_range(row) || layer > u32::MAX as f32 {
            return None;
        }
        Some(TileCoordinate::new(column as i32, layer as u32, row as i32))
    }
}

/// A tile positioned in world space. Immutable once created.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedTile {
    coordinate: TileCoordinate,
    center: Vec3,
    half_size: Vec3,
}

impl PlacedTile {
    pub fn coordinate(&self) -> TileCoordinate {
        self.coordinate
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn half_size(&self) -> Vec3 {
        self.half_size
    }

    pub fn size(&self) -> Vec3 {
        self.half_size * 2.0
    }

    pub fn label(&self) -> String {
        self.coordinate.label()
    }

    /// Axis-aligned box used for picking.
    pub fn aabb(&self) -> Aabb3d {
        Aabb3d::new(self.center, self.half_size)
    }
}

/// Place a single tile on a grid whose layers are `tile_size` tall.
pub fn place_tile(column: i32, layer: u32, row: i32, tile_size: f32, origin: Vec3) -> PlacedTile {
    GridLayout::uniform(tile_size, origin).place(TileCoordinate::new(column, layer, row))
}

/// Snap a scalar coordinate to the center of the cell containing it.
#[inline]
pub fn snap_to_center(v: f32, tile_size: f32) -> f32 {
    (v / tile_size).floor() * tile_size + tile_size * 0.5
}

/// Spreadsheet-style letters: 0 -> `A`, 25 -> `Z`, 26 -> `AA`.
pub fn layer_letters(layer: u32) -> String {
    let mut n = u64::from(layer) + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(char::from(b'A' + (n % 26) as u8));
        n /= 26;
    }
    letters.iter().rev().collect()
}

/// Inverse of [`layer_letters`].
pub fn parse_layer_letters(s: &str) -> Option<u32> {
    if s.is_empty() {
        return None;
    }
    let mut acc: u64 = 0;
    for c in s.chars() {
        if !c.is_ascii_uppercase() {
            return None;
        }
        let digit = u64::from(c as u8 - b'A') + 1;
        acc = acc.checked_mul(26)?.checked_add(digit)?;
        if acc > u64::from(u32::MAX) + 1 {
            return None;
        }
    }
    u32::try_from(acc - 1).ok()
}

pub fn format_label(coord: TileCoordinate) -> String {
    coord.to_string()
}

pub fn parse_label(label: &str) -> Result<TileCoordinate> {
    let invalid = |why: &str| Report::new(TilescopeError::Label(format!("{label:?}: {why}")));

    let mut parts = label.split('.');
    let (Some(column), Some(layer), Some(row), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid("expected column.LAYER.row"));
    };

    let one_based = |s: &str, what: &str| -> Result<i32> {
        if !is_canonical_integer(s) {
            return Err(invalid(&format!("{what} is not a plain integer")));
        }
        let n: i64 = s
            .parse()
            .map_err(|_| invalid(&format!("{what} is not an integer")))?;
        i32::try_from(n - 1).map_err(|_| invalid(&format!("{what} out of range")))
    };

    let column = one_based(column, "column")?;
    let row = one_based(row, "row")?;
    let layer = parse_layer_letters(layer).ok_or_else(|| invalid("layer must be letters A-Z"))?;

    Ok(TileCoordinate::new(column, layer, row))
}

/// Digits with an optional leading `-`, no `+`, no leading zeros, no `-0`.
fn is_canonical_integer(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if digits.starts_with('0') {
        return digits == "0" && digits.len() == s.len();
    }
    true
}

/// Registry of placed tiles. Owns the tiles for the lifetime of a scene and
/// is the only lookup the pick resolver reads from.
#[derive(Clone, Debug, Default)]
pub struct TileGrid {
    layout: GridLayout,
    tiles: Vec<PlacedTile>,
    index: HashMap<TileCoordinate, usize>,
    names: HashMap<String, usize>,
}

impl TileGrid {
    pub fn new(layout: GridLayout) -> Result<Self> {
        layout.validate()?;
        Ok(Self {
            layout,
            ..Default::default()
        })
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Place and register a tile. Fails if the coordinate or name is taken.
    pub fn insert(&mut self, coord: TileCoordinate, name: Option<&str>) -> Result<&PlacedTile> {
        if self.index.contains_key(&coord) {
            return Err(Report::new(TilescopeError::Grid(format!(
                "tile {coord} is already placed"
            ))));
        }
        if let Some(name) = name {
            if self.names.contains_key(name) {
                return Err(Report::new(TilescopeError::Grid(format!(
                    "tile name {name:?} is already used"
                ))));
            }
        }

        let slot = self.tiles.len();
        self.tiles.push(self.layout.place(coord));
        self.index.insert(coord, slot);
        if let Some(name) = name {
            self.names.insert(name.to_owned(), slot);
        }
        Ok(&self.tiles[slot])
    }

    /// Tiles in insertion order.
    pub fn tiles(&self) -> &[PlacedTile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, coord: TileCoordinate) -> Option<&PlacedTile> {
        self.index.get(&coord).map(|&i| &self.tiles[i])
    }

    pub fn get_by_label(&self, label: &str) -> Option<&PlacedTile> {
        parse_label(label).ok().and_then(|c| self.get(c))
    }

    pub fn find_by_name(&self, name: &str) -> Option<&PlacedTile> {
        self.names.get(name).map(|&i| &self.tiles[i])
    }

    pub fn coordinate_at(&self, world: Vec3) -> Option<TileCoordinate> {
        self.layout.coordinate_at(world)
    }

    /// The placed tile whose cell contains `world`, if any.
    pub fn tile_at(&self, world: Vec3) -> Option<&PlacedTile> {
        self.coordinate_at(world).and_then(|c| self.get(c))
    }

    /// World-space bounding box `(min, max)` of all tiles.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for tile in &self.tiles {
            min = min.min(tile.center - tile.half_size);
            max = max.max(tile.center + tile.half_size);
        }
        (!self.tiles.is_empty()).then_some((min, max))
    }
}
