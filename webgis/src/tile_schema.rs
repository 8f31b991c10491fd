//! [`TileSchema`] is used by tile layers to calculate [tile indices](TileIndex) needed for a given
//! [`MapView`], and by the WMS source to address feature info queries.

use std::collections::BTreeSet;

use webgis_types::{Crs, Point2d, Rect};

use crate::lod::Lod;
use crate::view::MapView;

const RESOLUTION_TOLERANCE: f64 = 0.01;

/// Resolution of the zero z-level of the standard Web Mercator schema.
pub const WEB_TOP_RESOLUTION: f64 = 156543.03392800014;

const WEB_HALF_EXTENT: f64 = 20037508.342787;

/// Tile index.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, PartialOrd, Ord)]
pub struct TileIndex {
    /// X index.
    pub x: i32,
    /// Y index.
    pub y: i32,
    /// Z index.
    pub z: u32,
}

impl TileIndex {
    /// Create a new index instance.
    pub fn new(x: i32, y: i32, z: u32) -> Self {
        Self { x, y, z }
    }
}

/// Tile schema specifies how tile indices are calculated based on the map position and resolution.
///
/// Tiles are counted from the top-left corner (`origin`), Y growing downwards, as OSM-like
/// services do.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSchema {
    /// Position where all tiles have `X == 0, Y == 0` indices.
    pub origin: Point2d,
    /// Rectangle that contains all tiles of the tile scheme.
    pub bounds: Rect,
    /// Sorted set of levels of detail that specify resolutions for each z-level.
    pub lods: BTreeSet<Lod>,
    /// Width of a single tile in pixels.
    pub tile_width: u32,
    /// Height of a single tile in pixels.
    pub tile_height: u32,
    /// Crs of the scheme.
    pub crs: Crs,
}

impl TileSchema {
    /// Standard Web Mercator based tile scheme (used, for example, by OSM and CARTO).
    pub fn web(lods_count: u32) -> Self {
        let mut lods = BTreeSet::new();
        let mut resolution = WEB_TOP_RESOLUTION;
        for z in 0..lods_count {
            if let Some(lod) = Lod::new(resolution, z) {
                lods.insert(lod);
            }
            resolution /= 2.0;
        }

        TileSchema {
            origin: Point2d::new(-WEB_HALF_EXTENT, WEB_HALF_EXTENT),
            bounds: Rect::new(
                -WEB_HALF_EXTENT,
                -WEB_HALF_EXTENT,
                WEB_HALF_EXTENT,
                WEB_HALF_EXTENT,
            ),
            lods,
            tile_width: 256,
            tile_height: 256,
            crs: Crs::EPSG3857,
        }
    }

    /// Resolution of the given z-level, if exists.
    pub fn lod_resolution(&self, z: u32) -> Option<f64> {
        self.lods
            .iter()
            .find(|lod| lod.z_index() == z)
            .map(|lod| lod.resolution())
    }

    /// Select a level of detail for the given resolution: the coarsest level that is not coarser
    /// than the resolution (with a small tolerance).
    pub fn select_lod(&self, resolution: f64) -> Option<Lod> {
        if !resolution.is_finite() {
            return None;
        }

        // Lods are sorted from the finest to the coarsest.
        for lod in self.lods.iter().rev() {
            if lod.resolution() * (1.0 - RESOLUTION_TOLERANCE) <= resolution {
                return Some(*lod);
            }
        }

        self.lods.iter().next().copied()
    }

    /// Index of the tile at the given z-level that contains the point.
    pub fn tile_at(&self, point: &Point2d, z: u32) -> Option<TileIndex> {
        let resolution = self.lod_resolution(z)?;
        let tile_w = resolution * self.tile_width as f64;
        let tile_h = resolution * self.tile_height as f64;

        let x = ((point.x - self.origin.x) / tile_w).floor() as i32;
        let y = ((self.origin.y - point.y) / tile_h).floor() as i32;

        Some(TileIndex::new(x, y, z))
    }

    /// Iterate over tile indices that should be displayed for the given map view.
    pub fn iter_tiles(&self, view: &MapView) -> Option<impl Iterator<Item = TileIndex>> {
        if *view.crs() != self.crs {
            return None;
        }

        let lod = self.select_lod(view.resolution())?;
        let bbox = view.get_bbox()?;

        let top_left = self.tile_at(&Point2d::new(bbox.x_min(), bbox.y_max()), lod.z_index())?;
        let bottom_right =
            self.tile_at(&Point2d::new(bbox.x_max(), bbox.y_min()), lod.z_index())?;
        let max_index = self.max_index(lod.resolution());

        let x_range = top_left.x.max(0)..=bottom_right.x.min(max_index);
        let y_range = top_left.y.max(0)..=bottom_right.y.min(max_index);
        let z = lod.z_index();

        Some(x_range.flat_map(move |x| y_range.clone().map(move |y| TileIndex::new(x, y, z))))
    }

    /// Bounding box of the tile in the schema CRS.
    pub fn tile_bbox(&self, index: TileIndex) -> Option<Rect> {
        let resolution = self.lod_resolution(index.z)?;
        let tile_w = resolution * self.tile_width as f64;
        let tile_h = resolution * self.tile_height as f64;

        let x_min = self.origin.x + index.x as f64 * tile_w;
        let y_max = self.origin.y - index.y as f64 * tile_h;

        Some(Rect::new(x_min, y_max - tile_h, x_min + tile_w, y_max))
    }

    fn max_index(&self, resolution: f64) -> i32 {
        let tiles = self.bounds.width() / resolution / self.tile_width as f64;
        (tiles.round() as i32 - 1).max(0)
    }
}
