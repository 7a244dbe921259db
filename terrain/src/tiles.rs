//! One-degree elevation tile coverage.

use crate::{math::split, TerrainError};
use geo::geometry::{Coord, Rect};
use log::debug;
use tmerc::C;

/// A one-degree source tile touched by an extent.
#[derive(Debug, Clone, PartialEq)]
pub struct TileCell {
    /// Integer southwest corner of the tile.
    pub sw_corner: Coord<i16>,

    /// The part of the requested extent which falls in this tile.
    pub extent: Rect<C>,
}

impl TileCell {
    /// Returns the conventional SRTM/NASADEM file name for this tile.
    pub fn file_name(&self) -> String {
        file_name(self.sw_corner)
    }
}

/// Returns every one-degree tile `extent` touches, in row-major order
/// from the southwest.
pub fn covering(extent: &Rect<C>) -> Result<Vec<TileCell>, TerrainError> {
    let (min, max) = (extent.min(), extent.max());
    let lats = split(min.y, max.y)?;
    let lons = split(min.x, max.x)?;

    let mut cells = Vec::new();
    for (s, n) in lats {
        for (w, e) in lons.clone() {
            let extent = Rect::new(Coord { x: w, y: s }, Coord { x: e, y: n });
            cells.push(TileCell {
                sw_corner: sw_corner(extent.min()),
                extent,
            });
        }
    }
    debug!("{} tiles cover {extent:?}", cells.len());
    Ok(cells)
}

/// Returns the southwest corner as integers for coord.
fn sw_corner(Coord { x, y }: Coord<C>) -> Coord<i16> {
    #[allow(clippy::cast_possible_truncation)]
    Coord {
        x: (x.floor() as i16),
        y: (y.floor() as i16),
    }
}

/// Returns the expected file name for coord
fn file_name(Coord { x, y }: Coord<i16>) -> String {
    let (n_s, lat) = {
        let lat = y.abs();
        let n_s = if y.is_negative() { 'S' } else { 'N' };
        (n_s, lat)
    };
    let (e_w, lon) = {
        let lon = x.abs();
        let e_w = if x.is_negative() { 'W' } else { 'E' };
        (e_w, lon)
    };
    format!("{n_s}{lat:02}{e_w}{lon:03}.hgt")
}
