//! Spherical transverse Mercator projection.
//!
//! Maps geographic coordinates onto a plane anchored at a reference
//! point, which becomes the planar origin. Distortion is low near the
//! anchor's meridian and grows without bound as the longitude
//! difference approaches 90°.
//!
//! Coordinates are [`Coord`]s throughout. Geographic coordinates are
//! `x = longitude, y = latitude` in degrees, planar coordinates are
//! `x = easting, y = northing` in meters (scaled by the anchor's scale
//! factor).
//!
//! # References
//!
//! 1. [Transverse Mercator projection](http://en.wikipedia.org/wiki/Transverse_Mercator_projection)
//! 1. [Mercator Projection](http://mathworld.wolfram.com/MercatorProjection.html)

mod error;

pub use crate::error::ProjectionError;
use geo::geometry::{Coord, Rect};

/// Base floating point type used for all coordinates and calculations.
pub type C = f64;

/// Radius of the sphere the projection is computed on, in meters.
pub const MEAN_EARTH_RADIUS: C = 6_378_137.0;

/// The reference point (and scale) of a projection.
///
/// Anchors are immutable once built. The radius is always
/// [`MEAN_EARTH_RADIUS`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawAnchor")
)]
pub struct Anchor {
    /// Reference latitude in degrees.
    lat: C,

    /// Reference longitude in degrees.
    lon: C,

    /// Scale factor along the central meridian.
    scale: C,

    /// Sphere radius in meters.
    radius: C,
}

impl Anchor {
    /// Returns an anchor at (`lat`, `lon`) with a scale factor of 1.
    pub fn new(lat: C, lon: C) -> Result<Self, ProjectionError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(ProjectionError::InvalidAnchor("latitude out of range"));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(ProjectionError::InvalidAnchor("longitude out of range"));
        }
        Ok(Self {
            lat,
            lon,
            scale: 1.0,
            radius: MEAN_EARTH_RADIUS,
        })
    }

    /// Returns an anchor at the center of `extent`.
    pub fn from_extent(extent: &Rect<C>) -> Result<Self, ProjectionError> {
        let Coord { x: lon, y: lat } = extent.center();
        Self::new(lat, lon)
    }

    /// Returns a copy of this anchor using scale factor `scale`.
    pub fn with_scale(self, scale: C) -> Result<Self, ProjectionError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ProjectionError::InvalidAnchor("scale must be positive"));
        }
        Ok(Self { scale, ..self })
    }

    pub fn lat(&self) -> C {
        self.lat
    }

    pub fn lon(&self) -> C {
        self.lon
    }

    pub fn scale(&self) -> C {
        self.scale
    }

    pub fn radius(&self) -> C {
        self.radius
    }
}

/// Unvalidated [`Anchor`] fields, as deserialized.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawAnchor {
    lat: C,
    lon: C,
    #[serde(default = "unit_scale")]
    scale: C,
    #[serde(default)]
    radius: Option<C>,
}

#[cfg(feature = "serde")]
fn unit_scale() -> C {
    1.0
}

#[cfg(feature = "serde")]
impl TryFrom<RawAnchor> for Anchor {
    type Error = ProjectionError;

    fn try_from(raw: RawAnchor) -> Result<Self, ProjectionError> {
        if raw.radius.is_some_and(|radius| radius != MEAN_EARTH_RADIUS) {
            return Err(ProjectionError::InvalidAnchor("unsupported radius"));
        }
        Anchor::new(raw.lat, raw.lon)?.with_scale(raw.scale)
    }
}

/// A transverse Mercator projection bound to an [`Anchor`].
///
/// Holds no mutable state, so a single instance may be shared across
/// threads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransverseMercator {
    anchor: Anchor,

    /// Anchor latitude in radians.
    lat_rad: C,

    /// `scale * radius`.
    k_r: C,
}

impl TransverseMercator {
    pub fn new(anchor: Anchor) -> Self {
        Self {
            anchor,
            lat_rad: anchor.lat.to_radians(),
            k_r: anchor.scale * anchor.radius,
        }
    }

    pub fn anchor(&self) -> &Anchor {
        &self.anchor
    }

    /// Projects geographic `coord` onto the plane.
    ///
    /// Fails with [`ProjectionError::Singularity`] when `coord` is 90° or
    /// more of longitude away from the anchor, or when the result is
    /// not finite.
    pub fn forward(&self, coord: Coord<C>) -> Result<Coord<C>, ProjectionError> {
        let lat = coord.y.to_radians();
        let lon = (coord.x - self.anchor.lon).to_radians();
        let (sin_lon, cos_lon) = lon.sin_cos();
        if cos_lon.is_nan() || cos_lon < C::EPSILON {
            return Err(singularity(coord));
        }
        let b = sin_lon * lat.cos();
        let planar = Coord {
            x: 0.5 * self.k_r * ((1.0 + b) / (1.0 - b)).ln(),
            y: self.k_r * ((lat.tan() / cos_lon).atan() - self.lat_rad),
        };
        finite(planar).ok_or_else(|| singularity(coord))
    }

    /// Maps planar `coord` back to geographic coordinates.
    ///
    /// This is the exact inverse of [`forward`](Self::forward) for
    /// every input `forward` accepts, up to floating point error.
    /// Longitudes are wrapped into [-180, 180).
    pub fn inverse(&self, coord: Coord<C>) -> Result<Coord<C>, ProjectionError> {
        let x = coord.x / self.k_r;
        let d = coord.y / self.k_r + self.lat_rad;
        let lon = (x.sinh() / d.cos()).atan();
        let lat = (d.sin() / x.cosh()).asin();
        let geo = Coord {
            x: wrap_lon(self.anchor.lon + lon.to_degrees()),
            y: lat.to_degrees(),
        };
        finite(geo).ok_or_else(|| singularity(coord))
    }
}

/// Wraps a longitude into [-180, 180).
fn wrap_lon(lon: C) -> C {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

fn finite(coord: Coord<C>) -> Option<Coord<C>> {
    (coord.x.is_finite() && coord.y.is_finite()).then_some(coord)
}

fn singularity(Coord { x, y }: Coord<C>) -> ProjectionError {
    ProjectionError::Singularity { x, y }
}
