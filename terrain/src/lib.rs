//! Terrain meshes from geographic elevation samples.
//!
//! Samples are projected with a [`tmerc::TransverseMercator`] and
//! connected either as a raster grid of quads or triangles
//! ([`Mesh::grid`]) or as an open polyline ([`Mesh::path`]).
//! [`Importer`] ties record parsing, anchor resolution and mesh
//! building together for a single source.

mod error;
mod grid;
mod import;
pub mod math;
mod mesh;
mod obj;
mod path;
pub mod record;
pub mod tiles;

pub use crate::{
    error::TerrainError,
    grid::{GridBuilder, Primitive},
    import::{Imported, Importer, ImporterBuilder, MeshSink, Topology},
    mesh::{Edge, Face, Mesh, PlanarPoint},
    obj::ObjSink,
    record::GeoPoint,
};
pub use tmerc::{Anchor, ProjectionError, TransverseMercator};
