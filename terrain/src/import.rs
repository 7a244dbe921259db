//! Import orchestration.
//!
//! An [`Importer`] resolves the projection anchor for one source,
//! builds the mesh, and only then hands it to a [`MeshSink`]. Anchor
//! persistence is left to the caller: the resolved anchor is returned
//! in [`Imported`], with `derived` set when it did not come from the
//! caller.

use crate::{
    grid::Primitive,
    mesh::Mesh,
    record::{GeoPoint, Records},
    TerrainError,
};
use geo::{
    geometry::{MultiPoint, Rect},
    BoundingRect,
};
use log::debug;
use std::{
    ffi::OsStr,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};
use tmerc::{Anchor, TransverseMercator, C};

/// Receives finished meshes.
pub trait MeshSink {
    fn add_mesh(&mut self, name: &str, mesh: Mesh) -> Result<(), TerrainError>;
}

/// What to build from a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// A headed grid stream, meshed with the given primitive.
    Grid(Primitive),

    /// A headerless stream of samples, meshed as an open polyline.
    Path,
}

/// Summary of a successful import.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Imported {
    /// The anchor the mesh was projected with.
    pub anchor: Anchor,

    /// `true` if `anchor` was derived from an extent rather than
    /// supplied by the caller.
    pub derived: bool,

    pub vertices: usize,

    pub faces: usize,

    pub edges: usize,
}

#[derive(Debug, Clone)]
pub struct Importer {
    topology: Topology,
    anchor: Option<Anchor>,
    extent: Option<Rect<C>>,
    ignore_existing: bool,
    scale: Option<C>,
}

impl Importer {
    pub fn builder() -> ImporterBuilder {
        ImporterBuilder {
            topology: None,
            anchor: None,
            extent: None,
            ignore_existing: false,
            scale: None,
        }
    }

    /// Returns a copy of this importer which always projects with
    /// `anchor`.
    #[must_use]
    pub fn pinned(&self, anchor: Anchor) -> Self {
        Self {
            anchor: Some(anchor),
            ignore_existing: false,
            ..self.clone()
        }
    }

    /// Imports the file at `path`, naming the mesh after its stem.
    pub fn run_file<P, S>(&self, path: P, sink: &mut S) -> Result<Imported, TerrainError>
    where
        P: AsRef<Path>,
        S: MeshSink,
    {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(OsStr::to_str)
            .unwrap_or("terrain");
        let rdr = BufReader::new(File::open(path)?);
        debug!("importing {path:?} as {:?}", self.topology);
        self.run(name, rdr, sink)
    }

    /// Imports one source stream into `sink`.
    ///
    /// `sink` is untouched unless the whole build succeeds.
    pub fn run<R, S>(&self, name: &str, rdr: R, sink: &mut S) -> Result<Imported, TerrainError>
    where
        R: BufRead,
        S: MeshSink,
    {
        let mut records = Records::new(rdr);

        let (anchor, derived, mesh) = match (self.topology, self.existing()) {
            (Topology::Grid(primitive), existing) => {
                let header = records.header()?;
                let (anchor, derived) = match existing {
                    Some(anchor) => (anchor, false),
                    None => (self.derive(Some(header.extent()))?, true),
                };
                let mesh = Mesh::grid()
                    .dimensions(header.nx, header.ny)
                    .primitive(primitive)
                    .build(&TransverseMercator::new(anchor), records)?;
                (anchor, derived, mesh)
            }
            (Topology::Path, Some(anchor)) => {
                let mesh = Mesh::path(&TransverseMercator::new(anchor), records)?;
                (anchor, false, mesh)
            }
            (Topology::Path, None) if self.extent.is_some() => {
                let anchor = self.derive(None)?;
                let mesh = Mesh::path(&TransverseMercator::new(anchor), records)?;
                (anchor, true, mesh)
            }
            (Topology::Path, None) => {
                // The extent is only known once every sample is read.
                let points: Vec<GeoPoint> = records.collect::<Result<_, _>>()?;
                let extent = points
                    .iter()
                    .map(GeoPoint::coord)
                    .collect::<MultiPoint<C>>()
                    .bounding_rect();
                let anchor = self.derive(extent)?;
                let projection = TransverseMercator::new(anchor);
                let mesh = Mesh::path(&projection, points.into_iter().map(Ok))?;
                (anchor, true, mesh)
            }
        };

        let imported = Imported {
            anchor,
            derived,
            vertices: mesh.vertices.len(),
            faces: mesh.faces.len(),
            edges: mesh.edges.len(),
        };
        sink.add_mesh(name, mesh)?;
        Ok(imported)
    }
}

/// Private API.
impl Importer {
    fn existing(&self) -> Option<Anchor> {
        self.anchor.filter(|_| !self.ignore_existing)
    }

    /// Returns an anchor at the center of the manual extent if one was
    /// given, otherwise at the center of `data_extent`.
    fn derive(&self, data_extent: Option<Rect<C>>) -> Result<Anchor, TerrainError> {
        let extent = self.extent.or(data_extent).ok_or(TerrainError::EmptyExtent)?;
        let mut anchor = Anchor::from_extent(&extent)?;
        if let Some(scale) = self.scale {
            anchor = anchor.with_scale(scale)?;
        }
        debug!(
            "derived anchor ({}, {}) from {extent:?}",
            anchor.lat(),
            anchor.lon()
        );
        Ok(anchor)
    }
}

pub struct ImporterBuilder {
    /// What to build (required).
    topology: Option<Topology>,

    /// Previously established anchor, if any.
    anchor: Option<Anchor>,

    /// Extent to derive a new anchor from in place of the data's.
    extent: Option<Rect<C>>,

    /// Derive a new anchor even if `anchor` is set.
    ignore_existing: bool,

    /// Scale factor for derived anchors (defaults to 1).
    scale: Option<C>,
}

impl ImporterBuilder {
    pub fn topology(mut self, topology: Topology) -> Self {
        self.topology = Some(topology);
        self
    }

    pub fn anchor(mut self, anchor: Option<Anchor>) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn extent(mut self, extent: Option<Rect<C>>) -> Self {
        self.extent = extent;
        self
    }

    pub fn ignore_existing(mut self, ignore: bool) -> Self {
        self.ignore_existing = ignore;
        self
    }

    pub fn scale(mut self, scale: C) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn build(self) -> Result<Importer, TerrainError> {
        let topology = self.topology.ok_or(TerrainError::Builder("topology"))?;
        Ok(Importer {
            topology,
            anchor: self.anchor,
            extent: self.extent,
            ignore_existing: self.ignore_existing,
            scale: self.scale,
        })
    }
}

impl MeshSink for Vec<(String, Mesh)> {
    fn add_mesh(&mut self, name: &str, mesh: Mesh) -> Result<(), TerrainError> {
        self.push((name.to_owned(), mesh));
        Ok(())
    }
}
