//! Wavefront OBJ mesh output.

use crate::{import::MeshSink, mesh::Mesh, TerrainError};
use std::io::Write;

/// Writes every mesh it receives as an object in a single OBJ stream.
pub struct ObjSink<W: Write> {
    out: W,

    /// Vertices written so far. OBJ indices are one-based and global
    /// to the file.
    written: usize,
}

impl<W: Write> ObjSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> MeshSink for ObjSink<W> {
    fn add_mesh(&mut self, name: &str, mesh: Mesh) -> Result<(), TerrainError> {
        let base = self.written + 1;
        let out = &mut self.out;
        writeln!(out, "o {name}")?;
        for v in &mesh.vertices {
            writeln!(out, "v {} {} {}", v.x, v.y, v.z)?;
        }
        for face in &mesh.faces {
            write!(out, "f")?;
            for idx in face.indices() {
                write!(out, " {}", base + idx)?;
            }
            writeln!(out)?;
        }
        for [a, b] in &mesh.edges {
            writeln!(out, "l {} {}", base + a, base + b)?;
        }
        out.flush()?;
        self.written += mesh.vertices.len();
        Ok(())
    }
}
