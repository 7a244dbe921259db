use serde::Serialize;
use std::io::{self, Write};
use terrain::{Mesh, MeshSink, TerrainError};

/// Writes one JSON document per line for every mesh it receives.
pub struct JsonSink<W: Write> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> MeshSink for JsonSink<W> {
    fn add_mesh(&mut self, name: &str, mesh: Mesh) -> Result<(), TerrainError> {
        #[derive(Serialize)]
        struct Named<'a> {
            name: &'a str,
            #[serde(flatten)]
            mesh: Mesh,
        }

        serde_json::to_writer(&mut self.out, &Named { name, mesh }).map_err(io::Error::from)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
