use crate::{
    options::{Format, Import},
    progress,
    session::Session,
    sink::JsonSink,
};
use anyhow::{anyhow, bail, Context, Result};
use indicatif::{MultiProgress, ProgressDrawTarget};
use log::{info, warn};
use rayon::prelude::*;
use std::{
    collections::HashSet,
    ffi::OsStr,
    fs::{self, File},
    io::{BufReader, BufWriter},
    path::Path,
};
use terrain::{Imported, Importer, ObjSink, Topology};

impl Import {
    pub fn run(&self, topology: Topology) -> Result<()> {
        fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("creating {}", self.out_dir.display()))?;

        let mut session = match &self.session {
            Some(path) => Session::load(path)?,
            None => Session::default(),
        };

        let importer = {
            let mut builder = Importer::builder()
                .topology(topology)
                .anchor(session.anchor(self.scale)?)
                .extent(self.extent.map(|extent| extent.0))
                .ignore_existing(self.ignore_georeferencing);
            if let Some(scale) = self.scale {
                builder = builder.scale(scale);
            }
            builder.build()?
        };

        let progress_group = MultiProgress::with_draw_target(ProgressDrawTarget::stderr_with_hz(4));
        let inputs = self.named_inputs()?;
        let (first, rest) = inputs
            .split_first()
            .ok_or_else(|| anyhow!("no input files"))?;

        // The first import resolves the anchor, everything after it is
        // projected in the same frame.
        let imported = self.import(&importer, first, &progress_group)?;
        if session.pin(&imported.anchor) {
            if let Some(path) = &self.session {
                session.save(path)?;
                info!(
                    "pinned reference point ({}, {}) in {}",
                    imported.anchor.lat(),
                    imported.anchor.lon(),
                    path.display()
                );
            }
        }

        let pinned = importer.pinned(imported.anchor);
        rest.par_iter()
            .try_for_each(|input| self.import(&pinned, input, &progress_group).map(|_| ()))?;

        Ok(())
    }

    /// Pairs every input with its output name. Each output is written
    /// by exactly one import, so names must be unique.
    fn named_inputs(&self) -> Result<Vec<(&Path, &str)>> {
        let mut seen = HashSet::new();
        self.input
            .iter()
            .map(|input| {
                let name = input
                    .file_stem()
                    .and_then(OsStr::to_str)
                    .ok_or_else(|| anyhow!("invalid input path {}", input.display()))?;
                if !seen.insert(name) {
                    bail!(
                        "{} has the same name as an earlier input, both would write {name}.{}",
                        input.display(),
                        self.format.extension()
                    );
                }
                Ok((input.as_path(), name))
            })
            .collect()
    }

    fn import(
        &self,
        importer: &Importer,
        &(input, name): &(&Path, &str),
        progress_group: &MultiProgress,
    ) -> Result<Imported> {
        let out_path = self
            .out_dir
            .join(format!("{name}.{}", self.format.extension()));
        let out_tmp_path = out_path.with_extension("tmp");

        let file = File::open(input).with_context(|| format!("opening {}", input.display()))?;
        let len = file.metadata()?.len();
        let pb = progress_group.add(progress::bar(format!("Import {name}"), len));
        let rdr = BufReader::new(pb.wrap_read(file));
        let wtr = BufWriter::new(File::create(&out_tmp_path)?);

        let result = match self.format {
            Format::Obj => importer.run(name, rdr, &mut ObjSink::new(wtr)),
            Format::Json => importer.run(name, rdr, &mut JsonSink::new(wtr)),
        };
        pb.finish_and_clear();

        match result {
            Ok(imported) => {
                fs::rename(&out_tmp_path, &out_path)?;
                info!(
                    "{} -> {}; vertices: {}, faces: {}, edges: {}",
                    input.display(),
                    out_path.display(),
                    imported.vertices,
                    imported.faces,
                    imported.edges
                );
                Ok(imported)
            }
            Err(e) => {
                if let Err(rm_err) = fs::remove_file(&out_tmp_path) {
                    warn!("removing {}: {rm_err}", out_tmp_path.display());
                }
                Err(e).with_context(|| format!("importing {}", input.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        options::{Format, Import},
        session::Session,
    };
    use approx::assert_abs_diff_eq;
    use std::{
        fmt::Write as _,
        fs,
        path::{Path, PathBuf},
    };
    use terrain::{Primitive, Topology};

    /// A fresh, empty scratch directory for one test.
    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("geomesh-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Writes a 3x3 grid file, 0.25° apart, with its southwest sample at
    /// (`min_lat`, `min_lon`).
    fn write_grid(path: &Path, min_lat: f64, min_lon: f64) {
        let mut src = format!("3 3 0.25 0.25 {min_lon} {min_lat}\n");
        for row in 0..3 {
            for col in 0..3 {
                let lat = min_lat + row as f64 * 0.25;
                let lon = min_lon + col as f64 * 0.25;
                writeln!(src, "{lat} {lon} {}", 10 * row + col).unwrap();
            }
        }
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, src).unwrap();
    }

    fn import(dir: &Path, input: Vec<PathBuf>) -> Import {
        Import {
            session: Some(dir.join("session.json")),
            scale: None,
            ignore_georeferencing: false,
            extent: None,
            out_dir: dir.join("out"),
            format: Format::Json,
            input,
        }
    }

    /// Returns the `[x, y]` of every vertex in a JSON mesh output.
    fn planar_xy(path: &Path) -> Vec<[f64; 2]> {
        let raw = fs::read_to_string(path).unwrap();
        let doc: serde_json::Value = serde_json::from_str(raw.trim()).unwrap();
        doc["vertices"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| [v["x"].as_f64().unwrap(), v["y"].as_f64().unwrap()])
            .collect()
    }

    #[test]
    fn test_first_input_pins_session() {
        let dir = scratch("pin");
        let (west, east) = (dir.join("west.grid"), dir.join("east.grid"));
        write_grid(&west, 31.0, 34.0);
        write_grid(&east, 31.0, 34.5);

        import(&dir, vec![west, east])
            .run(Topology::Grid(Primitive::Quad))
            .unwrap();

        let session = Session::load(&dir.join("session.json")).unwrap();
        assert_abs_diff_eq!(session.latitude.unwrap(), 31.375, epsilon = 1e-12);
        assert_abs_diff_eq!(session.longitude.unwrap(), 34.375, epsilon = 1e-12);

        // The east tile was projected with the pinned anchor, so its
        // west column lands on the west tile's east column.
        let west_xy = planar_xy(&dir.join("out/west.json"));
        let east_xy = planar_xy(&dir.join("out/east.json"));
        for row in 0..3 {
            let (a, b) = (west_xy[row * 3 + 2], east_xy[row * 3]);
            assert_abs_diff_eq!(a[0], b[0], epsilon = 1e-6);
            assert_abs_diff_eq!(a[1], b[1], epsilon = 1e-6);
        }
        assert!(!dir.join("out/west.tmp").exists());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_ignore_georeferencing_keeps_session() {
        let dir = scratch("ignore");
        let existing = Session {
            latitude: Some(10.0),
            longitude: Some(20.0),
        };
        existing.save(&dir.join("session.json")).unwrap();
        let input = dir.join("tile.grid");
        write_grid(&input, 31.0, 34.0);

        let mut opts = import(&dir, vec![input]);
        opts.ignore_georeferencing = true;
        opts.run(Topology::Grid(Primitive::Triangle)).unwrap();

        assert_eq!(Session::load(&dir.join("session.json")).unwrap(), existing);
        // Projected around the tile's own center, not the session's.
        let xy = planar_xy(&dir.join("out/tile.json"));
        assert!(xy.iter().all(|[x, y]| x.abs() < 50_000.0 && y.abs() < 50_000.0));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let dir = scratch("dupes");
        let (west, east) = (dir.join("west/n31.grid"), dir.join("east/n31.grid"));
        write_grid(&west, 31.0, 34.0);
        write_grid(&east, 31.0, 34.5);

        assert!(import(&dir, vec![west, east])
            .run(Topology::Grid(Primitive::Quad))
            .is_err());
        assert!(!dir.join("out/n31.json").exists());
        assert!(!dir.join("session.json").exists());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_failed_import_reports_import_error() {
        let dir = scratch("failed");
        let input = dir.join("short.grid");
        fs::write(&input, "3 3 0.25 0.25 34 31\n31 34 1\n").unwrap();

        let err = import(&dir, vec![input])
            .run(Topology::Grid(Primitive::Quad))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<terrain::TerrainError>(),
            Some(terrain::TerrainError::IncompleteGrid { read: 1, .. })
        ));
        assert!(!dir.join("out/short.tmp").exists());
        fs::remove_dir_all(&dir).unwrap();
    }
}
