use anyhow::{anyhow, bail, Error as AnyError};
use clap::{Args, Parser};
use geo::geometry::{Coord, Rect};
use std::{fmt, path::PathBuf, str::FromStr};
use terrain::Primitive;

/// Import elevation grids and paths as projected terrain meshes.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub enum Cli {
    /// Mesh grid files (`nx ny incx incy minlon minlat` header followed
    /// by `nx * ny` row-major `lat lon elevation` lines).
    Grid(Grid),

    /// Mesh path files (`lat lon elevation` lines) as open polylines.
    Path(Path),

    /// List the one-degree elevation tiles covering an extent.
    Tiles(Tiles),
}

#[derive(Debug, Clone, Args)]
pub struct Grid {
    /// Polygon type for each grid cell.
    #[arg(short, long, default_value_t = Primitive::Quad)]
    pub primitive: Primitive,

    #[command(flatten)]
    pub import: Import,
}

#[derive(Debug, Clone, Args)]
pub struct Path {
    #[command(flatten)]
    pub import: Import,
}

#[derive(Debug, Clone, Args)]
pub struct Import {
    /// Session file holding the shared reference point. Created on the
    /// first import if it does not exist.
    #[arg(short, long)]
    pub session: Option<PathBuf>,

    /// Projection scale factor.
    #[arg(long)]
    pub scale: Option<f64>,

    /// Derive a new reference point even if the session has one.
    #[arg(long)]
    pub ignore_georeferencing: bool,

    /// Derive the reference point from "minlat,minlon,maxlat,maxlon"
    /// instead of the data.
    #[arg(long)]
    pub extent: Option<Extent>,

    /// Output directory.
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Output format.
    #[arg(short, long, default_value_t = Format::Obj)]
    pub format: Format,

    /// Input files. The first one pins the reference point for the
    /// rest.
    #[arg(required = true)]
    pub input: Vec<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct Tiles {
    /// "minlat,minlon,maxlat,maxlon"
    #[arg(long)]
    pub extent: Extent,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent(pub Rect<f64>);

impl FromStr for Extent {
    type Err = AnyError;
    fn from_str(s: &str) -> Result<Self, AnyError> {
        let vals = s
            .split(',')
            .map(|v| f64::from_str(v.trim()))
            .collect::<Result<Vec<f64>, _>>()?;
        let [min_lat, min_lon, max_lat, max_lon] = vals[..] else {
            bail!("not a valid minlat,minlon,maxlat,maxlon extent");
        };
        Ok(Self(Rect::new(
            Coord {
                x: min_lon,
                y: min_lat,
            },
            Coord {
                x: max_lon,
                y: max_lat,
            },
        )))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// Wavefront OBJ.
    Obj,

    /// One JSON document per mesh.
    Json,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Obj => "obj",
            Self::Json => "json",
        }
    }
}

impl FromStr for Format {
    type Err = AnyError;
    fn from_str(s: &str) -> Result<Self, AnyError> {
        match s {
            "obj" => Ok(Self::Obj),
            "json" => Ok(Self::Json),
            other => Err(anyhow!("unknown format '{other}'")),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
