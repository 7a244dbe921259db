//! Raster grid to face mesh.

use crate::{
    mesh::{Face, Mesh, PlanarPoint},
    record::GeoPoint,
    TerrainError,
};
use log::debug;
use std::{fmt, str::FromStr};
use tmerc::TransverseMercator;

/// Upper bound on the vertices or faces reserved ahead of reading.
const MAX_RESERVE: usize = 1 << 20;

/// Polygon type used to cover each grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Primitive {
    /// One quad per cell.
    #[default]
    Quad,

    /// Two triangles per cell, split along the diagonal from the
    /// left neighbor to the top neighbor.
    Triangle,
}

impl FromStr for Primitive {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quad" => Ok(Self::Quad),
            "triangle" => Ok(Self::Triangle),
            other => Err(format!("unknown primitive '{other}', expected quad or triangle")),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quad => f.write_str("quad"),
            Self::Triangle => f.write_str("triangle"),
        }
    }
}

impl Mesh {
    pub fn grid() -> GridBuilder {
        GridBuilder {
            dimensions: None,
            primitive: Primitive::default(),
        }
    }
}

pub struct GridBuilder {
    /// Grid (width, height) in samples (required).
    dimensions: Option<(usize, usize)>,

    /// Cell polygon type (defaults to quad).
    primitive: Primitive,
}

impl GridBuilder {
    pub fn dimensions(mut self, nx: usize, ny: usize) -> Self {
        self.dimensions = Some((nx, ny));
        self
    }

    pub fn primitive(mut self, primitive: Primitive) -> Self {
        self.primitive = primitive;
        self
    }

    /// Projects exactly `nx * ny` row-major `records` and connects them
    /// into cells.
    ///
    /// Records past `nx * ny` are left unconsumed. Nothing is returned
    /// unless every record was read and projected.
    pub fn build<I>(&self, projection: &TransverseMercator, records: I) -> Result<Mesh, TerrainError>
    where
        I: IntoIterator<Item = Result<GeoPoint, TerrainError>>,
    {
        let (nx, ny) = match self.dimensions {
            Some((nx, ny)) if nx > 0 && ny > 0 => (nx, ny),
            _ => return Err(TerrainError::Builder("dimensions")),
        };
        let expected = nx
            .checked_mul(ny)
            .ok_or(TerrainError::Builder("dimensions"))?;
        let faces_per_cell = match self.primitive {
            Primitive::Quad => 1,
            Primitive::Triangle => 2,
        };

        // Dimensions come from an unchecked header.
        let faces = (nx - 1)
            .checked_mul(ny - 1)
            .and_then(|cells| cells.checked_mul(faces_per_cell))
            .unwrap_or(usize::MAX);

        let now = std::time::Instant::now();
        let mut mesh = Mesh {
            vertices: Vec::with_capacity(expected.min(MAX_RESERVE)),
            faces: Vec::with_capacity(faces.min(MAX_RESERVE)),
            edges: Vec::new(),
        };

        for (i, record) in records.into_iter().take(expected).enumerate() {
            let point = record?;
            let planar = projection
                .forward(point.coord())
                .map_err(|source| TerrainError::Projection { index: i, source })?;
            mesh.vertices.push(PlanarPoint {
                x: planar.x,
                y: planar.y,
                z: point.elevation,
            });

            let (x, y) = (i % nx, i / nx);
            if x > 0 && y > 0 {
                let top = i - nx;
                let top_left = top - 1;
                let left = i - 1;
                match self.primitive {
                    Primitive::Quad => mesh.faces.push(Face::Quad([i, top, top_left, left])),
                    Primitive::Triangle => {
                        mesh.faces.push(Face::Triangle([left, top, top_left]));
                        mesh.faces.push(Face::Triangle([i, top, left]));
                    }
                }
            }
        }

        if mesh.vertices.len() < expected {
            return Err(TerrainError::IncompleteGrid {
                expected,
                read: mesh.vertices.len(),
            });
        }

        debug!(
            "grid; {nx}x{ny}, primitive: {}, faces: {}, exec: {:?}",
            self.primitive,
            mesh.faces.len(),
            now.elapsed()
        );

        Ok(mesh)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{Face, Mesh, Primitive};
    use crate::{record::GeoPoint, TerrainError};
    use approx::assert_relative_eq;
    use tmerc::{Anchor, ProjectionError, TransverseMercator};

    /// Row-major samples starting at (`lat`, `lon`), 0.01° apart, with
    /// elevation equal to the sample index.
    pub(crate) fn samples(
        nx: usize,
        ny: usize,
        lat: f64,
        lon: f64,
    ) -> Vec<Result<GeoPoint, TerrainError>> {
        (0..nx * ny)
            .map(|i| {
                Ok(GeoPoint {
                    lat: lat + (i / nx) as f64 * 0.01,
                    lon: lon + (i % nx) as f64 * 0.01,
                    elevation: i as f64,
                })
            })
            .collect()
    }

    fn projection() -> TransverseMercator {
        TransverseMercator::new(Anchor::new(31.0, 34.0).unwrap())
    }

    #[test]
    fn test_quads() {
        let mesh = Mesh::grid()
            .dimensions(3, 2)
            .build(&projection(), samples(3, 2, 31.0, 34.0))
            .unwrap();
        assert_eq!(mesh.vertices.len(), 6);
        assert_eq!(
            mesh.faces,
            [Face::Quad([4, 1, 0, 3]), Face::Quad([5, 2, 1, 4])]
        );
        assert!(mesh.edges.is_empty());
        assert!(mesh.is_consistent());
    }

    #[test]
    fn test_triangles() {
        let mesh = Mesh::grid()
            .dimensions(3, 2)
            .primitive(Primitive::Triangle)
            .build(&projection(), samples(3, 2, 31.0, 34.0))
            .unwrap();
        assert_eq!(mesh.vertices.len(), 6);
        assert_eq!(
            mesh.faces,
            [
                Face::Triangle([3, 1, 0]),
                Face::Triangle([4, 1, 3]),
                Face::Triangle([4, 2, 1]),
                Face::Triangle([5, 2, 4]),
            ]
        );
        assert!(mesh.is_consistent());
    }

    #[test]
    fn test_face_count() {
        for (nx, ny) in [(1, 1), (4, 1), (1, 4), (5, 7), (16, 3)] {
            let quads = Mesh::grid()
                .dimensions(nx, ny)
                .build(&projection(), samples(nx, ny, 31.0, 34.0))
                .unwrap();
            let triangles = Mesh::grid()
                .dimensions(nx, ny)
                .primitive(Primitive::Triangle)
                .build(&projection(), samples(nx, ny, 31.0, 34.0))
                .unwrap();
            assert_eq!(quads.faces.len(), (nx - 1) * (ny - 1));
            assert_eq!(triangles.faces.len(), 2 * (nx - 1) * (ny - 1));
            assert!(quads.is_consistent());
            assert!(triangles.is_consistent());
        }
    }

    #[test]
    fn test_vertices() {
        let mesh = Mesh::grid()
            .dimensions(3, 2)
            .build(&projection(), samples(3, 2, 31.0, 34.0))
            .unwrap();
        // The anchor sample lands on the origin.
        assert_relative_eq!(mesh.vertices[0].x, 0.0);
        assert_relative_eq!(mesh.vertices[0].y, 0.0, epsilon = 1e-6);
        for (i, vertex) in mesh.vertices.iter().enumerate() {
            assert_relative_eq!(vertex.z, i as f64);
        }
        // Columns advance east, rows advance north.
        assert!(mesh.vertices[1].x > mesh.vertices[0].x);
        assert!(mesh.vertices[3].y > mesh.vertices[0].y);
    }

    #[test]
    fn test_incomplete_grid() {
        let mut records = samples(3, 2, 31.0, 34.0);
        records.pop();
        let result = Mesh::grid().dimensions(3, 2).build(&projection(), records);
        assert!(matches!(
            result,
            Err(TerrainError::IncompleteGrid {
                expected: 6,
                read: 5
            })
        ));
    }

    #[test]
    fn test_oversized_header_is_incomplete() {
        let result = Mesh::grid()
            .dimensions(4_294_967_296, 2_147_483_647)
            .primitive(Primitive::Triangle)
            .build(&projection(), samples(1, 1, 31.0, 34.0));
        assert!(matches!(
            result,
            Err(TerrainError::IncompleteGrid { read: 1, .. })
        ));
    }

    #[test]
    fn test_trailing_records_are_not_consumed() {
        let mut records = samples(3, 3, 31.0, 34.0).into_iter();
        let mesh = Mesh::grid()
            .dimensions(3, 2)
            .build(&projection(), records.by_ref())
            .unwrap();
        assert_eq!(mesh.vertices.len(), 6);
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_malformed_record_aborts() {
        let mut records = samples(3, 2, 31.0, 34.0);
        records[4] = Err(TerrainError::MalformedRecord {
            line: 6,
            reason: "bad".to_string(),
        });
        let result = Mesh::grid().dimensions(3, 2).build(&projection(), records);
        assert!(matches!(
            result,
            Err(TerrainError::MalformedRecord { line: 6, .. })
        ));
    }

    #[test]
    fn test_singular_sample_aborts() {
        let mut records = samples(3, 2, 31.0, 34.0);
        records[2] = Ok(GeoPoint {
            lat: 0.0,
            lon: 124.0,
            elevation: 0.0,
        });
        let result = Mesh::grid().dimensions(3, 2).build(&projection(), records);
        assert!(matches!(
            result,
            Err(TerrainError::Projection {
                index: 2,
                source: ProjectionError::Singularity { .. }
            })
        ));
    }

    #[test]
    fn test_missing_dimensions() {
        let result = Mesh::grid().build(&projection(), samples(3, 2, 31.0, 34.0));
        assert!(matches!(result, Err(TerrainError::Builder("dimensions"))));
        let result = Mesh::grid()
            .dimensions(0, 2)
            .build(&projection(), Vec::new());
        assert!(matches!(result, Err(TerrainError::Builder("dimensions"))));
    }

    #[test]
    fn test_primitive_parse() {
        assert_eq!("quad".parse::<Primitive>(), Ok(Primitive::Quad));
        assert_eq!("triangle".parse::<Primitive>(), Ok(Primitive::Triangle));
        assert!("hexagon".parse::<Primitive>().is_err());
        assert_eq!(Primitive::Triangle.to_string(), "triangle");
    }
}
