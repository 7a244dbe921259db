//! Sample stream to open polyline.

use crate::{
    mesh::{Mesh, PlanarPoint},
    record::GeoPoint,
    TerrainError,
};
use log::debug;
use tmerc::TransverseMercator;

impl Mesh {
    /// Projects every record and connects consecutive samples, in
    /// arrival order, with an edge `[k, k - 1]`.
    ///
    /// The path is left open. Zero or one record produce no edges.
    pub fn path<I>(projection: &TransverseMercator, records: I) -> Result<Mesh, TerrainError>
    where
        I: IntoIterator<Item = Result<GeoPoint, TerrainError>>,
    {
        let now = std::time::Instant::now();
        let mut mesh = Mesh::default();

        for (k, record) in records.into_iter().enumerate() {
            let point = record?;
            let planar = projection
                .forward(point.coord())
                .map_err(|source| TerrainError::Projection { index: k, source })?;
            mesh.vertices.push(PlanarPoint {
                x: planar.x,
                y: planar.y,
                z: point.elevation,
            });
            if k > 0 {
                mesh.edges.push([k, k - 1]);
            }
        }

        debug!(
            "path; len: {}, exec: {:?}",
            mesh.vertices.len(),
            now.elapsed()
        );

        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use crate::{grid::tests::samples, mesh::Mesh, record::GeoPoint, TerrainError};
    use tmerc::{Anchor, TransverseMercator};

    fn projection() -> TransverseMercator {
        TransverseMercator::new(Anchor::new(31.0, 34.0).unwrap())
    }

    #[test]
    fn test_edges() {
        for n in [0, 1, 2, 7] {
            let mesh = Mesh::path(&projection(), samples(n, 1, 31.0, 34.0)).unwrap();
            assert_eq!(mesh.vertices.len(), n);
            assert_eq!(mesh.edges.len(), n.saturating_sub(1));
            for (k, edge) in mesh.edges.iter().enumerate() {
                assert_eq!(*edge, [k + 1, k]);
            }
            assert!(mesh.faces.is_empty());
            assert!(mesh.is_consistent());
        }
    }

    #[test]
    fn test_arrival_order() {
        let records = [(31.02, 34.0), (31.0, 34.0), (31.01, 34.0)]
            .into_iter()
            .map(|(lat, lon)| {
                Ok(GeoPoint {
                    lat,
                    lon,
                    elevation: 5.0,
                })
            });
        let mesh = Mesh::path(&projection(), records).unwrap();
        assert!(mesh.vertices[0].y > mesh.vertices[2].y);
        assert!(mesh.vertices[2].y > mesh.vertices[1].y);
        assert_eq!(mesh.edges, [[1, 0], [2, 1]]);
    }

    #[test]
    fn test_malformed_record_aborts() {
        let mut records = samples(4, 1, 31.0, 34.0);
        records.push(Err(TerrainError::MalformedRecord {
            line: 5,
            reason: "bad".to_string(),
        }));
        assert!(matches!(
            Mesh::path(&projection(), records),
            Err(TerrainError::MalformedRecord { line: 5, .. })
        ));
    }
}
