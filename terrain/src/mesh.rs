use tmerc::C;

/// A projected vertex. `z` is the source elevation, unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanarPoint {
    pub x: C,
    pub y: C,
    pub z: C,
}

/// A polygon referencing vertices by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Face {
    Triangle([usize; 3]),
    Quad([usize; 4]),
}

impl Face {
    pub fn indices(&self) -> &[usize] {
        match self {
            Self::Triangle(indices) => indices,
            Self::Quad(indices) => indices,
        }
    }
}

/// A line segment between two vertices, by index.
pub type Edge = [usize; 2];

/// Vertices plus the faces or edges connecting them.
///
/// Grid builds produce faces and no edges, path builds produce edges
/// and no faces.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mesh {
    pub vertices: Vec<PlanarPoint>,
    pub faces: Vec<Face>,
    pub edges: Vec<Edge>,
}

impl Mesh {
    /// Returns `true` if every face and edge index refers to an
    /// existing vertex.
    pub fn is_consistent(&self) -> bool {
        let n = self.vertices.len();
        self.faces
            .iter()
            .flat_map(|face| face.indices())
            .chain(self.edges.iter().flatten())
            .all(|&idx| idx < n)
    }
}
