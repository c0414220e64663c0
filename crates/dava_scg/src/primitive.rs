//! Primitive assembly from decoded index lists.

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::types::PrimitiveType;

/// Primitives assembled from the index list of a polygon group
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Primitives {
    /// Index triples, produced by triangle lists and strips
    Triangles(Vec<[u32; 3]>),

    /// Index pairs, produced by line lists
    Lines(Vec<[u32; 2]>),
}

impl Primitives {
    /// Expand `indices` according to the topology `kind`.
    pub fn assemble(kind: PrimitiveType, indices: &[u32]) -> Primitives {
        match kind {
            PrimitiveType::TriangleList => Primitives::Triangles(triangle_list(indices)),
            PrimitiveType::TriangleStrip => Primitives::Triangles(triangle_strip(indices)),
            PrimitiveType::LineList => Primitives::Lines(line_list(indices)),
        }
    }

    /// Number of assembled primitives
    pub fn len(&self) -> usize {
        match self {
            Primitives::Triangles(triangles) => triangles.len(),
            Primitives::Lines(lines) => lines.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn triangles(&self) -> Option<&[[u32; 3]]> {
        match self {
            Primitives::Triangles(triangles) => Some(triangles),
            Primitives::Lines(_) => None,
        }
    }

    pub fn lines(&self) -> Option<&[[u32; 2]]> {
        match self {
            Primitives::Lines(lines) => Some(lines),
            Primitives::Triangles(_) => None,
        }
    }
}

/// Group indices into non-overlapping triples. Trailing indices that do not
/// fill a triple are dropped.
pub fn triangle_list(indices: &[u32]) -> Vec<[u32; 3]> {
    indices
        .chunks_exact(3)
        .map(|triangle| [triangle[0], triangle[1], triangle[2]])
        .collect()
}

/// Convert a strip into a list with a sliding window over the indices.
///
/// Winding is not alternated, so every other triangle faces the opposite way.
pub fn triangle_strip(indices: &[u32]) -> Vec<[u32; 3]> {
    indices
        .windows(3)
        .map(|triangle| [triangle[0], triangle[1], triangle[2]])
        .collect()
}

/// Group indices into non-overlapping pairs. A trailing odd index is dropped.
pub fn line_list(indices: &[u32]) -> Vec<[u32; 2]> {
    indices
        .chunks_exact(2)
        .map(|line| [line[0], line[1]])
        .collect()
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::primitive::{line_list, triangle_list, triangle_strip, Primitives};
    use crate::types::PrimitiveType;

    #[test]
    fn strip_uses_sliding_window() {
        assert_eq!(
            triangle_strip(&[0, 1, 2, 3, 4]),
            [[0, 1, 2], [1, 2, 3], [2, 3, 4]]
        );
    }

    #[test]
    fn short_strips_are_empty() {
        assert!(triangle_strip(&[]).is_empty());
        assert!(triangle_strip(&[0, 1]).is_empty());
        assert_eq!(triangle_strip(&[4, 5, 6]), [[4, 5, 6]]);
    }

    #[test]
    fn lists_do_not_overlap() {
        assert_eq!(
            triangle_list(&[0, 1, 2, 2, 1, 3, 9]),
            [[0, 1, 2], [2, 1, 3]]
        );
        assert_eq!(line_list(&[0, 1, 1, 2, 7]), [[0, 1], [1, 2]]);
    }

    #[test]
    fn assemble_by_kind() {
        let indices = [0, 1, 2, 3];

        let strip = Primitives::assemble(PrimitiveType::TriangleStrip, &indices);
        assert_eq!(strip.len(), 2);
        assert_eq!(strip.lines(), None);

        let lines = Primitives::assemble(PrimitiveType::LineList, &indices);
        assert_eq!(lines, Primitives::Lines(vec![[0, 1], [2, 3]]));
        assert_eq!(lines.triangles(), None);

        let list = Primitives::assemble(PrimitiveType::TriangleList, &indices);
        assert_eq!(list.triangles(), Some(&[[0, 1, 2]][..]));
    }
}
