//! Unique undirected edges of a triangle index list, for wireframe drawing.
use std::collections::HashSet;

/// Pack an undirected edge into one key: smaller index high, larger low.
fn edge_key(a: u32, b: u32) -> u64 {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    (u64::from(lo) << 32) | u64::from(hi)
}

/// Every undirected edge of `triangles` exactly once, in order of first
/// appearance. Each pair keeps the orientation it was first seen with.
pub fn extract_edges(triangles: &[u32]) -> Vec<[u32; 2]> {
    let mut seen = HashSet::with_capacity(triangles.len());
    let mut edges = Vec::with_capacity(triangles.len() / 2);

    for tri in triangles.chunks_exact(3) {
        for e in 0..3 {
            let a = tri[e];
            let b = tri[(e + 1) % 3];
            if seen.insert(edge_key(a, b)) {
                edges.push([a, b]);
            }
        }
    }

    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_triangle_has_three_edges() {
        let edges = extract_edges(&[0, 1, 2]);
        assert_eq!(edges, vec![[0, 1], [1, 2], [2, 0]]);
    }

    #[test]
    fn test_shared_edge_is_kept_once() {
        // Two triangles sharing edge 1-2, wound in opposite directions.
        let edges = extract_edges(&[0, 1, 2, 2, 1, 3]);
        assert_eq!(edges.len(), 5);
        assert_eq!(edges, vec![[0, 1], [1, 2], [2, 0], [1, 3], [3, 2]]);
    }

    #[test]
    fn test_edge_key_is_orientation_free() {
        assert_eq!(edge_key(7, 3), edge_key(3, 7));
        assert_eq!(edge_key(1, 2), (1u64 << 32) | 2);
        assert_ne!(edge_key(1, 2), edge_key(2, 3));
    }

    #[test]
    fn test_empty_and_partial_lists() {
        assert!(extract_edges(&[]).is_empty());
        // A trailing incomplete triangle is ignored.
        assert_eq!(extract_edges(&[0, 1, 2, 3]).len(), 3);
    }
}
