use crate::point::Point;
use crate::Coord;
use kiddo::float::{distance::SquaredEuclidean, kdtree::KdTree};

/// A vertex of a planning tree: its location and the arena index of its
/// parent. The root has no parent.
#[derive(Debug, Clone)]
pub struct Node<F: Coord, const N: usize> {
    point: Point<F, N>,
    parent: Option<usize>,
}

impl<F: Coord, const N: usize> Node<F, N> {
    pub fn point(&self) -> &Point<F, N> {
        &self.point
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }
}

/// A planning tree: an arena of parent-linked vertices plus a kd-tree over
/// their locations for nearest-neighbour queries.
///
/// Vertices are addressed by the integer id assigned at insertion; the
/// kd-tree stores ids as payloads, so floating-point coordinates are never
/// used as keys. The first vertex inserted is the root. Vertices are never
/// removed; rewiring only re-points parents.
///
/// The tree knows nothing about obstacles. Certifying an edge collision-free
/// before inserting it is the planner's job.
pub struct Tree<F: Coord, const N: usize> {
    kdtree: KdTree<F, usize, N, 32, u32>,
    nodes: Vec<Node<F, N>>,
}

impl<F: Coord, const N: usize> Tree<F, N> {
    pub fn new() -> Self {
        Self {
            kdtree: KdTree::new(),
            nodes: Vec::new(),
        }
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Inserts a vertex with no parent yet and returns its id.
    pub fn add_vertex(&mut self, point: Point<F, N>) -> usize {
        let id = self.nodes.len();
        self.kdtree.add(point.coords(), id);
        self.nodes.push(Node {
            point,
            parent: None,
        });
        id
    }

    /// Sets the parent of an existing vertex. `None` marks a root.
    pub fn add_edge(&mut self, child: usize, parent: Option<usize>) {
        self.nodes[child].parent = parent;
    }

    /// The location of a vertex.
    pub fn point(&self, id: usize) -> &Point<F, N> {
        &self.nodes[id].point
    }

    /// The parent id of a vertex, or `None` for a root.
    pub fn parent(&self, id: usize) -> Option<usize> {
        self.nodes[id].parent
    }

    /// Ids of the `k` vertices closest to `point`, nearest first.
    pub fn nearest(&self, point: &Point<F, N>, k: usize) -> Vec<usize> {
        let k = k.min(self.nodes.len());
        if k == 0 {
            return Vec::new();
        }
        self.kdtree
            .nearest_n::<SquaredEuclidean>(point.coords(), k)
            .iter()
            .map(|n| n.item)
            .collect()
    }

    /// Id of the vertex closest to `point`, if the tree is non-empty.
    pub fn nearest_one(&self, point: &Point<F, N>) -> Option<usize> {
        if self.nodes.is_empty() {
            return None;
        }
        Some(
            self.kdtree
                .nearest_one::<SquaredEuclidean>(point.coords())
                .item,
        )
    }

    /// Number of vertices whose location equals `point` exactly. Used to
    /// suppress duplicate insertion.
    pub fn count_at(&self, point: &Point<F, N>) -> usize {
        self.kdtree
            .within::<SquaredEuclidean>(point.coords(), <F as num_traits::float::FloatCore>::epsilon())
            .iter()
            .filter(|n| self.nodes[n.item].point == *point)
            .count()
    }

    /// Whether some vertex sits exactly at `point`.
    pub fn contains(&self, point: &Point<F, N>) -> bool {
        self.count_at(point) > 0
    }

    /// Id of the first vertex sitting exactly at `point`.
    pub fn find(&self, point: &Point<F, N>) -> Option<usize> {
        self.kdtree
            .within::<SquaredEuclidean>(point.coords(), <F as num_traits::float::FloatCore>::epsilon())
            .iter()
            .map(|n| n.item)
            .find(|&id| self.nodes[id].point == *point)
    }

    /// All vertices, in insertion order. Intended for visualisation and
    /// invariant checks.
    pub fn nodes(&self) -> &[Node<F, N>] {
        &self.nodes
    }
}

impl<F: Coord, const N: usize> Default for Tree<F, N> {
    fn default() -> Self {
        Self::new()
    }
}
