//! Depth-bounded quadtree broad phase over same-sized AABBs
//!
//! The tree is a flat arena of nodes laid out so that every completed
//! subtree occupies a contiguous index range: children of node `i` at depth
//! `d` live at `i + 1`, `i + 1 + off`, `i + 1 + 2*off`, `i + 1 + 3*off`,
//! where `off` is the precomputed siblings offset for that depth. All node
//! storage is allocated once at construction and never grows, which keeps
//! the depth-first query on a small explicit stack instead of recursion.
//!
//! Objects share one size class per tree (all bricks are the same size), so
//! `insert` takes only a center; the tree derives the AABB itself. Once a
//! node subdivides it never merges back, and an object straddling a child
//! boundary stays at the internal node.

use glam::Vec2;

use super::aabb::Aabb;
use super::quadrant::Quadrant;
use crate::EPSILON;

/// Decides when an occupied node splits into four children
pub trait SubdivisionPolicy {
    fn should_subdivide(&self, object_count: usize) -> bool;
}

/// Default policy: subdivide as soon as a node holds anything
#[derive(Debug, Clone, Copy, Default)]
pub struct OccupiedPolicy;

impl SubdivisionPolicy for OccupiedPolicy {
    fn should_subdivide(&self, object_count: usize) -> bool {
        object_count > 0
    }
}

/// Total node count of a complete 4-ary tree of the given depth
pub const fn quadrant_count(depth: usize) -> usize {
    (4usize.pow(depth as u32 + 1) - 1) / 3
}

/// Index distance between siblings at `depth` in a tree bounded by
/// `max_depth`: the size of one sibling's complete subtree.
pub fn siblings_offset(depth: usize, max_depth: usize) -> usize {
    debug_assert!(depth >= 1 && depth <= max_depth);
    (depth..=max_depth).map(|d| 4usize.pow((max_depth - d) as u32)).sum()
}

fn children_indices(node: usize, children_offset: usize) -> [usize; 4] {
    let first = node + 1;
    [
        first,
        first + children_offset,
        first + 2 * children_offset,
        first + 3 * children_offset,
    ]
}

/// Array-backed quadtree over objects of one fixed size class
#[derive(Debug, Clone)]
pub struct Quadtree<T, P = OccupiedPolicy> {
    max_depth: usize,
    objects_half_extents: Vec2,
    policy: P,
    quadrants: Vec<Quadrant>,
    depths: Vec<usize>,
    subdivided: Vec<bool>,
    /// Parallel per-node lists: object centers and their payloads
    centers: Vec<Vec<Vec2>>,
    payloads: Vec<Vec<T>>,
    /// Quadrant size per depth, from the whole area down to the leaves
    per_depth_size: Vec<Vec2>,
    /// Siblings offset per parent depth (leaves have no children)
    children_offsets: Vec<usize>,
}

impl<T> Quadtree<T, OccupiedPolicy> {
    /// Tree over `area` with the default subdivide-when-occupied policy
    pub fn new(area: &Aabb, objects_half_extents: Vec2, max_depth: usize) -> Self {
        Self::with_policy(area, objects_half_extents, max_depth, OccupiedPolicy)
    }
}

impl<T, P: SubdivisionPolicy> Quadtree<T, P> {
    pub fn with_policy(
        area: &Aabb,
        objects_half_extents: Vec2,
        max_depth: usize,
        policy: P,
    ) -> Self {
        let node_count = quadrant_count(max_depth);

        let area_size = area.max() - area.min();
        let mut per_depth_size = Vec::with_capacity(max_depth + 1);
        let mut size = area_size;
        for _ in 0..=max_depth {
            per_depth_size.push(size);
            size *= 0.5;
        }

        let children_offsets = (0..max_depth)
            .map(|depth| siblings_offset(depth + 1, max_depth))
            .collect();

        let mut tree = Self {
            max_depth,
            objects_half_extents,
            policy,
            quadrants: vec![Quadrant::default(); node_count],
            depths: vec![0; node_count],
            subdivided: vec![false; node_count],
            centers: (0..node_count).map(|_| Vec::new()).collect(),
            payloads: (0..node_count).map(|_| Vec::new()).collect(),
            per_depth_size,
            children_offsets,
        };

        tree.quadrants[0].set_min(area.min());
        tree.build_quadrant(0, 0);
        tree
    }

    /// Eagerly lay out the full 4-ary quadrant grid down to `max_depth`
    fn build_quadrant(&mut self, node: usize, depth: usize) {
        debug_assert!(node < self.quadrants.len());
        debug_assert!(depth <= self.max_depth);

        self.depths[node] = depth;
        self.subdivided[node] = false;

        if depth == self.max_depth {
            return;
        }

        let child_depth = depth + 1;
        let child_size = self.per_depth_size[child_depth];
        let children = children_indices(node, self.children_offsets[depth]);

        // Siblings are nudged apart by EPSILON so no two cells share a
        // boundary; "contains" stays unambiguous for non-straddling boxes.
        let parent_min = self.quadrants[node].min();
        self.quadrants[children[0]].set_min(parent_min);
        self.quadrants[children[1]].set_min(parent_min + Vec2::new(child_size.x + EPSILON, 0.0));
        self.quadrants[children[2]].set_min(parent_min + Vec2::new(0.0, child_size.y + EPSILON));
        self.quadrants[children[3]]
            .set_min(parent_min + Vec2::new(child_size.x + EPSILON, child_size.y + EPSILON));

        for &child in &children {
            self.build_quadrant(child, child_depth);
        }
    }

    /// Insert one object by its center; the tree derives its AABB from the
    /// shared half-extents. Descends into the single child that fully
    /// contains the box, or stores the object at the current node when it
    /// straddles a boundary.
    pub fn insert(&mut self, object_center: Vec2, object_data: T) {
        let aabb = Aabb::from_center_half_extents(object_center, self.objects_half_extents);
        let aabb_min = aabb.min();
        let aabb_max = aabb.max();

        let mut node = 0;
        let mut depth = 0;

        loop {
            if !self.subdivided[node] {
                self.centers[node].push(object_center);
                self.payloads[node].push(object_data);

                if depth < self.max_depth
                    && self.policy.should_subdivide(self.centers[node].len())
                {
                    self.subdivide(node, depth);
                }
                return;
            }

            let children_offset = self.children_offsets[depth];
            depth += 1;
            let child_size = self.per_depth_size[depth];

            let mut child_index = node + 1;
            let mut descended = false;
            for _ in 0..4 {
                if self.quadrants[child_index].contains(aabb_min, aabb_max, child_size) {
                    node = child_index;
                    descended = true;
                    break;
                }
                child_index += children_offset;
            }

            if !descended {
                // Straddles a child boundary: keep it at this internal node
                self.centers[node].push(object_center);
                self.payloads[node].push(object_data);
                return;
            }
        }
    }

    /// Push a node's objects down into whichever child fully contains each
    /// of them; straddlers stay at the parent. If exactly one child now
    /// meets the policy, keep chaining down that child (first in index
    /// order) until a leaf depth or a quiet child is reached.
    fn subdivide(&mut self, node: usize, depth: usize) {
        debug_assert!(depth < self.max_depth);
        debug_assert!(!self.subdivided[node]);

        let mut node = node;
        let mut depth = depth;

        loop {
            let children_offset = self.children_offsets[depth];
            depth += 1;
            let child_size = self.per_depth_size[depth];
            let children = children_indices(node, children_offset);

            let centers = std::mem::take(&mut self.centers[node]);
            let payloads = std::mem::take(&mut self.payloads[node]);
            let mut kept_centers = Vec::new();
            let mut kept_payloads = Vec::new();

            for (center, payload) in centers.into_iter().zip(payloads) {
                let aabb = Aabb::from_center_half_extents(center, self.objects_half_extents);
                let aabb_min = aabb.min();
                let aabb_max = aabb.max();

                let target = children
                    .iter()
                    .copied()
                    .find(|&child| self.quadrants[child].contains(aabb_min, aabb_max, child_size));

                match target {
                    Some(child) => {
                        self.centers[child].push(center);
                        self.payloads[child].push(payload);
                    }
                    None => {
                        kept_centers.push(center);
                        kept_payloads.push(payload);
                    }
                }
            }

            self.centers[node] = kept_centers;
            self.payloads[node] = kept_payloads;
            self.subdivided[node] = true;

            if depth == self.max_depth {
                break;
            }

            // Subdivision fires as soon as the threshold is met, so at most
            // one child can be over threshold here.
            match children
                .iter()
                .copied()
                .find(|&child| self.policy.should_subdivide(self.centers[child].len()))
            {
                Some(child) => node = child,
                None => break,
            }
        }
    }

    /// Broad-phase query: append to `out` the payload of every node whose
    /// quadrant touches `query`, pruning disjoint subtrees. Candidates are
    /// not re-tested against the query box; exact intersection is the
    /// caller's narrow phase. `out` is cleared first; returns the count
    /// appended.
    pub fn find_potential_colliders(&self, query: &Aabb, out: &mut Vec<T>) -> usize
    where
        T: Copy,
    {
        out.clear();

        let query_min = query.min();
        let query_max = query.max();

        // Each pop pushes at most 4 children and consumes 1 slot, so the
        // stack never exceeds 3 * max_depth + 1 entries.
        let mut stack = Vec::with_capacity(3 * self.max_depth + 1);
        stack.push(0_usize);

        while let Some(node) = stack.pop() {
            let depth = self.depths[node];

            if self.quadrants[node].outside(query_min, query_max, self.per_depth_size[depth]) {
                continue;
            }

            out.extend_from_slice(&self.payloads[node]);

            if self.subdivided[node] {
                let children = children_indices(node, self.children_offsets[depth]);
                // Reverse push order so child 0 is visited first
                for &child in children.iter().rev() {
                    stack.push(child);
                }
                debug_assert!(stack.len() <= 3 * self.max_depth + 1);
            }
        }

        out.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn node_count(&self) -> usize {
        self.quadrants.len()
    }

    #[cfg(test)]
    fn objects_at(&self, node: usize) -> usize {
        self.centers[node].len()
    }

    #[cfg(test)]
    fn is_subdivided(&self, node: usize) -> bool {
        self.subdivided[node]
    }
}
