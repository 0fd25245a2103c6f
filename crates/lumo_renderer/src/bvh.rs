//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree built by median split: each level sorts its surfaces by
//! bounding-box minimum along one axis, cycling X, Y, Z with depth, and
//! hands half to each child. Ranges of one or two surfaces become leaves.

use crate::{BoundsCache, HitRecord, Surface};
use lumo_math::{Aabb, Interval, Ray};
use std::cmp::Ordering;

/// BVH node - either a branch with two subtrees or a leaf with one or two surfaces.
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bounds: BoundsCache,
    },
    /// Leaf holding one surface, or two when `right` is set.
    Leaf {
        left: Box<dyn Surface>,
        right: Option<Box<dyn Surface>>,
        bounds: BoundsCache,
    },
}

impl BvhNode {
    /// Build a BVH over `surfaces`. Returns `None` for an empty set.
    ///
    /// `name` only labels the build in the log.
    pub fn build(mut surfaces: Vec<Box<dyn Surface>>, name: &str) -> Option<Self> {
        log::info!("Building BVH ({}) over {} surfaces", name, surfaces.len());

        // Sort keys must be current before any comparisons
        for surface in surfaces.iter_mut() {
            surface.bounding_box(false);
        }

        let mut root = Self::build_range(surfaces, 0)?;
        root.bounding_box(false);
        log::debug!("BVH ({}) depth {}", name, root.depth());
        Some(root)
    }

    fn build_range(mut surfaces: Vec<Box<dyn Surface>>, axis: usize) -> Option<Self> {
        let n = surfaces.len();

        if n <= 2 {
            let mut iter = surfaces.into_iter();
            let left = iter.next()?;
            return Some(BvhNode::Leaf {
                left,
                right: iter.next(),
                bounds: BoundsCache::dirty(),
            });
        }

        // Stable, so equal keys keep their input order
        surfaces.sort_by(|a, b| {
            let a_min = a.bounds().min()[axis];
            let b_min = b.bounds().min()[axis];
            a_min.partial_cmp(&b_min).unwrap_or(Ordering::Equal)
        });

        let right_surfaces = surfaces.split_off(n / 2);
        let next_axis = (axis + 1) % 3;

        Some(BvhNode::Branch {
            left: Box::new(Self::build_range(surfaces, next_axis)?),
            right: Box::new(Self::build_range(right_surfaces, next_axis)?),
            bounds: BoundsCache::dirty(),
        })
    }

    /// Number of levels below and including this node.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Number of surfaces stored in the leaves.
    pub fn surface_count(&self) -> usize {
        match self {
            BvhNode::Leaf { right, .. } => 1 + usize::from(right.is_some()),
            BvhNode::Branch { left, right, .. } => left.surface_count() + right.surface_count(),
        }
    }

    /// The two children as surfaces.
    fn children(&self) -> (&dyn Surface, Option<&dyn Surface>) {
        match self {
            BvhNode::Leaf { left, right, .. } => (left.as_ref(), right.as_deref()),
            BvhNode::Branch { left, right, .. } => (
                left.as_ref() as &dyn Surface,
                Some(right.as_ref() as &dyn Surface),
            ),
        }
    }
}

impl Surface for BvhNode {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        if !self.bounds().hit(ray, ray_t) {
            return false;
        }

        let (left, right) = self.children();

        let hit_left = left.hit(ray, ray_t, rec);

        // Only check right up to closest hit
        let right_max = if hit_left { rec.t } else { ray_t.max };
        let hit_right = match right {
            Some(right) => right.hit(ray, ray_t.with_max(right_max), rec),
            None => false,
        };

        hit_left || hit_right
    }

    fn bounding_box(&mut self, force_recompute: bool) -> Aabb {
        match self {
            BvhNode::Leaf { left, right, bounds } => bounds.refresh(force_recompute, || {
                let mut bbox = left.bounding_box(force_recompute);
                if let Some(right) = right {
                    bbox.expand_by(&right.bounding_box(force_recompute));
                }
                bbox
            }),
            BvhNode::Branch { left, right, bounds } => bounds.refresh(force_recompute, || {
                Aabb::surrounding(
                    &left.bounding_box(force_recompute),
                    &right.bounding_box(force_recompute),
                )
            }),
        }
    }

    fn bounds(&self) -> Aabb {
        match self {
            BvhNode::Leaf { bounds, .. } | BvhNode::Branch { bounds, .. } => bounds.get(),
        }
    }

    fn name(&self) -> &str {
        "BVH"
    }
}
