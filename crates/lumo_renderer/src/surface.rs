//! Surface trait, cached bounds and the flat `SurfaceList`.

use crate::{HitRecord, Material};
use lumo_math::{Aabb, Interval, Ray};

/// Trait for geometric primitives that rays can hit.
///
/// Bounds are cached: shape mutators mark them dirty and
/// [`Surface::bounding_box`] recomputes them. Bounds may only change while
/// the scene is being assembled; traversal reads them through `&self`.
pub trait Surface: Send + Sync {
    /// Test if a ray hits this surface within `ray_t`.
    ///
    /// On success `rec` holds the nearest hit inside `ray_t` and true is
    /// returned. On a miss `rec` may have been left untouched.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool;

    /// Bounding box, recomputed if dirty or if `force_recompute` is set.
    fn bounding_box(&mut self, force_recompute: bool) -> Aabb;

    /// Last computed bounding box.
    fn bounds(&self) -> Aabb;

    /// Material applied to this surface.
    fn material(&self) -> Option<&Material> {
        None
    }

    /// Display name, used in log messages.
    fn name(&self) -> &str;
}

/// A cached bounding box with a dirty flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsCache {
    bbox: Aabb,
    dirty: bool,
}

impl BoundsCache {
    /// An empty cache that needs computing.
    pub fn dirty() -> Self {
        Self {
            bbox: Aabb::EMPTY,
            dirty: true,
        }
    }

    pub fn get(&self) -> Aabb {
        self.bbox
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the cached box as stale.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Return the cached box, running `compute` first if it is stale or forced.
    pub fn refresh(&mut self, force_recompute: bool, compute: impl FnOnce() -> Aabb) -> Aabb {
        if force_recompute || self.dirty {
            self.bbox = compute();
            self.dirty = false;
        }
        self.bbox
    }
}

impl Default for BoundsCache {
    fn default() -> Self {
        Self::dirty()
    }
}

/// An unordered list of surfaces, tested exhaustively.
pub struct SurfaceList {
    surfaces: Vec<Box<dyn Surface>>,
    bounds: BoundsCache,
}

impl SurfaceList {
    /// Create a new empty surface list.
    pub fn new() -> Self {
        Self::from_surfaces(Vec::new())
    }

    pub fn from_surfaces(surfaces: Vec<Box<dyn Surface>>) -> Self {
        let mut list = Self {
            surfaces,
            bounds: BoundsCache::dirty(),
        };
        list.bounding_box(false);
        list
    }

    /// Add a surface to the list.
    pub fn add(&mut self, surface: Box<dyn Surface>) {
        self.surfaces.push(surface);
        self.bounds.invalidate();
    }

    /// Hand the surfaces over, e.g. to build a BVH.
    pub fn into_surfaces(self) -> Vec<Box<dyn Surface>> {
        self.surfaces
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

impl Default for SurfaceList {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for SurfaceList {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let mut hit_anything = false;
        let mut closest_so_far = ray_t.max;

        for surface in &self.surfaces {
            if surface.hit(ray, ray_t.with_max(closest_so_far), rec) {
                hit_anything = true;
                closest_so_far = rec.t;
            }
        }

        hit_anything
    }

    fn bounding_box(&mut self, force_recompute: bool) -> Aabb {
        let surfaces = &mut self.surfaces;
        self.bounds.refresh(force_recompute, || {
            let mut bbox = Aabb::EMPTY;
            for surface in surfaces.iter_mut() {
                bbox.expand_by(&surface.bounding_box(force_recompute));
            }
            bbox
        })
    }

    fn bounds(&self) -> Aabb {
        self.bounds.get()
    }

    fn name(&self) -> &str {
        "SurfaceList"
    }
}
