// Re-export glam for convenience
pub use glam::*;

// Lumo math types
mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;

/// Small offset used for shadow rays and degenerate-case guards.
pub const EPSILON: f32 = 1e-4;

/// Square of [`EPSILON`], used to clamp squared distances in light falloff.
pub const EPSILON_SQUARED: f32 = EPSILON * EPSILON;
