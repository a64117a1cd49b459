//! Line-segment particles drifting across a toroidal field, joined by proximity edges.
//!
//! [`field::ParticleField`] owns the particles and advances them one tick at a time.
//! [`proximity::ProximityRenderer`] turns a snapshot of them into a [`proximity::DrawList`]
//! for whatever surface does the actual stroking.

pub mod error;
pub mod field;
pub mod parameters;
pub mod proximity;
pub mod scene;
