#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures shared by the packfile crates.
//!
//! - [`Arena`] / [`Handle`]: identity-keyed object storage. Object graphs may
//!   contain cycles, so objects refer to each other by handle, never by
//!   reference or `Rc`.
//! - [`math`]: the fixed-layout value types (vectors, quaternions, matrices)
//!   that engine objects embed directly in their headers.

mod arena;
mod invariants;
pub mod math;


pub use arena::{Arena, Handle};
pub use math::{Matrix3, Matrix4, QsTransform, Quaternion, Transform, Vector2, Vector3, Vector4};
