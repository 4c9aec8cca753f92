//! Small layered networks of scalar units, trained by estimating every
//! parameter's derivative with finite differences.

pub mod gates;
pub mod graph;

#[cfg(feature = "python")]
pub mod python_ffi;
