//! Layered graph of scalar units trained by finite-difference gradient descent

mod cost;
mod net;
mod samples;
mod trainer;
mod unit;

pub use cost::*;
pub use net::*;
pub use samples::*;
pub use trainer::*;
pub use unit::*;
