//! Discretization of the boundary integral operators.

pub mod collocation;

pub use collocation::{double_layer, single_layer, CollocationOptions};
