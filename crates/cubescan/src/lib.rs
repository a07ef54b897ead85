//! Hierarchical parallel prefix scans for CubeCL runtimes.
//!
//! A scan produces the running combination of the elements of a tensor along one axis, with
//! any of the operators of [instructions]. Contiguous axes are scanned by
//! [kernels::contiguous_scan], other axes by [kernels::strided_scan]. Both kernels run on any
//! runtime with plane operations and a fixed plane dim, through a
//! [ComputeClient](cubecl::prelude::ComputeClient).

#[macro_use]
extern crate derive_new;

mod config;
mod element;
mod error;
mod launch;
mod strategy;

pub mod instructions;
pub mod kernels;
pub mod precision;
pub mod tile;

pub use config::*;
pub use element::*;
pub use error::*;
pub use launch::*;
pub use strategy::*;

#[cfg(any(test, feature = "export_tests"))]
pub mod tests;
