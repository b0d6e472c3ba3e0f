//! Scythe's tool catalogue.
//!
//! Each tool validates its arguments, drives a [`Daw`](scythe_daw::Daw) and answers with a flat
//! JSON object. Tools are grouped by the REAPER concept they deal with and mounted into a
//! [`ToolRegistry`].

mod error;
pub use error::*;

pub mod helpers;

mod tool;
pub use tool::*;

mod registry;
pub use registry::*;

mod groups;

#[cfg(test)]
mod testing;
