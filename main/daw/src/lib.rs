//! The seam between Scythe's tools and the DAW they drive.
//!
//! Tools never talk to REAPER directly. They talk to a [`Daw`], which is implemented for the real
//! thing in `scythe-reaper` and by the in-memory [`fake::FakeDaw`] for tests.

mod daw;
pub use daw::*;

mod error;
pub use error::*;

mod types;
pub use types::*;

mod units;
pub use units::*;

#[cfg(any(test, feature = "fake"))]
pub mod fake;
