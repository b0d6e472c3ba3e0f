//! [`Daw`](scythe_daw::Daw) implementation for a running REAPER instance.
//!
//! Goes through `reaper-medium` and falls back to `reaper-low` for the functions it doesn't
//! wrap. Must only be used from REAPER's main thread.

mod util;

mod reaper_daw;
pub use reaper_daw::*;
