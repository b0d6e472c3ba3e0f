//! Server side of the Model Context Protocol.
//!
//! A [`Session`] turns JSON-RPC messages into answers, delegating tool calls to a
//! [`ToolExecutor`]. Where the tools actually run is up to the executor: directly
//! ([`LocalExecutor`]), on REAPER's main thread (the extension) or in another process
//! ([`RemoteExecutor`]).

mod error;
pub use error::*;

mod executor;
pub use executor::*;

mod session;
pub use session::*;

mod connection;
pub use connection::*;

mod tcp;
pub use tcp::*;

mod remote;
pub use remote::*;
