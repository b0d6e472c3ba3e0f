use derive_more::{Display, Error, From};
use std::io;

#[derive(Debug, Display, Error, From)]
pub enum ServerError {
    #[display(fmt = "Couldn't listen on {}: {}", address, source)]
    #[from(ignore)]
    Bind { address: String, source: io::Error },
    #[display(fmt = "Connection failed: {}", source)]
    Io { source: io::Error },
    #[display(fmt = "Couldn't serialize message: {}", source)]
    Serialization { source: serde_json::Error },
}

pub type ServerResult<T> = Result<T, ServerError>;
