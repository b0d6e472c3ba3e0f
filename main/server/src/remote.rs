use crate::ToolExecutor;
use scythe_protocol::{
    methods, CallToolParams, CallToolResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    RequestId, Tool,
};
use scythe_tools::helpers::connection_error;
use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Mutex;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Forwards tool calls to a Scythe server running in another process.
///
/// The connection is established on first use and re-established after failures, so REAPER can
/// be started (or restarted) while the client keeps running.
#[derive(Debug)]
pub struct RemoteExecutor {
    address: String,
    tools: Vec<Tool>,
    read_timeout: Option<Duration>,
    connection: Mutex<Option<Connection>>,
}

#[derive(Debug)]
struct Connection {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
    next_id: i64,
}

impl Connection {
    /// Whether the server has closed its end while we were idle.
    fn is_closed_by_peer(&self) -> bool {
        let stream = self.reader.get_ref();
        if stream.set_nonblocking(true).is_err() {
            return true;
        }
        let mut buf = [0; 1];
        let closed = match stream.peek(&mut buf) {
            Ok(n) => n == 0,
            Err(e) => e.kind() != io::ErrorKind::WouldBlock,
        };
        closed || stream.set_nonblocking(false).is_err()
    }
}

/// Distinguishes failures where the server can't have seen the call from those where it might
/// have executed it.
#[derive(Debug)]
enum ForwardError {
    NotSent(io::Error),
    Unanswered(io::Error),
}

impl From<ForwardError> for io::Error {
    fn from(error: ForwardError) -> Self {
        match error {
            ForwardError::NotSent(e) | ForwardError::Unanswered(e) => e,
        }
    }
}

impl RemoteExecutor {
    /// `tools` is what gets announced to clients. It must match the catalogue of the server.
    pub fn new(host: &str, port: u16, tools: Vec<Tool>) -> Self {
        Self {
            address: format!("{}:{}", host, port),
            tools,
            read_timeout: None,
            connection: Mutex::new(None),
        }
    }

    /// Gives up waiting for an answer after the given time.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn connect(&self) -> io::Result<Connection> {
        let mut last_error = None;
        for addr in self.address.to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    stream.set_read_timeout(self.read_timeout)?;
                    tracing::info!(msg = "Connected to Scythe server", %addr);
                    return Ok(Connection {
                        reader: BufReader::new(stream.try_clone()?),
                        writer: stream,
                        next_id: 1,
                    });
                }
                Err(e) => last_error = Some(e),
            }
        }
        Err(last_error.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "address resolved to nothing")
        }))
    }

    fn forward(
        &self,
        connection: &mut Connection,
        params: &CallToolParams,
    ) -> Result<JsonRpcResponse, ForwardError> {
        let id = RequestId::Number(connection.next_id);
        connection.next_id += 1;
        let send = |connection: &mut Connection| -> io::Result<()> {
            let params = serde_json::to_value(params)?;
            let request = JsonRpcRequest::new(id.clone(), methods::TOOLS_CALL, Some(params));
            let mut text = serde_json::to_string(&request)?;
            text.push('\n');
            connection.writer.write_all(text.as_bytes())?;
            connection.writer.flush()
        };
        send(connection).map_err(ForwardError::NotSent)?;
        Self::receive(connection, &id).map_err(ForwardError::Unanswered)
    }

    fn receive(connection: &mut Connection, id: &RequestId) -> io::Result<JsonRpcResponse> {
        loop {
            let mut line = String::new();
            if connection.reader.read_line(&mut line)? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "server closed the connection",
                ));
            }
            if line.trim().is_empty() {
                continue;
            }
            let response: JsonRpcResponse = serde_json::from_str(line.trim())?;
            if response.id.as_ref() == Some(id) {
                return Ok(response);
            }
            tracing::debug!(msg = "Skipping unrelated response", id = ?response.id);
        }
    }

    /// Sends the call, connecting first if necessary.
    ///
    /// Retries once on a fresh connection if the existing one turned out to be dead before the
    /// call went out. Once the call has been sent, it's never sent again.
    fn exchange(&self, params: &CallToolParams) -> io::Result<JsonRpcResponse> {
        let mut slot = self
            .connection
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "connection lock poisoned"))?;
        if slot.as_ref().map_or(false, Connection::is_closed_by_peer) {
            tracing::debug!(msg = "Server closed the connection, reconnecting");
            *slot = None;
        }
        if let Some(connection) = slot.as_mut() {
            match self.forward(connection, params) {
                Ok(response) => return Ok(response),
                Err(ForwardError::NotSent(error)) => {
                    tracing::debug!(msg = "Connection broke, reconnecting", %error);
                    *slot = None;
                }
                Err(ForwardError::Unanswered(error)) => {
                    *slot = None;
                    return Err(error);
                }
            }
        }
        let mut connection = self.connect()?;
        let response = self.forward(&mut connection, params)?;
        *slot = Some(connection);
        Ok(response)
    }
}

impl ToolExecutor for RemoteExecutor {
    fn list_tools(&self) -> Vec<Tool> {
        self.tools.clone()
    }

    fn call_tool(&self, params: CallToolParams) -> Result<CallToolResult, JsonRpcError> {
        let response = match self.exchange(&params) {
            Ok(r) => r,
            Err(error) => {
                tracing::warn!(msg = "Scythe server unreachable", address = %self.address, %error);
                return Ok(CallToolResult::error(connection_error(error).to_string()));
            }
        };
        if let Some(error) = response.error {
            return Err(error);
        }
        let result = response
            .result
            .ok_or_else(|| JsonRpcError::internal_error("Server sent neither result nor error"))?;
        serde_json::from_value(result).map_err(|e| {
            JsonRpcError::internal_error(format!("Server sent malformed tool result: {}", e))
        })
    }
}
