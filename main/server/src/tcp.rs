use crate::{serve_connection, ServerError, ServerResult, Session, ToolExecutor};
use std::collections::HashMap;
use std::io::{self, BufReader};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Open client streams, kept so that shutdown can close them.
type Connections = Arc<Mutex<HashMap<SocketAddr, TcpStream>>>;

/// Serves MCP over TCP, one thread per client connection.
#[derive(Debug)]
pub struct TcpServer {
    local_addr: SocketAddr,
    stopping: Arc<AtomicBool>,
    connections: Connections,
    accept_thread: Option<JoinHandle<()>>,
}

impl TcpServer {
    /// Binds to the given address and starts accepting connections in the background.
    pub fn start<E>(host: &str, port: u16, executor: Arc<E>) -> ServerResult<TcpServer>
    where
        E: ToolExecutor + 'static,
    {
        let address = format!("{}:{}", host, port);
        let bind_error = |source| ServerError::Bind {
            address: address.clone(),
            source,
        };
        let listener = TcpListener::bind(&address).map_err(bind_error)?;
        // Non-blocking so the accept loop notices shutdown requests.
        listener.set_nonblocking(true).map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;
        let stopping = Arc::new(AtomicBool::new(false));
        let connections = Connections::default();
        let accept_thread = thread::Builder::new()
            .name("scythe-accept".to_string())
            .spawn({
                let stopping = stopping.clone();
                let connections = connections.clone();
                move || accept_loop(listener, executor, stopping, connections)
            })?;
        tracing::info!(msg = "MCP server listening", %local_addr);
        Ok(TcpServer {
            local_addr,
            stopping,
            connections,
            accept_thread: Some(accept_thread),
        })
    }

    /// The actual address, interesting if port 0 was requested.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_running(&self) -> bool {
        self.accept_thread.is_some()
    }

    /// Number of clients currently connected.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Stops accepting connections and closes the open ones.
    pub fn shutdown(&mut self) {
        let accept_thread = match self.accept_thread.take() {
            None => return,
            Some(t) => t,
        };
        self.stopping.store(true, Ordering::SeqCst);
        if accept_thread.join().is_err() {
            tracing::warn!(msg = "Accept thread panicked");
        }
        if let Ok(mut connections) = self.connections.lock() {
            for (_, stream) in connections.drain() {
                let _ = stream.shutdown(Shutdown::Both);
            }
        }
        tracing::info!(msg = "MCP server stopped", local_addr = %self.local_addr);
    }
}

impl Drop for TcpServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn accept_loop<E: ToolExecutor + 'static>(
    listener: TcpListener,
    executor: Arc<E>,
    stopping: Arc<AtomicBool>,
    connections: Connections,
) {
    while !stopping.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, peer)) => {
                if let Err(error) = spawn_connection(stream, peer, executor.clone(), connections.clone())
                {
                    tracing::warn!(msg = "Couldn't set up connection", %peer, %error);
                }
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
            Err(error) => {
                tracing::warn!(msg = "Accept failed", %error);
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
        }
    }
}

fn spawn_connection<E: ToolExecutor + 'static>(
    stream: TcpStream,
    peer: SocketAddr,
    executor: Arc<E>,
    connections: Connections,
) -> io::Result<()> {
    stream.set_nonblocking(false)?;
    stream.set_nodelay(true)?;
    if let Ok(mut connections) = connections.lock() {
        connections.insert(peer, stream.try_clone()?);
    }
    let reader = BufReader::new(stream.try_clone()?);
    thread::Builder::new()
        .name(format!("scythe-client-{}", peer))
        .spawn(move || {
            tracing::info!(msg = "Client connected", %peer);
            let mut session = Session::new(executor);
            match serve_connection(&mut session, reader, stream) {
                Ok(()) => tracing::info!(msg = "Client disconnected", %peer),
                Err(error) => tracing::info!(msg = "Client connection closed", %peer, %error),
            }
            if let Ok(mut connections) = connections.lock() {
                connections.remove(&peer);
            }
        })?;
    Ok(())
}
