use crate::config::ScytheConfig;
use crate::main_thread::MainThreadExecutor;
use scythe_server::{ServerResult, TcpServer};
use std::sync::Arc;

/// Starts and stops the TCP server on behalf of the user.
#[derive(Debug)]
pub struct ServerControl {
    config: ScytheConfig,
    executor: Arc<MainThreadExecutor>,
    server: Option<TcpServer>,
}

impl ServerControl {
    pub fn new(config: ScytheConfig, executor: Arc<MainThreadExecutor>) -> Self {
        Self {
            config,
            executor,
            server: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.server.is_some()
    }

    /// Does nothing if already running.
    pub fn start(&mut self) -> ServerResult<()> {
        if self.server.is_some() {
            return Ok(());
        }
        let server = TcpServer::start(&self.config.host, self.config.port, self.executor.clone())?;
        self.server = Some(server);
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(mut server) = self.server.take() {
            server.shutdown();
        }
    }

    /// One-line human-readable status.
    pub fn status(&self) -> String {
        match &self.server {
            Some(server) => format!(
                "Scythe MCP server is listening on {} ({} tools).",
                server.local_addr(),
                self.executor.tool_count()
            ),
            None => format!(
                "Scythe MCP server is stopped (configured address {}:{}).",
                self.config.host, self.config.port
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::main_thread::job_channel;
    use scythe_tools::ToolRegistry;
    use std::time::Duration;

    #[test]
    fn start_stop() {
        let (sender, _receiver) = job_channel();
        let executor = Arc::new(MainThreadExecutor::new(
            ToolRegistry::new().descriptors(),
            sender,
            Duration::from_secs(1),
        ));
        let config = ScytheConfig {
            port: 0,
            ..ScytheConfig::default()
        };
        let mut control = ServerControl::new(config, executor);
        assert!(control.status().starts_with("Scythe MCP server is stopped"));
        control.start().unwrap();
        control.start().unwrap();
        assert!(control.is_running());
        assert!(control.status().contains("(89 tools)"));
        control.stop();
        assert!(!control.is_running());
    }
}
