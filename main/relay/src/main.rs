//! MCP server for clients that spawn their servers as child processes.
//!
//! Speaks MCP on stdin/stdout and forwards tool calls to the Scythe extension running inside
//! REAPER. stdout is reserved for protocol messages, so all logging goes to stderr.
use clap::{Parser, Subcommand};
use scythe_server::{serve_connection, RemoteExecutor, Session};
use scythe_tools::ToolRegistry;
use serde_json::json;
use std::error::Error;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "scythe-relay", version, about = "Controls REAPER via the Model Context Protocol")]
struct Cli {
    /// Host the Scythe extension listens on.
    #[arg(long, env = "SCYTHE_HOST", default_value = "127.0.0.1", global = true)]
    host: String,
    /// Port the Scythe extension listens on.
    #[arg(long, env = "SCYTHE_PORT", default_value_t = 9500, global = true)]
    port: u16,
    /// Log filter directives, e.g. "debug" or "scythe_server=trace".
    #[arg(long, env = "SCYTHE_LOG", default_value = "warn", global = true)]
    log_level: String,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve MCP on stdin/stdout (default).
    Serve,
    /// Print the snippet to add to an MCP client's configuration file.
    ClientConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    let result = match cli.command.as_ref().unwrap_or(&Command::Serve) {
        Command::Serve => serve(&cli),
        Command::ClientConfig => print_client_config(&cli),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(msg = "Relay failed", %error);
            eprintln!("scythe-relay: {}", error);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(directives: &str) {
    let filter = EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn serve(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let executor = RemoteExecutor::new(&cli.host, cli.port, ToolRegistry::new().descriptors());
    tracing::info!(msg = "Relaying MCP from stdio", address = executor.address());
    let mut session = Session::new(Arc::new(executor));
    serve_connection(&mut session, io::stdin().lock(), io::stdout().lock())?;
    tracing::info!(msg = "stdin closed, exiting");
    Ok(())
}

fn print_client_config(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let exe = std::env::current_exe()?;
    let config = client_config(&exe.to_string_lossy(), &cli.host, cli.port);
    println!("{}", serde_json::to_string_pretty(&config)?);
    eprintln!(
        "Merge this into your MCP client's configuration (e.g. claude_desktop_config.json) and \
         restart the client."
    );
    Ok(())
}

fn client_config(command: &str, host: &str, port: u16) -> serde_json::Value {
    json!({
        "mcpServers": {
            "scythe": {
                "command": command,
                "args": ["serve"],
                "env": {
                    "SCYTHE_HOST": host,
                    "SCYTHE_PORT": port.to_string(),
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_default() {
        let cli = Cli::try_parse_from(["scythe-relay"]).unwrap();
        assert!(cli.command.is_none());
        let cli = Cli::try_parse_from(["scythe-relay", "client-config", "--port", "9600"]).unwrap();
        assert!(matches!(cli.command, Some(Command::ClientConfig)));
        assert_eq!(cli.port, 9600);
    }

    #[test]
    fn client_config_snippet() {
        let config = client_config("/usr/local/bin/scythe-relay", "127.0.0.1", 9500);
        let server = &config["mcpServers"]["scythe"];
        assert_eq!(server["command"], json!("/usr/local/bin/scythe-relay"));
        assert_eq!(server["args"], json!(["serve"]));
        assert_eq!(server["env"]["SCYTHE_PORT"], json!("9500"));
    }

    #[test]
    fn cli_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
