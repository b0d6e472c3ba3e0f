use crate::{ServerResult, Session, ToolExecutor};
use std::io::{BufRead, Write};

/// Answers line-delimited JSON-RPC messages until the reader is exhausted.
///
/// Each line carries exactly one message. Blank lines are skipped.
pub fn serve_connection<E, R, W>(
    session: &mut Session<E>,
    mut reader: R,
    mut writer: W,
) -> ServerResult<()>
where
    E: ToolExecutor,
    R: BufRead,
    W: Write,
{
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(());
        }
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if let Some(response) = session.handle_message(message) {
            let mut text = serde_json::to_string(&response)?;
            text.push('\n');
            writer.write_all(text.as_bytes())?;
            writer.flush()?;
        }
    }
}
