//! Gets tool calls from the server threads onto REAPER's main thread and their results back.
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use reaper_high::ControlSurfaceMiddleware;
use scythe_daw::Daw;
use scythe_protocol::{CallToolParams, CallToolResult, JsonRpcError, Tool};
use scythe_reaper::ReaperDaw;
use scythe_server::{to_call_result, ToolExecutor};
use scythe_tools::ToolRegistry;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Upper bound of jobs executed per main loop cycle, keeps the UI responsive.
const JOB_BULK_SIZE: usize = 8;

type Reply = Result<CallToolResult, JsonRpcError>;

const PENDING: u8 = 0;
const CLAIMED: u8 = 1;
const ABANDONED: u8 = 2;

/// A tool call waiting for the main thread.
///
/// Either the runner claims it and the caller waits for its result, or the caller abandons it
/// and it never runs.
pub struct Job {
    params: CallToolParams,
    state: Arc<AtomicU8>,
    reply: Sender<Reply>,
}

impl Job {
    /// Returns `false` if the caller has given up already.
    fn claim(&self) -> bool {
        transition(&self.state, CLAIMED)
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("tool", &self.params.name)
            .field("state", &self.state.load(Ordering::SeqCst))
            .finish()
    }
}

fn transition(state: &AtomicU8, to: u8) -> bool {
    state
        .compare_exchange(PENDING, to, Ordering::SeqCst, Ordering::SeqCst)
        .is_ok()
}

/// Creates the queue connecting executor and job runner.
pub fn job_channel() -> (Sender<Job>, Receiver<Job>) {
    crossbeam_channel::unbounded()
}

/// Thread-safe [`ToolExecutor`] which delegates the actual work to the main thread.
#[derive(Debug)]
pub struct MainThreadExecutor {
    tools: Vec<Tool>,
    jobs: Sender<Job>,
    timeout: Duration,
}

impl MainThreadExecutor {
    pub fn new(tools: Vec<Tool>, jobs: Sender<Job>, timeout: Duration) -> Self {
        Self {
            tools,
            jobs,
            timeout,
        }
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }
}

impl ToolExecutor for MainThreadExecutor {
    fn list_tools(&self) -> Vec<Tool> {
        self.tools.clone()
    }

    fn call_tool(&self, params: CallToolParams) -> Reply {
        let tool = params.name.clone();
        let (reply_sender, reply_receiver) = crossbeam_channel::bounded(1);
        let state = Arc::new(AtomicU8::new(PENDING));
        let job = Job {
            params,
            state: state.clone(),
            reply: reply_sender,
        };
        if self.jobs.send(job).is_err() {
            return Ok(CallToolResult::error(
                "Scythe is shutting down and doesn't accept calls anymore.",
            ));
        }
        let dropped = || {
            Ok(CallToolResult::error(format!(
                "REAPER dropped the call to '{}'.",
                tool
            )))
        };
        match reply_receiver.recv_timeout(self.timeout) {
            Ok(reply) => reply,
            Err(RecvTimeoutError::Timeout) if !transition(&state, ABANDONED) => {
                // Already running on the main thread, so it's going to answer.
                reply_receiver.recv().unwrap_or_else(|_| dropped())
            }
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(msg = "Tool call timed out", %tool, timeout = ?self.timeout);
                Ok(CallToolResult::error(format!(
                    "REAPER didn't execute '{}' within {} ms. It might be blocked by a modal \
                     dialog or a long-running operation.",
                    tool,
                    self.timeout.as_millis()
                )))
            }
            Err(RecvTimeoutError::Disconnected) => dropped(),
        }
    }
}

/// Executes queued jobs. Lives on the main thread.
#[derive(Debug)]
pub struct JobRunner<D> {
    jobs: Receiver<Job>,
    registry: ToolRegistry,
    daw: D,
}

impl<D: Daw> JobRunner<D> {
    pub fn new(jobs: Receiver<Job>, daw: D) -> Self {
        Self {
            jobs,
            registry: ToolRegistry::new(),
            daw,
        }
    }

    /// Executes pending jobs in arrival order. Returns how many were executed.
    pub fn run_pending(&mut self) -> usize {
        let mut executed = 0;
        for job in self.jobs.try_iter().take(JOB_BULK_SIZE) {
            if !job.claim() {
                tracing::debug!(msg = "Skipping job whose caller gave up", tool = %job.params.name);
                continue;
            }
            let result = self
                .registry
                .call(&mut self.daw, &job.params.name, job.params.arguments);
            let _ = job.reply.send(to_call_result(result));
            executed += 1;
        }
        executed
    }

    pub fn daw(&self) -> &D {
        &self.daw
    }
}

/// Hooks the job runner into REAPER's control surface run loop.
#[derive(Debug)]
pub struct ScytheControlSurfaceMiddleware {
    runner: JobRunner<ReaperDaw>,
}

impl ScytheControlSurfaceMiddleware {
    pub fn new(jobs: Receiver<Job>) -> Self {
        Self {
            runner: JobRunner::new(jobs, ReaperDaw::new()),
        }
    }
}

impl ControlSurfaceMiddleware for ScytheControlSurfaceMiddleware {
    fn run(&mut self) {
        self.runner.run_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scythe_daw::fake::FakeDaw;
    use serde_json::json;
    use std::thread;

    fn params(name: &str, arguments: serde_json::Value) -> CallToolParams {
        CallToolParams {
            name: name.to_string(),
            arguments,
        }
    }

    fn executor(jobs: Sender<Job>, timeout: Duration) -> MainThreadExecutor {
        MainThreadExecutor::new(ToolRegistry::new().descriptors(), jobs, timeout)
    }

    #[test]
    fn calls_are_executed_by_the_runner() {
        let (sender, receiver) = job_channel();
        let executor = executor(sender, Duration::from_secs(10));
        let caller = thread::spawn(move || {
            executor.call_tool(params("add_track", json!({"name": "Lead"})))
        });
        let mut runner = JobRunner::new(receiver, FakeDaw::new());
        // Plays the role of REAPER's main loop.
        while !caller.is_finished() {
            runner.run_pending();
            thread::sleep(Duration::from_millis(5));
        }
        let result = caller.join().unwrap().unwrap();
        assert!(!result.is_error, "{}", result.text());
        assert_eq!(runner.daw().tracks[0].name, "Lead");
    }

    #[test]
    fn unanswered_calls_time_out_and_are_skipped() {
        let (sender, receiver) = job_channel();
        let executor = executor(sender, Duration::from_millis(20));
        let result = executor
            .call_tool(params("add_track", json!({})))
            .unwrap();
        assert!(result.is_error);
        assert!(result.text().starts_with("REAPER didn't execute 'add_track' within 20 ms."));
        let mut runner = JobRunner::new(receiver, FakeDaw::new());
        assert_eq!(runner.run_pending(), 0);
        assert!(runner.daw().tracks.is_empty());
    }

    #[test]
    fn claimed_calls_are_answered_even_if_slow() {
        let (sender, receiver) = job_channel();
        let executor = executor(sender, Duration::from_millis(20));
        let caller = thread::spawn(move || {
            executor.call_tool(params("list_tracks", json!({})))
        });
        let job = receiver.recv().unwrap();
        assert!(job.claim());
        // Takes longer than the caller is willing to wait.
        thread::sleep(Duration::from_millis(100));
        job.reply
            .send(Ok(CallToolResult::success(json!({"n_tracks": 0}))))
            .unwrap();
        let result = caller.join().unwrap().unwrap();
        assert!(!result.is_error, "{}", result.text());
    }

    #[test]
    fn runner_gone() {
        let (sender, receiver) = job_channel();
        drop(receiver);
        let result = executor(sender, Duration::from_secs(1))
            .call_tool(params("list_tracks", json!({})))
            .unwrap();
        assert!(result.is_error);
    }
}
