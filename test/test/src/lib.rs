//! Integration test which drives Scythe's tools against a real REAPER instance.
//!
//! Steps are executed one per main loop cycle by a temporary control surface. They operate on a
//! scratch project tab which is saved to a temporary directory and closed when the test is done,
//! so the user's projects stay untouched.
#[macro_use]
mod assert;
mod api;
mod tests;

use crate::api::{TestStep, TestStepContext};
use crate::tests::create_test_steps;
use reaper_high::{ControlSurfaceMiddleware, MiddlewareControlSurface, Reaper};
use reaper_medium::RegistrationHandle;
use scythe_daw::Daw;
use scythe_reaper::ReaperDaw;
use scythe_tools::ToolRegistry;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// "File: Close current project tab"
const CLOSE_PROJECT_TAB: i32 = 40860;

type OnFinish = Box<dyn FnOnce(Result<(), String>)>;

thread_local! {
    static ACTIVE_RUN: RefCell<Option<RegistrationHandle<MiddlewareControlSurface<StepRunner>>>> =
        RefCell::new(None);
}

/// Starts the complete integration test.
///
/// Waits `start_delay` before executing the first step. Calls `on_finish` as soon as the first
/// step failed or all steps have succeeded. Must be called from the main thread.
pub fn execute_integration_test(
    start_delay: Duration,
    on_finish: impl FnOnce(Result<(), String>) + 'static,
) {
    ACTIVE_RUN.with(|active| {
        if let Some(handle) = active.borrow_mut().take() {
            // SAFETY: Never called from within the previous runner's own run().
            unsafe {
                let _ = Reaper::get()
                    .medium_session()
                    .plugin_register_remove_csurf_inst(handle);
            }
        }
        let runner = StepRunner::new(start_delay, Box::new(on_finish));
        let surface = MiddlewareControlSurface::new(runner);
        match Reaper::get()
            .medium_session()
            .plugin_register_add_csurf_inst(Box::new(surface))
        {
            Ok(handle) => *active.borrow_mut() = Some(handle),
            Err(e) => log(format!("Couldn't register test control surface: {}\n", e)),
        }
    });
}

struct StepRunner {
    steps: VecDeque<TestStep>,
    step_count: usize,
    not_before: Instant,
    daw: ReaperDaw,
    registry: ToolRegistry,
    scratch_dir: Option<TempDir>,
    on_finish: Option<OnFinish>,
}

impl fmt::Debug for StepRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepRunner")
            .field("remaining_steps", &self.steps.len())
            .field("step_count", &self.step_count)
            .field("finished", &self.on_finish.is_none())
            .finish()
    }
}

impl StepRunner {
    fn new(start_delay: Duration, on_finish: OnFinish) -> Self {
        let steps: VecDeque<_> = create_test_steps().collect();
        Self {
            step_count: steps.len(),
            steps,
            not_before: Instant::now() + start_delay,
            daw: ReaperDaw::new(),
            registry: ToolRegistry::new(),
            scratch_dir: None,
            on_finish: Some(on_finish),
        }
    }

    fn execute_next_step(&mut self) {
        if self.scratch_dir.is_none() {
            if let Err(msg) = self.open_scratch_project() {
                self.finish(Err(msg));
                return;
            }
        }
        let step = match self.steps.pop_front() {
            Some(s) => s,
            None => {
                log("\n**Integration test was successful**\n\n");
                self.finish(Ok(()));
                return;
            }
        };
        log(format!(
            "{}. {}\n",
            self.step_count - self.steps.len(),
            &step.name
        ));
        let mut context = TestStepContext {
            daw: &mut self.daw,
            registry: &self.registry,
        };
        let result = std::panic::catch_unwind(AssertUnwindSafe(|| (step.operation)(&mut context)))
            .unwrap_or_else(|_| Err(format!("Step [{}] panicked", step.name).into()));
        if let Err(msg) = result {
            log(format!("→ **FAILED**\n\n{}\n", msg));
            self.finish(Err(msg.into_owned()));
        }
    }

    fn open_scratch_project(&mut self) -> Result<(), String> {
        Reaper::get().clear_console();
        log("# Testing Scythe\n\n");
        let dir = tempfile::Builder::new()
            .prefix("scythe-test-")
            .tempdir()
            .map_err(|e| format!("Couldn't create scratch directory: {}", e))?;
        Reaper::get().create_empty_project_in_new_tab();
        self.scratch_dir = Some(dir);
        Ok(())
    }

    /// Saves the scratch project so closing its tab doesn't ask for confirmation.
    fn close_scratch_project(&mut self) -> Result<(), String> {
        let dir = match &self.scratch_dir {
            Some(d) => d,
            None => return Ok(()),
        };
        let path = dir.path().join("scratch.rpp");
        let path = path.to_str().ok_or("Scratch path isn't valid UTF-8")?;
        self.daw
            .save_project(Some(path))
            .and_then(|_| self.daw.run_command(CLOSE_PROJECT_TAB))
            .map_err(|e| format!("Couldn't close scratch project: {}", e))
    }

    fn finish(&mut self, result: Result<(), String>) {
        let on_finish = match self.on_finish.take() {
            Some(f) => f,
            None => return,
        };
        self.steps.clear();
        let closed = self.close_scratch_project();
        if let Err(msg) = &closed {
            tracing::warn!(msg = "Scratch project left open", reason = %msg);
        }
        on_finish(result.and(closed));
    }
}

impl ControlSurfaceMiddleware for StepRunner {
    fn run(&mut self) {
        if self.on_finish.is_none() || Instant::now() < self.not_before {
            return;
        }
        self.execute_next_step();
    }
}

fn log(msg: impl Into<String>) {
    let msg = msg.into();
    tracing::info!(msg = %msg.trim_end());
    Reaper::get().show_console_msg(msg)
}
