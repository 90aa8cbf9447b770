//! Spinner for the cache copies around the build

use super::context::UiContext;
use console::style;

enum Task {
    Idle,
    Spinning(cliclack::ProgressBar),
    /// Plain mode prints the start line and remembers that a task is open
    Printed,
}

/// One task at a time; `start` then `stop` or `stop_error`
pub struct TaskSpinner {
    task: Task,
    fancy: bool,
}

impl TaskSpinner {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            task: Task::Idle,
            fancy: ctx.use_fancy_output(),
        }
    }

    pub fn start(&mut self, message: &str) {
        self.task = if self.fancy {
            let spinner = cliclack::spinner();
            spinner.start(message);
            Task::Spinning(spinner)
        } else {
            println!("  {} {}", style("...").dim(), message);
            Task::Printed
        };
    }

    pub fn stop(&mut self, message: &str) {
        match std::mem::replace(&mut self.task, Task::Idle) {
            Task::Spinning(spinner) => spinner.stop(message),
            Task::Printed | Task::Idle => {
                println!("  {} {}", style("[OK]").green(), message)
            }
        }
    }

    pub fn stop_error(&mut self, message: &str) {
        match std::mem::replace(&mut self.task, Task::Idle) {
            Task::Spinning(spinner) => spinner.error(message),
            Task::Printed | Task::Idle => {
                println!("  {} {}", style("[FAIL]").red(), message)
            }
        }
    }

    /// Whether a task was started and not yet stopped
    pub fn is_running(&self) -> bool {
        !matches!(self.task, Task::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_task_is_tracked_until_stopped() {
        let ctx = UiContext::non_interactive();
        let mut spinner = TaskSpinner::new(&ctx);
        assert!(!spinner.is_running());

        spinner.start("Storing rootfs of stage1");
        assert!(spinner.is_running());

        spinner.stop_error("Caching failed");
        assert!(!spinner.is_running());
    }
}
