//! Non-generative task sources.
//!
//! `ScriptedTaskSource` replays a caller-supplied task list when the
//! harness drives an external workload rather than generating one.
//! `FixedTaskSource` repeats a single placeholder description; it backs
//! the executor-only agent selector.

use std::collections::VecDeque;

use super::error::{AgentError, AgentResult};
use super::{TaskDescription, TaskSource};

/// Pass-through source over an externally supplied task list.
pub struct ScriptedTaskSource {
    queue: VecDeque<TaskDescription>,
    produced: usize,
}

impl ScriptedTaskSource {
    /// Creates a source that yields the given tasks in order.
    pub fn new(tasks: impl IntoIterator<Item = TaskDescription>) -> Self {
        Self {
            queue: tasks.into_iter().collect(),
            produced: 0,
        }
    }

    /// Remaining tasks in the queue.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl TaskSource for ScriptedTaskSource {
    fn name(&self) -> &str {
        "scripted"
    }

    fn produce(&mut self) -> AgentResult<TaskDescription> {
        match self.queue.pop_front() {
            Some(task) => {
                self.produced += 1;
                Ok(task)
            }
            None => Err(AgentError::SourceExhausted {
                produced: self.produced,
            }),
        }
    }
}

/// Source that repeats one placeholder task indefinitely.
pub struct FixedTaskSource {
    template: TaskDescription,
    produced: usize,
}

impl FixedTaskSource {
    /// Creates a source repeating the given description (with per-episode ids).
    pub fn new(template: TaskDescription) -> Self {
        Self {
            template,
            produced: 0,
        }
    }

    /// The executor-only selector's default placeholder task.
    pub fn placeholder() -> Self {
        Self::new(
            TaskDescription::new("placeholder", "Placeholder Task", "placeholder")
                .with_description("This agent only executes tasks")
                .with_expected_outcome("N/A"),
        )
    }
}

impl TaskSource for FixedTaskSource {
    fn name(&self) -> &str {
        "fixed"
    }

    fn produce(&mut self) -> AgentResult<TaskDescription> {
        self.produced += 1;
        let mut task = self.template.clone();
        // Keep ids unique across repeats of the same description.
        task.id = format!("{}-{}", self.template.id, self.produced);
        Ok(task)
    }
}
