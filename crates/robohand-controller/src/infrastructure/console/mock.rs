//! Scripted console for unit and integration tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::{Console, ConsoleError};

#[derive(Debug, Default)]
struct State {
    answers: VecDeque<String>,
    output: Vec<String>,
    prompts: Vec<String>,
    polls: usize,
    quit_after_polls: Option<usize>,
}

/// A [`Console`] that answers prompts from a queue and records everything
/// printed.
///
/// Once the queue is empty every prompt returns [`ConsoleError::Closed`],
/// as if stdin had reached end-of-file.  Clones share state.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConsole {
    state: Arc<Mutex<State>>,
}

impl ScriptedConsole {
    /// A console that will answer `answers` in order.
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let console = Self::default();
        console.lock().answers = answers.into_iter().map(Into::into).collect();
        console
    }

    /// Makes [`Console::quit_requested`] return `true` from the `n`-th poll
    /// onwards (1-based).  Without it, polls always return `false` and never
    /// touch the answer queue.
    pub fn quit_after_polls(self, n: usize) -> Self {
        self.lock().quit_after_polls = Some(n);
        self
    }

    /// Lines passed to [`Console::say`].
    pub fn output(&self) -> Vec<String> {
        self.lock().output.clone()
    }

    /// Questions passed to [`Console::prompt`].
    pub fn prompts(&self) -> Vec<String> {
        self.lock().prompts.clone()
    }

    /// `true` if any printed line contains `needle`.
    pub fn printed(&self, needle: &str) -> bool {
        self.lock().output.iter().any(|line| line.contains(needle))
    }

    /// Number of quit polls so far.
    pub fn polls(&self) -> usize {
        self.lock().polls
    }

    /// Answers not yet consumed.
    pub fn remaining_answers(&self) -> usize {
        self.lock().answers.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("lock poisoned")
    }
}

impl Console for ScriptedConsole {
    fn say(&mut self, line: &str) {
        self.lock().output.push(line.to_string());
    }

    fn prompt(&mut self, question: &str) -> Result<String, ConsoleError> {
        let mut state = self.lock();
        state.prompts.push(question.to_string());
        state.answers.pop_front().ok_or(ConsoleError::Closed)
    }

    fn quit_requested(&mut self) -> bool {
        let mut state = self.lock();
        state.polls += 1;
        let polls = state.polls;
        state.quit_after_polls.is_some_and(|n| polls >= n)
    }
}
