// src/session/navigation.rs

use crate::ui::KeyPress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Moved(usize),
    /// Already at a boundary; nothing changed.
    Stayed,
    /// `next` on the last question of an unfinished exam.
    SubmitRequested,
}

/// Zero-based cursor over the questions. Never wraps, never leaves `[0, total-1]`.
#[derive(Debug, Clone)]
pub struct Navigator {
    index: usize,
    total: usize,
}

impl Navigator {
    pub fn new(total: usize) -> Self {
        Self { index: 0, total }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.total
    }

    fn last(&self) -> usize {
        self.total.saturating_sub(1)
    }

    pub fn is_last(&self) -> bool {
        self.index >= self.last()
    }

    pub fn next(&mut self, finished: bool) -> NavOutcome {
        if self.index < self.last() {
            self.index += 1;
            NavOutcome::Moved(self.index)
        } else if !finished {
            NavOutcome::SubmitRequested
        } else {
            NavOutcome::Stayed
        }
    }

    pub fn previous(&mut self) -> NavOutcome {
        if self.index > 0 {
            self.index -= 1;
            NavOutcome::Moved(self.index)
        } else {
            NavOutcome::Stayed
        }
    }

    /// Jumps to `index`, clamped to the last question.
    pub fn go_to(&mut self, index: usize) -> NavOutcome {
        let target = index.min(self.last());
        if target == self.index {
            return NavOutcome::Stayed;
        }
        self.index = target;
        NavOutcome::Moved(target)
    }

    /// Arrow keys mirror the next / previous buttons. Other keys are ignored.
    pub fn handle_key(&mut self, key: &KeyPress, finished: bool) -> Option<NavOutcome> {
        match key.key.as_str() {
            "ArrowRight" => Some(self.next(finished)),
            "ArrowLeft" => Some(self.previous()),
            _ => None,
        }
    }
}
