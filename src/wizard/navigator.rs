use serde::Serialize;

use super::step::{is_contiguous, Step};
use crate::error::WizardError;

/// Step index plus the submission gate. Knows nothing about form contents:
/// callers pass in the validator's verdict for the current step.
#[derive(Debug, Clone)]
pub struct Navigator {
    steps: &'static [Step],
    current: u8,
    submitting: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavigatorView {
    pub steps: &'static [Step],
    pub current_step: u8,
    pub title: &'static str,
    pub submitting: bool,
}

impl Navigator {
    pub fn new(steps: &'static [Step]) -> Self {
        assert!(is_contiguous(steps), "wizard step ids must run 1..=N");
        Self {
            steps,
            current: 1,
            submitting: false,
        }
    }

    pub fn steps(&self) -> &'static [Step] {
        self.steps
    }

    pub fn current(&self) -> u8 {
        self.current
    }

    pub fn current_step(&self) -> &'static Step {
        &self.steps[self.current as usize - 1]
    }

    pub fn last(&self) -> u8 {
        self.steps.len() as u8
    }

    pub fn is_first(&self) -> bool {
        self.current == 1
    }

    pub fn is_last(&self) -> bool {
        self.current == self.last()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Move forward one step. No-op (returns false) on the last step, while
    /// a submission is in flight, or when the current step is not valid.
    pub fn advance(&mut self, step_valid: bool) -> bool {
        if self.submitting || self.is_last() || !step_valid {
            return false;
        }
        self.current += 1;
        true
    }

    /// Move back one step. Never validates and stays available while a
    /// submission is in flight; only refused on the first step.
    pub fn retreat(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Close the submission gate. Fails unless on the last step with a valid
    /// form and no other submission running.
    pub fn begin_submit(&mut self, step_valid: bool) -> Result<(), WizardError> {
        if !self.is_last() {
            return Err(WizardError::NotOnFinalStep(self.current));
        }
        if self.submitting {
            return Err(WizardError::SubmissionInFlight);
        }
        if !step_valid {
            return Err(WizardError::StepBlocked(self.current));
        }
        self.submitting = true;
        Ok(())
    }

    /// Reopen the gate. Called on both the success and the failure path.
    pub fn finish_submit(&mut self) {
        self.submitting = false;
    }

    pub fn view(&self) -> NavigatorView {
        NavigatorView {
            steps: self.steps,
            current_step: self.current,
            title: self.current_step().title,
            submitting: self.submitting,
        }
    }
}
