//! Mission progress through cliclack spinners

use crate::mission::Reporter;
use std::cell::RefCell;

/// One spinner per step; `stop` always joins the running spinner
#[derive(Default)]
pub struct SpinnerReporter {
    active: RefCell<Option<cliclack::ProgressBar>>,
}

impl SpinnerReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for SpinnerReporter {
    fn start(&self, message: &str) {
        if let Some(previous) = self.active.borrow_mut().take() {
            previous.stop("");
        }
        let spinner = cliclack::spinner();
        spinner.start(message);
        *self.active.borrow_mut() = Some(spinner);
    }

    fn stop(&self, message: &str) {
        match self.active.borrow_mut().take() {
            Some(spinner) => spinner.stop(message),
            None => {
                let _ = cliclack::log::success(message);
            }
        }
    }

    fn info(&self, message: &str) {
        let _ = cliclack::log::info(message);
    }

    fn warn(&self, message: &str) {
        let _ = cliclack::log::warning(message);
    }
}

impl Drop for SpinnerReporter {
    fn drop(&mut self) {
        if let Some(spinner) = self.active.get_mut().take() {
            spinner.stop("");
        }
        let _ = console::Term::stderr().show_cursor();
    }
}
