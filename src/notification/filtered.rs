//! A notifier that only forwards test events for selected descriptions.
//!
//! Suite start and finish always pass through.

use super::{Failure, RunNotifier};
use crate::tree::Description;

pub struct FilteredNotifier<N, F> {
    delegate: N,
    filter: F,
}

impl<N, F> FilteredNotifier<N, F>
where
    N: RunNotifier,
    F: Fn(&Description) -> bool,
{
    pub fn new(delegate: N, filter: F) -> Self {
        Self { delegate, filter }
    }

    pub fn into_inner(self) -> N {
        self.delegate
    }
}

impl<N, F> RunNotifier for FilteredNotifier<N, F>
where
    N: RunNotifier,
    F: Fn(&Description) -> bool,
{
    fn fire_test_suite_started(&mut self, description: &Description) {
        self.delegate.fire_test_suite_started(description);
    }

    fn fire_test_started(&mut self, description: &Description) {
        if (self.filter)(description) {
            self.delegate.fire_test_started(description);
        }
    }

    fn fire_test_ignored(&mut self, description: &Description) {
        if (self.filter)(description) {
            self.delegate.fire_test_ignored(description);
        }
    }

    fn fire_test_failure(&mut self, failure: &Failure<'_>) {
        if (self.filter)(failure.description) {
            self.delegate.fire_test_failure(failure);
        }
    }

    fn fire_test_assumption_failed(&mut self, failure: &Failure<'_>) {
        if (self.filter)(failure.description) {
            self.delegate.fire_test_assumption_failed(failure);
        }
    }

    fn fire_test_finished(&mut self, description: &Description) {
        if (self.filter)(description) {
            self.delegate.fire_test_finished(description);
        }
    }

    fn fire_test_suite_finished(&mut self, description: &Description) {
        self.delegate.fire_test_suite_finished(description);
    }
}
