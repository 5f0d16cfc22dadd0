// Test doubles shared by the unit tests

use crate::resource::ControlledResource;

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Records every call made to it, in order.
#[derive(Default)]
pub(crate) struct RecordingResource {
    calls: Mutex<Vec<String>>,
    started: AtomicBool,
    stopped: AtomicBool,
    started_checks: AtomicUsize,
    stopped_checks: AtomicUsize,
    /// Report started only from this check onwards (1-based). Zero means never.
    started_from_check: AtomicUsize,
}

impl RecordingResource {
    pub(crate) fn started() -> Self {
        let resource = Self::default();
        resource.started.store(true, Ordering::SeqCst);
        resource.stopped.store(true, Ordering::SeqCst);
        resource
    }

    pub(crate) fn never_ready() -> Self {
        Self::default()
    }

    pub(crate) fn started_on_check(check: usize) -> Self {
        let resource = Self::default();
        resource.started_from_check.store(check, Ordering::SeqCst);
        resource
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn started_checks(&self) -> usize {
        self.started_checks.load(Ordering::SeqCst)
    }

    pub(crate) fn stopped_checks(&self) -> usize {
        self.stopped_checks.load(Ordering::SeqCst)
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ControlledResource for RecordingResource {
    fn configure(&self, name: &str, value: &str) {
        self.record(format!("configure({name},{value})"));
    }

    fn start(&self) {
        self.record(String::from("start"));
    }

    fn stop(&self) {
        self.record(String::from("stop"));
    }

    fn pause(&self) {
        self.record(String::from("pause"));
    }

    fn resume(&self) {
        self.record(String::from("resume"));
    }

    fn is_started(&self) -> bool {
        let check = self.started_checks.fetch_add(1, Ordering::SeqCst) + 1;
        let from = self.started_from_check.load(Ordering::SeqCst);
        self.started.load(Ordering::SeqCst) || (from != 0 && check >= from)
    }

    fn is_stopped(&self) -> bool {
        self.stopped_checks.fetch_add(1, Ordering::SeqCst);
        self.stopped.load(Ordering::SeqCst)
    }
}
