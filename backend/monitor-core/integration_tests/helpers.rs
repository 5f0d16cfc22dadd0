//! Test helpers for monitor integration tests.
//!
//! This module provides:
//! - A server double whose readiness follows its `start`/`stop` calls
//! - Logger and observer doubles that record what they receive
//! - Free-port selection and bounded waits for log entries

use monitor_core::logger::MonitorLogger;
use monitor_core::monitor::{LifecycleState, Monitor, MonitorHandle};
use monitor_core::registry::ResourceFactory;
use monitor_core::resource::{ControlledResource, MonitorObserver};

use std::error::Error as StdError;
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sysinfo::System;
use tokio::net::{TcpStream, lookup_host};
use tokio::time::{Instant, sleep as TokioSleep};

/// Key used by every test monitor unless a test needs a specific one.
pub const TEST_KEY: &str = "test";

/// Upper bound for any single wait in these tests.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const OBSERVED_STARTED: &str = "observer: started";
pub const OBSERVED_STOPPED: &str = "observer: stopped";

/// Test helper: Find a port nothing is listening on.
pub fn free_port() -> u16 {
    let listener = StdTcpListener::bind("0.0.0.0:0").expect("Failed to bind ephemeral port");
    listener
        .local_addr()
        .expect("Failed to read ephemeral port")
        .port()
}

/// Server double. `start` and `stop` flip readiness immediately unless the
/// server was built with [`TestServer::unresponsive`].
#[derive(Default)]
pub struct TestServer {
    calls: Mutex<Vec<String>>,
    started: AtomicBool,
    stopped: AtomicBool,
    unresponsive: bool,
}

impl TestServer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A server that never reports started or stopped.
    pub fn unresponsive() -> Arc<Self> {
        Arc::new(Self {
            unresponsive: true,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ControlledResource for TestServer {
    fn configure(&self, name: &str, value: &str) {
        self.record(format!("configure({name},{value})"));
    }

    fn start(&self) {
        self.record(String::from("start"));
        self.started.store(!self.unresponsive, Ordering::SeqCst);
    }

    fn stop(&self) {
        self.record(String::from("stop"));
        self.stopped.store(!self.unresponsive, Ordering::SeqCst);
    }

    fn pause(&self) {
        self.record(String::from("pause"));
    }

    fn resume(&self) {
        self.record(String::from("resume"));
    }

    fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Factory that hands out one shared [`TestServer`], so tests can inspect it.
pub struct TestServerFactory {
    pub server: Arc<TestServer>,
}

impl ResourceFactory for TestServerFactory {
    fn server_name(&self) -> &str {
        "test-server"
    }

    fn create(&self) -> Arc<dyn ControlledResource> {
        self.server.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    Info(String),
    Error(String),
}

#[derive(Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl RecordingLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    /// Number of entries, info or error, whose message is exactly `message`.
    pub fn count(&self, message: &str) -> usize {
        self.entries()
            .iter()
            .filter(|entry| match entry {
                LogEntry::Info(m) | LogEntry::Error(m) => m == message,
            })
            .count()
    }

    pub fn errors(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|entry| match entry {
                LogEntry::Error(m) => Some(m),
                LogEntry::Info(_) => None,
            })
            .collect()
    }

    /// Position of the first entry with exactly `message`.
    pub fn position(&self, message: &str) -> Option<usize> {
        self.entries().iter().position(|entry| match entry {
            LogEntry::Info(m) | LogEntry::Error(m) => m == message,
        })
    }

    /// Test helper: Wait until `message` has been logged at least `times` times.
    pub async fn wait_for(&self, message: &str, times: usize) {
        let deadline = Instant::now() + TEST_TIMEOUT;
        while self.count(message) < times {
            assert!(
                Instant::now() < deadline,
                "Timed out waiting for {times}x \"{message}\", log: {:?}",
                self.entries()
            );
            TokioSleep(Duration::from_millis(10)).await;
        }
    }

    fn push(&self, entry: LogEntry) {
        self.entries.lock().unwrap().push(entry);
    }
}

impl MonitorLogger for RecordingLogger {
    fn log_info(&self, message: &str) {
        self.push(LogEntry::Info(message.to_string()));
    }

    fn log_error(&self, message: &str) {
        self.push(LogEntry::Error(message.to_string()));
    }

    fn log_error_with_cause(&self, message: &str, _cause: &(dyn StdError + 'static)) {
        self.push(LogEntry::Error(message.to_string()));
    }
}

/// Counts callbacks and echoes them into the logger it is handed, so tests
/// can check where in the run they happened.
#[derive(Default)]
pub struct RecordingObserver {
    started: AtomicUsize,
    stopped: AtomicUsize,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn started_count(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn stopped_count(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl MonitorObserver for RecordingObserver {
    fn started(&self, resource: &dyn ControlledResource, logger: &dyn MonitorLogger) {
        assert!(resource.is_started(), "started fired before the server was up");
        self.started.fetch_add(1, Ordering::SeqCst);
        logger.log_info(OBSERVED_STARTED);
    }

    fn stopped(&self, resource: &dyn ControlledResource, logger: &dyn MonitorLogger) {
        assert!(resource.is_stopped(), "stopped fired before the server was down");
        self.stopped.fetch_add(1, Ordering::SeqCst);
        logger.log_info(OBSERVED_STOPPED);
    }
}

/// Test helper: Launch `monitor` in daemon mode over the test doubles.
pub async fn launch_daemon(
    monitor: &Monitor,
    server: &Arc<TestServer>,
    logger: &Arc<RecordingLogger>,
    observer: Option<&Arc<RecordingObserver>>,
) -> MonitorHandle {
    let observer = observer.map(|observer| observer.clone() as Arc<dyn MonitorObserver>);
    monitor
        .run_daemon(server.clone(), logger.clone(), observer)
        .await
}

/// Test helper: Join a daemon run, failing the test if it does not finish.
pub async fn join_within_timeout(handle: MonitorHandle) -> LifecycleState {
    tokio::time::timeout(TEST_TIMEOUT, handle.join())
        .await
        .expect("Monitor did not finish in time")
        .expect("Monitor task failed")
}

/// Test helper: Open a raw connection to a monitor on `port`, trying the
/// machine hostname first and `localhost` second, as the monitor binds.
pub async fn connect_raw(port: u16) -> TcpStream {
    let hosts = System::host_name()
        .into_iter()
        .chain([String::from("localhost")]);

    for host in hosts {
        let Ok(resolved) = lookup_host((host.as_str(), port)).await else {
            continue;
        };
        let addresses: Vec<SocketAddr> = resolved.collect();
        let Some(address) = addresses
            .iter()
            .find(|address| address.is_ipv4())
            .or_else(|| addresses.first())
        else {
            continue;
        };
        if let Ok(stream) = TcpStream::connect(*address).await {
            return stream;
        }
    }

    panic!("No monitor reachable on port {port}");
}
