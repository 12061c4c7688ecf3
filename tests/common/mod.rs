#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use svcvisor::{
    Event, EventKind, Liveness, Readiness, Subscribe, Supervisor, SupervisorBuilder,
    SupervisorConfig, Worker, WorkerError,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Span;

/// Shared, ordered log of lifecycle calls across workers (`"a:init"`, `"b:run"`, ...).
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.0.lock().unwrap().iter().any(|e| e == entry)
    }

    /// Entries ending with `:{call}`, in order.
    pub fn calls(&self, call: &str) -> Vec<String> {
        let suffix = format!(":{call}");
        self.entries()
            .into_iter()
            .filter(|e| e.ends_with(&suffix))
            .collect()
    }
}

#[derive(Clone, Copy, Debug)]
pub enum RunMode {
    /// Block until `terminate`, then return `Ok`.
    UntilTerminated,
    /// Return `Ok` immediately.
    Finish,
    /// Return `WorkerError::Fail` immediately.
    Fail,
    /// Return `WorkerError::Canceled` immediately.
    Cancel,
    /// Panic immediately.
    Panic,
    /// Block forever, ignoring `terminate`.
    Hang,
}

#[derive(Clone, Copy, Debug)]
pub enum TerminateMode {
    Ok,
    Fail,
    Panic,
    /// Never return.
    Block,
}

/// Configurable worker recording every lifecycle call.
pub struct MockWorker {
    name: &'static str,
    journal: Journal,
    init_failures: AtomicU32,
    init_hangs: bool,
    run_mode: RunMode,
    terminate_mode: TerminateMode,
    stop: CancellationToken,
    run_exited: AtomicBool,
    alive_err: Mutex<Option<String>>,
    ready_err: Mutex<Option<String>>,
    with_liveness: bool,
    with_readiness: bool,
    run_returned_at: Mutex<Option<Instant>>,
    terminate_called_at: Mutex<Option<Instant>>,
}

impl MockWorker {
    pub fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            journal: journal.clone(),
            init_failures: AtomicU32::new(0),
            init_hangs: false,
            run_mode: RunMode::UntilTerminated,
            terminate_mode: TerminateMode::Ok,
            stop: CancellationToken::new(),
            run_exited: AtomicBool::new(false),
            alive_err: Mutex::new(None),
            ready_err: Mutex::new(None),
            with_liveness: false,
            with_readiness: false,
            run_returned_at: Mutex::new(None),
            terminate_called_at: Mutex::new(None),
        }
    }

    /// `init` fails this many times before succeeding (`u32::MAX` = always).
    pub fn init_failures(self, n: u32) -> Self {
        self.init_failures.store(n, Ordering::SeqCst);
        self
    }

    /// `init` never returns.
    pub fn init_hangs(mut self) -> Self {
        self.init_hangs = true;
        self
    }

    pub fn run_mode(mut self, mode: RunMode) -> Self {
        self.run_mode = mode;
        self
    }

    pub fn terminate_mode(mut self, mode: TerminateMode) -> Self {
        self.terminate_mode = mode;
        self
    }

    pub fn with_liveness(mut self) -> Self {
        self.with_liveness = true;
        self
    }

    pub fn with_readiness(mut self) -> Self {
        self.with_readiness = true;
        self
    }

    pub fn set_alive_err(&self, err: Option<&str>) {
        *self.alive_err.lock().unwrap() = err.map(str::to_string);
    }

    pub fn set_ready_err(&self, err: Option<&str>) {
        *self.ready_err.lock().unwrap() = err.map(str::to_string);
    }

    pub fn run_exited(&self) -> bool {
        self.run_exited.load(Ordering::SeqCst)
    }

    pub fn run_returned_at(&self) -> Option<Instant> {
        *self.run_returned_at.lock().unwrap()
    }

    pub fn terminate_called_at(&self) -> Option<Instant> {
        *self.terminate_called_at.lock().unwrap()
    }

    fn record(&self, call: &str) {
        self.journal.push(format!("{}:{call}", self.name));
    }

    fn mark_run_returned(&self) {
        self.run_exited.store(true, Ordering::SeqCst);
        *self.run_returned_at.lock().unwrap() = Some(Instant::now());
    }
}

#[async_trait]
impl Worker for MockWorker {
    async fn init(&self, _span: &Span) -> Result<(), WorkerError> {
        self.record("init");
        if self.init_hangs {
            std::future::pending::<()>().await;
        }
        let remaining = self.init_failures.load(Ordering::SeqCst);
        if remaining == 0 {
            return Ok(());
        }
        if remaining != u32::MAX {
            self.init_failures.store(remaining - 1, Ordering::SeqCst);
        }
        Err(WorkerError::fail(format!("{} init failed", self.name)))
    }

    async fn run(&self) -> Result<(), WorkerError> {
        self.record("run");
        let res = match self.run_mode {
            RunMode::UntilTerminated => {
                self.stop.cancelled().await;
                Ok(())
            }
            RunMode::Finish => Ok(()),
            RunMode::Fail => Err(WorkerError::fail(format!("{} crashed", self.name))),
            RunMode::Cancel => Err(WorkerError::Canceled),
            RunMode::Panic => panic!("{} exploded", self.name),
            RunMode::Hang => std::future::pending().await,
        };
        self.mark_run_returned();
        res
    }

    async fn terminate(&self) -> Result<(), WorkerError> {
        self.record("terminate");
        *self.terminate_called_at.lock().unwrap() = Some(Instant::now());
        self.stop.cancel();
        match self.terminate_mode {
            TerminateMode::Ok => Ok(()),
            TerminateMode::Fail => Err(WorkerError::fail(format!("{} refused", self.name))),
            TerminateMode::Panic => panic!("{} terminate exploded", self.name),
            TerminateMode::Block => std::future::pending().await,
        }
    }

    fn liveness(self: Arc<Self>) -> Option<Arc<dyn Liveness>> {
        if self.with_liveness { Some(self) } else { None }
    }

    fn readiness(self: Arc<Self>) -> Option<Arc<dyn Readiness>> {
        if self.with_readiness { Some(self) } else { None }
    }
}

#[async_trait]
impl Liveness for MockWorker {
    async fn alive(&self) -> Result<(), WorkerError> {
        match self.alive_err.lock().unwrap().clone() {
            Some(msg) => Err(WorkerError::fail(msg)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Readiness for MockWorker {
    async fn healthy(&self) -> Result<(), WorkerError> {
        match self.ready_err.lock().unwrap().clone() {
            Some(msg) => Err(WorkerError::fail(msg)),
            None => Ok(()),
        }
    }
}

/// Subscriber recording every event it receives.
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<Event>>,
}

impl Recorder {
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().unwrap().iter().map(|e| e.kind).collect()
    }

    pub fn of_kind(&self, kind: EventKind) -> Vec<Event> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, e: &Event) {
        self.events.lock().unwrap().push(e.clone());
    }

    fn name(&self) -> &'static str {
        "Recorder"
    }

    fn queue_capacity(&self) -> usize {
        4096
    }
}

/// Config suited for tests: no signal handlers, short grace period.
pub fn test_config() -> SupervisorConfig {
    SupervisorConfig::new("test-svc", "0.1.0")
        .with_grace(Duration::from_secs(2))
        .with_trap_signals(false)
}

/// Builder with a [`Recorder`] attached.
pub fn builder_with_recorder(cfg: SupervisorConfig) -> (SupervisorBuilder, Arc<Recorder>) {
    let rec = Arc::new(Recorder::default());
    let builder = Supervisor::builder(cfg).with_subscribers(vec![rec.clone() as Arc<dyn Subscribe>]);
    (builder, rec)
}

/// Polls until `journal` contains `entry`.
pub async fn wait_for(journal: &Journal, entry: &str) {
    while !journal.contains(entry) {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Upper bound for any single `run()` in tests.
pub const RUN_DEADLINE: Duration = Duration::from_secs(5);
