//! # Shutdown triggers: OS signals and explicit requests.
//!
//! Both feed one bounded channel (capacity 3) owned by the supervisor, so the
//! run phase handles them identically.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGHUP` (controlling terminal closed)
//!
//! **Other platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]

use std::fmt;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Capacity of the shutdown channel.
const CHANNEL_CAPACITY: usize = 3;

/// A request to stop the supervisor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// `SIGINT` or Ctrl-C.
    Interrupt,
    /// `SIGTERM`, or an explicit [`ShutdownHandle::request`].
    Terminate,
    /// `SIGHUP`.
    Hangup,
}

impl ShutdownSignal {
    /// Signal name as it appears in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShutdownSignal::Interrupt => "interrupt",
            ShutdownSignal::Terminate => "terminated",
            ShutdownSignal::Hangup => "hangup",
        }
    }
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cloneable handle that asks a running supervisor to shut down.
///
/// Obtained with [`Supervisor::shutdown_handle`](crate::Supervisor::shutdown_handle)
/// before `run` is called. Requests are buffered: one made before `run`
/// interrupts the first `init` that does not complete immediately, or ends the
/// run phase as soon as it starts.
#[derive(Clone, Debug)]
pub struct ShutdownHandle {
    tx: mpsc::Sender<ShutdownSignal>,
}

impl ShutdownHandle {
    pub(crate) fn new(tx: mpsc::Sender<ShutdownSignal>) -> Self {
        Self { tx }
    }

    /// Enqueues a synthetic terminate signal. Never blocks.
    ///
    /// Returns `false` when the request was dropped: the channel is full
    /// (shutdown is already pending) or the supervisor is gone.
    pub fn request(&self) -> bool {
        self.tx.try_send(ShutdownSignal::Terminate).is_ok()
    }
}

/// Creates the shutdown channel.
pub(crate) fn channel() -> (mpsc::Sender<ShutdownSignal>, mpsc::Receiver<ShutdownSignal>) {
    mpsc::channel(CHANNEL_CAPACITY)
}

/// Installs the OS signal handlers and forwards signals into `tx` until `stop`
/// is cancelled.
///
/// Handlers are in place when this returns.
pub(crate) fn spawn_signal_forwarder(
    tx: mpsc::Sender<ShutdownSignal>,
    stop: CancellationToken,
) -> std::io::Result<JoinHandle<()>> {
    let mut signals = OsSignals::install()?;

    Ok(tokio::spawn(async move {
        loop {
            let sig = tokio::select! {
                _ = stop.cancelled() => return,
                sig = signals.recv() => match sig {
                    Some(sig) => sig,
                    None => return,
                },
            };
            if tx.try_send(sig).is_err() {
                warn!(signal = sig.as_str(), "Shutdown already pending, signal dropped");
            }
        }
    }))
}

#[cfg(unix)]
struct OsSignals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    hangup: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl OsSignals {
    fn install() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
        })
    }

    async fn recv(&mut self) -> Option<ShutdownSignal> {
        tokio::select! {
            Some(()) = self.interrupt.recv() => Some(ShutdownSignal::Interrupt),
            Some(()) = self.terminate.recv() => Some(ShutdownSignal::Terminate),
            Some(()) = self.hangup.recv() => Some(ShutdownSignal::Hangup),
            else => None,
        }
    }
}

#[cfg(not(unix))]
struct OsSignals;

#[cfg(not(unix))]
impl OsSignals {
    fn install() -> std::io::Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> Option<ShutdownSignal> {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Some(ShutdownSignal::Interrupt),
            Err(err) => {
                warn!(error = %err, "Ctrl-C handler failed");
                None
            }
        }
    }
}
