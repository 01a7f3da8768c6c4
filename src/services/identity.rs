//! Cached process name and id.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::api::collaborators::ProcessIdentity;
use crate::sync::mutex::Mutex;

/// Process name and pid, cached for report prefixes.
///
/// Both can change under a long-running process (exec, fork), so the cache is
/// refreshed on every activation.
#[derive(Debug)]
pub struct ProcessName {
    name: Mutex<String>,
    pid: AtomicU32,
}

impl ProcessName {
    /// Create a cache populated from the current process.
    pub fn new() -> Self {
        let identity = Self {
            name: Mutex::new(String::new()),
            pid: AtomicU32::new(0),
        };
        identity.refresh();
        identity
    }

    /// Cached executable name.
    pub fn name(&self) -> String {
        self.name.lock().clone()
    }

    /// Cached process id.
    pub fn pid(&self) -> u32 {
        self.pid.load(Ordering::Relaxed)
    }

}

impl Default for ProcessName {
    fn default() -> Self {
        Self::new()
    }
}

fn current_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))
        .or_else(|| std::env::args().next())
        .unwrap_or_else(|| "unknown".to_string())
}

impl ProcessIdentity for ProcessName {
    fn refresh(&self) {
        *self.name.lock() = current_name();
        self.pid.store(std::process::id(), Ordering::Relaxed);
    }

    fn label(&self) -> String {
        format!("{}:{}", self.name(), self.pid())
    }
}
