//! Monitor session.
//!
//! A [`Monitor`] is the write-only text sink of one operator session plus the
//! small amount of per-session state the commands need: the currently
//! selected vCPU and a suspend counter.

use std::fmt::{self, Write as _};

/// One interactive monitor session.
///
/// Output accumulates in an internal buffer until the session owner drains
/// it with [`Monitor::take_output`] and forwards it to the operator's
/// terminal.
#[derive(Debug, Clone, Default)]
pub struct Monitor {
    outbuf: String,
    cpu_index: Option<i64>,
    suspend_count: usize,
}

impl Monitor {
    /// Create a fresh session with no vCPU selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append formatted text.
    ///
    /// This inherent method shadows [`fmt::Write::write_fmt`], so `write!`
    /// and `writeln!` on a monitor yield `()`: writes to the buffer cannot
    /// fail.
    pub fn write_fmt(&mut self, args: fmt::Arguments<'_>) {
        // Formatting into a `String` only fails if a `Display` impl lies.
        let _ = self.outbuf.write_fmt(args);
    }

    /// Append a literal string.
    pub fn puts(&mut self, s: &str) {
        self.outbuf.push_str(s);
    }

    /// Everything written since the last drain.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.outbuf
    }

    /// Drain the pending output.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.outbuf)
    }

    /// Index of the currently selected vCPU.
    ///
    /// A session that never ran `cpu` operates on vCPU 0.
    #[must_use]
    pub fn cpu_index(&self) -> i64 {
        self.cpu_index.unwrap_or(0)
    }

    /// Select the current vCPU. The caller validates the index.
    pub fn set_cpu_index(&mut self, index: i64) {
        self.cpu_index = Some(index);
    }

    /// Stop accepting further commands on this session.
    pub fn suspend(&mut self) {
        self.suspend_count = self.suspend_count.saturating_add(1);
    }

    /// Undo one [`Monitor::suspend`].
    pub fn resume(&mut self) {
        self.suspend_count = self.suspend_count.saturating_sub(1);
    }

    /// Whether command intake is currently suspended.
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.suspend_count > 0
    }
}
