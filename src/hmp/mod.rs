//! Human monitor command adapter.
//!
//! [`Hmp`] turns operator commands into [`Mapi`] calls and renders the
//! replies as text on a [`Monitor`]. Every command runs to completion on the
//! caller's thread; errors never escape a command, they are printed through
//! [`handle_error`].
//!
//! Commands live in three families:
//! - [`misc`]: run-state control, simple queries, `change`, `cpu`, fds
//! - [`stats`]: `info stats`, its filter builder and the schema renderer
//! - [`virtio`]: device, queue and element introspection

pub mod misc;
pub mod stats;
pub mod virtio;

use crate::{
    args::Args,
    error::{Error, Result},
    machine::Machine,
    mapi::Mapi,
    monitor::Monitor,
    profile::SyncProfiler,
};

/// Optional subsystems available in this build of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// TPM support; `info tpm` reports "not supported" without it.
    pub tpm: bool,

    /// VNC support; without it `change vnc ...` is treated as a block device.
    pub vnc: bool,
}

impl Capabilities {
    /// No optional subsystem.
    #[must_use]
    pub fn none() -> Self {
        Self {
            tpm: false,
            vnc: false,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            tpm: true,
            vnc: true,
        }
    }
}

/// Builder for [`Hmp`].
#[derive(Debug, Clone)]
pub struct HmpBuilder<H> {
    host: H,
    caps: Capabilities,
    profiler: Option<SyncProfiler>,
}

impl<H> HmpBuilder<H> {
    /// Enable or disable TPM support.
    #[must_use]
    pub fn tpm(mut self, enabled: bool) -> Self {
        self.caps.tpm = enabled;
        self
    }

    /// Enable or disable VNC support.
    #[must_use]
    pub fn vnc(mut self, enabled: bool) -> Self {
        self.caps.vnc = enabled;
        self
    }

    /// Replace the whole capability set.
    #[must_use]
    pub fn capabilities(mut self, caps: Capabilities) -> Self {
        self.caps = caps;
        self
    }

    /// Use a specific profiler instead of the process-wide one.
    #[must_use]
    pub fn sync_profiler(mut self, profiler: SyncProfiler) -> Self {
        self.profiler = Some(profiler);
        self
    }

    /// Finish the adapter.
    #[must_use]
    pub fn build(self) -> Hmp<H> {
        Hmp {
            host: self.host,
            caps: self.caps,
            profiler: self.profiler.unwrap_or_else(SyncProfiler::global),
        }
    }
}

/// The monitor command adapter for one host.
#[derive(Debug, Clone)]
pub struct Hmp<H> {
    host: H,
    caps: Capabilities,
    profiler: SyncProfiler,
}

impl<H> Hmp<H> {
    /// Adapter with every capability and the process-wide profiler.
    #[must_use]
    pub fn new(host: H) -> Self {
        Self::builder(host).build()
    }

    /// Create a builder for the given host.
    #[must_use]
    pub fn builder(host: H) -> HmpBuilder<H> {
        HmpBuilder {
            host,
            caps: Capabilities::default(),
            profiler: None,
        }
    }

    /// Access the underlying host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The capability set this adapter was built with.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    /// The sync-profile switch this adapter drives.
    #[must_use]
    pub fn profiler(&self) -> &SyncProfiler {
        &self.profiler
    }
}

impl<H: Mapi + Machine> Hmp<H> {
    /// Run one command by name.
    ///
    /// Argument-shape errors and unknown names are printed through
    /// [`handle_error`], like any other error.
    pub fn execute(&self, mon: &mut Monitor, command: &str, args: &Args) {
        #[cfg(feature = "tracing")]
        tracing::trace!(command, "dispatching monitor command");

        let res = match command {
            "info name" => {
                self.info_name(mon);
                Ok(())
            }
            "info version" => {
                self.info_version(mon);
                Ok(())
            }
            "info status" => {
                self.info_status(mon);
                Ok(())
            }
            "info pic" => {
                self.info_pic(mon);
                Ok(())
            }
            "info tpm" => {
                self.info_tpm(mon);
                Ok(())
            }
            "info iothreads" => {
                self.info_iothreads(mon);
                Ok(())
            }
            "info stats" => self.info_stats(mon, args),
            "info virtio" => {
                self.info_virtio(mon);
                Ok(())
            }
            "quit" => {
                self.quit(mon);
                Ok(())
            }
            "stop" => {
                self.stop(mon);
                Ok(())
            }
            "cont" => {
                self.cont(mon);
                Ok(())
            }
            "cpu" => self.cpu(mon, args),
            "change" => self.change(mon, args),
            "getfd" => self.getfd(mon, args),
            "closefd" => self.closefd(mon, args),
            "sync-profile" => {
                self.sync_profile(mon, args);
                Ok(())
            }
            "exit-preconfig" => {
                self.exit_preconfig(mon);
                Ok(())
            }
            "virtio status" => self.virtio_status(mon, args),
            "virtio queue-status" => self.virtio_queue_status(mon, args),
            "vhost queue-status" => self.vhost_queue_status(mon, args),
            "virtio queue-element" => self.virtio_queue_element(mon, args),
            _ => Err(Error::UnknownCommand(command.to_string())),
        };

        handle_error(mon, res.err());
    }
}

/// Report `err` on the monitor, if there is one.
///
/// Prints a single `Error: <description>` line and consumes the error.
/// Returns whether an error was present.
pub fn handle_error(mon: &mut Monitor, err: Option<Error>) -> bool {
    let Some(err) = err else {
        return false;
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(class = err.class(), error = %err, "monitor command failed");

    writeln!(mon, "Error: {err}");
    true
}

/// Unwrap a reply, or report its error and yield `None`.
pub(crate) fn check<T>(mon: &mut Monitor, res: Result<T>) -> Option<T> {
    match res {
        Ok(v) => Some(v),
        Err(err) => {
            handle_error(mon, Some(err));
            None
        }
    }
}

/// Split `s` at every comma.
///
/// `None` behaves like the empty string, and both yield an empty list.
/// Empty fields are kept; nothing is trimmed.
#[must_use]
pub fn split_at_comma(s: Option<&str>) -> Vec<String> {
    match s {
        None | Some("") => Vec::new(),
        Some(s) => s.split(',').map(str::to_owned).collect(),
    }
}
