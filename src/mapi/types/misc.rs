use serde::{Deserialize, Serialize};

name_table! {
    /// Machine run state.
    pub enum RunState {
        /// Stopped in the debugger.
        Debug => "debug",
        /// Waiting for an incoming migration.
        Inmigrate => "inmigrate",
        /// An internal error stopped the machine.
        InternalError => "internal-error",
        /// A block I/O error stopped the machine.
        IoError => "io-error",
        /// Paused by the operator.
        Paused => "paused",
        /// Finished an outgoing migration.
        Postmigrate => "postmigrate",
        /// Not started yet.
        Prelaunch => "prelaunch",
        /// Completing an outgoing migration.
        FinishMigrate => "finish-migrate",
        /// Restoring a snapshot.
        RestoreVm => "restore-vm",
        /// Running.
        Running => "running",
        /// Saving a snapshot.
        SaveVm => "save-vm",
        /// Shut down.
        Shutdown => "shutdown",
        /// Suspended by the guest.
        Suspended => "suspended",
        /// Stopped by a watchdog action.
        Watchdog => "watchdog",
        /// The guest reported a panic.
        GuestPanicked => "guest-panicked",
        /// Fault-tolerance checkpointing.
        Colo => "colo",
    }
}

name_table! {
    /// How `change` treats the read-only flag of a new medium.
    pub enum ReadOnlyMode {
        /// Keep the current mode.
        Retain => "retain",
        /// Force read-only.
        ReadOnly => "read-only",
        /// Force read-write.
        ReadWrite => "read-write",
    }
}

/// Reply of `query-name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameInfo {
    /// Host-assigned machine name, when one was given.
    #[serde(default)]
    pub name: Option<String>,
}

/// Numeric version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionTriple {
    /// Major version.
    pub major: i64,
    /// Minor version.
    pub minor: i64,
    /// Micro version.
    pub micro: i64,
}

/// Reply of `query-version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Version numbers.
    pub qemu: VersionTriple,

    /// Package suffix, printed verbatim after the numbers.
    #[serde(default)]
    pub package: String,
}

/// Reply of `query-status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    /// Whether vCPUs are running.
    pub running: bool,

    /// Single-step mode.
    #[serde(default)]
    pub singlestep: bool,

    /// Detailed run state.
    pub status: RunState,
}

/// One entry of `query-iothreads`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IoThreadInfo {
    /// Object identifier.
    pub id: String,
    /// Host thread id.
    pub thread_id: i64,
    /// Maximum polling time in nanoseconds.
    pub poll_max_ns: i64,
    /// Polling time growth factor.
    pub poll_grow: i64,
    /// Polling time shrink divisor.
    pub poll_shrink: i64,
    /// Maximum number of requests batched in one submission.
    pub aio_max_batch: i64,
}

/// Arguments of `blockdev-change-medium`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChangeMedium {
    /// Block device name.
    pub device: String,

    /// Image to insert.
    pub filename: String,

    /// Image format; probed when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Eject even when the guest locked the tray.
    #[serde(default)]
    pub force: bool,

    /// Read-only handling of the new medium.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only_mode: Option<ReadOnlyMode>,
}
