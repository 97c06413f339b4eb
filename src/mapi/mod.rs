//! Management API gateway.
//!
//! [`Mapi`] is the seam between the human monitor and the host's structured
//! management interface. Every entry point returns an owned record tree or an
//! error descriptor; the caller owns whatever comes back and drops it when
//! done, on success and failure alike.

pub mod types;

use crate::error::Result;

use types::{
    ChangeMedium, IoThreadInfo, NameInfo, StatsFilter, StatsProvider, StatsResult, StatsSchema,
    StatusInfo, TpmInfo, VersionInfo, VirtQueueStatus, VirtVhostQueueStatus, VirtioInfo,
    VirtioQueueElement, VirtioStatus,
};

/// Management API entry points used by the monitor commands.
///
/// Method names follow the management command they stand for, with dashes
/// turned into underscores (`x-query-virtio` becomes
/// [`Mapi::x_query_virtio`]).
pub trait Mapi {
    /// `query-name`.
    fn query_name(&self) -> Result<NameInfo>;

    /// `query-version`.
    fn query_version(&self) -> Result<VersionInfo>;

    /// `query-status`.
    fn query_status(&self) -> Result<StatusInfo>;

    /// `query-tpm`.
    fn query_tpm(&self) -> Result<Vec<TpmInfo>>;

    /// `query-iothreads`.
    fn query_iothreads(&self) -> Result<Vec<IoThreadInfo>>;

    /// `quit`: request process shutdown.
    fn quit(&self) -> Result<()>;

    /// `stop`: pause every vCPU.
    fn stop(&self) -> Result<()>;

    /// `cont`: resume execution.
    fn cont(&self) -> Result<()>;

    /// `x-exit-preconfig`: leave the pre-configuration phase.
    fn x_exit_preconfig(&self) -> Result<()>;

    /// `getfd`: adopt the file descriptor passed alongside the command.
    fn getfd(&self, fdname: &str) -> Result<()>;

    /// `closefd`: release a named file descriptor.
    fn closefd(&self, fdname: &str) -> Result<()>;

    /// `blockdev-change-medium`.
    fn blockdev_change_medium(&self, request: &ChangeMedium) -> Result<()>;

    /// `change-vnc-password`.
    fn change_vnc_password(&self, password: &str) -> Result<()>;

    /// `query-stats-schemas`, optionally restricted to one provider.
    fn query_stats_schemas(&self, provider: Option<StatsProvider>) -> Result<Vec<StatsSchema>>;

    /// `query-stats`.
    fn query_stats(&self, filter: &StatsFilter) -> Result<Vec<StatsResult>>;

    /// `x-query-virtio`.
    fn x_query_virtio(&self) -> Result<Vec<VirtioInfo>>;

    /// `x-query-virtio-status`.
    fn x_query_virtio_status(&self, path: &str) -> Result<VirtioStatus>;

    /// `x-query-virtio-queue-status`.
    fn x_query_virtio_queue_status(&self, path: &str, queue: u16) -> Result<VirtQueueStatus>;

    /// `x-query-virtio-vhost-queue-status`.
    fn x_query_virtio_vhost_queue_status(
        &self,
        path: &str,
        queue: u16,
    ) -> Result<VirtVhostQueueStatus>;

    /// `x-query-virtio-queue-element`; the queue head when `index` is `None`.
    fn x_query_virtio_queue_element(
        &self,
        path: &str,
        queue: u16,
        index: Option<u16>,
    ) -> Result<VirtioQueueElement>;
}
