//! Scripted management API and object tree.
//!
//! This module is intended for:
//! - unit/integration tests of the monitor commands
//! - reproducing operator transcripts against recorded MAPI replies
//!
//! It is gated behind `cfg(test)` or the `mock` Cargo feature.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};

use crate::{
    error::{Error, Result},
    machine::{HostObject, InterruptStatsProvider, Machine},
    mapi::{
        Mapi,
        types::{
            ChangeMedium, IoThreadInfo, NameInfo, StatsFilter, StatsProvider, StatsResult,
            StatsSchema, StatusInfo, TpmInfo, VersionInfo, VirtQueueStatus, VirtVhostQueueStatus,
            VirtioInfo, VirtioQueueElement, VirtioStatus,
        },
    },
    monitor::Monitor,
};

/// How a command should be answered by the mock.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum MockReply {
    /// Successful reply payload; every call hands out a new reference.
    Return(Arc<Value>),

    /// Error descriptor.
    Error {
        /// Error class.
        class: String,
        /// Error description.
        desc: String,
    },
}

/// Replies keyed by MAPI command name.
#[derive(Debug, Clone, Default)]
pub struct MockScript {
    /// Map from command name to reply.
    pub replies: HashMap<String, MockReply>,
}

impl MockScript {
    /// An empty script; every command fails with `CommandNotFound`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a successful reply.
    #[must_use]
    pub fn reply_return(mut self, command: impl Into<String>, value: Value) -> Self {
        self.replies
            .insert(command.into(), MockReply::Return(Arc::new(value)));
        self
    }

    /// Add an empty successful reply, for commands that return nothing.
    #[must_use]
    pub fn reply_ok(self, command: impl Into<String>) -> Self {
        self.reply_return(command, json!({}))
    }

    /// Add an error reply.
    #[must_use]
    pub fn reply_error(
        mut self,
        command: impl Into<String>,
        class: impl Into<String>,
        desc: impl Into<String>,
    ) -> Self {
        self.replies.insert(
            command.into(),
            MockReply::Error {
                class: class.into(),
                desc: desc.into(),
            },
        );
        self
    }
}

/// One recorded MAPI invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    /// Command name, e.g. `query-stats`.
    pub command: String,
    /// Serialized arguments; `None` for argument-less commands.
    pub arguments: Option<Value>,
}

/// A node of the mock object tree.
#[derive(Debug, Clone)]
pub struct MockObject {
    type_name: String,
    children: Vec<MockObject>,
    // Outer `Some`: the object is an interrupt controller. Inner: its printout.
    intc: Option<Option<String>>,
}

impl MockObject {
    /// A plain object with no children.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            children: Vec::new(),
            intc: None,
        }
    }

    /// An interrupt controller that prints `info` verbatim.
    #[must_use]
    pub fn interrupt_controller(type_name: impl Into<String>, info: impl Into<String>) -> Self {
        Self {
            intc: Some(Some(info.into())),
            ..Self::new(type_name)
        }
    }

    /// An interrupt controller without a printer.
    #[must_use]
    pub fn silent_interrupt_controller(type_name: impl Into<String>) -> Self {
        Self {
            intc: Some(None),
            ..Self::new(type_name)
        }
    }

    /// Append a child.
    #[must_use]
    pub fn with_child(mut self, child: MockObject) -> Self {
        self.children.push(child);
        self
    }
}

impl HostObject for MockObject {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn children(&self) -> Vec<&dyn HostObject> {
        self.children.iter().map(|c| c as &dyn HostObject).collect()
    }

    fn as_interrupt_stats(&self) -> Option<&dyn InterruptStatsProvider> {
        self.intc.as_ref().map(|_| self as &dyn InterruptStatsProvider)
    }
}

impl InterruptStatsProvider for MockObject {
    fn print_info(&self, mon: &mut Monitor) -> bool {
        match &self.intc {
            Some(Some(info)) => {
                mon.puts(info);
                true
            }
            _ => false,
        }
    }
}

/// A scripted host: MAPI replies, vCPU list and object tree.
#[derive(Debug)]
pub struct MockHost {
    script: MockScript,
    calls: Mutex<Vec<MockCall>>,
    handed_out: AtomicUsize,
    cpus: Vec<String>,
    root: MockObject,
}

impl MockHost {
    /// A host with one vCPU and an empty object tree.
    #[must_use]
    pub fn new(script: MockScript) -> Self {
        Self {
            script,
            calls: Mutex::new(Vec::new()),
            handed_out: AtomicUsize::new(0),
            cpus: Vec::new(),
            root: MockObject::new("container"),
        }
        .with_cpus(1)
    }

    /// Replace the vCPU list with `n` CPUs at the usual object paths.
    #[must_use]
    pub fn with_cpus(mut self, n: usize) -> Self {
        self.cpus = (0..n)
            .map(|i| format!("/machine/unattached/device[{i}]"))
            .collect();
        self
    }

    /// Replace the object tree.
    #[must_use]
    pub fn with_root(mut self, root: MockObject) -> Self {
        self.root = root;
        self
    }

    /// Every call made so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock_calls().clone()
    }

    /// How many times `command` was called.
    #[must_use]
    pub fn calls_to(&self, command: &str) -> usize {
        self.lock_calls()
            .iter()
            .filter(|c| c.command == command)
            .count()
    }

    /// Arguments of the most recent call to `command`.
    #[must_use]
    pub fn last_arguments(&self, command: &str) -> Option<Value> {
        self.lock_calls()
            .iter()
            .rev()
            .find(|c| c.command == command)
            .and_then(|c| c.arguments.clone())
    }

    /// How many successful replies were handed out so far.
    #[must_use]
    pub fn replies_handed_out(&self) -> usize {
        self.handed_out.load(Ordering::Relaxed)
    }

    /// Successful replies handed out and not yet released.
    ///
    /// Zero whenever no MAPI call is in progress. Clones of the script made
    /// before building the host count as outstanding.
    #[must_use]
    pub fn outstanding_replies(&self) -> usize {
        self.script
            .replies
            .values()
            .map(|r| match r {
                MockReply::Return(v) => Arc::strong_count(v) - 1,
                MockReply::Error { .. } => 0,
            })
            .sum()
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<MockCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reply(&self, command: &str, arguments: Option<Value>) -> Result<Arc<Value>> {
        self.lock_calls().push(MockCall {
            command: command.to_string(),
            arguments,
        });

        #[cfg(feature = "tracing")]
        tracing::trace!(command, "mock reply");

        match self.script.replies.get(command) {
            Some(MockReply::Return(v)) => {
                self.handed_out.fetch_add(1, Ordering::Relaxed);
                Ok(Arc::clone(v))
            }
            Some(MockReply::Error { class, desc }) => Err(Error::mapi(class.clone(), desc.clone())),
            None => Err(Error::mapi(
                "CommandNotFound",
                format!("no mock reply for '{command}'"),
            )),
        }
    }

    fn call<R: DeserializeOwned>(&self, command: &str, arguments: Option<Value>) -> Result<R> {
        let value = self.reply(command, arguments)?;
        serde_path_to_error::deserialize(&*value).map_err(|e| Error::Decode {
            command: command.to_string(),
            message: e.to_string(),
        })
    }

    fn call_unit(&self, command: &str, arguments: Option<Value>) -> Result<()> {
        self.reply(command, arguments).map(drop)
    }
}

fn encode<T: Serialize>(command: &str, args: &T) -> Result<Value> {
    serde_json::to_value(args).map_err(|e| Error::Decode {
        command: command.to_string(),
        message: e.to_string(),
    })
}

impl Mapi for MockHost {
    fn query_name(&self) -> Result<NameInfo> {
        self.call("query-name", None)
    }

    fn query_version(&self) -> Result<VersionInfo> {
        self.call("query-version", None)
    }

    fn query_status(&self) -> Result<StatusInfo> {
        self.call("query-status", None)
    }

    fn query_tpm(&self) -> Result<Vec<TpmInfo>> {
        self.call("query-tpm", None)
    }

    fn query_iothreads(&self) -> Result<Vec<IoThreadInfo>> {
        self.call("query-iothreads", None)
    }

    fn quit(&self) -> Result<()> {
        self.call_unit("quit", None)
    }

    fn stop(&self) -> Result<()> {
        self.call_unit("stop", None)
    }

    fn cont(&self) -> Result<()> {
        self.call_unit("cont", None)
    }

    fn x_exit_preconfig(&self) -> Result<()> {
        self.call_unit("x-exit-preconfig", None)
    }

    fn getfd(&self, fdname: &str) -> Result<()> {
        self.call_unit("getfd", Some(json!({ "fdname": fdname })))
    }

    fn closefd(&self, fdname: &str) -> Result<()> {
        self.call_unit("closefd", Some(json!({ "fdname": fdname })))
    }

    fn blockdev_change_medium(&self, request: &ChangeMedium) -> Result<()> {
        let args = encode("blockdev-change-medium", request)?;
        self.call_unit("blockdev-change-medium", Some(args))
    }

    fn change_vnc_password(&self, password: &str) -> Result<()> {
        self.call_unit("change-vnc-password", Some(json!({ "password": password })))
    }

    fn query_stats_schemas(&self, provider: Option<StatsProvider>) -> Result<Vec<StatsSchema>> {
        let args = provider.map(|p| json!({ "provider": p }));
        self.call("query-stats-schemas", args)
    }

    fn query_stats(&self, filter: &StatsFilter) -> Result<Vec<StatsResult>> {
        let args = encode("query-stats", filter)?;
        self.call("query-stats", Some(args))
    }

    fn x_query_virtio(&self) -> Result<Vec<VirtioInfo>> {
        self.call("x-query-virtio", None)
    }

    fn x_query_virtio_status(&self, path: &str) -> Result<VirtioStatus> {
        self.call("x-query-virtio-status", Some(json!({ "path": path })))
    }

    fn x_query_virtio_queue_status(&self, path: &str, queue: u16) -> Result<VirtQueueStatus> {
        self.call(
            "x-query-virtio-queue-status",
            Some(json!({ "path": path, "queue": queue })),
        )
    }

    fn x_query_virtio_vhost_queue_status(
        &self,
        path: &str,
        queue: u16,
    ) -> Result<VirtVhostQueueStatus> {
        self.call(
            "x-query-virtio-vhost-queue-status",
            Some(json!({ "path": path, "queue": queue })),
        )
    }

    fn x_query_virtio_queue_element(
        &self,
        path: &str,
        queue: u16,
        index: Option<u16>,
    ) -> Result<VirtioQueueElement> {
        let mut args = json!({ "path": path, "queue": queue });
        if let Some(index) = index {
            args["index"] = json!(index);
        }
        self.call("x-query-virtio-queue-element", Some(args))
    }
}

impl Machine for MockHost {
    fn cpu_path(&self, index: i64) -> Option<String> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.cpus.get(i))
            .cloned()
    }

    fn object_root(&self) -> &dyn HostObject {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorKind, mapi::types::RunState};

    #[test]
    fn scripted_reply_is_decoded_and_recorded() {
        let host = MockHost::new(MockScript::new().reply_return(
            "query-status",
            json!({"running": false, "singlestep": false, "status": "inmigrate"}),
        ));

        let status = host.query_status().unwrap();
        assert_eq!(status.status, RunState::Inmigrate);
        assert_eq!(host.calls_to("query-status"), 1);
        assert_eq!(host.last_arguments("query-status"), None);
    }

    #[test]
    fn unscripted_command_is_not_found() {
        let host = MockHost::new(MockScript::new());
        let err = host.stop().unwrap_err();
        assert_eq!(err.class(), "CommandNotFound");
        assert_eq!(host.calls().len(), 1);
    }

    #[test]
    fn decode_error_names_the_path() {
        let host = MockHost::new(
            MockScript::new().reply_return("query-version", json!({"qemu": {"major": "eight"}})),
        );
        let err = host.query_version().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(err.to_string().contains("qemu.major"), "{err}");
    }

    #[test]
    fn replies_are_released_on_success_and_failure() {
        let host = MockHost::new(
            MockScript::new()
                .reply_return("query-name", json!({"name": "vm100"}))
                .reply_return("query-version", json!({"qemu": {}})),
        );

        let name = host.query_name().unwrap();
        assert_eq!(name.name.as_deref(), Some("vm100"));
        assert!(host.query_version().is_err());

        assert_eq!(host.replies_handed_out(), 2);
        assert_eq!(host.outstanding_replies(), 0);
    }

    #[test]
    fn cpu_paths_follow_index() {
        let host = MockHost::new(MockScript::new()).with_cpus(2);
        assert_eq!(
            host.cpu_path(1).as_deref(),
            Some("/machine/unattached/device[1]")
        );
        assert_eq!(host.cpu_path(2), None);
        assert_eq!(host.cpu_path(-1), None);
    }

    #[test]
    fn queue_element_index_is_optional() {
        let host = MockHost::new(MockScript::new());
        let _ = host.x_query_virtio_queue_element("/vio", 0, None);
        assert_eq!(
            host.last_arguments("x-query-virtio-queue-element"),
            Some(json!({"path": "/vio", "queue": 0}))
        );
        let _ = host.x_query_virtio_queue_element("/vio", 0, Some(3));
        assert_eq!(
            host.last_arguments("x-query-virtio-queue-element"),
            Some(json!({"path": "/vio", "queue": 0, "index": 3}))
        );
    }
}
