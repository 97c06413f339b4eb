//! `hmp` - human monitor commands on top of a structured management API.
//!
//! This crate is the text front-end of a virtual machine host: it takes an
//! operator command with already-parsed arguments, calls the management API
//! (MAPI) and renders the reply on the session's [`Monitor`].
//!
//! It provides:
//! - a command dispatcher and one shim per command ([`Hmp`])
//! - a schema-driven renderer and filter builder for `info stats`
//! - renderers for para-virtual device and queue introspection
//! - a single error relay: every failure prints one `Error: ...` line
//! - a scripted host for tests (`mock` feature)
//!
//! ## Quick start
//!
//! ```
//! use hmp::{Args, Hmp, Monitor};
//! use hmp::mock::{MockHost, MockScript};
//!
//! let host = MockHost::new(MockScript::new().reply_return(
//!     "query-status",
//!     serde_json::json!({"running": true, "singlestep": false, "status": "running"}),
//! ));
//!
//! let hmp = Hmp::new(host);
//! let mut mon = Monitor::new();
//! hmp.execute(&mut mon, "info status", &Args::new());
//!
//! assert_eq!(mon.take_output(), "VM status: running\n");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod args;
pub mod error;
pub mod hmp;
pub mod machine;
pub mod mapi;
pub mod monitor;
pub mod profile;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use args::{ArgValue, Args};
pub use error::{Error, ErrorKind, Result};
pub use hmp::{Capabilities, Hmp, HmpBuilder, handle_error, split_at_comma};
pub use machine::{HostObject, InterruptStatsProvider, Machine};
pub use mapi::Mapi;
pub use monitor::Monitor;
pub use profile::SyncProfiler;
