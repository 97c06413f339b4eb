//! Record types returned by (and passed to) management API entry points.
//!
//! Field names follow the wire spelling of the management API (kebab-case),
//! so replies can be scripted or logged as plain JSON.

/// Declares a closed enum together with its wire-name table.
///
/// Generates `ALL` (declaration order), `as_str`, `Display`, `FromStr` and
/// serde support using the same spellings.
macro_rules! name_table {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $wire:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every value, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Wire spelling.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::error::Error;

            fn from_str(s: &str) -> crate::error::Result<Self> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err(crate::error::Error::invalid_value(s)),
                }
            }
        }
    };
}

mod misc;
mod stats;
mod tpm;
mod virtio;

pub use misc::{
    ChangeMedium, IoThreadInfo, NameInfo, ReadOnlyMode, RunState, StatusInfo, VersionInfo,
    VersionTriple,
};
pub use stats::{
    Stats, StatsFilter, StatsProvider, StatsRequest, StatsResult, StatsSchema, StatsSchemaValue,
    StatsTarget, StatsType, StatsUnit, StatsValue,
};
pub use tpm::{TpmEmulatorOptions, TpmInfo, TpmModel, TpmOptions, TpmPassthroughOptions, TpmType};
pub use virtio::{
    VhostDeviceProtocols, VhostStatus, VirtQueueStatus, VirtVhostQueueStatus, VirtioDeviceFeatures,
    VirtioDeviceStatus, VirtioInfo, VirtioQueueElement, VirtioRingAvail, VirtioRingDesc,
    VirtioRingUsed, VirtioStatus,
};
