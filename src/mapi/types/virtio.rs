use serde::{Deserialize, Serialize};

/// One entry of `x-query-virtio`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtioInfo {
    /// Canonical object path.
    pub path: String,
    /// Device type name.
    pub name: String,
}

/// Decoded device status bits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VirtioDeviceStatus {
    /// Names of the set status bits.
    pub statuses: Vec<String>,
    /// Bits without a known name.
    #[serde(default)]
    pub unknown_statuses: Option<u32>,
}

/// Decoded feature bits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VirtioDeviceFeatures {
    /// Transport feature names.
    pub transports: Vec<String>,
    /// Device-specific feature names.
    #[serde(default)]
    pub dev_features: Option<Vec<String>>,
    /// Bits without a known name.
    #[serde(default)]
    pub unknown_dev_features: Option<u64>,
}

/// Decoded vhost-user protocol feature bits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VhostDeviceProtocols {
    /// Protocol feature names.
    pub protocols: Vec<String>,
    /// Bits without a known name.
    #[serde(default)]
    pub unknown_protocols: Option<u64>,
}

/// Vhost back-end state embedded in [`VirtioStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VhostStatus {
    /// Memory sections tracked by the back-end.
    pub n_mem_sections: i64,
    /// Memory sections staged for the next update.
    pub n_tmp_sections: i64,
    /// Virtqueues owned by this back-end.
    pub nvqs: u32,
    /// Index of the first owned virtqueue.
    pub vq_index: i64,
    /// Features offered by the back-end.
    pub features: VirtioDeviceFeatures,
    /// Features acknowledged by the driver.
    pub acked_features: VirtioDeviceFeatures,
    /// Features of the back-end.
    pub backend_features: VirtioDeviceFeatures,
    /// Negotiated vhost-user protocol features.
    pub protocol_features: VhostDeviceProtocols,
    /// Queue pairs the back-end supports.
    pub max_queues: u64,
    /// Back-end capability bits.
    pub backend_cap: u64,
    /// Dirty logging is on.
    pub log_enabled: bool,
    /// Dirty log size.
    pub log_size: u64,
}

/// Reply of `x-query-virtio-status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VirtioStatus {
    /// Device type name.
    pub name: String,
    /// VirtIO device id.
    pub device_id: u16,
    /// The vhost back-end is running.
    pub vhost_started: bool,
    /// Device endianness (`little`, `big` or `unknown`).
    pub device_endian: String,
    /// Features the driver accepted.
    pub guest_features: VirtioDeviceFeatures,
    /// Features the device offers.
    pub host_features: VirtioDeviceFeatures,
    /// Features of the back-end.
    pub backend_features: VirtioDeviceFeatures,
    /// Virtqueues in use.
    pub num_vqs: i64,
    /// Device status register.
    pub status: VirtioDeviceStatus,
    /// Interrupt status register.
    pub isr: u8,
    /// Currently selected queue.
    pub queue_sel: u16,
    /// The machine is running.
    pub vm_running: bool,
    /// The device hit a fatal error.
    pub broken: bool,
    /// The device is disabled.
    pub disabled: bool,
    /// `started` is meaningful for this device.
    pub use_started: bool,
    /// The driver started the device.
    pub started: bool,
    /// The device starts on the first kick.
    pub start_on_kick: bool,
    /// Legacy-mode checks are skipped.
    pub disable_legacy_check: bool,
    /// Parent bus name.
    pub bus_name: String,
    /// Guest notifier masking is used.
    pub use_guest_notifier_mask: bool,
    /// Present for vhost-backed devices.
    #[serde(default)]
    pub vhost_dev: Option<VhostStatus>,
}

/// Reply of `x-query-virtio-queue-status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VirtQueueStatus {
    /// Device type name.
    pub name: String,
    /// Queue number.
    pub queue_index: u16,
    /// Elements popped but not yet pushed back.
    pub inuse: u32,
    /// Ring size.
    pub vring_num: u32,
    /// Default ring size.
    pub vring_num_default: u32,
    /// Ring alignment.
    pub vring_align: u32,
    /// Descriptor table address.
    pub vring_desc: u64,
    /// Available ring address.
    pub vring_avail: u64,
    /// Used ring address.
    pub vring_used: u64,
    /// Absent for vhost devices.
    #[serde(default)]
    pub last_avail_idx: Option<u16>,
    /// Absent for vhost devices.
    #[serde(default)]
    pub shadow_avail_idx: Option<u16>,
    /// Next used ring index.
    pub used_idx: u16,
    /// Last used index the guest was notified of.
    pub signalled_used: u16,
    /// `signalled_used` is meaningful.
    pub signalled_used_valid: bool,
}

/// Reply of `x-query-virtio-vhost-queue-status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VirtVhostQueueStatus {
    /// Device type name.
    pub name: String,
    /// Kick eventfd.
    pub kick: i64,
    /// Call eventfd.
    pub call: i64,
    /// Descriptor table address.
    pub desc: u64,
    /// Available ring address.
    pub avail: u64,
    /// Used ring address.
    pub used: u64,
    /// Ring size.
    pub num: i64,
    /// Descriptor table guest physical address.
    pub desc_phys: u64,
    /// Descriptor table size in bytes.
    pub desc_size: u32,
    /// Available ring guest physical address.
    pub avail_phys: u64,
    /// Available ring size in bytes.
    pub avail_size: u32,
    /// Used ring guest physical address.
    pub used_phys: u64,
    /// Used ring size in bytes.
    pub used_size: u32,
}

/// One descriptor of a queue element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtioRingDesc {
    /// Guest physical address.
    pub addr: u64,
    /// Buffer length.
    pub len: u32,
    /// Decoded descriptor flags.
    #[serde(default)]
    pub flags: Option<Vec<String>>,
}

/// Available ring state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtioRingAvail {
    /// Ring flags.
    pub flags: u16,
    /// Ring index.
    pub idx: u16,
    /// Ring entry of the element.
    pub ring: u16,
}

/// Used ring state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtioRingUsed {
    /// Ring flags.
    pub flags: u16,
    /// Ring index.
    pub idx: u16,
}

/// Reply of `x-query-virtio-queue-element`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtioQueueElement {
    /// Device type name.
    pub name: String,
    /// Element head index.
    pub index: u32,
    /// Descriptor chain.
    pub descs: Vec<VirtioRingDesc>,
    /// Available ring snapshot.
    pub avail: VirtioRingAvail,
    /// Used ring snapshot.
    pub used: VirtioRingUsed,
}
