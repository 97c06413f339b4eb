use serde::{Deserialize, Serialize};

name_table! {
    /// Producer of a statistic.
    pub enum StatsProvider {
        /// The hypervisor kernel interface.
        Kvm => "kvm",
        /// Crypto device back-ends.
        Cryptodev => "cryptodev",
    }
}

name_table! {
    /// Subject of a statistic.
    pub enum StatsTarget {
        /// The whole machine.
        Vm => "vm",
        /// One virtual CPU.
        Vcpu => "vcpu",
    }
}

name_table! {
    /// How a statistic evolves over time.
    pub enum StatsType {
        /// Monotonic counter.
        Cumulative => "cumulative",
        /// Current value.
        Instant => "instant",
        /// Highest value seen.
        Peak => "peak",
        /// Histogram with equally sized buckets.
        LinearHistogram => "linear-histogram",
        /// Histogram with power-of-two buckets.
        Log2Histogram => "log2-histogram",
    }
}

name_table! {
    /// Physical unit of a statistic.
    pub enum StatsUnit {
        /// Bytes.
        Bytes => "bytes",
        /// Seconds.
        Seconds => "seconds",
        /// CPU cycles.
        Cycles => "cycles",
        /// Yes/no value.
        Boolean => "boolean",
    }
}

/// A statistic's value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatsValue {
    /// Integer value.
    Scalar(u64),
    /// Boolean value.
    Boolean(bool),
    /// Histogram buckets.
    List(Vec<u64>),
}

/// One named statistic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Statistic name.
    pub name: String,
    /// Statistic value.
    pub value: StatsValue,
}

/// Statistics reported by one provider for one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StatsResult {
    /// Producer.
    pub provider: StatsProvider,
    /// Object path of the subject, for per-vCPU results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qom_path: Option<String>,
    /// Values, in schema order.
    pub stats: Vec<Stats>,
}

/// Declared shape of one statistic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StatsSchemaValue {
    /// Statistic name.
    pub name: String,
    /// Kind of statistic.
    #[serde(rename = "type")]
    pub kind: StatsType,
    /// Unit, if the value has one.
    #[serde(default)]
    pub unit: Option<StatsUnit>,
    /// Numeric base of `exponent`, 2 or 10.
    #[serde(default = "default_base")]
    pub base: i8,
    /// The value is scaled by `base` raised to this power.
    #[serde(default)]
    pub exponent: i16,
    /// Bucket width of a linear histogram.
    #[serde(default)]
    pub bucket_size: Option<u32>,
}

fn default_base() -> i8 {
    10
}

/// Schema of every statistic a provider exposes for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSchema {
    /// Producer.
    pub provider: StatsProvider,
    /// Subject kind.
    pub target: StatsTarget,
    /// Declared statistics, in display order.
    pub stats: Vec<StatsSchemaValue>,
}

/// Per-provider request inside a [`StatsFilter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRequest {
    /// Producer to query.
    pub provider: StatsProvider,
    /// Names to return; every statistic when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<String>>,
}

/// Argument of `query-stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsFilter {
    /// Subject kind.
    pub target: StatsTarget,
    /// vCPU object paths, for the `vcpu` target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcpus: Option<Vec<String>>,
    /// Provider requests; every provider and name when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub providers: Option<Vec<StatsRequest>>,
}

impl StatsFilter {
    /// A filter selecting everything about `target`.
    #[must_use]
    pub fn new(target: StatsTarget) -> Self {
        Self {
            target,
            vcpus: None,
            providers: None,
        }
    }
}
