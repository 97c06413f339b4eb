use serde::{Deserialize, Serialize};

name_table! {
    /// Emulated TPM front-end.
    pub enum TpmModel {
        /// TIS interface.
        TpmTis => "tpm-tis",
        /// CRB interface.
        TpmCrb => "tpm-crb",
        /// sPAPR vTPM.
        TpmSpapr => "tpm-spapr",
    }
}

name_table! {
    /// TPM back-end kind.
    pub enum TpmType {
        /// Host TPM passthrough.
        Passthrough => "passthrough",
        /// External software emulator.
        Emulator => "emulator",
    }
}

/// Options of a passthrough back-end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TpmPassthroughOptions {
    /// Host device path.
    #[serde(default)]
    pub path: Option<String>,
    /// Cancel file path.
    #[serde(default)]
    pub cancel_path: Option<String>,
}

/// Options of an emulator back-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TpmEmulatorOptions {
    /// Character device connected to the emulator.
    pub chardev: String,
}

/// Back-end options, tagged by [`TpmType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum TpmOptions {
    /// Passthrough back-end.
    Passthrough(TpmPassthroughOptions),
    /// Emulator back-end.
    Emulator(TpmEmulatorOptions),
}

impl TpmOptions {
    /// The back-end kind.
    #[must_use]
    pub fn kind(&self) -> TpmType {
        match self {
            Self::Passthrough(_) => TpmType::Passthrough,
            Self::Emulator(_) => TpmType::Emulator,
        }
    }
}

/// One entry of `query-tpm`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TpmInfo {
    /// Device identifier.
    pub id: String,
    /// Front-end model.
    pub model: TpmModel,
    /// Back-end options.
    pub options: TpmOptions,
}
