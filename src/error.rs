//! Error model for the `hmp` crate.

use thiserror::Error;

/// Convenience result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error class used for errors raised by this layer itself.
pub const GENERIC_ERROR: &str = "GenericError";

/// High-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The management API returned an error descriptor.
    Mapi,
    /// A required argument is missing or has the wrong type.
    Argument,
    /// An argument has a value the command does not accept.
    Value,
    /// No command is registered under the requested name.
    UnknownCommand,
    /// A reply could not be decoded into the expected record.
    Decode,
}

/// Structured error type.
///
/// The `Display` form is the "pretty" description that the error relay
/// prints after its `Error: ` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// An error descriptor returned by a management API entry point.
    #[error("{desc}")]
    Mapi {
        /// Error class, e.g. `GenericError` or `DeviceNotFound`.
        class: String,
        /// Human readable description.
        desc: String,
    },

    /// A required argument was not supplied.
    #[error("Parameter '{name}' is missing")]
    MissingArgument {
        /// Argument name.
        name: String,
    },

    /// An argument was supplied with the wrong type.
    #[error("Parameter '{name}' expects {expected}")]
    InvalidArgumentType {
        /// Argument name.
        name: String,
        /// Expected type.
        expected: &'static str,
    },

    /// An operand is not one of the accepted spellings.
    #[error("Invalid parameter '{0}'")]
    InvalidParameter(String),

    /// A name-table lookup failed.
    #[error("invalid parameter value: {0}")]
    InvalidParameterValue(String),

    /// The dispatcher has no command with this name.
    #[error("unknown command: '{0}'")]
    UnknownCommand(String),

    /// A reply did not match the record shape of its entry point.
    #[error("failed to decode reply for '{command}': {message}")]
    Decode {
        /// Entry point name.
        command: String,
        /// Decoder diagnostic, including the offending path.
        message: String,
    },
}

impl Error {
    /// Returns a coarse error classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Mapi { .. } => ErrorKind::Mapi,
            Self::MissingArgument { .. } | Self::InvalidArgumentType { .. } => ErrorKind::Argument,
            Self::InvalidParameter(_) | Self::InvalidParameterValue(_) => ErrorKind::Value,
            Self::UnknownCommand(_) => ErrorKind::UnknownCommand,
            Self::Decode { .. } => ErrorKind::Decode,
        }
    }

    /// Error class as reported to the operator's tooling.
    #[must_use]
    pub fn class(&self) -> &str {
        match self {
            Self::Mapi { class, .. } => class,
            Self::UnknownCommand(_) => "CommandNotFound",
            _ => GENERIC_ERROR,
        }
    }

    /// A management API error of class `GenericError`.
    pub fn generic(desc: impl Into<String>) -> Self {
        Self::mapi(GENERIC_ERROR, desc)
    }

    /// A management API error with an explicit class.
    pub fn mapi(class: impl Into<String>, desc: impl Into<String>) -> Self {
        Self::Mapi {
            class: class.into(),
            desc: desc.into(),
        }
    }

    pub(crate) fn missing(name: impl Into<String>) -> Self {
        Self::MissingArgument { name: name.into() }
    }

    pub(crate) fn invalid_value(value: impl Into<String>) -> Self {
        Self::InvalidParameterValue(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapi_error_displays_description_only() {
        let err = Error::mapi("DeviceNotFound", "Device 'ide1-cd0' not found");
        assert_eq!(err.to_string(), "Device 'ide1-cd0' not found");
        assert_eq!(err.class(), "DeviceNotFound");
        assert_eq!(err.kind(), ErrorKind::Mapi);
    }

    #[test]
    fn layer_errors_are_generic() {
        let err = Error::InvalidParameter("sideways".into());
        assert_eq!(err.to_string(), "Invalid parameter 'sideways'");
        assert_eq!(err.class(), GENERIC_ERROR);
        assert_eq!(err.kind(), ErrorKind::Value);
        assert_eq!(Error::missing("index").kind(), ErrorKind::Argument);
    }
}
