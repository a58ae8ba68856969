use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of reading one member out of a captured snapshot.
///
/// Every accessor that a DTFJ provider may fail on is stored as an `Access`,
/// so both the value and the failure category survive serialization.
pub type Access<T> = Result<T, DataError>;

/// Typed failure categories a DTFJ provider reports instead of a value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataError {
    /// Captured data is internally inconsistent (`CorruptDataException`).
    CorruptData {
        #[serde(default)]
        detail: String,
    },
    /// The data was never captured (`DataUnavailable`).
    DataUnavailable {
        #[serde(default)]
        detail: String,
    },
    /// Memory backing the value could not be read (`MemoryAccessException`).
    MemoryAccess { address: u64 },
}

/// Payload-free category of a [`DataError`].
///
/// Two failures are "the same kind" when their categories match; details and
/// faulting addresses are diagnostic only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataErrorKind {
    CorruptData,
    DataUnavailable,
    MemoryAccess,
}

impl DataError {
    pub fn corrupt(detail: impl Into<String>) -> Self {
        Self::CorruptData {
            detail: detail.into(),
        }
    }

    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self::DataUnavailable {
            detail: detail.into(),
        }
    }

    pub fn memory(address: u64) -> Self {
        Self::MemoryAccess { address }
    }

    pub fn kind(&self) -> DataErrorKind {
        match self {
            Self::CorruptData { .. } => DataErrorKind::CorruptData,
            Self::DataUnavailable { .. } => DataErrorKind::DataUnavailable,
            Self::MemoryAccess { .. } => DataErrorKind::MemoryAccess,
        }
    }

    /// Text substituted for a value that could not be read when rendering
    /// human-readable output.
    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::CorruptData { .. } => "<corrupt data>",
            Self::DataUnavailable { .. } | Self::MemoryAccess { .. } => "<data unavailable>",
        }
    }
}

impl fmt::Display for DataErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CorruptData => write!(f, "CorruptData"),
            Self::DataUnavailable => write!(f, "DataUnavailable"),
            Self::MemoryAccess => write!(f, "MemoryAccess"),
        }
    }
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CorruptData { detail } if detail.is_empty() => write!(f, "corrupt data"),
            Self::CorruptData { detail } => write!(f, "corrupt data: {detail}"),
            Self::DataUnavailable { detail } if detail.is_empty() => write!(f, "data unavailable"),
            Self::DataUnavailable { detail } => write!(f, "data unavailable: {detail}"),
            Self::MemoryAccess { address } => {
                write!(f, "memory access failed at 0x{address:x}")
            }
        }
    }
}

impl std::error::Error for DataError {}

/// Serde default for members absent from a snapshot file: the provider never
/// captured them.
pub fn not_captured<T>() -> Access<T> {
    Err(DataError::unavailable("not captured"))
}

/// Renders an access as its value or the matching placeholder.
pub fn display_or_placeholder<T: fmt::Display>(value: &Access<T>) -> String {
    match value {
        Ok(v) => v.to_string(),
        Err(e) => e.placeholder().to_string(),
    }
}
