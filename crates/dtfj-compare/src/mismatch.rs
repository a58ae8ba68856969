use dtfj_model::{DataError, DataErrorKind};
use serde::Serialize;
use std::fmt;

/// Which provider a finding is attributed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The implementation under test.
    Ddr,
    /// The baseline implementation.
    Reference,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Ddr => write!(f, "ddr"),
            Side::Reference => write!(f, "reference"),
        }
    }
}

/// First divergence found inside one comparator invocation.
///
/// `path` names the member chain that led to the divergence, e.g.
/// `JavaThread.STACK_FRAMES[2] > JavaStackFrame.LOCATION > JavaLocation.LINE_NUMBER`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mismatch {
    /// Both sides produced a value and the values differ.
    Value {
        path: String,
        ddr: String,
        reference: String,
    },
    /// Both sides failed, but with different failure categories.
    ErrorKind {
        path: String,
        ddr: DataErrorKind,
        reference: DataErrorKind,
    },
    /// Exactly one side failed.
    OneSided {
        path: String,
        side: Side,
        error: DataError,
    },
    /// Two enumerations of the same logical collection differ in size.
    Cardinality {
        path: String,
        ddr: usize,
        reference: usize,
    },
    /// An entity id enumerated by one side has no counterpart on the other.
    Unpaired {
        path: String,
        side: Side,
        id: String,
    },
}

impl Mismatch {
    pub fn path(&self) -> &str {
        match self {
            Self::Value { path, .. }
            | Self::ErrorKind { path, .. }
            | Self::OneSided { path, .. }
            | Self::Cardinality { path, .. }
            | Self::Unpaired { path, .. } => path,
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value {
                path,
                ddr,
                reference,
            } => write!(f, "{path}: values differ (ddr={ddr} reference={reference})"),
            Self::ErrorKind {
                path,
                ddr,
                reference,
            } => write!(
                f,
                "{path}: both sides failed with different kinds (ddr={ddr} reference={reference})"
            ),
            Self::OneSided { path, side, error } => {
                let other = match side {
                    Side::Ddr => Side::Reference,
                    Side::Reference => Side::Ddr,
                };
                write!(
                    f,
                    "{path}: {side} threw unexpectedly ({error}) while {other} succeeded"
                )
            }
            Self::Cardinality {
                path,
                ddr,
                reference,
            } => write!(
                f,
                "{path}: enumeration sizes differ (ddr={ddr} reference={reference})"
            ),
            Self::Unpaired { path, side, id } => {
                write!(f, "{path}: {id} is only present on the {side} side")
            }
        }
    }
}

impl std::error::Error for Mismatch {}
