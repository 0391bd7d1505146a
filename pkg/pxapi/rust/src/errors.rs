// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use thiserror::Error;

use crate::errdefs::ScriptError;
use crate::types::PxType;
use crate::utils::crypto::CryptoError;
use crate::utils::uuid::InvalidUuid;
use crate::vis::VisCodecError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnknownType {
    #[error("unknown PXType tag {0}")]
    Tag(i32),
    #[error("unknown PXType name {0:?}")]
    Name(String),
}

#[derive(Error, Debug)]
pub enum SchemaDecodeError {
    #[error("column {index} has no name")]
    MissingName { index: usize },
    #[error("column {index} ({name:?}): {source}")]
    UnknownType {
        index: usize,
        name: String,
        source: UnknownType,
    },
    #[error("column {index}: duplicate column name {name:?}")]
    DuplicateName { index: usize, name: String },
    #[error("malformed schema message: {0}")]
    Wire(#[from] prost::DecodeError),
}

/// Why a single cell could not be decoded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CellFault {
    #[error("missing payload for non-nullable column")]
    MissingPayload,
    #[error("value out of range for INT64")]
    Overflow,
    #[error("malformed {expected} literal {literal:?}")]
    Malformed {
        expected: &'static str,
        literal: String,
    },
    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,
    #[error("{found} payload does not match the column type")]
    TypeMismatch { found: &'static str },
    #[error("list element {element}: {fault}")]
    Element {
        element: usize,
        fault: Box<CellFault>,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueDecodeError {
    #[error("row has {actual} cells but the schema has {expected} columns")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("batch column {index} has {actual} cells, expected {expected}")]
    ColumnLength {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("batch declares a negative row count ({0})")]
    InvalidRowCount(i64),
    #[error("column {index} ({px_type}): {fault}")]
    Cell {
        index: usize,
        px_type: PxType,
        fault: CellFault,
    },
}

impl ValueDecodeError {
    pub fn column_index(&self) -> Option<usize> {
        match self {
            Self::Cell { index, .. } | Self::ColumnLength { index, .. } => Some(*index),
            Self::SizeMismatch { .. } | Self::InvalidRowCount(_) => None,
        }
    }

    pub fn px_type(&self) -> Option<PxType> {
        match self {
            Self::Cell { px_type, .. } => Some(*px_type),
            _ => None,
        }
    }

    pub fn fault(&self) -> Option<&CellFault> {
        match self {
            Self::Cell { fault, .. } => Some(fault),
            _ => None,
        }
    }
}

/// Any failure surfaced by this crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    UnknownType(#[from] UnknownType),
    #[error(transparent)]
    SchemaDecode(#[from] SchemaDecodeError),
    #[error(transparent)]
    ValueDecode(#[from] ValueDecodeError),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    InvalidUuid(#[from] InvalidUuid),
    #[error(transparent)]
    Vis(#[from] VisCodecError),
    #[error(transparent)]
    Script(#[from] ScriptError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_error_reports_column_and_type() {
        let err = ValueDecodeError::Cell {
            index: 3,
            px_type: PxType::INT64,
            fault: CellFault::Overflow,
        };
        assert_eq!(err.column_index(), Some(3));
        assert_eq!(err.px_type(), Some(PxType::INT64));
        assert_eq!(err.fault(), Some(&CellFault::Overflow));
        assert_eq!(
            err.to_string(),
            "column 3 (PX_INT64): value out of range for INT64"
        );
    }

    #[test]
    fn test_size_mismatch_has_no_column() {
        let err = ValueDecodeError::SizeMismatch {
            expected: 2,
            actual: 3,
        };
        assert_eq!(err.column_index(), None);
        assert_eq!(err.px_type(), None);
        assert_eq!(
            err.to_string(),
            "row has 3 cells but the schema has 2 columns"
        );
    }

    #[test]
    fn test_nested_element_fault_message() {
        let fault = CellFault::Element {
            element: 1,
            fault: Box::new(CellFault::TypeMismatch { found: "int64" }),
        };
        assert_eq!(
            fault.to_string(),
            "list element 1: int64 payload does not match the column type"
        );
    }

    #[test]
    fn test_umbrella_error_is_transparent() {
        let err: Error = UnknownType::Tag(7).into();
        assert_eq!(err.to_string(), "unknown PXType tag 7");
    }
}
