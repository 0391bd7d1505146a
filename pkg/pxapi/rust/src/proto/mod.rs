// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Wire messages exchanged with the query service, generated from the
//! `.proto` files under `pkg/pxapi/proto`.
//!
//! Field numbers are part of the external contract and must not change.

pub mod px {
    pub mod api {
        tonic::include_proto!("px.api");
    }

    pub mod vispb {
        tonic::include_proto!("px.vispb");
    }
}

pub use px::api::{
    Cell, CellList, ColumnData, ColumnDescriptor, CompilerError, ErrorDetails, PxTypeTag,
    RowBatchData, RowMessage, SchemaMessage, Status, Uuid as UuidProto, cell, error_details,
};

impl cell::Payload {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BoolValue(_) => "bool",
            Self::Int64Value(_) => "int64",
            Self::Uint64Value(_) => "uint64",
            Self::Float64Value(_) => "float64",
            Self::StringValue(_) => "string",
            Self::ListValue(_) => "list",
            Self::Literal(_) => "literal",
        }
    }
}

impl Cell {
    pub fn empty() -> Self {
        Self { payload: None }
    }

    pub fn boolean(value: bool) -> Self {
        Self::with(cell::Payload::BoolValue(value))
    }

    pub fn int64(value: i64) -> Self {
        Self::with(cell::Payload::Int64Value(value))
    }

    pub fn uint64(value: u64) -> Self {
        Self::with(cell::Payload::Uint64Value(value))
    }

    pub fn float64(value: f64) -> Self {
        Self::with(cell::Payload::Float64Value(value))
    }

    pub fn string(value: &str) -> Self {
        Self::with(cell::Payload::StringValue(value.as_bytes().to_vec()))
    }

    pub fn bytes(value: Vec<u8>) -> Self {
        Self::with(cell::Payload::StringValue(value))
    }

    pub fn literal(value: &str) -> Self {
        Self::with(cell::Payload::Literal(value.to_string()))
    }

    pub fn list(items: Vec<Cell>) -> Self {
        Self::with(cell::Payload::ListValue(CellList { items }))
    }

    fn with(payload: cell::Payload) -> Self {
        Self {
            payload: Some(payload),
        }
    }
}

impl RowMessage {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }
}

impl From<Vec<Cell>> for ColumnData {
    fn from(cells: Vec<Cell>) -> Self {
        Self { cells }
    }
}
