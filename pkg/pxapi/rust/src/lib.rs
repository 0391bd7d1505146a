// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

// Correctness
#![deny(clippy::indexing_slicing)]
#![deny(clippy::string_slice)]
#![deny(clippy::cast_possible_wrap)]
#![deny(clippy::undocumented_unsafe_blocks)]
// Panicking code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unimplemented)]
#![deny(clippy::todo)]
// Debug code that shouldn't be in production
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]

pub mod config;
pub mod errdefs;
mod errors;
pub mod proto;
pub mod schema;
pub mod types;
pub mod utils;
pub mod value;
pub mod vis;

// Re-export the public API
pub use errdefs::{ClassifiedError, ErrorCategory, ScriptError, classify, parse_script_status};
pub use errors::{CellFault, Error, Result, SchemaDecodeError, UnknownType, ValueDecodeError};
pub use schema::{Column, ColumnSchema, decode_schema, decode_schema_bytes};
pub use types::{Primitive, PxType, SemanticAlias};
pub use value::{
    Datum, PartialRow, Row, Value, decode_batch, decode_cell, decode_row, decode_row_partial,
};
pub use vis::{Vis, VisCodec, VisCodecError, VisValidationError, Widget};
