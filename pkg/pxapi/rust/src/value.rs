// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Typed decoding of result rows against a [`ColumnSchema`].
//!
//! Decoding is strict: no numeric coercion between kinds, no defaulting of
//! absent payloads in non-nullable columns. Semantic aliases decode exactly
//! like their wire primitive; their meaning is advisory only.

use std::fmt;
use std::num::IntErrorKind;
use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use thiserror::Error;

use crate::errors::{CellFault, ValueDecodeError};
use crate::proto::cell::Payload;
use crate::proto::{Cell, RowBatchData, RowMessage};
use crate::schema::{Column, ColumnSchema};
use crate::types::{Primitive, PxType};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Int64(i64),
    Float64(f64),
    String(String),
    List(Vec<Value>),
    StringList(Vec<String>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            Self::StringList(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::StringList(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// A decoded value tagged with the type of the column it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Datum {
    px_type: PxType,
    value: Value,
}

impl Datum {
    pub fn new(px_type: PxType, value: Value) -> Self {
        Self { px_type, value }
    }

    pub fn px_type(&self) -> PxType {
        self.px_type
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

/// One decoded row. Holds a shared handle to the schema it was decoded with.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    schema: Arc<ColumnSchema>,
    datums: Vec<Datum>,
}

impl Row {
    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.datums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datums.is_empty()
    }

    pub fn datums(&self) -> &[Datum] {
        &self.datums
    }

    pub fn datum(&self, index: usize) -> Option<&Datum> {
        self.datums.get(index)
    }

    pub fn get(&self, column_name: &str) -> Option<&Datum> {
        self.schema
            .index_of(column_name)
            .and_then(|index| self.datums.get(index))
    }

    pub fn into_datums(self) -> Vec<Datum> {
        self.datums
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.datums.len()))?;
        for (column, datum) in self.schema.columns().iter().zip(&self.datums) {
            map.serialize_entry(column.name(), datum.value())?;
        }
        map.end()
    }
}

/// Failure of [`decode_row_partial`]: the columns decoded before the failing
/// one, plus the error naming it.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{error} ({} columns decoded before the failure)", .decoded.len())]
pub struct PartialRow {
    pub decoded: Vec<Datum>,
    pub error: ValueDecodeError,
}

/// Decode one row, all-or-nothing.
///
/// The cell count is checked against the schema before any cell is decoded.
pub fn decode_row(schema: &Arc<ColumnSchema>, row: &RowMessage) -> Result<Row, ValueDecodeError> {
    decode_row_partial(schema, row).map_err(|partial| partial.error)
}

/// Like [`decode_row`], but a failure keeps the datums decoded so far.
pub fn decode_row_partial(schema: &Arc<ColumnSchema>, row: &RowMessage) -> Result<Row, PartialRow> {
    decode_cells(schema, row.cells.len(), row.cells.iter())
}

fn decode_cells<'a>(
    schema: &Arc<ColumnSchema>,
    width: usize,
    cells: impl Iterator<Item = &'a Cell>,
) -> Result<Row, PartialRow> {
    if width != schema.len() {
        return Err(PartialRow {
            decoded: Vec::new(),
            error: ValueDecodeError::SizeMismatch {
                expected: schema.len(),
                actual: width,
            },
        });
    }

    let mut datums = Vec::with_capacity(width);
    for (index, (column, cell)) in schema.columns().iter().zip(cells).enumerate() {
        match decode_cell(index, column, cell) {
            Ok(datum) => datums.push(datum),
            Err(error) => {
                return Err(PartialRow {
                    decoded: datums,
                    error,
                });
            }
        }
    }

    Ok(Row {
        schema: Arc::clone(schema),
        datums,
    })
}

/// Decode a single cell of column `index`.
pub fn decode_cell(index: usize, column: &Column, cell: &Cell) -> Result<Datum, ValueDecodeError> {
    let px_type = column.px_type();
    let Some(payload) = &cell.payload else {
        if column.is_nullable() {
            return Ok(Datum::new(px_type, Value::Null));
        }
        return Err(ValueDecodeError::Cell {
            index,
            px_type,
            fault: CellFault::MissingPayload,
        });
    };

    let decoded = match px_type {
        PxType::Primitive(primitive) => decode_scalar(primitive, payload),
        PxType::Semantic(alias) => decode_scalar(alias.wire_primitive(), payload),
        PxType::List => decode_list(payload),
        PxType::StringList => decode_string_list(payload),
    };

    decoded
        .map(|value| Datum::new(px_type, value))
        .map_err(|fault| ValueDecodeError::Cell {
            index,
            px_type,
            fault,
        })
}

fn decode_scalar(primitive: Primitive, payload: &Payload) -> Result<Value, CellFault> {
    match (primitive, payload) {
        (Primitive::Boolean, Payload::BoolValue(v)) => Ok(Value::Boolean(*v)),
        (Primitive::Boolean, Payload::Literal(text)) => match text.as_str() {
            "true" => Ok(Value::Boolean(true)),
            "false" => Ok(Value::Boolean(false)),
            _ => Err(malformed(Primitive::Boolean, text)),
        },
        (Primitive::Int64, Payload::Int64Value(v)) => Ok(Value::Int64(*v)),
        (Primitive::Int64, Payload::Uint64Value(v)) => i64::try_from(*v)
            .map(Value::Int64)
            .map_err(|_| CellFault::Overflow),
        (Primitive::Int64, Payload::Literal(text)) => parse_int64(text).map(Value::Int64),
        (Primitive::Float64, Payload::Float64Value(v)) => Ok(Value::Float64(*v)),
        (Primitive::Float64, Payload::Literal(text)) => text
            .parse::<f64>()
            .map(Value::Float64)
            .map_err(|_| malformed(Primitive::Float64, text)),
        (Primitive::String, Payload::StringValue(bytes)) => utf8(bytes).map(Value::String),
        (Primitive::String, Payload::Literal(text)) => Ok(Value::String(text.clone())),
        (_, other) => Err(CellFault::TypeMismatch {
            found: other.kind(),
        }),
    }
}

fn decode_list(payload: &Payload) -> Result<Value, CellFault> {
    let Payload::ListValue(list) = payload else {
        return Err(CellFault::TypeMismatch {
            found: payload.kind(),
        });
    };
    list.items
        .iter()
        .enumerate()
        .map(|(element, item)| decode_list_element(item).map_err(|fault| nested(element, fault)))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::List)
}

/// Elements of a generic list are typed by their own payload.
fn decode_list_element(cell: &Cell) -> Result<Value, CellFault> {
    match &cell.payload {
        None => Err(CellFault::MissingPayload),
        Some(Payload::BoolValue(v)) => Ok(Value::Boolean(*v)),
        Some(Payload::Int64Value(v)) => Ok(Value::Int64(*v)),
        Some(Payload::Uint64Value(v)) => i64::try_from(*v)
            .map(Value::Int64)
            .map_err(|_| CellFault::Overflow),
        Some(Payload::Float64Value(v)) => Ok(Value::Float64(*v)),
        Some(Payload::StringValue(bytes)) => utf8(bytes).map(Value::String),
        Some(Payload::Literal(text)) => Ok(Value::String(text.clone())),
        Some(other @ Payload::ListValue(_)) => Err(CellFault::TypeMismatch {
            found: other.kind(),
        }),
    }
}

fn decode_string_list(payload: &Payload) -> Result<Value, CellFault> {
    let Payload::ListValue(list) = payload else {
        return Err(CellFault::TypeMismatch {
            found: payload.kind(),
        });
    };
    list.items
        .iter()
        .enumerate()
        .map(|(element, item)| {
            let text = match &item.payload {
                None => Err(CellFault::MissingPayload),
                Some(Payload::StringValue(bytes)) => utf8(bytes),
                Some(Payload::Literal(text)) => Ok(text.clone()),
                Some(other) => Err(CellFault::TypeMismatch {
                    found: other.kind(),
                }),
            };
            text.map_err(|fault| nested(element, fault))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Value::StringList)
}

fn parse_int64(text: &str) -> Result<i64, CellFault> {
    text.parse::<i64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => CellFault::Overflow,
        _ => malformed(Primitive::Int64, text),
    })
}

fn utf8(bytes: &[u8]) -> Result<String, CellFault> {
    String::from_utf8(bytes.to_vec()).map_err(|_| CellFault::InvalidUtf8)
}

fn malformed(expected: Primitive, literal: &str) -> CellFault {
    CellFault::Malformed {
        expected: expected.as_str(),
        literal: literal.to_string(),
    }
}

fn nested(element: usize, fault: CellFault) -> CellFault {
    CellFault::Element {
        element,
        fault: Box::new(fault),
    }
}

/// Decode a column-major batch into rows.
///
/// The batch shape (column count, then each column's length against
/// `num_rows`) is validated before any row is decoded. A batch without
/// columns has no cells to back its row count, so it must declare zero rows.
pub fn decode_batch(
    schema: &Arc<ColumnSchema>,
    batch: &RowBatchData,
) -> Result<Vec<Row>, ValueDecodeError> {
    if batch.cols.len() != schema.len() {
        return Err(ValueDecodeError::SizeMismatch {
            expected: schema.len(),
            actual: batch.cols.len(),
        });
    }
    let num_rows =
        usize::try_from(batch.num_rows).map_err(|_| ValueDecodeError::InvalidRowCount(batch.num_rows))?;
    if batch.cols.is_empty() && num_rows > 0 {
        return Err(ValueDecodeError::InvalidRowCount(batch.num_rows));
    }
    for (index, column) in batch.cols.iter().enumerate() {
        if column.cells.len() != num_rows {
            return Err(ValueDecodeError::ColumnLength {
                index,
                expected: num_rows,
                actual: column.cells.len(),
            });
        }
    }

    let mut columns: Vec<_> = batch.cols.iter().map(|column| column.cells.iter()).collect();
    let present = batch.cols.first().map_or(0, |column| column.cells.len());
    let mut rows = Vec::with_capacity(present);
    for row_index in 0..num_rows {
        let cells: Vec<&Cell> = columns.iter_mut().filter_map(Iterator::next).collect();
        let row = decode_cells(schema, cells.len(), cells.into_iter()).map_err(|partial| {
            warn!(
                "table {:?} row {row_index}: {}",
                batch.table_id, partial.error
            );
            partial.error
        })?;
        rows.push(row);
    }

    debug!(
        "decoded {} rows for table {:?} (eow={}, eos={})",
        rows.len(),
        batch.table_id,
        batch.eow,
        batch.eos
    );
    Ok(rows)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic,
    clippy::float_cmp
)]
mod tests {
    use super::*;
    use crate::proto::ColumnData;

    fn schema(columns: Vec<Column>) -> Arc<ColumnSchema> {
        Arc::new(ColumnSchema::new("t", columns).unwrap())
    }

    fn single(px_type: PxType) -> Arc<ColumnSchema> {
        schema(vec![Column::new("c", px_type)])
    }

    fn decode_one(px_type: PxType, cell: Cell) -> Result<Value, ValueDecodeError> {
        decode_row(&single(px_type), &RowMessage::new(vec![cell]))
            .map(|row| row.into_datums().remove(0).into_value())
    }

    fn fault_of(result: Result<Value, ValueDecodeError>) -> CellFault {
        match result {
            Err(ValueDecodeError::Cell { fault, .. }) => fault,
            other => panic!("expected a cell fault, got {other:?}"),
        }
    }

    #[test]
    fn test_boolean_is_exact() {
        assert_eq!(
            decode_one(PxType::BOOLEAN, Cell::boolean(true)).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            decode_one(PxType::BOOLEAN, Cell::boolean(false)).unwrap(),
            Value::Boolean(false)
        );
        assert_eq!(
            decode_one(PxType::BOOLEAN, Cell::literal("false")).unwrap(),
            Value::Boolean(false)
        );
        assert!(matches!(
            fault_of(decode_one(PxType::BOOLEAN, Cell::literal("TRUE"))),
            CellFault::Malformed { expected: "BOOLEAN", .. }
        ));
    }

    #[test]
    fn test_int64_max_decodes() {
        assert_eq!(
            decode_one(PxType::INT64, Cell::literal("9223372036854775807")).unwrap(),
            Value::Int64(i64::MAX)
        );
        assert_eq!(
            decode_one(PxType::INT64, Cell::int64(i64::MIN)).unwrap(),
            Value::Int64(i64::MIN)
        );
        assert_eq!(
            decode_one(PxType::INT64, Cell::uint64(9_223_372_036_854_775_807)).unwrap(),
            Value::Int64(i64::MAX)
        );
    }

    #[test]
    fn test_int64_overflow_fails() {
        assert_eq!(
            fault_of(decode_one(PxType::INT64, Cell::literal("9223372036854775808"))),
            CellFault::Overflow
        );
        assert_eq!(
            fault_of(decode_one(PxType::INT64, Cell::literal("-9223372036854775809"))),
            CellFault::Overflow
        );
        assert_eq!(
            fault_of(decode_one(PxType::INT64, Cell::uint64(9_223_372_036_854_775_808))),
            CellFault::Overflow
        );
    }

    #[test]
    fn test_int64_malformed_literal() {
        assert!(matches!(
            fault_of(decode_one(PxType::INT64, Cell::literal("12ab"))),
            CellFault::Malformed { expected: "INT64", ref literal } if literal == "12ab"
        ));
        assert!(matches!(
            fault_of(decode_one(PxType::INT64, Cell::literal(""))),
            CellFault::Malformed { .. }
        ));
    }

    #[test]
    fn test_no_numeric_coercion() {
        assert_eq!(
            fault_of(decode_one(PxType::INT64, Cell::float64(1.0))),
            CellFault::TypeMismatch { found: "float64" }
        );
        assert_eq!(
            fault_of(decode_one(PxType::FLOAT64, Cell::int64(1))),
            CellFault::TypeMismatch { found: "int64" }
        );
    }

    #[test]
    fn test_float64() {
        assert_eq!(
            decode_one(PxType::FLOAT64, Cell::float64(0.25)).unwrap(),
            Value::Float64(0.25)
        );
        assert_eq!(
            decode_one(PxType::FLOAT64, Cell::literal("-1.5e3")).unwrap(),
            Value::Float64(-1500.0)
        );
        assert!(matches!(
            fault_of(decode_one(PxType::FLOAT64, Cell::literal("one"))),
            CellFault::Malformed { expected: "FLOAT64", .. }
        ));
    }

    #[test]
    fn test_semantic_types_decode_as_text_without_validation() {
        for px_type in [PxType::SERVICE, PxType::POD, PxType::NAMESPACE, PxType::NODE] {
            let value = decode_one(px_type, Cell::string("not/really a pod")).unwrap();
            assert_eq!(value, Value::String("not/really a pod".to_string()));
        }
        assert_eq!(
            decode_one(PxType::CONTAINER, Cell::literal("nginx")).unwrap(),
            Value::String("nginx".to_string())
        );
    }

    #[test]
    fn test_invalid_utf8_fails() {
        assert_eq!(
            fault_of(decode_one(PxType::STRING, Cell::bytes(vec![0xc3, 0x28]))),
            CellFault::InvalidUtf8
        );
    }

    #[test]
    fn test_empty_string_list_is_not_missing() {
        assert_eq!(
            decode_one(PxType::STRING_LIST, Cell::list(Vec::new())).unwrap(),
            Value::StringList(Vec::new())
        );
        assert_eq!(
            fault_of(decode_one(PxType::STRING_LIST, Cell::empty())),
            CellFault::MissingPayload
        );
    }

    #[test]
    fn test_string_list_rejects_non_string_elements() {
        let cell = Cell::list(vec![Cell::string("a"), Cell::int64(2)]);
        assert_eq!(
            fault_of(decode_one(PxType::STRING_LIST, cell)),
            CellFault::Element {
                element: 1,
                fault: Box::new(CellFault::TypeMismatch { found: "int64" }),
            }
        );
    }

    #[test]
    fn test_list_elements_typed_by_payload() {
        let cell = Cell::list(vec![
            Cell::boolean(true),
            Cell::int64(-3),
            Cell::float64(2.5),
            Cell::string("x"),
        ]);
        assert_eq!(
            decode_one(PxType::LIST, cell).unwrap(),
            Value::List(vec![
                Value::Boolean(true),
                Value::Int64(-3),
                Value::Float64(2.5),
                Value::String("x".to_string()),
            ])
        );
        assert_eq!(
            decode_one(PxType::LIST, Cell::list(Vec::new())).unwrap(),
            Value::List(Vec::new())
        );
    }

    #[test]
    fn test_list_rejects_nesting_and_scalars() {
        let nested_list = Cell::list(vec![Cell::list(Vec::new())]);
        assert_eq!(
            fault_of(decode_one(PxType::LIST, nested_list)),
            CellFault::Element {
                element: 0,
                fault: Box::new(CellFault::TypeMismatch { found: "list" }),
            }
        );
        assert_eq!(
            fault_of(decode_one(PxType::LIST, Cell::string("a,b"))),
            CellFault::TypeMismatch { found: "string" }
        );
    }

    #[test]
    fn test_nullable_column_accepts_absent_payload() {
        let schema = schema(vec![Column::new("c", PxType::FLOAT64).with_nullable(true)]);
        let row = decode_row(&schema, &RowMessage::new(vec![Cell::empty()])).unwrap();
        assert!(row.get("c").unwrap().value().is_null());
    }

    #[test]
    fn test_size_mismatch_reported_before_cell_errors() {
        let schema = schema(vec![
            Column::new("a", PxType::INT64),
            Column::new("b", PxType::INT64),
        ]);
        // The first cell is also bad, but the width check wins.
        for cells in [
            vec![Cell::literal("bad")],
            vec![Cell::literal("bad"), Cell::int64(1), Cell::int64(2)],
        ] {
            let actual = cells.len();
            let err = decode_row(&schema, &RowMessage::new(cells)).unwrap_err();
            assert_eq!(err, ValueDecodeError::SizeMismatch { expected: 2, actual });
        }
    }

    #[test]
    fn test_partial_decode_keeps_prefix_and_names_column() {
        let schema = schema(vec![
            Column::new("service", PxType::SERVICE),
            Column::new("count", PxType::INT64),
            Column::new("ratio", PxType::FLOAT64),
        ]);
        let row = RowMessage::new(vec![
            Cell::string("cart"),
            Cell::literal("99999999999999999999"),
            Cell::float64(0.5),
        ]);
        let partial = decode_row_partial(&schema, &row).unwrap_err();
        assert_eq!(partial.decoded.len(), 1);
        assert_eq!(partial.decoded[0].value().as_str(), Some("cart"));
        assert_eq!(partial.error.column_index(), Some(1));
        assert_eq!(partial.error.px_type(), Some(PxType::INT64));

        // The strict variant reports the same error and nothing else.
        assert_eq!(decode_row(&schema, &row).unwrap_err(), partial.error);
    }

    #[test]
    fn test_row_lookup_and_serialization_order() {
        let schema = schema(vec![
            Column::new("zeta", PxType::STRING),
            Column::new("alpha", PxType::INT64),
        ]);
        let row = decode_row(
            &schema,
            &RowMessage::new(vec![Cell::string("z"), Cell::int64(1)]),
        )
        .unwrap();
        assert_eq!(row.get("alpha").unwrap().value().as_i64(), Some(1));
        assert_eq!(row.get("alpha").unwrap().px_type(), PxType::INT64);
        assert!(row.get("missing").is_none());
        assert_eq!(
            serde_json::to_string(&row).unwrap(),
            r#"{"zeta":"z","alpha":1}"#
        );
    }

    #[test]
    fn test_decode_batch_transposes_columns() {
        let schema = schema(vec![
            Column::new("pod", PxType::POD),
            Column::new("restarts", PxType::INT64),
        ]);
        let batch = RowBatchData {
            table_id: "pods".to_string(),
            cols: vec![
                ColumnData::from(vec![Cell::string("web-0"), Cell::string("web-1")]),
                ColumnData::from(vec![Cell::int64(0), Cell::int64(3)]),
            ],
            num_rows: 2,
            eow: true,
            eos: true,
        };
        let rows = decode_batch(&schema, &batch).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("pod").unwrap().value().as_str(), Some("web-1"));
        assert_eq!(rows[1].get("restarts").unwrap().value().as_i64(), Some(3));
    }

    #[test]
    fn test_decode_batch_validates_shape() {
        let schema = schema(vec![
            Column::new("a", PxType::INT64),
            Column::new("b", PxType::INT64),
        ]);
        let short_column = RowBatchData {
            cols: vec![
                ColumnData::from(vec![Cell::int64(1), Cell::int64(2)]),
                ColumnData::from(vec![Cell::int64(1)]),
            ],
            num_rows: 2,
            ..Default::default()
        };
        assert_eq!(
            decode_batch(&schema, &short_column).unwrap_err(),
            ValueDecodeError::ColumnLength {
                index: 1,
                expected: 2,
                actual: 1
            }
        );

        let missing_column = RowBatchData {
            cols: vec![ColumnData::from(vec![Cell::int64(1)])],
            num_rows: 1,
            ..Default::default()
        };
        assert_eq!(
            decode_batch(&schema, &missing_column).unwrap_err(),
            ValueDecodeError::SizeMismatch {
                expected: 2,
                actual: 1
            }
        );

        let negative = RowBatchData {
            cols: vec![ColumnData::default(), ColumnData::default()],
            num_rows: -1,
            ..Default::default()
        };
        assert_eq!(
            decode_batch(&schema, &negative).unwrap_err(),
            ValueDecodeError::InvalidRowCount(-1)
        );
    }

    #[test]
    fn test_decode_batch_row_count_needs_backing_cells() {
        let empty = schema(Vec::new());
        let huge = RowBatchData {
            num_rows: i64::MAX,
            ..Default::default()
        };
        assert_eq!(
            decode_batch(&empty, &huge).unwrap_err(),
            ValueDecodeError::InvalidRowCount(i64::MAX)
        );

        let none = RowBatchData::default();
        assert!(decode_batch(&empty, &none).unwrap().is_empty());

        let one = schema(vec![Column::new("a", PxType::INT64)]);
        let overstated = RowBatchData {
            cols: vec![ColumnData::from(vec![Cell::int64(1)])],
            num_rows: i64::MAX,
            ..Default::default()
        };
        assert!(matches!(
            decode_batch(&one, &overstated).unwrap_err(),
            ValueDecodeError::ColumnLength { index: 0, actual: 1, .. }
        ));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(
            Value::List(vec![Value::Int64(1), Value::String("a".to_string())]).to_string(),
            "[1, a]"
        );
        assert_eq!(
            Value::StringList(vec!["x".to_string(), "y".to_string()]).to_string(),
            "[x, y]"
        );
    }
}
