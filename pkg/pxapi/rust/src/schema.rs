// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::collections::HashMap;

use log::debug;
use prost::Message;

use crate::errors::SchemaDecodeError;
use crate::proto::{ColumnDescriptor, SchemaMessage};
use crate::types::PxType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    px_type: PxType,
    nullable: bool,
    description: String,
}

impl Column {
    pub fn new(name: impl Into<String>, px_type: PxType) -> Self {
        Self {
            name: name.into(),
            px_type,
            nullable: false,
            description: String::new(),
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn px_type(&self) -> PxType {
        self.px_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    fn to_descriptor(&self) -> ColumnDescriptor {
        ColumnDescriptor {
            name: self.name.clone(),
            px_type: self.px_type.tag(),
            nullable: self.nullable,
            description: self.description.clone(),
        }
    }
}

/// Ordered, immutable description of a result table's columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    table_name: String,
    columns: Vec<Column>,
    index_by_name: HashMap<String, usize>,
}

impl ColumnSchema {
    /// Build a schema, rejecting empty and duplicate column names.
    pub fn new(
        table_name: impl Into<String>,
        columns: Vec<Column>,
    ) -> Result<Self, SchemaDecodeError> {
        let mut index_by_name = HashMap::with_capacity(columns.len());
        for (index, column) in columns.iter().enumerate() {
            if column.name.is_empty() {
                return Err(SchemaDecodeError::MissingName { index });
            }
            if index_by_name.insert(column.name.clone(), index).is_some() {
                return Err(SchemaDecodeError::DuplicateName {
                    index,
                    name: column.name.clone(),
                });
            }
        }
        Ok(Self {
            table_name: table_name.into(),
            columns,
            index_by_name,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index_by_name.get(name).copied()
    }

    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.index_of(name).and_then(|index| self.column(index))
    }

    pub fn to_message(&self) -> SchemaMessage {
        SchemaMessage {
            table_name: self.table_name.clone(),
            columns: self.columns.iter().map(Column::to_descriptor).collect(),
        }
    }
}

impl TryFrom<&SchemaMessage> for ColumnSchema {
    type Error = SchemaDecodeError;

    fn try_from(message: &SchemaMessage) -> Result<Self, Self::Error> {
        decode_schema(message)
    }
}

/// Decode a wire schema, keeping column order exactly as received.
pub fn decode_schema(message: &SchemaMessage) -> Result<ColumnSchema, SchemaDecodeError> {
    let columns = message
        .columns
        .iter()
        .enumerate()
        .map(|(index, descriptor)| {
            if descriptor.name.is_empty() {
                return Err(SchemaDecodeError::MissingName { index });
            }
            let px_type = PxType::from_tag(descriptor.px_type).map_err(|source| {
                SchemaDecodeError::UnknownType {
                    index,
                    name: descriptor.name.clone(),
                    source,
                }
            })?;
            Ok(Column {
                name: descriptor.name.clone(),
                px_type,
                nullable: descriptor.nullable,
                description: descriptor.description.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let schema = ColumnSchema::new(message.table_name.clone(), columns)?;
    debug!(
        "decoded schema for table {:?} with {} columns",
        schema.table_name(),
        schema.len()
    );
    Ok(schema)
}

pub fn decode_schema_bytes(buf: &[u8]) -> Result<ColumnSchema, SchemaDecodeError> {
    let message = SchemaMessage::decode(buf)?;
    decode_schema(&message)
}
