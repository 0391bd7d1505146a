// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Conversions between textual UUIDs and their protobuf form.
//!
//! The protobuf form splits the 128 bits into big-endian `high_bits` and
//! `low_bits`. Older producers sent the raw 16 bytes in `data` instead; both
//! are accepted on read, only the halves are written.

use ::uuid::Uuid;
use log::warn;
use thiserror::Error;

use crate::proto::UuidProto;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidUuid {
    #[error("invalid UUID {input:?}: {source}")]
    Parse { input: String, source: ::uuid::Error },
    #[error("UUID bytes must be 16 long, got {0}")]
    Length(usize),
}

pub fn parse(input: &str) -> Result<Uuid, InvalidUuid> {
    Uuid::parse_str(input).map_err(|source| InvalidUuid::Parse {
        input: input.to_string(),
        source,
    })
}

/// Lowercase hyphenated form.
pub fn format(id: &Uuid) -> String {
    id.hyphenated().to_string()
}

pub fn to_proto(id: &Uuid) -> UuidProto {
    let (high_bits, low_bits) = id.as_u64_pair();
    UuidProto {
        data: Vec::new(),
        high_bits,
        low_bits,
    }
}

pub fn from_proto(proto: &UuidProto) -> Result<Uuid, InvalidUuid> {
    if proto.high_bits == 0 && proto.low_bits == 0 && !proto.data.is_empty() {
        return from_bytes(&proto.data);
    }
    Ok(Uuid::from_u64_pair(proto.high_bits, proto.low_bits))
}

pub fn to_bytes(id: &Uuid) -> [u8; 16] {
    *id.as_bytes()
}

pub fn from_bytes(bytes: &[u8]) -> Result<Uuid, InvalidUuid> {
    Uuid::from_slice(bytes).map_err(|_| InvalidUuid::Length(bytes.len()))
}

pub fn proto_from_str(input: &str) -> Result<UuidProto, InvalidUuid> {
    parse(input).map(|id| to_proto(&id))
}

pub fn proto_to_string(proto: &UuidProto) -> Result<String, InvalidUuid> {
    from_proto(proto).map(|id| format(&id))
}

/// Like [`proto_from_str`], but an unparsable string becomes the nil UUID.
pub fn proto_from_str_or_nil(input: &str) -> UuidProto {
    proto_from_str(input).unwrap_or_else(|err| {
        warn!("{err}; using nil UUID");
        to_proto(&Uuid::nil())
    })
}

/// Like [`from_proto`], but a malformed message becomes the nil UUID.
pub fn from_proto_or_nil(proto: &UuidProto) -> Uuid {
    from_proto(proto).unwrap_or_else(|err| {
        warn!("{err}; using nil UUID");
        Uuid::nil()
    })
}
