// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Registry of the value kinds a result column (or a Vis variable) can hold.
//!
//! A [`PxType`] has two axes: the primitive it is encoded as on the wire, and
//! an optional semantic alias that only matters to renderers. Decoders branch
//! on [`PxType::wire_primitive`], renderers on [`PxType::semantic`].

use std::fmt;

use phf::phf_map;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::UnknownType;

/// Wire encodings a scalar value can take.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Primitive {
    Boolean,
    Int64,
    Float64,
    String,
}

impl Primitive {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "BOOLEAN",
            Self::Int64 => "INT64",
            Self::Float64 => "FLOAT64",
            Self::String => "STRING",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic aliases. Each one is carried on the wire as exactly one primitive.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SemanticAlias {
    Service,
    Pod,
    Container,
    Namespace,
    Node,
}

impl SemanticAlias {
    pub const fn wire_primitive(self) -> Primitive {
        match self {
            Self::Service | Self::Pod | Self::Container | Self::Namespace | Self::Node => {
                Primitive::String
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Pod => "pod",
            Self::Container => "container",
            Self::Namespace => "namespace",
            Self::Node => "node",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PxType {
    Primitive(Primitive),
    Semantic(SemanticAlias),
    /// Ordered sequence of scalars, each typed by its own payload.
    List,
    /// Ordered sequence of strings.
    StringList,
}

impl PxType {
    pub const BOOLEAN: PxType = PxType::Primitive(Primitive::Boolean);
    pub const INT64: PxType = PxType::Primitive(Primitive::Int64);
    pub const FLOAT64: PxType = PxType::Primitive(Primitive::Float64);
    pub const STRING: PxType = PxType::Primitive(Primitive::String);
    pub const SERVICE: PxType = PxType::Semantic(SemanticAlias::Service);
    pub const POD: PxType = PxType::Semantic(SemanticAlias::Pod);
    pub const CONTAINER: PxType = PxType::Semantic(SemanticAlias::Container);
    pub const NAMESPACE: PxType = PxType::Semantic(SemanticAlias::Namespace);
    pub const NODE: PxType = PxType::Semantic(SemanticAlias::Node);
    pub const LIST: PxType = PxType::List;
    pub const STRING_LIST: PxType = PxType::StringList;

    /// Every registered type, in tag order.
    pub const ALL: [PxType; 11] = [
        Self::BOOLEAN,
        Self::INT64,
        Self::FLOAT64,
        Self::STRING,
        Self::SERVICE,
        Self::POD,
        Self::CONTAINER,
        Self::NAMESPACE,
        Self::NODE,
        Self::LIST,
        Self::STRING_LIST,
    ];

    pub const fn tag(self) -> i32 {
        match self {
            Self::Primitive(Primitive::Boolean) => 1,
            Self::Primitive(Primitive::Int64) => 2,
            Self::Primitive(Primitive::Float64) => 3,
            Self::Primitive(Primitive::String) => 4,
            Self::Semantic(SemanticAlias::Service) => 1000,
            Self::Semantic(SemanticAlias::Pod) => 1001,
            Self::Semantic(SemanticAlias::Container) => 1002,
            Self::Semantic(SemanticAlias::Namespace) => 1003,
            Self::Semantic(SemanticAlias::Node) => 1004,
            Self::List => 2000,
            Self::StringList => 2001,
        }
    }

    pub fn from_tag(tag: i32) -> Result<Self, UnknownType> {
        match tag {
            1 => Ok(Self::BOOLEAN),
            2 => Ok(Self::INT64),
            3 => Ok(Self::FLOAT64),
            4 => Ok(Self::STRING),
            1000 => Ok(Self::SERVICE),
            1001 => Ok(Self::POD),
            1002 => Ok(Self::CONTAINER),
            1003 => Ok(Self::NAMESPACE),
            1004 => Ok(Self::NODE),
            2000 => Ok(Self::LIST),
            2001 => Ok(Self::STRING_LIST),
            _ => Err(UnknownType::Tag(tag)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Primitive(Primitive::Boolean) => "PX_BOOLEAN",
            Self::Primitive(Primitive::Int64) => "PX_INT64",
            Self::Primitive(Primitive::Float64) => "PX_FLOAT64",
            Self::Primitive(Primitive::String) => "PX_STRING",
            Self::Semantic(SemanticAlias::Service) => "PX_SERVICE",
            Self::Semantic(SemanticAlias::Pod) => "PX_POD",
            Self::Semantic(SemanticAlias::Container) => "PX_CONTAINER",
            Self::Semantic(SemanticAlias::Namespace) => "PX_NAMESPACE",
            Self::Semantic(SemanticAlias::Node) => "PX_NODE",
            Self::List => "PX_LIST",
            Self::StringList => "PX_STRING_LIST",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, UnknownType> {
        PX_TYPES_BY_NAME
            .get(name)
            .copied()
            .ok_or_else(|| UnknownType::Name(name.to_string()))
    }

    /// Primitive encoding of scalar kinds; `None` for list kinds.
    pub const fn wire_primitive(self) -> Option<Primitive> {
        match self {
            Self::Primitive(p) => Some(p),
            Self::Semantic(alias) => Some(alias.wire_primitive()),
            Self::List | Self::StringList => None,
        }
    }

    pub const fn semantic(self) -> Option<SemanticAlias> {
        match self {
            Self::Semantic(alias) => Some(alias),
            _ => None,
        }
    }

    pub const fn is_semantic(self) -> bool {
        matches!(self, Self::Semantic(_))
    }

    pub const fn is_list(self) -> bool {
        matches!(self, Self::List | Self::StringList)
    }
}

static PX_TYPES_BY_NAME: phf::Map<&'static str, PxType> = phf_map! {
    "PX_BOOLEAN" => PxType::BOOLEAN,
    "PX_INT64" => PxType::INT64,
    "PX_FLOAT64" => PxType::FLOAT64,
    "PX_STRING" => PxType::STRING,
    "PX_SERVICE" => PxType::SERVICE,
    "PX_POD" => PxType::POD,
    "PX_CONTAINER" => PxType::CONTAINER,
    "PX_NAMESPACE" => PxType::NAMESPACE,
    "PX_NODE" => PxType::NODE,
    "PX_LIST" => PxType::LIST,
    "PX_STRING_LIST" => PxType::STRING_LIST,
};

impl fmt::Display for PxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<i32> for PxType {
    type Error = UnknownType;

    fn try_from(tag: i32) -> Result<Self, Self::Error> {
        Self::from_tag(tag)
    }
}

impl Serialize for PxType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for PxType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::from_name(&name).map_err(serde::de::Error::custom)
    }
}

/// Protobuf enumeration backing `PxType` fields inside wire messages.
///
/// `Unknown` is the proto3 default and never a valid [`PxType`].
pub use crate::proto::PxTypeTag;

/// Canonical name for a raw tag, including the `PX_UNKNOWN` default.
pub fn tag_name(tag: i32) -> Option<&'static str> {
    if tag == PxTypeTag::Unknown as i32 {
        return Some("PX_UNKNOWN");
    }
    PxType::from_tag(tag).ok().map(PxType::name)
}

/// Inverse of [`tag_name`].
pub fn tag_from_name(name: &str) -> Option<i32> {
    if name == "PX_UNKNOWN" {
        return Some(PxTypeTag::Unknown as i32);
    }
    PxType::from_name(name).ok().map(PxType::tag)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag_round_trips_every_registered_type() {
        for px_type in PxType::ALL {
            assert_eq!(PxType::from_tag(px_type.tag()).unwrap(), px_type);
            assert_eq!(PxType::from_name(px_type.name()).unwrap(), px_type);
        }
    }

    #[test]
    fn test_from_tag_rejects_tags_outside_registry() {
        for tag in [0, 5, -1, 999, 1005, 2002, i32::MAX] {
            assert_eq!(PxType::from_tag(tag), Err(UnknownType::Tag(tag)));
        }
    }

    #[test]
    fn test_from_name_rejects_unknown_names() {
        assert_eq!(
            PxType::from_name("PX_UNKNOWN"),
            Err(UnknownType::Name("PX_UNKNOWN".to_string()))
        );
        assert!(PxType::from_name("px_string").is_err());
    }

    #[test]
    fn test_tags_match_wire_enumeration() {
        for px_type in PxType::ALL {
            let tag = PxTypeTag::try_from(px_type.tag()).unwrap();
            assert_eq!(tag as i32, px_type.tag());
        }
        assert_eq!(PxTypeTag::default(), PxTypeTag::Unknown);
    }

    #[test]
    fn test_semantic_aliases_are_strings_on_the_wire() {
        for px_type in PxType::ALL.into_iter().filter(|t| t.is_semantic()) {
            assert_eq!(px_type.wire_primitive(), Some(Primitive::String));
            assert!(px_type.semantic().is_some());
        }
        assert_eq!(PxType::INT64.semantic(), None);
        assert_eq!(PxType::INT64.wire_primitive(), Some(Primitive::Int64));
    }

    #[test]
    fn test_list_kinds_have_no_wire_primitive() {
        assert!(PxType::LIST.is_list());
        assert!(PxType::STRING_LIST.is_list());
        assert_eq!(PxType::LIST.wire_primitive(), None);
        assert!(!PxType::STRING.is_list());
    }

    #[test]
    fn test_display_uses_canonical_name() {
        assert_eq!(PxType::POD.to_string(), "PX_POD");
        assert_eq!(PxType::STRING_LIST.to_string(), "PX_STRING_LIST");
    }

    #[test]
    fn test_tag_name_includes_unknown_default() {
        assert_eq!(tag_name(0), Some("PX_UNKNOWN"));
        assert_eq!(tag_name(1003), Some("PX_NAMESPACE"));
        assert_eq!(tag_name(42), None);
        assert_eq!(tag_from_name("PX_UNKNOWN"), Some(0));
        assert_eq!(tag_from_name("PX_NODE"), Some(1004));
        assert_eq!(tag_from_name("PX_NOPE"), None);
    }

    #[test]
    fn test_serde_uses_names() {
        let json = serde_json::to_string(&PxType::SERVICE).unwrap();
        assert_eq!(json, "\"PX_SERVICE\"");
        let back: PxType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PxType::SERVICE);
        assert!(serde_json::from_str::<PxType>("\"PX_BLOB\"").is_err());
    }
}
