// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! The Vis message tree: variables, widgets, global functions and their
//! display specs.
//!
//! The messages are generated from `vis.proto` and (de)serialize as camelCase
//! JSON. Oneof groups are kept as separate optional fields so an invalid
//! "both set" message can still be built and inspected; use the sum-type
//! accessors ([`Widget::func_or_ref`], [`FuncArg::input`], [`Graph::input`])
//! or [`validate`] to check them.

pub mod codec;
pub mod display;
pub mod validate;

use thiserror::Error;

pub use codec::{VisCodec, VisCodecError};
pub use display::{
    AdjacencyList, Axis, Bar, BarChart, DisplaySpec, DisplaySpecError, EdgeThresholds, GaugeChart,
    Graph, GraphInput, Histogram, HistogramChart, PieChart, RequestGraph, StackTraceFlameGraph,
    Stat, StatChart, Table, TextChart, Timeseries, TimeseriesChart, TimeseriesMode, VegaChart,
};
pub use validate::{VisValidationError, validate, validate_all};

pub use crate::proto::px::vispb::{Func, FuncArg, GlobalFunc, Position, Variable, Vis, Widget};
use crate::types::{PxType, tag_from_name, tag_name};

impl Variable {
    pub fn new(name: impl Into<String>, px_type: PxType) -> Self {
        Self {
            name: name.into(),
            px_type: px_type.tag(),
            ..Default::default()
        }
    }

    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = default_value.into();
        self
    }

    pub fn with_valid_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.valid_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// The declared type, if it is one the registry knows.
    pub fn declared_type(&self) -> Option<PxType> {
        PxType::from_tag(self.px_type).ok()
    }
}

impl Func {
    pub fn new(name: impl Into<String>, args: Vec<FuncArg>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgInput<'a> {
    Value(&'a str),
    Variable(&'a str),
}

impl FuncArg {
    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            variable: None,
        }
    }

    pub fn with_variable(name: impl Into<String>, variable: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            variable: Some(variable.into()),
        }
    }

    pub fn input(&self) -> Result<ArgInput<'_>, OneofError> {
        match (&self.value, &self.variable) {
            (Some(value), None) => Ok(ArgInput::Value(value)),
            (None, Some(variable)) => Ok(ArgInput::Variable(variable)),
            (Some(_), Some(_)) => Err(OneofError::Conflict { group: "input" }),
            (None, None) => Err(OneofError::Missing { group: "input" }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FuncOrRef<'a> {
    Func(&'a Func),
    GlobalFunc(&'a str),
}

impl Widget {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_position(mut self, x: i32, y: i32, w: i32, h: i32) -> Self {
        self.position = Some(Position { x, y, w, h });
        self
    }

    /// Bind an inline function, clearing any global reference.
    pub fn with_func(mut self, func: Func) -> Self {
        self.func = Some(func);
        self.global_func_output_name = None;
        self
    }

    /// Bind a global function output, clearing any inline function.
    pub fn with_global_func(mut self, output_name: impl Into<String>) -> Self {
        self.global_func_output_name = Some(output_name.into());
        self.func = None;
        self
    }

    pub fn with_display_spec(mut self, spec: &DisplaySpec) -> Self {
        self.display_spec = Some(spec.to_any());
        self
    }

    pub fn func_or_ref(&self) -> Result<FuncOrRef<'_>, OneofError> {
        match (&self.func, &self.global_func_output_name) {
            (Some(func), None) => Ok(FuncOrRef::Func(func)),
            (None, Some(name)) => Ok(FuncOrRef::GlobalFunc(name)),
            (Some(_), Some(_)) => Err(OneofError::Conflict {
                group: "func_or_ref",
            }),
            (None, None) => Err(OneofError::Missing {
                group: "func_or_ref",
            }),
        }
    }

    /// Decode the attached display spec, if any.
    pub fn display(&self) -> Result<Option<DisplaySpec>, DisplaySpecError> {
        self.display_spec
            .as_ref()
            .map(DisplaySpec::from_any)
            .transpose()
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneofError {
    #[error("oneof {group} has more than one member set")]
    Conflict { group: &'static str },
    #[error("oneof {group} has no member set")]
    Missing { group: &'static str },
}

/// Enumerations travel as their canonical name in JSON. Unknown numbers are
/// kept as numbers so nothing is lost.
pub(crate) mod enum_json {
    use serde::de::{Deserialize, Deserializer, Error as _};
    use serde::ser::Serializer;

    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum NameOrNumber {
        Name(String),
        Number(i32),
    }

    pub(crate) fn serialize<S: Serializer>(
        value: i32,
        name: Option<&'static str>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match name {
            Some(name) => serializer.serialize_str(name),
            None => serializer.serialize_i32(value),
        }
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
        from_name: fn(&str) -> Option<i32>,
    ) -> Result<i32, D::Error> {
        match NameOrNumber::deserialize(deserializer)? {
            NameOrNumber::Number(value) => Ok(value),
            NameOrNumber::Name(name) => {
                from_name(&name).ok_or_else(|| D::Error::custom(format!("unknown enum value {name:?}")))
            }
        }
    }
}

pub(crate) mod px_type_name {
    use serde::{Deserializer, Serializer};

    use super::{enum_json, tag_from_name, tag_name};

    pub(crate) fn serialize<S: Serializer>(tag: &i32, serializer: S) -> Result<S::Ok, S::Error> {
        enum_json::serialize(*tag, tag_name(*tag), serializer)
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
        enum_json::deserialize(deserializer, tag_from_name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_widget_builders_keep_oneof_exclusive() {
        let widget = Widget::new("w")
            .with_global_func("shared")
            .with_func(Func::new("px.f", Vec::new()));
        assert!(widget.global_func_output_name.is_none());
        assert!(matches!(widget.func_or_ref(), Ok(FuncOrRef::Func(f)) if f.name == "px.f"));

        let widget = widget.with_global_func("shared");
        assert!(widget.func.is_none());
        assert_eq!(widget.func_or_ref(), Ok(FuncOrRef::GlobalFunc("shared")));
    }

    #[test]
    fn test_widget_with_both_members_is_constructible() {
        let mut widget = Widget::new("both").with_func(Func::new("px.f", Vec::new()));
        widget.global_func_output_name = Some("shared".to_string());
        assert_eq!(
            widget.func_or_ref(),
            Err(OneofError::Conflict {
                group: "func_or_ref"
            })
        );
        assert_eq!(
            Widget::new("none").func_or_ref(),
            Err(OneofError::Missing {
                group: "func_or_ref"
            })
        );
    }

    #[test]
    fn test_func_arg_input() {
        assert_eq!(
            FuncArg::with_value("start", "-5m").input(),
            Ok(ArgInput::Value("-5m"))
        );
        assert_eq!(
            FuncArg::with_variable("ns", "namespace").input(),
            Ok(ArgInput::Variable("namespace"))
        );
        let both = FuncArg {
            name: "x".to_string(),
            value: Some("1".to_string()),
            variable: Some("v".to_string()),
        };
        assert_eq!(both.input(), Err(OneofError::Conflict { group: "input" }));
    }

    #[test]
    fn test_oneof_member_tags_match_wire() {
        let widget = Widget::new("w").with_global_func("shared");
        let bytes = widget.encode_to_vec();
        // field 5, length-delimited
        assert!(bytes.windows(2).any(|w| w == [0x2a, 6]));
        assert_eq!(Widget::decode(bytes.as_slice()).unwrap(), widget);
    }

    #[test]
    fn test_variable_json_uses_type_names() {
        let variable = Variable::new("namespace", PxType::NAMESPACE)
            .with_default("default")
            .with_valid_values(["default", "kube-system"]);
        let json = serde_json::to_value(&variable).unwrap();
        assert_eq!(json["type"], "PX_NAMESPACE");
        assert_eq!(json["defaultValue"], "default");
        assert_eq!(json["validValues"][1], "kube-system");

        let back: Variable = serde_json::from_value(json).unwrap();
        assert_eq!(back, variable);
        assert_eq!(back.declared_type(), Some(PxType::NAMESPACE));
    }

    #[test]
    fn test_variable_json_rejects_unknown_type_name() {
        let result = serde_json::from_str::<Variable>(r#"{"name":"a","type":"PX_BLOB"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_variable_tag_survives_json() {
        let variable = Variable {
            name: "odd".to_string(),
            px_type: 42,
            ..Default::default()
        };
        let json = serde_json::to_string(&variable).unwrap();
        assert!(json.contains(r#""type":42"#));
        let back: Variable = serde_json::from_str(&json).unwrap();
        assert_eq!(back.px_type, 42);
        assert_eq!(back.declared_type(), None);
    }
}
