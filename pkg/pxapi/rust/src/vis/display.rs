// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Display specs attached to widgets.
//!
//! On the wire a widget carries its display spec as a `google.protobuf.Any`
//! whose type URL names the chart message. In JSON the same spec is an
//! object tagged with `@type`.

use prost::Message;
use prost_types::Any;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::OneofError;

pub const TYPE_URL_PREFIX: &str = "types.px.dev/px.vispb.";

pub use crate::proto::px::vispb::timeseries::Mode as TimeseriesMode;
pub use crate::proto::px::vispb::{
    AdjacencyList, Axis, Bar, BarChart, EdgeThresholds, GaugeChart, Graph, Histogram,
    HistogramChart, PieChart, RequestGraph, StackTraceFlameGraph, Stat, StatChart, Table,
    TextChart, Timeseries, TimeseriesChart, VegaChart,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GraphInput<'a> {
    DotColumn(&'a str),
    AdjacencyList(&'a AdjacencyList),
}

impl Graph {
    pub fn input(&self) -> Result<GraphInput<'_>, OneofError> {
        match (&self.dot_column, &self.adjacency_list) {
            (Some(column), None) => Ok(GraphInput::DotColumn(column)),
            (None, Some(list)) => Ok(GraphInput::AdjacencyList(list)),
            (Some(_), Some(_)) => Err(OneofError::Conflict { group: "input" }),
            (None, None) => Err(OneofError::Missing { group: "input" }),
        }
    }
}

/// Every display spec a widget may carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type")]
pub enum DisplaySpec {
    #[serde(rename = "types.px.dev/px.vispb.BarChart")]
    BarChart(BarChart),
    #[serde(rename = "types.px.dev/px.vispb.PieChart")]
    PieChart(PieChart),
    #[serde(rename = "types.px.dev/px.vispb.HistogramChart")]
    HistogramChart(HistogramChart),
    #[serde(rename = "types.px.dev/px.vispb.GaugeChart")]
    GaugeChart(GaugeChart),
    #[serde(rename = "types.px.dev/px.vispb.TimeseriesChart")]
    TimeseriesChart(TimeseriesChart),
    #[serde(rename = "types.px.dev/px.vispb.StatChart")]
    StatChart(StatChart),
    #[serde(rename = "types.px.dev/px.vispb.TextChart")]
    TextChart(TextChart),
    #[serde(rename = "types.px.dev/px.vispb.VegaChart")]
    VegaChart(VegaChart),
    #[serde(rename = "types.px.dev/px.vispb.Table")]
    Table(Table),
    #[serde(rename = "types.px.dev/px.vispb.Graph")]
    Graph(Graph),
    #[serde(rename = "types.px.dev/px.vispb.RequestGraph")]
    RequestGraph(RequestGraph),
    #[serde(rename = "types.px.dev/px.vispb.StackTraceFlameGraph")]
    StackTraceFlameGraph(StackTraceFlameGraph),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DisplaySpecError {
    #[error("unsupported display spec type {0:?}")]
    UnknownTypeUrl(String),
    #[error("malformed {type_url}: {source}")]
    Decode {
        type_url: String,
        source: prost::DecodeError,
    },
}

impl DisplaySpec {
    /// Short message name, e.g. `TimeseriesChart`.
    pub fn message_name(&self) -> &'static str {
        match self {
            Self::BarChart(_) => "BarChart",
            Self::PieChart(_) => "PieChart",
            Self::HistogramChart(_) => "HistogramChart",
            Self::GaugeChart(_) => "GaugeChart",
            Self::TimeseriesChart(_) => "TimeseriesChart",
            Self::StatChart(_) => "StatChart",
            Self::TextChart(_) => "TextChart",
            Self::VegaChart(_) => "VegaChart",
            Self::Table(_) => "Table",
            Self::Graph(_) => "Graph",
            Self::RequestGraph(_) => "RequestGraph",
            Self::StackTraceFlameGraph(_) => "StackTraceFlameGraph",
        }
    }

    pub fn type_url(&self) -> String {
        format!("{TYPE_URL_PREFIX}{}", self.message_name())
    }

    pub fn to_any(&self) -> Any {
        let value = match self {
            Self::BarChart(m) => m.encode_to_vec(),
            Self::PieChart(m) => m.encode_to_vec(),
            Self::HistogramChart(m) => m.encode_to_vec(),
            Self::GaugeChart(m) => m.encode_to_vec(),
            Self::TimeseriesChart(m) => m.encode_to_vec(),
            Self::StatChart(m) => m.encode_to_vec(),
            Self::TextChart(m) => m.encode_to_vec(),
            Self::VegaChart(m) => m.encode_to_vec(),
            Self::Table(m) => m.encode_to_vec(),
            Self::Graph(m) => m.encode_to_vec(),
            Self::RequestGraph(m) => m.encode_to_vec(),
            Self::StackTraceFlameGraph(m) => m.encode_to_vec(),
        };
        Any {
            type_url: self.type_url(),
            value,
        }
    }

    pub fn from_any(any: &Any) -> Result<Self, DisplaySpecError> {
        let name = any
            .type_url
            .strip_prefix(TYPE_URL_PREFIX)
            .ok_or_else(|| DisplaySpecError::UnknownTypeUrl(any.type_url.clone()))?;
        let buf = any.value.as_slice();
        let decoded = match name {
            "BarChart" => BarChart::decode(buf).map(Self::BarChart),
            "PieChart" => PieChart::decode(buf).map(Self::PieChart),
            "HistogramChart" => HistogramChart::decode(buf).map(Self::HistogramChart),
            "GaugeChart" => GaugeChart::decode(buf).map(Self::GaugeChart),
            "TimeseriesChart" => TimeseriesChart::decode(buf).map(Self::TimeseriesChart),
            "StatChart" => StatChart::decode(buf).map(Self::StatChart),
            "TextChart" => TextChart::decode(buf).map(Self::TextChart),
            "VegaChart" => VegaChart::decode(buf).map(Self::VegaChart),
            "Table" => Table::decode(buf).map(Self::Table),
            "Graph" => Graph::decode(buf).map(Self::Graph),
            "RequestGraph" => RequestGraph::decode(buf).map(Self::RequestGraph),
            "StackTraceFlameGraph" => {
                StackTraceFlameGraph::decode(buf).map(Self::StackTraceFlameGraph)
            }
            _ => return Err(DisplaySpecError::UnknownTypeUrl(any.type_url.clone())),
        };
        decoded.map_err(|source| DisplaySpecError::Decode {
            type_url: any.type_url.clone(),
            source,
        })
    }
}

/// JSON form of `Widget.display_spec`: the `Any` is expanded into its
/// `@type`-tagged message.
pub(crate) mod any_json {
    use prost_types::Any;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::DisplaySpec;

    pub(crate) fn serialize<S: Serializer>(
        any: &Option<Any>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match any {
            None => serializer.serialize_none(),
            Some(any) => DisplaySpec::from_any(any)
                .map_err(S::Error::custom)?
                .serialize(serializer),
        }
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Any>, D::Error> {
        Option::<DisplaySpec>::deserialize(deserializer).map(|spec| spec.as_ref().map(DisplaySpec::to_any))
    }
}

pub(crate) mod mode_name {
    use serde::{Deserializer, Serializer};

    use super::TimeseriesMode;
    use crate::vis::enum_json;

    pub(crate) fn serialize<S: Serializer>(mode: &i32, serializer: S) -> Result<S::Ok, S::Error> {
        let name = TimeseriesMode::try_from(*mode)
            .ok()
            .map(|mode| mode.as_str_name());
        enum_json::serialize(*mode, name, serializer)
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
        enum_json::deserialize(deserializer, |name| {
            TimeseriesMode::from_str_name(name).map(i32::from)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use super::*;

    fn latency_chart() -> DisplaySpec {
        DisplaySpec::TimeseriesChart(TimeseriesChart {
            timeseries: vec![Timeseries {
                value: "latency_p99".to_string(),
                series: "service".to_string(),
                stack_by_series: false,
                mode: TimeseriesMode::Line.into(),
            }],
            title: "p99 latency".to_string(),
            x_axis: None,
            y_axis: Some(Axis {
                label: "ms".to_string(),
            }),
        })
    }

    #[test]
    fn test_any_round_trip_keeps_type_url() {
        let spec = latency_chart();
        let any = spec.to_any();
        assert_eq!(any.type_url, "types.px.dev/px.vispb.TimeseriesChart");
        assert_eq!(DisplaySpec::from_any(&any).unwrap(), spec);
    }

    #[test]
    fn test_unknown_type_url_is_rejected() {
        let any = Any {
            type_url: "types.px.dev/px.vispb.Sparkline".to_string(),
            value: Vec::new(),
        };
        assert_eq!(
            DisplaySpec::from_any(&any),
            Err(DisplaySpecError::UnknownTypeUrl(any.type_url.clone()))
        );
        let foreign = Any {
            type_url: "type.googleapis.com/google.protobuf.Empty".to_string(),
            value: Vec::new(),
        };
        assert!(matches!(
            DisplaySpec::from_any(&foreign),
            Err(DisplaySpecError::UnknownTypeUrl(_))
        ));
    }

    #[test]
    fn test_malformed_payload_is_a_decode_error() {
        let any = Any {
            type_url: "types.px.dev/px.vispb.Table".to_string(),
            value: vec![0xff, 0xff],
        };
        assert!(matches!(
            DisplaySpec::from_any(&any),
            Err(DisplaySpecError::Decode { .. })
        ));
    }

    #[test]
    fn test_json_is_tagged_with_type_url() {
        let json = serde_json::to_value(latency_chart()).unwrap();
        assert_eq!(json["@type"], "types.px.dev/px.vispb.TimeseriesChart");
        assert_eq!(json["timeseries"][0]["mode"], "MODE_LINE");
        assert_eq!(json["timeseries"][0]["stackBySeries"], false);
        assert_eq!(json["yAxis"]["label"], "ms");
        assert!(json.get("xAxis").is_none());

        let back: DisplaySpec = serde_json::from_value(json).unwrap();
        assert_eq!(back, latency_chart());
    }

    #[test]
    fn test_graph_input_oneof() {
        let mut graph = Graph {
            dot_column: Some("dot".to_string()),
            ..Default::default()
        };
        assert_eq!(graph.input(), Ok(GraphInput::DotColumn("dot")));

        graph.adjacency_list = Some(AdjacencyList {
            from_column: "src".to_string(),
            to_column: "dst".to_string(),
        });
        assert_eq!(graph.input(), Err(OneofError::Conflict { group: "input" }));

        graph.dot_column = None;
        assert!(matches!(
            graph.input(),
            Ok(GraphInput::AdjacencyList(list)) if list.to_column == "dst"
        ));
    }

    #[test]
    fn test_request_graph_json_names() {
        let spec = DisplaySpec::RequestGraph(RequestGraph {
            requestor_pod_column: "requestor_pod".to_string(),
            p99_column: "latency_p99".to_string(),
            ..Default::default()
        });
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["requestorPodColumn"], "requestor_pod");
        assert_eq!(json["p99Column"], "latency_p99");
    }

    #[test]
    fn test_unknown_mode_name_is_rejected() {
        let result = serde_json::from_str::<Timeseries>(r#"{"value":"v","mode":"MODE_BUBBLE"}"#);
        assert!(result.is_err());
    }
}
