// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::path::PathBuf;

const PROTOS: &[&str] = &[
    "../proto/resultset.proto",
    "../proto/status.proto",
    "../proto/uuid.proto",
    "../proto/vis.proto",
];

// Members of the vis oneof groups and message-typed fields, which are left
// out of JSON when unset.
const SKIP_WHEN_UNSET: &[&str] = &[
    ".px.vispb.GlobalFunc.func",
    ".px.vispb.FuncArg.value",
    ".px.vispb.FuncArg.variable",
    ".px.vispb.Widget.position",
    ".px.vispb.Widget.func",
    ".px.vispb.Widget.global_func_output_name",
    ".px.vispb.BarChart.bar",
    ".px.vispb.BarChart.x_axis",
    ".px.vispb.BarChart.y_axis",
    ".px.vispb.HistogramChart.histogram",
    ".px.vispb.HistogramChart.x_axis",
    ".px.vispb.HistogramChart.y_axis",
    ".px.vispb.TimeseriesChart.x_axis",
    ".px.vispb.TimeseriesChart.y_axis",
    ".px.vispb.StatChart.stat",
    ".px.vispb.Graph.dot_column",
    ".px.vispb.Graph.adjacency_list",
    ".px.vispb.Graph.edge_thresholds",
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut includes = vec![PathBuf::from("../proto")];
    // A protoc from the environment wins; otherwise use the bundled one,
    // which does not find the well-known types on its own.
    if std::env::var_os("PROTOC").is_none() {
        let protoc = protoc_bin_vendored::protoc_bin_path()?;
        // SAFETY: build scripts are single threaded.
        unsafe { std::env::set_var("PROTOC", protoc) };
        includes.push(protoc_bin_vendored::include_path()?);
    }

    let mut builder = tonic_prost_build::configure()
        .build_client(false)
        .build_server(false)
        .message_attribute(".px.vispb", "#[derive(serde::Serialize, serde::Deserialize)]")
        .message_attribute(".px.vispb", "#[serde(rename_all = \"camelCase\", default)]")
        .field_attribute(
            ".px.vispb.Variable.px_type",
            "#[serde(rename = \"type\", with = \"crate::vis::px_type_name\")]",
        )
        .field_attribute(
            ".px.vispb.Widget.display_spec",
            "#[serde(skip_serializing_if = \"Option::is_none\", with = \"crate::vis::display::any_json\")]",
        )
        .field_attribute(
            ".px.vispb.Timeseries.mode",
            "#[serde(with = \"crate::vis::display::mode_name\")]",
        );
    for field in SKIP_WHEN_UNSET {
        builder = builder.field_attribute(*field, "#[serde(skip_serializing_if = \"Option::is_none\")]");
    }
    let protos: Vec<PathBuf> = PROTOS.iter().map(PathBuf::from).collect();
    builder.compile_protos(protos.as_slice(), includes.as_slice())?;

    for proto in PROTOS {
        println!("cargo:rerun-if-changed={proto}");
    }
    Ok(())
}
