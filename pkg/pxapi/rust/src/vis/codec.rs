// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use log::debug;
use prost::Message;
use thiserror::Error;

use super::Vis;
use super::validate::{VisValidationError, validate};

#[derive(Error, Debug)]
pub enum VisCodecError {
    #[error("invalid vis: {0}")]
    Invalid(#[from] VisValidationError),
    #[error("vis json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("vis protobuf: {0}")]
    Wire(#[from] prost::DecodeError),
}

/// Converts a [`Vis`] to and from its JSON and protobuf forms.
///
/// With `validate` set, a model failing [`validate`] is refused in both
/// directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisCodec {
    pub validate: bool,
}

impl Default for VisCodec {
    fn default() -> Self {
        Self { validate: true }
    }
}

impl VisCodec {
    pub fn new(validate: bool) -> Self {
        Self { validate }
    }

    /// A codec that passes any structurally decodable model through.
    pub fn permissive() -> Self {
        Self::new(false)
    }

    fn check(&self, vis: &Vis) -> Result<(), VisCodecError> {
        if self.validate {
            validate(vis)?;
        }
        Ok(())
    }

    pub fn to_json(&self, vis: &Vis) -> Result<String, VisCodecError> {
        self.check(vis)?;
        Ok(serde_json::to_string(vis)?)
    }

    pub fn to_json_pretty(&self, vis: &Vis) -> Result<String, VisCodecError> {
        self.check(vis)?;
        Ok(serde_json::to_string_pretty(vis)?)
    }

    pub fn from_json(&self, json: &str) -> Result<Vis, VisCodecError> {
        let vis: Vis = serde_json::from_str(json)?;
        self.check(&vis)?;
        debug!(
            "parsed vis json: {} variables, {} widgets, {} global funcs",
            vis.variables.len(),
            vis.widgets.len(),
            vis.global_funcs.len()
        );
        Ok(vis)
    }

    pub fn encode(&self, vis: &Vis) -> Result<Vec<u8>, VisCodecError> {
        self.check(vis)?;
        Ok(vis.encode_to_vec())
    }

    pub fn decode(&self, buf: &[u8]) -> Result<Vis, VisCodecError> {
        let vis = Vis::decode(buf)?;
        self.check(&vis)?;
        debug!(
            "decoded vis protobuf: {} variables, {} widgets, {} global funcs",
            vis.variables.len(),
            vis.widgets.len(),
            vis.global_funcs.len()
        );
        Ok(vis)
    }
}
