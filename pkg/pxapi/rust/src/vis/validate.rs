// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Structural checks over a [`Vis`]. Nothing here runs at construction
//! time; callers opt in through [`validate`] or a validating [`VisCodec`].
//!
//! [`VisCodec`]: super::VisCodec

use std::collections::HashSet;

use log::warn;
use thiserror::Error;

use super::display::{DisplaySpec, DisplaySpecError};
use super::{ArgInput, Func, OneofError, Vis, Widget};
use crate::types::PxType;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VisValidationError {
    #[error("widget {widget}: {source}")]
    WidgetInput { widget: String, source: OneofError },
    #[error("widget {widget}: no global func with output name {output_name:?}")]
    UnresolvedGlobalFunc { widget: String, output_name: String },
    #[error("duplicate variable {0:?}")]
    DuplicateVariable(String),
    #[error("duplicate global func output name {0:?}")]
    DuplicateGlobalFunc(String),
    #[error("global func {0:?} has no func")]
    EmptyGlobalFunc(String),
    #[error("variable {variable:?} has unknown type tag {tag}")]
    UnknownVariableType { variable: String, tag: i32 },
    #[error("variable {variable:?}: default {default:?} is not one of its valid values")]
    DefaultNotAllowed { variable: String, default: String },
    #[error("{context}: argument {arg:?}: {source}")]
    ArgInput {
        context: String,
        arg: String,
        source: OneofError,
    },
    #[error("{context}: argument {arg:?} references undeclared variable {variable:?}")]
    UnresolvedVariable {
        context: String,
        arg: String,
        variable: String,
    },
    #[error("widget {widget}: {source}")]
    DisplaySpec {
        widget: String,
        source: DisplaySpecError,
    },
    #[error("widget {widget}: graph {source}")]
    GraphInput { widget: String, source: OneofError },
}

/// Check `vis`, stopping at the first problem.
pub fn validate(vis: &Vis) -> Result<(), VisValidationError> {
    match validate_all(vis).into_iter().next() {
        None => Ok(()),
        Some(err) => Err(err),
    }
}

/// Check `vis` and report every problem found, in document order:
/// variables, then global funcs, then widgets.
pub fn validate_all(vis: &Vis) -> Vec<VisValidationError> {
    let mut errors = Vec::new();

    let mut variables = HashSet::with_capacity(vis.variables.len());
    for variable in &vis.variables {
        if !variables.insert(variable.name.as_str()) {
            errors.push(VisValidationError::DuplicateVariable(
                variable.name.clone(),
            ));
        }
        if PxType::from_tag(variable.px_type).is_err() {
            errors.push(VisValidationError::UnknownVariableType {
                variable: variable.name.clone(),
                tag: variable.px_type,
            });
        }
        if !variable.valid_values.is_empty()
            && !variable.default_value.is_empty()
            && !variable.valid_values.contains(&variable.default_value)
        {
            errors.push(VisValidationError::DefaultNotAllowed {
                variable: variable.name.clone(),
                default: variable.default_value.clone(),
            });
        }
    }

    let mut global_funcs = HashSet::with_capacity(vis.global_funcs.len());
    for global in &vis.global_funcs {
        if !global_funcs.insert(global.output_name.as_str()) {
            errors.push(VisValidationError::DuplicateGlobalFunc(
                global.output_name.clone(),
            ));
        }
        match &global.func {
            Some(func) => check_func(
                &format!("global func {:?}", global.output_name),
                func,
                &variables,
                &mut errors,
            ),
            None => errors.push(VisValidationError::EmptyGlobalFunc(
                global.output_name.clone(),
            )),
        }
    }

    for (index, widget) in vis.widgets.iter().enumerate() {
        check_widget(index, widget, &variables, &global_funcs, &mut errors);
    }

    for err in &errors {
        warn!("invalid vis: {err}");
    }
    errors
}

fn widget_label(index: usize, widget: &Widget) -> String {
    if widget.name.is_empty() {
        format!("#{index}")
    } else {
        format!("{:?}", widget.name)
    }
}

fn check_widget(
    index: usize,
    widget: &Widget,
    variables: &HashSet<&str>,
    global_funcs: &HashSet<&str>,
    errors: &mut Vec<VisValidationError>,
) {
    let label = widget_label(index, widget);

    match widget.func_or_ref() {
        Ok(super::FuncOrRef::Func(func)) => {
            check_func(&format!("widget {label}"), func, variables, errors);
        }
        Ok(super::FuncOrRef::GlobalFunc(output_name)) => {
            if !global_funcs.contains(output_name) {
                errors.push(VisValidationError::UnresolvedGlobalFunc {
                    widget: label.clone(),
                    output_name: output_name.to_string(),
                });
            }
        }
        Err(source) => errors.push(VisValidationError::WidgetInput {
            widget: label.clone(),
            source,
        }),
    }

    match widget.display() {
        Ok(Some(DisplaySpec::Graph(graph))) => {
            if let Err(source) = graph.input() {
                errors.push(VisValidationError::GraphInput {
                    widget: label,
                    source,
                });
            }
        }
        Ok(_) => {}
        Err(source) => errors.push(VisValidationError::DisplaySpec {
            widget: label,
            source,
        }),
    }
}

fn check_func(
    context: &str,
    func: &Func,
    variables: &HashSet<&str>,
    errors: &mut Vec<VisValidationError>,
) {
    for arg in &func.args {
        match arg.input() {
            Ok(ArgInput::Value(_)) => {}
            Ok(ArgInput::Variable(variable)) => {
                if !variables.contains(variable) {
                    errors.push(VisValidationError::UnresolvedVariable {
                        context: context.to_string(),
                        arg: arg.name.clone(),
                        variable: variable.to_string(),
                    });
                }
            }
            Err(source) => errors.push(VisValidationError::ArgInput {
                context: context.to_string(),
                arg: arg.name.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::vis::{FuncArg, GlobalFunc, Graph, Table, Variable};

    fn service_vis() -> Vis {
        Vis {
            variables: vec![
                Variable::new("start_time", PxType::STRING).with_default("-5m"),
                Variable::new("namespace", PxType::NAMESPACE)
                    .with_default("default")
                    .with_valid_values(["default", "px"]),
            ],
            global_funcs: vec![GlobalFunc {
                output_name: "stats".to_string(),
                func: Some(Func::new(
                    "service_stats",
                    vec![FuncArg::with_variable("start", "start_time")],
                )),
            }],
            widgets: vec![
                Widget::new("latency")
                    .with_position(0, 0, 6, 3)
                    .with_global_func("stats"),
                Widget::new("table")
                    .with_func(Func::new(
                        "pods",
                        vec![
                            FuncArg::with_variable("ns", "namespace"),
                            FuncArg::with_value("limit", "100"),
                        ],
                    ))
                    .with_display_spec(&DisplaySpec::Table(Table::default())),
            ],
        }
    }

    #[test]
    fn test_well_formed_vis_passes() {
        assert_eq!(validate(&service_vis()), Ok(()));
        assert!(validate_all(&service_vis()).is_empty());
    }

    #[test]
    fn test_widget_with_both_func_and_ref_fails() {
        let mut vis = service_vis();
        vis.widgets[0].func = Some(Func::new("inline", Vec::new()));
        assert_eq!(
            validate(&vis),
            Err(VisValidationError::WidgetInput {
                widget: "\"latency\"".to_string(),
                source: OneofError::Conflict {
                    group: "func_or_ref"
                },
            })
        );
    }

    #[test]
    fn test_unresolved_global_func() {
        let mut vis = service_vis();
        vis.widgets[0] = Widget::new("").with_global_func("missing");
        assert_eq!(
            validate(&vis),
            Err(VisValidationError::UnresolvedGlobalFunc {
                widget: "#0".to_string(),
                output_name: "missing".to_string(),
            })
        );
    }

    #[test]
    fn test_variable_checks() {
        let mut vis = service_vis();
        vis.variables[1].default_value = "kube-system".to_string();
        vis.variables.push(Variable::new("start_time", PxType::STRING));
        vis.variables.push(Variable {
            name: "blob".to_string(),
            px_type: 7,
            ..Default::default()
        });
        let errors = validate_all(&vis);
        assert_eq!(
            errors,
            vec![
                VisValidationError::DefaultNotAllowed {
                    variable: "namespace".to_string(),
                    default: "kube-system".to_string(),
                },
                VisValidationError::DuplicateVariable("start_time".to_string()),
                VisValidationError::UnknownVariableType {
                    variable: "blob".to_string(),
                    tag: 7,
                },
            ]
        );
    }

    #[test]
    fn test_func_arg_checks() {
        let mut vis = service_vis();
        vis.global_funcs[0]
            .func
            .as_mut()
            .unwrap()
            .args
            .push(FuncArg::with_variable("node", "node_name"));
        vis.global_funcs.push(GlobalFunc {
            output_name: "stats".to_string(),
            func: None,
        });
        let errors = validate_all(&vis);
        assert_eq!(errors.len(), 3);
        assert!(matches!(
            &errors[0],
            VisValidationError::UnresolvedVariable { variable, .. } if variable == "node_name"
        ));
        assert_eq!(
            errors[1],
            VisValidationError::DuplicateGlobalFunc("stats".to_string())
        );
        assert_eq!(
            errors[2],
            VisValidationError::EmptyGlobalFunc("stats".to_string())
        );
    }

    #[test]
    fn test_display_spec_checks() {
        let mut vis = service_vis();
        vis.widgets[1].display_spec = Some(prost_types::Any {
            type_url: "types.px.dev/px.vispb.Sparkline".to_string(),
            value: Vec::new(),
        });
        vis.widgets[0] = vis.widgets[0]
            .clone()
            .with_display_spec(&DisplaySpec::Graph(Graph::default()));
        let errors = validate_all(&vis);
        assert_eq!(errors.len(), 2);
        assert!(matches!(
            &errors[0],
            VisValidationError::GraphInput {
                source: OneofError::Missing { .. },
                ..
            }
        ));
        assert!(matches!(
            &errors[1],
            VisValidationError::DisplaySpec {
                source: DisplaySpecError::UnknownTypeUrl(_),
                ..
            }
        ));
    }

    #[test]
    fn test_widget_without_func_or_ref_fails() {
        let mut vis = service_vis();
        vis.widgets.push(Widget::new("placeholder"));
        assert_eq!(
            validate(&vis),
            Err(VisValidationError::WidgetInput {
                widget: "\"placeholder\"".to_string(),
                source: OneofError::Missing {
                    group: "func_or_ref"
                },
            })
        );
    }
}
