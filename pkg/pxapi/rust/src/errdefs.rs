// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Classification of transport status codes into the error categories a
//! client reports to its user.

use std::fmt;

use log::debug;
use thiserror::Error;
use tonic::Code;

use crate::proto::{self, error_details};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ErrorCategory {
    InvalidArgument,
    Unauthenticated,
    PermissionDenied,
    ResourceExhausted,
    Unavailable,
    Internal,
    Unknown,
}

impl ErrorCategory {
    /// Total over every code. OK and any code without a category of its own
    /// land in `Unknown`.
    pub fn from_code(code: Code) -> Self {
        match code {
            Code::InvalidArgument => Self::InvalidArgument,
            Code::Unauthenticated => Self::Unauthenticated,
            Code::PermissionDenied => Self::PermissionDenied,
            Code::ResourceExhausted => Self::ResourceExhausted,
            Code::Unavailable => Self::Unavailable,
            Code::Internal => Self::Internal,
            _ => Self::Unknown,
        }
    }

    /// Like [`ErrorCategory::from_code`] for a raw code number.
    pub fn from_i32(code: i32) -> Self {
        Self::from_code(Code::from_i32(code))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid argument",
            Self::Unauthenticated => "unauthenticated",
            Self::PermissionDenied => "permission denied",
            Self::ResourceExhausted => "resource exhausted",
            Self::Unavailable => "unavailable",
            Self::Internal => "internal",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A categorized error. `message` is the server's text, untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{category}: {message}")]
pub struct ClassifiedError {
    pub category: ErrorCategory,
    pub message: String,
}

pub fn classify(code: Code, message: impl Into<String>) -> ClassifiedError {
    ClassifiedError {
        category: ErrorCategory::from_code(code),
        message: message.into(),
    }
}

impl ClassifiedError {
    pub fn from_status(status: &tonic::Status) -> Self {
        classify(status.code(), status.message())
    }
}

impl From<tonic::Status> for ClassifiedError {
    fn from(status: tonic::Status) -> Self {
        Self::from_status(&status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerError {
    pub line: u64,
    pub column: u64,
    pub message: String,
}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.line, self.column, self.message)
    }
}

impl From<&proto::CompilerError> for CompilerError {
    fn from(err: &proto::CompilerError) -> Self {
        Self {
            line: err.line,
            column: err.column,
            message: err.message.clone(),
        }
    }
}

/// A failed script execution as reported in a response status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("script failed to compile: {}", join_compiler_errors(.0))]
    Compilation(Vec<CompilerError>),
    #[error(transparent)]
    Classified(#[from] ClassifiedError),
}

impl ScriptError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Compilation(_) => ErrorCategory::InvalidArgument,
            Self::Classified(err) => err.category,
        }
    }
}

fn join_compiler_errors(errors: &[CompilerError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Turn a response status into a script outcome.
///
/// An `INVALID_ARGUMENT` status carrying compiler errors in its details is
/// reported as [`ScriptError::Compilation`]. Every other non-OK status is
/// classified by code.
pub fn parse_script_status(status: &proto::Status) -> Result<(), ScriptError> {
    let code = Code::from_i32(status.code);
    if code == Code::Ok {
        return Ok(());
    }

    if code == Code::InvalidArgument {
        let compiler_errors: Vec<CompilerError> = status
            .error_details
            .iter()
            .filter_map(|details| match &details.error {
                Some(error_details::Error::CompilerError(err)) => Some(CompilerError::from(err)),
                None => None,
            })
            .collect();
        if !compiler_errors.is_empty() {
            debug!("script status carries {} compiler errors", compiler_errors.len());
            return Err(ScriptError::Compilation(compiler_errors));
        }
    }

    Err(ScriptError::Classified(classify(code, status.message.clone())))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use super::*;
    use crate::proto::ErrorDetails;

    #[test]
    fn test_named_codes_map_to_their_category() {
        let cases = [
            (Code::InvalidArgument, ErrorCategory::InvalidArgument),
            (Code::Unauthenticated, ErrorCategory::Unauthenticated),
            (Code::PermissionDenied, ErrorCategory::PermissionDenied),
            (Code::ResourceExhausted, ErrorCategory::ResourceExhausted),
            (Code::Unavailable, ErrorCategory::Unavailable),
            (Code::Internal, ErrorCategory::Internal),
        ];
        for (code, category) in cases {
            assert_eq!(ErrorCategory::from_code(code), category, "{code:?}");
        }
    }

    #[test]
    fn test_other_codes_are_unknown() {
        for code in [
            Code::Ok,
            Code::Cancelled,
            Code::Unknown,
            Code::DeadlineExceeded,
            Code::NotFound,
            Code::AlreadyExists,
            Code::FailedPrecondition,
            Code::Aborted,
            Code::OutOfRange,
            Code::Unimplemented,
            Code::DataLoss,
        ] {
            assert_eq!(ErrorCategory::from_code(code), ErrorCategory::Unknown);
        }
    }

    #[test]
    fn test_from_i32_handles_unrecognized_numbers() {
        assert_eq!(ErrorCategory::from_i32(8), ErrorCategory::ResourceExhausted);
        assert_eq!(ErrorCategory::from_i32(16), ErrorCategory::Unauthenticated);
        assert_eq!(ErrorCategory::from_i32(99), ErrorCategory::Unknown);
        assert_eq!(ErrorCategory::from_i32(-1), ErrorCategory::Unknown);
    }

    #[test]
    fn test_classify_preserves_message_verbatim() {
        let message = "  quota exceeded: 10/10 scripts\n(retry later)  ";
        let err = classify(Code::ResourceExhausted, message);
        assert_eq!(err.category, ErrorCategory::ResourceExhausted);
        assert_eq!(err.message, message);

        let err = classify(Code::DataLoss, "disk gone");
        assert_eq!(err.category, ErrorCategory::Unknown);
        assert_eq!(err.message, "disk gone");
        assert_eq!(err.to_string(), "unknown: disk gone");
    }

    #[test]
    fn test_from_tonic_status() {
        let status = tonic::Status::permission_denied("org mismatch");
        let err = ClassifiedError::from_status(&status);
        assert_eq!(err.category, ErrorCategory::PermissionDenied);
        assert_eq!(err.message, "org mismatch");
        assert_eq!(ClassifiedError::from(status), err);
    }

    fn compiler_details(line: u64, column: u64, message: &str) -> ErrorDetails {
        ErrorDetails {
            error: Some(error_details::Error::CompilerError(proto::CompilerError {
                line,
                column,
                message: message.to_string(),
            })),
        }
    }

    #[test]
    fn test_parse_script_status() {
        assert_eq!(parse_script_status(&proto::Status::default()), Ok(()));

        let status = proto::Status {
            code: Code::InvalidArgument as i32,
            message: "compilation failed".to_string(),
            error_details: vec![
                compiler_details(3, 7, "name 'dx' is not defined"),
                compiler_details(9, 1, "unexpected indent"),
            ],
        };
        let err = parse_script_status(&status).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidArgument);
        match &err {
            ScriptError::Compilation(errors) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[1].line, 9);
                assert_eq!(errors[0].message, "name 'dx' is not defined");
            }
            other => panic!("expected compilation error, got {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "script failed to compile: 3:7 name 'dx' is not defined; 9:1 unexpected indent"
        );
    }

    #[test]
    fn test_invalid_argument_without_details_is_classified() {
        let status = proto::Status {
            code: Code::InvalidArgument as i32,
            message: "bad flag".to_string(),
            error_details: vec![ErrorDetails { error: None }],
        };
        assert_eq!(
            parse_script_status(&status),
            Err(ScriptError::Classified(ClassifiedError {
                category: ErrorCategory::InvalidArgument,
                message: "bad flag".to_string(),
            }))
        );
    }

    #[test]
    fn test_unavailable_status_is_classified() {
        let status = proto::Status {
            code: Code::Unavailable as i32,
            message: "vizier unreachable".to_string(),
            error_details: Vec::new(),
        };
        let err = parse_script_status(&status).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Unavailable);
        assert_eq!(err.to_string(), "unavailable: vizier unreachable");
    }
}
