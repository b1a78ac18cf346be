#[cfg(debug_assertions)]
use std::collections::HashMap;

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
#[cfg(debug_assertions)]
use serde_json::Value;

use crate::store::StoreError;

/// Errors caused by the request rather than the server. Each one decides the
/// status code it is rendered with.
pub trait ApiRequestError: std::error::Error + Send + Sync + 'static {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

pub enum AppError {
    ServerError {
        error: eyre::Error,

        #[cfg(debug_assertions)]
        backtrace: Option<backtrace::Backtrace>,
    },
    ApiRequestError {
        error: Box<dyn ApiRequestError>,
    },
    Unhandled(String, StatusCode),
}

#[derive(Serialize)]
struct ErrorResponse {
    code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    msg: Option<String>,

    #[cfg(debug_assertions)]
    #[serde(skip_serializing_if = "Option::is_none")]
    debug_info: Option<HashMap<&'static str, Value>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status_code, error_response) = match self {
            AppError::ServerError {
                error,
                #[cfg(debug_assertions)]
                backtrace,
            } => {
                tracing::error!(?error, "Request failed with a server error");

                let code = if error.downcast_ref::<StoreError>().is_some() {
                    "DATABASE_ERR"
                } else {
                    "SERVER_ERR"
                };

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        code: code.into(),
                        msg: Some("Internal server error".into()),
                        #[cfg(debug_assertions)]
                        debug_info: Some(HashMap::from([
                            (
                                "backtrace",
                                serde_json::to_value(
                                    backtrace.as_ref().map(filter_backtrace).unwrap_or_default(),
                                )
                                .unwrap_or_default(),
                            ),
                            ("error", Value::String(format!("{error:#}"))),
                        ])),
                    },
                )
            }
            // Domain errors may wrap a store failure; those keep their details
            // out of the response body
            AppError::ApiRequestError { error } if error.status_code().is_server_error() => {
                tracing::error!(%error, "Request failed with a server error");
                (
                    error.status_code(),
                    ErrorResponse {
                        code: "SERVER_ERR".into(),
                        msg: Some("Internal server error".into()),
                        #[cfg(debug_assertions)]
                        debug_info: Some(HashMap::from([(
                            "error",
                            Value::String(error.to_string()),
                        )])),
                    },
                )
            }
            AppError::ApiRequestError { error } => (
                error.status_code(),
                ErrorResponse {
                    code: "ERR".into(),
                    msg: Some(error.to_string()),
                    #[cfg(debug_assertions)]
                    debug_info: None,
                },
            ),
            AppError::Unhandled(msg, status_code) => (
                status_code,
                ErrorResponse {
                    code: "ERR".into(),
                    msg: Some(msg),
                    #[cfg(debug_assertions)]
                    debug_info: None,
                },
            ),
        };

        (status_code, Json(error_response)).into_response()
    }
}

impl AppError {
    fn server_error(error: eyre::Error) -> Self {
        AppError::ServerError {
            error,

            #[cfg(debug_assertions)]
            backtrace: Some(backtrace::Backtrace::new()),
        }
    }

    #[cfg(test)]
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ApiRequestError { error } => error.status_code(),
            AppError::Unhandled(_, status_code) => *status_code,
        }
    }
}

impl<E: ApiRequestError> From<E> for AppError {
    fn from(e: E) -> Self {
        AppError::ApiRequestError { error: Box::new(e) }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::server_error(e.into())
    }
}

impl From<eyre::Error> for AppError {
    fn from(e: eyre::Error) -> Self {
        AppError::server_error(e)
    }
}

impl From<&'static str> for AppError {
    fn from(e: &'static str) -> Self {
        AppError::Unhandled(e.into(), StatusCode::BAD_REQUEST)
    }
}

impl From<(&'static str, StatusCode)> for AppError {
    fn from((msg, status_code): (&'static str, StatusCode)) -> Self {
        AppError::Unhandled(msg.into(), status_code)
    }
}

impl From<(String, StatusCode)> for AppError {
    fn from((msg, status_code): (String, StatusCode)) -> Self {
        AppError::Unhandled(msg, status_code)
    }
}

#[cfg(debug_assertions)]
#[derive(Serialize, Debug)]
struct FrameInfo {
    name: String,
    loc: String,
}

#[cfg(debug_assertions)]
fn filter_backtrace(backtrace: &backtrace::Backtrace) -> Vec<FrameInfo> {
    const MODULE_PREFIX: &str = concat!(env!("CARGO_CRATE_NAME"), "::");
    let mut frames_info: Vec<FrameInfo> = Vec::new();

    for frame in backtrace.frames() {
        for symbol in frame.symbols() {
            if let (Some(name), Some(filename), Some(lineno)) = (
                symbol.name().map(|n| n.to_string()),
                symbol.filename().map(|f| f.to_owned()),
                symbol.lineno(),
            ) {
                if name.contains(MODULE_PREFIX) {
                    frames_info.push(FrameInfo {
                        name,
                        loc: format!("{}:{}", filename.display(), lineno),
                    });
                }
            }
        }
    }

    frames_info
}
