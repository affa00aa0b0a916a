use std::fmt::Debug;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("Missing `{0}` environment variable")]
    MissingEnvVar(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected payload from {0}")]
    UnexpectedPayload(&'static str),

    #[error("Malformed `{field}` value in {signal} signal")]
    MalformedSignal {
        signal: &'static str,
        field: String,
    },
}
