use std::path::PathBuf;

/// Failures that stop a call before a [`Response`](crate::Response) exists.
///
/// Api-level failures (the server answered with an error document, or with something that is not
/// json at all) are not errors here, see [`Response::error`](crate::Response::error).
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("error: {0}")]
    Common(String),
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("failed to read attachment `{}`: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<sailthru_common::Error> for Error {
    fn from(e: sailthru_common::Error) -> Self {
        match e {
            sailthru_common::Error::Common(msg) => Error::Common(msg),
            sailthru_common::Error::Json(e) => Error::Json(e),
        }
    }
}
