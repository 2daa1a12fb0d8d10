#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("error: {0}")]
    Common(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
