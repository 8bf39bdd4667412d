// Error type shared across the CLI.

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("request to the ecHome server failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected response from server: {0}")]
    BadResponse(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("json handling failure: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml handling failure: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("kubeconfig update failed: {0}")]
    Kubeconfig(String),
}

pub type CliResult<T> = Result<T, CliError>;
