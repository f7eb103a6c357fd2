use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure talking to a third-party API.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} responded with status {status}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
    },

    /// The directions provider answered but had no route between the addresses.
    #[error("No route found ({status}{})", format_detail(.message))]
    NoRoute {
        status: String,
        message: Option<String>,
    },

    /// The provider answered 200 but reported a failure status in the body.
    #[error("{service} returned {status}{}", format_detail(.message))]
    Provider {
        service: &'static str,
        status: String,
        message: Option<String>,
    },

    #[error("invalid fuel station at row {row}: {message}")]
    InvalidStation { row: usize, message: String },

    #[error("price {0} is out of range for cost arithmetic")]
    InvalidPrice(rust_decimal::Decimal),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("background task failed: {0}")]
    Blocking(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn format_detail(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {m}"),
        None => String::new(),
    }
}
