use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing STABILITY_API_KEY in environment")]
    MissingApiKey,

    #[error("Upload exceeds {limit} bytes")]
    UploadTooLarge { limit: usize },

    #[error("Invalid form data: {0}")]
    InvalidForm(String),

    #[error("Vendor returned {status}: {detail}")]
    Vendor { status: u16, detail: String },

    #[error("Vendor response missing image field")]
    MissingImage,

    #[error("Decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_form(msg: impl Into<String>) -> Self {
        Self::InvalidForm(msg.into())
    }

    pub fn vendor(status: u16, detail: impl Into<String>) -> Self {
        Self::Vendor {
            status,
            detail: detail.into(),
        }
    }
}
