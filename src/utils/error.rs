use thiserror::Error;

#[derive(Error, Debug)]
pub enum PricerError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned HTTP {status} for part '{part}'")]
    ApiStatusError { part: String, status: u16 },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Cannot parse price '{raw}': {reason}")]
    PriceParseError { raw: String, reason: String },

    #[error("Gave up on part '{part}' after {attempts} rate-limited attempts")]
    RetriesExhausted { part: String, attempts: u32 },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Input,
    Output,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PricerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PricerError::ConfigError { .. }
            | PricerError::MissingConfigError { .. }
            | PricerError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            PricerError::ApiError(_)
            | PricerError::ApiStatusError { .. }
            | PricerError::RetriesExhausted { .. } => ErrorCategory::Network,
            PricerError::CsvError(_) => ErrorCategory::Input,
            PricerError::IoError(_) | PricerError::SerializationError(_) => ErrorCategory::Output,
            PricerError::PriceParseError { .. } | PricerError::ProcessingError { .. } => {
                ErrorCategory::Data
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 單一零件的問題不影響整體執行
            PricerError::PriceParseError { .. } => ErrorSeverity::Low,
            PricerError::ApiError(_)
            | PricerError::ApiStatusError { .. }
            | PricerError::RetriesExhausted { .. } => ErrorSeverity::Medium,
            PricerError::CsvError(_) | PricerError::ProcessingError { .. } => ErrorSeverity::High,
            PricerError::IoError(_) | PricerError::SerializationError(_) => ErrorSeverity::High,
            PricerError::ConfigError { .. }
            | PricerError::MissingConfigError { .. }
            | PricerError::InvalidConfigValueError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            PricerError::MissingConfigError { field } if field == "search_api_key" => {
                "Set MOUSER_SEARCH_API_KEY or add search_api_key under [api] in the config file"
                    .to_string()
            }
            PricerError::MissingConfigError { field } => {
                format!("Provide a value for '{}' in the config file", field)
            }
            PricerError::InvalidConfigValueError { field, .. } => {
                format!("Check the value of '{}' in the config file or CLI flags", field)
            }
            PricerError::ConfigError { .. } => {
                "Make sure the config file exists and is valid TOML".to_string()
            }
            PricerError::ApiError(_) => {
                "Check network connectivity and the API endpoint".to_string()
            }
            PricerError::ApiStatusError { status, .. } if *status == 401 || *status == 403 => {
                "Verify that the search API key is valid".to_string()
            }
            PricerError::ApiStatusError { .. } => {
                "The supplier API rejected the request; try again later".to_string()
            }
            PricerError::RetriesExhausted { .. } => {
                "Raise --max-retries or --retry-delay-secs, or rerun later".to_string()
            }
            PricerError::CsvError(_) => {
                "Make sure the BOM is a valid CSV file with a header row".to_string()
            }
            PricerError::IoError(_) => "Check file paths and write permissions".to_string(),
            PricerError::SerializationError(_) => {
                "The API response could not be (de)serialized; inspect part_data.json".to_string()
            }
            PricerError::PriceParseError { .. } => {
                "Adjust currency_prefix / decimal_separator under [pricing]".to_string()
            }
            PricerError::ProcessingError { .. } => "Inspect the input BOM for bad rows".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Could not reach the supplier API: {}", self),
            ErrorCategory::Input => format!("Could not read the BOM: {}", self),
            ErrorCategory::Output => format!("Could not write results: {}", self),
            ErrorCategory::Data => format!("Unexpected data: {}", self),
        }
    }
}

impl From<toml::de::Error> for PricerError {
    fn from(e: toml::de::Error) -> Self {
        PricerError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        }
    }
}

pub type Result<T> = std::result::Result<T, PricerError>;
