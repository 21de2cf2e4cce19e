use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn an uploaded file into a [`Dataset`](crate::Dataset).
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported file extension: .{0}")]
    Unsupported(String),
    #[error("could not decode file: {0}")]
    Decode(String),
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("{}", describe_max_upper(.max_upper, .limit))]
    InvalidConfiguration { max_upper: u32, limit: u32 },
    #[error("analysis failed: {0}")]
    Compute(String),
}

fn describe_max_upper(max_upper: &u32, limit: &u32) -> String {
    if *max_upper == 0 {
        "max upper bound must be at least 1, got 0".to_string()
    } else {
        format!(
            "max upper bound {max_upper} is above {limit}, the largest table this tool builds"
        )
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no analysis results to export")]
    NothingToExport,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
