use std::path::PathBuf;

/// Chart settings that are out of range or would make the maintainer thrash.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("column width must be positive, got {0}")]
    ColumnWidth(f32),
    #[error("extend chunk ({chunk}) must be at least the extend threshold ({threshold})")]
    ExtendChunkTooSmall { chunk: usize, threshold: usize },
    #[error("prune chunk ({chunk}) must be smaller than the prune threshold ({threshold})")]
    PruneChunkTooLarge { chunk: usize, threshold: usize },
    #[error(
        "prune threshold ({prune_threshold}) minus prune chunk ({prune_chunk}) must exceed the extend threshold ({extend_threshold})"
    )]
    PruneReachesExtend {
        prune_threshold: usize,
        prune_chunk: usize,
        extend_threshold: usize,
    },
    #[error("{field} is {value}, above the limit of {limit}")]
    OutOfRange {
        field: &'static str,
        value: u64,
        limit: u64,
    },
    #[error("max window ({max}) must exceed the initial window ({initial} days)")]
    WindowCapTooSmall { max: usize, initial: usize },
}

/// Failures while reading or writing the schedule file or the settings file.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode JSON: {0}")]
    Encode(#[from] serde_json::Error),
}
