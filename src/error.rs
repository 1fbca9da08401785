// MIT License - Copyright (c) 2026 Peter Wright
// SCSGate switch platform

/// All errors that can occur in the scsgate-switch library.
#[derive(Debug, thiserror::Error)]
pub enum ScsGateError {
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid device slug: {slug:?}")]
    InvalidSlug { slug: String },

    #[error("Device {slug} has an empty scs_id")]
    EmptyScsId { slug: String },

    #[error("Duplicate scs_id {scs_id} (devices {first} and {second})")]
    DuplicateScsId {
        scs_id: String,
        first: String,
        second: String,
    },

    #[error("SCS id is not a decimal number: {scs_id}")]
    InvalidScsId { scs_id: String },

    #[error("Invalid scenario id: {value:?}")]
    InvalidScenarioId { value: String },

    #[error("State message too short for scenario byte: offset={offset}, len={len}")]
    MissingScenarioByte { offset: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, ScsGateError>;
