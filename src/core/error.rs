use thiserror::Error;

use crate::core::types::AreaId;

#[derive(Error, Debug)]
pub enum SynthError {
    #[error("Areas referenced by zone data but missing from the census tables: {0:?}")]
    MissingAreas(Vec<AreaId>),

    #[error("Area {area}: required column '{column}' not found")]
    MissingColumn { area: AreaId, column: String },

    #[error("Area {area}: weights for {distribution} sum to zero")]
    ZeroWeights { area: AreaId, distribution: String },

    #[error(transparent)]
    Sampler(#[from] crate::sampling::categorical::SamplerError),

    #[error("Invalid category value '{value}' in {context}")]
    InvalidCategory { value: String, context: String },

    #[error("Unrecognized character '{character}' in label '{label}'")]
    UnrecognizedCharacter { character: char, label: String },

    #[error("Invalid household count '{0}'")]
    InvalidHouseholdCount(String),

    #[error("Zone {0} has neither a centroid nor a polygon")]
    MissingGeometry(usize),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{field} value {value} does not fit its output field")]
    FieldOverflow { field: &'static str, value: u64 },

    #[error("Malformed population record: {0}")]
    MalformedRecord(String),

    #[error("Population invariant violated: {0}")]
    InvalidPopulation(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SynthError>;
