use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

/// Failure to fetch or decode the shared cell model.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read model: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to fetch model: {0}")]
    Fetch(String),
    #[error("model is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error(transparent)]
    Parse(#[from] ObjError),
    #[error("model does not contain any mesh with faces")]
    NoMesh,
}

/// Syntax and reference errors in OBJ sources.
#[derive(Debug, Error)]
pub enum ObjError {
    #[error("line {line}: {what} is missing a component")]
    MissingComponent { line: usize, what: &'static str },
    #[error("line {line}: invalid number")]
    InvalidFloat {
        line: usize,
        #[source]
        source: ParseFloatError,
    },
    #[error("line {line}: invalid face index")]
    InvalidIndex {
        line: usize,
        #[source]
        source: ParseIntError,
    },
    #[error("line {line}: faces must reference at least 3 vertices")]
    DegenerateFace { line: usize },
    #[error("face references vertex {index} but only {count} are defined")]
    IndexOutOfRange { index: i32, count: usize },
    #[error("OBJ file does not define any vertices")]
    NoVertices,
}

/// Invalid spline construction input.
#[derive(Debug, Error, PartialEq)]
pub enum PathError {
    #[error("a path needs at least 2 control points, got {0}")]
    TooFewPoints(usize),
    #[error("arc length table needs at least 1 division")]
    NoDivisions,
}

/// Failure to read or validate a scene configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
