use arcstr::ArcStr;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CpwgenError>;

/// Errors raised while synthesizing mask geometry.
///
/// All variants are raised synchronously at the point of detection and are
/// never retried: synthesis is deterministic, so retrying with identical
/// inputs cannot succeed. A failure in one component must not prevent
/// generation of its siblings, so no variant carries partial geometry.
#[derive(Debug, Error)]
pub enum CpwgenError {
    /// A supplied geometric parameter violates a hard physical bound.
    #[error("invalid dimension `{param}`: {msg}")]
    InvalidDimension { param: &'static str, msg: String },

    /// The requested electrical length cannot be realized under the other
    /// constraints. The message names the parameters to relax.
    #[error("infeasible geometry: {0}")]
    InfeasibleGeometry(String),

    /// Mismatched attribute-list lengths or index permutation in array
    /// placement.
    #[error("inconsistent array: {0}")]
    InconsistentArray(String),

    /// The polygon boolean backend produced (or was handed) a degenerate
    /// result.
    #[error("geometry backend: {0}")]
    Geometry(String),

    /// A named cell was requested from a registry that does not provide it.
    #[error("unknown cell `{0}`")]
    UnknownCell(ArcStr),

    /// A port lookup failed on a component.
    #[error("no port `{port}` on cell `{cell}`")]
    MissingPort { cell: ArcStr, port: ArcStr },

    /// A metadata lookup failed on a component.
    #[error("cell `{cell}` does not record `{key}` metadata")]
    MissingInfo { cell: ArcStr, key: ArcStr },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("failed to decode cell parameters: {0}")]
    CellParams(#[from] serde_json::Error),
}

impl CpwgenError {
    pub fn invalid_dimension(param: &'static str, msg: impl Into<String>) -> Self {
        Self::InvalidDimension {
            param,
            msg: msg.into(),
        }
    }
}
