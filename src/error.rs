use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Caller-visible failures of the plan/execute/join loop.
///
/// Everything recoverable (unparseable plan lines, argument resolution,
/// tool failures, timeouts) is turned into an observation the model can read
/// on the next round. Only the variants below escape to the caller; internal
/// code continues to use `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum CompilerError {
    // ── Plan ────────────────────────────────────────────────────────────
    #[error("plan: {0}")]
    Plan(#[from] PlanError),

    // ── Orchestration ───────────────────────────────────────────────────
    #[error("recursion limit of {limit} steps reached without a final answer")]
    RecursionLimit { limit: u32 },

    // ── Config ──────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(anyhow::Error),
}

impl From<anyhow::Error> for CompilerError {
    /// Recovers typed plan/config errors that travelled through `anyhow`.
    fn from(error: anyhow::Error) -> Self {
        let error = match error.downcast::<PlanError>() {
            Ok(plan) => return Self::Plan(plan),
            Err(other) => other,
        };
        match error.downcast::<ConfigError>() {
            Ok(config) => Self::Config(config),
            Err(other) => Self::Other(other),
        }
    }
}

// ─── Plan errors ─────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("tool {name} not found")]
    UnknownTool { name: String },
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate's public entry points.
pub type Result<T> = std::result::Result<T, CompilerError>;
