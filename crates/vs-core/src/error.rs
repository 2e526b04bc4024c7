/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors produced when parsing core vocabulary from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// The name does not belong to the closed persona set.
    #[error("unknown persona: \"{0}\"")]
    UnknownPersona(String),

    /// The name is neither a persona nor one of the fixed speakers.
    #[error("unknown speaker: \"{0}\"")]
    UnknownSpeaker(String),

    /// The name does not identify a story flag.
    #[error("unknown story flag: \"{0}\"")]
    UnknownFlag(String),

    /// The text is not one of `held`, `former`, or `never`.
    #[error("unknown blade state: \"{0}\" (expected held, former, or never)")]
    UnknownBladeState(String),
}
