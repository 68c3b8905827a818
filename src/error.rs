use thiserror::Error;

pub type Result<T> = std::result::Result<T, VestigeError>;

// Enum for every failure the toll mechanic can report to the invoking player.
#[derive(Debug, Error)]
pub enum VestigeError {
    #[error("Invalid input: {0}")]
    InvalidInput(String), // Non-numeric or non-positive toll amount.

    #[error("Please select a character or token")]
    NoTargetSelected, // No character could be resolved from the invoking context.

    #[error("Content lookup failed: {0}")]
    ContentLookup(String), // Effect template or its content pack is missing.

    #[error("Persistence failed: {0}")]
    Persistence(String), // The host rejected a flag or hit point update.

    #[error("Character not found: {0}")]
    CharacterNotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logger error: {0}")]
    Logger(#[from] log::SetLoggerError),
}

impl VestigeError {
    // Short label used in the player-facing notification.
    pub fn headline(&self) -> &'static str {
        match self {
            VestigeError::InvalidInput(_) => "Invalid toll amount",
            VestigeError::NoTargetSelected => "No character selected",
            VestigeError::ContentLookup(_) => "Vestige's Toll effect unavailable",
            VestigeError::Persistence(_) => "Could not save Vestige's Toll changes",
            VestigeError::CharacterNotFound(_) => "Character not found",
            VestigeError::Serialization(_) | VestigeError::Io(_) | VestigeError::Logger(_) => {
                "Vestige's Toll data error"
            }
        }
    }
}
