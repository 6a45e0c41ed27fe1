use thiserror::Error;

/// Rejected input from the control panel. Raised before anything reaches the
/// simulation core, so existing state is never touched when one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{field}: '{value}' is not a number")]
    NotANumber { field: &'static str, value: String },

    #[error("{field}: {value} is not a finite number")]
    NotFinite { field: &'static str, value: f64 },

    #[error("mass must be positive, got {0}")]
    NonPositiveMass(f64),

    #[error("burst of {requested} is over the limit of {max}")]
    BurstTooLarge { requested: u32, max: u32 },

    #[error("{command} takes {expected} arguments, got {got}")]
    WrongArity {
        command: &'static str,
        expected: &'static str,
        got: usize,
    },

    #[error("unknown command: {0}")]
    UnknownCommand(String),
}
