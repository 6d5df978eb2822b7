//! Ternary command result handed back to the invoking layer

/// Result of a user-facing command
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome<T> {
    /// The command ran; carries its report
    Succeeded(T),
    /// A precondition failed or the model could not be edited
    Failed(String),
    /// Nothing to do (empty selection and the like)
    Cancelled(String),
}

impl<T> CommandOutcome<T> {
    pub fn is_succeeded(&self) -> bool {
        matches!(self, CommandOutcome::Succeeded(_))
    }

    /// Process exit status: 0 succeeded, 1 failed, 2 cancelled
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandOutcome::Succeeded(_) => 0,
            CommandOutcome::Failed(_) => 1,
            CommandOutcome::Cancelled(_) => 2,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CommandOutcome<U> {
        match self {
            CommandOutcome::Succeeded(v) => CommandOutcome::Succeeded(f(v)),
            CommandOutcome::Failed(m) => CommandOutcome::Failed(m),
            CommandOutcome::Cancelled(m) => CommandOutcome::Cancelled(m),
        }
    }

    pub fn succeeded(self) -> Option<T> {
        match self {
            CommandOutcome::Succeeded(v) => Some(v),
            _ => None,
        }
    }
}
