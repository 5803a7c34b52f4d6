use std::fmt;

/// The lifecycle state of a party.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolState {
    /// The party has been created but not initialized.
    #[default]
    Uninitialized,
    /// The party is initialized and may generate outputs.
    Initialized,
    /// The party has been destroyed, either explicitly or by an abort.
    Destroyed,
}

impl fmt::Display for ProtocolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolState::Uninitialized => f.write_str("uninitialized"),
            ProtocolState::Initialized => f.write_str("initialized"),
            ProtocolState::Destroyed => f.write_str("destroyed"),
        }
    }
}

/// An operation was invoked in the wrong state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("illegal state for {operation}: expected {expected}, found {actual}")]
pub struct StateError {
    /// The attempted operation.
    pub operation: &'static str,
    /// The state the operation requires.
    pub expected: ProtocolState,
    /// The current state.
    pub actual: ProtocolState,
}

impl ProtocolState {
    /// Returns an error unless the state is `expected`.
    pub fn check(&self, expected: ProtocolState, operation: &'static str) -> Result<(), StateError> {
        if *self == expected {
            Ok(())
        } else {
            Err(StateError {
                operation,
                expected,
                actual: *self,
            })
        }
    }

    /// Transitions from `Uninitialized` to `Initialized`.
    pub fn initialize(&mut self) -> Result<(), StateError> {
        self.check(ProtocolState::Uninitialized, "init")?;
        *self = ProtocolState::Initialized;
        Ok(())
    }

    /// Transitions to `Destroyed`, returning `false` if already destroyed.
    pub fn destroy(&mut self) -> bool {
        if *self == ProtocolState::Destroyed {
            return false;
        }

        tracing::debug!(from = %self, "destroying party");
        *self = ProtocolState::Destroyed;
        true
    }

    /// Returns `true` if the party is initialized.
    pub fn is_initialized(&self) -> bool {
        *self == ProtocolState::Initialized
    }

    /// Returns `true` if the party is destroyed.
    pub fn is_destroyed(&self) -> bool {
        *self == ProtocolState::Destroyed
    }
}

/// A party with an explicit lifecycle.
pub trait Lifecycle {
    /// Returns the current state.
    fn state(&self) -> ProtocolState;

    /// Destroys the party, releasing its resources.
    ///
    /// Destroying is idempotent and terminal.
    fn destroy(&mut self);
}
