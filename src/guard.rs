use crate::error::Error;

/// Lifecycle stage of one verification session.
///
/// The guard is single-slot memory, not a history: each operation overwrites
/// the stage, and there is no transition back to `Uninitialized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No operation performed yet.
    #[default]
    Uninitialized,
    /// An initiation call has been entered but has not completed.
    Initiating,
    /// The last completed operation was an initiation.
    Initiated,
    /// A status check has been entered but has not completed.
    CheckingStatus,
    /// The last completed operation was a status check.
    StatusChecked,
}

/// Rejects outcome-query methods invoked against the wrong prior operation.
///
/// Completion is recorded when the exchange finishes, captured transport
/// failures included; a call aborted by validation leaves the guard in the
/// entered state, so outcome queries stay rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationGuard {
    state: SessionState,
}

impl OperationGuard {
    pub fn new() -> Self {
        Self {
            state: SessionState::Uninitialized,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn begin_initiation(&mut self) {
        self.state = SessionState::Initiating;
    }

    pub fn complete_initiation(&mut self) {
        self.state = SessionState::Initiated;
    }

    pub fn begin_status_check(&mut self) {
        self.state = SessionState::CheckingStatus;
    }

    pub fn complete_status_check(&mut self) {
        self.state = SessionState::StatusChecked;
    }

    /// Gate for accessors that read initiation results.
    pub fn require_initiated(&self) -> Result<(), Error> {
        if self.state == SessionState::Initiated {
            Ok(())
        } else {
            Err(Error::OperationMismatch)
        }
    }

    /// Gate for accessors that read status-check results.
    pub fn require_status_checked(&self) -> Result<(), Error> {
        if self.state == SessionState::StatusChecked {
            Ok(())
        } else {
            Err(Error::OperationMismatch)
        }
    }
}
