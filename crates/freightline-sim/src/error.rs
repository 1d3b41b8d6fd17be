use thiserror::Error;

use crate::capability::CapabilityKind;

/// Errors raised by the simulation subsystems.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// The capability catalog has no definition for the requested kind.
    /// Unreachable with the standard catalog; kept as a fail-fast diagnostic
    /// against a mis-built table.
    #[error("no capability definition for {0:?}")]
    Configuration(CapabilityKind),
}
