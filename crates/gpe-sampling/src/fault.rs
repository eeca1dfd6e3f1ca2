//! Failure reporting for the shell-constrained perturbation.

use gpe_math::Real;
use thiserror::Error;

/// Why a constrained perturbation did not produce a valid state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShellFault {
    #[error("could not find a new initial on-shell state (relative energy residual {residual:.3e})")]
    OffShell { residual: Real },

    #[error(
        "could not find a new initial state with the same number of particles (relative residual {residual:.3e})"
    )]
    ParticleNumber { residual: Real },

    #[error("exceeded number of attempts ({attempts}) in constrained perturbation")]
    AttemptsExhausted { attempts: usize },
}

/// Sticky record of every fault raised across calls.
///
/// Once tripped it stays tripped and keeps accumulating messages, one per
/// line, until [`FaultLog::clear`] is called. Per-call success must be read
/// from the returned outcome, not from this log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaultLog {
    tripped: bool,
    message: String,
}

impl FaultLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, fault: &ShellFault) {
        self.tripped = true;
        self.message.push_str(&fault.to_string());
        self.message.push('\n');
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped
    }

    /// 1 once any fault has been recorded, else 0.
    pub fn checksum(&self) -> u8 {
        u8::from(self.tripped)
    }

    /// Accumulated human-readable messages.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn clear(&mut self) {
        self.tripped = false;
        self.message.clear();
    }
}
