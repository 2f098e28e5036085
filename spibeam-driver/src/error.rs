use spibeam_core::trig::TrigFault;
use thiserror::Error;

/// An error raised while computing a sweep on the host.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
#[non_exhaustive]
pub enum DriverError {
    /// The trigonometric primitive faulted; the sweep is abandoned.
    #[error("{0}")]
    Trig(#[from] TrigFault),
}
