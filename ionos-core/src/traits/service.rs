//! Collaborator service traits
//!
//! Services wrap I/O with unbounded latency (storage, audio, network,
//! power sensing). The kernel polls each attached service once per tick;
//! results come back as events, never as blocking return values.

use core::fmt;

use crate::event::EventSink;

/// Service failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServiceError {
    /// Hardware missing or not responding
    Unavailable,
    /// An operation is already in progress
    Busy,
    /// Operation failed
    Failed,
    /// No room to attach another service
    TooManyServices,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Unavailable => write!(f, "service unavailable"),
            ServiceError::Busy => write!(f, "service busy"),
            ServiceError::Failed => write!(f, "service operation failed"),
            ServiceError::TooManyServices => write!(f, "too many services attached"),
        }
    }
}

/// Service status as reported to diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServiceStatus {
    /// Not initialised, or shut down
    #[default]
    Stopped,
    Idle,
    Busy,
    Error(ServiceError),
}

/// A background collaborator with an explicit lifecycle
pub trait Service {
    fn name(&self) -> &str;

    /// Bring the service up; called once from kernel start
    fn init(&mut self) -> Result<(), ServiceError>;

    /// Release resources; called once from kernel shutdown
    fn shutdown(&mut self) {}

    /// Make progress without blocking
    ///
    /// Completions and notable conditions are posted to `events`.
    fn update(&mut self, now_ms: u32, events: &dyn EventSink);

    fn status(&self) -> ServiceStatus;
}

/// A service that runs one asynchronous operation at a time
///
/// `start` only queues the work; progress happens in [`Service::update`].
pub trait OperationService: Service {
    type Operation;

    /// Begin an operation; fails with [`ServiceError::Busy`] if one is running
    fn start(&mut self, op: Self::Operation) -> Result<(), ServiceError>;
}
