//! Collaborator traits
//!
//! These traits define the interface between the kernel and everything it
//! drives but does not implement: the display and background services.

pub mod service;

pub use ionos_display::{DisplayBackend, DisplayError, DisplayExt, Viewport};
pub use service::{OperationService, Service, ServiceError, ServiceStatus};
