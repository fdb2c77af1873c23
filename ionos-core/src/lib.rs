//! Board-agnostic kernel for the ionOS handheld firmware
//!
//! This crate contains everything with real state-machine and timing
//! concerns, none of which depends on specific hardware:
//!
//! - Bounded, critical-section guarded event queue
//! - Button debounce / long-press / key-repeat state machine
//! - Application registry enforcing a single active application
//! - Cooperative kernel tick loop
//! - Screen stack with timed, eased transitions
//! - Configuration types and collaborator service traits

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod app;
pub mod config;
pub mod event;
pub mod input;
pub mod kernel;
pub mod traits;
pub mod ui;

pub use app::{App, AppContext, AppId, AppRegistry, AppRequest, AppState, LifecycleError};
pub use config::KernelConfig;
pub use event::{
    ButtonAction, ButtonId, Event, EventPriority, EventQueue, EventSink, EventType, QueueError,
};
pub use kernel::{Kernel, KernelStats, TickReport};
pub use traits::{Service, ServiceError, ServiceStatus};
pub use ui::{Easing, NavError, Navigator, ScreenId, TransitionKind};
