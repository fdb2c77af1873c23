//! Button input processing
//!
//! ```text
//! raw samples ──► Button (per key) ──► ButtonAction ──► Event ──► EventQueue
//!                 Released ─► Pressed ─► Held
//!                     ▲          │         │
//!                     └──────────┴─────────┘  (release)
//! ```

pub mod button;
pub mod debouncer;

pub use button::{Button, ButtonState};
pub use debouncer::Debouncer;
