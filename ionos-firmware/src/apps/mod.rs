//! Built-in applications

pub mod about;
pub mod launcher;

pub use about::About;
pub use launcher::Launcher;
