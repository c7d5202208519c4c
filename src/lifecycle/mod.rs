//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Ctrl+C → broadcast to subscribers → stop accepting → drain → exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
