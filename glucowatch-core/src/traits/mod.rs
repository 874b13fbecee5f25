//! Collaborator Traits
//!
//! The core never touches hardware directly. Every board-specific concern is
//! behind one of these traits and injected into [`Monitor`]:
//!
//! ```text
//!                 ┌─────────────────────────────┐
//!   GlucoseSensor │                             │ Transport
//!   ─────────────→│           Monitor           │──────────→
//!                 │  store · filter · alarms ·  │
//!   PowerControl  │  scheduler · transmit       │ Cipher
//!   ←────────────→│                             │←─────────→
//!                 └─────────────────────────────┘
//! ```
//!
//! Fallible operations return the typed errors from [`errors`]. Sends use
//! [`nb::Result`]: `WouldBlock` is backpressure and the core simply tries
//! again next cycle.
//!
//! `init` has a no-op default on every trait so simple drivers and test
//! doubles only implement what they need.
//!
//! [`Monitor`]: crate::monitor::Monitor
//! [`errors`]: crate::errors

pub mod crypto;
pub mod power;
pub mod sensor;
pub mod transport;

pub use crypto::{Cipher, Payload, MAX_PAYLOAD_SIZE};
pub use power::PowerControl;
pub use sensor::{GlucoseSensor, SensorSample};
pub use transport::Transport;
