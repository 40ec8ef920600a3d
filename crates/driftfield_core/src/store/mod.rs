//! # Double-Buffered Particle Store
//!
//! ## The Problem
//!
//! ```text
//! Tick lanes:  READ previous state of every particle
//!              WRITE next state of every particle
//!
//! Same buffer for both: a lane may read a peer that is already updated
//! ```
//!
//! ## The Solution: Double Buffering
//!
//! ```text
//! Tick N:
//!   every lane reads Buffer A (front), writes Buffer B (back)
//!   publish: front index flips to B
//!
//! Tick N+1:
//!   every lane reads Buffer B, writes Buffer A
//! ```
//!
//! Each tick overwrites every slot of the back buffer, so nothing has to be
//! copied across after the flip.

mod double_buffer;

pub use double_buffer::{DoubleBufferedStore, StoreReadHandle, TickReport, BACK_BUFFER_WAIT};
