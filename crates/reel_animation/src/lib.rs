//! Reel Animation System
//!
//! Display-frame scheduling for controls that poll state once per frame.
//!
//! # Features
//!
//! - **Frame requests**: one-shot callbacks keyed by id, fired on the next frame
//! - **Cancellation**: explicit and idempotent
//! - **Frame pacing**: frame interval derived from a target frame rate

pub mod scheduler;

pub use scheduler::{FrameRequestId, FrameScheduler, FrameTick};
