//! Reel Core
//!
//! Foundational primitives shared by the Reel replay crates:
//!
//! - **State Machines**: typed flat state machines
//! - **Input Events**: pointer and keyboard events routed to controls
//! - **Emitters**: listener registries for fan-out notifications
//!
//! # Example
//!
//! ```rust
//! use reel_core::fsm::StateMachine;
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
//! enum Light { Off, On }
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
//! enum Switch { Flip }
//!
//! let mut fsm = StateMachine::builder(Light::Off)
//!     .on(Light::Off, Switch::Flip, Light::On)
//!     .on(Light::On, Switch::Flip, Light::Off)
//!     .build();
//!
//! assert_eq!(fsm.send(Switch::Flip), Some(Light::On));
//! assert!(fsm.is_in(Light::On));
//! ```

pub mod emitter;
pub mod events;
pub mod fsm;

pub use emitter::{Emitter, ListenerId};
pub use events::{InputEvent, KeyCode, KeyEvent, Modifiers, PointerButton, PointerEvent, Rect};
pub use fsm::{StateMachine, StateMachineBuilder, Transition};
