//! Application layer use cases for the host bridge.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure rules in `famikb-core`) and the infrastructure (device nodes, the
//! I2C bus, config files).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain objects to fulfil a goal (e.g. "turn this batch
//!   of evdev events into one frame for the adapter").
//! - **Depend on abstractions** (traits) rather than concrete implementations,
//!   so tests can swap in scripted devices and a recording bus.
//! - **Contain no OS calls**.
//!
//! # Sub-modules
//!
//! - **`bridge_input`** – The readiness loop.  Runs on every key press and
//!   mouse packet, and owns the only copy of the input state.
//!
//! - **`select_devices`** – Classifies the host's input devices and picks one
//!   keyboard and one mouse, asking the operator when there is a choice.

pub mod bridge_input;
pub mod select_devices;
