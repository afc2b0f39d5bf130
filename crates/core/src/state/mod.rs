//! State management for the simulation.
//!
//! This module provides:
//! - The pure state machine transitions
//! - StateManager, which feeds view operations to the simulator

pub mod manager;
pub mod transitions;
