//! Common test utilities for the simulator integration tests.
//!
//! - Test fixtures (catalogs, simulators, temporary projects)
//! - Assertions and event helpers

pub mod assertions;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
