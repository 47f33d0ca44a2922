//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific flow across
//! subsystems against mock hardware.  All tests run on the host with the
//! `critical-section` std implementation; no real tick interrupt required.

mod dispatch_flow_tests;
mod mock_hw;
