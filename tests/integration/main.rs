//! Integration test entry point.
//!
//! Single binary so the mock hardware module is shared across test files.

mod mock_hw;
mod thermostat_flow_tests;
