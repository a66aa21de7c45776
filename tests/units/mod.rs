//! Integration tests for the unit registry

// Tests for parsing units and quantities and for custom definitions
mod registry_tests;
