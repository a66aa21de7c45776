//! Integration tests for the parameter system
//!
//! These tests verify that parameters, collections and stores behave correctly
//! in the situations a simulation pipeline runs into.

// Tests for the Parameter struct
mod parameter_tests;


// Tests for master parameters and the ParameterStore
mod store_tests;
