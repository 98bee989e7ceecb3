//! Unit test suite for the Chequeflow workflow crate.
//!
//! Property tests for store transitions and the back stack that go beyond
//! the in-module tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod unit;
