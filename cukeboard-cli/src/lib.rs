// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A reporting backend for Cucumber test results.
//!
//! This crate is the command-line adapter over
//! [cukeboard-core](https://crates.io/crates/cukeboard-core), which holds the
//! store, query and aggregation logic.

#![warn(missing_docs)]

mod dispatch;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use output::OutputWriter;
