// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for [cukeboard](https://crates.io/crates/cukeboard-cli):
//! storage, querying and aggregation of Cucumber test results.
//!
//! Reports parsed with [`quick_cucumber`] are converted by [`ingest`] and
//! written through [`service`] into a [`store`]; [`views`] derives listings,
//! failure groups, statistics and history from what is stored.

pub mod config;
pub mod errors;
pub mod ingest;
pub mod model;
pub mod query;
pub mod service;
pub mod store;
pub mod views;
