// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-side projections over stored scenarios: listings, failure groups,
//! step definition usage, statistics and history.

mod access;
mod items;
mod similarity;
mod stats;

pub use access::*;
pub use items::*;
pub use similarity::*;
pub use stats::*;
