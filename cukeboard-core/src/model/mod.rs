// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain records stored and queried by cukeboard: test runs, features,
//! scenarios and their parts.

mod feature;
mod ids;
mod scenario;
mod status;
mod testrun;

pub use feature::*;
pub use ids::*;
pub use scenario::*;
pub use status::*;
pub use testrun::*;
