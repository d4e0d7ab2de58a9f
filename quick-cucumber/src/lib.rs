// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read and build Cucumber JSON reports in Rust.
//!
//! Every mainstream Cucumber implementation (cucumber-jvm, cucumber-js,
//! behave, …) can emit a JSON report: an array of features, each holding the
//! scenarios and steps that were executed along with their results, tags and
//! embedded attachments. This crate models that format as plain data
//! structures that deserialize with [`serde`], plus a small constructor API
//! for building reports in tests and tools.
//!
//! The format has no official schema and implementations disagree on minor
//! details; unknown fields are ignored and optional fields default to empty,
//! so reports from any of the common producers parse.
//!
//! # Example
//!
//! ```
//! use quick_cucumber::{Report, Status};
//!
//! let json = r#"[{
//!     "uri": "features/login.feature",
//!     "keyword": "Feature",
//!     "name": "Login",
//!     "elements": [{
//!         "keyword": "Scenario",
//!         "type": "scenario",
//!         "name": "Successful login",
//!         "steps": [{
//!             "keyword": "Given ",
//!             "name": "a registered user",
//!             "result": { "status": "passed", "duration": 1200 }
//!         }]
//!     }]
//! }]"#;
//!
//! let report = Report::from_str(json).unwrap();
//! assert_eq!(report.features.len(), 1);
//! let step = &report.features[0].elements[0].steps[0];
//! assert_eq!(step.result.as_ref().unwrap().status, Status::Passed);
//! ```

mod errors;
mod report;

pub use errors::*;
pub use report::*;
