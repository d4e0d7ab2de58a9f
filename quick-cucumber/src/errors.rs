// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

/// An error that occurs while parsing a [`Report`](crate::Report) from JSON.
///
/// Returned by [`Report::from_str`](crate::Report::from_str),
/// [`Report::from_slice`](crate::Report::from_slice) and
/// [`Report::from_reader`](crate::Report::from_reader).
#[derive(Debug, Error)]
#[error("error parsing Cucumber JSON report")]
pub struct ParseError {
    #[from]
    inner: serde_json::Error,
}

/// An error that occurs while serializing a [`Report`](crate::Report) to
/// JSON.
///
/// Returned by [`Report::to_string`](crate::Report::to_string).
#[derive(Debug, Error)]
#[error("error serializing Cucumber JSON report")]
pub struct SerializeError {
    #[from]
    inner: serde_json::Error,
}
