//! Source header checks.
mod scan;

pub use scan::{Violation, check_headers, scan};

/// The notice every source file must open with, one entry per line.
pub const REQUIRED_HEADER: [&str; 2] = [
    "# Copyright (c) Microsoft Corporation. All rights reserved.",
    "# Licensed under the MIT license.",
];
