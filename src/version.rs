// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Civic Vision API

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Version of the HTTP contract served
pub const API_VERSION: &str = "1.0.0";

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Civic Vision API {} (api {})", VERSION_NUMBER, API_VERSION)
}
