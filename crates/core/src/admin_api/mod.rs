//! Administrative API abstraction.
//!
//! This module provides an `AdminApi` trait covering the REST endpoints the
//! provisioning run needs, with a GeoServer implementation.

mod geoserver;
mod types;

pub use geoserver::GeoServerClient;
pub use types::*;
