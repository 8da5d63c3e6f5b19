//! Domain services used by HTTP routes.
//!
//! Service modules own persistence so route handlers stay focused on
//! protocol translation.

pub mod snapshot;
