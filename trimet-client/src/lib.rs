//! Client for the TriMet real-time web services.
//!
//! Fetches arrivals at stops and current service detours from TriMet
//! (Portland, Oregon) and maps the XML responses into typed records.

pub mod domain;
pub mod trimet;
