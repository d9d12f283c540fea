//! Field rules shared by the request payloads.

pub mod rules;
