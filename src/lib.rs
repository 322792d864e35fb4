//! Career Guide - AI career consultation
//!
//! A fixed-length interview driven by a generative counselor that ends in
//! a personalized learning roadmap.

// Exported-API lints; every module here is public to the binary
#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions
)]

pub mod auth;
pub mod config;
pub mod generator;
pub mod llm;
pub mod roadmap;
pub mod runtime;
pub mod state_machine;
