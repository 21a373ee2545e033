//! Library for logwild containing the burst rate controller
//! and the payload and sink collaborators it drives.
//!
//! The binary crate only adds the CLI and HTTP surfaces on top of this.

#![cfg_attr(
    not(test),
    warn(clippy::print_stdout, clippy::dbg_macro),
    deny(clippy::unwrap_used, clippy::expect_used)
)]

pub mod burst;
pub mod payload;
pub mod sink;
pub mod utils;
