//! # caseseed Core
//!
//! I/O-free logic for caseseed: paragraph normalization, greedy chunk
//! packing, seed SQL rendering, and the models shared between them.
//!
//! This crate contains no tokio, HTTP, or filesystem access. Everything
//! here is a pure function of its inputs.

pub mod chunk;
pub mod models;
pub mod paragraph;
pub mod seed;
