// src/lib.rs

//! Line-length analysis for sizing the read buffers of chunked text
//! processing, plus the byte-range slicer those buffers feed.

pub mod analyzer;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod markdown;
pub mod model;
pub mod renderer;
pub mod slice;
