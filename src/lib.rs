//! Multi-variant media conversion: one input, many MP3 bitrates or MP4
//! resolutions, produced by `ffmpeg` one variant at a time.

pub mod app;
pub mod common;
pub mod config;
pub mod docs;
pub mod infrastructure;
pub mod modules;
pub mod pipeline;
pub mod routes;
pub mod state;
