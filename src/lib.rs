//! Streams a four value hand control signal (finger closures and thumb
//! abduction) to a remote pose predictor and drives an articulated hand from
//! the 45 joint angles it sends back.
//!
//! The exchange is strict lock-step over one TCP connection: a 16 byte
//! request, then a 180 byte response, repeated on a dedicated worker thread.
//! The application side only ever reads the latest decoded pose.

pub mod codec;
pub mod config;
pub mod dataset;
pub mod error;
pub mod pose_sink;
pub mod sample;
pub mod slot;
pub mod sync_client;
pub mod types;

pub use error::{Error, Result};
