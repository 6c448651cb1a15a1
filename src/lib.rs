//! Cellfall engine library.
//!
//! Exposes the board representation, region search, gravity and
//! solvability resolution, the move controller, and protocol modules for
//! use by integration tests and the binary entry points.

pub mod autoplay;
pub mod board;
pub mod config;
pub mod controller;
pub mod engine;
pub mod protocol;
pub mod region;
pub mod resolve;
pub mod supply;
