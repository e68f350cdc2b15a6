//! Dot-matrix audio player widget.
//!
//! The playback logic lives in [`controller::PlaybackController`], generic
//! over the [`media::MediaElement`] that plays audio and the
//! [`store::SongStore`] songs are deleted from. [`app::PlayerApp`] draws it
//! with egui. On `wasm32` the crate also exports the page entry point.

pub mod app;
pub mod config;
pub mod controller;
pub mod dot_matrix;
pub mod error;
pub mod media;
pub mod page;
pub mod playlist;
pub mod radial;
pub mod store;
pub mod ui;
pub mod waveform;

#[cfg(target_arch = "wasm32")]
mod web;

pub use app::PlayerApp;
pub use config::PlayerConfig;
pub use controller::PlaybackController;
pub use error::{DeleteError, PlayerError};
