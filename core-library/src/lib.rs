//! # Library Module
//!
//! Owns the user's collections and the static catalog they are drawn from.
//!
//! ## Overview
//!
//! This module manages:
//! - The compiled-in frequency catalog with lookup and search
//! - Favorites and the bounded recent history (`LibraryStore`)
//! - Application settings with code-supplied defaults (`SettingsManager`)
//! - Storage keys and maintenance helpers for the key-value backend

pub mod catalog;
pub mod error;
pub mod models;
pub mod settings;
pub mod storage;
pub mod store;

pub use error::{LibraryError, Result};
pub use models::{FavoritesView, LibraryStats, RecentEntry, Track, TrackId};
pub use settings::SettingsManager;
pub use store::LibraryStore;
