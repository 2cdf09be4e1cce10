//! Spotify catalog integration - track search and playlist mutation.
//!
//! # Architecture
//!
//! Same separation as every external API in this crate:
//! - **Domain models** (`domain.rs`) - what the sync core works with
//! - **API DTOs** (`dto.rs`) - exact Web API response shapes
//! - **Adapter** (`adapter.rs`) - DTO to domain conversion, id/URI mapping
//! - **Auth** (`auth.rs`) - OAuth authorization-code flow and token cache
//! - **Client** (`client.rs`) - authenticated HTTP client
//! - **Traits** (`traits.rs`) - [`CatalogApi`] seam plus test mocks
//!
//! # Usage
//!
//! ```ignore
//! let spotify = SpotifyClient::connect(&config.credentials, &data_dir).await?;
//! let page = spotify.search_tracks("track:Black Dog artist:Led Zeppelin").await?;
//! ```

pub mod adapter;
pub mod auth;
pub mod client;
pub mod domain;
pub mod dto;
pub mod traits;

pub use auth::SpotifyAuth;
pub use client::SpotifyClient;
pub use domain::{CatalogError, PlaylistRef, SearchPage};
pub use traits::{CatalogApi, find_or_create_playlist};
