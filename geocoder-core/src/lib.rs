//! Core library for the `geocoder` CLI.
//!
//! This crate defines:
//! - Field value preparation (text, geofield, postal address)
//! - Abstraction over geocoding providers and an ordered-fallback geocoder
//! - Result caching (in memory or on disk)
//! - Dumpers that turn a resolved address into GeoJSON, GPX, KML, WKT,
//!   geohash or plain text
//! - A field formatter binding all of the above together
//!
//! It is used by `geocoder-cli`, but can also be reused by other binaries or services.

pub mod cache;
pub mod config;
pub mod dumper;
pub mod error;
pub mod formatter;
pub mod geocoder;
pub mod geometry;
pub mod model;
pub mod prepare;
pub mod provider;

pub use cache::{CacheKey, CacheStore, DiskCache, MemoryCache};
pub use config::{Config, ProviderConfig};
pub use dumper::{Dumper, DumperId, dumper_for};
pub use error::{Error, Result};
pub use formatter::{FieldFormatter, FormattedItem, FormatterSettings};
pub use geocoder::Geocoder;
pub use model::{Address, AddressCollection, Bounds, Coordinates, GeocodeRequest, Query};
pub use prepare::{Direction, FieldType, FieldValue, PreparedValue, prepare};
pub use provider::{GeocodeProvider, ProviderError, ProviderId, ProviderRegistry};
