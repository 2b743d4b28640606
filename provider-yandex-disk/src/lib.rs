//! # Yandex Disk Provider
//!
//! REST client for the Yandex Disk cloud storage API.
//!
//! ## Overview
//!
//! This module provides:
//! - OAuth credential validation via the root probe
//! - Lazy recursive tree enumeration with cursor-based pagination
//! - Resolution of paths to ephemeral download links

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::{DiskClientConfig, YandexDiskClient};
pub use error::{Result, YandexDiskError};
pub use http::{HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient};
