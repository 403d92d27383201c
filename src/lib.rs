// Copyright (c) 2026 Seitti Labs Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Seitti Labs Oy - Spider Suite Library
 * Exposes the crawl engine and spider variants for testing
 *
 * @copyright 2026 Seitti Labs Oy
 * @license Proprietary - Enterprise Edition
 */

pub mod browser;
pub mod control;
pub mod dns;
pub mod events;
pub mod extractor;
pub mod fetcher;
pub mod frontier;
pub mod payloads;
pub mod reporter;
pub mod signatures;
pub mod store;
pub mod throttle;
pub mod types;

// Production error handling
pub mod errors;

// Spider variants
pub mod spiders;

pub use errors::{NetworkError, SpiderError, SpiderResult};
pub use types::{Finding, FindingStatus, ScanMode, SpiderOptions};
