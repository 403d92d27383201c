// Copyright (c) 2026 Seitti Labs Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Seitti Labs Oy - Spider Variants
 *
 * @copyright 2026 Seitti Labs Oy
 * @license Proprietary - Enterprise Edition
 */

pub mod clickjacking;
pub mod injection;
pub mod open_redirect;
pub mod param_hunter;
pub mod takeover;
pub mod wordpress;

pub use clickjacking::ClickjackingSpider;
pub use injection::InjectionSpider;
pub use open_redirect::OpenRedirectSpider;
pub use param_hunter::ParamHunterSpider;
pub use takeover::TakeoverSpider;
pub use wordpress::WordPressSpider;
