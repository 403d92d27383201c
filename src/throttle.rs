// Copyright (c) 2026 Seitti Labs Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Seitti Labs Oy - Adaptive Throttle
 * Additive delay control driven by consecutive fetch failures
 *
 * @copyright 2026 Seitti Labs Oy
 * @license Proprietary - Enterprise Edition
 */

use std::time::Duration;

/// Throttle tuning parameters
#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    /// Minimum inter-request delay
    pub floor: Duration,

    /// Maximum inter-request delay
    pub ceiling: Duration,

    /// Added per penalty once the error threshold is crossed
    pub increase_step: Duration,

    /// Removed per healthy iteration
    pub decrease_step: Duration,

    /// Consecutive failures tolerated before slowing down
    pub error_threshold: u32,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            floor: Duration::from_millis(50),
            ceiling: Duration::from_millis(2000),
            increase_step: Duration::from_millis(250),
            decrease_step: Duration::from_millis(50),
            error_threshold: 5,
        }
    }
}

/// Adaptive inter-request delay. Not shared across tasks; each run owns one.
#[derive(Debug)]
pub struct AdaptiveThrottle {
    config: ThrottleConfig,
    delay: Duration,
    error_streak: u32,
}

impl AdaptiveThrottle {
    pub fn new(config: ThrottleConfig) -> Self {
        let delay = config.floor;
        Self {
            config,
            delay,
            error_streak: 0,
        }
    }

    pub fn current_delay(&self) -> Duration {
        self.delay
    }

    pub fn error_streak(&self) -> u32 {
        self.error_streak
    }

    /// Record a fetch failure. Returns the new delay if it changed.
    pub fn record_failure(&mut self) -> Option<Duration> {
        self.error_streak += 1;
        if self.error_streak > self.config.error_threshold {
            let raised = (self.delay + self.config.increase_step).min(self.config.ceiling);
            if raised != self.delay {
                self.delay = raised;
                return Some(self.delay);
            }
        }
        None
    }

    /// Record a successful fetch. Returns the new delay if it changed.
    pub fn record_success(&mut self) -> Option<Duration> {
        self.error_streak = 0;
        if self.delay > self.config.floor {
            let lowered = self
                .delay
                .saturating_sub(self.config.decrease_step)
                .max(self.config.floor);
            if lowered != self.delay {
                self.delay = lowered;
                return Some(self.delay);
            }
        }
        None
    }

    /// Sleep for the current delay
    pub async fn pause(&self) {
        tokio::time::sleep(self.delay).await;
    }
}

impl Default for AdaptiveThrottle {
    fn default() -> Self {
        Self::new(ThrottleConfig::default())
    }
}
