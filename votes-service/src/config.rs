//! Configuration types for the RatingService.
use std::time::Duration;

use votes_shared::types::RatingScale;

/// Default upper bound on the length of a vote's free-text comment.
pub const DEFAULT_MAX_TEXT_LEN: usize = 128;

/// Configuration for the RatingService.
#[derive(Debug, Clone)]
pub struct RatingServiceConfig {
    /// The numeric domain ratings are validated against.
    pub scale: RatingScale,
    /// Maximum number of characters accepted in a vote's text.
    pub max_text_len: usize,
    /// How many times a cast that lost a same-key race is repeated.
    ///
    /// Zero disables retries and surfaces the conflict immediately.
    pub duplicate_retries: usize,
    /// Pause before each repeated cast.
    pub retry_delay: Duration,
}

impl Default for RatingServiceConfig {
    fn default() -> Self {
        Self {
            scale: RatingScale::TriState,
            max_text_len: DEFAULT_MAX_TEXT_LEN,
            duplicate_retries: 1,
            retry_delay: Duration::from_millis(10),
        }
    }
}

impl RatingServiceConfig {
    pub fn with_scale(mut self, scale: RatingScale) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_max_text_len(mut self, max_text_len: usize) -> Self {
        self.max_text_len = max_text_len;
        self
    }

    pub fn with_duplicate_retries(mut self, retries: usize) -> Self {
        self.duplicate_retries = retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}
