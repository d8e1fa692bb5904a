use std::time::Duration;

/// Rate limiting posture declared by a provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimit {
    /// Maximum in-flight requests against this source.
    pub max_concurrency: usize,
    /// Minimum delay inserted between consecutive requests.
    pub min_delay: Duration,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            min_delay: Duration::ZERO,
        }
    }
}
