//! Configuration for the spawner lifecycle.

use std::time::Duration;

/// Timing policy for the start poll loop.
///
/// The defaults reproduce the historical 15 attempts at one-second spacing;
/// both knobs are configurable because the right ceiling depends on how
/// long the target partition usually queues.
#[derive(Debug, Clone)]
pub struct SpawnerConfig {
    /// Maximum state queries while waiting for the job to reach RUNNING.
    pub start_poll_attempts: u32,
    /// Delay between consecutive state queries during start.
    pub start_poll_interval: Duration,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            start_poll_attempts: 15,
            start_poll_interval: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawner_config_defaults() {
        let config = SpawnerConfig::default();
        assert_eq!(config.start_poll_attempts, 15);
        assert_eq!(config.start_poll_interval, Duration::from_secs(1));
    }
}
