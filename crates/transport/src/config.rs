//! Negotiation and handoff configuration.

use protocol::{PriorityListError, ProtocolPriorityList};
use thiserror::Error;

use crate::pool::{BufferPool, DEFAULT_POOL_BUFFER_SIZE, DEFAULT_POOL_BUFFERS};

/// Bytes read by a single speculative probe unless configured otherwise.
pub const DEFAULT_PROBE_CAPACITY: usize = 100;

/// What to do when negotiation ends on the legacy fallback protocol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FallbackPolicy {
    /// Hand the connection to the fallback protocol.
    #[default]
    Allow,
    /// Fail with [`HandoffError::ModernProtocolUnsupported`](crate::HandoffError::ModernProtocolUnsupported).
    Reject,
}

/// Sizing of the buffer pool shared by probes and the modern protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PoolConfig {
    /// Maximum number of idle buffers retained.
    pub max_buffers: usize,
    /// Size of each buffer in bytes.
    pub buffer_size: usize,
}

impl PoolConfig {
    /// Builds a pool with this sizing.
    #[must_use]
    pub fn build(&self) -> BufferPool {
        BufferPool::new(self.max_buffers, self.buffer_size)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_buffers: DEFAULT_POOL_BUFFERS,
            buffer_size: DEFAULT_POOL_BUFFER_SIZE,
        }
    }
}

/// Errors reported by [`HandoffConfig::validate`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The probe would never read anything.
    #[error("probe capacity must be greater than zero")]
    ZeroProbeCapacity,
    /// Pool buffers cannot hold any data.
    #[error("pool buffer size must be greater than zero")]
    ZeroBufferSize,
    /// A probe would not fit into a single pool buffer.
    #[error("probe capacity {probe_capacity} exceeds pool buffer size {buffer_size}")]
    ProbeExceedsBuffer {
        /// Configured probe capacity.
        probe_capacity: usize,
        /// Configured pool buffer size.
        buffer_size: usize,
    },
    /// The priority list is invalid.
    #[error(transparent)]
    Priority(#[from] PriorityListError),
}

/// Settings for one negotiation-and-handoff attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HandoffConfig {
    /// Upper bound on the bytes read by one speculative probe.
    pub probe_capacity: usize,
    /// Modern protocols in preference order plus the fallback.
    pub priority: ProtocolPriorityList,
    /// Handling of fallback outcomes.
    pub fallback_policy: FallbackPolicy,
    /// Buffer pool sizing.
    pub pool: PoolConfig,
}

impl HandoffConfig {
    /// Returns the configuration with a different probe capacity.
    pub fn with_probe_capacity(mut self, probe_capacity: usize) -> Self {
        self.probe_capacity = probe_capacity;
        self
    }

    /// Returns the configuration with a different priority list.
    pub fn with_priority(mut self, priority: ProtocolPriorityList) -> Self {
        self.priority = priority;
        self
    }

    /// Returns the configuration with a different fallback policy.
    pub fn with_fallback_policy(mut self, fallback_policy: FallbackPolicy) -> Self {
        self.fallback_policy = fallback_policy;
        self
    }

    /// Returns the configuration with a different pool sizing.
    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    /// Checks that the settings can drive a negotiation.
    ///
    /// The priority list validates itself on construction; this re-checks it
    /// so configurations assembled field by field are covered too.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.probe_capacity == 0 {
            return Err(ConfigError::ZeroProbeCapacity);
        }
        if self.pool.buffer_size == 0 {
            return Err(ConfigError::ZeroBufferSize);
        }
        if self.probe_capacity > self.pool.buffer_size {
            return Err(ConfigError::ProbeExceedsBuffer {
                probe_capacity: self.probe_capacity,
                buffer_size: self.pool.buffer_size,
            });
        }
        ProtocolPriorityList::new(
            self.priority.modern().iter().cloned(),
            self.priority.fallback().clone(),
        )?;
        Ok(())
    }
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            probe_capacity: DEFAULT_PROBE_CAPACITY,
            priority: ProtocolPriorityList::default(),
            fallback_policy: FallbackPolicy::Allow,
            pool: PoolConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::ProtocolName;

    #[test]
    fn defaults_match_documented_values() {
        let config = HandoffConfig::default();
        assert_eq!(config.probe_capacity, 100);
        assert_eq!(config.fallback_policy, FallbackPolicy::Allow);
        assert_eq!(config.pool.max_buffers, 1024);
        assert_eq!(config.pool.buffer_size, 1024);
        assert_eq!(config.priority.fallback(), &ProtocolName::HTTP_1_1);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn builder_methods_replace_fields() {
        let priority =
            ProtocolPriorityList::new([ProtocolName::SPDY_3], ProtocolName::HTTP_1_1).unwrap();
        let config = HandoffConfig::default()
            .with_probe_capacity(16)
            .with_priority(priority.clone())
            .with_fallback_policy(FallbackPolicy::Reject)
            .with_pool(PoolConfig {
                max_buffers: 2,
                buffer_size: 32,
            });

        assert_eq!(config.probe_capacity, 16);
        assert_eq!(config.priority, priority);
        assert_eq!(config.fallback_policy, FallbackPolicy::Reject);
        assert_eq!(config.pool.build().buffer_size(), 32);
    }

    #[test]
    fn zero_probe_capacity_is_rejected() {
        let config = HandoffConfig::default().with_probe_capacity(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroProbeCapacity));
    }

    #[test]
    fn zero_buffer_size_is_rejected() {
        let config = HandoffConfig::default().with_pool(PoolConfig {
            max_buffers: 4,
            buffer_size: 0,
        });
        assert_eq!(config.validate(), Err(ConfigError::ZeroBufferSize));
    }

    #[test]
    fn probe_larger_than_pool_buffer_is_rejected() {
        let config = HandoffConfig::default().with_probe_capacity(4096);
        assert_eq!(
            config.validate(),
            Err(ConfigError::ProbeExceedsBuffer {
                probe_capacity: 4096,
                buffer_size: 1024,
            })
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_fills_in_defaults() {
        let config: HandoffConfig =
            serde_json::from_str(r#"{"probe_capacity":64,"fallback_policy":"reject"}"#).unwrap();
        assert_eq!(config.probe_capacity, 64);
        assert_eq!(config.fallback_policy, FallbackPolicy::Reject);
        assert_eq!(config.pool, PoolConfig::default());
    }
}
