//! Generic provider-chain runner.
//!
//! Both the screenshot and vision stages are ordered lists of interchangeable
//! providers. This module drives any such list: bounded per-provider retries
//! with exponential backoff, a fixed cooldown between providers, cancellation
//! between suspension points, and a diagnostic record per attempt.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::types::{AttemptOutcome, ProviderAttemptRecord};

/// Result of a single provider attempt.
pub type AttemptResult<T> = std::result::Result<T, ProviderFailure>;

/// Why a single provider attempt produced no usable result.
#[derive(Debug, Clone)]
pub enum ProviderFailure {
    /// The call itself failed (HTTP error, timeout, parse failure).
    Failed { reason: String },
    /// The call returned, but the result failed validation.
    Invalid { reasons: Vec<String> },
}

impl ProviderFailure {
    pub fn failed(reason: impl Into<String>) -> Self {
        ProviderFailure::Failed {
            reason: reason.into(),
        }
    }

    pub fn invalid(reasons: Vec<String>) -> Self {
        ProviderFailure::Invalid { reasons }
    }

    fn outcome(&self) -> AttemptOutcome {
        match self {
            ProviderFailure::Failed { .. } => AttemptOutcome::Failure,
            ProviderFailure::Invalid { .. } => AttemptOutcome::Invalid,
        }
    }

    fn reason_text(&self) -> String {
        match self {
            ProviderFailure::Failed { reason } => reason.clone(),
            ProviderFailure::Invalid { reasons } => reasons.join("; "),
        }
    }
}

/// Retry/backoff policy shared by all provider chains.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct RetryPolicy {
    #[serde(with = "humantime_serde")]
    pub base_delay: Duration,
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,
    /// Pause after a provider is exhausted, before trying the next one.
    #[serde(with = "humantime_serde")]
    pub provider_cooldown: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            provider_cooldown: Duration::from_secs(1),
        }
    }
}

/// Backoff before attempt `attempt + 1` of the same provider:
/// `min(base * 2^attempt, max)`.
pub fn backoff_delay(policy: &RetryPolicy, attempt: u32) -> Duration {
    policy
        .base_delay
        .saturating_mul(2u32.saturating_pow(attempt))
        .min(policy.max_delay)
}

/// Identity and retry budget of one chain member.
#[derive(Debug, Clone)]
pub struct ChainSlot {
    pub name: String,
    pub max_retries: u32,
}

/// Result of driving a chain to completion.
#[derive(Debug)]
pub struct ChainOutcome<T> {
    /// The first accepted result, if any provider produced one.
    pub value: Option<T>,
    /// One record per attempt across all providers, in order.
    pub attempts: Vec<ProviderAttemptRecord>,
}

impl<T> ChainOutcome<T> {
    fn exhausted(attempts: Vec<ProviderAttemptRecord>) -> Self {
        Self {
            value: None,
            attempts,
        }
    }
}

/// Runs `attempt(provider_index, attempt_index)` over the slots in order,
/// stopping at the first success. A provider with `max_retries = N` is
/// attempted exactly N times. Exhaustion of the whole chain is not an error;
/// the caller sees `value: None` plus the attempt trail.
pub async fn run_chain<T, F, Fut>(
    slots: &[ChainSlot],
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut attempt: F,
) -> ChainOutcome<T>
where
    F: FnMut(usize, u32) -> Fut,
    Fut: Future<Output = AttemptResult<T>>,
{
    let mut records = Vec::new();

    for (index, slot) in slots.iter().enumerate() {
        let budget = slot.max_retries.max(1);
        for attempt_index in 0..budget {
            if cancel.is_cancelled() {
                return ChainOutcome::exhausted(records);
            }

            let start = Instant::now();
            let result = tokio::select! {
                _ = cancel.cancelled() => return ChainOutcome::exhausted(records),
                result = attempt(index, attempt_index) => result,
            };
            let latency = start.elapsed();

            match result {
                Ok(value) => {
                    debug!(
                        provider = %slot.name,
                        attempt = attempt_index,
                        latency_ms = latency.as_millis() as u64,
                        "provider attempt succeeded"
                    );
                    records.push(ProviderAttemptRecord {
                        provider: slot.name.clone(),
                        attempt_index,
                        outcome: AttemptOutcome::Success,
                        latency,
                        error_reason: None,
                    });
                    return ChainOutcome {
                        value: Some(value),
                        attempts: records,
                    };
                }
                Err(failure) => {
                    warn!(
                        provider = %slot.name,
                        attempt = attempt_index,
                        reason = %failure.reason_text(),
                        "provider attempt failed"
                    );
                    records.push(ProviderAttemptRecord {
                        provider: slot.name.clone(),
                        attempt_index,
                        outcome: failure.outcome(),
                        latency,
                        error_reason: Some(failure.reason_text()),
                    });

                    if attempt_index + 1 < budget
                        && !sleep_or_cancel(backoff_delay(policy, attempt_index), cancel).await
                    {
                        return ChainOutcome::exhausted(records);
                    }
                }
            }
        }

        if index + 1 < slots.len()
            && !sleep_or_cancel(policy.provider_cooldown, cancel).await
        {
            return ChainOutcome::exhausted(records);
        }
    }

    ChainOutcome::exhausted(records)
}

/// Sleeps for `delay` unless cancelled first. Returns false on cancellation.
async fn sleep_or_cancel(delay: Duration, cancel: &CancellationToken) -> bool {
    if delay.is_zero() {
        return !cancel.is_cancelled();
    }
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}
