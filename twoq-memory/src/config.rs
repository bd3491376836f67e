//  Copyright 2026 twoq Project Authors
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

use serde::{Deserialize, Serialize};
use twoq_common::error::{Error, Result};

/// Sizing policy of the witness tracker.
///
/// The policy yields an entry count, never a memory size: witnesses carry no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WitnessCapacity {
    /// `n` witnesses per KB of the total budget.
    ///
    /// Over-provisions the tracker relative to the objects the budget can hold, so positions that fell out of the
    /// probationary region are still recognized when they come back.
    PerKb(usize),
    /// A fixed count of witnesses, independent of the budget.
    Fixed(usize),
}

impl Default for WitnessCapacity {
    fn default() -> Self {
        Self::PerKb(4)
    }
}

impl WitnessCapacity {
    /// Witness count for the given total budget (KB).
    pub fn entries(&self, budget_kb: usize) -> usize {
        match self {
            Self::PerKb(n) => n.saturating_mul(budget_kb),
            Self::Fixed(n) => *n,
        }
    }
}

/// Two-queue cache config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoQueueConfig {
    /// Total memory budget (KB) shared by the protected and the probationary region.
    ///
    /// Zero is accepted and makes each region keep only the object inserted last.
    pub budget_kb: usize,
    /// Share of the budget given to the protected region. The probationary region gets the rest.
    ///
    /// Must be in `0.0..=1.0`.
    pub protected_ratio: f64,
    /// Sizing policy of the witness tracker.
    pub witness_capacity: WitnessCapacity,
}

impl Default for TwoQueueConfig {
    fn default() -> Self {
        Self {
            budget_kb: 0,
            protected_ratio: 0.8,
            witness_capacity: WitnessCapacity::default(),
        }
    }
}

impl TwoQueueConfig {
    /// Check the config.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.protected_ratio) {
            return Err(Error::config(format!(
                "protected_ratio must be in 0.0..=1.0, given: {}",
                self.protected_ratio
            )));
        }
        Ok(())
    }

    /// Capacity of the protected region (KB) for the given budget.
    pub fn protected_capacity(&self, budget_kb: usize) -> usize {
        ((budget_kb as f64 * self.protected_ratio) as usize).min(budget_kb)
    }

    /// Capacity of the probationary region (KB) for the given budget.
    pub fn probationary_capacity(&self, budget_kb: usize) -> usize {
        budget_kb - self.protected_capacity(budget_kb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split() {
        let config = TwoQueueConfig::default();
        assert_eq!(config.protected_capacity(100), 80);
        assert_eq!(config.probationary_capacity(100), 20);
        assert_eq!(config.protected_capacity(7), 5);
        assert_eq!(config.probationary_capacity(7), 2);
        assert_eq!(config.protected_capacity(0), 0);
        assert_eq!(config.probationary_capacity(0), 0);
    }

    #[test]
    fn test_witness_capacity() {
        assert_eq!(WitnessCapacity::default().entries(100), 400);
        assert_eq!(WitnessCapacity::Fixed(1024).entries(100), 1024);
        assert_eq!(WitnessCapacity::PerKb(usize::MAX).entries(2), usize::MAX);
    }

    #[test]
    fn test_validate() {
        assert!(TwoQueueConfig::default().validate().is_ok());
        let config = TwoQueueConfig {
            protected_ratio: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        let config = TwoQueueConfig {
            protected_ratio: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize() {
        let config: TwoQueueConfig =
            serde_json::from_str(r#"{"budget_kb":4096,"protected_ratio":0.75,"witness_capacity":{"Fixed":512}}"#)
                .unwrap();
        assert_eq!(config.budget_kb, 4096);
        assert_eq!(config.protected_capacity(config.budget_kb), 3072);
        assert_eq!(config.probationary_capacity(config.budget_kb), 1024);
        assert_eq!(config.witness_capacity.entries(config.budget_kb), 512);
    }
}
