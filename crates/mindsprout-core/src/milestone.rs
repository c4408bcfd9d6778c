//! Growth milestone resolution.
//!
//! Cumulative practice minutes unlock named growth stages. The table is
//! static configuration: strictly increasing thresholds, the first at zero,
//! so resolution is total and the same in every process that runs it.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One entry in the milestone table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneStage {
    /// Display name of the growth stage.
    pub name: String,
    /// Minimum cumulative minutes (inclusive) to reach this stage.
    pub min_minutes: u64,
    /// Icon token rendered by the presentation layer.
    pub icon: String,
}

/// Result of resolving a total-minutes value against the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResolution {
    /// The reached stage.
    pub stage: MilestoneStage,
    /// Minutes threshold of the next stage, absent at the top stage.
    pub next_threshold: Option<u64>,
    /// Progress toward the next stage, in [0, 1]. Exactly 1.0 only at the
    /// top stage or when the next threshold is reached exactly.
    pub progress_fraction: f64,
}

/// Ordered milestone threshold table.
///
/// Only constructible through [`MilestoneTable::new`] (or `Default`), so
/// every table seen by [`resolve`](Self::resolve) has passed validation.
/// Deliberately not deserializable; configs carry a `Vec<MilestoneStage>`
/// and validate it through `new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneTable {
    stages: Vec<MilestoneStage>,
}

impl Default for MilestoneTable {
    fn default() -> Self {
        let stages = [
            ("Seed", 0, "seed"),
            ("Sprout", 30, "sprout"),
            ("Seedling", 120, "seedling"),
            ("Sapling", 300, "sapling"),
            ("Young Tree", 600, "young_tree"),
            ("Flourishing Tree", 1200, "flourishing_tree"),
        ]
        .into_iter()
        .map(|(name, min_minutes, icon)| MilestoneStage {
            name: name.to_string(),
            min_minutes,
            icon: icon.to_string(),
        })
        .collect();
        Self { stages }
    }
}

impl MilestoneTable {
    /// Build a table from explicit stages.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidMilestones`] if the table is empty, does
    /// not start at zero minutes, or is not strictly increasing.
    pub fn new(stages: Vec<MilestoneStage>) -> Result<Self, ConfigError> {
        let first = stages
            .first()
            .ok_or_else(|| ConfigError::InvalidMilestones("table is empty".into()))?;
        if first.min_minutes != 0 {
            return Err(ConfigError::InvalidMilestones(format!(
                "first threshold must be 0 minutes, got {}",
                first.min_minutes
            )));
        }
        for pair in stages.windows(2) {
            if pair[1].min_minutes <= pair[0].min_minutes {
                return Err(ConfigError::InvalidMilestones(format!(
                    "thresholds must be strictly increasing: {} then {}",
                    pair[0].min_minutes, pair[1].min_minutes
                )));
            }
        }
        Ok(Self { stages })
    }

    /// All stages in threshold order.
    pub fn stages(&self) -> &[MilestoneStage] {
        &self.stages
    }

    /// Resolve total practice minutes to the current stage, the next
    /// threshold, and the progress fraction toward it.
    ///
    /// Defined for every input: the first threshold is zero, so there is
    /// always a reached stage.
    pub fn resolve(&self, total_minutes: u64) -> StageResolution {
        let index = self
            .stages
            .iter()
            .rposition(|s| s.min_minutes <= total_minutes)
            .unwrap_or(0);
        let stage = self.stages[index].clone();
        let next = self.stages.get(index + 1);

        let progress_fraction = match next {
            None => 1.0,
            Some(next) => {
                let span = (next.min_minutes - stage.min_minutes) as f64;
                let into = (total_minutes - stage.min_minutes) as f64;
                (into / span).clamp(0.0, 1.0)
            }
        };

        StageResolution {
            stage,
            next_threshold: next.map(|s| s.min_minutes),
            progress_fraction,
        }
    }
}
