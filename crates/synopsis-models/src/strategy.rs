//! Keyframe strategy selection.
//!
//! - `Cells`: grid differencing with human-presence segmentation (default)
//! - `Naive`: one masked scalar diff per frame pair with a global threshold search
//! - `Scene`: colour histogram shot boundaries

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Keyframe detection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Per-cell differencing inside human-presence segments.
    #[default]
    Cells,

    /// Whole-frame differencing with an adaptive peak threshold.
    Naive,

    /// Shot boundaries from HSV histogram distance.
    Scene,
}

impl StrategyKind {
    /// All available strategies.
    pub const ALL: &'static [StrategyKind] =
        &[StrategyKind::Cells, StrategyKind::Naive, StrategyKind::Scene];

    /// Returns the strategy name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Cells => "cells",
            StrategyKind::Naive => "naive",
            StrategyKind::Scene => "scene",
        }
    }

    /// Returns a human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            StrategyKind::Cells => "Grid cell differencing with presenter segmentation",
            StrategyKind::Naive => "Whole-frame differencing with adaptive threshold",
            StrategyKind::Scene => "Colour histogram shot boundaries",
        }
    }

    /// Returns true if this strategy consults the human detector.
    pub fn uses_humans(&self) -> bool {
        !matches!(self, StrategyKind::Scene)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = StrategyKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cells" | "grid" => Ok(StrategyKind::Cells),
            "naive" => Ok(StrategyKind::Naive),
            "scene" | "shot" => Ok(StrategyKind::Scene),
            _ => Err(StrategyKindParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown keyframe strategy: {0}")]
pub struct StrategyKindParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parse() {
        assert_eq!("cells".parse::<StrategyKind>().unwrap(), StrategyKind::Cells);
        assert_eq!("GRID".parse::<StrategyKind>().unwrap(), StrategyKind::Cells);
        assert_eq!("naive".parse::<StrategyKind>().unwrap(), StrategyKind::Naive);
        assert_eq!("shot".parse::<StrategyKind>().unwrap(), StrategyKind::Scene);
        assert!("pyscene".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn test_strategy_display_roundtrip() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.to_string().parse::<StrategyKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn test_strategy_serde() {
        let json = serde_json::to_string(&StrategyKind::Naive).unwrap();
        assert_eq!(json, "\"naive\"");
        assert_eq!(StrategyKind::default(), StrategyKind::Cells);
        assert!(!StrategyKind::Scene.uses_humans());
    }
}
