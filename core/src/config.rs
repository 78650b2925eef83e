use crate::error::RankError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
    pub k2: f64,
}

impl Default for Bm25Params {
    fn default() -> Self { Self { k1: 1.2, b: 0.75, k2: 500.0 } }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JmParams {
    /// Weight of the document model; the collection model gets `1 - lambda`.
    pub lambda: f64,
}

impl Default for JmParams {
    fn default() -> Self { Self { lambda: 0.4 } }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrmParams {
    /// BM25 score a document must exceed to be labelled relevant.
    pub threshold: f64,
    /// Margin above the mean w5 weight a feature must clear.
    pub theta: f64,
}

impl Default for PrmParams {
    fn default() -> Self { Self { threshold: 1.0, theta: 0.5 } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankConfig {
    pub bm25: Bm25Params,
    pub jm: JmParams,
    pub prm: PrmParams,
    /// Results kept per ranking file.
    pub top_k: usize,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self { bm25: Bm25Params::default(), jm: JmParams::default(), prm: PrmParams::default(), top_k: 15 }
    }
}

impl RankConfig {
    /// Reads a JSON config; missing fields keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
        let cfg: RankConfig = serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), RankError> {
        let finite = [
            ("bm25.k1", self.bm25.k1),
            ("bm25.b", self.bm25.b),
            ("bm25.k2", self.bm25.k2),
            ("jm.lambda", self.jm.lambda),
            ("prm.threshold", self.prm.threshold),
            ("prm.theta", self.prm.theta),
        ];
        for (name, v) in finite {
            if !v.is_finite() {
                return Err(RankError::InvalidConfig(format!("{name} must be finite, got {v}")));
            }
        }
        if self.bm25.k1 < 0.0 || self.bm25.k2 < 0.0 {
            return Err(RankError::InvalidConfig("bm25.k1 and bm25.k2 must be non-negative".into()));
        }
        if !(0.0..=1.0).contains(&self.bm25.b) {
            return Err(RankError::InvalidConfig(format!("bm25.b must be in [0, 1], got {}", self.bm25.b)));
        }
        if !(0.0..1.0).contains(&self.jm.lambda) {
            return Err(RankError::InvalidConfig(format!("jm.lambda must be in [0, 1), got {}", self.jm.lambda)));
        }
        if self.top_k == 0 {
            return Err(RankError::InvalidConfig("top_k must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: RankConfig = serde_json::from_str(r#"{"bm25": {"k2": 100}, "top_k": 20}"#).unwrap();
        assert_eq!(cfg.bm25.k2, 100.0);
        assert_eq!(cfg.bm25.k1, 1.2);
        assert_eq!(cfg.jm.lambda, 0.4);
        assert_eq!(cfg.top_k, 20);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut cfg = RankConfig::default();
        cfg.jm.lambda = 1.0;
        assert!(cfg.validate().is_err());
        let mut cfg = RankConfig::default();
        cfg.top_k = 0;
        assert!(cfg.validate().is_err());
        let mut cfg = RankConfig::default();
        cfg.bm25.b = f64::NAN;
        assert!(cfg.validate().is_err());
    }
}
