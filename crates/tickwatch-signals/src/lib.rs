//! Signal classification.
//!
//! Turns the latest bar and its indicator values into a BUY, SELL or HOLD
//! [`Signal`](tickwatch_core::Signal) by walking an ordered list of threshold
//! rules. The first rule that matches wins; HOLD is the fallback, including
//! whenever an indicator is not ready yet.

mod classifier;
mod rules;

pub use classifier::{Classifier, ClassifierConfig, ThresholdClassifier};
pub use rules::{evaluate_rules, BandTouch, Rule, RsiBound, Snapshot, Trend};
