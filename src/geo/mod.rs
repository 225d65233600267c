//! Geo module - continent classification

mod classifier;

pub use classifier::{Continent, ContinentClassifier, M49Classifier};
