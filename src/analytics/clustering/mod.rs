//! Clustering Module
//!
//! k-means++ によるプロセス特徴量のクラスタリング

pub mod engine;
pub mod types;

pub use engine::ClusteringEngine;
pub use types::{ClusterModel, ClusteringResult, ElbowResult};
