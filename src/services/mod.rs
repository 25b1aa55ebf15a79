pub mod collaborative;
pub mod content;
pub mod providers;
pub mod ranking;
pub mod recommendations;
pub mod similarity;
pub mod text;

pub use collaborative::{CollaborativeEngine, Exclusions, ScoredItem, UserItemMatrix};
pub use content::ContentEngine;
pub use providers::{InMemorySnapshot, PgSnapshotProvider, SnapshotData, SnapshotProvider};
pub use recommendations::{recommend_for_user, recommend_similar_products};
