//! Recommendation ranker: orchestrates scoring, candidate generation, ratio optimization, and
//! ranking for one strain at a time.

pub mod builder;
pub mod engine;
pub mod rationale;
pub mod request;

pub use builder::RecommenderBuilder;
pub use engine::{compare_recommendations, rank_recommendations, Recommender};
pub use request::{BlendSeeding, RecommendationMode, RecommendationRequest};
