//! Peptone recommendation engine: scores peptones and optimised peptone blends against the
//! nutritional profile of a microbial strain.

pub mod candidates;
pub mod complementarity;
pub mod error;
pub mod optimizer;
pub mod pathway;
pub mod profile;
pub mod recommend;
pub mod scoring;
pub mod settings;
pub mod similarity;
pub mod targets;

pub use error::PeptofitError;
pub use recommend::{Recommender, RecommenderBuilder, RecommendationMode, RecommendationRequest};
