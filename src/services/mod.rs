pub mod collector;
pub mod playlist;
pub mod profile_cache;
pub mod providers;
pub mod quota;
pub mod recommendations;
pub mod tag_classifier;
pub mod taste_profile;
