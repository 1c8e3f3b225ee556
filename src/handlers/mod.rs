pub mod catalog;
pub mod helpers;
pub mod wizard;

pub use helpers::ApiError;
