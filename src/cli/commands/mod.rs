pub mod host;
pub mod token;
