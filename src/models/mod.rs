pub mod candidate;
pub mod document;
pub mod status;
pub mod user;
