pub mod interpret;
pub mod prompt;
pub mod session;
pub mod types;
