pub mod agent;
pub mod agents;
pub mod compare;
pub mod conversation;
pub mod errors;
pub mod prompt;
pub mod providers;
pub mod session;
pub mod tools;
