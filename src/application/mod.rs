pub mod agent;
pub mod bootstrap;
pub mod client;
pub mod session;
pub mod tooling;
