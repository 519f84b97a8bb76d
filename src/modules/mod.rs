pub mod bot;
pub mod cube;
pub mod directive;
pub mod search;
pub mod server;
pub mod sim;
pub mod snapshot;
