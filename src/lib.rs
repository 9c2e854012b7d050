pub mod cli_args;
pub mod error;
mod extractor;
mod middleware;
pub mod repository;
mod route;
pub mod server;
mod state;
pub mod types;
mod validation;

pub use state::ApiState;

#[cfg(test)]
mod test;
