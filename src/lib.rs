pub mod client;
pub mod config;
pub mod db;
pub mod draft;
pub mod imagegen;
pub mod server;
pub mod session;
