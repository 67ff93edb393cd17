pub extern crate actix_web;

mod admin;
pub mod connection;
mod connection_tx_storage;
pub mod handlers;
mod lesson_file;
mod results;
pub mod server;
mod server_state;
mod session;
