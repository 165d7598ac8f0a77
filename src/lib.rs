pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod forms;
pub mod guard;
pub mod handlers;
pub mod middleware;
pub mod route;
pub mod web;

#[cfg(test)]
pub mod testing;
