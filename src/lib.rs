pub mod analytics;
pub mod api;
pub mod cli;
pub mod config;
pub mod evaluator;
pub mod pages;
pub mod session;
pub mod stamps;
pub mod status;
pub mod web;
