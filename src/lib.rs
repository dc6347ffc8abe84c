pub mod app;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod element;
pub mod fetch_error;
pub mod fetcher;
pub mod hko;
pub mod models;
pub mod normalizer;
pub mod render;
pub mod scheduler;
pub mod sources;
pub mod utils;
pub mod wind;
