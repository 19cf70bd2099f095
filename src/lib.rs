pub mod actions;
pub mod analytics;
pub mod config;
pub mod db;
pub mod errors;
pub mod health;
pub mod html;
pub mod metadata;
pub mod models;
pub mod operations;
pub mod repository;
pub mod seed;
pub mod telemetry;
