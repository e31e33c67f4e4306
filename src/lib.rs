pub mod amap;
pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod tmdb;
pub mod utils;
pub mod views;
