pub mod config;
pub mod loading;
pub mod views;
