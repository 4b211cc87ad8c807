pub mod config;
pub mod entity;
pub mod index;
pub mod report;
pub mod scoring;
