//! Petal - the data core of a small personal blog
//!
//! This library provides the storage layer and business rules for a
//! single-admin blog: the admin account, categorized posts, threaded
//! comments with moderation, and a blogroll of links.

pub mod config;
pub mod db;
pub mod models;
pub mod services;
