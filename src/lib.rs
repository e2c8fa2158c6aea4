//! Logbook bot. Collects a travel log over chat and delivers it as a report.

pub mod bot;
pub mod channels;
pub mod commands;
pub mod config;
pub mod error;
pub mod logbook;
pub mod render;
