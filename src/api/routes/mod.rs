//! API Routes
//!
//! Route handlers organized by functionality.

pub mod analytics;
pub mod calendar;
pub mod entries;
pub mod export;
pub mod health;
pub mod insights;
