//! Utility functions for the dashboard backend.
//!
//! - [`format`] - Currency, percentage and multiplier display strings

mod format;

// ============================================
// Re-exports
// ============================================

pub use format::{
    format_change, format_currency, format_currency_str, format_multiplier, format_percent,
};
