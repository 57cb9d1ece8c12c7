//! Core business logic abstractions

pub mod log;
pub mod quote;

// Re-export main types for cleaner imports
pub use quote::{DailyQuote, QuoteSource};
