//! # SmartSpend Engine
//!
//! The budget allocation engine: takes a fixed-category model prediction
//! and redistributes it onto an arbitrary, user-supplied set of category
//! names — conserving the total, drawing on a bounded reserve for
//! zero-balance parents, and guaranteeing the Emergency bucket is never
//! left empty.
//!
//! The engine is stateless across requests: every call builds a fresh
//! [`CanonicalAllocation`](smartspend_core::CanonicalAllocation) on its own
//! stack and mutates only that. The immutable tables it holds (keyword
//! rules, seed percentages, canonical list) are constructed once at startup.

pub mod assembler;
pub mod resolver;
pub mod seed;
pub mod splitter;

pub use assembler::BudgetEngine;
pub use resolver::{KeywordRule, KeywordTable};
pub use seed::SeedPolicy;
pub use splitter::split;
