//! shopcart core - cart state, discount rules and pricing.
//!
//! This crate provides the pure domain used by every other shopcart crate:
//! - `catalog` - remote fetch, local caching and the freshness/fallback policy
//! - `cli` - command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no async
//! runtime, no HTTP clients. Pricing is deterministic and can be called from
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product identity, product codes and the `Resource` wrapper
//! - [`discount`] - Discount rules keyed by product code
//! - [`cart`] - In-memory cart with quantity merging
//! - [`pricing`] - Discounted totals and checkout summaries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod discount;
pub mod pricing;
pub mod types;

pub use cart::{Cart, CartItem};
pub use discount::{DiscountConfig, DiscountRule};
pub use pricing::{CheckoutSummary, calculate_total, summarize};
pub use types::*;
