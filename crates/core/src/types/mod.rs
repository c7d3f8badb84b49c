//! Core types for shopcart.
//!
//! This module provides type-safe wrappers for catalog concepts.

pub mod code;
pub mod id;
pub mod product;
pub mod resource;

pub use code::{ProductCode, ProductCodeError};
pub use id::*;
pub use product::Product;
pub use resource::Resource;
