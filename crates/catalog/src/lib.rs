//! shopcart catalog - remote fetch, local caching and repository streams.
//!
//! The repository combines four collaborators behind traits:
//!
//! - [`remote`] - product and discount sources (HTTP in production)
//! - [`store`] - persisted product records with change subscription
//! - [`files`] - named text files and compiled-in resources
//! - [`clock`] - wall-clock time for the freshness gate
//!
//! [`repository::ProductRepository`] turns them into `Resource` streams and
//! [`session::ShopSession`] reduces those streams into what a front end shows.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod clock;
pub mod config;
pub mod error;
pub mod files;
pub mod remote;
pub mod repository;
pub mod session;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{CatalogConfig, ConfigError};
pub use error::{CatalogError, Result};
pub use repository::ProductRepository;
pub use session::{ProductListState, ShopSession};
