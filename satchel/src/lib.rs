//! Satchel parses Handlebars templates from a file tree and optionally
//! monitors them for changes.
//!
//! During construction, every file under a root directory whose base name
//! matches one of the configured glob patterns is parsed into a single named
//! collection. Templates are addressed by their root-relative,
//! `/`-separated path.
//!
//! With `dynamic` enabled, every lookup first checks whether any of the
//! underlying files changed, and re-parses the whole tree if so. This is
//! very useful during development, but you want to turn it off in
//! production because of the cost of the per-lookup file system checks and
//! the lock that serializes them.
//!
//! ```no_run
//! use satchel::Collection;
//!
//! # fn main() -> Result<(), satchel::Error> {
//! let templates = Collection::new("web/templates", &["*.html", "*.js", "*.css"], false)?;
//! let page = templates.render("nav/login.html", &serde_json::json!({ "user": "ada" }))?;
//! # Ok(())
//! # }
//! ```

pub use handlebars;

mod builder;
mod collection;
mod error;
pub mod helpers;

pub use builder::{Builder, HelperFn};
pub use collection::Collection;
pub use error::Error;
