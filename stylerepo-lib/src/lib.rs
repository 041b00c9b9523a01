//! Named, selector-addressed access to a document's live style sheets.
//!
//! ```
//! use stylerepo_lib::dom::dom_tree;
//! use stylerepo_lib::repository::{Lookup, StyleRepository};
//!
//! let document = dom_tree::new_document();
//! let repository = StyleRepository::new(&document);
//! repository.set_property("theme", ".card", "color", "red").unwrap();
//! assert_eq!(
//!     repository.get_property("theme", ".card", "color", Lookup::Strict).as_deref(),
//!     Some("red")
//! );
//! ```

pub mod dom;
pub mod error;
pub mod events;
pub mod parser;
pub mod repository;
pub mod style;

pub use error::{Error, Result};
pub use repository::{Lookup, RepositoryOptions, StyleRepository};
