//! Dime - Macro Expander
//!
//! Expands `$NAME` and `${NAME, key=value}` macros in text, using handlers that
//! produce the replacement for each name.
//!
//! ```
//! use dime::{handler::from_fn, Arguments, Engine, Store};
//!
//! let engine = Engine::new()
//!     .with_handler(from_fn("BUILD_NUMBER", |store: &Store, _: &Arguments| {
//!         Ok(store.get_text("number").unwrap_or_default().into_owned())
//!     }));
//! let store = Store::new().with_must("number", 1042);
//!
//! let result = engine.expand(&store, "build #$BUILD_NUMBER of ${BUILD_NUMBER:0:2}xx, $$BUILD_NUMBER", true, &[]);
//! assert_eq!(result.unwrap(), "build #1042 of 10xx, $BUILD_NUMBER");
//! ```
mod arguments;
pub mod bind;
mod engine;
mod environment;
pub mod handler;
mod log;
mod region;
mod scan;
mod session;
mod store;
mod transform;

pub use arguments::Arguments;
pub use engine::{Engine, MAX_DEPTH};
pub use environment::{substitute, Environment};
pub use handler::Handler;
pub use log::{Error, ErrorKind, Pointer, Visual};
pub use region::Region;
pub use store::Store;
pub use transform::Transform;
