//! Bind TOML documents onto annotated Rust structs.
//!
//! A struct opts in by implementing [`Record`], usually through the
//! [`record!`] macro. Each field names the dotted key it reads from and may
//! be marked `required`. Values are coerced leniently into the field's type,
//! so `port = "8080"` fills a `u16` and `timeout = "1500ms"` fills a
//! [`Duration`](std::time::Duration).
//!
//! ```
//! use confbind::Document;
//!
//! confbind::record! {
//!     #[derive(Debug, Default)]
//!     struct Upstream {
//!         host: String => { conf = "host,required" },
//!         port: u16 => { conf = "port" },
//!     }
//! }
//!
//! let doc: Document = r#"
//!     [[upstream]]
//!     host = "a.internal"
//!     port = "8080"
//!
//!     [[upstream]]
//!     host = "b.internal"
//! "#.parse()?;
//!
//! let mut cursor = doc.array("upstream")?.expect("upstream section");
//! loop {
//!     let mut upstream = Upstream::default();
//!     match cursor.bind(&mut upstream, None) {
//!         Ok(()) => println!("{}:{}", upstream.host, upstream.port),
//!         Err(e) if e.is_end_of_array() => break,
//!         Err(e) => return Err(e),
//!     }
//! }
//! # Ok::<(), confbind::ConfigError>(())
//! ```

mod bind;
pub mod coerce;
mod document;
mod error;
mod path;
mod record;
mod tag;

pub use bind::{bind_file, bind_str, bind_tree};
pub use coerce::CoerceError;
pub use document::{ArrayCursor, Document, OptionalBind, Records};
pub use error::ConfigError;
pub use record::{
    Bindable, DurationSlot, Field, FloatSlot, IntSlot, Record, Slot, TimeSlot, UintSlot,
};
pub use tag::FieldTag;

/// Annotation key read when no other is given.
pub const TAG_NAME: &str = "conf";

/// Marker that makes a field mandatory: `"server.port,required"`.
pub const REQUIRED: &str = "required";
