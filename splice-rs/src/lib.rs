//! Message interpolation and attribute export for structured log lines.
//!
//! A log call supplies a message template such as
//! `"user {user.name} logged in after {} tries"`, the logger's persisted
//! attributes and the call's own arguments.  The engine produces the final
//! message text and the ordered list of attributes to emit alongside it.
//!
//! Work happens in three passes over a pooled [`Splicer`]:
//!
//! - [`scan`](Splicer::scan) finds the interpolation sites,
//! - [`resolve`](Splicer::resolve) builds the export list and fills the keyed
//!   sites,
//! - [`interpolate`](Splicer::interpolate) writes the text.
//!
//! Malformed input never fails the caller; it renders a sentinel from
//! [`sentinel`] in place of the value.
//!
//! # Quick start
//!
//! ```rust
//! use splice::{Attr, PoolConfig, SplicerPool};
//!
//! let pool = SplicerPool::new(PoolConfig::default());
//! let mut s = pool.acquire();
//! let text = s.splice(
//!     "user {user.name} logged in after {} tries",
//!     "",
//!     &[Attr::group("user", vec![Attr::string("name", "ada")])],
//!     &[3.into()],
//!     None,
//! );
//! assert_eq!(text, "user ada logged in after 3 tries");
//! assert_eq!(s.export().len(), 1);
//! s.free();
//! ```

pub mod config;
pub mod format;
pub mod interpolate;
pub mod pool;
pub mod resolve;
pub mod scan;
pub mod sentinel;
pub mod splicer;
pub mod value;
pub mod verb;

pub use config::{ConfigError, PoolConfig};
pub use format::write_value;
pub use pool::{PooledSplicer, SplicerPool};
pub use resolve::{Arg, Replace};
pub use splicer::Splicer;
pub use value::{Attr, Kind, LazyValue, Opaque, Value};
