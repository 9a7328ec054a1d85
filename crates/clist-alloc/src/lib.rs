//! Checked raw allocation for the `clist` compact list.
//!
//! Wraps a pass-through backend ([`RawAlloc`], implemented for the global
//! allocator by [`Global`]) with the one guarantee the compact list relies
//! on: a request for a non-zero number of bytes never yields a null pointer.
//! What happens instead is decided by the [`FailurePolicy`]:
//!
//! - **Propagate** (default): the failure comes back as an [`AllocError`].
//! - **Abort:** a diagnostic is written to stderr and the process aborts.
//!
//! # Architecture
//!
//! ```text
//! Checked<A: RawAlloc>
//! ├── AllocConfig (failure policy + default alignment)
//! └── A (Global, or a bookkeeping allocator in tests)
//!     └── Block (owned NonNull<u8> + Layout, freed only through the allocator)
//! ```
//!
//! Together with `clist`, this crate holds the workspace's `unsafe` code;
//! every block carries a `// SAFETY:` note.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod block;
pub mod checked;
pub mod config;
pub mod error;
pub mod raw;

// Public re-exports for the primary API surface.
pub use block::Block;
pub use checked::Checked;
pub use config::{AllocConfig, FailurePolicy};
pub use error::{AllocError, ReallocFailed};
pub use raw::{Global, RawAlloc};
