//! Remote file-hosting access for seaunpack.
//!
//! # Architecture
//!
//! - [`data`] - Typed records returned by the service
//! - [`path`] - Remote path arithmetic (always `/`-separated)
//! - [`store`] - The [`RemoteStore`] trait the pipeline is written against
//! - [`seafile`] - Production implementation over the Seafile web API

pub mod data;
mod error;
pub mod path;
pub mod seafile;
pub mod store;

pub use data::{Credentials, EntryKind, RemoteEntry, Repo, RepoDetails};
pub use error::{RemoteError, Result};
pub use seafile::SeafileClient;
pub use store::RemoteStore;
