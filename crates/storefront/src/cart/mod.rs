//! Cart reconciliation.
//!
//! A cart lives in one of two places depending on the session:
//!
//! - **Anonymous**: [`LocalCart`], a JSON mirror in the local store that is
//!   rewritten after every mutation
//! - **Authenticated**: [`RemoteCart`], the server's open order, mutated one
//!   unit at a time through `cart/update/`
//!
//! [`CartEngine`] owns the displayed lines and picks the backend from the
//! session on every call. The two carts only meet in
//! [`CartEngine::merge_carts`], which runs once at sign-in and deletes the
//! mirror afterwards.

mod backend;
mod engine;
mod local;
mod remote;

pub use backend::CartBackend;
pub use engine::{CartEngine, CartMode, MergeReport};
pub use local::LocalCart;
pub use remote::RemoteCart;
