//! mezuri-git
//!
//! Revision store sobre el ejecutable `git` y el fetcher del registry que
//! clona el remoto de un componente para leer su especificación.

pub mod error;
pub mod fetcher;
pub mod store;

pub use error::GitError;
pub use fetcher::GitSpecFetcher;
pub use store::GitRevisionStore;
