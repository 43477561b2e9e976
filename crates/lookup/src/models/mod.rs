//! Domain models shared by the lookup providers and the resolver.

mod isbn;
mod source;

pub use isbn::Isbn;
pub use source::{ProviderHit, SourceKind};
