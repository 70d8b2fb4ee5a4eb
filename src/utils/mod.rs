pub mod jwt;
pub mod password;
pub mod slug;
pub mod validators;

pub use jwt::*;
pub use password::*;
pub use slug::{derive_slug, resolve_slug};
pub use validators::*;
