// Engine-side models. The bill data model itself lives in `shared::models`.
pub mod session;

pub use session::{Role, Session};
