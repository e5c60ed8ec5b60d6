pub mod password;
pub mod token;

pub use token::{AuthError, Claims, TokenCodec};
