// handlers/api/mod.rs - JSON endpoints and the auth service proxy
//
// Public to the edge guard; responses use the `{success, data}` envelope.

pub mod health;
pub mod proxy;
pub mod session;

pub use health::health;
pub use proxy::auth_proxy;
pub use session::session;
