pub mod claims;
pub mod logout;
pub mod me;
pub mod session;

pub use logout::handle_logout;
pub use me::handle_me;
