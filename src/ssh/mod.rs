pub mod keys;
pub mod launcher;
pub mod proxy;
pub mod target;

pub use keys::KeyPair;
pub use launcher::SshInvocation;
pub use proxy::{ProxyCommand, ProxyStyle};
pub use target::Target;
