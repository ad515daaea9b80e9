pub mod config;
pub mod ssh;
pub mod ssh_proxy;

pub use ssh::SshArgs;
pub use ssh_proxy::SshProxyArgs;
