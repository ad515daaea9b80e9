pub mod client;
pub mod connect;
pub mod instance;
pub mod session;

pub use client::AwsOptions;
pub use instance::{resolve_instance_id, Ec2InstanceLookup};
