use crate::{Ec2SshError, Result};

/// A `[user@]instance` argument with the user filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub user: String,
    /// Instance ID or Name tag value, not yet resolved
    pub instance: String,
}

impl Target {
    /// Split on the first `@`. Without one, `default_user` is used.
    pub fn parse(input: &str, default_user: &str) -> Result<Self> {
        let (user, instance) = match input.split_once('@') {
            Some((user, instance)) => (user, instance),
            None => (default_user, input),
        };

        if user.is_empty() || instance.is_empty() {
            return Err(Ec2SshError::InvalidTarget(input.to_string()));
        }

        Ok(Self {
            user: user.to_string(),
            instance: instance.to_string(),
        })
    }
}
