use std::sync::LazyLock;

use async_trait::async_trait;
use aws_sdk_ec2::types::Filter;
use aws_sdk_ec2::Client as Ec2Client;
use regex::Regex;
use tracing::debug;

use super::client::AwsOptions;
use crate::{Ec2SshError, Result};

/// Standard Name tag
pub const AWS_NAME_TAG: &str = "Name";

static INSTANCE_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^m?i-[0-9a-fA-F]{8,}$").expect("valid instance id pattern"));

/// True for EC2 (`i-…`) and managed (`mi-…`) instance IDs.
pub fn is_instance_id(value: &str) -> bool {
    INSTANCE_ID_PATTERN.is_match(value)
}

/// Source of running instances, keyed by their exact Name tag.
#[async_trait]
pub trait InstanceLookup {
    async fn running_instance_ids(&self, name: &str) -> Result<Vec<String>>;
}

/// Resolve a name or instance ID to a single instance ID.
///
/// Anything that already looks like an instance ID is returned as-is without
/// consulting `lookup`. A name must match exactly one running instance.
pub async fn resolve_instance_id<L>(lookup: &L, name_or_id: &str) -> Result<String>
where
    L: InstanceLookup + ?Sized,
{
    if is_instance_id(name_or_id) {
        return Ok(name_or_id.to_string());
    }

    let mut matches = lookup.running_instance_ids(name_or_id).await?;

    match matches.len() {
        0 => Err(Ec2SshError::InstanceNotFound(name_or_id.to_string())),
        1 => {
            let id = matches.remove(0);
            debug!("Resolved name '{}' to instance ID: {}", name_or_id, id);
            Ok(id)
        }
        _ => Err(Ec2SshError::AmbiguousInstance {
            name: name_or_id.to_string(),
            ids: matches,
        }),
    }
}

/// Looks instances up with EC2 DescribeInstances.
///
/// AWS configuration is only loaded when a lookup actually happens.
pub struct Ec2InstanceLookup {
    options: AwsOptions,
}

impl Ec2InstanceLookup {
    pub fn new(options: AwsOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl InstanceLookup for Ec2InstanceLookup {
    async fn running_instance_ids(&self, name: &str) -> Result<Vec<String>> {
        let config = self.options.load().await;
        let ec2 = Ec2Client::new(&config);

        let mut pages = ec2
            .describe_instances()
            .filters(
                Filter::builder()
                    .name("instance-state-name")
                    .values("running")
                    .build(),
            )
            .filters(
                Filter::builder()
                    .name(format!("tag:{}", AWS_NAME_TAG))
                    .values(name)
                    .build(),
            )
            .into_paginator()
            .send();

        let mut ids = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| Ec2SshError::aws("DescribeInstances", e))?;
            ids.extend(
                page.reservations()
                    .iter()
                    .flat_map(|r| r.instances())
                    .filter_map(|i| i.instance_id())
                    .map(String::from),
            );
        }

        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedLookup(Vec<&'static str>);

    #[async_trait]
    impl InstanceLookup for FixedLookup {
        async fn running_instance_ids(&self, _name: &str) -> Result<Vec<String>> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct UnreachableLookup;

    #[async_trait]
    impl InstanceLookup for UnreachableLookup {
        async fn running_instance_ids(&self, name: &str) -> Result<Vec<String>> {
            panic!("lookup called for {}", name);
        }
    }

    #[test]
    fn test_instance_id_pattern() {
        assert!(is_instance_id("i-0123456789abcdef0"));
        assert!(is_instance_id("i-01234567"));
        assert!(is_instance_id("mi-0123456789ABCDEF0"));
        assert!(!is_instance_id("i-0123456"));
        assert!(!is_instance_id("i-0123456g"));
        assert!(!is_instance_id("web-server"));
        assert!(!is_instance_id("xi-01234567"));
        assert!(!is_instance_id("i-01234567 "));
        assert!(!is_instance_id(""));
    }

    #[tokio::test]
    async fn test_instance_id_skips_lookup() {
        let id = resolve_instance_id(&UnreachableLookup, "i-0123456789abcdef0")
            .await
            .unwrap();
        assert_eq!(id, "i-0123456789abcdef0");

        let id = resolve_instance_id(&UnreachableLookup, "mi-0123456789abcdef0")
            .await
            .unwrap();
        assert_eq!(id, "mi-0123456789abcdef0");
    }

    #[tokio::test]
    async fn test_no_match_is_not_found() {
        let err = resolve_instance_id(&FixedLookup(vec![]), "web")
            .await
            .unwrap_err();
        assert!(matches!(err, Ec2SshError::InstanceNotFound(ref n) if n == "web"));
    }

    #[tokio::test]
    async fn test_single_match_resolves() {
        let id = resolve_instance_id(&FixedLookup(vec!["i-0aaaaaaaaaaaaaaaa"]), "web")
            .await
            .unwrap();
        assert_eq!(id, "i-0aaaaaaaaaaaaaaaa");
    }

    #[tokio::test]
    async fn test_multiple_matches_are_ambiguous() {
        let lookup = FixedLookup(vec!["i-0aaaaaaaa", "i-0bbbbbbbb", "i-0cccccccc"]);
        let err = resolve_instance_id(&lookup, "web").await.unwrap_err();
        match err {
            Ec2SshError::AmbiguousInstance { name, ids } => {
                assert_eq!(name, "web");
                assert_eq!(ids, vec!["i-0aaaaaaaa", "i-0bbbbbbbb", "i-0cccccccc"]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_lookup_errors_propagate() {
        struct FailingLookup;

        #[async_trait]
        impl InstanceLookup for FailingLookup {
            async fn running_instance_ids(&self, _name: &str) -> Result<Vec<String>> {
                Err(Ec2SshError::Aws {
                    operation: "DescribeInstances",
                    code: Some("UnauthorizedOperation".into()),
                    message: "denied".into(),
                })
            }
        }

        let err = resolve_instance_id(&FailingLookup, "web").await.unwrap_err();
        assert!(matches!(err, Ec2SshError::Aws { .. }));
    }
}
