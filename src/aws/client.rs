use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::debug;

/// Profile and region selected on the command line or through the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsOptions {
    pub profile: Option<String>,
    pub region: Option<String>,
}

impl AwsOptions {
    /// Empty strings (e.g. `AWS_PROFILE=`) count as unset.
    pub fn new(profile: Option<String>, region: Option<String>) -> Self {
        Self {
            profile: profile.filter(|p| !p.is_empty()),
            region: region.filter(|r| !r.is_empty()),
        }
    }

    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Load shared AWS configuration, applying the profile and region overrides
    pub async fn load(&self) -> SdkConfig {
        debug!(
            "Loading AWS config: profile={}, region={}",
            self.profile().unwrap_or_default(),
            self.region().unwrap_or_default()
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }

        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }

        loader.load().await
    }
}
