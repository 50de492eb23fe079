//! Command-line arguments.

use clap::{Parser, Subcommand};
use resource_waiter_core::{Backoff, CancellationToken, PollSettings};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "resource-waiter",
    version,
    about = "Block until an AWS Service Catalog resource finishes a state transition",
    long_about = "Polls AWS Service Catalog until a product or provisioning artifact becomes \
                  ready or is deleted. AWS credentials and region come from the standard \
                  provider chain (environment, ~/.aws/config, instance metadata)."
)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Give up after this many seconds (defaults to the resource kind's timeout)
    #[arg(long, global = true, env = "RESOURCE_WAITER_TIMEOUT_SECS",
          value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,

    /// Seconds between two status queries
    #[arg(long, global = true, env = "RESOURCE_WAITER_POLL_INTERVAL_SECS",
          default_value_t = 2, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval_secs: u64,

    /// Poll on Terraform's schedule (100ms doubling up to 10s) instead of a fixed interval
    #[arg(long, global = true, env = "RESOURCE_WAITER_EXPONENTIAL_BACKOFF")]
    pub exponential_backoff: bool,

    /// Abandon a single status query after this many seconds and poll again
    #[arg(long, global = true, env = "RESOURCE_WAITER_FETCH_TIMEOUT_SECS",
          value_parser = clap::value_parser!(u64).range(1..))]
    pub fetch_timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Wait for a product to become AVAILABLE
    ProductReady {
        #[arg(long)]
        product_id: String,
        /// Language code passed to DescribeProductAsAdmin (en, jp, zh)
        #[arg(long)]
        accept_language: Option<String>,
    },
    /// Wait for a product to be deleted
    ProductDeleted {
        #[arg(long)]
        product_id: String,
        #[arg(long)]
        accept_language: Option<String>,
    },
    /// Wait for a provisioning artifact to become AVAILABLE
    ArtifactReady {
        #[arg(long)]
        product_id: String,
        #[arg(long)]
        artifact_id: String,
    },
    /// Wait for a provisioning artifact to be deleted
    ArtifactDeleted {
        #[arg(long)]
        product_id: String,
        #[arg(long)]
        artifact_id: String,
    },
}

impl Cli {
    /// Poll settings for this invocation, falling back to `default_timeout`
    /// when no timeout was given.
    pub fn poll_settings(
        &self,
        default_timeout: Duration,
        cancel: CancellationToken,
    ) -> PollSettings {
        let timeout = self
            .timeout_secs
            .map_or(default_timeout, Duration::from_secs);
        let backoff = if self.exponential_backoff {
            Backoff::terraform()
        } else {
            Backoff::Fixed(Duration::from_secs(self.poll_interval_secs))
        };
        let settings = PollSettings::new(timeout)
            .with_backoff(backoff)
            .with_cancellation(cancel);
        match self.fetch_timeout_secs {
            Some(secs) => settings.with_fetch_timeout(Duration::from_secs(secs)),
            None => settings,
        }
    }
}
