mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use resource_waiter_core::CancellationToken;
use resource_waiter_servicecatalog::{
    product_deleted, product_ready, product_status_label, provisioning_artifact_deleted,
    provisioning_artifact_ready, ServiceCatalogClient, ServiceCatalogError,
    PRODUCT_DELETE_TIMEOUT, PRODUCT_READY_TIMEOUT, PROVISIONING_ARTIFACT_DELETED_TIMEOUT,
    PROVISIONING_ARTIFACT_READY_TIMEOUT,
};
use std::process::ExitCode;

const EXIT_FAILURE: u8 = 1;
const EXIT_TIMEOUT: u8 = 4;
const EXIT_UNEXPECTED_STATE: u8 = 5;
const EXIT_CANCELLED: u8 = 130;

fn setup_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Map a failed run onto an exit code that tells "still not done" apart from
/// "went somewhere illegal".
fn exit_code_for(err: &anyhow::Error) -> u8 {
    let Some(wait_err) = err.downcast_ref::<ServiceCatalogError>() else {
        return EXIT_FAILURE;
    };
    let wait_err = wait_err.wait_error();
    if wait_err.is_timeout() {
        EXIT_TIMEOUT
    } else if wait_err.is_unexpected_state() {
        EXIT_UNEXPECTED_STATE
    } else if wait_err.is_cancelled() {
        EXIT_CANCELLED
    } else {
        EXIT_FAILURE
    }
}

/// Cancel `token` on Ctrl-C.
fn cancel_on_interrupt(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, stopping wait");
            token.cancel();
        }
    });
}

async fn run(cli: Cli, cancel: CancellationToken) -> Result<String> {
    let client = ServiceCatalogClient::from_env().await;

    let summary = match &cli.command {
        Commands::ProductReady {
            product_id,
            accept_language,
        } => {
            let settings = cli.poll_settings(PRODUCT_READY_TIMEOUT, cancel);
            let output =
                product_ready(&client, accept_language.as_deref(), product_id, settings).await?;
            let status = output
                .as_ref()
                .and_then(product_status_label)
                .unwrap_or("ready");
            format!("product {product_id} is {status}")
        }
        Commands::ProductDeleted {
            product_id,
            accept_language,
        } => {
            let settings = cli.poll_settings(PRODUCT_DELETE_TIMEOUT, cancel);
            product_deleted(&client, accept_language.as_deref(), product_id, settings).await?;
            format!("product {product_id} is deleted")
        }
        Commands::ArtifactReady {
            product_id,
            artifact_id,
        } => {
            let settings = cli.poll_settings(PROVISIONING_ARTIFACT_READY_TIMEOUT, cancel);
            let output =
                provisioning_artifact_ready(&client, artifact_id, product_id, settings).await?;
            let status = output
                .as_ref()
                .and_then(|o| o.status())
                .map_or("ready", |s| s.as_str());
            format!("provisioning artifact {artifact_id} of product {product_id} is {status}")
        }
        Commands::ArtifactDeleted {
            product_id,
            artifact_id,
        } => {
            let settings = cli.poll_settings(PROVISIONING_ARTIFACT_DELETED_TIMEOUT, cancel);
            provisioning_artifact_deleted(&client, artifact_id, product_id, settings).await?;
            format!("provisioning artifact {artifact_id} of product {product_id} is deleted")
        }
    };

    Ok(summary)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let cancel = CancellationToken::new();
    cancel_on_interrupt(cancel.clone());

    match run(cli, cancel).await {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_code_for(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resource_waiter_servicecatalog::{CatalogError, ResourceKind, State, WaitError, WaitGoal};
    use std::time::Duration;

    fn wait_failure(source: WaitError<CatalogError>) -> anyhow::Error {
        ServiceCatalogError {
            kind: ResourceKind::Product,
            id: "prod-1".to_string(),
            goal: WaitGoal::Ready,
            source,
        }
        .into()
    }

    #[test]
    fn test_timeout_and_unexpected_state_exit_differently() {
        let timeout = wait_failure(WaitError::TimeoutExceeded {
            last_state: Some(State::from("CREATING")),
            target: ["AVAILABLE"].into_iter().collect(),
            timeout: Duration::from_secs(180),
        });
        let unexpected = wait_failure(WaitError::UnexpectedState {
            state: State::from("FAILED"),
            pending: ["CREATING"].into_iter().collect(),
            target: ["AVAILABLE"].into_iter().collect(),
        });

        assert_eq!(exit_code_for(&timeout), EXIT_TIMEOUT);
        assert_eq!(exit_code_for(&unexpected), EXIT_UNEXPECTED_STATE);
    }

    #[test]
    fn test_other_failures_exit_with_one() {
        let fetch = wait_failure(WaitError::FetchFailed(CatalogError::SdkError(
            "no credentials".to_string(),
        )));
        assert_eq!(exit_code_for(&fetch), EXIT_FAILURE);
        assert_eq!(exit_code_for(&anyhow::anyhow!("boom")), EXIT_FAILURE);

        let cancelled = wait_failure(WaitError::Cancelled { last_state: None });
        assert_eq!(exit_code_for(&cancelled), EXIT_CANCELLED);
    }
}
