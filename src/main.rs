use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};

use deploy_health::checks::{register_builtin_checks, BuiltinProbes};
use deploy_health::config::{env_opt, ConfigError};
use deploy_health::health::{CheckRegistry, Reporter};
use deploy_health::{logging, Config, DeploymentConfig, Orchestrator, VERSION};

/// Healthy or degraded.
const EXIT_OK: u8 = 0;
/// The report should block promotion.
const EXIT_BLOCK: u8 = 1;
/// Configuration could not be loaded.
const EXIT_CONFIG: u8 = 2;

const USAGE: &str = "usage: deploy_health [CONFIG_PATH] [DEPLOYMENT_ID]";

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    if let Err(e) = logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let mut args = std::env::args().skip(1);
    let config_path = args.next().or_else(|| env_opt("DEPLOY_CONFIG"));
    let deployment_id = args
        .next()
        .or_else(|| env_opt("DEPLOYMENT_ID"))
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let Some(config_path) = config_path else {
        let missing = ConfigError::Missing {
            key: "CONFIG_PATH (or DEPLOY_CONFIG)".into(),
        };
        eprintln!("Configuration error: {}\n{}", missing, USAGE);
        return ExitCode::from(EXIT_CONFIG);
    };

    info!("Starting deploy_health {}", VERSION);
    config.log_summary();

    let deployment = match DeploymentConfig::from_file(&config_path) {
        Ok(deployment) => deployment,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start runtime: {}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    runtime.block_on(run(config, deployment, deployment_id))
}

async fn run(config: Config, deployment: DeploymentConfig, deployment_id: String) -> ExitCode {
    let probes = match BuiltinProbes::new(config.orchestrator.default_timeout) {
        Ok(probes) => probes,
        Err(e) => {
            error!("Failed to initialize probes: {}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let mut registry = CheckRegistry::new(&config.orchestrator);
    if let Err(e) = register_builtin_checks(&mut registry, probes) {
        error!("Failed to register checks: {}", e);
        return ExitCode::from(EXIT_CONFIG);
    }

    let orchestrator = Orchestrator::new(Arc::new(registry), config.orchestrator);
    let report = orchestrator
        .execute_health_checks(&deployment, &deployment_id)
        .await;

    eprint!("{}", Reporter::new(orchestrator.registry()).render(&report));
    // Serialize the report directly so `checks` keeps registry order
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to serialize report: {}", e),
    }

    if report.should_block_promotion() {
        ExitCode::from(EXIT_BLOCK)
    } else {
        ExitCode::from(EXIT_OK)
    }
}
