//! `idv` — command-line front end for the identity-verification client.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use idv_client::{
    check_api_health, file_from_path, format_error_message, ClientConfig, LoginRequest,
    RegisterRequest, VerificationClient,
};
use idv_session::FileCredentialStore;
use idv_types::{NamedFile, RawServiceResponse, TransportFailure};
use idv_utils::{init_logging, LogFormat};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "idv", about = "Identity-verification service client")]
struct Cli {
    /// Base address of the verification service.
    #[arg(long, env = "IDV_API_URL")]
    api_url: Option<String>,

    /// File holding the bearer credential between invocations.
    #[arg(long, env = "IDV_CREDENTIAL_FILE")]
    credential_file: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "IDV_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "IDV_LOG_FORMAT")]
    log_format: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Probe the service health endpoint.
    Health,

    /// Register a new user.
    Register {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "IDV_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        nic_number: Option<String>,
    },

    /// Log in and store the returned credential.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "IDV_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored credential.
    Logout,

    /// Verify a face image for a user.
    VerifyFace { user_id: String, image: PathBuf },

    /// Verify an NIC image for a user. Always prints a verification outcome.
    VerifyNic { user_id: String, image: PathBuf },

    /// Diagnostic endpoints for isolated component testing.
    Test {
        #[command(subcommand)]
        action: TestAction,
    },
}

#[derive(clap::Subcommand)]
enum TestAction {
    /// Run the full NIC + face pipeline.
    Full { nic_image: PathBuf, face_image: PathBuf },

    /// Extract the document number from an NIC image.
    ExtractNicNumber { nic_image: PathBuf },

    /// Validate a face image.
    ValidateFace { face_image: PathBuf },
}

/// Layer the configuration: file (or defaults), then environment, then flags.
fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    load_config_with_env(cli, |key| std::env::var(key).ok())
}

fn load_config_with_env(
    cli: &Cli,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ClientConfig> {
    let mut config = match cli.config {
        Some(ref path) => ClientConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ClientConfig::default(),
    }
    .apply_env(env);

    if let Some(ref url) = cli.api_url {
        config.base_url = url.clone();
    }
    if let Some(ref file) = cli.credential_file {
        config.credential_file = file.clone();
    }
    if let Some(ref level) = cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.log_format = format.clone();
    }
    config.validate()?;
    Ok(config)
}

fn read_image(path: &Path) -> anyhow::Result<NamedFile> {
    file_from_path(path).with_context(|| format!("reading image {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a pass-through response, or the best available error message.
fn report(result: Result<RawServiceResponse, TransportFailure>) -> anyhow::Result<ExitCode> {
    match result {
        Ok(response) => {
            print_json(&response)?;
            Ok(if response.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Err(failure) => {
            eprintln!("error: {}", format_error_message(&failure));
            Ok(ExitCode::FAILURE)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let format: LogFormat = config.log_format.parse()?;
    init_logging(format, &config.log_level)?;

    let store = Arc::new(FileCredentialStore::new(&config.credential_file));
    let on_reset = Arc::new(|login_path: &str| {
        tracing::warn!(login_path, "session expired");
        eprintln!("session expired; run `idv login` to sign in again");
    });
    let client = VerificationClient::from_config(&config, store, on_reset)
        .map_err(|e| anyhow::anyhow!("failed to build client: {e}"))?;

    tracing::debug!(base_url = %config.base_url, "client ready");

    match cli.command {
        Command::Health => {
            let healthy = check_api_health(&client).await;
            println!("{}", if healthy { "healthy" } else { "unreachable" });
            Ok(if healthy {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Register {
            full_name,
            email,
            password,
            nic_number,
        } => {
            let request = RegisterRequest {
                full_name,
                email,
                password,
                nic_number,
            };
            report(client.register(&request).await)
        }
        Command::Login { email, password } => {
            report(client.login(&LoginRequest { email, password }).await)
        }
        Command::Logout => {
            client.logout().context("clearing stored credential")?;
            println!("logged out");
            Ok(ExitCode::SUCCESS)
        }
        Command::VerifyFace { user_id, image } => {
            let face = read_image(&image)?;
            report(client.verify_face(&user_id, face).await)
        }
        Command::VerifyNic { user_id, image } => {
            let nic = read_image(&image)?;
            let outcome = client.verify_nic(&user_id, nic).await;
            print_json(&outcome)?;
            if !outcome.success {
                eprintln!("{}", outcome.display_message());
                for suggestion in &outcome.data.suggestions {
                    eprintln!("  - {suggestion}");
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Test { action } => match action {
            TestAction::Full {
                nic_image,
                face_image,
            } => {
                let nic = read_image(&nic_image)?;
                let face = read_image(&face_image)?;
                report(client.test_verify_nic_full(nic, face).await)
            }
            TestAction::ExtractNicNumber { nic_image } => {
                let nic = read_image(&nic_image)?;
                report(client.test_extract_nic_number(nic).await)
            }
            TestAction::ValidateFace { face_image } => {
                let face = read_image(&face_image)?;
                report(client.test_validate_face(face).await)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use idv_client::config::API_URL_ENV;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "idv",
            "--api-url",
            "http://10.1.1.1:9091",
            "--credential-file",
            "/tmp/idv.json",
            "health",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.base_url, "http://10.1.1.1:9091");
        assert_eq!(config.credential_file, PathBuf::from("/tmp/idv.json"));
    }

    #[test]
    fn test_parses_test_subcommands() {
        let cli = Cli::try_parse_from(["idv", "test", "full", "nic.jpg", "face.png"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Test {
                action: TestAction::Full { .. }
            }
        ));
    }

    #[test]
    fn test_env_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("idv.toml");
        std::fs::write(&path, "base_url = \"http://file.example:9091\"\n").unwrap();
        let cli = Cli::try_parse_from([
            "idv",
            "--config",
            path.to_str().unwrap(),
            "logout",
        ])
        .unwrap();

        let config = load_config_with_env(&cli, |key| {
            (key == API_URL_ENV).then(|| "http://env.example:9091".to_string())
        })
        .unwrap();
        assert_eq!(config.base_url, "http://env.example:9091");

        let config = load_config_with_env(&cli, |_| None).unwrap();
        assert_eq!(config.base_url, "http://file.example:9091");
    }

    #[test]
    fn test_flag_overrides_env() {
        let cli = Cli::try_parse_from(["idv", "--api-url", "http://flag.example", "health"]).unwrap();
        let config = load_config_with_env(&cli, |_| Some("http://env.example".to_string())).unwrap();
        assert_eq!(config.base_url, "http://flag.example");
    }

    #[test]
    fn test_rejects_invalid_api_url() {
        let cli = Cli::try_parse_from(["idv", "--api-url", "localhost", "health"]).unwrap();
        assert!(load_config(&cli).is_err());
    }
}
