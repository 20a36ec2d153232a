use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uai_auth::{Argon2Hasher, CredentialHasher, SymmetricKey};
use uai_server::{server, telemetry};

#[derive(Parser, Debug)]
#[command(name = "uai", version, about = "Uai user service")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service.
    Serve {
        /// Path to the TOML config file. Defaults to $UAI_CONFIG, then ./uai.toml
        #[arg(long, short)]
        config: Option<PathBuf>,
    },

    /// Token key management
    Keys {
        #[command(subcommand)]
        cmd: KeysCommand,
    },

    /// Print an Argon2id digest for use as bootstrap.password_hash
    HashPassword {
        #[arg(long, env = "UAI_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(Subcommand, Debug)]
enum KeysCommand {
    /// Print a new hex-encoded token key
    Generate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Command::Serve { config } => {
            let cfg = uai_core::load_config(config.as_deref()).context("failed to load config")?;
            telemetry::init_tracing(&cfg.logging)?;
            server::run(cfg).await
        }
        Command::Keys {
            cmd: KeysCommand::Generate,
        } => {
            println!("{}", SymmetricKey::generate().to_hex());
            Ok(())
        }
        Command::HashPassword { password } => {
            uai_server::http::validation::password(&password)
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            let digest = Argon2Hasher::default().hash(&password)?;
            println!("{digest}");
            Ok(())
        }
    }
}
