use clap::{Parser, Subcommand};
use credforge::{
    aws::{self, AwsKms, AwsSecretStore},
    config::AppConfig,
    provision::{generate_secret, CredentialEnvironment, SecretProvisioner},
    token::{load_signing_keys, SigningKey, TokenIssuer},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "credforge-admin")]
#[command(about = "Operator CLI for credforge secrets and tokens")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a new 256-bit secret as hex
    Generate,
    /// Generate a secret and encrypt it under a KMS alias
    Encrypt {
        /// Key alias, with or without the `alias/` prefix
        #[arg(long)]
        alias: String,
    },
    /// Generate a secret and encrypt it under the configured rotation alias
    Rotate,
    /// Issue a token signed with a hex-encoded key
    Issue {
        #[arg(long)]
        key_hex: String,
        /// Validity in minutes (defaults to token.validity_minutes)
        #[arg(long)]
        minutes: Option<u32>,
    },
    /// Validate a token against a hex-encoded key
    Validate {
        #[arg(long)]
        key_hex: String,
        token: String,
    },
    /// Load the signing key pair from Secrets Manager and issue a token pair
    Keys {
        /// Secret name (defaults to token.signing_secret_name)
        #[arg(long)]
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credforge=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    match cli.command {
        Commands::Generate => {
            println!("{}", generate_secret().to_hex());
        }
        Commands::Encrypt { alias } => {
            let provisioner = provisioner(&config).await;
            let secret = generate_secret();
            let blob = provisioner.encrypt_secret(&secret, &alias).await?;
            println!("secret: {}", secret.to_hex());
            println!("ciphertext: {}", blob.to_base64());
        }
        Commands::Rotate => {
            let blob = provisioner(&config).await.rotate_secret().await?;
            println!("{}", blob.to_base64());
        }
        Commands::Issue { key_hex, minutes } => {
            let key = SigningKey::from_hex(&key_hex)?;
            let minutes = minutes.unwrap_or(config.token.validity_minutes);
            println!("{}", TokenIssuer::new().issue_token(key.as_bytes(), minutes)?);
        }
        Commands::Validate { key_hex, token } => {
            let key = SigningKey::from_hex(&key_hex)?;
            let claims = TokenIssuer::new().validate_token(&token, key.as_bytes())?;
            println!("{}", serde_json::to_string_pretty(&claims)?);
        }
        Commands::Keys { name } => {
            let name = name.unwrap_or_else(|| config.token.signing_secret_name.clone());
            let sdk_config = aws::load_sdk_config(&config.aws).await;
            let store = AwsSecretStore::new(&sdk_config, config.aws.secrets_endpoint.as_deref());
            let keys = load_signing_keys(&store, &name).await?;
            let pair = TokenIssuer::new().issue_pair(&keys, &config.token)?;
            println!("access: {}", pair.access);
            println!("refresh: {}", pair.refresh);
        }
    }

    Ok(())
}

async fn provisioner(config: &AppConfig) -> SecretProvisioner {
    let sdk_config = aws::load_sdk_config(&config.aws).await;
    let kms = Arc::new(AwsKms::new(&sdk_config, config.aws.kms_endpoint.clone()));
    SecretProvisioner::new(kms, config, CredentialEnvironment::from_process())
}
