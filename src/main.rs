use credforge::{
    aws::{self, AwsKms},
    config::AppConfig,
    provision::{generate_secret, CredentialEnvironment, SecretProvisioner},
    token::{SigningKey, TokenIssuer},
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables still apply
    dotenvy::dotenv().ok();

    // Initialize logging first
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credforge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting credforge v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load()?;
    info!(region = %config.aws.region, "Configuration loaded");

    // Provision a secret through KMS
    let sdk_config = aws::load_sdk_config(&config.aws).await;
    let kms = Arc::new(AwsKms::new(&sdk_config, config.aws.kms_endpoint.clone()));
    let provisioner = SecretProvisioner::new(kms, &config, CredentialEnvironment::from_process());

    let secret = generate_secret();
    println!("Generated Secret: {}", secret.to_hex());

    let alias = config.provisioner.rotation_alias()?;
    let encrypted = provisioner.encrypt_secret(&secret, alias).await?;
    println!("Encrypted Secret: {}", encrypted.to_base64());

    // Issue and check a token under a throwaway key
    let signing_key = SigningKey::new(generate_secret().as_bytes())?;
    let issuer = TokenIssuer::new();
    let token = issuer.issue_token(signing_key.as_bytes(), config.token.validity_minutes)?;
    println!("Generated Token: {}", token);

    match issuer.validate_token(&token, signing_key.as_bytes()) {
        Ok(claims) => println!("Token is valid. Payload: {}", serde_json::to_string(&claims)?),
        Err(e) => {
            error!("Token validation failed: {}", e);
            println!("Token validation failed: {}", e);
        }
    }

    Ok(())
}
