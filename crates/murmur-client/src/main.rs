use murmur_client_lib::config::ClientConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    murmur_client_lib::init_tracing();

    let config = ClientConfig::from_env();
    tracing::debug!(?config, "configuration loaded");

    murmur_client_lib::run(config).await
}
