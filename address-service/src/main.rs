use address_service::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_tracing(&config)?;

    let state = AppState::builder()
        .config(config.clone())
        .without_tracing()
        .build()
        .await?;

    Server::new(config).serve(router(state)).await
}
