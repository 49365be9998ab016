use std::sync::Arc;

use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Result;
use dotenvy::dotenv;
use log::info;
use xrate::{Config, ConversionService, FixerProvider, PgRateStore, http};

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();
    let config = Config::from_env()?;

    let store = PgRateStore::connect(&config.database_url).await?;
    store.migrate().await?;
    let provider = FixerProvider::new(config.provider_url.clone(), config.provider_timeout)?;
    let service = web::Data::new(ConversionService::new(
        Arc::new(store),
        Arc::new(provider),
        Arc::new(config.clock),
    ));

    info!(
        "Starting HTTP listener on {} (rates from {}, cache keys on {} time)",
        config.bind, config.provider_url, config.clock
    );
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %U").log_target("xrate::access_log"))
            .app_data(service.clone())
            .configure(http::configure)
    })
    .bind(&config.bind)?
    .run()
    .await?;

    Ok(())
}
