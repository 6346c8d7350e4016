use actix_web::{web, App, HttpServer};
use log::info;

use file_vault::api;
use file_vault::app_state::AppState;
use file_vault::config::AppConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = AppConfig::load().expect("Failed to load configuration");
    log4rs::init_file(&config.logging.config_file, Default::default())
        .expect("Failed to initialize logging");

    info!(
        "Starting server on {}:{}",
        config.server.host, config.server.port
    );

    let state = AppState::from_config(config.clone());
    let data = web::Data::new(state);
    let max_payload_size = config.server.max_payload_size;

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .app_data(web::PayloadConfig::default().limit(max_payload_size))
            .app_data(data.clone())
            .configure(api::routes)
    })
    .workers(config.server.workers)
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
