use std::sync::Arc;

use actix_web::{App, HttpServer};
use paperclip::actix::{web, OpenApiExt};
use tracing_actix_web::TracingLogger;

use bookshelf_library::client::BookshelfLibraryClient;
use bookshelf_library::telemetry::init_telemetry;
use bookshelf_recommendations::app_config::config_app;
use bookshelf_recommendations::recommendations::Recommender;
use bookshelf_recommendations::recommendations_service::RecommendationsService;
use bookshelf_recommendations::settings::Settings;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_telemetry("bookshelf_recommendations")?;
    let settings = Settings::load()?;

    let library_client = BookshelfLibraryClient::new(&settings.library_url)?;
    let service = web::Data::new(RecommendationsService::new(
        Arc::new(library_client),
        Recommender::new(settings.recommender.clone())?,
        settings.default_count,
    ));

    tracing::info!(
        "starting HTTP server at http://0.0.0.0:{}, library at {}",
        settings.port,
        settings.library_url
    );
    HttpServer::new(move || {
        App::new()
            .wrap_api()
            .app_data(service.clone())
            .wrap(TracingLogger::default())
            .configure(config_app)
            .with_json_spec_at("/apispec/v2")
            .build()
    })
    .bind(("0.0.0.0", settings.port))?
    .run()
    .await?;
    Ok(())
}
