use std::sync::Arc;

use actix_web::{App, HttpServer};
use paperclip::actix::{web, OpenApiExt};
use tracing_actix_web::TracingLogger;

use bookshelf_library::app_config::config_app;
use bookshelf_library::library_store::{InMemoryLibraryStore, LibraryStore, PostgresLibraryStore};
use bookshelf_library::settings::Settings;
use bookshelf_library::telemetry::init_telemetry;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_telemetry("bookshelf_library")?;
    let settings = Settings::load()?;

    let store: Arc<dyn LibraryStore> = if settings.use_in_memory_db {
        tracing::info!("Using in memory library store");
        Arc::new(InMemoryLibraryStore::default())
    } else {
        Arc::new(PostgresLibraryStore::init(settings.db.clone().into()).await?)
    };

    tracing::info!("starting HTTP server at http://0.0.0.0:{}", settings.port);
    HttpServer::new(move || {
        App::new()
            .wrap_api()
            .app_data(web::Data::new(store.clone()))
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
