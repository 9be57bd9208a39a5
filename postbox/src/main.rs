use actix_web::{App, HttpResponse, HttpServer, middleware::Logger, web};
use anyhow::Context;
use async_graphql::http::GraphiQLSource;
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};
use tracing::info;
use tracing_subscriber::prelude::*;

use postbox::{
    backend::StoreBackendBuilder,
    config::{Config, StoreConfig, StoreKind},
    context::{Collections, prepare_store},
    memory::InMemoryStore,
    schema::{AppSchema, build_schema},
    store::DocumentStore,
};

async fn graphql_handler(
    schema: web::Data<AppSchema>,
    collections: web::Data<Collections>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    schema
        .execute(collections.attach(req.into_inner()))
        .await
        .into()
}

async fn graphiql_handler() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(GraphiQLSource::build().endpoint("/graphql").finish())
}

/// SDL of the served schema
async fn schema_handler(schema: web::Data<AppSchema>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain")
        .body(schema.sdl())
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn open_store(config: &StoreConfig) -> anyhow::Result<DocumentStore> {
    match config.backend {
        StoreKind::Memory => {
            info!("using in-memory document store");
            Ok(DocumentStore::new(InMemoryStore::builder().build().await?))
        }
        #[cfg(feature = "mongodb")]
        StoreKind::MongoDb => {
            use postbox::mongodb::MongoDbStore;

            let url = config
                .mongo_url
                .as_deref()
                .context("MONGO_URL must be set when STORE_BACKEND is mongodb")?;

            let backend = MongoDbStore::builder(url, &config.database)
                .build()
                .await
                .context("failed to connect to MongoDB")?;

            Ok(DocumentStore::new(backend))
        }
        #[cfg(not(feature = "mongodb"))]
        StoreKind::MongoDb => {
            anyhow::bail!("built without the `mongodb` feature; set STORE_BACKEND=memory")
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,postbox=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true),
        )
        .init();

    info!("Starting postbox...");

    let config = Config::from_env().context("failed to load configuration")?;

    let store = open_store(&config.store).await?;
    prepare_store(&store)
        .await
        .context("failed to prepare collections and indexes")?;

    let collections = Collections::new(&store);
    let schema = build_schema(&config.graphql);
    let playground = config.graphql.playground;

    let bind_addr = config.bind_addr();
    info!(
        backend = ?config.store.backend,
        playground,
        "GraphQL server starting on http://{}",
        bind_addr
    );

    HttpServer::new(move || {
        let app = App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(schema.clone()))
            .app_data(web::Data::new(collections.clone()))
            .route("/graphql", web::post().to(graphql_handler))
            .route("/schema", web::get().to(schema_handler))
            .route("/health", web::get().to(health_handler));

        if playground {
            app.route("/graphql", web::get().to(graphiql_handler))
        } else {
            app
        }
    })
    .bind(&bind_addr)
    .with_context(|| format!("failed to bind {bind_addr}"))?
    .run()
    .await?;

    Ok(())
}
