use std::io;

use actix_cors::Cors;
use actix_web::{
    middleware::{self, Condition},
    web::Data,
    App, HttpServer,
};
use clap::{ArgAction, Parser};
use database::{
    database::options::DatabaseOptions, persistence::transaction::TransactionWriteMode, store,
};

mod routes;

/// 📇 People REST Server, create, list, update and delete people over HTTP
#[derive(Parser, Debug)]
struct Cli {
    /// Port the rest server will run on
    #[clap(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Address the rest server will run on
    #[clap(short, long, env = "ADDRESS", default_value = "0.0.0.0")]
    address: String,

    /// Where people are stored: mongodb://, mongodb+srv://, file://<directory> or memory://
    #[clap(short, long, env = "MONGODB_URL", default_value = "file://data")]
    database_url: String,

    /// Disables the HTTP access log
    #[clap(long)]
    no_log_http: bool,

    #[clap(long, env = "HTTP_WORKERS", default_value_t = 1)]
    http_workers: usize,

    /// Sync each committed transaction to disk, only used by the file:// store
    #[clap(long, env = "SYNC_WRITES", default_value_t = true, action = ArgAction::Set)]
    sync_writes: bool,
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // A missing .env file is fine, the environment and flags still apply
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            eprintln!("Unable to load .env file: {}", err);
        }
    }

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Cli::parse();

    let write_mode = if args.sync_writes {
        TransactionWriteMode::Sync
    } else {
        TransactionWriteMode::OSBuffered
    };

    let database_options = DatabaseOptions::default().set_sync_file_write(write_mode);

    let people_store = store::connect(&args.database_url, database_options)
        .await
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;

    log::info!("starting HTTP server on port {}.", args.port);

    let server_store = people_store.clone();
    let log_http = !args.no_log_http;

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(Data::from(server_store.clone()))
            .configure(routes::configure)
            .wrap(Cors::permissive())
            .wrap(Condition::new(log_http, middleware::Logger::default()))
    })
    .workers(args.http_workers)
    .bind((args.address, args.port))?
    .run()
    .await?;

    // The server has stopped on a signal, let the store flush and close
    match people_store.shutdown().await {
        Ok(shutdown_response) => log::info!("Shutting down server: {}", shutdown_response),
        Err(err) => log::error!("Unable to shutdown store: {}", err),
    }

    Ok(())
}
