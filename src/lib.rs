#[macro_use]
extern crate rocket;

pub mod config;
pub mod csv_import;
pub mod db;
pub mod error;
pub mod models;
pub mod query;
pub mod request_logger;
pub mod routes;
pub mod service;
pub mod store;
pub mod validation;

use crate::config::{DirectoryConfig, StoreBackend};
use crate::db::DirectoryDb;
use crate::request_logger::RequestLogger;
use crate::service::EmployeeService;
use crate::store::{MemoryStore, PgEmployeeStore};
use env_logger::Env;
use rocket::fairing::AdHoc;
use rocket::http::Method;
use rocket::{Build, Rocket, Route};
use rocket_cors::{AllowedOrigins, CorsOptions};
use rocket_db_pools::Database;
use rocket_okapi::{
    openapi_get_routes,
    rapidoc::{GeneralConfig, HideShowConfig, RapiDocConfig, make_rapidoc},
    settings::UrlObject,
    swagger_ui::{SwaggerUIConfig, make_swagger_ui},
};
use std::sync::{Arc, Once};

static LOGGER: Once = Once::new();

fn init_logger() {
    LOGGER.call_once(|| {
        env_logger::Builder::from_env(
            Env::default().default_filter_or("info,rocket::server=warn,rocket::request=warn"),
        )
        .init();
    });
}

/// Every API route, including the generated `/openapi.json`.
pub fn api_routes() -> Vec<Route> {
    openapi_get_routes![
        // Health
        routes::health::health_check,
        // Employees
        routes::employees::list_employees,
        routes::employees::get_employee,
        routes::employees::create_employee,
        routes::employees::update_employee,
        routes::employees::delete_employee,
        routes::employees::bulk_import,
        routes::employees::bulk_import_csv,
        // Reports
        routes::reports::department_report,
    ]
}

fn api_catchers() -> Vec<rocket::Catcher> {
    catchers![
        routes::catchers::bad_request,
        routes::catchers::not_found,
        routes::catchers::unprocessable,
        routes::catchers::internal_error,
    ]
}

pub fn rocket() -> Rocket<Build> {
    init_logger();
    let config = DirectoryConfig::from_env();
    log::info!("starting employee directory with {:?} store", config.store);
    build(config)
}

/// Assemble the application for the given configuration.
pub fn build(config: DirectoryConfig) -> Rocket<Build> {
    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .allowed_methods(
            vec![
                Method::Get,
                Method::Post,
                Method::Put,
                Method::Delete,
                Method::Patch,
            ]
            .into_iter()
            .map(From::from)
            .collect(),
        )
        .allow_credentials(true)
        .to_cors()
        .expect("Error creating CORS");

    let rocket = rocket::build()
        .attach(RequestLogger)
        .attach(cors)
        .manage(config.clone());

    let rocket = match config.store {
        StoreBackend::Memory => {
            rocket.manage(EmployeeService::new(Arc::new(MemoryStore::new())))
        }
        StoreBackend::Postgres => attach_postgres(rocket),
    };

    rocket
        .mount("/", api_routes())
        .register("/", api_catchers())
        .mount(
            "/docs/swagger/",
            make_swagger_ui(&SwaggerUIConfig {
                url: "../../openapi.json".to_owned(),
                ..Default::default()
            }),
        )
        .mount(
            "/docs/rapidoc/",
            make_rapidoc(&RapiDocConfig {
                general: GeneralConfig {
                    spec_urls: vec![UrlObject::new("Employee Directory API", "../../openapi.json")],
                    ..Default::default()
                },
                hide_show: HideShowConfig {
                    allow_spec_url_load: false,
                    allow_spec_file_load: false,
                    ..Default::default()
                },
                ..Default::default()
            }),
        )
}

fn attach_postgres(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .attach(DirectoryDb::init())
        // Run database migrations on startup
        .attach(AdHoc::try_on_ignite(
            "Run Migrations",
            |rocket| async move {
                match DirectoryDb::fetch(&rocket) {
                    Some(directory_db) => {
                        let pool = (**directory_db).clone();
                        match db::run_migrations(&pool).await {
                            Ok(()) => {
                                log::info!("database migrations successful");
                                Ok(rocket)
                            }
                            Err(e) => {
                                log::error!("database migrations failed: {}", e);
                                Err(rocket)
                            }
                        }
                    }
                    None => {
                        log::error!("database pool not available for migrations");
                        Err(rocket)
                    }
                }
            },
        ))
        .attach(AdHoc::try_on_ignite(
            "Manage Employee Store",
            |rocket| async move {
                match DirectoryDb::fetch(&rocket) {
                    Some(db) => {
                        let pool = (**db).clone();
                        let service = EmployeeService::new(Arc::new(PgEmployeeStore::new(pool)));
                        Ok(rocket.manage(service))
                    }
                    None => Err(rocket),
                }
            },
        ))
}

#[cfg_attr(not(test), allow(dead_code))]
pub mod test_support {
    use crate::config::DirectoryConfig;
    use crate::service::EmployeeService;
    use crate::store::{EmployeeStore, MemoryStore};
    use rocket::config::LogLevel;
    use rocket::figment::Figment;
    use rocket::local::asynchronous::Client as AsyncClient;
    use rocket::local::blocking::Client;
    use rocket::{Build, Rocket};
    use std::sync::Arc;

    pub use database::{TestDatabase, TestDatabaseError};

    pub mod database {
        use crate::db::MIGRATOR;
        use log::LevelFilter;
        use rocket_db_pools::sqlx::postgres::{PgConnectOptions, PgPoolOptions};
        use rocket_db_pools::sqlx::{self, ConnectOptions, PgPool};
        use testcontainers::{GenericImage, ImageExt, core::WaitFor};
        use testcontainers_modules::testcontainers::{
            ContainerAsync, core::error::TestcontainersError, runners::AsyncRunner,
        };
        use thiserror::Error;
        use tokio::runtime::Handle;
        use uuid::Uuid;

        #[derive(Debug, Error)]
        pub enum TestDatabaseError {
            #[error("neither TEST_DATABASE_URL nor DIRECTORY_TEST_CONTAINERS is set")]
            MissingUrl,
            #[error("database error: {0}")]
            Sqlx(#[from] sqlx::Error),
            #[error("migration error: {0}")]
            Migration(#[from] sqlx::migrate::MigrateError),
            #[error("container error: {0}")]
            Container(#[from] TestcontainersError),
        }

        /// Ephemeral, migrated database for integration tests.
        pub struct TestDatabase {
            pool: Option<PgPool>,
            admin_options: PgConnectOptions,
            database_name: String,
            container: Option<ContainerAsync<GenericImage>>,
        }

        impl TestDatabase {
            /// Use `TEST_DATABASE_URL` when set, otherwise start a Postgres
            /// container if `DIRECTORY_TEST_CONTAINERS=1`.
            pub async fn new_from_env() -> Result<Self, TestDatabaseError> {
                if let Ok(url) = std::env::var("TEST_DATABASE_URL") {
                    return Self::provision(&url, None).await;
                }

                let containers_enabled = std::env::var("DIRECTORY_TEST_CONTAINERS")
                    .map(|value| matches!(value.as_str(), "1" | "true" | "yes"))
                    .unwrap_or(false);
                if containers_enabled {
                    Self::new().await
                } else {
                    Err(TestDatabaseError::MissingUrl)
                }
            }

            /// Launch a disposable Postgres container and provision a database in it.
            pub async fn new() -> Result<Self, TestDatabaseError> {
                let image = GenericImage::new("postgres", "16-alpine")
                    .with_wait_for(WaitFor::message_on_stdout(
                        "database system is ready to accept connections",
                    ))
                    .with_wait_for(WaitFor::message_on_stderr(
                        "database system is ready to accept connections",
                    ));

                let container = image
                    .with_env_var("POSTGRES_DB", "postgres")
                    .with_env_var("POSTGRES_USER", "postgres")
                    .with_env_var("POSTGRES_PASSWORD", "postgres")
                    .start()
                    .await?;

                let host = container.get_host().await?.to_string();
                let port = container.get_host_port_ipv4(5432).await?;
                let admin_url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

                Self::provision(&admin_url, Some(container)).await
            }

            async fn provision(
                admin_url: &str,
                container: Option<ContainerAsync<GenericImage>>,
            ) -> Result<Self, TestDatabaseError> {
                let base_options: PgConnectOptions = admin_url.parse()?;
                let base_options = base_options.log_statements(LevelFilter::Off);

                let base_name = base_options
                    .get_database()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "postgres".to_string());

                let admin_options = base_options.clone().database("postgres");
                let admin_pool = PgPoolOptions::new()
                    .max_connections(1)
                    .connect_with(admin_options.clone())
                    .await?;

                let new_db_name = format!("{}_{}", base_name, Uuid::new_v4().simple());
                let create_sql = format!("CREATE DATABASE \"{}\" TEMPLATE template0", new_db_name);
                sqlx::query(&create_sql).execute(&admin_pool).await?;
                admin_pool.close().await;

                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .connect_with(base_options.clone().database(&new_db_name))
                    .await?;

                MIGRATOR.run(&pool).await?;

                Ok(Self {
                    pool: Some(pool),
                    admin_options,
                    database_name: new_db_name,
                    container,
                })
            }

            pub fn pool(&self) -> &PgPool {
                self.pool.as_ref().expect("test database pool is available")
            }

            pub fn pool_clone(&self) -> PgPool {
                self.pool().clone()
            }

            /// Close pool connections and drop the ephemeral database.
            pub async fn close(mut self) -> Result<(), TestDatabaseError> {
                if let Some(pool) = self.pool.take() {
                    pool.close().await;
                }

                drop_database_with_fallback(self.admin_options.clone(), &self.database_name)
                    .await?;

                if let Some(container) = self.container.take() {
                    drop(container);
                }

                Ok(())
            }
        }

        async fn drop_database_with_fallback(
            admin_options: PgConnectOptions,
            database_name: &str,
        ) -> Result<(), sqlx::Error> {
            let admin_pool = PgPoolOptions::new()
                .max_connections(1)
                .connect_with(admin_options)
                .await?;

            let drop_force = format!("DROP DATABASE \"{}\" WITH (FORCE)", database_name);
            match sqlx::query(&drop_force).execute(&admin_pool).await {
                Ok(_) => Ok(()),
                Err(err) if force_drop_unsupported(&err) => {
                    let drop_sql = format!("DROP DATABASE \"{}\"", database_name);
                    sqlx::query(&drop_sql).execute(&admin_pool).await?;
                    Ok(())
                }
                Err(err) => Err(err),
            }
        }

        fn force_drop_unsupported(err: &sqlx::Error) -> bool {
            matches!(
                err,
                sqlx::Error::Database(db_err)
                    if db_err
                        .code()
                        .map(|code| code == "42601" || code == "0A000")
                        .unwrap_or(false)
            )
        }

        impl Drop for TestDatabase {
            fn drop(&mut self) {
                if let Some(pool) = self.pool.take() {
                    let admin_options = self.admin_options.clone();
                    let db_name = self.database_name.clone();
                    if let Ok(handle) = Handle::try_current() {
                        handle.spawn(async move {
                            pool.close().await;
                            let _ = drop_database_with_fallback(admin_options, &db_name).await;
                        });
                    }
                }

                if let Some(container) = self.container.take() {
                    drop(container);
                }
            }
        }
    }

    /// Builder for Rocket instances used by route tests.
    pub struct TestRocketBuilder {
        figment: Figment,
        config: DirectoryConfig,
        store: Option<Arc<dyn EmployeeStore>>,
    }

    impl Default for TestRocketBuilder {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestRocketBuilder {
        /// Random port, logging disabled, in-memory store.
        pub fn new() -> Self {
            let figment = rocket::Config::figment()
                .merge(("port", 0))
                .merge(("log_level", LogLevel::Off))
                .merge(("cli_colors", false));

            Self {
                figment,
                config: DirectoryConfig::in_memory(),
                store: None,
            }
        }

        pub fn with_config(mut self, config: DirectoryConfig) -> Self {
            self.config = config;
            self
        }

        /// Serve requests from the given store instead of a fresh memory store.
        pub fn with_store(mut self, store: Arc<dyn EmployeeStore>) -> Self {
            self.store = Some(store);
            self
        }

        pub fn build(self) -> Rocket<Build> {
            let store = self
                .store
                .unwrap_or_else(|| Arc::new(MemoryStore::new()) as Arc<dyn EmployeeStore>);

            rocket::custom(self.figment)
                .manage(self.config)
                .manage(EmployeeService::new(store))
                .mount("/", super::api_routes())
                .register("/", super::api_catchers())
        }

        pub fn blocking_client(self) -> Client {
            Client::tracked(self.build()).expect("valid Rocket instance")
        }

        pub async fn async_client(self) -> AsyncClient {
            AsyncClient::tracked(self.build())
                .await
                .expect("valid Rocket instance")
        }
    }
}
