//! Refer to Pavex's configuration guide for more details on how configuration
//! values are loaded and merged across profiles.
use secrecy::{ExposeSecret, Secret};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::postgres::{PgConnectOptions, PgPool, PgSslMode};

#[derive(serde::Deserialize, Clone, Debug)]
/// Configuration for the HTTP server used to expose the registry API.
#[pavex::config(key = "server", include_if_unused)]
pub struct ServerConfig {
    /// The port that the server must listen on.
    ///
    /// Set the `PX_SERVER__PORT` environment variable to override its value.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    /// The network interface that the server must be bound to.
    ///
    /// E.g. `0.0.0.0` for listening to incoming requests from all sources.
    ///
    /// Set the `PX_SERVER__IP` environment variable to override its value.
    pub ip: std::net::IpAddr,
}

impl ServerConfig {
    /// Bind a TCP listener according to the specified parameters.
    pub async fn listener(&self) -> Result<pavex::server::IncomingStream, std::io::Error> {
        let addr = std::net::SocketAddr::new(self.ip, self.port);
        pavex::server::IncomingStream::bind(addr).await
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
/// Connection parameters for the Postgres database backing the registry store.
#[pavex::config(key = "database", include_if_unused)]
pub struct DatabaseConfig {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub username: String,
    pub password: Secret<String>,
    pub database_name: String,
    pub require_ssl: bool,
}

#[pavex::methods]
impl DatabaseConfig {
    /// Return the connection options derived from this configuration.
    pub fn connection_options(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };
        PgConnectOptions::new()
            .host(&self.host)
            .username(&self.username)
            .password(self.password.expose_secret())
            .port(self.port)
            .ssl_mode(ssl_mode)
            .database(&self.database_name)
    }

    /// Build the connection pool used by the registry store and run any
    /// pending migrations against it.
    ///
    /// Registered as a `Singleton` constructor: a single pool is built once,
    /// at startup, and shared by every request.
    #[singleton]
    pub async fn pool(&self) -> Result<PgPool, sqlx::Error> {
        let pool = PgPool::connect_with(self.connection_options()).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(pool)
    }
}
