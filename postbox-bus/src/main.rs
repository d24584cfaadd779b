use argon2::Params;
use postbox_bus::bus::{BusError, Context, ErrorKind, HandlerTable, MessageBus, Outcome};
use postbox_common::{
    event::{Event, EventPayload},
    model::auth::CredentialHasher,
};
use postbox_db::client::{DbClient, DbConfig, DbError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Error)]
enum InitError {
    #[error("Error parsing .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Error parsing environment: {0}")]
    Envy(#[from] envy::Error),
    #[error("Invalid password hashing parameters: {0}")]
    PasswordParams(argon2::Error),
    #[error("Error setting up database: {0}")]
    Database(#[from] DbError),
    #[error("Error building message bus: {0}")]
    Bus(#[from] BusError),
    #[error("Error reading or writing events: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error serializing outcome: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct Env {
    password_memory_kib: Option<u32>,
    password_iterations: Option<u32>,
    password_parallelism: Option<u32>,
}

impl Env {
    fn password_params(&self) -> Result<Params, InitError> {
        Params::new(
            self.password_memory_kib.unwrap_or(Params::DEFAULT_M_COST),
            self.password_iterations.unwrap_or(Params::DEFAULT_T_COST),
            self.password_parallelism.unwrap_or(Params::DEFAULT_P_COST),
            None,
        )
        .map_err(InitError::PasswordParams)
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum Response {
    Outcomes { outcomes: Vec<Outcome> },
    Error { error: String, kind: &'static str },
}

fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "postbox=debug,postbox_bus=debug,postbox_db=debug,sqlx=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

const DB_ENV_PREFIX: &str = "DATABASE_";

fn get_env() -> Result<(Env, DbConfig), InitError> {
    if let Err(e) = dotenvy::dotenv() {
        if e.not_found() {
            debug!("No .dotenv file found");
        } else {
            return Err(e.into());
        }
    }

    let env: Env = envy::from_env()?;
    let db_config: DbConfig = envy::prefixed(DB_ENV_PREFIX).from_env()?;
    Ok((env, db_config))
}

fn kind_name(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::NotFound => "not_found",
        ErrorKind::Validation => "validation",
        ErrorKind::Unauthorized => "unauthorized",
        ErrorKind::Configuration => "configuration",
        ErrorKind::Failure => "failure",
    }
}

async fn respond(bus: &MessageBus, line: &str) -> Response {
    let payload = match serde_json::from_str::<EventPayload>(line) {
        Ok(payload) => payload,
        Err(err) => {
            return Response::Error {
                error: format!("Invalid event: {err}"),
                kind: kind_name(ErrorKind::Validation),
            };
        }
    };

    match bus.handle(Event::new(payload)).await {
        Ok(outcomes) => Response::Outcomes { outcomes },
        Err(err) => {
            error!(error = %err, "Dispatch failed");
            Response::Error {
                error: err.to_string(),
                kind: kind_name(err.kind()),
            }
        }
    }
}

/// Reads one JSON event per line from stdin and writes one JSON response per line.
#[tokio::main]
async fn main() -> Result<(), InitError> {
    install_tracing();
    let (env, db_config) = get_env()?;

    let db = DbClient::connect(&db_config).await?;
    db.migrate().await?;

    let hasher = CredentialHasher::new(env.password_params()?);
    let bus = MessageBus::new(Context::new(db, hasher), HandlerTable::with_use_cases())?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = respond(&bus, &line).await;
        let mut json = serde_json::to_vec(&response)?;
        json.push(b'\n');
        stdout.write_all(&json).await?;
        stdout.flush().await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_config_reads_prefixed_variables() {
        let config: DbConfig = envy::prefixed(DB_ENV_PREFIX)
            .from_iter([
                ("DATABASE_URL".to_owned(), "sqlite::memory:".to_owned()),
                ("DATABASE_MAX_CONNECTIONS".to_owned(), "3".to_owned()),
                ("PASSWORD_ITERATIONS".to_owned(), "1".to_owned()),
            ])
            .unwrap();

        assert_eq!(
            config,
            DbConfig {
                url: DbConfig::MEMORY_URL.to_owned(),
                max_connections: 3,
            }
        );
    }

    #[test]
    fn db_config_falls_back_to_defaults() {
        let config: DbConfig = envy::prefixed(DB_ENV_PREFIX)
            .from_iter(Vec::<(String, String)>::new())
            .unwrap();

        assert_eq!(config, DbConfig::default());
    }
}
