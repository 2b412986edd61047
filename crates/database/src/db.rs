use anyhow::Result;
use mongodb::error::{Error as MongoDbError, ErrorKind, WriteFailure};
use mongodb::{Client, Database};

use crate::MongoDbEnv;

const DUPLICATE_KEY_CODE: i32 = 11000;

pub async fn connect(env: &MongoDbEnv) -> Result<Database> {
    let client = Client::with_uri_str(&env.mongodb_uri).await?;
    tracing::info!("[connect] MongoDB client ready for database {}", env.database_name);
    Ok(client.database(&env.database_name))
}

/// True when the server rejected a write because it violates a unique index.
pub fn is_duplicate_key(err: &MongoDbError) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        _ => false,
    }
}

/// Declares the document types stored by a service and generates
/// `connect_database(create_indexes)`, which connects once per process
/// and optionally creates every listed type's indexes.
///
/// ```rust,ignore
/// init_databases!(
///     default: [User, Job, Referral]
/// );
///
/// let db = connect_database(true).await?;
/// ```
#[macro_export]
macro_rules! init_databases {
    (
        default: [$($default_type:ty),* $(,)?]
    ) => {
        static DATABASE: $crate::OnceCell<$crate::Database> = $crate::OnceCell::const_new();

        async fn connect_database(create_indexes: bool) -> anyhow::Result<&'static $crate::Database> {
            DATABASE.get_or_try_init(|| async {
                let env = <$crate::MongoDbEnv as $crate::EnvVars>::load()?;
                let db = $crate::connect(&env).await?;

                if create_indexes {
                    $(
                        <$default_type as $crate::MongoDbObject>::ensure_indexes(&db).await
                            .map_err(|e| anyhow::anyhow!(
                                "failed to create indexes for '{}': {:?}", stringify!($default_type), e
                            ))?;
                    )*
                }

                Ok::<_, anyhow::Error>(db)
            }).await
        }
    };
}
