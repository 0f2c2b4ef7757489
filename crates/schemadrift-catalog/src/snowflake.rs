//! Snowflake metadata source using INFORMATION_SCHEMA
//!
//! This source queries Snowflake's INFORMATION_SCHEMA.COLUMNS view for every
//! column of one database. It requires appropriate privileges:
//! - USAGE on the database and its schemas
//! - SELECT on INFORMATION_SCHEMA views
//!
//! ## Authentication Methods
//!
//! 1. Password authentication (username/password)
//! 2. Key-pair authentication (private key PEM)
//!
//! ## Usage
//!
//! ```rust,ignore
//! let source = SnowflakeSource::builder()
//!     .with_password("xy12345.us-east-1", "username", "password")
//!     .with_warehouse("COMPUTE_WH")
//!     .with_database("RAW")
//!     .build()?;
//! ```
//!
//! Reference: https://docs.snowflake.com/en/sql-reference/info-schema/columns

use crate::adapter::{FetchError, MetadataSource};
use schemadrift_core::{SnapshotColumn, SourceConfig};
use std::path::Path;

#[cfg(feature = "snowflake")]
use snowflake_api::SnowflakeApi;

#[cfg(feature = "snowflake")]
use arrow_array::cast::AsArray;

#[cfg(feature = "snowflake")]
use arrow_array::types::{Int16Type, Int32Type, Int64Type, Int8Type};

#[cfg(feature = "snowflake")]
use arrow_array::{Array, RecordBatch, StringArray};

#[cfg(feature = "snowflake")]
use arrow_schema::DataType;

/// Snowflake authentication credentials
#[derive(Clone)]
pub enum SnowflakeCredentials {
    /// Password-based authentication
    Password(String),
    /// Key-pair authentication (PEM format private key)
    PrivateKey(String),
}

/// Builder for SnowflakeSource
pub struct SnowflakeSourceBuilder {
    account: String,
    username: String,
    credentials: SnowflakeCredentials,
    warehouse: Option<String>,
    role: Option<String>,
    database: Option<String>,
}

impl SnowflakeSourceBuilder {
    /// Create new builder with password authentication
    pub fn with_password(
        account: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            account: account.into(),
            username: username.into(),
            credentials: SnowflakeCredentials::Password(password.into()),
            warehouse: None,
            role: None,
            database: None,
        }
    }

    /// Create new builder with key-pair authentication
    pub fn with_key_pair(
        account: impl Into<String>,
        username: impl Into<String>,
        private_key_pem: impl Into<String>,
    ) -> Self {
        Self {
            account: account.into(),
            username: username.into(),
            credentials: SnowflakeCredentials::PrivateKey(private_key_pem.into()),
            warehouse: None,
            role: None,
            database: None,
        }
    }

    /// Set the warehouse to use
    pub fn with_warehouse(mut self, warehouse: impl Into<String>) -> Self {
        self.warehouse = Some(warehouse.into());
        self
    }

    /// Set the role to use
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Set the database whose columns are captured
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Build the source
    #[cfg(feature = "snowflake")]
    pub fn build(self) -> Result<SnowflakeSource, FetchError> {
        let api = match &self.credentials {
            SnowflakeCredentials::Password(password) => {
                SnowflakeApi::with_password_auth(
                    &self.account,
                    self.warehouse.as_deref(),
                    self.database.as_deref(),
                    None, // schema
                    &self.username,
                    self.role.as_deref(),
                    password,
                )
                .map_err(|e| FetchError::AuthenticationError(format!(
                    "Failed to authenticate with Snowflake: {}",
                    e
                )))?
            }
            SnowflakeCredentials::PrivateKey(private_key_pem) => {
                SnowflakeApi::with_certificate_auth(
                    &self.account,
                    self.warehouse.as_deref(),
                    self.database.as_deref(),
                    None, // schema
                    &self.username,
                    self.role.as_deref(),
                    private_key_pem,
                )
                .map_err(|e| FetchError::AuthenticationError(format!(
                    "Failed to authenticate with key-pair: {}",
                    e
                )))?
            }
        };

        Ok(SnowflakeSource {
            api,
            account: self.account,
            database: self.database,
        })
    }

    /// Build without snowflake feature
    #[cfg(not(feature = "snowflake"))]
    pub fn build(self) -> Result<SnowflakeSource, FetchError> {
        Err(FetchError::ConfigError(
            "Snowflake support not compiled. Rebuild with: cargo build --features snowflake".to_string()
        ))
    }
}

/// Snowflake metadata source
pub struct SnowflakeSource {
    #[cfg(feature = "snowflake")]
    api: SnowflakeApi,

    account: String,
    database: Option<String>,
}

impl SnowflakeSource {
    /// Builder pattern entry point
    pub fn builder() -> SnowflakeSourceBuilderInit {
        SnowflakeSourceBuilderInit
    }

    /// Build a source from the `[source]` table of the config
    ///
    /// Recognized settings: `account`, `username`, `password` or
    /// `private_key_path`, `warehouse`, `role`, `database`. A relative
    /// `private_key_path` is resolved against `root`.
    pub fn from_config(config: &SourceConfig, root: &Path) -> Result<Self, FetchError> {
        let required = |key: &str| {
            config
                .require(key)
                .map(str::to_string)
                .map_err(|e| FetchError::ConfigError(e.to_string()))
        };

        let account = required("account")?;
        let username = required("username")?;

        let mut builder = if let Some(password) = config.setting("password") {
            SnowflakeSourceBuilder::with_password(account, username, password)
        } else if let Some(key_path) = config.setting("private_key_path") {
            let key_path = root.join(key_path);
            let pem = std::fs::read_to_string(&key_path).map_err(|e| {
                FetchError::ConfigError(format!("Cannot read private key {}: {}", key_path.display(), e))
            })?;
            SnowflakeSourceBuilder::with_key_pair(account, username, pem)
        } else {
            return Err(FetchError::ConfigError(
                "Snowflake requires 'password' or 'private_key_path' in [source] settings".to_string(),
            ));
        };

        if let Some(warehouse) = config.setting("warehouse") {
            builder = builder.with_warehouse(warehouse);
        }
        if let Some(role) = config.setting("role") {
            builder = builder.with_role(role);
        }
        if let Some(database) = config.setting("database") {
            builder = builder.with_database(database);
        }

        builder.build()
    }

    /// Account identifier this source connects to
    pub fn account(&self) -> &str {
        &self.account
    }

    /// Database whose columns are captured (the session default when unset)
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// INFORMATION_SCHEMA query listing every user column of the database
    pub fn columns_query(database: Option<&str>) -> String {
        let view = match database {
            Some(db) => format!("{}.INFORMATION_SCHEMA.COLUMNS", db),
            None => "INFORMATION_SCHEMA.COLUMNS".to_string(),
        };

        format!(
            r#"
            SELECT
                TABLE_SCHEMA,
                TABLE_NAME,
                COLUMN_NAME,
                DATA_TYPE,
                ORDINAL_POSITION
            FROM {}
            WHERE TABLE_SCHEMA NOT IN ('INFORMATION_SCHEMA')
            ORDER BY TABLE_SCHEMA, TABLE_NAME, ORDINAL_POSITION
            "#,
            view
        )
    }
}

/// Empty struct for builder pattern initialization
pub struct SnowflakeSourceBuilderInit;

impl SnowflakeSourceBuilderInit {
    pub fn with_password(
        self,
        account: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> SnowflakeSourceBuilder {
        SnowflakeSourceBuilder::with_password(account, username, password)
    }

    pub fn with_key_pair(
        self,
        account: impl Into<String>,
        username: impl Into<String>,
        private_key_pem: impl Into<String>,
    ) -> SnowflakeSourceBuilder {
        SnowflakeSourceBuilder::with_key_pair(account, username, private_key_pem)
    }
}

/// Index of a named column in a result batch
#[cfg(feature = "snowflake")]
fn column_index(batch: &RecordBatch, name: &str) -> Result<usize, FetchError> {
    batch.schema()
        .index_of(name)
        .map_err(|_| FetchError::InvalidResponse(format!("Missing {} column", name)))
}

/// Named string column of a result batch
#[cfg(feature = "snowflake")]
fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, FetchError> {
    let idx = column_index(batch, name)?;
    batch.column(idx)
        .as_string_opt::<i32>()
        .ok_or_else(|| FetchError::InvalidResponse(format!("{} is not a string column", name)))
}

/// Read an ordinal position from whatever integer width Snowflake chose
#[cfg(feature = "snowflake")]
fn position_at(array: &dyn Array, row: usize) -> Option<u32> {
    if array.is_null(row) {
        return None;
    }

    let value: i64 = match array.data_type() {
        DataType::Int8 => array.as_primitive::<Int8Type>().value(row).into(),
        DataType::Int16 => array.as_primitive::<Int16Type>().value(row).into(),
        DataType::Int32 => array.as_primitive::<Int32Type>().value(row).into(),
        DataType::Int64 => array.as_primitive::<Int64Type>().value(row),
        DataType::Utf8 => array.as_string::<i32>().value(row).trim().parse().ok()?,
        _ => return None,
    };

    u32::try_from(value).ok()
}

#[async_trait::async_trait]
impl MetadataSource for SnowflakeSource {
    fn name(&self) -> &'static str {
        "Snowflake"
    }

    #[cfg(feature = "snowflake")]
    async fn list_columns(&self) -> Result<Vec<SnapshotColumn>, FetchError> {
        use snowflake_api::QueryResult;

        let query = Self::columns_query(self.database.as_deref());

        let result = self.api.exec(&query)
            .await
            .map_err(|e| {
                let err_str = e.to_string();
                if err_str.contains("Insufficient privileges") || err_str.contains("Permission") {
                    FetchError::PermissionDenied(format!(
                        "Cannot read INFORMATION_SCHEMA.COLUMNS: {}",
                        err_str
                    ))
                } else {
                    FetchError::QueryError(err_str)
                }
            })?;

        let mut columns = Vec::new();

        match result {
            QueryResult::Arrow(batches) => {
                for batch in batches {
                    let schema_array = string_column(&batch, "TABLE_SCHEMA")?;
                    let table_array = string_column(&batch, "TABLE_NAME")?;
                    let column_array = string_column(&batch, "COLUMN_NAME")?;
                    let type_array = string_column(&batch, "DATA_TYPE")?;
                    let position_array = batch.column(column_index(&batch, "ORDINAL_POSITION")?);

                    for row in 0..batch.num_rows() {
                        let position = position_at(position_array.as_ref(), row).ok_or_else(|| {
                            FetchError::InvalidResponse(format!(
                                "Unreadable ORDINAL_POSITION in row {}",
                                row
                            ))
                        })?;

                        columns.push(SnapshotColumn::new(
                            schema_array.value(row),
                            table_array.value(row),
                            column_array.value(row),
                            type_array.value(row),
                            position,
                        ));
                    }
                }
            }
            QueryResult::Json(_) => {
                return Err(FetchError::InvalidResponse(
                    "Unexpected JSON result format".to_string()
                ));
            }
            QueryResult::Empty => {}
        }

        tracing::debug!(account = %self.account, columns = columns.len(), "listed Snowflake columns");

        Ok(columns)
    }

    #[cfg(not(feature = "snowflake"))]
    async fn list_columns(&self) -> Result<Vec<SnapshotColumn>, FetchError> {
        Err(FetchError::ConfigError(
            "Snowflake support not compiled. Rebuild with: cargo build --features snowflake".to_string()
        ))
    }

    #[cfg(feature = "snowflake")]
    async fn test_connection(&self) -> Result<(), FetchError> {
        self.api.exec("SELECT 1")
            .await
            .map_err(|e| FetchError::NetworkError(format!("Connection test failed: {}", e)))?;
        Ok(())
    }

    #[cfg(not(feature = "snowflake"))]
    async fn test_connection(&self) -> Result<(), FetchError> {
        Err(FetchError::ConfigError(
            "Snowflake support not compiled. Rebuild with: cargo build --features snowflake".to_string()
        ))
    }
}
