//! Backend selection.
//!
//! The backend is an explicit value carried by each statement (usually taken
//! from [`StatementConfig`](crate::config::StatementConfig)). It picks the
//! sea-query builder used to render SQL and the operator tokens the translator
//! hands out.

use sea_query::{MysqlQueryBuilder, PostgresQueryBuilder, SelectStatement, SqliteQueryBuilder, Values};
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Postgres,
    Mysql,
    Sqlite,
}

impl Backend {
    /// Render a select statement into parameterized SQL for this backend.
    pub fn render(self, statement: &SelectStatement) -> (String, Values) {
        match self {
            Backend::Postgres => statement.build(PostgresQueryBuilder),
            Backend::Mysql => statement.build(MysqlQueryBuilder),
            Backend::Sqlite => statement.build(SqliteQueryBuilder),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Backend::Postgres => "postgres",
            Backend::Mysql => "mysql",
            Backend::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
