//! # oxide-grammar
//!
//! Dialect-aware SQL grammar for query builders.
//!
//! A query builder records what a statement should do in a [`QueryState`];
//! a [`Grammar`] turns that state into SQL text for one dialect, together
//! with the ordered list of values bound to its `?` placeholders.
//!
//! This crate provides:
//! - A base grammar with the SELECT/INSERT/UPDATE/DELETE algorithms
//! - MySQL, PostgreSQL, SQLite and SQL Server dialects overriding it
//! - Binding collection that mirrors the rendering, bucket by bucket
//!
//! ## Compiling a SELECT
//!
//! ```rust
//! use oxide_grammar::{Grammar, Order, PostgresGrammar, QueryState, Value, WhereNode};
//!
//! let query = QueryState::table("users")
//!     .select(vec!["id", "name"])
//!     .and_where(WhereNode::eq("active", true))
//!     .order_by(Order::desc("id"))
//!     .limit(10);
//!
//! let compiled = PostgresGrammar::new().to_select(&query)?;
//! assert_eq!(
//!     compiled.sql,
//!     r#"select "id", "name" from "users" where "active" = ? order by "id" desc limit 10"#
//! );
//! assert_eq!(compiled.bindings, vec![Value::Bool(true)]);
//! # Ok::<(), oxide_grammar::GrammarError>(())
//! ```
//!
//! ## Picking a dialect at runtime
//!
//! ```rust
//! use oxide_grammar::{DialectKind, GrammarConfig, QueryState, Statement, WhereNode};
//!
//! let grammar = "sqlsrv".parse::<DialectKind>()?.grammar(GrammarConfig::default());
//! let query = QueryState::table("users")
//!     .and_where(WhereNode::in_list("id", Vec::<i64>::new()))
//!     .limit(5);
//!
//! let compiled = grammar.compile(&query, &Statement::Select)?;
//! assert_eq!(compiled[0].sql, "select top 5 * from [users] where 0 = 1");
//! assert!(compiled[0].bindings.is_empty());
//! # Ok::<(), oxide_grammar::GrammarError>(())
//! ```

pub mod config;
pub mod error;
pub mod grammar;
pub mod query;
pub mod value;

pub use config::GrammarConfig;
pub use error::{GrammarError, Result};
pub use grammar::{
    CompiledQuery, DialectKind, GenericGrammar, Grammar, MySqlGrammar, PostgresGrammar,
    SelectComponent, SqlServerGrammar, SqliteGrammar, Statement,
};
pub use query::{
    Aggregate, BindingBag, BindingKind, Boolean, ColumnExpr, DatePart, Direction, Distinct,
    FullTextOptions, HavingNode, HavingTree, InValues, InsertValues, Join, JoinType, Lock, Order,
    QueryState, Record, TableRef, Union, UpsertColumn, WhereNode, WhereTree,
};
pub use value::{ToSqlValue, Value};
