//! Generic SQL grammar.

use super::Grammar;
use crate::config::GrammarConfig;

/// The base grammar with ANSI quoting and no dialect extensions.
#[derive(Debug, Default, Clone)]
pub struct GenericGrammar {
    config: GrammarConfig,
}

impl GenericGrammar {
    /// Creates a generic grammar with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generic grammar with the given configuration.
    #[must_use]
    pub const fn with_config(config: GrammarConfig) -> Self {
        Self { config }
    }
}

impl Grammar for GenericGrammar {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn config(&self) -> &GrammarConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GrammarError;
    use crate::query::{
        Aggregate, Boolean, ColumnExpr, DatePart, HavingNode, InsertValues, Join, Lock, Order,
        QueryState, Record, TableRef, WhereNode, WhereTree,
    };
    use crate::value::Value;

    fn sql(query: &QueryState) -> String {
        GenericGrammar::new().compile_select(query).unwrap()
    }

    #[test]
    fn test_generic_grammar() {
        let grammar = GenericGrammar::new();
        assert_eq!(grammar.name(), "generic");
        assert_eq!(grammar.wrap_value("id"), "\"id\"");
        assert_eq!(grammar.wrap_value("*"), "*");
        assert_eq!(grammar.parameter(&Value::Int(1)), "?");
        assert!(grammar.supports_savepoints());
    }

    #[test]
    fn test_select_star() {
        assert_eq!(sql(&QueryState::table("users")), "select * from \"users\"");
    }

    #[test]
    fn test_wrapping() {
        let grammar = GenericGrammar::new();
        assert_eq!(grammar.wrap("users.id").unwrap(), "\"users\".\"id\"");
        assert_eq!(
            grammar.wrap("users.id as user_id").unwrap(),
            "\"users\".\"id\" as \"user_id\""
        );
        assert_eq!(grammar.wrap("users.*").unwrap(), "\"users\".*");
        assert_eq!(grammar.wrap("we\"ird").unwrap(), "\"we\"\"ird\"");
        assert_eq!(grammar.wrap_table("public.users"), "\"public\".\"users\"");
    }

    #[test]
    fn test_table_prefix() {
        let grammar = GenericGrammar::with_config(GrammarConfig::new().with_table_prefix("app_"));
        assert_eq!(grammar.wrap_table("users"), "\"app_users\"");
        assert_eq!(grammar.wrap_table("users as u"), "\"app_users\" as \"app_u\"");
        assert_eq!(grammar.wrap("users.id").unwrap(), "\"app_users\".\"id\"");
        assert_eq!(grammar.wrap_table("public.users"), "\"public\".\"app_users\"");
    }

    #[test]
    fn test_basic_where_strips_leading_connective() {
        let query = QueryState::table("users").and_where(WhereNode::eq("a", 1_i64));
        assert_eq!(sql(&query), "select * from \"users\" where \"a\" = ?");
        let query = QueryState::table("users").or_where(WhereNode::eq("a", 1_i64));
        assert_eq!(sql(&query), "select * from \"users\" where \"a\" = ?");
    }

    #[test]
    fn test_operator_question_mark_is_escaped() {
        let query = QueryState::table("t").and_where(WhereNode::basic("doc", "?|", "a"));
        assert_eq!(sql(&query), "select * from \"t\" where \"doc\" ??| ?");
    }

    #[test]
    fn test_negated_connectives() {
        let query = QueryState::table("users")
            .and_where(WhereNode::eq("a", 1_i64))
            .and_where(WhereNode::null("b"));
        let mut query = query;
        query.wheres.push(Boolean::OrNot, WhereNode::eq("c", 2_i64));
        assert_eq!(
            sql(&query),
            "select * from \"users\" where \"a\" = ? and \"b\" is null or not \"c\" = ?"
        );
    }

    #[test]
    fn test_empty_in_lists() {
        let query = QueryState::table("users").and_where(WhereNode::in_list::<i64>("id", vec![]));
        assert_eq!(sql(&query), "select * from \"users\" where 0 = 1");
        let query =
            QueryState::table("users").and_where(WhereNode::not_in_list::<i64>("id", vec![]));
        assert_eq!(sql(&query), "select * from \"users\" where 1 = 1");
    }

    #[test]
    fn test_in_raw_and_between() {
        let query = QueryState::table("users")
            .and_where(WhereNode::InRaw {
                column: ColumnExpr::from("id"),
                values: vec![1, 2, 3],
                not: false,
            })
            .and_where(WhereNode::between("age", 18_i64, 30_i64));
        assert_eq!(
            sql(&query),
            "select * from \"users\" where \"id\" in (1, 2, 3) and \"age\" between ? and ?"
        );
    }

    #[test]
    fn test_date_where() {
        let query = QueryState::table("posts").and_where(WhereNode::date(
            DatePart::Year,
            "created_at",
            "=",
            2024_i64,
        ));
        assert_eq!(
            sql(&query),
            "select * from \"posts\" where year(\"created_at\") = ?"
        );
    }

    #[test]
    fn test_join_nested_where() {
        let query = QueryState::table("users")
            .join(
                Join::inner("contacts")
                    .on("users.id", "=", "contacts.user_id")
                    .on_where(WhereNode::nested(
                        WhereTree::new()
                            .and(WhereNode::eq("contacts.kind", "a"))
                            .or(WhereNode::eq("contacts.kind", "b")),
                    )),
            )
            .and_where(WhereNode::nested(
                WhereTree::new().and(WhereNode::eq("name", "x")),
            ));
        assert_eq!(
            sql(&query),
            "select * from \"users\" inner join \"contacts\" on \"users\".\"id\" = \"contacts\".\"user_id\" \
             and (\"contacts\".\"kind\" = ? or \"contacts\".\"kind\" = ?) where (\"name\" = ?)"
        );
    }

    #[test]
    fn test_empty_nested_group_is_malformed() {
        let query = QueryState::table("users").and_where(WhereNode::nested(WhereTree::new()));
        assert!(matches!(
            GenericGrammar::new().compile_select(&query),
            Err(GrammarError::MalformedState(_))
        ));
    }

    #[test]
    fn test_groups_havings_orders_limit() {
        let query = QueryState::table("orders")
            .select(vec![ColumnExpr::from("customer_id"), ColumnExpr::raw("sum(total) as total")])
            .group_by(vec!["customer_id"])
            .having(HavingNode::basic("total", ">", 100_i64))
            .having(HavingNode::Bit {
                column: ColumnExpr::from("flags"),
                operator: String::from("&"),
                value: Value::Int(4),
            })
            .order_by(Order::desc("total"))
            .limit(10)
            .offset(5);
        assert_eq!(
            sql(&query),
            "select \"customer_id\", sum(total) as total from \"orders\" group by \"customer_id\" \
             having \"total\" > ? and (\"flags\" & ?) != 0 order by \"total\" desc limit 10 offset 5"
        );
    }

    #[test]
    fn test_limit_zero_renders() {
        assert_eq!(
            sql(&QueryState::table("users").limit(0)),
            "select * from \"users\" limit 0"
        );
    }

    #[test]
    fn test_derived_table() {
        let inner = QueryState::table("posts").and_where(WhereNode::eq("published", true));
        let query = QueryState::table(TableRef::sub(inner, "p"));
        assert_eq!(
            sql(&query),
            "select * from (select * from \"posts\" where \"published\" = ?) as \"p\""
        );
    }

    #[test]
    fn test_aggregate_skips_columns() {
        let query = QueryState::table("users")
            .select(vec!["id"])
            .aggregate(Aggregate::count());
        assert_eq!(sql(&query), "select count(*) as aggregate from \"users\"");
    }

    #[test]
    fn test_union_aggregate() {
        let query = QueryState::table("a")
            .union(QueryState::table("b"), false)
            .aggregate(Aggregate::count());
        assert_eq!(
            sql(&query),
            "select count(*) as aggregate from ((select * from \"a\") union (select * from \"b\")) as \"temp_table\""
        );
    }

    #[test]
    fn test_union_order_and_limit() {
        let mut query = QueryState::table("a")
            .union(QueryState::table("b"), true)
            .union_order_by(Order::asc("id"));
        query.union_limit = Some(5);
        assert_eq!(
            sql(&query),
            "(select * from \"a\") union all (select * from \"b\") order by \"id\" asc limit 5"
        );
    }

    #[test]
    fn test_raw_lock_only() {
        let grammar = GenericGrammar::new();
        let query = QueryState::table("users").lock(Lock::Exclusive);
        assert_eq!(grammar.compile_select(&query).unwrap(), "select * from \"users\"");
        let query = QueryState::table("users").lock(Lock::Raw(String::from("for update nowait")));
        assert_eq!(
            grammar.compile_select(&query).unwrap(),
            "select * from \"users\" for update nowait"
        );
    }

    #[test]
    fn test_unsupported_features() {
        let grammar = GenericGrammar::new();
        let query = QueryState::table("users").and_where(WhereNode::JsonContains {
            column: String::from("options->tags"),
            value: Value::Text(String::from("a")),
            not: false,
        });
        assert_eq!(
            grammar.compile_select(&query),
            Err(GrammarError::unsupported("generic", "JSON contains"))
        );
        assert!(grammar.wrap("options->lang").is_err());
        let values = InsertValues::Single(Record::new().set("a", 1_i64));
        assert!(grammar
            .compile_insert_or_ignore(&QueryState::table("t"), &values)
            .is_err());
    }

    #[test]
    fn test_insert_update_delete() {
        let grammar = GenericGrammar::new();
        let table = QueryState::table("users");
        let values = InsertValues::Single(Record::new().set("email", "a@x").set("votes", 0_i64));
        assert_eq!(
            grammar.compile_insert(&table, &values).unwrap(),
            "insert into \"users\" (\"email\", \"votes\") values (?, ?)"
        );
        assert_eq!(
            grammar
                .compile_insert(&table, &InsertValues::Batch(Vec::new()))
                .unwrap(),
            "insert into \"users\" default values"
        );
        let query = QueryState::table("users").and_where(WhereNode::eq("id", 1_i64));
        assert_eq!(
            grammar
                .compile_update(&query, &Record::new().set("name", "x"))
                .unwrap(),
            "update \"users\" set \"name\" = ? where \"id\" = ?"
        );
        assert_eq!(
            grammar.compile_delete(&query).unwrap(),
            "delete from \"users\" where \"id\" = ?"
        );
        assert_eq!(
            grammar.compile_truncate(&table).unwrap(),
            vec![(String::from("truncate table \"users\""), Vec::new())]
        );
    }

    #[test]
    fn test_delete_with_joins_uses_alias() {
        let query = QueryState::table("users as u")
            .join(Join::inner("posts as p").on("u.id", "=", "p.user_id"))
            .and_where(WhereNode::eq("p.spam", true));
        assert_eq!(
            GenericGrammar::new().compile_delete(&query).unwrap(),
            "delete \"u\" from \"users\" as \"u\" inner join \"posts\" as \"p\" on \"u\".\"id\" = \"p\".\"user_id\" where \"p\".\"spam\" = ?"
        );
    }

    #[test]
    fn test_write_bindings_skip_unrendered_orders() {
        let grammar = GenericGrammar::new();
        let query = QueryState::table("users")
            .join(Join::inner("teams").on("teams.id", "=", "users.team_id"))
            .and_where(WhereNode::eq("teams.name", "core"))
            .order_by(Order::Raw {
                sql: String::from("field(id, ?)"),
                bindings: vec![Value::Int(7)],
            });

        let delete = grammar.to_delete(&query).unwrap();
        assert!(!delete.sql.contains("field"));
        assert_eq!(delete.bindings, vec![Value::Text(String::from("core"))]);

        let update = grammar
            .to_update(&query, &Record::new().set("active", false))
            .unwrap();
        assert_eq!(
            update.bindings,
            vec![Value::Bool(false), Value::Text(String::from("core"))]
        );
    }

    #[test]
    fn test_write_rejects_clauses_it_cannot_render() {
        let grammar = GenericGrammar::new();
        let values = Record::new().set("active", false);
        let limited = QueryState::table("users").limit(5);
        assert!(matches!(
            grammar.compile_update(&limited, &values),
            Err(GrammarError::InvalidOption(_))
        ));
        assert!(matches!(
            grammar.compile_delete(&limited),
            Err(GrammarError::InvalidOption(_))
        ));
        let grouped = QueryState::table("users").group_by(vec!["team_id"]);
        assert!(matches!(
            grammar.compile_delete(&grouped),
            Err(GrammarError::InvalidOption(_))
        ));
        let unioned = QueryState::table("users").union(QueryState::table("admins"), false);
        assert!(matches!(
            grammar.compile_update(&unioned, &values),
            Err(GrammarError::InvalidOption(_))
        ));
    }

    #[test]
    fn test_exists_and_savepoints() {
        let grammar = GenericGrammar::new();
        assert_eq!(
            grammar.compile_exists(&QueryState::table("users")).unwrap(),
            "select exists(select * from \"users\") as \"exists\""
        );
        assert_eq!(grammar.compile_savepoint("s1").unwrap(), "SAVEPOINT s1");
        assert_eq!(
            grammar.compile_savepoint_rollback("s1").unwrap(),
            "ROLLBACK TO SAVEPOINT s1"
        );
        assert_eq!(grammar.compile_random(None), "RANDOM()");
    }

    #[test]
    fn test_update_without_columns_is_malformed() {
        let grammar = GenericGrammar::new();
        assert!(matches!(
            grammar.compile_update(&QueryState::table("users"), &Record::new()),
            Err(GrammarError::MalformedState(_))
        ));
    }

    #[test]
    fn test_write_without_table_is_malformed() {
        let grammar = GenericGrammar::new();
        assert!(matches!(
            grammar.compile_delete(&QueryState::new()),
            Err(GrammarError::MalformedState(_))
        ));
    }
}
