#![allow(dead_code)]

use oxide_grammar::{
    Boolean, CompiledQuery, DialectKind, Grammar, GrammarConfig, Join, Order, QueryState,
    Statement, WhereNode, WhereTree,
};

pub fn grammar(kind: DialectKind) -> Box<dyn Grammar> {
    kind.grammar(GrammarConfig::default())
}

pub fn compile(kind: DialectKind, query: &QueryState, statement: &Statement) -> CompiledQuery {
    let mut compiled = grammar(kind)
        .compile(query, statement)
        .unwrap_or_else(|e| panic!("Failed to compile {statement:?} for {kind}: {e}"));
    assert_eq!(compiled.len(), 1, "expected a single statement for {kind}");
    compiled.remove(0)
}

pub fn select(kind: DialectKind, query: &QueryState) -> CompiledQuery {
    compile(kind, query, &Statement::Select)
}

/// Counts `?` placeholders, skipping quoted literals and the `??` operator
/// escape.
pub fn placeholder_count(sql: &str) -> usize {
    let mut count = 0;
    let mut in_literal = false;
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' => in_literal = !in_literal,
            '?' if !in_literal => {
                if chars.peek() == Some(&'?') {
                    chars.next();
                } else {
                    count += 1;
                }
            }
            _ => {}
        }
    }
    count
}

/// Asserts that every placeholder has exactly one binding.
pub fn assert_balanced(kind: DialectKind, compiled: &CompiledQuery) {
    assert_eq!(
        placeholder_count(&compiled.sql),
        compiled.bindings.len(),
        "placeholders and bindings differ for {kind}:\n  {}\n  {:?}",
        compiled.sql,
        compiled.bindings
    );
}

/// A select touching most clauses every dialect supports.
pub fn rich_query() -> QueryState {
    let recent = QueryState::table("posts")
        .select(vec!["user_id"])
        .and_where(WhereNode::basic("created_at", ">", "2024-01-01"));
    QueryState::table("users as u")
        .select(vec!["u.id", "u.name"])
        .join(
            Join::left("profiles as p")
                .on("p.user_id", "=", "u.id")
                .on_where(WhereNode::eq("p.visible", true)),
        )
        .and_where(WhereNode::eq("u.active", true))
        .and_where(WhereNode::nested(
            WhereTree::new()
                .and(WhereNode::like("u.name", "a%"))
                .or(WhereNode::between("u.age", 18_i64, 30_i64)),
        ))
        .and_where(WhereNode::in_list("u.role", vec!["admin", "editor"]))
        .and_where(WhereNode::in_query("u.id", recent))
        .or_where(WhereNode::null("u.deleted_at"))
        .order_by(Order::asc("u.name"))
}

/// `a = 1 and (b = 2 or c = 3)`
pub fn nested_query() -> QueryState {
    let mut inner = WhereTree::new();
    inner.push(Boolean::And, WhereNode::eq("b", 2_i64));
    inner.push(Boolean::Or, WhereNode::eq("c", 3_i64));
    QueryState::table("t")
        .and_where(WhereNode::eq("a", 1_i64))
        .and_where(WhereNode::nested(inner))
}
