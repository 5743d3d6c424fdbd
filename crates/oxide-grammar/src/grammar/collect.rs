//! Derives the binding buckets of a query state.
//!
//! Every rule here mirrors a rendering rule of the grammar: a value is
//! collected exactly when its clause renders a placeholder for it, in the
//! order the placeholders appear.

use super::Grammar;
use crate::query::{
    BindingBag, BindingKind, ColumnExpr, HavingNode, InValues, Join, Order, QueryState, TableRef,
    WhereNode, WhereTree,
};
use crate::value::Value;

pub(super) fn bindings<G: Grammar + ?Sized>(grammar: &G, query: &QueryState) -> BindingBag {
    let mut bag = BindingBag::new();

    if let Some(aggregate) = &query.aggregate {
        bag.extend(BindingKind::Select, column_bindings(&aggregate.columns));
    }
    let columns_rendered =
        query.aggregate.is_none() || !query.unions.is_empty() || !query.havings.is_empty();
    if columns_rendered {
        if let Some(columns) = &query.columns {
            bag.extend(BindingKind::Select, column_bindings(columns));
        }
    }

    if let Some(table) = &query.from {
        bag.extend(BindingKind::From, table_bindings(grammar, table));
    }
    for join in &query.joins {
        bag.extend(BindingKind::Join, join_bindings(grammar, join));
    }
    bag.extend(BindingKind::Where, where_tree_bindings(grammar, &query.wheres));
    bag.extend(BindingKind::GroupBy, column_bindings(&query.groups));
    for clause in &query.havings {
        bag.extend(BindingKind::Having, having_bindings(&clause.node));
    }
    bag.extend(BindingKind::Order, order_bindings(&query.orders));
    for union in &query.unions {
        let branch = grammar.collect_bindings(&union.query);
        bag.extend(BindingKind::Union, grammar.prepare_bindings_for_select(&branch));
    }
    bag.extend(BindingKind::UnionOrder, order_bindings(&query.union_orders));
    bag
}

fn column_bindings(columns: &[ColumnExpr]) -> Vec<Value> {
    columns
        .iter()
        .flat_map(|column| column.bindings().iter().cloned())
        .collect()
}

fn select_bindings<G: Grammar + ?Sized>(grammar: &G, query: &QueryState) -> Vec<Value> {
    grammar.prepare_bindings_for_select(&grammar.collect_bindings(query))
}

fn table_bindings<G: Grammar + ?Sized>(grammar: &G, table: &TableRef) -> Vec<Value> {
    match table {
        TableRef::Name(_) => Vec::new(),
        TableRef::Raw { bindings, .. } => bindings.clone(),
        TableRef::Sub { query, .. } => select_bindings(grammar, query),
    }
}

fn join_bindings<G: Grammar + ?Sized>(grammar: &G, join: &Join) -> Vec<Value> {
    let mut values = table_bindings(grammar, &join.table);
    for nested in &join.joins {
        values.extend(join_bindings(grammar, nested));
    }
    values.extend(where_tree_bindings(grammar, &join.on));
    values
}

fn where_tree_bindings<G: Grammar + ?Sized>(grammar: &G, wheres: &WhereTree) -> Vec<Value> {
    wheres
        .iter()
        .flat_map(|clause| where_bindings(grammar, &clause.node))
        .collect()
}

fn where_bindings<G: Grammar + ?Sized>(grammar: &G, node: &WhereNode) -> Vec<Value> {
    match node {
        WhereNode::Raw { bindings, .. } => bindings.clone(),
        WhereNode::Basic { column, value, .. }
        | WhereNode::Bitwise { column, value, .. }
        | WhereNode::Date { column, value, .. } => with_column(column, [value.clone()]),
        WhereNode::Like {
            column,
            value,
            case_sensitive,
            ..
        } => with_column(
            column,
            [grammar.prepare_where_like_binding(value, *case_sensitive)],
        ),
        WhereNode::Between {
            column, min, max, ..
        } => with_column(column, [min.clone(), max.clone()]),
        WhereNode::In {
            column,
            values: InValues::List(values),
            ..
        } => {
            if values.is_empty() {
                return Vec::new();
            }
            with_column(column, values.iter().cloned())
        }
        WhereNode::In {
            column,
            values: InValues::Query(select),
            ..
        } => with_column(column, select_bindings(grammar, select)),
        WhereNode::Sub { column, query, .. } => with_column(column, select_bindings(grammar, query)),
        WhereNode::Exists { query, .. } => select_bindings(grammar, query),
        WhereNode::Nested { wheres } => where_tree_bindings(grammar, wheres),
        WhereNode::RowValues {
            columns, values, ..
        } => {
            let mut bound = column_bindings(columns);
            bound.extend(values.iter().cloned());
            bound
        }
        WhereNode::JsonContains { value, .. } => {
            if value.is_raw() {
                return Vec::new();
            }
            vec![grammar.prepare_binding_for_json_contains(value)]
        }
        WhereNode::JsonLength { value, .. } => vec![value.clone()],
        WhereNode::FullText { columns, value, .. } => with_column_list(columns, [value.clone()]),
        WhereNode::BetweenColumns {
            column, min, max, ..
        } => column_bindings(&[column.clone(), min.clone(), max.clone()]),
        WhereNode::Column { first, second, .. } => {
            column_bindings(&[first.clone(), second.clone()])
        }
        WhereNode::InRaw { column, values, .. } => {
            if values.is_empty() {
                return Vec::new();
            }
            column.bindings().to_vec()
        }
        WhereNode::Null { column } | WhereNode::NotNull { column } => column.bindings().to_vec(),
        WhereNode::JsonBoolean { .. } | WhereNode::JsonContainsKey { .. } => Vec::new(),
    }
}

fn having_bindings(node: &HavingNode) -> Vec<Value> {
    match node {
        HavingNode::Raw { bindings, .. } => bindings.clone(),
        HavingNode::Basic { column, value, .. } | HavingNode::Bit { column, value, .. } => {
            with_column(column, [value.clone()])
        }
        HavingNode::Between {
            column, min, max, ..
        } => with_column(column, [min.clone(), max.clone()]),
        HavingNode::Null { column } | HavingNode::NotNull { column } => column.bindings().to_vec(),
        HavingNode::Expression { .. } => Vec::new(),
        HavingNode::Nested { havings } => havings
            .iter()
            .flat_map(|clause| having_bindings(&clause.node))
            .collect(),
    }
}

fn order_bindings(orders: &[Order]) -> Vec<Value> {
    orders
        .iter()
        .flat_map(|order| match order {
            Order::Column { column, .. } => column.bindings().to_vec(),
            Order::Raw { bindings, .. } => bindings.clone(),
            Order::Random { .. } => Vec::new(),
        })
        .collect()
}

/// Bindings of a raw column expression followed by the clause's own values.
fn with_column<I>(column: &ColumnExpr, values: I) -> Vec<Value>
where
    I: IntoIterator<Item = Value>,
{
    let mut bound = column.bindings().to_vec();
    bound.extend(values);
    bound
}

fn with_column_list<I>(columns: &[ColumnExpr], values: I) -> Vec<Value>
where
    I: IntoIterator<Item = Value>,
{
    let mut bound = column_bindings(columns);
    bound.extend(values);
    bound
}
