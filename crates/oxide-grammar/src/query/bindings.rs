//! Binding buckets.
//!
//! Values are grouped by the clause that produced them. Each statement kind
//! flattens the buckets in its own fixed order, which is what keeps the
//! binding list aligned with the placeholders of the rendered SQL.

use crate::value::Value;

/// Named binding bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// Raw select columns and aggregate expressions.
    Select,
    /// Derived tables and raw FROM fragments.
    From,
    /// Join targets and ON clauses.
    Join,
    /// WHERE clauses.
    Where,
    /// Raw GROUP BY expressions.
    GroupBy,
    /// HAVING clauses.
    Having,
    /// Raw ORDER BY expressions.
    Order,
    /// Union branches.
    Union,
    /// Raw ORDER BY expressions applied to the union result.
    UnionOrder,
}

impl BindingKind {
    /// All buckets, in select-statement order.
    pub const ALL: [Self; 9] = [
        Self::Select,
        Self::From,
        Self::Join,
        Self::Where,
        Self::GroupBy,
        Self::Having,
        Self::Order,
        Self::Union,
        Self::UnionOrder,
    ];

    /// Every bucket a SELECT renders after its select list.
    pub const QUERY: [Self; 8] = [
        Self::From,
        Self::Join,
        Self::Where,
        Self::GroupBy,
        Self::Having,
        Self::Order,
        Self::Union,
        Self::UnionOrder,
    ];
}

/// Bindings of one query, grouped by bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingBag {
    /// Select bucket.
    pub select: Vec<Value>,
    /// From bucket.
    pub from: Vec<Value>,
    /// Join bucket.
    pub join: Vec<Value>,
    /// Where bucket.
    pub wheres: Vec<Value>,
    /// Group-by bucket.
    pub group_by: Vec<Value>,
    /// Having bucket.
    pub having: Vec<Value>,
    /// Order bucket.
    pub order: Vec<Value>,
    /// Union bucket.
    pub union: Vec<Value>,
    /// Union order bucket.
    pub union_order: Vec<Value>,
}

impl BindingBag {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the values of one bucket.
    #[must_use]
    pub fn get(&self, kind: BindingKind) -> &[Value] {
        match kind {
            BindingKind::Select => &self.select,
            BindingKind::From => &self.from,
            BindingKind::Join => &self.join,
            BindingKind::Where => &self.wheres,
            BindingKind::GroupBy => &self.group_by,
            BindingKind::Having => &self.having,
            BindingKind::Order => &self.order,
            BindingKind::Union => &self.union,
            BindingKind::UnionOrder => &self.union_order,
        }
    }

    fn get_mut(&mut self, kind: BindingKind) -> &mut Vec<Value> {
        match kind {
            BindingKind::Select => &mut self.select,
            BindingKind::From => &mut self.from,
            BindingKind::Join => &mut self.join,
            BindingKind::Where => &mut self.wheres,
            BindingKind::GroupBy => &mut self.group_by,
            BindingKind::Having => &mut self.having,
            BindingKind::Order => &mut self.order,
            BindingKind::Union => &mut self.union,
            BindingKind::UnionOrder => &mut self.union_order,
        }
    }

    /// Appends a value to a bucket. Raw expressions are never bound.
    pub fn push(&mut self, kind: BindingKind, value: Value) {
        if !value.is_raw() {
            self.get_mut(kind).push(value);
        }
    }

    /// Appends values to a bucket, skipping raw expressions.
    pub fn extend<I>(&mut self, kind: BindingKind, values: I)
    where
        I: IntoIterator<Item = Value>,
    {
        let bucket = self.get_mut(kind);
        bucket.extend(values.into_iter().filter(|value| !value.is_raw()));
    }

    /// Returns true when no bucket holds a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        BindingKind::ALL.iter().all(|kind| self.get(*kind).is_empty())
    }

    /// Flattens every bucket in select order.
    #[must_use]
    pub fn flatten(&self) -> Vec<Value> {
        self.flatten_except(&[])
    }

    /// Flattens every bucket in select order, leaving out `excluded`.
    #[must_use]
    pub fn flatten_except(&self, excluded: &[BindingKind]) -> Vec<Value> {
        BindingKind::ALL
            .iter()
            .filter(|kind| !excluded.contains(kind))
            .flat_map(|kind| self.get(*kind).iter().cloned())
            .collect()
    }

    /// Flattens the listed buckets, in the order given.
    #[must_use]
    pub fn flatten_only(&self, kinds: &[BindingKind]) -> Vec<Value> {
        kinds
            .iter()
            .flat_map(|kind| self.get(*kind).iter().cloned())
            .collect()
    }

    /// Flattens the bag for an UPDATE statement: the `before` buckets, the
    /// SET values, then the `after` buckets.
    ///
    /// Each dialect lists the buckets its UPDATE renders around the SET
    /// clause; buckets in neither list are left out.
    #[must_use]
    pub fn for_update(
        &self,
        before: &[BindingKind],
        values: Vec<Value>,
        after: &[BindingKind],
    ) -> Vec<Value> {
        let mut bindings = self.flatten_only(before);
        bindings.extend(values.into_iter().filter(|value| !value.is_raw()));
        bindings.extend(self.flatten_only(after));
        bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BindingBag {
        let mut bag = BindingBag::new();
        bag.push(BindingKind::Where, Value::Int(3));
        bag.push(BindingKind::Select, Value::Int(1));
        bag.push(BindingKind::Join, Value::Int(2));
        bag.push(BindingKind::Order, Value::Int(4));
        bag
    }

    #[test]
    fn test_flatten_uses_fixed_bucket_order() {
        assert_eq!(
            sample().flatten(),
            vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]
        );
    }

    #[test]
    fn test_raw_values_are_skipped() {
        let mut bag = BindingBag::new();
        bag.push(BindingKind::Where, Value::raw("now()"));
        bag.extend(BindingKind::Where, vec![Value::raw("1"), Value::Int(5)]);
        assert_eq!(bag.wheres, vec![Value::Int(5)]);
    }

    #[test]
    fn test_for_update_joins_first() {
        let bindings = sample().for_update(
            &[BindingKind::From, BindingKind::Join],
            vec![Value::Int(9)],
            &[BindingKind::Where],
        );
        assert_eq!(bindings, vec![Value::Int(2), Value::Int(9), Value::Int(3)]);
    }

    #[test]
    fn test_for_update_leaves_out_unlisted_buckets() {
        let bindings = sample().for_update(
            &[],
            vec![Value::Int(9), Value::raw("now()")],
            &BindingKind::QUERY,
        );
        assert_eq!(
            bindings,
            vec![Value::Int(9), Value::Int(2), Value::Int(3), Value::Int(4)]
        );
    }

    #[test]
    fn test_flatten_only_follows_given_order() {
        assert_eq!(
            sample().flatten_only(&[BindingKind::Order, BindingKind::Select]),
            vec![Value::Int(4), Value::Int(1)]
        );
    }
}
