use crate::{
    codec::Direction,
    model::{
        index::{IndexProperty, IndexSpec},
        schema::{PropertyModel, RecordSchema},
    },
    store::{MemoryBackend, Record},
    value::Value,
};
use keyplan_primitives::ScalarKind;
use std::{collections::BTreeMap, sync::Arc};

///
/// TestRecord
///
/// Map-backed record used across planner and executor tests.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct TestRecord {
    values: BTreeMap<String, Value>,
}

impl TestRecord {
    pub(crate) fn with(mut self, property: &str, value: impl Into<Value>) -> Self {
        self.values.insert(property.to_string(), value.into());
        self
    }

    pub(crate) fn id(&self) -> i64 {
        match self.values.get("id") {
            Some(Value::Int64(id)) => *id,
            other => panic!("test record without i64 id: {other:?}"),
        }
    }
}

impl Record for TestRecord {
    fn value(&self, property: &str) -> Option<Value> {
        self.values.get(property).cloned()
    }
}

/// Order record with the required properties set.
pub(crate) fn order(
    id: i64,
    customer: &str,
    status: &str,
    amount: i32,
    created: i64,
) -> TestRecord {
    TestRecord::default()
        .with("id", id)
        .with("customer", customer)
        .with("status", status)
        .with("amount", amount)
        .with("created", created)
}

/// Order schema shared by the planner and executor tests.
///
/// Indexes, in declaration order:
/// - `by_id_amount (+id, +amount)`
/// - `by_status (+status)`
/// - `by_created (+created)`
/// - `by_customer_created (+customer, -created)`
/// - `by_amount_desc (-amount)`
/// - `by_note (+note)`
pub(crate) fn orders_schema() -> RecordSchema {
    RecordSchema::new(
        "Order",
        vec![
            PropertyModel::new("id", ScalarKind::Int64),
            PropertyModel::new("customer", ScalarKind::Text),
            PropertyModel::new("status", ScalarKind::Text),
            PropertyModel::new("amount", ScalarKind::Int32),
            PropertyModel::new("created", ScalarKind::Int64),
            PropertyModel::new("note", ScalarKind::Text).nullable(),
            PropertyModel::new("customer.city", ScalarKind::Text).nullable(),
        ],
        vec!["id".to_string()],
        vec![
            IndexSpec::new(
                "by_id_amount",
                vec![IndexProperty::asc("id"), IndexProperty::asc("amount")],
            ),
            IndexSpec::new("by_status", vec![IndexProperty::asc("status")]),
            IndexSpec::new("by_created", vec![IndexProperty::asc("created")]),
            IndexSpec::new(
                "by_customer_created",
                vec![
                    IndexProperty::asc("customer"),
                    IndexProperty::new("created", Direction::Desc),
                ],
            ),
            IndexSpec::new("by_amount_desc", vec![IndexProperty::desc("amount")]),
            IndexSpec::new("by_note", vec![IndexProperty::asc("note")]),
        ],
    )
}

/// Sample orders covering repeated statuses, customers, and amounts.
pub(crate) fn sample_orders() -> Vec<TestRecord> {
    vec![
        order(1, "ann", "open", 40, 100),
        order(2, "bob", "open", 15, 101).with("note", "rush"),
        order(3, "ann", "closed", 15, 102),
        order(4, "cid", "open", 70, 103),
        order(5, "bob", "closed", 5, 104).with("note", "gift"),
        order(6, "ann", "open", 15, 105),
        order(7, "cid", "void", 90, 106),
        order(8, "bob", "open", 40, 107),
    ]
}

/// Memory backend loaded with [`sample_orders`].
pub(crate) fn loaded_backend(schema: &Arc<RecordSchema>) -> MemoryBackend<TestRecord> {
    let backend = MemoryBackend::new(Arc::clone(schema));
    for record in sample_orders() {
        backend.insert(record).expect("sample order should insert");
    }

    backend
}

/// Ids of the records in the order they were produced.
pub(crate) fn ids(records: &[TestRecord]) -> Vec<i64> {
    records.iter().map(TestRecord::id).collect()
}
