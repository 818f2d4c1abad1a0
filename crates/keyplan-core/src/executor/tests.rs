use crate::{
    config::PlannerConfig,
    error::{ErrorClass, ErrorOrigin, InternalError},
    executor::{Executor, build_executor},
    model::{
        index::{IndexProperty, IndexSpec},
        ordering::OrderingSpec,
        schema::RecordSchema,
    },
    obs::{CountingSink, PlanKind},
    plan::{PlanNode, QueryHint, QueryHints, QueryPlan, plan_query},
    predicate::Predicate,
    store::{BackendError, Cursor, IndexEntry, KeyRange, MemoryBackend, StorageBackend},
    test_support::{TestRecord, ids, loaded_backend, orders_schema},
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering as AtomicOrdering},
};

///
/// TrackingBackend
///
/// Memory backend wrapper that counts cursor closes and can inject
/// failures at open time or after a number of rows.
///

struct TrackingBackend {
    inner: MemoryBackend<TestRecord>,
    closes: Arc<AtomicUsize>,
    fail_open: bool,
    fail_after: Option<usize>,
}

impl TrackingBackend {
    fn new(schema: &Arc<RecordSchema>) -> Self {
        Self {
            inner: loaded_backend(schema),
            closes: Arc::new(AtomicUsize::new(0)),
            fail_open: false,
            fail_after: None,
        }
    }

    fn closes(&self) -> usize {
        self.closes.load(AtomicOrdering::SeqCst)
    }

    fn track<T: Send + 'static>(&self, inner: Box<dyn Cursor<T>>) -> Box<dyn Cursor<T>> {
        Box::new(TrackingCursor {
            inner,
            closes: Arc::clone(&self.closes),
            fail_after: self.fail_after,
            yielded: 0,
        })
    }
}

impl StorageBackend<TestRecord> for TrackingBackend {
    fn scan(
        &self,
        index: &IndexSpec,
        range: &KeyRange,
        reverse: bool,
    ) -> Result<Box<dyn Cursor<IndexEntry<TestRecord>>>, BackendError> {
        if self.fail_open {
            return Err(BackendError::new("index store unavailable"));
        }

        Ok(self.track(self.inner.scan(index, range, reverse)?))
    }

    fn full_scan(&self) -> Result<Box<dyn Cursor<TestRecord>>, BackendError> {
        if self.fail_open {
            return Err(BackendError::new("record store unavailable"));
        }

        Ok(self.track(self.inner.full_scan()?))
    }
}

struct TrackingCursor<T> {
    inner: Box<dyn Cursor<T>>,
    closes: Arc<AtomicUsize>,
    fail_after: Option<usize>,
    yielded: usize,
}

impl<T: Send> Cursor<T> for TrackingCursor<T> {
    fn next(&mut self) -> Result<Option<T>, InternalError> {
        if self.fail_after == Some(self.yielded) {
            return Err(BackendError::new("storage node went away").into());
        }
        self.yielded += 1;

        self.inner.next()
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, AtomicOrdering::SeqCst);
        self.inner.close();
    }
}

fn executor_for(
    schema: &Arc<RecordSchema>,
    backend: Arc<dyn StorageBackend<TestRecord>>,
    filter: &Predicate,
    ordering: &OrderingSpec,
    hints: &QueryHints,
) -> Executor<TestRecord> {
    let plan = plan_query(schema, filter, ordering, hints, &PlannerConfig::default()).unwrap();

    build_executor(plan, backend, Arc::clone(schema)).unwrap()
}

fn run(filter: &Predicate, ordering: &OrderingSpec) -> Vec<i64> {
    run_hinted(filter, ordering, &QueryHints::empty())
}

fn run_hinted(filter: &Predicate, ordering: &OrderingSpec, hints: &QueryHints) -> Vec<i64> {
    let schema = Arc::new(orders_schema());
    let backend = Arc::new(loaded_backend(&schema));
    let executor = executor_for(&schema, backend, filter, ordering, hints);

    ids(&executor.collect().unwrap())
}

fn run_plan(root: PlanNode, limit: usize) -> Result<Vec<TestRecord>, InternalError> {
    let schema = Arc::new(orders_schema());
    let backend = Arc::new(loaded_backend(&schema));
    let plan = QueryPlan::new(root, OrderingSpec::new(), limit);

    build_executor(plan, backend, schema)?.collect()
}

fn schema_index(name: &str) -> IndexSpec {
    orders_schema().index(name).cloned().unwrap()
}

// ---------------------------------------------------------------------
// Planned queries
// ---------------------------------------------------------------------

#[test]
fn identity_and_range_scan_returns_matching_rows() {
    let filter = Predicate::eq("id", 4i64) & Predicate::gt("amount", 10i32);
    assert_eq!(run(&filter, &OrderingSpec::new().then_asc("amount")), vec![4]);

    let filter = Predicate::eq("id", 5i64) & Predicate::gt("amount", 10i32);
    assert!(run(&filter, &OrderingSpec::new().then_asc("amount")).is_empty());
}

#[test]
fn descending_index_serves_both_directions() {
    let filter = Predicate::gte("amount", 15i32) & Predicate::lt("amount", 70i32);

    assert_eq!(
        run(&filter, &OrderingSpec::new().then_desc("amount")),
        vec![1, 8, 2, 3, 6]
    );
    assert_eq!(
        run(&filter, &OrderingSpec::new().then_asc("amount")),
        vec![6, 3, 2, 8, 1]
    );
}

#[test]
fn nulls_sort_below_every_value() {
    let filter = Predicate::lt("note", "m");

    assert_eq!(run(&filter, &OrderingSpec::new()), vec![1, 3, 4, 6, 7, 8, 5]);
}

#[test]
fn union_merges_in_order_and_drops_duplicates() {
    let filter = Predicate::eq("status", "open") | Predicate::eq("customer", "ann");

    assert_eq!(
        run(&filter, &OrderingSpec::new().then_asc("created")),
        vec![1, 2, 3, 4, 6, 8]
    );
    assert_eq!(
        run(&filter, &OrderingSpec::new().then_desc("created")),
        vec![8, 6, 4, 3, 2, 1]
    );
}

#[test]
fn intersection_keeps_rows_in_both_scans() {
    let both = Predicate::eq("status", "open") & Predicate::eq("customer", "ann");

    assert_eq!(run(&both, &OrderingSpec::new()), vec![1, 6]);
    assert_eq!(run(&both, &OrderingSpec::new().then_asc("amount")), vec![6, 1]);
    assert_eq!(
        run(&(both.clone() & Predicate::gt("amount", 20i32)), &OrderingSpec::new()),
        vec![1]
    );
    assert_eq!(
        run_hinted(
            &both,
            &OrderingSpec::new(),
            &QueryHints::of(QueryHint::NoIntersection)
        ),
        vec![1, 6]
    );
}

#[test]
fn collapsed_plan_filters_whole_predicate() {
    let filter = Predicate::eq("customer", "cid") | Predicate::ne("note", "rush");

    assert_eq!(
        run(&filter, &OrderingSpec::new().then_desc("id")),
        vec![8, 7, 6, 5, 4, 3, 1]
    );
}

#[test]
fn empty_plan_reads_nothing() {
    let schema = Arc::new(orders_schema());
    let backend = Arc::new(loaded_backend(&schema));
    let sink = Arc::new(CountingSink::new());
    let executor = executor_for(
        &schema,
        backend,
        &Predicate::False,
        &OrderingSpec::new(),
        &QueryHints::empty(),
    )
    .with_sink(sink.clone());

    assert!(executor.collect().unwrap().is_empty());
    assert_eq!(sink.plans(PlanKind::Empty), 1);
    assert_eq!(sink.rows_scanned(), 0);
}

// ---------------------------------------------------------------------
// Sort stage
// ---------------------------------------------------------------------

#[test]
fn sort_is_stable_for_ties() {
    let root = PlanNode::FullScan.sort(OrderingSpec::new(), OrderingSpec::new().then_asc("amount"));

    assert_eq!(ids(&run_plan(root, 100).unwrap()), vec![5, 2, 3, 6, 1, 8, 4, 7]);
}

#[test]
fn partial_sort_orders_each_handled_run() {
    let root = PlanNode::IndexScan {
        index: schema_index("by_status"),
        range: KeyRange::all(),
        reverse: false,
    }
    .sort(
        OrderingSpec::new().then_asc("status"),
        OrderingSpec::new().then_desc("amount"),
    );

    // runs: closed [3, 5], open [1, 2, 4, 6, 8], void [7]
    assert_eq!(
        ids(&run_plan(root.clone(), 5).unwrap()),
        vec![3, 5, 4, 1, 8, 2, 6, 7]
    );

    let err = run_plan(root, 4).unwrap_err();
    assert_eq!(err.class, ErrorClass::Unsupported);
    assert_eq!(err.origin, ErrorOrigin::Executor);
}

#[test]
fn sort_counts_rows_per_run() {
    let schema = Arc::new(orders_schema());
    let backend = Arc::new(loaded_backend(&schema));
    let sink = Arc::new(CountingSink::new());
    let root =
        PlanNode::FullScan.sort(OrderingSpec::new(), OrderingSpec::new().then_asc("created"));
    let executor = build_executor(QueryPlan::new(root, OrderingSpec::new(), 100), backend, schema)
        .unwrap()
        .with_sink(sink.clone());

    executor.collect().unwrap();

    assert_eq!(sink.rows_sorted(), 8);
    assert_eq!(sink.rows_scanned(), 8);
    assert_eq!(sink.plans(PlanKind::FullScan), 1);
}

#[test]
fn unsorted_input_violates_sort_contract() {
    let root = PlanNode::FullScan.sort(
        OrderingSpec::new().then_asc("amount"),
        OrderingSpec::new().then_asc("id"),
    );

    let err = run_plan(root, 100).unwrap_err();
    assert_eq!(err.class, ErrorClass::InvariantViolation);
    assert_eq!(err.origin, ErrorOrigin::Executor);
}

// ---------------------------------------------------------------------
// Merge stages
// ---------------------------------------------------------------------

#[test]
fn union_rejects_unsorted_input() {
    let root = PlanNode::Union {
        inputs: vec![PlanNode::FullScan, PlanNode::Empty],
        ordering: OrderingSpec::new().then_asc("amount").then_asc("id"),
    };

    let err = run_plan(root, 100).unwrap_err();
    assert_eq!(err.class, ErrorClass::InvariantViolation);
    assert_eq!(err.origin, ErrorOrigin::Executor);
}

#[test]
fn union_of_identical_inputs_emits_each_row_once() {
    let by_pk = OrderingSpec::new().then_asc("id");
    let root = PlanNode::Union {
        inputs: vec![PlanNode::FullScan, PlanNode::FullScan],
        ordering: by_pk,
    };

    assert_eq!(ids(&run_plan(root, 100).unwrap()), vec![1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn intersection_with_empty_side_is_empty() {
    let root = PlanNode::Intersection {
        left: Box::new(PlanNode::FullScan),
        right: Box::new(PlanNode::Empty),
    };

    assert!(run_plan(root, 100).unwrap().is_empty());
}

// ---------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------

#[test]
fn close_reaches_every_backend_cursor() {
    let schema = Arc::new(orders_schema());
    let backend = Arc::new(TrackingBackend::new(&schema));
    let filter = Predicate::eq("status", "open") | Predicate::eq("customer", "ann");
    let executor = executor_for(
        &schema,
        backend.clone(),
        &filter,
        &OrderingSpec::new().then_asc("created"),
        &QueryHints::empty(),
    );
    assert_eq!(executor.plan().kind, PlanKind::Union);

    let mut cursor = executor.fetch().unwrap();
    assert!(cursor.next().unwrap().is_some());
    cursor.close();

    assert_eq!(backend.closes(), 2);
    assert!(cursor.next().unwrap().is_none());
}

#[test]
fn executor_reopens_with_fresh_cursors() {
    let schema = Arc::new(orders_schema());
    let backend = Arc::new(loaded_backend(&schema));
    let sink = Arc::new(CountingSink::new());
    let filter = Predicate::eq("status", "open") & Predicate::gt("amount", 20i32);
    let executor = executor_for(
        &schema,
        backend,
        &filter,
        &OrderingSpec::new(),
        &QueryHints::empty(),
    )
    .with_sink(sink.clone());

    let first = ids(&executor.collect().unwrap());
    let second = ids(&executor.collect().unwrap());

    assert_eq!(first, vec![1, 4, 8]);
    assert_eq!(first, second);
    assert_eq!(sink.plans(PlanKind::IndexScan), 2);
    assert_eq!(sink.rows_scanned(), 10);
    assert_eq!(sink.rows_filtered(), 4);
}

#[test]
fn backend_open_failure_propagates() {
    let schema = Arc::new(orders_schema());
    let mut backend = TrackingBackend::new(&schema);
    backend.fail_open = true;
    let executor = executor_for(
        &schema,
        Arc::new(backend),
        &Predicate::eq("status", "open"),
        &OrderingSpec::new(),
        &QueryHints::empty(),
    );

    let err = executor.fetch().err().unwrap();
    assert_eq!(err.class, ErrorClass::BackendFailure);
    assert_eq!(err.origin, ErrorOrigin::Backend);
    assert!(err.message.contains("index store unavailable"));
}

#[test]
fn backend_failure_mid_stream_is_not_swallowed() {
    let schema = Arc::new(orders_schema());
    let mut backend = TrackingBackend::new(&schema);
    backend.fail_after = Some(2);
    let executor = executor_for(
        &schema,
        Arc::new(backend),
        &Predicate::eq("status", "open"),
        &OrderingSpec::new(),
        &QueryHints::empty(),
    );

    let mut cursor = executor.fetch().unwrap();
    assert!(cursor.next().unwrap().is_some());
    assert!(cursor.next().unwrap().is_some());

    let err = cursor.next().unwrap_err();
    assert!(err.is_backend_failure());
}

#[test]
fn build_rejects_index_outside_schema() {
    let schema = Arc::new(orders_schema());
    let backend = Arc::new(loaded_backend(&schema));
    let root = PlanNode::IndexScan {
        index: IndexSpec::new("by_zip", vec![IndexProperty::asc("zip")]),
        range: KeyRange::all(),
        reverse: false,
    };

    let err = build_executor(QueryPlan::new(root, OrderingSpec::new(), 100), backend, schema)
        .err()
        .unwrap();
    assert_eq!(err.class, ErrorClass::InvariantViolation);
    assert_eq!(err.origin, ErrorOrigin::Planner);
}

#[test]
fn explain_matches_plan_rendering() {
    let schema = Arc::new(orders_schema());
    let backend = Arc::new(loaded_backend(&schema));
    let executor = executor_for(
        &schema,
        backend,
        &Predicate::eq("customer", "ann"),
        &OrderingSpec::new(),
        &QueryHints::empty(),
    );

    assert_eq!(executor.explain(), executor.plan().explain());
    assert!(executor.explain().contains("by_customer_created"));
}
