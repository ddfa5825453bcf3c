//! Behavioural tests for variable reconciliation
//!
//! Runs the executor against the in-memory store and checks identity
//! preservation, deletion rules, ordering, partial-failure recovery and
//! idempotence.

use chrono::Utc;
use promptvars_core::{
    DesiredVariable, InMemoryVariableStore, PersistedVariable, ReconcileError,
    ReconciliationExecutor, StorageError, StoreOp, StoreOpKind, VariableStore, VariableType,
};
use proptest::prelude::*;

// ============================================================================
// Helpers
// ============================================================================

fn stored(id: &str, name: &str, order_index: u32) -> PersistedVariable {
    PersistedVariable {
        id: id.to_string(),
        parent_id: "prompt-1".to_string(),
        name: name.to_string(),
        var_type: VariableType::String,
        required: false,
        default_value: None,
        help: None,
        pattern: None,
        options: None,
        order_index,
        created_at: Utc::now(),
    }
}

fn executor_with(rows: Vec<PersistedVariable>) -> ReconciliationExecutor<InMemoryVariableStore> {
    ReconciliationExecutor::new(InMemoryVariableStore::with_rows(rows))
}

fn names(rows: &[PersistedVariable]) -> Vec<&str> {
    rows.iter().map(|r| r.name.as_str()).collect()
}

// ============================================================================
// Identity and deletion
// ============================================================================

#[tokio::test]
async fn rename_by_id_preserves_identity() {
    let executor = executor_with(vec![stored("v1", "old", 0)]);

    let rows = executor
        .reconcile("prompt-1", &[DesiredVariable::new("new").with_id("v1")])
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "v1");
    assert_eq!(rows[0].name, "new");
    assert!(!executor
        .store()
        .operations()
        .iter()
        .any(|op| op.kind() == StoreOpKind::DeleteByIds));
}

#[tokio::test]
async fn update_by_name_preserves_identity() {
    let mut row = stored("v1", "x", 0);
    row.required = true;
    let created_at = row.created_at;
    let executor = executor_with(vec![row]);

    let rows = executor
        .reconcile("prompt-1", &[DesiredVariable::new("x").required(false)])
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "v1");
    assert!(!rows[0].required);
    assert_eq!(rows[0].created_at, created_at);
}

#[tokio::test]
async fn name_matches_prevent_deletion() {
    let executor = executor_with(vec![stored("v1", "x", 0), stored("v2", "y", 1)]);

    let rows = executor
        .reconcile("prompt-1", &[DesiredVariable::new("x"), DesiredVariable::new("y")])
        .await
        .unwrap();

    let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["v1", "v2"]);
    assert_eq!(
        executor.store().operations(),
        vec![
            StoreOp::FetchByParent("prompt-1".into()),
            StoreOp::UpsertBatch(2)
        ]
    );
}

#[tokio::test]
async fn empty_list_purges_through_parent_delete() {
    let executor = executor_with(vec![stored("v1", "x", 0)]);

    let rows = executor.reconcile("prompt-1", &[]).await.unwrap();

    assert!(rows.is_empty());
    assert_eq!(
        executor.store().operations(),
        vec![StoreOp::DeleteByParent("prompt-1".into())]
    );
    assert!(executor.store().is_empty());
}

#[tokio::test]
async fn order_is_recomputed_from_input_position() {
    let executor = executor_with(vec![stored("v1", "c", 0), stored("v2", "a", 5)]);

    let rows = executor
        .reconcile(
            "prompt-1",
            &[
                DesiredVariable::new("a"),
                DesiredVariable::new("b"),
                DesiredVariable::new("c"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(names(&rows), vec!["a", "b", "c"]);
    let orders: Vec<u32> = rows.iter().map(|r| r.order_index).collect();
    assert_eq!(orders, vec![0, 1, 2]);
    assert_eq!(rows[0].id, "v2");
    assert_eq!(rows[2].id, "v1");
}

#[tokio::test]
async fn mixed_keep_rename_insert_delete() {
    let executor = executor_with(vec![
        stored("k1", "keep", 0),
        stored("r1", "renameMe", 1),
        stored("d1", "deleteMe", 2),
    ]);

    let rows = executor
        .reconcile(
            "prompt-1",
            &[
                DesiredVariable::new("keep"),
                DesiredVariable::new("renamed").with_id("r1"),
                DesiredVariable::new("brandNew").with_type(VariableType::Enum).with_options(["a", "b"]),
            ],
        )
        .await
        .unwrap();

    assert_eq!(names(&rows), vec!["keep", "renamed", "brandNew"]);
    assert_eq!(rows[0].id, "k1");
    assert_eq!(rows[1].id, "r1");
    assert!(!["k1", "r1", "d1"].contains(&rows[2].id.as_str()));
    assert_eq!(rows[2].var_type, VariableType::Enum);
    assert_eq!(
        executor.store().operations()[1],
        StoreOp::DeleteByIds(vec!["d1".to_string()])
    );
}

#[tokio::test]
async fn other_prompts_are_untouched() {
    let mut foreign = stored("f1", "x", 0);
    foreign.parent_id = "prompt-2".to_string();
    let executor = executor_with(vec![stored("v1", "x", 0), foreign]);

    executor.reconcile("prompt-1", &[]).await.unwrap();
    executor
        .reconcile("prompt-1", &[DesiredVariable::new("y")])
        .await
        .unwrap();

    let other = executor.store().rows_for("prompt-2");
    assert_eq!(other.len(), 1);
    assert_eq!(other[0].id, "f1");
}

// ============================================================================
// Failure semantics
// ============================================================================

#[tokio::test]
async fn failed_delete_leaves_state_and_retry_converges() {
    let executor = executor_with(vec![stored("v1", "x", 0), stored("v2", "gone", 1)]);
    let target = [DesiredVariable::new("x"), DesiredVariable::new("y")];

    executor
        .store()
        .fail_next(StoreOpKind::DeleteByIds, StorageError::Unavailable("timeout".into()));
    let err = executor.reconcile("prompt-1", &target).await.unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(executor.store().rows_for("prompt-1").len(), 2);
    assert!(!executor
        .store()
        .operations()
        .iter()
        .any(|op| op.kind() == StoreOpKind::UpsertBatch));

    let rows = executor.reconcile("prompt-1", &target).await.unwrap();
    assert_eq!(names(&rows), vec!["x", "y"]);
    assert_eq!(rows[0].id, "v1");
}

#[tokio::test]
async fn failed_upsert_after_delete_converges_on_retry() {
    let executor = executor_with(vec![
        stored("v1", "keep", 0),
        stored("v2", "drop", 1),
        stored("v3", "old", 2),
    ]);
    let target = [
        DesiredVariable::new("new").with_id("v3"),
        DesiredVariable::new("keep").required(true),
        DesiredVariable::new("fresh"),
    ];

    executor
        .store()
        .fail_next(StoreOpKind::UpsertBatch, StorageError::backend("connection lost"));
    let err = executor.reconcile("prompt-1", &target).await.unwrap_err();
    assert!(matches!(err, ReconcileError::Storage { .. }));

    // The delete landed, the upsert did not
    let mid: Vec<String> = executor
        .store()
        .rows_for("prompt-1")
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(mid, vec!["v1".to_string(), "v3".to_string()]);

    let rows = executor.reconcile("prompt-1", &target).await.unwrap();
    assert_eq!(names(&rows), vec!["new", "keep", "fresh"]);
    assert_eq!(rows[0].id, "v3");
    assert_eq!(rows[1].id, "v1");
    assert!(rows[1].required);

    let again = executor.plan("prompt-1", &target).await.unwrap();
    assert!(again.is_noop());
}

#[tokio::test]
async fn works_through_shared_trait_object() {
    use std::sync::Arc;

    let store: Arc<dyn VariableStore> = Arc::new(InMemoryVariableStore::new());
    let executor = ReconciliationExecutor::new(Arc::clone(&store));

    executor
        .reconcile("prompt-1", &[DesiredVariable::new("a")])
        .await
        .unwrap();

    assert_eq!(store.fetch_by_parent("prompt-1").await.unwrap().len(), 1);
}

// ============================================================================
// Idempotence
// ============================================================================

fn desired_list() -> impl Strategy<Value = Vec<(String, bool, bool)>> {
    prop::collection::hash_set("[a-f]{1,2}", 0..8).prop_flat_map(|names| {
        let names: Vec<String> = names.into_iter().collect();
        let len = names.len();
        (
            Just(names),
            prop::collection::vec(any::<bool>(), len),
            prop::collection::vec(any::<bool>(), len),
        )
            .prop_map(|(names, required, hint)| {
                names
                    .into_iter()
                    .zip(required)
                    .zip(hint)
                    .map(|((n, r), h)| (n, r, h))
                    .collect()
            })
    })
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn reconcile_is_idempotent(
        initial in desired_list(),
        target in desired_list(),
    ) {
        let rt = runtime();
        let executor = ReconciliationExecutor::new(InMemoryVariableStore::new());

        let outcome = rt.block_on(async {
            let seeded: Vec<DesiredVariable> = initial
                .iter()
                .map(|(name, required, _)| DesiredVariable::new(name.clone()).required(*required))
                .collect();
            let seeded = executor.reconcile("p", &seeded).await?;

            // Some entries point at a seeded row by position, which renames it
            let incoming: Vec<DesiredVariable> = target
                .iter()
                .enumerate()
                .map(|(i, (name, required, hint))| {
                    let desired = DesiredVariable::new(name.clone()).required(*required);
                    match seeded.get(i) {
                        Some(row) if *hint => desired.with_id(row.id.clone()),
                        _ => desired,
                    }
                })
                .collect();

            let rows = executor.reconcile("p", &incoming).await?;
            let reread: Vec<DesiredVariable> = executor
                .store()
                .fetch_by_parent("p")
                .await
                .map_err(|e| ReconcileError::Storage {
                    parent_id: "p".into(),
                    step: promptvars_core::ReconcileStep::Fetch,
                    source: e,
                })?
                .iter()
                .map(DesiredVariable::from)
                .collect();

            let from_reread = executor.plan("p", &reread).await?;
            let repeated = executor.plan("p", &incoming).await?;
            Ok::<_, ReconcileError>((incoming, rows, from_reread, repeated))
        });

        // Renaming onto a name that survives is rejected by the unique rule
        let rejected_by_constraint = matches!(
            &outcome,
            Err(ReconcileError::Storage { source, .. }) if source.is_constraint()
        );
        prop_assume!(!rejected_by_constraint);

        let (incoming, rows, from_reread, repeated) = outcome.unwrap();

        prop_assert!(from_reread.is_noop());
        prop_assert!(repeated.is_noop());

        prop_assert_eq!(rows.len(), incoming.len());
        for (index, (row, desired)) in rows.iter().zip(&incoming).enumerate() {
            prop_assert_eq!(row.order_index as usize, index);
            prop_assert_eq!(&row.name, &desired.name);
            prop_assert_eq!(row.required, desired.required);
        }
    }
}
