//! Dispatcher integration tests over a stub data service.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tokio::sync::oneshot;

use dfq::ast::{Action, AggFunc, CompareOp, FilterClause, FilterLogic};
use dfq::client::DataService;
use dfq::dispatch::{Dispatcher, Outcome};
use dfq::error::{ConsoleError, ConsoleResult};
use dfq::protocol::*;
use dfq::schema::SchemaRegistry;

type Gate = (oneshot::Sender<()>, oneshot::Receiver<()>);

/// Every request the stub saw, in order.
#[derive(Debug, Clone, PartialEq)]
enum Recorded {
    Load(LoadRequest),
    Filter(FilterRequest),
    Select(SelectRequest),
    Aggregate(AggregateRequest),
    GroupBy(GroupByRequest),
    Join(JoinRequest),
    Clear,
}

/// Answers requests from canned data and records what it saw.
///
/// `push_gate` makes the next filter call signal `entered` and then
/// park until `release` fires, which lets a test overlap submissions.
#[derive(Default)]
struct StubService {
    recorded: Mutex<Vec<Recorded>>,
    gates: Mutex<VecDeque<Gate>>,
    fail: Mutex<Option<String>>,
    loaded: Mutex<Option<String>>,
}

impl StubService {
    fn columns() -> Vec<String> {
        vec!["A".into(), "B".into(), "Score".into()]
    }

    fn record(&self, entry: Recorded) {
        self.recorded.lock().unwrap().push(entry);
    }

    fn requests(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }

    fn push_gate(&self, entered: oneshot::Sender<()>, release: oneshot::Receiver<()>) {
        self.gates.lock().unwrap().push_back((entered, release));
    }

    fn fail_next(&self, message: &str) {
        *self.fail.lock().unwrap() = Some(message.to_string());
    }

    fn take_failure(&self) -> Option<ConsoleError> {
        self.fail.lock().unwrap().take().map(ConsoleError::backend)
    }

    async fn wait_at_gate(&self) {
        let gate = self.gates.lock().unwrap().pop_front();
        if let Some((entered, release)) = gate {
            let _ = entered.send(());
            let _ = release.await;
        }
    }

    fn table(rows: usize, columns: &[String]) -> TableResponse {
        let mut data = DataMap::new();
        for column in columns {
            data.insert(
                column.clone(),
                (0..rows.min(3)).map(|i| serde_json::json!(i)).collect(),
            );
        }
        TableResponse {
            rows,
            data,
            total_columns: None,
            displayed_columns: None,
        }
    }
}

#[async_trait]
impl DataService for StubService {
    async fn load(&self, request: LoadRequest) -> ConsoleResult<LoadResponse> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        self.record(Recorded::Load(request.clone()));
        *self.loaded.lock().unwrap() = Some(request.name.clone());
        Ok(LoadResponse {
            name: request.name,
            rows: 3,
            columns: Self::columns(),
            total_columns: None,
            preview: None,
        })
    }

    async fn filter(&self, request: FilterRequest) -> ConsoleResult<TableResponse> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        self.record(Recorded::Filter(request.clone()));
        self.wait_at_gate().await;
        // Row count echoes the first value, so tests can tell
        // responses apart.
        let rows = request.filters[0].value.parse().unwrap_or(0);
        Ok(Self::table(rows, &[request.filters[0].column.clone()]))
    }

    async fn select(&self, request: SelectRequest) -> ConsoleResult<TableResponse> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        self.record(Recorded::Select(request.clone()));
        Ok(Self::table(3, &request.columns))
    }

    async fn aggregate_simple(&self, request: AggregateRequest) -> ConsoleResult<ScalarResponse> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        self.record(Recorded::Aggregate(request));
        Ok(ScalarResponse {
            result: serde_json::json!(6),
            row_count: 3,
        })
    }

    async fn aggregate(&self, request: GroupByRequest) -> ConsoleResult<TableResponse> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        self.record(Recorded::GroupBy(request.clone()));
        Ok(Self::table(2, &[request.groupby.clone(), request.column.clone()]))
    }

    async fn join(&self, request: JoinRequest) -> ConsoleResult<JoinResponse> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        self.record(Recorded::Join(request.clone()));
        let columns = vec![request.left_on.clone(), "A".to_string(), "B".to_string()];
        let table = Self::table(2, &columns);
        Ok(JoinResponse {
            rows: 2,
            columns,
            data: table.data,
        })
    }

    async fn clear(&self) -> ConsoleResult<ClearResponse> {
        self.record(Recorded::Clear);
        *self.loaded.lock().unwrap() = None;
        Ok(ClearResponse {
            success: true,
            message: "All DataFrames cleared".to_string(),
        })
    }

    async fn frames(&self) -> ConsoleResult<FramesResponse> {
        let mut dataframes = HashMap::new();
        if let Some(name) = self.loaded.lock().unwrap().clone() {
            dataframes.insert(
                name,
                FrameSummary {
                    rows: 3,
                    columns: Self::columns(),
                },
            );
        }
        Ok(FramesResponse { dataframes })
    }

    async fn frame_info(&self, name: &str) -> ConsoleResult<FrameInfo> {
        if self.loaded.lock().unwrap().as_deref() == Some(name) {
            Ok(FrameInfo {
                name: name.to_string(),
                rows: 3,
                columns: Self::columns(),
                shape: Some((3, 3)),
                preview: None,
            })
        } else {
            Err(ConsoleError::backend(format!(
                "DataFrame \"{}\" not loaded",
                name
            )))
        }
    }
}

fn fresh() -> (Arc<StubService>, Dispatcher) {
    let service = Arc::new(StubService::default());
    let dispatcher = Dispatcher::new(Arc::new(SchemaRegistry::new()), service.clone());
    (service, dispatcher)
}

async fn loaded() -> (Arc<StubService>, Dispatcher) {
    let (service, dispatcher) = fresh();
    dispatcher
        .submit(Action::Load, "data/cities.csv")
        .await
        .unwrap();
    (service, dispatcher)
}

#[tokio::test]
async fn test_load_builds_request_and_registers_schema() {
    let (service, dispatcher) = fresh();
    let outcome = dispatcher
        .submit(Action::Load, "data/cities.csv")
        .await
        .unwrap();

    match outcome {
        Outcome::Loaded { schema, .. } => {
            assert_eq!(schema.name, "df");
            assert_eq!(schema.columns, StubService::columns());
            assert_eq!(schema.row_count, 3);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(!dispatcher.registry().is_empty());
    assert_eq!(
        service.requests(),
        vec![Recorded::Load(LoadRequest {
            filepath: "data/cities.csv".into(),
            name: "df".into(),
        })]
    );
}

#[tokio::test]
async fn test_empty_input_short_circuits() {
    let (service, dispatcher) = fresh();
    // Empty beats the no-dataset guard; nothing is loaded here.
    let err = dispatcher.submit(Action::Filter, "   ").await.unwrap_err();
    assert_eq!(err.to_string(), "Please enter a command");
    assert!(service.requests().is_empty());
}

#[tokio::test]
async fn test_actions_require_loaded_data() {
    let (service, dispatcher) = fresh();
    let inputs = [
        (Action::Filter, "df[Score] > 1"),
        (Action::Filter, "garbage"),
        (Action::Select, "df[A]"),
        (Action::Aggregate, "df.sum(Score)"),
        (Action::GroupBy, "df.groupby(A).sum(Score)"),
        (Action::Join, "df1.merge(df2, on=Code)"),
    ];
    for (action, input) in inputs {
        let err = dispatcher.submit(action, input).await.unwrap_err();
        assert_eq!(err.to_string(), "Please load data first");
    }
    assert!(service.requests().is_empty());
}

#[tokio::test]
async fn test_filter_builds_canonical_request() {
    let (service, dispatcher) = loaded().await;
    dispatcher
        .submit(Action::Filter, "df[Score] > 10 & df[B] == x")
        .await
        .unwrap();

    assert_eq!(
        service.requests()[1],
        Recorded::Filter(FilterRequest {
            dataframe: "df".into(),
            filters: vec![
                FilterClause::new("Score", CompareOp::Gt, "10"),
                FilterClause::new("B", CompareOp::Eq, "x"),
            ],
            logic: FilterLogic::And,
        })
    );
}

#[tokio::test]
async fn test_filter_or_logic() {
    let (service, dispatcher) = loaded().await;
    dispatcher
        .submit(Action::Filter, "df[Score] > 1 | df[Score] < 0")
        .await
        .unwrap();

    match &service.requests()[1] {
        Recorded::Filter(request) => assert_eq!(request.logic, FilterLogic::Or),
        other => panic!("unexpected request: {other:?}"),
    }
}

#[tokio::test]
async fn test_mixed_separators_never_reach_the_service() {
    let (service, dispatcher) = loaded().await;
    let err = dispatcher
        .submit(Action::Filter, "df[Score] > 1 & df[B] == x | df[A] == y")
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Compound filters cannot mix \" & \" and \" | \""
    );
    assert_eq!(service.requests().len(), 1);
}

#[tokio::test]
async fn test_select_unknown_column_message() {
    let (service, dispatcher) = loaded().await;
    let err = dispatcher
        .submit(Action::Select, "df[A, C]")
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Column \"C\" not found. Available: A, B, Score"
    );
    assert_eq!(service.requests().len(), 1);
}

#[tokio::test]
async fn test_select_preserves_projection_order() {
    let (_service, dispatcher) = loaded().await;
    let outcome = dispatcher
        .submit(Action::Select, "df[B, A]")
        .await
        .unwrap();

    match outcome {
        Outcome::Table { title, columns, .. } => {
            assert_eq!(title, "Columns Selected");
            assert_eq!(columns, vec!["B".to_string(), "A".to_string()]);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn test_aggregate_scalar_outcome() {
    let (service, dispatcher) = loaded().await;
    let outcome = dispatcher
        .submit(Action::Aggregate, "df.sum(Score)")
        .await
        .unwrap();

    match outcome {
        Outcome::Scalar {
            label,
            value,
            row_count,
        } => {
            assert_eq!(label, "SUM(Score)");
            assert_eq!(value, serde_json::json!(6));
            assert_eq!(row_count, 3);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(
        service.requests()[1],
        Recorded::Aggregate(AggregateRequest {
            dataframe: "df".into(),
            column: "Score".into(),
            function: AggFunc::Sum,
        })
    );
}

#[tokio::test]
async fn test_groupby_request_and_column_order() {
    let (service, dispatcher) = loaded().await;
    let outcome = dispatcher
        .submit(Action::GroupBy, "df.groupby(A).sum(Score)")
        .await
        .unwrap();

    assert_eq!(
        service.requests()[1],
        Recorded::GroupBy(GroupByRequest {
            dataframe: "df".into(),
            groupby: "A".into(),
            column: "Score".into(),
            function: AggFunc::Sum,
        })
    );
    match outcome {
        Outcome::Table { title, columns, .. } => {
            assert_eq!(title, "Data Aggregated");
            assert_eq!(columns, vec!["A".to_string(), "Score".to_string()]);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn test_join_defaults_to_inner_and_skips_column_checks() {
    let (service, dispatcher) = loaded().await;
    // "Code" is not in the loaded schema; join is syntax-only.
    dispatcher
        .submit(Action::Join, "df1.merge(df2, on=Code)")
        .await
        .unwrap();

    assert_eq!(
        service.requests()[1],
        Recorded::Join(JoinRequest {
            left: "df1".into(),
            right: "df2".into(),
            left_on: "Code".into(),
            right_on: "Code".into(),
            how: "inner".into(),
        })
    );
}

#[tokio::test]
async fn test_backend_error_surfaces_verbatim() {
    let (service, dispatcher) = loaded().await;
    service.fail_next("DataFrame \"df\" not loaded");
    let err = dispatcher
        .submit(Action::Filter, "df[Score] > 1")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "DataFrame \"df\" not loaded");
}

#[tokio::test]
async fn test_clear_resets_registry() {
    let (service, dispatcher) = loaded().await;
    assert!(!dispatcher.registry().is_empty());

    let outcome = dispatcher.clear().await.unwrap();
    match outcome {
        Outcome::Cleared { message } => assert_eq!(message, "All DataFrames cleared"),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(dispatcher.registry().is_empty());
    assert!(service.requests().contains(&Recorded::Clear));
}

#[tokio::test]
async fn test_stale_response_is_discarded() {
    let (service, dispatcher) = loaded().await;
    let dispatcher = Arc::new(dispatcher);

    let (entered1_tx, entered1_rx) = oneshot::channel();
    let (release1_tx, release1_rx) = oneshot::channel();
    let (entered2_tx, entered2_rx) = oneshot::channel();
    let (release2_tx, release2_rx) = oneshot::channel();
    service.push_gate(entered1_tx, release1_rx);
    service.push_gate(entered2_tx, release2_rx);

    let first_dispatcher = Arc::clone(&dispatcher);
    let first =
        tokio::spawn(async move { first_dispatcher.submit(Action::Filter, "df[Score] > 1").await });
    entered1_rx.await.unwrap();

    let second_dispatcher = Arc::clone(&dispatcher);
    let second = tokio::spawn(async move {
        second_dispatcher.submit(Action::Filter, "df[Score] > 2").await
    });
    entered2_rx.await.unwrap();

    // The second submission answers first and renders.
    release2_tx.send(()).unwrap();
    match second.await.unwrap().unwrap() {
        Outcome::Table { rows, .. } => assert_eq!(rows, 2),
        other => panic!("unexpected outcome: {other:?}"),
    }

    // The first answers late and is discarded.
    release1_tx.send(()).unwrap();
    assert!(matches!(
        first.await.unwrap().unwrap(),
        Outcome::Stale
    ));
}

#[tokio::test]
async fn test_validation_is_idempotent_through_dispatcher() {
    let (service, dispatcher) = loaded().await;
    let first = dispatcher
        .submit(Action::Select, "df[A, Nope]")
        .await
        .unwrap_err();
    let second = dispatcher
        .submit(Action::Select, "df[A, Nope]")
        .await
        .unwrap_err();
    assert_eq!(first.to_string(), second.to_string());

    dispatcher.submit(Action::Select, "df[A, B]").await.unwrap();
    dispatcher.submit(Action::Select, "df[A, B]").await.unwrap();
    let requests = service.requests();
    assert_eq!(requests[1], requests[2]);
}

#[tokio::test]
async fn test_hydrate_reattaches_to_existing_frame() {
    let (_service, dispatcher) = fresh();
    assert!(!dispatcher.hydrate().await.unwrap());
    assert!(dispatcher.registry().is_empty());

    dispatcher
        .submit(Action::Load, "data/cities.csv")
        .await
        .unwrap();

    // A fresh console against a warm service.
    dispatcher.registry().clear();
    assert!(dispatcher.hydrate().await.unwrap());
    let schema = dispatcher.registry().get().unwrap();
    assert_eq!(schema.columns, StubService::columns());
    assert_eq!(schema.row_count, 3);
}
