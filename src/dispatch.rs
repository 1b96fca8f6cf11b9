//! Action registry and the dispatch state machine.
//!
//! One action is current at a time; each submission runs
//! validate, execute, apply. Requests carry a sequence number so a
//! response that was overtaken by a newer submission is discarded
//! instead of rendered, and registry writes happen only for fresh
//! responses.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::ast::{Action, Command, DEFAULT_FRAME};
use crate::client::DataService;
use crate::error::{ConsoleError, ConsoleResult};
use crate::protocol::{
    display_order, AggregateRequest, DataMap, FilterRequest, FrameInfo, FramesResponse,
    GroupByRequest, JoinRequest, LoadRequest, SelectRequest,
};
use crate::schema::{Schema, SchemaRegistry};
use crate::validate::Validator;

/// Static description of one console action.
#[derive(Debug, Clone, Copy)]
pub struct ActionDescriptor {
    pub action: Action,
    pub placeholder: &'static str,
    pub description: &'static str,
}

/// The full action registry, built once, in UI order.
pub const ACTIONS: [ActionDescriptor; 6] = [
    ActionDescriptor {
        action: Action::Load,
        placeholder: "data/cities.csv",
        description: "Load a CSV file into the service",
    },
    ActionDescriptor {
        action: Action::Filter,
        placeholder: "df[Population] > 1000000",
        description: "Keep rows matching one or more comparisons",
    },
    ActionDescriptor {
        action: Action::Select,
        placeholder: "df[Name, Region, Population]",
        description: "Project a subset of columns",
    },
    ActionDescriptor {
        action: Action::Aggregate,
        placeholder: "df.sum(Population)",
        description: "Reduce one column to a single value",
    },
    ActionDescriptor {
        action: Action::GroupBy,
        placeholder: "df.groupby(Region).sum(Population)",
        description: "Aggregate one column per group of another",
    },
    ActionDescriptor {
        action: Action::Join,
        placeholder: "df1.merge(df2, on=Code)",
        description: "Merge two frames held by the service",
    },
];

/// The descriptor for an action.
pub fn descriptor(action: Action) -> &'static ActionDescriptor {
    match action {
        Action::Load => &ACTIONS[0],
        Action::Filter => &ACTIONS[1],
        Action::Select => &ACTIONS[2],
        Action::Aggregate => &ACTIONS[3],
        Action::GroupBy => &ACTIONS[4],
        Action::Join => &ACTIONS[5],
    }
}

/// What a successful submission produced, ready for rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// A frame was loaded and its schema registered.
    Loaded {
        schema: Schema,
        total_columns: Option<usize>,
        preview: Option<DataMap>,
    },
    /// Tabular data from filter, select, groupby, or join.
    Table {
        title: &'static str,
        rows: usize,
        columns: Vec<String>,
        data: DataMap,
        total_columns: Option<usize>,
        displayed_columns: Option<usize>,
    },
    /// A single aggregated value.
    Scalar {
        label: String,
        value: serde_json::Value,
        row_count: usize,
    },
    /// The service dropped its frames.
    Cleared { message: String },
    /// A newer submission overtook this one; nothing to render.
    Stale,
}

/// Drives submissions from raw input to a renderable outcome.
pub struct Dispatcher {
    registry: Arc<SchemaRegistry>,
    service: Arc<dyn DataService>,
    validator: Validator,
    seq: AtomicU64,
    frame: String,
}

impl Dispatcher {
    pub fn new(registry: Arc<SchemaRegistry>, service: Arc<dyn DataService>) -> Self {
        Self::with_frame(registry, service, DEFAULT_FRAME)
    }

    /// Use `frame` as the target of loads and the default name in
    /// commands that omit one.
    pub fn with_frame(
        registry: Arc<SchemaRegistry>,
        service: Arc<dyn DataService>,
        frame: impl Into<String>,
    ) -> Self {
        let frame = frame.into();
        let validator = Validator::with_default_frame(Arc::clone(&registry), frame.clone());
        Self {
            registry,
            service,
            validator,
            seq: AtomicU64::new(0),
            frame,
        }
    }

    pub fn frame(&self) -> &str {
        &self.frame
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Run one submission through validate, execute, apply.
    ///
    /// The freshness check sits between execute and apply, so an
    /// overtaken response neither renders nor writes the registry.
    pub async fn submit(&self, action: Action, input: &str) -> ConsoleResult<Outcome> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ConsoleError::EmptyInput);
        }
        let command = self.validator.validate(action, input)?;

        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Dispatching {} #{}: {}", action, seq, command);
        let result = self.execute(&command).await;

        if self.seq.load(Ordering::SeqCst) != seq {
            warn!("Discarding stale {} response #{}", action, seq);
            return Ok(Outcome::Stale);
        }
        let outcome = result?;
        self.apply(&outcome);
        Ok(outcome)
    }

    /// Drop every frame on the service and locally.
    pub async fn clear(&self) -> ConsoleResult<Outcome> {
        let response = self.service.clear().await?;
        self.registry.clear();
        Ok(Outcome::Cleared {
            message: response.message,
        })
    }

    /// List the frames the service holds.
    pub async fn frames(&self) -> ConsoleResult<FramesResponse> {
        self.service.frames().await
    }

    /// Shape and preview for one frame, defaulting to the configured one.
    pub async fn frame_info(&self, name: Option<&str>) -> ConsoleResult<FrameInfo> {
        self.service.frame_info(name.unwrap_or(&self.frame)).await
    }

    /// Reattach to a frame the service already holds. Returns whether
    /// a schema was registered.
    pub async fn hydrate(&self) -> ConsoleResult<bool> {
        let frames = self.service.frames().await?;
        if !frames.dataframes.contains_key(&self.frame) {
            return Ok(false);
        }
        let info = self.service.frame_info(&self.frame).await?;
        debug!("Reattached to '{}' ({} rows)", info.name, info.rows);
        self.registry
            .set(Schema::new(info.name, info.columns, info.rows));
        Ok(true)
    }

    async fn execute(&self, command: &Command) -> ConsoleResult<Outcome> {
        match command {
            Command::Load { path } => {
                let response = self
                    .service
                    .load(LoadRequest {
                        filepath: path.clone(),
                        name: self.frame.clone(),
                    })
                    .await?;
                Ok(Outcome::Loaded {
                    schema: Schema::new(response.name, response.columns, response.rows),
                    total_columns: response.total_columns,
                    preview: response.preview,
                })
            }
            Command::Filter {
                dataframe,
                clauses,
                logic,
            } => {
                let response = self
                    .service
                    .filter(FilterRequest {
                        dataframe: dataframe.clone(),
                        filters: clauses.clone(),
                        logic: *logic,
                    })
                    .await?;
                // Display in schema order; the payload map is unordered.
                let preferred = self
                    .registry
                    .get()
                    .map(|schema| schema.columns)
                    .unwrap_or_default();
                Ok(Outcome::Table {
                    title: "Filter Applied",
                    rows: response.rows,
                    columns: display_order(&preferred, &response.data),
                    data: response.data,
                    total_columns: response.total_columns,
                    displayed_columns: response.displayed_columns,
                })
            }
            Command::Select { dataframe, columns } => {
                let response = self
                    .service
                    .select(SelectRequest {
                        dataframe: dataframe.clone(),
                        columns: columns.clone(),
                    })
                    .await?;
                Ok(Outcome::Table {
                    title: "Columns Selected",
                    rows: response.rows,
                    columns: display_order(columns, &response.data),
                    data: response.data,
                    total_columns: response.total_columns,
                    displayed_columns: response.displayed_columns,
                })
            }
            Command::Aggregate {
                dataframe,
                column,
                function,
            } => {
                let response = self
                    .service
                    .aggregate_simple(AggregateRequest {
                        dataframe: dataframe.clone(),
                        column: column.clone(),
                        function: *function,
                    })
                    .await?;
                Ok(Outcome::Scalar {
                    label: format!("{}({})", function.as_str().to_uppercase(), column),
                    value: response.result,
                    row_count: response.row_count,
                })
            }
            Command::GroupBy {
                dataframe,
                group_column,
                agg_column,
                function,
            } => {
                let response = self
                    .service
                    .aggregate(GroupByRequest {
                        dataframe: dataframe.clone(),
                        groupby: group_column.clone(),
                        column: agg_column.clone(),
                        function: *function,
                    })
                    .await?;
                let preferred = vec![group_column.clone(), agg_column.clone()];
                Ok(Outcome::Table {
                    title: "Data Aggregated",
                    rows: response.rows,
                    columns: display_order(&preferred, &response.data),
                    data: response.data,
                    total_columns: response.total_columns,
                    displayed_columns: response.displayed_columns,
                })
            }
            Command::Join {
                left,
                right,
                left_on,
                right_on,
                how,
            } => {
                let response = self
                    .service
                    .join(JoinRequest {
                        left: left.clone(),
                        right: right.clone(),
                        left_on: left_on.clone(),
                        right_on: right_on.clone(),
                        how: how.clone(),
                    })
                    .await?;
                Ok(Outcome::Table {
                    title: "DataFrames Joined",
                    rows: response.rows,
                    columns: display_order(&response.columns, &response.data),
                    data: response.data,
                    total_columns: None,
                    displayed_columns: None,
                })
            }
        }
    }

    /// Registry writes for fresh outcomes only.
    fn apply(&self, outcome: &Outcome) {
        match outcome {
            Outcome::Loaded { schema, .. } => self.registry.set(schema.clone()),
            Outcome::Cleared { .. } => self.registry.clear(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order_matches_action() {
        for (i, descriptor) in ACTIONS.iter().enumerate() {
            assert_eq!(descriptor.action, Action::ALL[i]);
        }
        assert_eq!(descriptor(Action::GroupBy).placeholder, "df.groupby(Region).sum(Population)");
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let outcome = Outcome::Scalar {
            label: "SUM(Population)".into(),
            value: serde_json::json!(12.5),
            row_count: 3,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["kind"], "scalar");
        assert_eq!(json["label"], "SUM(Population)");
    }
}
