//! Prior-step state reconstruction.
//!
//! Walks a job's parent chain (most recent first) and produces the snapshot
//! array a bridge runtime receives at execution time. The walk is sequential
//! by nature: each node is only reachable through its parent, so cost is
//! bounded by chain depth.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::warn;

use notiflow_types::{DigestEvent, Job, SnapshotOutput, SnapshotState, StepSnapshot, StepType};

use crate::error::EngineError;
use crate::stores::{DeliveryRecordStore, JobStore};

/// Rebuilds the prior-step state array for a job about to execute.
pub struct StepStateBuilder {
    jobs: Arc<dyn JobStore>,
    deliveries: Arc<dyn DeliveryRecordStore>,
}

impl StepStateBuilder {
    pub fn new(jobs: Arc<dyn JobStore>, deliveries: Arc<dyn DeliveryRecordStore>) -> Self {
        Self { jobs, deliveries }
    }

    /// Snapshots of every previously executed step, most recent first.
    pub async fn build_state(&self, job: &Job) -> Result<Vec<StepSnapshot>, EngineError> {
        let mut snapshots = Vec::new();
        let mut cursor = job.parent_id.clone();
        while let Some(parent_id) = cursor {
            let Some(parent) = self.jobs.job(&parent_id).await? else {
                warn!(job_id = %parent_id, "job chain references a missing parent; truncating state");
                break;
            };
            snapshots.push(self.snapshot(&parent).await?);
            cursor = parent.parent_id.clone();
        }
        Ok(snapshots)
    }

    async fn snapshot(&self, job: &Job) -> Result<StepSnapshot, EngineError> {
        let outputs = match job.step_type {
            StepType::Delay => SnapshotOutput::Delay {
                duration_ms: (Utc::now() - job.created_at).num_milliseconds(),
            },
            StepType::Digest => {
                let mut events = vec![DigestEvent {
                    id: job.id.clone(),
                    time: job.created_at,
                    payload: job.payload.clone(),
                }];
                for merged in self.jobs.jobs(&job.digested_job_ids).await? {
                    events.push(DigestEvent {
                        id: merged.id.clone(),
                        time: merged.created_at,
                        payload: merged.payload.clone(),
                    });
                }
                events.sort_by_key(|event| event.time);
                SnapshotOutput::Digest { events }
            }
            StepType::InApp => {
                let record = self.deliveries.find_by_job(&job.id).await?.unwrap_or_default();
                SnapshotOutput::InApp {
                    seen: record.seen,
                    read: record.read,
                    last_seen_date: record.last_seen_date,
                    last_read_date: record.last_read_date,
                }
            }
            StepType::Custom => SnapshotOutput::Custom(job.output.clone().unwrap_or(Value::Null)),
            StepType::Email | StepType::Sms | StepType::Push | StepType::Chat => SnapshotOutput::Empty {},
        };

        Ok(StepSnapshot {
            step_id: job.step_id.clone(),
            outputs,
            state: SnapshotState {
                status: job.status,
                error: job.error.clone(),
            },
        })
    }
}
