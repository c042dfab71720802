//! Workflow reconciliation (sync).
//!
//! Sync makes the persisted BRIDGE/ECHO workflow set of an environment
//! mirror the latest discovered set without losing identity: a step whose
//! `step_id` survives keeps its template id (and therefore its stored
//! control values), a workflow authored through the management UI is never
//! overwritten, and anything no longer discovered is disposed.
//!
//! Batch policy: each discovered workflow is reconciled independently.
//! A failing workflow does not roll back writes already committed for other
//! workflows in the same batch, but the disposal sweep and the bridge-URL
//! write run only when the whole batch succeeded.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use notiflow_transport::validate_bridge_url;
use notiflow_types::{
    Environment, FieldUpdate, PersistedStep, PersistedWorkflow, StepDefinition, WorkflowDefinition, WorkflowKind,
    WorkflowOrigin, WorkflowPreferences,
};

use crate::error::EngineError;
use crate::stores::{
    ControlValuesStore, EnvironmentStore, NotificationGroupStore, PreferencesService, WorkflowDisposer, WorkflowStore,
};

/// Fallback notification group resolved when a discovered workflow does not
/// specify one.
pub const DEFAULT_GROUP_NAME: &str = "General";

/// Reconciles discovered workflow definitions against durable records.
pub struct WorkflowReconciler {
    workflows: Arc<dyn WorkflowStore>,
    groups: Arc<dyn NotificationGroupStore>,
    controls: Arc<dyn ControlValuesStore>,
    preferences: Arc<dyn PreferencesService>,
    environments: Arc<dyn EnvironmentStore>,
    disposer: Arc<dyn WorkflowDisposer>,
}

impl WorkflowReconciler {
    pub fn new(
        workflows: Arc<dyn WorkflowStore>,
        groups: Arc<dyn NotificationGroupStore>,
        controls: Arc<dyn ControlValuesStore>,
        preferences: Arc<dyn PreferencesService>,
        environments: Arc<dyn EnvironmentStore>,
        disposer: Arc<dyn WorkflowDisposer>,
    ) -> Self {
        Self {
            workflows,
            groups,
            controls,
            preferences,
            environments,
            disposer,
        }
    }

    /// Synchronizes one environment against a discovered definition set.
    ///
    /// Returns the created/updated workflows. The caller guarantees at most
    /// one in-flight sync per environment; concurrent syncs race on the
    /// stored bridge URL and the disposal sweep.
    pub async fn sync(
        &self,
        environment: &Environment,
        bridge_url: &str,
        discovered: Vec<WorkflowDefinition>,
    ) -> Result<Vec<PersistedWorkflow>, EngineError> {
        validate_bridge_url(bridge_url, environment.production)?;

        let mut kept = Vec::with_capacity(discovered.len());
        let mut first_failure: Option<EngineError> = None;
        for definition in discovered {
            let workflow_id = definition.workflow_id.clone();
            match self.reconcile_workflow(environment, definition).await {
                Ok(workflow) => kept.push(workflow),
                Err(error) => {
                    warn!(
                        environment_id = %environment.id,
                        workflow_id = %workflow_id,
                        %error,
                        "workflow reconciliation failed"
                    );
                    if first_failure.is_none() {
                        first_failure = Some(error);
                    }
                }
            }
        }

        // Committed writes stay; disposal and the URL write are skipped so a
        // retried sync sees the same starting point.
        if let Some(error) = first_failure {
            return Err(error);
        }

        self.dispose_unkept(environment, &kept).await?;
        self.environments.store_bridge_url(&environment.id, bridge_url).await?;
        info!(
            environment_id = %environment.id,
            workflows = kept.len(),
            "bridge sync completed"
        );
        Ok(kept)
    }

    /// Creates or updates the durable record for one discovered workflow.
    async fn reconcile_workflow(
        &self,
        environment: &Environment,
        definition: WorkflowDefinition,
    ) -> Result<PersistedWorkflow, EngineError> {
        let existing = self
            .workflows
            .find_by_trigger(&environment.id, &definition.workflow_id)
            .await?;

        if let Some(existing) = &existing
            && existing.origin == Some(WorkflowOrigin::ManagementUi)
        {
            return Err(EngineError::TriggerCollision(definition.workflow_id));
        }

        let overlay = definition.preferences.clone();
        let persisted = match existing {
            Some(existing) => self.update_workflow(environment, existing, definition).await?,
            None => self.create_workflow(environment, definition).await?,
        };

        if let Some(overlay) = overlay
            && !overlay.is_empty()
        {
            self.preferences
                .upsert_workflow_preferences(&environment.id, &persisted.id, &persisted.preferences)
                .await?;
        }

        Ok(persisted)
    }

    async fn update_workflow(
        &self,
        environment: &Environment,
        mut workflow: PersistedWorkflow,
        definition: WorkflowDefinition,
    ) -> Result<PersistedWorkflow, EngineError> {
        debug!(
            environment_id = %environment.id,
            workflow_id = %workflow.id,
            trigger = %definition.workflow_id,
            "updating workflow from discovery"
        );

        let (steps, dropped_template_ids) = rebind_steps(&workflow.steps, &definition.steps);
        for template_id in &dropped_template_ids {
            self.controls.delete(&environment.id, &workflow.id, template_id).await?;
        }

        workflow.name = definition.name.clone().unwrap_or_else(|| definition.workflow_id.clone());
        FieldUpdate::mirror(definition.description.clone()).apply(&mut workflow.description);
        workflow.tags = definition.tags.clone();
        workflow.steps = steps;
        workflow.payload_schema = definition.payload.clone();
        workflow.controls_schema = definition.controls.clone();
        if let Some(overlay) = &definition.preferences {
            workflow.preferences = overlay.merged_over(&workflow.preferences);
        }
        workflow.raw_discovery = serde_json::to_value(&definition).ok();

        Ok(self.workflows.update(workflow).await?)
    }

    async fn create_workflow(
        &self,
        environment: &Environment,
        definition: WorkflowDefinition,
    ) -> Result<PersistedWorkflow, EngineError> {
        let group = self
            .groups
            .find_by_name(&environment.id, DEFAULT_GROUP_NAME)
            .await?
            .ok_or_else(|| EngineError::MissingNotificationGroup {
                environment_id: environment.id.clone(),
                group_name: DEFAULT_GROUP_NAME.to_string(),
            })?;

        debug!(
            environment_id = %environment.id,
            trigger = %definition.workflow_id,
            "creating workflow from discovery"
        );

        let workflow = PersistedWorkflow {
            id: Uuid::new_v4().to_string(),
            environment_id: environment.id.clone(),
            trigger_identifier: definition.workflow_id.clone(),
            origin: Some(WorkflowOrigin::External),
            kind: WorkflowKind::Bridge,
            name: definition.name.clone().unwrap_or_else(|| definition.workflow_id.clone()),
            description: definition.description.clone(),
            tags: definition.tags.clone(),
            steps: rebind_steps(&[], &definition.steps).0,
            payload_schema: definition.payload.clone(),
            controls_schema: definition.controls.clone(),
            preferences: definition
                .preferences
                .as_ref()
                .map(|overlay| overlay.merged_over(&WorkflowPreferences::default()))
                .unwrap_or_default(),
            notification_group_id: Some(group.id),
            active: true,
            draft: false,
            raw_discovery: serde_json::to_value(&definition).ok(),
            deleted: false,
        };

        Ok(self.workflows.insert(workflow).await?)
    }

    /// Disposes every bridge-managed workflow of the environment that the
    /// latest discovery no longer reports.
    async fn dispose_unkept(&self, environment: &Environment, kept: &[PersistedWorkflow]) -> Result<(), EngineError> {
        let kept_ids: HashSet<&str> = kept.iter().map(|w| w.id.as_str()).collect();
        for workflow in self.workflows.list_bridge_managed(&environment.id).await? {
            let sync_owned = matches!(workflow.origin, Some(WorkflowOrigin::External) | None);
            if sync_owned && !kept_ids.contains(workflow.id.as_str()) {
                info!(
                    environment_id = %environment.id,
                    workflow_id = %workflow.id,
                    trigger = %workflow.trigger_identifier,
                    "disposing workflow no longer discovered"
                );
                self.disposer.dispose(&environment.id, &workflow.id).await?;
            }
        }
        Ok(())
    }
}

/// Rebinds persisted steps to a new discovered step list.
///
/// Matching is by `step_id`, not position: a matched step keeps its template
/// id, an unmatched discovered step gets a fresh one. Returns the new step
/// list plus the template ids that no longer have a discovered counterpart.
fn rebind_steps(existing: &[PersistedStep], discovered: &[StepDefinition]) -> (Vec<PersistedStep>, Vec<String>) {
    let steps: Vec<PersistedStep> = discovered
        .iter()
        .map(|definition| {
            let matched = existing.iter().find(|step| step.step_id == definition.step_id);
            PersistedStep {
                template_id: matched
                    .map(|step| step.template_id.clone())
                    .unwrap_or_else(|| Uuid::new_v4().to_string()),
                step_id: definition.step_id.clone(),
                step_type: definition.step_type,
                name: definition.step_id.clone(),
                controls_schema: definition.controls.clone(),
                fail_on_error: definition.options.fail_on_error_enabled.unwrap_or(false),
            }
        })
        .collect();

    let kept_templates: HashSet<&str> = steps.iter().map(|step| step.template_id.as_str()).collect();
    let dropped = existing
        .iter()
        .filter(|step| !kept_templates.contains(step.template_id.as_str()))
        .map(|step| step.template_id.clone())
        .collect();

    (steps, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{
        InMemoryControlValuesStore, InMemoryEnvironmentStore, InMemoryNotificationGroupStore, InMemoryPreferencesService,
        InMemoryWorkflowStore, RecordingDisposer,
    };
    use notiflow_types::{ChannelPreference, ControlValuesRecord, NotificationGroup, StepOptions, StepType};
    use serde_json::json;

    struct Fixture {
        workflows: Arc<InMemoryWorkflowStore>,
        groups: Arc<InMemoryNotificationGroupStore>,
        controls: Arc<InMemoryControlValuesStore>,
        preferences: Arc<InMemoryPreferencesService>,
        environments: Arc<InMemoryEnvironmentStore>,
        disposer: Arc<RecordingDisposer>,
        reconciler: WorkflowReconciler,
    }

    fn fixture() -> Fixture {
        let workflows = Arc::new(InMemoryWorkflowStore::default());
        let groups = Arc::new(InMemoryNotificationGroupStore::default());
        let controls = Arc::new(InMemoryControlValuesStore::default());
        let preferences = Arc::new(InMemoryPreferencesService::default());
        let environments = Arc::new(InMemoryEnvironmentStore::default());
        let disposer = Arc::new(RecordingDisposer::default());

        groups.seed(NotificationGroup {
            id: "group-general".into(),
            environment_id: "env-1".into(),
            name: DEFAULT_GROUP_NAME.into(),
        });

        let reconciler = WorkflowReconciler::new(
            workflows.clone(),
            groups.clone(),
            controls.clone(),
            preferences.clone(),
            environments.clone(),
            disposer.clone(),
        );

        Fixture {
            workflows,
            groups,
            controls,
            preferences,
            environments,
            disposer,
            reconciler,
        }
    }

    fn environment() -> Environment {
        Environment {
            id: "env-1".into(),
            name: "Development".into(),
            bridge_url: None,
            production: false,
        }
    }

    fn step(step_id: &str, step_type: StepType) -> StepDefinition {
        StepDefinition {
            step_id: step_id.into(),
            step_type,
            controls: None,
            outputs: None,
            results: None,
            options: StepOptions::default(),
        }
    }

    fn definition(workflow_id: &str, steps: Vec<StepDefinition>) -> WorkflowDefinition {
        WorkflowDefinition {
            workflow_id: workflow_id.into(),
            name: None,
            description: None,
            tags: Vec::new(),
            steps,
            payload: None,
            controls: None,
            preferences: None,
        }
    }

    const BRIDGE_URL: &str = "https://bridge.example.com/api";

    #[tokio::test]
    async fn empty_discovery_stores_bridge_url() {
        let fx = fixture();

        let created = fx.reconciler.sync(&environment(), BRIDGE_URL, vec![]).await.expect("sync succeeds");

        assert!(created.is_empty());
        assert!(fx.workflows.is_empty());
        assert_eq!(fx.environments.bridge_url("env-1").as_deref(), Some(BRIDGE_URL));
    }

    #[tokio::test]
    async fn creates_workflow_with_default_group() {
        let fx = fixture();
        let discovered = vec![definition("hello-world", vec![step("send-email", StepType::Email)])];

        let created = fx.reconciler.sync(&environment(), BRIDGE_URL, discovered).await.expect("sync succeeds");

        assert_eq!(created.len(), 1);
        let workflow = &created[0];
        assert_eq!(workflow.name, "hello-world");
        assert_eq!(workflow.trigger_identifier, "hello-world");
        assert_eq!(workflow.origin, Some(WorkflowOrigin::External));
        assert_eq!(workflow.kind, WorkflowKind::Bridge);
        assert_eq!(workflow.notification_group_id.as_deref(), Some("group-general"));
        assert_eq!(workflow.steps.len(), 1);
        assert_eq!(workflow.steps[0].step_id, "send-email");
    }

    #[tokio::test]
    async fn missing_default_group_fails_create() {
        let fx = fixture();
        let other_env = Environment {
            id: "env-2".into(),
            ..environment()
        };
        let discovered = vec![definition("hello-world", vec![])];

        let error = fx
            .reconciler
            .sync(&other_env, BRIDGE_URL, discovered)
            .await
            .expect_err("no group in env-2");
        assert!(matches!(error, EngineError::MissingNotificationGroup { .. }));
        assert!(fx.environments.bridge_url("env-2").is_none(), "bridge URL must not be stored");
    }

    #[tokio::test]
    async fn resync_is_idempotent() {
        let fx = fixture();
        let discovered = vec![definition("hello-world", vec![step("send-email", StepType::Email)])];

        let first = fx
            .reconciler
            .sync(&environment(), BRIDGE_URL, discovered.clone())
            .await
            .expect("first sync");
        let second = fx.reconciler.sync(&environment(), BRIDGE_URL, discovered).await.expect("second sync");

        assert_eq!(fx.workflows.len(), 1, "no duplicate record");
        assert_eq!(first[0].id, second[0].id);
        assert_eq!(first[0].steps[0].template_id, second[0].steps[0].template_id);
        assert!(fx.disposer.disposed().is_empty());
    }

    #[tokio::test]
    async fn rename_updates_name_but_not_trigger() {
        let fx = fixture();
        fx.reconciler
            .sync(&environment(), BRIDGE_URL, vec![definition("hello-world", vec![])])
            .await
            .expect("first sync");

        let mut renamed = definition("hello-world", vec![]);
        renamed.name = Some("My Workflow".into());
        let updated = fx
            .reconciler
            .sync(&environment(), BRIDGE_URL, vec![renamed])
            .await
            .expect("second sync");

        assert_eq!(updated[0].name, "My Workflow");
        assert_eq!(updated[0].trigger_identifier, "hello-world");
    }

    #[tokio::test]
    async fn description_mirrors_discovery() {
        let fx = fixture();
        let mut described = definition("hello-world", vec![]);
        described.description = Some("original copy".into());
        fx.reconciler
            .sync(&environment(), BRIDGE_URL, vec![described])
            .await
            .expect("first sync");

        let updated = fx
            .reconciler
            .sync(&environment(), BRIDGE_URL, vec![definition("hello-world", vec![])])
            .await
            .expect("second sync");
        assert_eq!(updated[0].description, None, "absent discovered description clears the field");
    }

    #[tokio::test]
    async fn reordered_steps_keep_template_ids_and_controls() {
        let fx = fixture();
        let discovered = vec![definition(
            "hello-world",
            vec![step("send-email", StepType::Email), step("send-sms", StepType::Sms)],
        )];
        let first = fx
            .reconciler
            .sync(&environment(), BRIDGE_URL, discovered)
            .await
            .expect("first sync");
        let email_template = first[0]
            .steps
            .iter()
            .find(|s| s.step_id == "send-email")
            .expect("email step")
            .template_id
            .clone();
        fx.controls.seed(ControlValuesRecord {
            id: "cv-1".into(),
            environment_id: "env-1".into(),
            workflow_id: first[0].id.clone(),
            step_template_id: email_template.clone(),
            controls: json!({"subject": "hi"}),
        });

        // Reorder and extend the step list.
        let reordered = vec![definition(
            "hello-world",
            vec![
                step("send-sms", StepType::Sms),
                step("send-push", StepType::Push),
                step("send-email", StepType::Email),
            ],
        )];
        let second = fx
            .reconciler
            .sync(&environment(), BRIDGE_URL, reordered)
            .await
            .expect("second sync");

        let email_step = second[0].steps.iter().find(|s| s.step_id == "send-email").expect("email step");
        assert_eq!(email_step.template_id, email_template, "template id survives reorder");
        assert_eq!(fx.controls.all().len(), 1, "stored controls survive");
        assert_eq!(second[0].steps.len(), 3);
    }

    #[tokio::test]
    async fn dropped_steps_lose_their_control_values() {
        let fx = fixture();
        let first = fx
            .reconciler
            .sync(
                &environment(),
                BRIDGE_URL,
                vec![definition("hello-world", vec![step("send-email", StepType::Email)])],
            )
            .await
            .expect("first sync");
        fx.controls.seed(ControlValuesRecord {
            id: "cv-1".into(),
            environment_id: "env-1".into(),
            workflow_id: first[0].id.clone(),
            step_template_id: first[0].steps[0].template_id.clone(),
            controls: json!({"subject": "hi"}),
        });

        fx.reconciler
            .sync(
                &environment(),
                BRIDGE_URL,
                vec![definition("hello-world", vec![step("send-sms", StepType::Sms)])],
            )
            .await
            .expect("second sync");

        assert!(fx.controls.all().is_empty(), "controls of removed steps are deleted");
    }

    #[tokio::test]
    async fn management_ui_workflow_is_protected() {
        let fx = fixture();
        let ui_workflow = PersistedWorkflow {
            id: "wf-ui".into(),
            environment_id: "env-1".into(),
            trigger_identifier: "hello-world".into(),
            origin: Some(WorkflowOrigin::ManagementUi),
            kind: WorkflowKind::Other,
            name: "Dashboard authored".into(),
            description: Some("hand made".into()),
            tags: vec!["ui".into()],
            steps: Vec::new(),
            payload_schema: None,
            controls_schema: None,
            preferences: WorkflowPreferences::default(),
            notification_group_id: None,
            active: true,
            draft: false,
            raw_discovery: None,
            deleted: false,
        };
        fx.workflows.seed(ui_workflow.clone());

        let error = fx
            .reconciler
            .sync(&environment(), BRIDGE_URL, vec![definition("hello-world", vec![])])
            .await
            .expect_err("collision must fail");

        assert!(matches!(&error, EngineError::TriggerCollision(id) if id == "hello-world"));
        assert!(error.to_string().contains("already created"));
        assert_eq!(fx.workflows.get("wf-ui").expect("record still there"), ui_workflow, "record untouched");
        assert!(fx.environments.bridge_url("env-1").is_none(), "bridge URL write skipped");
        assert!(fx.disposer.disposed().is_empty(), "disposal skipped");
    }

    #[tokio::test]
    async fn collision_does_not_roll_back_other_workflows() {
        let fx = fixture();
        fx.workflows.seed(PersistedWorkflow {
            id: "wf-ui".into(),
            environment_id: "env-1".into(),
            trigger_identifier: "taken".into(),
            origin: Some(WorkflowOrigin::ManagementUi),
            kind: WorkflowKind::Other,
            name: "Dashboard authored".into(),
            description: None,
            tags: Vec::new(),
            steps: Vec::new(),
            payload_schema: None,
            controls_schema: None,
            preferences: WorkflowPreferences::default(),
            notification_group_id: None,
            active: true,
            draft: false,
            raw_discovery: None,
            deleted: false,
        });

        let discovered = vec![definition("survivor", vec![]), definition("taken", vec![])];
        let error = fx
            .reconciler
            .sync(&environment(), BRIDGE_URL, discovered)
            .await
            .expect_err("collision must surface");

        assert!(matches!(error, EngineError::TriggerCollision(_)));
        assert_eq!(fx.workflows.len(), 2, "survivor stays persisted");
    }

    #[tokio::test]
    async fn undiscovered_workflows_are_disposed() {
        let fx = fixture();
        fx.reconciler
            .sync(
                &environment(),
                BRIDGE_URL,
                vec![definition("keep-me", vec![]), definition("drop-me", vec![])],
            )
            .await
            .expect("first sync");

        let kept = fx
            .reconciler
            .sync(&environment(), BRIDGE_URL, vec![definition("keep-me", vec![])])
            .await
            .expect("second sync");

        assert_eq!(kept.len(), 1);
        let disposed = fx.disposer.disposed();
        assert_eq!(disposed.len(), 1);
        let dropped = fx
            .workflows
            .find_by_trigger("env-1", "drop-me")
            .await
            .expect("lookup")
            .expect("record exists");
        assert_eq!(disposed[0], dropped.id);
    }

    #[tokio::test]
    async fn ui_workflows_are_never_disposed() {
        let fx = fixture();
        fx.workflows.seed(PersistedWorkflow {
            id: "wf-ui".into(),
            environment_id: "env-1".into(),
            trigger_identifier: "dashboard-only".into(),
            origin: Some(WorkflowOrigin::ManagementUi),
            kind: WorkflowKind::Bridge,
            name: "Dashboard authored".into(),
            description: None,
            tags: Vec::new(),
            steps: Vec::new(),
            payload_schema: None,
            controls_schema: None,
            preferences: WorkflowPreferences::default(),
            notification_group_id: None,
            active: true,
            draft: false,
            raw_discovery: None,
            deleted: false,
        });

        fx.reconciler.sync(&environment(), BRIDGE_URL, vec![]).await.expect("sync succeeds");

        assert!(fx.disposer.disposed().is_empty());
    }

    #[tokio::test]
    async fn unset_origin_workflows_are_disposed() {
        let fx = fixture();
        fx.workflows.seed(PersistedWorkflow {
            id: "wf-legacy".into(),
            environment_id: "env-1".into(),
            trigger_identifier: "legacy".into(),
            origin: None,
            kind: WorkflowKind::Echo,
            name: "legacy".into(),
            description: None,
            tags: Vec::new(),
            steps: Vec::new(),
            payload_schema: None,
            controls_schema: None,
            preferences: WorkflowPreferences::default(),
            notification_group_id: None,
            active: true,
            draft: false,
            raw_discovery: None,
            deleted: false,
        });

        fx.reconciler.sync(&environment(), BRIDGE_URL, vec![]).await.expect("sync succeeds");

        assert_eq!(fx.disposer.disposed(), vec!["wf-legacy".to_string()]);
    }

    #[tokio::test]
    async fn preferences_are_upserted_as_partial_overlay() {
        let fx = fixture();
        let mut with_prefs = definition("hello-world", vec![]);
        with_prefs.preferences = Some(WorkflowPreferences {
            all: Some(ChannelPreference {
                enabled: Some(true),
                read_only: Some(false),
            }),
            channels: Default::default(),
        });
        fx.reconciler
            .sync(&environment(), BRIDGE_URL, vec![with_prefs])
            .await
            .expect("first sync");

        // Second sync overlays only read_only; enabled must survive.
        let mut overlay = definition("hello-world", vec![]);
        overlay.preferences = Some(WorkflowPreferences {
            all: Some(ChannelPreference {
                enabled: None,
                read_only: Some(true),
            }),
            channels: Default::default(),
        });
        let updated = fx
            .reconciler
            .sync(&environment(), BRIDGE_URL, vec![overlay])
            .await
            .expect("second sync");

        let all = updated[0].preferences.all.expect("all channel prefs");
        assert_eq!(all.enabled, Some(true));
        assert_eq!(all.read_only, Some(true));

        let upserted = fx.preferences.latest(&updated[0].id).expect("upsert recorded");
        assert_eq!(upserted.all.expect("all").enabled, Some(true));
    }

    #[tokio::test]
    async fn invalid_bridge_url_fails_before_any_write() {
        let fx = fixture();
        let error = fx
            .reconciler
            .sync(&environment(), "not a url", vec![definition("hello-world", vec![])])
            .await
            .expect_err("must fail");
        assert!(matches!(error, EngineError::Bridge(_)));
        assert!(fx.workflows.is_empty());
    }

    #[tokio::test]
    async fn group_lookup_is_scoped_to_environment() {
        let fx = fixture();
        // Seed a group for a different environment; env-1's own group exists
        // from the fixture, so creation succeeds only there.
        fx.groups.seed(NotificationGroup {
            id: "group-other".into(),
            environment_id: "env-9".into(),
            name: DEFAULT_GROUP_NAME.into(),
        });

        let created = fx
            .reconciler
            .sync(&environment(), BRIDGE_URL, vec![definition("hello-world", vec![])])
            .await
            .expect("sync succeeds");
        assert_eq!(created[0].notification_group_id.as_deref(), Some("group-general"));
    }
}
