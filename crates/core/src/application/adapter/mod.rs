// Adapters - one pipeline function per external tool
//
// ReadConfig -> BuildArguments -> [skip] -> (SynthesizeInventory) -> EncodeAndSpawn
//   -> DrainOutput -> Reconcile -> Done, any failure -> Failed (error result, no retry)

pub mod clusterctl;
pub mod kpt;
pub mod live;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::arguments::{ArgumentBuilder, ArgumentPlan, ArgumentRules, BuildOutcome, SkipReason};
use super::encoder::{encode, StreamFormat};
use super::inventory::{InventoryKeys, InventorySynthesizer};
use super::router::OutputRouter;
use crate::domain::{FunctionResult, ObjectCollection, Severity};
use crate::error::{AppError, Result};
use crate::port::{ExecutionResult, LogSink, ProcessCommand, ProcessRunner};

/// When and how an adapter synthesizes an inventory object
#[derive(Debug, Clone, Copy)]
pub struct InventoryPolicy {
    pub keys: InventoryKeys,
    /// Route prefixes (e.g. `live`) that need an inventory
    pub route_prefixes: &'static [&'static str],
}

impl InventoryPolicy {
    fn applies_to(&self, plan: &ArgumentPlan) -> bool {
        plan.route_prefix
            .map(|prefix| self.route_prefixes.contains(&prefix))
            .unwrap_or(false)
    }
}

/// Static description of an adapter
#[derive(Debug, Clone, Copy)]
pub struct AdapterProfile {
    pub name: &'static str,
    /// Executable looked up on PATH
    pub binary: &'static str,
    pub rules: ArgumentRules,
    /// Where inline configuration is staged
    pub default_config_path: &'static str,
    /// Format of the stdin payload; `None` closes stdin without input
    pub input: Option<StreamFormat>,
    pub inventory: Option<InventoryPolicy>,
    pub usage: &'static str,
}

/// Available adapters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterKind {
    Clusterctl,
    Live,
    Kpt,
}

impl AdapterKind {
    pub const ALL: [AdapterKind; 3] = [AdapterKind::Clusterctl, AdapterKind::Live, AdapterKind::Kpt];

    pub fn profile(self) -> AdapterProfile {
        match self {
            AdapterKind::Clusterctl => clusterctl::profile(),
            AdapterKind::Live => live::profile(),
            AdapterKind::Kpt => kpt::profile(),
        }
    }

    pub fn name(self) -> &'static str {
        self.profile().name
    }
}

impl std::fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for AdapterKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        AdapterKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| AppError::Config(format!("unknown adapter '{}'", s)))
    }
}

/// Runtime overrides of a profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterSettings {
    pub binary: String,
    pub config_path: PathBuf,
    pub input_format: Option<StreamFormat>,
}

impl AdapterSettings {
    pub fn defaults(profile: &AdapterProfile) -> Self {
        Self {
            binary: profile.binary.to_string(),
            config_path: PathBuf::from(profile.default_config_path),
            input_format: profile.input,
        }
    }
}

/// How one adapter run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterOutcome {
    /// Nothing was invoked
    Skipped(SkipReason),
    /// The tool exited successfully; `ingested` objects were added
    Completed {
        result: ExecutionResult,
        ingested: usize,
    },
    /// An error result was attached to the collection
    Failed(String),
}

/// Config-to-process adapter
pub struct ExecAdapter {
    profile: AdapterProfile,
    settings: AdapterSettings,
    builder: ArgumentBuilder,
    runner: Arc<dyn ProcessRunner>,
    log: Arc<dyn LogSink>,
}

impl ExecAdapter {
    pub fn new(
        profile: AdapterProfile,
        settings: AdapterSettings,
        runner: Arc<dyn ProcessRunner>,
        log: Arc<dyn LogSink>,
    ) -> Self {
        let builder = ArgumentBuilder::new(profile.rules, settings.config_path.clone());
        Self {
            profile,
            settings,
            builder,
            runner,
            log,
        }
    }

    /// Adapter with default settings for `kind`
    pub fn for_kind(
        kind: AdapterKind,
        runner: Arc<dyn ProcessRunner>,
        log: Arc<dyn LogSink>,
    ) -> Self {
        let profile = kind.profile();
        let settings = AdapterSettings::defaults(&profile);
        Self::new(profile, settings, runner, log)
    }

    pub fn profile(&self) -> &AdapterProfile {
        &self.profile
    }

    /// Run the adapter over the collection
    ///
    /// Never fails: errors are logged and attached to the collection as an
    /// error result so the pipeline can go on.
    pub async fn run(&self, collection: &mut ObjectCollection) -> AdapterOutcome {
        match self.execute(collection).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(adapter = %self.profile.name, error = %e, "Adapter run failed");
                self.log
                    .error(&format!("{} run finished with error: {}", self.profile.name, e));
                collection.add_result(FunctionResult::general(&e, Severity::Error));
                AdapterOutcome::Failed(e.to_string())
            }
        }
    }

    async fn execute(&self, collection: &mut ObjectCollection) -> Result<AdapterOutcome> {
        let config = collection.function_config_map();

        let plan = match self.builder.build(config.as_ref()).await? {
            BuildOutcome::Invoke(plan) => plan,
            BuildOutcome::Skip(reason) => {
                self.log_skip(&reason);
                return Ok(AdapterOutcome::Skipped(reason));
            }
        };

        if let Some(policy) = self.profile.inventory.filter(|p| p.applies_to(&plan)) {
            InventorySynthesizer::new(policy.keys).ensure(
                collection,
                |key| plan.reserved(key),
                self.log.as_ref(),
            );
        }

        let mut command = ProcessCommand::new(&self.settings.binary, plan.args.clone());
        if let Some(format) = self.settings.input_format {
            command = command.with_stdin(encode(collection.items(), format)?);
        }

        debug!(
            adapter = %self.profile.name,
            stdin_format = ?self.settings.input_format,
            "Invoking external tool"
        );

        let router = OutputRouter::new(plan.stream_policy, self.log.as_ref());
        let result = self.runner.run(&command, &router).await?;

        let objects = router.finish();
        let ingested = objects.len();
        collection.insert(objects);

        info!(
            adapter = %self.profile.name,
            exit_code = result.exit_code,
            duration_ms = result.duration_ms,
            ingested,
            "External tool finished"
        );

        Ok(AdapterOutcome::Completed { result, ingested })
    }

    fn log_skip(&self, reason: &SkipReason) {
        match reason {
            SkipReason::NoConfig | SkipReason::MissingCommand => {
                info!(adapter = %self.profile.name, reason = %reason, "Nothing to run")
            }
            // Not reported as an error result: the function is a no-op
            SkipReason::UnrecognizedCommand(_) | SkipReason::InvalidCommand(_) => {
                warn!(adapter = %self.profile.name, reason = %reason, "Skipping invocation");
                self.log.warn(&format!(
                    "{}: skipping invocation, {}",
                    self.profile.name, reason
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::inventory::INVENTORY_LABEL;
    use crate::domain::KubernetesObject;
    use crate::port::log_sink::mocks::RecordingLogSink;
    use crate::port::process_runner::mocks::{MockBehavior, MockProcessRunner};
    use crate::port::LogLevel;

    fn function_config(data: &[(&str, &str)]) -> KubernetesObject {
        let mut doc = String::from("apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: fn\ndata:\n");
        for (k, v) in data {
            doc.push_str(&format!("  {:?}: {:?}\n", k, v));
        }
        KubernetesObject::from_value(serde_yaml::from_str(&doc).unwrap()).unwrap()
    }

    fn collection(data: &[(&str, &str)]) -> ObjectCollection {
        ObjectCollection::new(vec![KubernetesObject::new("apps/v1", "Deployment", "web")])
            .with_function_config(function_config(data))
    }

    fn adapter(kind: AdapterKind, runner: Arc<MockProcessRunner>, log: Arc<RecordingLogSink>) -> ExecAdapter {
        ExecAdapter::for_kind(kind, runner, log)
    }

    #[test]
    fn test_adapter_kind_from_str() {
        assert_eq!("kpt".parse::<AdapterKind>().unwrap(), AdapterKind::Kpt);
        assert_eq!("clusterctl".parse::<AdapterKind>().unwrap(), AdapterKind::Clusterctl);
        assert!("helm".parse::<AdapterKind>().is_err());
    }

    #[tokio::test]
    async fn test_missing_command_never_invokes() {
        let runner = Arc::new(MockProcessRunner::new_success());
        let log = Arc::new(RecordingLogSink::new());
        let mut items = collection(&[("--infrastructure", "openstack")]);

        let outcome = adapter(AdapterKind::Clusterctl, runner.clone(), log).run(&mut items).await;

        assert_eq!(outcome, AdapterOutcome::Skipped(SkipReason::MissingCommand));
        assert_eq!(runner.call_count(), 0);
        assert!(items.results().is_empty());
    }

    #[tokio::test]
    async fn test_no_function_config_never_invokes() {
        let runner = Arc::new(MockProcessRunner::new_success());
        let log = Arc::new(RecordingLogSink::new());
        let mut items = ObjectCollection::new(vec![]);

        let outcome = adapter(AdapterKind::Live, runner.clone(), log).run(&mut items).await;

        assert_eq!(outcome, AdapterOutcome::Skipped(SkipReason::NoConfig));
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unrecognized_command_is_silent_skip() {
        let runner = Arc::new(MockProcessRunner::new_success());
        let log = Arc::new(RecordingLogSink::new());
        let mut items = collection(&[("cmd", "unsupportedVerb")]);

        let outcome = adapter(AdapterKind::Kpt, runner.clone(), log.clone()).run(&mut items).await;

        assert!(matches!(outcome, AdapterOutcome::Skipped(SkipReason::UnrecognizedCommand(_))));
        assert_eq!(runner.call_count(), 0);
        assert!(items.results().is_empty());
        assert_eq!(log.at(LogLevel::Warn).len(), 1);
    }

    #[tokio::test]
    async fn test_nonzero_exit_becomes_error_result() {
        let runner = Arc::new(MockProcessRunner::new_exit(3));
        let log = Arc::new(RecordingLogSink::new());
        let mut items = collection(&[("cmd", "init")]);

        let outcome = adapter(AdapterKind::Clusterctl, runner, log.clone()).run(&mut items).await;

        assert!(matches!(outcome, AdapterOutcome::Failed(_)));
        assert_eq!(items.results().len(), 1);
        assert_eq!(items.results()[0].severity, Some(Severity::Error));
        assert!(items.results()[0].message.contains("error code: 3"));
        assert!(log.at(LogLevel::Error)[0].starts_with("clusterctl run finished with error"));
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_spawn_failure_becomes_error_result() {
        let runner = Arc::new(MockProcessRunner::new(MockBehavior::SpawnFail(
            "No such file or directory".to_string(),
        )));
        let log = Arc::new(RecordingLogSink::new());
        let mut items = collection(&[("cmd", "apply")]);

        let outcome = adapter(AdapterKind::Live, runner, log).run(&mut items).await;

        assert!(matches!(outcome, AdapterOutcome::Failed(_)));
        assert!(items.has_errors());
    }

    #[tokio::test]
    async fn test_streaming_disabled_keeps_collection() {
        let runner = Arc::new(MockProcessRunner::with_output(
            ["apiVersion: v1\n", "kind: ConfigMap\n", "metadata:\n", "  name: x\n"],
            Vec::<String>::new(),
        ));
        let log = Arc::new(RecordingLogSink::new());
        let mut items = collection(&[("cmd", "init")]);

        let outcome = adapter(AdapterKind::Clusterctl, runner, log.clone()).run(&mut items).await;

        assert!(matches!(outcome, AdapterOutcome::Completed { ingested: 0, .. }));
        assert_eq!(items.len(), 1);
        assert_eq!(
            log.at(LogLevel::Info),
            vec!["apiVersion: v1", "kind: ConfigMap", "metadata:", "  name: x"]
        );
    }

    #[tokio::test]
    async fn test_streaming_enabled_ingests_objects() {
        let runner = Arc::new(MockProcessRunner::with_output(
            [
                "apiVersion: cluster.x-k8s.io/v1beta1\nkind: Cluster\nmetadata:\n  name: capi\n",
                "---\n",
                "not-an-object: true\n",
                "---\n",
                "apiVersion: v1\nkind: Secret\nmetadata:\n  name: creds\n",
            ],
            ["generating\n"],
        ));
        let log = Arc::new(RecordingLogSink::new());
        let mut items = collection(&[("cmd", "generate cluster capi"), ("stdoutToPipeline", "true")]);

        let outcome = adapter(AdapterKind::Clusterctl, runner.clone(), log.clone()).run(&mut items).await;

        assert!(matches!(outcome, AdapterOutcome::Completed { ingested: 2, .. }));
        let kinds: Vec<_> = items.items().iter().filter_map(|o| o.kind()).collect();
        assert_eq!(kinds, vec!["Deployment", "Cluster", "Secret"]);
        assert_eq!(log.at(LogLevel::Error), vec!["generating"]);
        assert_eq!(runner.calls()[0].args, vec!["generate", "cluster", "capi"]);
        assert!(runner.calls()[0].stdin.is_none());
    }

    #[tokio::test]
    async fn test_live_feeds_collection_on_stdin() {
        let runner = Arc::new(MockProcessRunner::new_success());
        let log = Arc::new(RecordingLogSink::new());
        let mut items = collection(&[("cmd", "apply"), ("reconcile-timeout", "2m")]);

        adapter(AdapterKind::Live, runner.clone(), log).run(&mut items).await;

        let call = &runner.calls()[0];
        assert_eq!(call.program, "kpt");
        assert_eq!(call.args, vec!["live", "apply", "--reconcile-timeout", "2m"]);
        let stdin = call.stdin.as_deref().unwrap();
        assert!(stdin.contains("kind: ResourceList"));
        assert!(stdin.contains("name: web"));
    }

    #[tokio::test]
    async fn test_kpt_apply_synthesizes_inventory_before_encoding() {
        let runner = Arc::new(MockProcessRunner::new_success());
        let log = Arc::new(RecordingLogSink::new());
        let mut items = collection(&[
            ("cmd", "apply"),
            ("path", "-"),
            ("inventoryName", "inv-1"),
            ("inventoryNamespace", "default"),
            ("inventoryId", "id-1"),
        ]);

        adapter(AdapterKind::Kpt, runner.clone(), log).run(&mut items).await;

        let call = &runner.calls()[0];
        assert_eq!(call.args, vec!["live", "apply", "-"]);
        assert!(call.stdin.as_deref().unwrap().contains(INVENTORY_LABEL));
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_kpt_fn_route_skips_inventory() {
        let runner = Arc::new(MockProcessRunner::new_success());
        let log = Arc::new(RecordingLogSink::new());
        let mut items = collection(&[
            ("cmd", "source"),
            ("path", "./pkg"),
            ("inventoryName", "inv-1"),
            ("inventoryNamespace", "default"),
            ("inventoryId", "id-1"),
        ]);

        adapter(AdapterKind::Kpt, runner.clone(), log).run(&mut items).await;

        assert_eq!(runner.calls()[0].args, vec!["fn", "source", "./pkg"]);
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_function_config_is_not_mutated() {
        let runner = Arc::new(MockProcessRunner::new_success());
        let log = Arc::new(RecordingLogSink::new());
        let mut items = collection(&[("cmd", "apply"), ("stdoutToPipeline", "true")]);
        let before = items.function_config().cloned();

        adapter(AdapterKind::Kpt, runner, log).run(&mut items).await;

        assert_eq!(items.function_config().cloned(), before);
    }
}
