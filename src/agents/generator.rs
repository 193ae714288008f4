//! Generative task source and the no-op generation runner.
//!
//! The source synthesizes device tasks from a built-in template set,
//! picking a template at random (or deterministically when seeded) and
//! stamping each instance with a uuid that is guaranteed unique within
//! the run.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use rand::{RngExt, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::harness::result::TaskResult;

use super::error::{AgentError, AgentResult};
use super::{GenerationStats, TaskDescription, TaskRunner, TaskSource};

/// A task template the generative source instantiates from.
#[derive(Debug, Clone)]
struct TaskTemplate {
    name: &'static str,
    task_type: &'static str,
    description: &'static str,
    expected_outcome: &'static str,
}

/// Candidate packages used to randomize navigation tasks.
const NAVIGATION_PACKAGES: &[&str] = &[
    "com.android.settings",
    "com.android.vending",
    "com.google.android.apps.maps",
    "com.whatsapp",
    "com.instagram.android",
];

fn builtin_templates() -> Vec<TaskTemplate> {
    vec![
        TaskTemplate {
            name: "Open App",
            task_type: "navigation",
            description: "Open a specific application on the device",
            expected_outcome: "Settings app should open successfully",
        },
        TaskTemplate {
            name: "Navigate to Settings",
            task_type: "navigation",
            description: "Navigate to device settings menu",
            expected_outcome: "Should reach System settings menu",
        },
        TaskTemplate {
            name: "Check WiFi Status",
            task_type: "information_gathering",
            description: "Check the current WiFi connection status",
            expected_outcome: "Should return WiFi connection information",
        },
        TaskTemplate {
            name: "Install App",
            task_type: "installation",
            description: "Install an application from APK file",
            expected_outcome: "App should install successfully",
        },
        TaskTemplate {
            name: "Uninstall App",
            task_type: "removal",
            description: "Uninstall a specific application",
            expected_outcome: "App should be removed from device",
        },
        TaskTemplate {
            name: "Take Screenshot",
            task_type: "capture",
            description: "Capture a screenshot of the current screen",
            expected_outcome: "Screenshot should be saved successfully",
        },
        TaskTemplate {
            name: "Check Battery Level",
            task_type: "information_gathering",
            description: "Get current battery level and status",
            expected_outcome: "Should return battery percentage and charging status",
        },
        TaskTemplate {
            name: "Clear App Data",
            task_type: "maintenance",
            description: "Clear data for a specific application",
            expected_outcome: "App data should be cleared successfully",
        },
    ]
}

/// Task source that generates device tasks from built-in templates.
pub struct TemplateTaskSource {
    templates: Vec<TaskTemplate>,
    rng: ChaCha8Rng,
    issued_ids: HashSet<String>,
    produced_names: Vec<String>,
    type_counts: HashMap<String, usize>,
}

impl TemplateTaskSource {
    /// Creates a source with a randomly seeded rng.
    pub fn new() -> Self {
        Self::with_rng(ChaCha8Rng::from_rng(&mut rand::rng()))
    }

    /// Creates a source with a fixed seed for reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(rng: ChaCha8Rng) -> Self {
        Self {
            templates: builtin_templates(),
            rng,
            issued_ids: HashSet::new(),
            produced_names: Vec::new(),
            type_counts: HashMap::new(),
        }
    }

    /// Fills in the task-type specific parameters for an instance.
    fn instantiate_parameters(&mut self, template: &TaskTemplate) -> HashMap<String, serde_json::Value> {
        let mut parameters: HashMap<String, serde_json::Value> = HashMap::new();

        match template.task_type {
            "navigation" => {
                // Randomize the target package for variety across episodes.
                let package = NAVIGATION_PACKAGES
                    .choose(&mut self.rng)
                    .copied()
                    .unwrap_or("com.android.settings");
                parameters.insert("package_name".to_string(), json!(package));
            }
            "information_gathering" => {
                let check_type = if template.name == "Check Battery Level" {
                    "battery_info"
                } else {
                    "wifi_status"
                };
                parameters.insert("check_type".to_string(), json!(check_type));
            }
            "installation" => {
                parameters.insert("apk_path".to_string(), json!("/sdcard/test_app.apk"));
                parameters.insert("package_name".to_string(), json!("com.example.testapp"));
            }
            "removal" => {
                parameters.insert("package_name".to_string(), json!("com.example.testapp"));
            }
            "capture" => {
                parameters.insert("output_path".to_string(), json!("/sdcard/screenshot.png"));
                parameters.insert("format".to_string(), json!("PNG"));
            }
            "maintenance" => {
                parameters.insert("package_name".to_string(), json!("com.android.settings"));
                parameters.insert("data_types".to_string(), json!(["cache", "user_data"]));
            }
            _ => {}
        }

        parameters
    }
}

impl Default for TemplateTaskSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskSource for TemplateTaskSource {
    fn name(&self) -> &str {
        "templates"
    }

    fn produce(&mut self) -> AgentResult<TaskDescription> {
        let template = self
            .templates
            .choose(&mut self.rng)
            .cloned()
            .ok_or_else(|| AgentError::GenerationFailed("no templates loaded".to_string()))?;

        // uuid collisions are not expected, but the id uniqueness contract
        // is per-run, so check against the registry anyway.
        let mut task_id = Uuid::new_v4().to_string();
        while !self.issued_ids.insert(task_id.clone()) {
            task_id = Uuid::new_v4().to_string();
        }

        let parameters = self.instantiate_parameters(&template);

        let mut task = TaskDescription::new(task_id, template.name, template.task_type)
            .with_description(template.description)
            .with_expected_outcome(template.expected_outcome);
        task.parameters = parameters;
        task.priority = self.rng.random_range(1..=5);
        task.timeout_secs = self.rng.random_range(30..=120);
        task.retry_count = self.rng.random_range(0..=2);

        self.produced_names.push(task.name.clone());
        *self.type_counts.entry(task.task_type.clone()).or_insert(0) += 1;

        info!("Generated task: {} (ID: {})", task.name, task.id);
        Ok(task)
    }

    fn generation_stats(&self) -> GenerationStats {
        let unique: HashSet<&String> = self.produced_names.iter().collect();
        GenerationStats {
            total_generated: self.produced_names.len(),
            unique_tasks: unique.len(),
            task_types: self.type_counts.clone(),
        }
    }
}

/// No-op runner paired with the generator-only agent selector.
///
/// Marks every task as successfully "executed" without touching a device,
/// recording a generation marker in the metrics.
pub struct GenerationRunner;

#[async_trait]
impl TaskRunner for GenerationRunner {
    fn name(&self) -> &str {
        "generation"
    }

    async fn execute(&mut self, task: &TaskDescription) -> TaskResult {
        TaskResult::success(&task.id, &task.name).with_metric("task_type", "generation")
    }
}
