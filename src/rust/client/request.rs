use serde::{Deserialize, Serialize, Serializer};

/// Epoch ceiling for training jobs. Callers may ask for fewer, never more.
pub const DEFAULT_EPOCHS: u32 = 100;

/// Template for the model name the backend stores a run under.
pub fn model_train_name(version_no: u64) -> String {
    format!("obj_master_vizo_{}_train", version_no)
}

/// Caps a requested epoch count at [`DEFAULT_EPOCHS`].
pub fn resolve_epochs(requested: Option<u32>) -> u32 {
    requested.unwrap_or(DEFAULT_EPOCHS).min(DEFAULT_EPOCHS)
}

/// Workspace/project pair used to build the scoped GET routes.
///
/// Passed explicitly to every call that needs it. Setters do no validation;
/// an unset field becomes an empty path segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    workspace_id: Option<String>,
    project_id: Option<String>,
}

impl RequestContext {
    pub fn new(workspace_id: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            workspace_id: Some(workspace_id.into()),
            project_id: Some(project_id.into()),
        }
    }

    pub fn set_workspace_id(&mut self, workspace_id: impl Into<String>) {
        self.workspace_id = Some(workspace_id.into());
    }

    pub fn workspace_id(&self) -> Option<&str> {
        self.workspace_id.as_deref()
    }

    pub fn set_project_id(&mut self, project_id: impl Into<String>) {
        self.project_id = Some(project_id.into());
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }
}

/// The caller's project, as far as the training backend cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    pub id: String,
    pub slug: String,
}

impl ProjectRef {
    pub fn new(id: impl Into<String>, slug: impl Into<String>) -> Self {
        Self { id: id.into(), slug: slug.into() }
    }
}

/// The dataset version a model is trained on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRef {
    pub version_no: u64,
    pub version_name: String,
}

impl DatasetRef {
    pub fn new(version_no: u64, version_name: impl Into<String>) -> Self {
        Self { version_no, version_name: version_name.into() }
    }
}

/// Optional knobs for a training job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epochs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_trained: Option<bool>,
}

impl TrainOptions {
    pub fn with_epochs(mut self, epochs: u32) -> Self {
        self.epochs = Some(epochs);
        self
    }

    pub fn with_pre_trained(mut self, pre_trained: bool) -> Self {
        self.pre_trained = Some(pre_trained);
        self
    }
}

/// A fully resolved training job, ready to be posted to `/{version}/fit`.
///
/// Serializes to the nested wire shape:
///
/// ```json
/// {
///   "workspace": {
///     "id": "workspace-slug",
///     "project_id": "project-slug",
///     "model_name": "obj_master_vizo_234_train",
///     "dataset": { "version_code": 234, "version_name": "ver_234_345" }
///   },
///   "architectures": { "name": "YOLOv5n" },
///   "adv_model_conf": { "pre_trained": false, "epochs": 100 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainRequest {
    pub workspace_id: String,
    pub project_slug: String,
    pub model_name: String,
    pub dataset_version_code: u64,
    pub dataset_version_name: String,
    pub architecture_name: String,
    pub pre_trained: bool,
    pub epochs: u32,
}

impl TrainRequest {
    /// Resolves options and derived fields into a request.
    pub fn new(
        workspace_slug: &str,
        project: &ProjectRef,
        architecture: &str,
        dataset: &DatasetRef,
        options: Option<&TrainOptions>,
    ) -> Self {
        let options = options.copied().unwrap_or_default();
        Self {
            workspace_id: workspace_slug.to_string(),
            project_slug: project.slug.clone(),
            model_name: model_train_name(dataset.version_no),
            dataset_version_code: dataset.version_no,
            dataset_version_name: dataset.version_name.clone(),
            architecture_name: architecture.to_string(),
            pre_trained: options.pre_trained.unwrap_or(false),
            epochs: resolve_epochs(options.epochs),
        }
    }
}

#[derive(Serialize)]
struct WirePayload<'a> {
    workspace: WireWorkspace<'a>,
    architectures: WireArchitecture<'a>,
    adv_model_conf: WireModelConf,
}

#[derive(Serialize)]
struct WireWorkspace<'a> {
    id: &'a str,
    project_id: &'a str,
    model_name: &'a str,
    dataset: WireDataset<'a>,
}

#[derive(Serialize)]
struct WireDataset<'a> {
    version_code: u64,
    version_name: &'a str,
}

#[derive(Serialize)]
struct WireArchitecture<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct WireModelConf {
    pre_trained: bool,
    epochs: u32,
}

impl Serialize for TrainRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WirePayload {
            workspace: WireWorkspace {
                id: &self.workspace_id,
                project_id: &self.project_slug,
                model_name: &self.model_name,
                dataset: WireDataset {
                    version_code: self.dataset_version_code,
                    version_name: &self.dataset_version_name,
                },
            },
            architectures: WireArchitecture { name: &self.architecture_name },
            adv_model_conf: WireModelConf {
                pre_trained: self.pre_trained,
                epochs: self.epochs,
            },
        }
        .serialize(serializer)
    }
}
