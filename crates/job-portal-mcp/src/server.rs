use std::sync::Arc;

use job_portal_core::{Criteria, EntityKind, NewJob, NewProfile, Record, UriTemplate};
use job_portal_storage::{Collection, EntityStore, StoreError};
use parking_lot::Mutex;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::config::{SeedMode, ServerConfig};
use crate::envelope::ToolResponse;
use crate::error::ServerError;
use crate::protocol::{
    INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, JsonRpcRequest, JsonRpcResponse,
    METHOD_NOT_FOUND, RESOURCE_NOT_FOUND,
};

const DEFAULT_MCP_PROTOCOL_VERSION: &str = "2024-11-05";
const JSON_MIME: &str = "application/json";

pub struct McpServer {
    store: Arc<Mutex<EntityStore>>,
    config: ServerConfig,
    templates: Vec<RegisteredTemplate>,
}

impl McpServer {
    /// Server configured from `JOB_PORTAL_*` environment variables.
    pub fn new() -> Result<Self, ServerError> {
        Self::with_config(ServerConfig::from_env()?)
    }

    pub fn with_config(config: ServerConfig) -> Result<Self, ServerError> {
        let store = match config.seed {
            SeedMode::Demo => EntityStore::seeded(config.id_policy)?,
            SeedMode::Empty => EntityStore::with_policy(config.id_policy),
        };
        Self::with_store(store, config)
    }

    pub fn with_store(store: EntityStore, config: ServerConfig) -> Result<Self, ServerError> {
        let templates = compile_templates(resource_templates())?;
        info!(
            profiles = store.profiles().len(),
            jobs = store.jobs().len(),
            id_policy = %config.id_policy,
            templates = templates.len(),
            "job portal server ready"
        );
        Ok(Self {
            store: Arc::new(Mutex::new(store)),
            config,
            templates,
        })
    }

    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let is_notification = request.id.is_none();
        if request.jsonrpc != "2.0" {
            if is_notification {
                warn!(method = %request.method, "dropping notification with invalid jsonrpc version");
                return None;
            }
            return Some(JsonRpcResponse::error(
                request.id.unwrap_or(Value::Null),
                INVALID_REQUEST,
                "invalid jsonrpc version",
            ));
        }

        let id = request.id.clone().unwrap_or(Value::Null);
        debug!(method = %request.method, notification = is_notification, "rpc request");

        if is_notification && request.method.starts_with("notifications/") {
            return None;
        }

        let response = match request.method.as_str() {
            "initialize" => {
                let protocol_version = request
                    .params
                    .get("protocolVersion")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_MCP_PROTOCOL_VERSION);
                JsonRpcResponse::success(
                    id,
                    json!({
                        "protocolVersion": protocol_version,
                        "serverInfo": {"name": "job-portal-mcp", "version": env!("CARGO_PKG_VERSION")},
                        "capabilities": {
                            "tools": {
                                "listChanged": false
                            },
                            "resources": {
                                "subscribe": false,
                                "listChanged": false
                            },
                            "completions": {}
                        }
                    }),
                )
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, tools_list_result()),
            "tools/call" => self.handle_tools_call(id, request.params),
            "resources/list" => JsonRpcResponse::success(id, resources_list_result()),
            "resources/templates/list" => {
                JsonRpcResponse::success(id, self.resources_templates_list_result())
            }
            "resources/read" => self.handle_resources_read(id, request.params),
            "completion/complete" => self.handle_completion(id, request.params),
            other => {
                debug!(method = other, "method not found");
                JsonRpcResponse::error(id, METHOD_NOT_FOUND, "method not found")
            }
        };

        // Notifications still run for their side effects but never get a reply.
        (!is_notification).then_some(response)
    }

    fn resources_templates_list_result(&self) -> Value {
        let templates = self
            .templates
            .iter()
            .map(|registered| {
                json!({
                    "uriTemplate": registered.template.as_str(),
                    "name": registered.def.name,
                    "description": registered.def.description,
                    "mimeType": registered.def.mime_type
                })
            })
            .collect::<Vec<_>>();
        json!({
            "resourceTemplates": templates
        })
    }

    fn handle_resources_read(&self, id: Value, params: Value) -> JsonRpcResponse {
        let parsed: ResourceReadParams = match serde_json::from_value(params) {
            Ok(v) => v,
            Err(err) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("invalid params: {err}"));
            }
        };

        let rendered = match self.render_resource(&parsed.uri) {
            Ok(Some(v)) => v,
            Ok(None) => {
                debug!(uri = %parsed.uri, "resource not found");
                return JsonRpcResponse::error(id, RESOURCE_NOT_FOUND, "resource not found");
            }
            Err(err) => return JsonRpcResponse::error(id, INTERNAL_ERROR, err.to_string()),
        };

        JsonRpcResponse::success(
            id,
            json!({
                "contents": [{
                    "uri": parsed.uri,
                    "mimeType": JSON_MIME,
                    "text": rendered
                }]
            }),
        )
    }

    /// Static resources first, then templates in registration order.
    fn render_resource(&self, uri: &str) -> Result<Option<String>, serde_json::Error> {
        let store = self.store.lock();
        match uri {
            "list://profiles" => return serde_json::to_string(&store.profiles().list()).map(Some),
            "list://jobs" => return serde_json::to_string(&store.jobs().list()).map(Some),
            _ => {}
        }

        for registered in &self.templates {
            let Some(bindings) = registered.template.extract(uri) else {
                continue;
            };
            let template = &registered.template;
            return match registered.def.target {
                TemplateTarget::Profile => render_one(store.profiles(), bindings.first("id")),
                TemplateTarget::Job => render_one(store.jobs(), bindings.first("id")),
                TemplateTarget::ProfileFilter => {
                    let passes = bindings.criteria_passes(template.query_variables());
                    serde_json::to_string(&store.profiles().filter_passes(&passes)).map(Some)
                }
                TemplateTarget::JobFilter => {
                    let passes = bindings.criteria_passes(template.query_variables());
                    serde_json::to_string(&store.jobs().filter_passes(&passes)).map(Some)
                }
            };
        }
        Ok(None)
    }

    fn handle_completion(&self, id: Value, params: Value) -> JsonRpcResponse {
        let parsed: CompletionParams = match serde_json::from_value(params) {
            Ok(v) => v,
            Err(err) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("invalid params: {err}"));
            }
        };
        if parsed.reference.kind != "ref/resource" {
            return JsonRpcResponse::error(
                id,
                INVALID_PARAMS,
                format!("unsupported completion ref type: {}", parsed.reference.kind),
            );
        }
        let Some(uri) = parsed.reference.uri.as_deref() else {
            return JsonRpcResponse::error(id, INVALID_PARAMS, "completion ref is missing uri");
        };

        let mut values = self
            .templates
            .iter()
            .find(|registered| registered.template.as_str() == uri)
            .map(|registered| {
                let candidates = self.completion_candidates(registered, &parsed.argument.name);
                registered
                    .template
                    .complete(&parsed.argument.name, &parsed.argument.value, candidates)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let total = values.len();
        let has_more = total > self.config.completion_limit;
        values.truncate(self.config.completion_limit);
        JsonRpcResponse::success(
            id,
            json!({
                "completion": {
                    "values": values,
                    "total": total,
                    "hasMore": has_more
                }
            }),
        )
    }

    /// Path `id` variables complete from record ids; query variables from
    /// the distinct values of the field they name.
    fn completion_candidates(&self, registered: &RegisteredTemplate, variable: &str) -> Vec<String> {
        let store = self.store.lock();
        let by_id = variable == "id" && registered.template.is_path_variable(variable);
        match registered.def.target.kind() {
            EntityKind::Profile if by_id => store.profiles().ids().map(|v| v.to_string()).collect(),
            EntityKind::Job if by_id => store.jobs().ids().map(|v| v.to_string()).collect(),
            EntityKind::Profile => store.profiles().field_terms(variable),
            EntityKind::Job => store.jobs().field_terms(variable),
        }
    }

    fn handle_tools_call(&self, id: Value, params: Value) -> JsonRpcResponse {
        let parsed: ToolsCallParams = match serde_json::from_value(params) {
            Ok(v) => v,
            Err(err) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("invalid params: {err}"));
            }
        };

        let response = match parsed.name.as_str() {
            "create_profile" => self.exec_create_profile(id, parsed.arguments),
            "create_job" => self.exec_create_job(id, parsed.arguments),
            "delete_profile" => self.exec_delete_profile(id, parsed.arguments),
            "delete_job" => self.exec_delete_job(id, parsed.arguments),
            "filter_profiles" => self.exec_filter_profiles(id, parsed.arguments),
            "filter_jobs" => self.exec_filter_jobs(id, parsed.arguments),
            "match_jobs_for_profile" => self.exec_match_jobs_for_profile(id, parsed.arguments),
            "match_profiles_for_job" => self.exec_match_profiles_for_job(id, parsed.arguments),
            other => {
                warn!(tool = other, "unknown tool");
                JsonRpcResponse::error(id, METHOD_NOT_FOUND, "unknown tool")
            }
        };
        if let Some(err) = &response.error {
            debug!(tool = %parsed.name, code = err.code, "tool call rejected");
        }
        response
    }

    fn exec_create_profile(&self, id: Value, arguments: Option<Value>) -> JsonRpcResponse {
        let draft: NewProfile = match parse_args(arguments) {
            Ok(v) => v,
            Err(resp) => return with_id(resp, id),
        };
        if let Err(msg) = validate_new_profile(&draft) {
            return invalid_arguments(id, &msg);
        }

        let stored = self.store.lock().profiles_mut().insert(draft);
        info!(profile_id = stored.id, "profile created");
        tool_success(id, &stored)
    }

    fn exec_create_job(&self, id: Value, arguments: Option<Value>) -> JsonRpcResponse {
        let draft: NewJob = match parse_args(arguments) {
            Ok(v) => v,
            Err(resp) => return with_id(resp, id),
        };
        if let Err(msg) = validate_new_job(&draft) {
            return invalid_arguments(id, &msg);
        }

        let stored = self.store.lock().jobs_mut().insert(draft);
        info!(job_id = stored.id, "job created");
        tool_success(id, &stored)
    }

    fn exec_delete_profile(&self, id: Value, arguments: Option<Value>) -> JsonRpcResponse {
        let args: IdInput = match parse_args(arguments) {
            Ok(v) => v,
            Err(resp) => return with_id(resp, id),
        };
        if let Err(msg) = require_id("id", args.id) {
            return invalid_arguments(id, &msg);
        }

        let deleted = self.store.lock().profiles_mut().delete(args.id);
        match deleted {
            Ok(profile) => {
                info!(profile_id = profile.id, "profile deleted");
                JsonRpcResponse::success(
                    id,
                    ToolResponse::success(json!({
                        "message": "Profile deleted successfully",
                        "deletedProfile": {"id": profile.id, "name": profile.name}
                    }))
                    .into_result(),
                )
            }
            Err(err) => store_failure(id, &err),
        }
    }

    fn exec_delete_job(&self, id: Value, arguments: Option<Value>) -> JsonRpcResponse {
        let args: IdInput = match parse_args(arguments) {
            Ok(v) => v,
            Err(resp) => return with_id(resp, id),
        };
        if let Err(msg) = require_id("id", args.id) {
            return invalid_arguments(id, &msg);
        }

        let deleted = self.store.lock().jobs_mut().delete(args.id);
        match deleted {
            Ok(job) => {
                info!(job_id = job.id, "job deleted");
                JsonRpcResponse::success(
                    id,
                    ToolResponse::success(json!({
                        "message": "Job deleted successfully",
                        "deletedJob": {"id": job.id, "title": job.title, "company": job.company}
                    }))
                    .into_result(),
                )
            }
            Err(err) => store_failure(id, &err),
        }
    }

    fn exec_filter_profiles(&self, id: Value, arguments: Option<Value>) -> JsonRpcResponse {
        let args: FilterProfilesInput = match parse_args_optional(arguments) {
            Ok(v) => v,
            Err(resp) => return with_id(resp, id),
        };

        let profiles = self.store.lock().profiles().filter(&args.criteria());
        JsonRpcResponse::success(
            id,
            ToolResponse::success(json!({
                "count": profiles.len(),
                "profiles": profiles
            }))
            .into_result(),
        )
    }

    fn exec_filter_jobs(&self, id: Value, arguments: Option<Value>) -> JsonRpcResponse {
        let args: FilterJobsInput = match parse_args_optional(arguments) {
            Ok(v) => v,
            Err(resp) => return with_id(resp, id),
        };

        let mut jobs = self.store.lock().jobs().filter(&args.criteria());
        if let Some(min_salary) = args.salary {
            jobs.retain(|job| salary_value(job.salary) >= min_salary);
        }
        JsonRpcResponse::success(
            id,
            ToolResponse::success(json!({
                "count": jobs.len(),
                "jobs": jobs
            }))
            .into_result(),
        )
    }

    fn exec_match_jobs_for_profile(&self, id: Value, arguments: Option<Value>) -> JsonRpcResponse {
        let args: MatchJobsInput = match parse_args(arguments) {
            Ok(v) => v,
            Err(resp) => return with_id(resp, id),
        };
        if let Err(msg) = require_id("profileId", args.profile_id) {
            return invalid_arguments(id, &msg);
        }

        let store = self.store.lock();
        if !store.profiles().contains(args.profile_id) {
            let err = StoreError::NotFound {
                kind: EntityKind::Profile,
                id: args.profile_id,
            };
            return store_failure(id, &err);
        }
        let matched = sample(store.jobs(), self.config.match_limit);
        drop(store);

        debug!(profile_id = args.profile_id, matches = matched.len(), "matched jobs");
        JsonRpcResponse::success(
            id,
            ToolResponse::success(json!({
                "profileId": args.profile_id,
                "matchedJobs": matched,
                "totalMatches": matched.len()
            }))
            .into_result(),
        )
    }

    fn exec_match_profiles_for_job(&self, id: Value, arguments: Option<Value>) -> JsonRpcResponse {
        let args: MatchProfilesInput = match parse_args(arguments) {
            Ok(v) => v,
            Err(resp) => return with_id(resp, id),
        };
        if let Err(msg) = require_id("jobId", args.job_id) {
            return invalid_arguments(id, &msg);
        }

        let store = self.store.lock();
        if !store.jobs().contains(args.job_id) {
            let err = StoreError::NotFound {
                kind: EntityKind::Job,
                id: args.job_id,
            };
            return store_failure(id, &err);
        }
        let matched = sample(store.profiles(), self.config.match_limit);
        drop(store);

        debug!(job_id = args.job_id, matches = matched.len(), "matched profiles");
        JsonRpcResponse::success(
            id,
            ToolResponse::success(json!({
                "jobId": args.job_id,
                "matchedProfiles": matched,
                "totalMatches": matched.len()
            }))
            .into_result(),
        )
    }
}

fn with_id(mut response: JsonRpcResponse, id: Value) -> JsonRpcResponse {
    response.id = id;
    response
}

fn invalid_arguments(id: Value, msg: &str) -> JsonRpcResponse {
    JsonRpcResponse::error(id, INVALID_PARAMS, format!("invalid tool arguments: {msg}"))
}

fn tool_success<T: Serialize>(id: Value, data: &T) -> JsonRpcResponse {
    match serde_json::to_value(data) {
        Ok(value) => JsonRpcResponse::success(id, ToolResponse::success(value).into_result()),
        Err(err) => JsonRpcResponse::error(id, INTERNAL_ERROR, err.to_string()),
    }
}

fn store_failure(id: Value, err: &StoreError) -> JsonRpcResponse {
    let response = match err {
        StoreError::NotFound { kind, id: missing } => {
            ToolResponse::failure(kind.not_found_code(), err.to_string())
                .with_details(json!({"id": missing}))
        }
        other => ToolResponse::failure("STORE_ERROR", other.to_string()),
    };
    JsonRpcResponse::success(id, response.into_result())
}

/// Up to `limit` records in random order. The collection itself is untouched.
fn sample<R: Record>(collection: &Collection<R>, limit: usize) -> Vec<R> {
    let records = collection.list();
    records
        .choose_multiple(&mut rand::thread_rng(), limit)
        .cloned()
        .collect()
}

fn render_one<R: Record + Serialize>(
    collection: &Collection<R>,
    raw_id: Option<&str>,
) -> Result<Option<String>, serde_json::Error> {
    let Some(record) = raw_id
        .and_then(|raw| raw.parse::<u64>().ok())
        .and_then(|id| collection.get(id))
    else {
        return Ok(None);
    };
    serde_json::to_string(&record).map(Some)
}

#[allow(clippy::cast_precision_loss)]
fn salary_value(salary: Option<u64>) -> f64 {
    salary.map_or(0.0, |v| v as f64)
}

fn require_non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is required"));
    }
    Ok(())
}

fn require_min_chars(field: &str, value: &str, min: usize) -> Result<(), String> {
    if value.chars().count() < min {
        return Err(format!("{field} must be at least {min} characters"));
    }
    Ok(())
}

fn require_id(field: &str, value: u64) -> Result<(), String> {
    if value == 0 {
        return Err(format!("{field} must be at least 1"));
    }
    Ok(())
}

fn looks_like_email(raw: &str) -> bool {
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !raw.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

fn validate_new_profile(draft: &NewProfile) -> Result<(), String> {
    require_non_empty("name", &draft.name)?;
    if !looks_like_email(&draft.email) {
        return Err("email must be a valid email address".to_string());
    }
    require_min_chars("phone", &draft.phone, 10)?;
    for (idx, entry) in draft.experience.iter().flatten().enumerate() {
        require_non_empty(&format!("experience[{idx}].company"), &entry.company)?;
        require_non_empty(&format!("experience[{idx}].role"), &entry.role)?;
        require_non_empty(&format!("experience[{idx}].duration"), &entry.duration)?;
    }
    Ok(())
}

fn validate_new_job(draft: &NewJob) -> Result<(), String> {
    require_non_empty("title", &draft.title)?;
    require_non_empty("company", &draft.company)?;
    require_non_empty("location", &draft.location)?;
    require_min_chars("description", &draft.description, 10)
}

fn parse_args<T: for<'de> Deserialize<'de>>(
    arguments: Option<Value>,
) -> Result<T, JsonRpcResponse> {
    let Some(args) = arguments else {
        return Err(JsonRpcResponse::error(
            Value::Null,
            INVALID_PARAMS,
            "missing tool arguments",
        ));
    };

    serde_json::from_value(args).map_err(|err| {
        JsonRpcResponse::error(
            Value::Null,
            INVALID_PARAMS,
            format!("invalid tool arguments: {err}"),
        )
    })
}

fn parse_args_optional<T: for<'de> Deserialize<'de> + Default>(
    arguments: Option<Value>,
) -> Result<T, JsonRpcResponse> {
    match arguments {
        Some(v) => serde_json::from_value(v).map_err(|err| {
            JsonRpcResponse::error(
                Value::Null,
                INVALID_PARAMS,
                format!("invalid tool arguments: {err}"),
            )
        }),
        None => Ok(T::default()),
    }
}

#[derive(Debug, Deserialize)]
struct ToolsCallParams {
    name: String,
    arguments: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ResourceReadParams {
    uri: String,
}

#[derive(Debug, Deserialize)]
struct CompletionParams {
    #[serde(rename = "ref")]
    reference: CompletionRef,
    argument: CompletionArgument,
}

#[derive(Debug, Deserialize)]
struct CompletionRef {
    #[serde(rename = "type")]
    kind: String,
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionArgument {
    name: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct IdInput {
    id: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchJobsInput {
    profile_id: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchProfilesInput {
    job_id: u64,
}

#[derive(Debug, Default, Deserialize)]
struct FilterProfilesInput {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    location: Option<String>,
    skills: Option<String>,
    company: Option<String>,
    role: Option<String>,
}

impl FilterProfilesInput {
    fn criteria(&self) -> Criteria {
        let mut criteria = Criteria::new();
        criteria.insert_opt("name", self.name.as_deref());
        criteria.insert_opt("email", self.email.as_deref());
        criteria.insert_opt("phone", self.phone.as_deref());
        criteria.insert_opt("location", self.location.as_deref());
        criteria.insert_opt("skills", self.skills.as_deref());
        criteria.insert_opt("company", self.company.as_deref());
        criteria.insert_opt("role", self.role.as_deref());
        criteria
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilterJobsInput {
    title: Option<String>,
    company: Option<String>,
    location: Option<String>,
    experience_required: Option<String>,
    salary: Option<f64>,
    description: Option<String>,
    skills_required: Option<String>,
}

impl FilterJobsInput {
    /// Salary is a minimum and is applied separately.
    fn criteria(&self) -> Criteria {
        let mut criteria = Criteria::new();
        criteria.insert_opt("title", self.title.as_deref());
        criteria.insert_opt("company", self.company.as_deref());
        criteria.insert_opt("location", self.location.as_deref());
        criteria.insert_opt("experienceRequired", self.experience_required.as_deref());
        criteria.insert_opt("description", self.description.as_deref());
        criteria.insert_opt("skillsRequired", self.skills_required.as_deref());
        criteria
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TemplateTarget {
    Profile,
    Job,
    ProfileFilter,
    JobFilter,
}

impl TemplateTarget {
    const fn kind(self) -> EntityKind {
        match self {
            Self::Profile | Self::ProfileFilter => EntityKind::Profile,
            Self::Job | Self::JobFilter => EntityKind::Job,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ResourceTemplateDef {
    uri_template: &'static str,
    name: &'static str,
    description: &'static str,
    mime_type: &'static str,
    target: TemplateTarget,
}

#[derive(Debug, Clone)]
struct RegisteredTemplate {
    def: ResourceTemplateDef,
    template: UriTemplate,
}

fn compile_templates(defs: &[ResourceTemplateDef]) -> Result<Vec<RegisteredTemplate>, ServerError> {
    defs.iter()
        .map(|def| {
            let template = UriTemplate::parse(def.uri_template)?;
            Ok(RegisteredTemplate { def: *def, template })
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct StaticResourceDef {
    uri: &'static str,
    name: &'static str,
    title: &'static str,
    description: &'static str,
}

fn static_resources() -> &'static [StaticResourceDef] {
    &[
        StaticResourceDef {
            uri: "list://profiles",
            name: "list_profiles",
            title: "List All Candidate Profiles",
            description: "Returns all candidate profiles registered on the platform.",
        },
        StaticResourceDef {
            uri: "list://jobs",
            name: "list_jobs",
            title: "List All Job Postings",
            description: "Returns all job postings currently open on the platform.",
        },
    ]
}

fn resources_list_result() -> Value {
    let resources = static_resources()
        .iter()
        .map(|resource| {
            json!({
                "uri": resource.uri,
                "name": resource.name,
                "title": resource.title,
                "description": resource.description,
                "mimeType": JSON_MIME
            })
        })
        .collect::<Vec<_>>();
    json!({
        "resources": resources
    })
}

fn resource_templates() -> &'static [ResourceTemplateDef] {
    &[
        ResourceTemplateDef {
            uri_template: "profile://{id}",
            name: "profile",
            description: "A single candidate profile by id.",
            mime_type: JSON_MIME,
            target: TemplateTarget::Profile,
        },
        ResourceTemplateDef {
            uri_template: "job://{id}",
            name: "job",
            description: "A single job posting by id.",
            mime_type: JSON_MIME,
            target: TemplateTarget::Job,
        },
        ResourceTemplateDef {
            uri_template: "profiles://filter{?name,email,phone,location,skills,experience,company,role}",
            name: "filter_profiles",
            description: "Candidate profiles matching every given attribute (case-insensitive partial match).",
            mime_type: JSON_MIME,
            target: TemplateTarget::ProfileFilter,
        },
        ResourceTemplateDef {
            uri_template: "jobs://filter{?title,company,location,experienceRequired,salary,description,skillsRequired}",
            name: "filter_jobs",
            description: "Job postings matching every given attribute; salary must match exactly.",
            mime_type: JSON_MIME,
            target: TemplateTarget::JobFilter,
        },
    ]
}

fn tools_list_result() -> Value {
    let id_schema = |field: &str, description: &str| {
        json!({
            "type": "object",
            "properties": {
                field: {"type": "integer", "minimum": 1, "description": description}
            },
            "required": [field]
        })
    };
    let text = |description: &str| json!({"type": "string", "description": description});

    json!({
        "tools": [
            {
                "name": "create_profile",
                "title": "Create Candidate Profile",
                "description": "Create a new candidate profile with name, email, phone, skills, experience, and location preferences.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string", "minLength": 1, "description": "Full name of the candidate"},
                        "email": {"type": "string", "format": "email", "description": "Email address of the candidate"},
                        "phone": {"type": "string", "minLength": 10, "description": "Contact phone number"},
                        "skills": {"type": "array", "items": {"type": "string"}, "description": "Skills the candidate has"},
                        "experience": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "company": {"type": "string", "minLength": 1},
                                    "role": {"type": "string", "minLength": 1},
                                    "duration": {"type": "string", "minLength": 1}
                                },
                                "required": ["company", "role", "duration"]
                            },
                            "description": "Work history"
                        },
                        "location": text("Preferred work location (e.g. Remote, Noida)")
                    },
                    "required": ["name", "email", "phone", "skills"]
                }
            },
            {
                "name": "create_job",
                "title": "Create Job Posting",
                "description": "Create a new job posting with title, company, location, description, required skills, and experience requirements.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "title": {"type": "string", "minLength": 1, "description": "Job title"},
                        "company": {"type": "string", "minLength": 1, "description": "Hiring company"},
                        "location": {"type": "string", "minLength": 1, "description": "Job location"},
                        "experienceRequired": text("Experience required (e.g. 3+ years)"),
                        "salary": {"type": "integer", "minimum": 0, "description": "Annual salary"},
                        "description": {"type": "string", "minLength": 10, "description": "Role description"},
                        "skillsRequired": {"type": "array", "items": {"type": "string"}, "description": "Skills the role needs"}
                    },
                    "required": ["title", "company", "location", "description", "skillsRequired"]
                }
            },
            {
                "name": "delete_profile",
                "title": "Delete Candidate Profile",
                "description": "Delete an existing candidate profile by id.",
                "inputSchema": id_schema("id", "Id of the profile to delete")
            },
            {
                "name": "delete_job",
                "title": "Delete Job Posting",
                "description": "Delete an existing job posting by id.",
                "inputSchema": id_schema("id", "Id of the job to delete")
            },
            {
                "name": "filter_profiles",
                "title": "Filter Candidate Profiles",
                "description": "List candidate profiles matching every given attribute. Empty arguments are ignored.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "name": text("Partial name match"),
                        "email": text("Partial email match"),
                        "phone": text("Partial phone match"),
                        "location": text("Partial location match"),
                        "skills": text("Matches if any skill contains this value"),
                        "company": text("Matches if any past company contains this value"),
                        "role": text("Matches if any past role contains this value")
                    }
                }
            },
            {
                "name": "filter_jobs",
                "title": "Filter Job Postings",
                "description": "List job postings matching every given attribute. Salary is a minimum. Empty arguments are ignored.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "title": text("Partial title match"),
                        "company": text("Partial company match"),
                        "location": text("Partial location match"),
                        "experienceRequired": text("Partial experience requirement match"),
                        "salary": {"type": "number", "description": "Minimum salary; postings without a salary count as 0"},
                        "description": text("Partial description match"),
                        "skillsRequired": text("Matches if any required skill contains this value")
                    }
                }
            },
            {
                "name": "match_jobs_for_profile",
                "title": "Match Jobs for Candidate Profile",
                "description": "Suggest job postings for a candidate profile.",
                "inputSchema": id_schema("profileId", "Id of the candidate profile")
            },
            {
                "name": "match_profiles_for_job",
                "title": "Match Candidates for Job Posting",
                "description": "Suggest candidate profiles for a job posting.",
                "inputSchema": id_schema("jobId", "Id of the job posting")
            }
        ]
    })
}
