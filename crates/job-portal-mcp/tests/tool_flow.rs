use job_portal_mcp::protocol::JsonRpcRequest;
use job_portal_mcp::{McpServer, SeedMode, ServerConfig};
use job_portal_storage::IdPolicy;
use serde_json::{json, Value};

fn demo_server() -> McpServer {
    McpServer::with_config(ServerConfig::default()).expect("demo server")
}

fn empty_server(policy: IdPolicy) -> McpServer {
    McpServer::with_config(ServerConfig {
        seed: SeedMode::Empty,
        id_policy: policy,
        ..ServerConfig::default()
    })
    .expect("empty server")
}

fn rpc(server: &McpServer, id: u64, method: &str, params: Value) -> Value {
    let req = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        id: Some(json!(id)),
        method: method.to_string(),
        params,
    };
    let response = server.handle_request(req).expect("rpc response");
    serde_json::to_value(response).expect("serialize response")
}

fn call_tool(server: &McpServer, id: u64, name: &str, arguments: Value) -> Value {
    let response = rpc(
        server,
        id,
        "tools/call",
        json!({"name": name, "arguments": arguments}),
    );
    assert!(response.get("error").is_none(), "tool {name} failed: {response}");
    response["result"]["structuredContent"].clone()
}

fn read_resource(server: &McpServer, uri: &str) -> Value {
    let response = rpc(server, 90, "resources/read", json!({"uri": uri}));
    let text = response["result"]["contents"][0]["text"]
        .as_str()
        .unwrap_or_else(|| panic!("no contents for {uri}: {response}"));
    serde_json::from_str(text).expect("resource text is json")
}

fn new_profile(name: &str) -> Value {
    json!({
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase()),
        "phone": "9000000000",
        "skills": ["Rust", "SQL"],
        "location": "Remote"
    })
}

fn new_job(title: &str, salary: u64) -> Value {
    json!({
        "title": title,
        "company": "Acme",
        "location": "Pune",
        "salary": salary,
        "description": "Build and operate backend services.",
        "skillsRequired": ["Rust"]
    })
}

#[test]
fn initialize_and_listing_describe_the_surface() {
    let server = demo_server();

    let init = rpc(&server, 1, "initialize", json!({"protocolVersion": "2025-03-26"}));
    assert_eq!(init["result"]["protocolVersion"], "2025-03-26");
    assert_eq!(init["result"]["serverInfo"]["name"], "job-portal-mcp");
    assert!(init["result"]["capabilities"]["completions"].is_object());

    let tools = rpc(&server, 2, "tools/list", json!({}));
    let names = tools["result"]["tools"]
        .as_array()
        .expect("tools array")
        .iter()
        .filter_map(|tool| tool["name"].as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec![
            "create_profile",
            "create_job",
            "delete_profile",
            "delete_job",
            "filter_profiles",
            "filter_jobs",
            "match_jobs_for_profile",
            "match_profiles_for_job",
        ]
    );

    let resources = rpc(&server, 3, "resources/list", json!({}));
    let uris = resources["result"]["resources"]
        .as_array()
        .expect("resources array")
        .iter()
        .filter_map(|r| r["uri"].as_str())
        .collect::<Vec<_>>();
    assert_eq!(uris, vec!["list://profiles", "list://jobs"]);

    let templates = rpc(&server, 4, "resources/templates/list", json!({}));
    let templates = templates["result"]["resourceTemplates"]
        .as_array()
        .expect("templates array")
        .iter()
        .filter_map(|t| t["uriTemplate"].as_str())
        .collect::<Vec<_>>();
    assert_eq!(templates.first(), Some(&"profile://{id}"));
    assert_eq!(templates.get(1), Some(&"job://{id}"));
    assert!(templates.iter().any(|t| t.starts_with("jobs://filter{?title")));

    let ping = rpc(&server, 5, "ping", json!({}));
    assert_eq!(ping["result"], json!({}));
}

#[test]
fn create_then_delete_profile_reuses_ids_by_default() {
    let server = empty_server(IdPolicy::MaxPlusOne);

    let created = call_tool(&server, 1, "create_profile", new_profile("Ana"));
    assert_eq!(created["success"], true);
    assert_eq!(created.get("error"), Some(&Value::Null));
    assert_eq!(created["data"]["id"], 1);
    assert_eq!(created["data"]["name"], "Ana");

    let deleted = call_tool(&server, 2, "delete_profile", json!({"id": 1}));
    assert_eq!(deleted["data"]["message"], "Profile deleted successfully");
    assert_eq!(deleted["data"]["deletedProfile"], json!({"id": 1, "name": "Ana"}));

    let again = call_tool(&server, 3, "create_profile", new_profile("Ben"));
    assert_eq!(again["data"]["id"], 1);
}

#[test]
fn monotonic_policy_never_reuses_ids() {
    let server = empty_server(IdPolicy::Monotonic);

    call_tool(&server, 1, "create_job", new_job("Backend Engineer", 100));
    call_tool(&server, 2, "delete_job", json!({"id": 1}));
    let created = call_tool(&server, 3, "create_job", new_job("SRE", 100));
    assert_eq!(created["data"]["id"], 2);
}

#[test]
fn seeded_ids_continue_after_maximum() {
    let server = demo_server();
    let created = call_tool(&server, 1, "create_job", new_job("Platform Engineer", 1_500_000));
    assert_eq!(created["data"]["id"], 4);
    assert_eq!(created["data"]["skillsRequired"], json!(["Rust"]));

    let deleted = call_tool(&server, 2, "delete_job", json!({"id": 4}));
    assert_eq!(
        deleted["data"]["deletedJob"],
        json!({"id": 4, "title": "Platform Engineer", "company": "Acme"})
    );
}

#[test]
fn missing_records_are_envelope_errors() {
    let server = demo_server();

    let missing = call_tool(&server, 1, "delete_profile", json!({"id": 42}));
    assert_eq!(missing["success"], false);
    assert_eq!(missing["data"], Value::Null);
    assert_eq!(missing["error"]["code"], "PROFILE_NOT_FOUND");
    assert_eq!(missing["error"]["message"], "Profile with ID 42 not found");

    let missing = call_tool(&server, 2, "match_profiles_for_job", json!({"jobId": 9}));
    assert_eq!(missing["error"]["code"], "JOB_NOT_FOUND");

    assert_eq!(read_resource(&server, "list://profiles").as_array().map(Vec::len), Some(3));
}

#[test]
fn malformed_arguments_are_invalid_params() {
    let server = demo_server();

    let missing = rpc(&server, 1, "tools/call", json!({"name": "delete_job"}));
    assert_eq!(missing["error"]["code"], -32602);
    assert_eq!(missing["id"], 1);

    let wrong_type = rpc(
        &server,
        2,
        "tools/call",
        json!({"name": "delete_job", "arguments": {"id": "one"}}),
    );
    assert_eq!(wrong_type["error"]["code"], -32602);

    let short_phone = rpc(
        &server,
        3,
        "tools/call",
        json!({"name": "create_profile", "arguments": {
            "name": "Ana", "email": "ana@example.com", "phone": "123", "skills": []
        }}),
    );
    assert_eq!(short_phone["error"]["code"], -32602);

    let unknown = rpc(&server, 4, "tools/call", json!({"name": "hire_everyone", "arguments": {}}));
    assert_eq!(unknown["error"]["code"], -32601);

    let unknown_method = rpc(&server, 5, "prompts/list", json!({}));
    assert_eq!(unknown_method["error"]["code"], -32601);
}

#[test]
fn filter_tools_match_partially_and_ignore_empty_arguments() {
    let server = demo_server();

    let by_name = call_tool(&server, 1, "filter_profiles", json!({"name": "shrey"}));
    assert_eq!(by_name["data"]["count"], 1);
    assert_eq!(by_name["data"]["profiles"][0]["name"], "Shrey Singhal");

    let by_company = call_tool(&server, 2, "filter_profiles", json!({"company": "studio", "email": ""}));
    assert_eq!(by_company["data"]["count"], 1);
    assert_eq!(by_company["data"]["profiles"][0]["id"], 3);

    let nobody = call_tool(&server, 3, "filter_profiles", json!({"name": "xyz"}));
    assert_eq!(nobody["data"], json!({"count": 0, "profiles": []}));

    let everyone = call_tool(&server, 4, "filter_profiles", json!({}));
    assert_eq!(everyone["data"]["count"], 3);
    assert_eq!(everyone.get("error"), Some(&Value::Null));

    let remote_seo = call_tool(
        &server,
        5,
        "filter_jobs",
        json!({"location": "remote", "skillsRequired": "seo"}),
    );
    assert_eq!(remote_seo["data"]["count"], 1);
    assert_eq!(remote_seo["data"]["jobs"][0]["id"], 2);

    let well_paid = call_tool(&server, 6, "filter_jobs", json!({"salary": 1_200_000}));
    let ids = well_paid["data"]["jobs"]
        .as_array()
        .expect("jobs")
        .iter()
        .filter_map(|job| job["id"].as_u64())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn match_tools_sample_existing_records() {
    let server = demo_server();
    call_tool(&server, 1, "create_job", new_job("Data Engineer", 900_000));

    let matched = call_tool(&server, 2, "match_jobs_for_profile", json!({"profileId": 2}));
    assert_eq!(matched["data"]["profileId"], 2);
    assert_eq!(matched["data"]["totalMatches"], 3);
    let jobs = matched["data"]["matchedJobs"].as_array().expect("matched jobs");
    assert_eq!(jobs.len(), 3);
    let mut ids = jobs.iter().filter_map(|job| job["id"].as_u64()).collect::<Vec<_>>();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 3);
    assert!(ids.iter().all(|id| (1..=4).contains(id)));

    let matched = call_tool(&server, 3, "match_profiles_for_job", json!({"jobId": 1}));
    assert_eq!(matched["data"]["jobId"], 1);
    assert_eq!(matched["data"]["matchedProfiles"].as_array().map(Vec::len), Some(3));
}

#[test]
fn resources_read_lists_single_records_and_filters() {
    let server = demo_server();

    let response = rpc(&server, 1, "resources/read", json!({"uri": "list://jobs"}));
    assert_eq!(response["result"]["contents"][0]["uri"], "list://jobs");
    assert_eq!(response["result"]["contents"][0]["mimeType"], "application/json");

    let profile = read_resource(&server, "profile://2");
    assert_eq!(profile["name"], "Shrey Singhal");
    let job = read_resource(&server, "job://3");
    assert_eq!(job["title"], "UI/UX Designer");

    let remote = read_resource(&server, "jobs://filter?location=Remote");
    assert_eq!(remote.as_array().map(Vec::len), Some(1));

    let exact_salary = read_resource(&server, "jobs://filter?salary=1200000");
    assert_eq!(exact_salary[0]["id"], 2);
    let no_salary = read_resource(&server, "jobs://filter?salary=1200001");
    assert_eq!(no_salary, json!([]));

    let encoded = read_resource(&server, "profiles://filter?skills=Google+Analytics&location=rem");
    assert_eq!(encoded[0]["id"], 2);

    let both_skills = read_resource(&server, "profiles://filter?skills=figma&skills=sketch");
    assert_eq!(both_skills.as_array().map(Vec::len), Some(1));
    assert_eq!(both_skills[0]["id"], 3);
    let conflicting = read_resource(&server, "profiles://filter?skills=figma&skills=django");
    assert_eq!(conflicting, json!([]));
}

#[test]
fn repeated_query_keys_require_every_value() {
    let server = demo_server();

    let seo_and_wordpress =
        read_resource(&server, "jobs://filter?skillsRequired=seo&skillsRequired=wordpress");
    assert_eq!(seo_and_wordpress.as_array().map(Vec::len), Some(1));
    assert_eq!(seo_and_wordpress[0]["id"], 2);

    // Each value alone matches a job; together no single job has both.
    assert_eq!(read_resource(&server, "jobs://filter?location=remote").as_array().map(Vec::len), Some(1));
    assert_eq!(read_resource(&server, "jobs://filter?location=mumbai").as_array().map(Vec::len), Some(1));
    assert_eq!(read_resource(&server, "jobs://filter?location=remote&location=mumbai"), json!([]));

    let mixed = read_resource(
        &server,
        "profiles://filter?skills=python&location=bangalore&skills=docker",
    );
    assert_eq!(mixed.as_array().map(Vec::len), Some(1));
    assert_eq!(mixed[0]["name"], "Jahnavi Jha");
    let one_miss = read_resource(
        &server,
        "profiles://filter?skills=python&location=bangalore&skills=figma",
    );
    assert_eq!(one_miss, json!([]));

    let everything = read_resource(&server, "profiles://filter");
    assert_eq!(everything.as_array().map(Vec::len), Some(3));
}

#[test]
fn unknown_resources_are_not_found() {
    let server = demo_server();
    for uri in ["profile://99", "profile://abc", "profiles://42", "nothing://here", "job://1?x=1"] {
        let response = rpc(&server, 1, "resources/read", json!({"uri": uri}));
        assert_eq!(response["error"]["code"], -32002, "uri {uri}");
    }
    let response = rpc(&server, 2, "resources/read", json!({}));
    assert_eq!(response["error"]["code"], -32602);
}

#[test]
fn completion_suggests_ids_and_field_values() {
    let server = empty_server(IdPolicy::MaxPlusOne);
    for n in 1..=12 {
        call_tool(&server, n, "create_profile", new_profile(&format!("User{n}")));
    }
    for id in [3, 4, 5, 6, 7, 8, 9, 10, 11] {
        call_tool(&server, 100 + id, "delete_profile", json!({"id": id}));
    }

    let ids = rpc(
        &server,
        1,
        "completion/complete",
        json!({
            "ref": {"type": "ref/resource", "uri": "profile://{id}"},
            "argument": {"name": "id", "value": "2"}
        }),
    );
    assert_eq!(ids["result"]["completion"]["values"], json!(["2", "12"]));
    assert_eq!(ids["result"]["completion"]["hasMore"], false);

    let server = demo_server();
    let skills = rpc(
        &server,
        2,
        "completion/complete",
        json!({
            "ref": {"type": "ref/resource", "uri": "jobs://filter{?title,company,location,experienceRequired,salary,description,skillsRequired}"},
            "argument": {"name": "skillsRequired", "value": "SE"}
        }),
    );
    let values = skills["result"]["completion"]["values"]
        .as_array()
        .expect("values")
        .iter()
        .filter_map(Value::as_str)
        .collect::<Vec<_>>();
    assert_eq!(values, vec!["SEO", "SEM", "UX Research", "User Testing"]);

    let unknown_variable = rpc(
        &server,
        3,
        "completion/complete",
        json!({
            "ref": {"type": "ref/resource", "uri": "profile://{id}"},
            "argument": {"name": "name", "value": "a"}
        }),
    );
    assert_eq!(unknown_variable["result"]["completion"]["values"], json!([]));

    let unknown_template = rpc(
        &server,
        4,
        "completion/complete",
        json!({
            "ref": {"type": "ref/resource", "uri": "widgets://{id}"},
            "argument": {"name": "id", "value": ""}
        }),
    );
    assert_eq!(unknown_template["result"]["completion"]["total"], 0);
}
