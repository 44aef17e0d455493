//! End-to-end scenarios
//!
//! Multi-step workflows that cross `cami-core` and the MCP server, the way a
//! user or an assistant would run them.

use std::fs;

use cami_core::{
    AgentSource, DeploymentStatus, Workspace, deploy_and_record, load_agents_from_sources,
    scan_all_locations, update_claude_md,
};
use cami_fs::WorkspaceLayout;
use cami_mcp::CamiMcpServer;
use cami_test_utils::{TestWorkspace, write_agent};
use serde_json::{Value, json};

fn open(fixture: &TestWorkspace) -> Workspace {
    let ws = Workspace::open(WorkspaceLayout::at(fixture.root()));
    ws.init().unwrap();
    ws
}

async fn call_tool(server: &CamiMcpServer, name: &str, arguments: Value) -> Value {
    let request = json!({
        "jsonrpc": "2.0",
        "id": name,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments }
    });
    let raw = server.handle_message(&request.to_string()).await.unwrap();
    let response: Value = serde_json::from_str(&raw).unwrap();
    let result = &response["result"];
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(result.get("is_error").is_none(), "{name} failed: {text}");
    serde_json::from_str(text).unwrap()
}

#[test]
fn team_override_then_upgrade_cycle() {
    let fixture = TestWorkspace::new();
    let ws = open(&fixture);
    let company = fixture.create_source("company", &[("frontend", "1.0.0"), ("backend", "1.0.0")]);
    let team = fixture.create_source("team", &[("frontend", "1.5.0")]);
    ws.config()
        .update(|c| {
            c.add_source(AgentSource::local("company", &company, 50))?;
            c.add_source(AgentSource::local("team", &team, 100))
        })
        .unwrap();
    let project = fixture.create_project("webapp", &[]);
    ws.config().update(|c| c.add_location("webapp", &project)).unwrap();

    let report = deploy_and_record(&ws, &["frontend".into(), "backend".into()], &project, false)
        .unwrap();
    assert_eq!(report.breakdown().succeeded, 2);

    let manifest = ws.manifests().read_project(&project).unwrap();
    let frontend = manifest.agents.iter().find(|a| a.name == "frontend").unwrap();
    assert_eq!(frontend.source, "team");
    assert_eq!(frontend.version, "1.5.0");
    let backend = manifest.agents.iter().find(|a| a.name == "backend").unwrap();
    assert_eq!(backend.source, "company");

    // A new team release makes the deployed copy stale
    write_agent(&team, "frontend", "1.6.0");
    let config = ws.load_config().unwrap();
    let available = load_agents_from_sources(&config.source_specs()).into_records();
    let scan = scan_all_locations(&config.deploy_locations, &available);
    let status = |name: &str| {
        scan.locations[0]
            .agents
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.status)
            .unwrap()
    };
    assert_eq!(status("frontend"), DeploymentStatus::UpdateAvailable);
    assert_eq!(status("backend"), DeploymentStatus::UpToDate);

    let redeploy = deploy_and_record(&ws, &["frontend".into()], &project, true).unwrap();
    assert_eq!(redeploy.breakdown().succeeded, 1);

    let manifest = ws.manifests().read_project(&project).unwrap();
    assert_eq!(manifest.agents.len(), 2);
    let frontend = manifest.agents.iter().find(|a| a.name == "frontend").unwrap();
    assert_eq!(frontend.version, "1.6.0");

    let central = ws.manifests().read_central().unwrap();
    assert_eq!(central.deployments.len(), 1);
}

#[test]
fn claude_md_keeps_user_content_across_updates() {
    let fixture = TestWorkspace::new();
    let project = fixture.create_project("app", &[("frontend", "1.0.0")]);
    let claude_md = project.join("CLAUDE.md");
    fs::write(&claude_md, "# My Project\n\nHand-written notes.\n").unwrap();

    update_claude_md(&project, None, false).unwrap();
    write_agent(&project.join(".claude/agents"), "backend", "2.0.0");
    let second = update_claude_md(&project, None, false).unwrap();

    assert_eq!(second.agent_count, 2);
    let content = fs::read_to_string(&claude_md).unwrap();
    assert!(content.starts_with("# My Project\n\nHand-written notes.\n"));
    assert_eq!(content.matches("<!-- /CAMI-MANAGED: DEPLOYED-AGENTS -->").count(), 1);
    assert!(content.contains("### backend (v2.0.0)"));
    assert!(content.contains("### frontend (v1.0.0)"));
}

#[tokio::test]
async fn assistant_onboards_and_deploys_through_mcp() {
    let fixture = TestWorkspace::new();
    let ws = open(&fixture);
    fixture.create_source("starter", &[("reviewer", "1.0.0"), ("planner", "")]);
    let project = fixture.create_project("service", &[]);
    fs::create_dir_all(project.join(".claude")).unwrap();

    let mut server = CamiMcpServer::new(ws);
    server.initialize().await.unwrap();

    let onboard = call_tool(&server, "onboard", json!({})).await;
    assert_eq!(onboard["source_count"], 0);

    let reconciled = call_tool(&server, "reconcile_sources", json!({ "mode": "auto" })).await;
    assert_eq!(reconciled["added"], json!(["starter"]));

    let state = call_tool(&server, "detect_source_state", json!({ "source_name": "starter" })).await;
    assert_eq!(state["is_compliant"], false);

    call_tool(
        &server,
        "normalize_source",
        json!({
            "source_name": "starter",
            "add_versions": true,
            "add_descriptions": true,
            "create_camiignore": true
        }),
    )
    .await;
    let state = call_tool(&server, "detect_source_state", json!({ "source_name": "starter" })).await;
    assert_eq!(state["is_compliant"], true);

    let discovered = call_tool(
        &server,
        "discover_projects",
        json!({ "root": fixture.base().join("projects"), "empty_only": true }),
    )
    .await;
    assert_eq!(discovered["count"], 1);

    let deployed = call_tool(
        &server,
        "deploy_agents",
        json!({ "agent_names": ["reviewer", "planner"], "target_path": project }),
    )
    .await;
    assert_eq!(deployed["summary"]["succeeded"], 2);

    call_tool(&server, "add_location", json!({ "name": "service", "path": project })).await;
    let onboard = call_tool(&server, "onboard", json!({})).await;
    assert_eq!(onboard["source_count"], 1);
    assert_eq!(onboard["location_count"], 1);
    assert_eq!(onboard["total_agents"], 2);
}
