mod common;

use common::*;
use deep_research::session::SessionItem;
use deep_research::{NoopHooks, PreferenceContext, ResearchError, SessionStore, SystemMonitor};
use serde_json::json;
use std::sync::Arc;

const REQUIREMENTS: &str = "AI fitness coach app for adults aged 25-45 on a freemium subscription.";

fn happy_path_script() -> Vec<String> {
    vec![
        "1. Market size\n2. Competitors\n3. Financials".to_string(),
        call("search_agent", json!({"input": "Research the AI fitness coaching market"})),
        call("search_web", json!({"query": "AI fitness coach market size"})),
        "The AI fitness market is growing fast.".to_string(),
        call("analysis_agent", json!({"input": "Analyze: market growing fast"})),
        "Viable, moderate competition.".to_string(),
        call("reports_agent", json!({"input": "Write up: viable, moderate competition"})),
        "Draft report.".to_string(),
        "Final report: the idea is viable.".to_string(),
    ]
}

#[tokio::test]
async fn test_full_pipeline_counts_one_handoff() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(test_settings(dir.path()), ScriptedModel::new(happy_path_script()), ScriptedSearch::ok());
    let monitor = Arc::new(SystemMonitor::quiet());

    let report = h
        .service
        .execute_research_plan(REQUIREMENTS, PreferenceContext::new("Ada", 2), monitor.clone())
        .await
        .unwrap()
        .expect("research should run");

    assert_eq!(report.report(), "Final report: the idea is viable.");
    assert!(report.plan.research_plan.starts_with("1. Market size"));
    assert!(report.run.skipped_steps.is_empty());
    assert_eq!(
        report.run.consulted,
        vec!["search_agent", "analysis_agent", "reports_agent"]
    );

    let stats = monitor.stats();
    assert_eq!(stats.handoffs, 1);
    assert_eq!(
        stats.active_agents,
        vec![
            "strategic_planner_agent",
            "orchestrator_agent",
            "search_agent",
            "analysis_agent",
            "reports_agent",
        ]
    );
    assert_eq!(stats.tool_usage["search_agent"], 1);
    assert_eq!(stats.tool_usage["search_web"], 1);
    assert_eq!(stats.tool_usage["analysis_agent"], 1);
    assert_eq!(stats.tool_usage["reports_agent"], 1);

    // preferences reach the search tools
    assert_eq!(h.search.requests.lock().unwrap()[0].max_results, 2);

    let saved = report.saved_to.expect("report file");
    let written = std::fs::read_to_string(saved).unwrap();
    assert!(written.contains(&format!("**Research Topic:** {}", REQUIREMENTS)));
    assert!(written.contains("Final report: the idea is viable."));
}

#[tokio::test]
async fn test_sub_agent_internals_stay_hidden() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(test_settings(dir.path()), ScriptedModel::new(happy_path_script()), ScriptedSearch::ok());

    h.service
        .execute_research_plan(REQUIREMENTS, PreferenceContext::default(), Arc::new(NoopHooks))
        .await
        .unwrap();

    // request 4 is the orchestrator's second round, right after the search agent returned
    let orchestrator_view = h.model.prompt(4);
    assert!(orchestrator_view.contains("Result from search_agent:\nThe AI fitness market is growing fast."));
    assert!(!orchestrator_view.contains("Result from search_web"));
}

#[tokio::test]
async fn test_search_failure_is_text_and_the_loop_continues() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(test_settings(dir.path()), ScriptedModel::new(happy_path_script()), ScriptedSearch::failing());

    let report = h
        .service
        .execute_research_plan(REQUIREMENTS, PreferenceContext::default(), Arc::new(NoopHooks))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.report(), "Final report: the idea is viable.");
    // request 3 is the search agent's second round, after the failed search
    let search_view = h.model.prompt(3);
    assert!(search_view.contains("Result from search_web:\nSearch failed: "));
    assert!(search_view.contains("connection reset by peer"));
}

#[tokio::test]
async fn test_failed_sub_agent_is_text_and_the_run_finishes() {
    let dir = tempfile::tempdir().unwrap();
    let settings = deep_research::Settings {
        max_search_rounds: 1,
        ..test_settings(dir.path())
    };
    let script = vec![
        "plan".to_string(),
        call("search_agent", json!({"input": "Research the market"})),
        // the search agent spends its only round on a tool call
        call("search_web", json!({"query": "AI fitness coach market size"})),
        call("analysis_agent", json!({"input": "Analyze what we have"})),
        "Not enough data.".to_string(),
        call("reports_agent", json!({"input": "Write up"})),
        "Draft report.".to_string(),
        "Partial report.".to_string(),
    ];
    let h = harness(settings, ScriptedModel::new(script), ScriptedSearch::ok());
    let monitor = Arc::new(SystemMonitor::quiet());

    let report = h
        .service
        .execute_research_plan(REQUIREMENTS, PreferenceContext::default(), monitor.clone())
        .await
        .unwrap()
        .expect("research should run");

    assert_eq!(report.report(), "Partial report.");
    assert!(report.saved_to.is_some());
    assert_eq!(h.model.remaining(), 0);

    // request 3 is the orchestrator's second round, after the search agent gave up
    let orchestrator_view = h.model.prompt(3);
    assert!(orchestrator_view.contains("Result from search_agent:\nsearch_agent failed: "));

    let stats = monitor.stats();
    assert_eq!(stats.tool_usage["search_agent"], 1);
    assert_eq!(stats.tool_usage["search_web"], 1);
}

#[tokio::test]
async fn test_blank_requirements_decline_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(test_settings(dir.path()), ScriptedModel::new(happy_path_script()), ScriptedSearch::ok());
    let monitor = Arc::new(SystemMonitor::quiet());

    let result = h
        .service
        .execute_research_plan("   ", PreferenceContext::default(), monitor.clone())
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(h.model.call_count(), 0);
    assert!(monitor.stats().active_agents.is_empty());
}

#[tokio::test]
async fn test_orchestrator_round_limit() {
    let dir = tempfile::tempdir().unwrap();
    let settings = deep_research::Settings {
        max_orchestrator_rounds: 3,
        ..test_settings(dir.path())
    };
    let mut script = vec!["plan".to_string()];
    script.extend(std::iter::repeat(call("get_today_date", json!({}))).take(3));
    let h = harness(settings, ScriptedModel::new(script), ScriptedSearch::ok());
    let monitor = Arc::new(SystemMonitor::quiet());

    let err = h
        .service
        .execute_research_plan(REQUIREMENTS, PreferenceContext::default(), monitor.clone())
        .await
        .unwrap_err();

    match err {
        ResearchError::RoundLimitExceeded { agent, rounds } => {
            assert_eq!(agent, "orchestrator_agent");
            assert_eq!(rounds, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(monitor.stats().tool_usage["get_today_date"], 3);
}

#[tokio::test]
async fn test_final_answer_before_search_is_sent_back() {
    let dir = tempfile::tempdir().unwrap();
    let script = vec![
        "plan".to_string(),
        "Here is my report without any research.".to_string(),
        call("search_agent", json!({"input": "Research it"})),
        "Findings.".to_string(),
        "Final report with findings.".to_string(),
    ];
    let h = harness(test_settings(dir.path()), ScriptedModel::new(script), ScriptedSearch::ok());

    let report = h
        .service
        .execute_research_plan(REQUIREMENTS, PreferenceContext::default(), Arc::new(NoopHooks))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.report(), "Final report with findings.");
    assert!(h.model.prompt(2).contains("You have not consulted search_agent yet."));
    assert_eq!(report.run.skipped_steps, vec!["analysis_agent", "reports_agent"]);
    assert_eq!(report.run.rounds, 3);
}

#[tokio::test]
async fn test_unknown_capability_does_not_stop_the_loop() {
    let dir = tempfile::tempdir().unwrap();
    let script = vec![
        "plan".to_string(),
        call("crystal_ball", json!({})),
        call("search_agent", json!({"input": "Research it"})),
        "Findings.".to_string(),
        "Final.".to_string(),
    ];
    let h = harness(test_settings(dir.path()), ScriptedModel::new(script), ScriptedSearch::ok());

    let report = h
        .service
        .execute_research_plan(REQUIREMENTS, PreferenceContext::default(), Arc::new(NoopHooks))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.report(), "Final.");
    assert!(h.model.prompt(2).contains("Unknown capability 'crystal_ball'"));
}

#[tokio::test]
async fn test_handoff_strips_tool_history() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(test_settings(dir.path()), ScriptedModel::new(happy_path_script()), ScriptedSearch::ok());
    let key = h.service.planner_session_key();
    h.store
        .append(
            &key,
            &[
                SessionItem::user("Earlier context"),
                SessionItem::tool_call("get_today_date", json!({})),
                SessionItem::tool_result("get_today_date", "2024-01-01 00:00:00"),
            ],
        )
        .await
        .unwrap();

    h.service
        .execute_research_plan(REQUIREMENTS, PreferenceContext::default(), Arc::new(NoopHooks))
        .await
        .unwrap()
        .unwrap();

    // the planner saw the tool records, the orchestrator did not
    assert!(h.model.prompt(0).contains("Result from get_today_date"));
    let orchestrator_view = h.model.prompt(1);
    assert!(orchestrator_view.contains("Earlier context"));
    assert!(orchestrator_view.contains(REQUIREMENTS));
    assert!(orchestrator_view.contains("1. Market size"));
    assert!(!orchestrator_view.contains("Result from get_today_date"));

    let planner_log = h.store.history(&key).await.unwrap();
    assert!(planner_log.len() > 5);
}

#[tokio::test]
async fn test_unwritable_output_still_returns_report() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();
    let h = harness(test_settings(&blocker), ScriptedModel::new(happy_path_script()), ScriptedSearch::ok());

    let report = h
        .service
        .execute_research_plan(REQUIREMENTS, PreferenceContext::default(), Arc::new(NoopHooks))
        .await
        .unwrap()
        .unwrap();

    assert!(report.saved_to.is_none());
    assert_eq!(report.report(), "Final report: the idea is viable.");
}
