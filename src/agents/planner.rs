// Deep-Research: Strategic Planner
// One planning call, then a one-way handoff to the orchestrator

use super::orchestrator::{Orchestrator, ResearchRun};
use super::Agent;
use crate::error::Result;
use crate::llm::{self, CompletionModel, SystemPrompts};
use crate::models::ResearchPlan;
use crate::session::{to_messages, without_tool_items, SessionItem, SessionStore};
use crate::tools::RunContext;
use std::sync::Arc;

pub const PLANNER_AGENT: &str = "strategic_planner_agent";
pub const PLANNER_TEMPERATURE: f32 = 0.3;

/// What the planner stage produced
#[derive(Debug, Clone)]
pub struct PlannedResearch {
    pub plan: ResearchPlan,
    pub run: ResearchRun,
}

pub struct Planner {
    model: Arc<dyn CompletionModel>,
    store: Arc<dyn SessionStore>,
    session_key: String,
}

impl Planner {
    pub fn new(model: Arc<dyn CompletionModel>, store: Arc<dyn SessionStore>, session_key: &str) -> Self {
        Self {
            model,
            store,
            session_key: session_key.to_string(),
        }
    }

    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    /// Plan for `requirements`, then hand control to `orchestrator` for good
    pub async fn plan_and_hand_off(
        &self,
        requirements: &str,
        orchestrator: &Orchestrator,
        ctx: &RunContext,
    ) -> Result<PlannedResearch> {
        let hooks = ctx.hooks.clone();
        hooks.on_agent_start(self.name()).await;

        self.store
            .append(&self.session_key, &[SessionItem::user(requirements)])
            .await?;
        let history = self.store.history(&self.session_key).await?;

        hooks.on_llm_start(self.name()).await;
        let plan = llm::complete_with_system(
            &self.model,
            self.system_prompt(),
            &to_messages(&history),
            Some(PLANNER_TEMPERATURE),
        )
        .await?;
        hooks.on_llm_end(self.name()).await;

        let plan = ResearchPlan {
            research_plan: plan.trim().to_string(),
        };
        log::info!("Research plan ready ({} chars)", plan.research_plan.len());

        let plan_item = SessionItem::assistant(&plan.research_plan);
        self.store.append(&self.session_key, &[plan_item.clone()]).await?;

        hooks.on_handoff(self.name(), orchestrator.name()).await;

        let mut handed_off = without_tool_items(&history);
        handed_off.push(plan_item);

        let run = orchestrator.run(ctx, handed_off).await?;
        self.store.append(&self.session_key, &run.transcript).await?;

        Ok(PlannedResearch { plan, run })
    }
}

impl Agent for Planner {
    fn name(&self) -> &str {
        PLANNER_AGENT
    }

    fn system_prompt(&self) -> &str {
        SystemPrompts::planner()
    }
}
