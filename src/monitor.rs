// Deep-Research: Lifecycle Monitor
// Observer hooks for agent runs and the console monitor that counts them

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Lifecycle events emitted while agents run. Every hook is a no-op by default.
#[async_trait]
pub trait RunHooks: Send + Sync {
    async fn on_agent_start(&self, _agent: &str) {}

    async fn on_llm_start(&self, _agent: &str) {}

    async fn on_llm_end(&self, _agent: &str) {}

    async fn on_tool_start(&self, _agent: &str, _tool: &str) {}

    async fn on_tool_end(&self, _agent: &str, _tool: &str, _result: &str) {}

    async fn on_handoff(&self, _from: &str, _to: &str) {}

    async fn on_agent_end(&self, _agent: &str, _output: &str) {}
}

/// Hooks that ignore everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl RunHooks for NoopHooks {}

/// Counters kept by [`SystemMonitor`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorStats {
    /// Agent names in start order; repeated starts are listed again
    pub active_agents: Vec<String>,
    pub tool_usage: BTreeMap<String, u32>,
    pub handoffs: u32,
}

/// Prints a system line per lifecycle event and keeps run statistics
#[derive(Debug, Default)]
pub struct SystemMonitor {
    stats: Mutex<MonitorStats>,
    quiet: bool,
}

impl SystemMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count events without printing
    pub fn quiet() -> Self {
        Self { quiet: true, ..Self::default() }
    }

    pub fn stats(&self) -> MonitorStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn emit(&self, line: String) {
        log::debug!("{}", line);
        if !self.quiet {
            println!("{}", line);
        }
    }
}

#[async_trait]
impl RunHooks for SystemMonitor {
    async fn on_agent_start(&self, agent: &str) {
        let active = if let Ok(mut s) = self.stats.lock() {
            s.active_agents.push(agent.to_string());
            s.active_agents.clone()
        } else {
            return;
        };
        self.emit(format!("🌅 SYSTEM: {} is now working", agent));
        self.emit(format!("   Active agents so far: {:?}", active));
    }

    async fn on_llm_start(&self, agent: &str) {
        self.emit(format!("📞 SYSTEM: {} is thinking...", agent));
    }

    async fn on_llm_end(&self, agent: &str) {
        self.emit(format!("🧠✨ SYSTEM: {} finished thinking", agent));
    }

    async fn on_tool_start(&self, _agent: &str, tool: &str) {
        let count = if let Ok(mut s) = self.stats.lock() {
            let count = s.tool_usage.entry(tool.to_string()).or_insert(0);
            *count += 1;
            *count
        } else {
            return;
        };
        self.emit(format!("🔨 SYSTEM: {} used {} times", tool, count));
    }

    async fn on_tool_end(&self, agent: &str, tool: &str, _result: &str) {
        self.emit(format!("✅🔨 SYSTEM: {} finished using {}", agent, tool));
    }

    async fn on_handoff(&self, from: &str, to: &str) {
        let handoffs = if let Ok(mut s) = self.stats.lock() {
            s.handoffs += 1;
            s.handoffs
        } else {
            return;
        };
        self.emit(format!("🏃‍♂️➡️🏃‍♀️ HANDOFF #{}: {} → {}", handoffs, from, to));
    }

    async fn on_agent_end(&self, agent: &str, _output: &str) {
        let stats = self.stats();
        self.emit(format!("✅ SYSTEM: {} completed their work", agent));
        self.emit(format!(
            "📊 STATS: {} agents used, {} handoffs",
            stats.active_agents.len(),
            stats.handoffs
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_monitor_counts_agents_tools_and_handoffs() {
        let monitor = SystemMonitor::quiet();
        monitor.on_agent_start("strategic_planner_agent").await;
        monitor.on_handoff("strategic_planner_agent", "orchestrator_agent").await;
        monitor.on_agent_start("orchestrator_agent").await;
        monitor.on_tool_start("orchestrator_agent", "search_agent").await;
        monitor.on_tool_start("orchestrator_agent", "search_agent").await;
        monitor.on_tool_start("orchestrator_agent", "get_today_date").await;

        let stats = monitor.stats();
        assert_eq!(stats.active_agents, vec!["strategic_planner_agent", "orchestrator_agent"]);
        assert_eq!(stats.tool_usage["search_agent"], 2);
        assert_eq!(stats.tool_usage["get_today_date"], 1);
        assert_eq!(stats.handoffs, 1);
    }

    #[tokio::test]
    async fn test_repeated_starts_are_listed_again() {
        let monitor = SystemMonitor::quiet();
        monitor.on_agent_start("search_agent").await;
        monitor.on_agent_start("search_agent").await;
        assert_eq!(monitor.stats().active_agents.len(), 2);
    }
}
