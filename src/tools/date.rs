// Deep-Research: Date Lookup

use super::{Capability, RunContext};
use crate::error::Result;
use async_trait::async_trait;
use chrono::Local;
use serde_json::{json, Value};

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `get_today_date`: current local date and time
#[derive(Debug, Default, Clone, Copy)]
pub struct TodayDate;

#[async_trait]
impl Capability for TodayDate {
    fn name(&self) -> &str {
        "get_today_date"
    }

    fn description(&self) -> &str {
        "Get the current date and time."
    }

    fn parameters(&self) -> Value {
        json!({})
    }

    async fn invoke(&self, _ctx: &RunContext, _args: Value) -> Result<String> {
        Ok(Local::now().format(DATE_FORMAT).to_string())
    }
}
