//! Prompt rendering
//!
//! The prompt is a fixed template. Both column lists come from
//! [`schemadrift_core::render_list`], so equal reports always render to the
//! same bytes.

use minijinja::{context, Environment};
use schemadrift_core::DriftReport;

const TEMPLATE_NAME: &str = "drift_prompt.txt";

const TEMPLATE: &str = "\
You are a Snowflake expert.

Schema drift was detected between two daily snapshots ({{ base_date }} -> {{ new_date }}). Below are the changes:

Added Columns:
{{ added }}

Removed Columns:
{{ removed }}

Please:
1. Summarize what these changes mean.
2. Explain the potential impact on downstream objects like dynamic tables or stored procedures.
3. Suggest SQL fixes (e.g., ALTER TABLE, updated SELECTs, stored proc edits).

Return a clear explanation and sample SQL as needed.
";

/// Renders drift reports into narrative prompts
pub struct PromptRenderer {
    env: Environment<'static>,
}

impl PromptRenderer {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.add_template(TEMPLATE_NAME, TEMPLATE)?;
        Ok(Self { env })
    }

    /// Render the prompt for `report`
    pub fn render(&self, report: &DriftReport) -> Result<String, minijinja::Error> {
        self.env.get_template(TEMPLATE_NAME)?.render(context! {
            base_date => report.base_date.to_string(),
            new_date => report.new_date.to_string(),
            added => report.render_added(),
            removed => report.render_removed(),
        })
    }
}
