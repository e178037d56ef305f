//! Natural language to SQL plugin

use super::{Plugin, PluginDefinition, PluginRegistry};
use crate::database::{QueryRow, Repository};
use crate::features::completion::{Completion, CompletionClient, CompletionRequest, ResponseFormat};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;

pub const DEFAULT_PLUGIN_NAME: &str = "NLToSQL";

pub struct NlToSql {
    definition: PluginDefinition,
    client: Arc<dyn CompletionClient>,
}

impl NlToSql {
    pub fn new(
        registry: &PluginRegistry,
        name: &str,
        client: Arc<dyn CompletionClient>,
    ) -> Result<Self> {
        let definition = registry
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("Plugin not found: {}", name))?;
        Ok(Self { definition, client })
    }

    pub fn definition(&self) -> &PluginDefinition {
        &self.definition
    }

    fn request(&self, input: &str) -> CompletionRequest {
        let settings = &self.definition.settings;
        CompletionRequest::message(&self.definition.render(input), None)
            .with_response_format(ResponseFormat::Text)
            .with_max_tokens(settings.max_tokens)
            .with_temperature(settings.temperature)
            .with_top_p(settings.top_p)
            .with_n(settings.n)
            .with_stop(settings.stop.clone())
    }

    /// Ask the model for SQL answering `input`
    pub async fn generate_sql(&self, input: &str) -> Result<Completion> {
        debug!("Generating SQL with plugin {}", self.definition.name);
        self.client.complete(&self.request(input)).await
    }

    /// Generate SQL and run the first candidate against `repository`
    pub async fn generate_and_execute(
        &self,
        input: &str,
        repository: &dyn Repository,
    ) -> Result<Vec<QueryRow>> {
        let completion = self.generate_sql(input).await?;
        let sql = completion.choice(0)?.trim();
        info!("Executing generated query: {}", sql);
        repository.execute_query(sql).await
    }
}

#[async_trait]
impl Plugin for NlToSql {
    fn name(&self) -> &str {
        &self.definition.name
    }

    async fn run(&self, input: &str) -> Result<Completion> {
        self.generate_sql(input).await
    }
}
