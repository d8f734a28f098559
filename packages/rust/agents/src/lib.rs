//! LLM agents for the curation pipeline.
//!
//! Each [`AgentRole`] pairs a persona (system prompt) with task instructions.
//! The coordinator only sees the [`AgentInvoker`] seam; [`LlmAgents`] backs
//! it with the Anthropic Messages API.

mod anthropic;
mod prompts;
mod roles;

use async_trait::async_trait;
use tracing::{info, instrument};
use upscnews_shared::{AppConfig, Credentials, Result, SyllabusConfig, UpscNewsError};

pub use anthropic::AnthropicClient;
pub use prompts::task_prompt;
pub use roles::{AgentProfile, AgentRole};

/// Runs one agent over a stage input and returns its raw reply.
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    async fn invoke(&self, role: AgentRole, input: &str) -> Result<String>;
}

/// Production invoker: persona + task prompt + input, sent to the LLM.
#[derive(Clone)]
pub struct LlmAgents {
    client: AnthropicClient,
    api_key_present: bool,
    syllabus: SyllabusConfig,
}

impl LlmAgents {
    pub fn new(config: &AppConfig, credentials: &Credentials) -> Result<Self> {
        Ok(Self {
            client: AnthropicClient::new(&config.llm, credentials.llm_api_key.clone())?,
            api_key_present: !credentials.llm_api_key.trim().is_empty(),
            syllabus: config.syllabus.clone(),
        })
    }

    /// Verify that `role` can be invoked, without touching the network.
    pub fn check_role(&self, role: AgentRole) -> Result<()> {
        if self.client.model().trim().is_empty() {
            return Err(UpscNewsError::config(format!("{role}: no model configured")));
        }
        if !self.api_key_present {
            return Err(UpscNewsError::config(format!("{role}: LLM API key is empty")));
        }
        let no_topics = self.syllabus.topics.iter().all(|t| t.trim().is_empty());
        if role == AgentRole::Tagger && no_topics {
            return Err(UpscNewsError::config(format!(
                "{role}: syllabus.topics is empty"
            )));
        }
        let prompt = build_user_message(role, &self.syllabus, "");
        if prompt.trim().is_empty() {
            return Err(UpscNewsError::config(format!("{role}: task prompt is empty")));
        }
        Ok(())
    }
}

#[async_trait]
impl AgentInvoker for LlmAgents {
    #[instrument(
        skip_all,
        fields(role = %role, stage = %role.stage(), input_chars = input.len())
    )]
    async fn invoke(&self, role: AgentRole, input: &str) -> Result<String> {
        let system = role.profile().system_prompt();
        let user = build_user_message(role, &self.syllabus, input);
        let reply = self.client.complete(&system, &user).await?;
        info!(output_chars = reply.len(), "agent replied");
        Ok(reply)
    }
}

fn build_user_message(role: AgentRole, syllabus: &SyllabusConfig, input: &str) -> String {
    let task = task_prompt(role, syllabus);
    if input.is_empty() {
        task
    } else {
        format!("{task}\n\n{input}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials(key: &str) -> Credentials {
        Credentials {
            llm_api_key: key.into(),
            search_api_key: "serper".into(),
        }
    }

    #[test]
    fn check_role_passes_with_defaults() {
        let agents = LlmAgents::new(&AppConfig::default(), &credentials("sk")).unwrap();
        for role in AgentRole::ALL {
            agents.check_role(role).unwrap();
        }
    }

    #[test]
    fn check_role_rejects_blank_key_and_missing_topics() {
        let agents = LlmAgents::new(&AppConfig::default(), &credentials("  ")).unwrap();
        assert!(agents.check_role(AgentRole::NewsFetcher).is_err());

        let mut config = AppConfig::default();
        config.syllabus.topics.clear();
        let agents = LlmAgents::new(&config, &credentials("sk")).unwrap();
        assert!(agents.check_role(AgentRole::Tagger).is_err());
        assert!(agents.check_role(AgentRole::Linker).is_ok());
    }

    #[tokio::test]
    async fn fetcher_request_names_configured_sources() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(body_string_contains("favour these publications: Mint, PIB."))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "text", "text": "1. Headline"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = AppConfig::default();
        config.llm.base_url = server.uri();
        config.syllabus.news_sources = vec!["Mint".into(), "PIB".into()];
        let agents = LlmAgents::new(&config, &credentials("sk")).unwrap();

        let reply = agents
            .invoke(AgentRole::NewsFetcher, "1. Headline\n")
            .await
            .unwrap();
        assert_eq!(reply, "1. Headline");
    }

    #[tokio::test]
    async fn invoke_sends_persona_and_input() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(body_string_contains("UPSC News Summarizer"))
            .and(body_string_contains("Article 1 Title: Heavy rains"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [{"type": "text", "text": "[]"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = AppConfig::default();
        config.llm.base_url = server.uri();
        let agents = LlmAgents::new(&config, &credentials("sk")).unwrap();

        let reply = agents
            .invoke(AgentRole::Summarizer, "Article 1 Title: Heavy rains\n")
            .await
            .unwrap();
        assert_eq!(reply, "[]");
    }
}
