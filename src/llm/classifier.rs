use crate::classify::{
    apply_role_assignments, apply_rule_table, build_payload, is_abstract, ClassificationResponse,
    FALLBACK_CONFIDENCE,
};
use crate::error::{NormalizerError, Result};
use crate::llm::client::GeminiClient;
use crate::llm::prompts::{classification_response_schema, classification_system_prompt};
use crate::llm::types::Content;
use crate::schema::{LineItem, Statement, StatementType};
use futures::future::join_all;
use log::{debug, info, warn};
use serde_json::json;
use std::time::Duration;
use tokio::time::timeout;

const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Role classifier: exact rule table first, language-model fallback for
/// whatever remains unmapped.
#[derive(Clone)]
pub struct RoleClassifier {
    client: GeminiClient,
    model: String,
    timeout: Duration,
}

impl RoleClassifier {
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Classify one statement's line items.
    ///
    /// The rule table handles standardized concepts deterministically; only
    /// unmapped, non-abstract items are sent to the service. The response is
    /// untrusted input and passes through the vocabulary allow-list before
    /// touching any line item. Infrastructure problems (transport, timeout,
    /// malformed JSON) are hard errors for this statement type; "no role
    /// found" never is.
    pub async fn classify(
        &self,
        statement_type: StatementType,
        mut line_items: Vec<LineItem>,
    ) -> Result<Vec<LineItem>> {
        let matched = apply_rule_table(statement_type, &mut line_items);

        let pending: Vec<LineItem> = line_items
            .iter()
            .filter(|item| item.roles.is_empty() && !is_abstract(item))
            .cloned()
            .collect();
        if pending.is_empty() {
            debug!(
                "{}: rule table covered all {} classifiable items",
                statement_type.prefix(),
                matched
            );
            return Ok(line_items);
        }

        let payload = build_payload(statement_type, &pending);
        let request = json!({
            "statement_type": statement_type,
            "lines": payload,
        });

        let raw = timeout(
            self.timeout,
            self.client.generate_content(
                &self.model,
                &classification_system_prompt(statement_type),
                vec![Content::user(serde_json::to_string_pretty(&request)?)],
                Some(classification_response_schema(statement_type)),
            ),
        )
        .await
        .map_err(|_| NormalizerError::ClassificationTimeout(self.timeout.as_secs()))??;

        let cleaned = clean_json_output(&raw);
        let response: ClassificationResponse = serde_json::from_str(&cleaned)
            .map_err(|e| NormalizerError::MalformedResponse(e.to_string()))?;

        let tagged = apply_role_assignments(
            statement_type,
            &mut line_items,
            &response,
            FALLBACK_CONFIDENCE,
        );
        info!(
            "{}: {} items via rule table, {} via fallback, {} sent",
            statement_type.prefix(),
            matched,
            tagged,
            pending.len()
        );

        Ok(line_items)
    }

    pub async fn classify_statement(&self, mut statement: Statement) -> Result<Statement> {
        statement.line_items = self
            .classify(statement.statement_type, statement.line_items)
            .await?;
        Ok(statement)
    }

    /// Classify several statements concurrently.
    ///
    /// Each statement runs as an independent task owning its own line items;
    /// a failure (or abandoned request) for one statement type never aborts
    /// the others. Callers get every outcome, successful or not.
    pub async fn classify_statements(
        &self,
        statements: Vec<Statement>,
    ) -> Vec<(StatementType, Result<Statement>)> {
        let mut types = Vec::with_capacity(statements.len());
        let mut handles = Vec::with_capacity(statements.len());
        for statement in statements {
            let classifier = self.clone();
            types.push(statement.statement_type);
            handles.push(tokio::spawn(async move {
                classifier.classify_statement(statement).await
            }));
        }

        let joined = join_all(handles).await;
        types
            .into_iter()
            .zip(joined)
            .map(|(statement_type, joined)| {
                let result = match joined {
                    Ok(result) => result,
                    Err(err) => Err(NormalizerError::ClassificationFailed(format!(
                        "classification task for {} aborted: {}",
                        statement_type, err
                    ))),
                };
                if let Err(err) = &result {
                    warn!("{} classification failed: {}", statement_type, err);
                }
                (statement_type, result)
            })
            .collect()
    }
}

fn clean_json_output(raw: &str) -> String {
    if let Some(start) = raw.find('{') {
        if let Some(end) = raw.rfind('}') {
            return raw[start..=end].to_string();
        }
    }
    raw.trim().to_string()
}
