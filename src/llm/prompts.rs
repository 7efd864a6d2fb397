//! Prompt and response-schema construction for the fallback classifier.
//!
//! The system instruction enumerates the allowed role vocabulary for one
//! statement type so the model never has to guess identifiers; the response
//! schema additionally constrains `calc_tags` to that same list. The
//! response is still revalidated after decoding.

use crate::roles::roles_for_statement;
use crate::schema::StatementType;
use serde_json::json;

pub fn classification_system_prompt(statement: StatementType) -> String {
    let mut prompt = format!(
        "You are a financial statement line-item classifier.\n\
         You receive line items from a company's {} and assign each one zero or more\n\
         calculation roles from a fixed vocabulary.\n\n\
         ## ALLOWED ROLES\n",
        statement.label()
    );

    for role in roles_for_statement(statement) {
        prompt.push_str(&format!("- `{}`: {}\n", role.as_str(), role.definition()));
    }

    prompt.push_str(
        "\n## RULES\n\
         1. Use ONLY role identifiers from the ALLOWED ROLES list. Never invent new ones.\n\
         2. When uncertain, return an empty `calc_tags` list for that line. Do not guess.\n\
         3. Prefer totals over subcomponents: tag the consolidated total line, not the\n\
            segment or sub-account rows that feed into it.\n\
         4. Lines with `is_abstract: true` are section headers; always give them an\n\
            empty `calc_tags` list.\n\
         5. Echo each `line_id` back exactly as received, one entry per line item.\n\n\
         ## OUTPUT FORMAT\n\
         Return ONLY valid JSON: {\"tags\": [{\"line_id\": \"...\", \"calc_tags\": [\"...\"]}]}\n",
    );

    prompt
}

/// JSON Schema passed as the generation constraint: the response object with
/// `calc_tags` limited to the statement's allowed identifiers.
pub fn classification_response_schema(statement: StatementType) -> serde_json::Value {
    let allowed: Vec<&str> = roles_for_statement(statement)
        .iter()
        .map(|role| role.as_str())
        .collect();

    json!({
        "type": "object",
        "properties": {
            "tags": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "line_id": { "type": "string" },
                        "calc_tags": {
                            "type": "array",
                            "items": { "type": "string", "enum": allowed }
                        }
                    },
                    "required": ["line_id", "calc_tags"]
                }
            }
        },
        "required": ["tags"]
    })
}
