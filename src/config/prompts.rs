//! Prompt templates for vidqa.
//!
//! Prompts can be customized by placing a `rag.toml` file in the custom prompts directory.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").expect("valid placeholder regex"))
}

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub rag: RagPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for answer generation.
///
/// Available variables: `{{context}}`, `{{history}}`, `{{question}}` and
/// `{{response_language}}`, plus any custom variables from the config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    pub system: String,
    pub user: String,
    /// Rendered in place of `{{history}}` before the first turn.
    pub empty_history: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a helpful AI assistant that answers questions based on YouTube video transcripts.

IMPORTANT INSTRUCTIONS:
- Answer ONLY using information from the provided context
- The context may be in Hindi, English, or any other language
- ALWAYS respond in {{response_language}}, regardless of the question language or context language
- If the context is in another language, translate the information to {{response_language}} in your response
- If the context doesn't contain enough information, say: "I don't have enough information in the transcript to answer that"
- Use the previous conversation only to understand follow-up questions
- Be concise, clear, and specific
- Use direct quotes when relevant (translated to {{response_language}} if needed)
- Maintain a conversational but informative tone"#
                .to_string(),

            user: r#"Context from video transcript (may be in any language):
{{context}}

Previous conversation:
{{history}}

Question: {{question}}

Remember: Your response MUST be in {{response_language}} only.

Answer:"#
                .to_string(),

            empty_history: "(no previous conversation)".to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are resolved in one pass over the template; substituted
    /// values are inserted verbatim. Unknown placeholders are left as they are.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        placeholder_re()
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
