use anyhow::{Context, Result};
use serde_json::json;
use tera::{Context as TeraContext, Tera};

use crate::dictionary::DictionaryEntry;

const SYSTEM_PROMPT_TEMPLATE: &str = include_str!("templates/system_prompt.tera");

pub const SOURCE_LANGUAGE: &str = "Polish";
pub const TARGET_LANGUAGE: &str = "Slovian";

/// The two halves of a completion request.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Combines the fixed instruction set with the original text and its
/// dictionary hits. Hits carry only `pl`/`sl`/`tag`, keeping the payload
/// bounded.
pub fn build_prompt(text: &str, hits: &[&DictionaryEntry]) -> Result<Prompt> {
    let user = serde_json::to_string(&json!({
        "text": text,
        "dictionary_hits": hits,
    }))?;
    Ok(Prompt {
        system: render_system_prompt()?,
        user,
    })
}

pub fn render_system_prompt() -> Result<String> {
    let mut context = TeraContext::new();
    context.insert("source_lang", SOURCE_LANGUAGE);
    context.insert("target_lang", TARGET_LANGUAGE);
    let rendered = Tera::one_off(SYSTEM_PROMPT_TEMPLATE, &context, false)
        .with_context(|| "failed to render system prompt")?;
    Ok(rendered.trim_end().to_string())
}
