//! Prompt builder: renders the final prompt from a template and source text.
//!
//! Pure and synchronous. The template is a free-text instruction, so the
//! source text is interpolated verbatim with no escaping.

use remix_types::error::GenerationError;
use remix_types::generation::FinalPrompt;

/// Placeholder replaced by the source text when present in a template.
pub const TEXT_PLACEHOLDER: &str = "{text}";

/// Build the final prompt for one generation call.
///
/// If the template contains [`TEXT_PLACEHOLDER`], each occurrence is
/// replaced by the source text. Otherwise the source text is appended in
/// quotes after the template: `{template}: "{text}"`, or `{template} "{text}"`
/// when the template already ends with a colon.
///
/// # Errors
///
/// Returns [`GenerationError::InvalidInput`] if either input is empty or
/// whitespace-only.
pub fn build(source_text: &str, template: &str) -> Result<FinalPrompt, GenerationError> {
    if source_text.trim().is_empty() {
        return Err(GenerationError::InvalidInput(
            "source text cannot be empty".to_string(),
        ));
    }
    if template.trim().is_empty() {
        return Err(GenerationError::InvalidInput(
            "prompt template cannot be empty".to_string(),
        ));
    }

    let text = if template.contains(TEXT_PLACEHOLDER) {
        template.replace(TEXT_PLACEHOLDER, source_text)
    } else {
        let head = template.trim_end();
        if head.ends_with(':') {
            format!("{head} \"{source_text}\"")
        } else {
            format!("{head}: \"{source_text}\"")
        }
    };

    Ok(FinalPrompt::from_parts(
        text,
        source_text.to_string(),
        template.to_string(),
    ))
}
