//! Platform share links.
//!
//! Builds the "compose a post" intent URL each platform accepts, with the
//! post text percent-encoded into the query string.

use reqwest::Url;
use thiserror::Error;

use remix_types::platform::Platform;

const TWITTER_INTENT: &str = "https://twitter.com/intent/tweet";
const LINKEDIN_SHARE: &str = "https://www.linkedin.com/sharing/share-offsite/";

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("invalid page url '{url}': {reason}")]
    InvalidPageUrl { url: String, reason: String },

    #[error("failed to build share url: {0}")]
    Build(String),
}

/// Build the share URL for `content` on `platform`.
///
/// LinkedIn's share endpoint also takes the page being shared; pass it as
/// `page_url`. Twitter ignores it.
pub fn share_url(
    platform: Platform,
    content: &str,
    page_url: Option<&str>,
) -> Result<Url, ShareError> {
    match platform {
        Platform::Twitter => Url::parse_with_params(TWITTER_INTENT, &[("text", content)])
            .map_err(|e| ShareError::Build(e.to_string())),
        Platform::LinkedIn => {
            let mut params: Vec<(&str, &str)> = Vec::with_capacity(2);
            if let Some(page) = page_url {
                Url::parse(page).map_err(|e| ShareError::InvalidPageUrl {
                    url: page.to_string(),
                    reason: e.to_string(),
                })?;
                params.push(("url", page));
            }
            params.push(("text", content));
            Url::parse_with_params(LINKEDIN_SHARE, &params)
                .map_err(|e| ShareError::Build(e.to_string()))
        }
    }
}
