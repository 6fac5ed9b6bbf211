use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Default Twitter/X template: eight standalone tweets separated by the sentinel.
pub const TWITTER_DEFAULT_TEMPLATE: &str = "You are a social media expert and ghost writer. \
Generate exactly 8 complete, standalone tweets based on this blog post, matching its tone and \
voice closely. Each tweet should be a full thought of similar length (100-250 characters). Do not \
create title tweets or summaries - each tweet should provide valuable insight or a complete idea. \
Separate tweets with |||. Do not include any introductory text, hashtags, or emojis. Here is the \
blog post:";

/// Default LinkedIn template: five long-form posts separated by the sentinel.
pub const LINKEDIN_DEFAULT_TEMPLATE: &str = "You are a LinkedIn content expert and professional \
ghostwriter. Generate 5 engaging LinkedIn posts based on this content. Each post should be \
800-1200 characters, include line breaks for readability, and focus on providing professional \
insights or valuable business lessons. The tone should be professional yet conversational. Each \
post should end with a thought-provoking question to drive engagement. Separate posts with |||. \
Do not include hashtags or emojis. Here is the content:";

/// Social platform a post is written for.
///
/// The platform scopes both generation (system prompt, default template)
/// and persistence (saved posts are listed per platform).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    #[serde(rename = "linkedin")]
    LinkedIn,
}

impl Platform {
    /// Every supported platform, in display order.
    pub const ALL: [Platform; 2] = [Platform::Twitter, Platform::LinkedIn];

    /// Maximum post length accepted by the platform, in characters.
    pub fn char_limit(&self) -> usize {
        match self {
            Platform::Twitter => 280,
            Platform::LinkedIn => 3000,
        }
    }

    /// The template used when the user does not supply one.
    pub fn default_template(&self) -> &'static str {
        match self {
            Platform::Twitter => TWITTER_DEFAULT_TEMPLATE,
            Platform::LinkedIn => LINKEDIN_DEFAULT_TEMPLATE,
        }
    }

    /// Human label for a batch of generated units ("tweets", "LinkedIn posts").
    pub fn plural_label(&self) -> &'static str {
        match self {
            Platform::Twitter => "tweets",
            Platform::LinkedIn => "LinkedIn posts",
        }
    }

    /// Returns true if `content` fits within the platform's character limit.
    pub fn fits(&self, content: &str) -> bool {
        content.chars().count() <= self.char_limit()
    }
}

impl Default for Platform {
    fn default() -> Self {
        Platform::Twitter
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Twitter => write!(f, "twitter"),
            Platform::LinkedIn => write!(f, "linkedin"),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "twitter" | "x" => Ok(Platform::Twitter),
            "linkedin" => Ok(Platform::LinkedIn),
            other => Err(format!("invalid platform: '{other}'")),
        }
    }
}
