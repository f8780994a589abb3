//! Lexical authority classifier
//!
//! A word is looked up one whitespace-separated token at a time. The first
//! token that the authority reports zero results for, or whose lookup fails,
//! makes the whole word Unknown and stops further lookups.

use crate::config::LookupConfig;
use crate::state::Classification;
use crate::HarvestError;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

/// Outcome of classifying one word
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Every queried token produced an answer
    Classified(Classification),

    /// A token lookup errored or returned a non-success status
    Failed {
        /// The token whose lookup failed
        token: String,
        /// Error description
        error: String,
    },
}

impl LookupOutcome {
    /// Classification to record; a failed lookup counts as Unknown
    pub fn classification(&self) -> Classification {
        match self {
            Self::Classified(classification) => *classification,
            Self::Failed { .. } => Classification::Unknown,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Anything that can classify a slang word
#[async_trait::async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, word: &str) -> LookupOutcome;
}

/// Answer for a single token
enum TokenLookup {
    Found,
    NotFound,
    Failed(String),
}

/// Classifier backed by a dictionary search endpoint
pub struct LexicalAuthorityClassifier {
    client: Client,
    search_url: Url,
    user_agent: String,
}

impl LexicalAuthorityClassifier {
    /// Creates a classifier that queries `config.search_url`
    ///
    /// The client's timeout applies to every token lookup.
    pub fn new(client: Client, config: &LookupConfig) -> Result<Self, HarvestError> {
        Ok(Self {
            client,
            search_url: Url::parse(&config.search_url)?,
            user_agent: config.user_agent.clone(),
        })
    }

    /// Search URL for one token: `{search_url}?scope=Entries&q={token}`
    pub fn query_url(&self, token: &str) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("scope", "Entries")
            .append_pair("q", token);
        url
    }

    async fn lookup_token(&self, token: &str) -> TokenLookup {
        let response = match self
            .client
            .get(self.query_url(token))
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return TokenLookup::Failed(e.to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            return TokenLookup::Failed(format!("HTTP {}", status.as_u16()));
        }

        match response.text().await {
            Ok(body) if reports_no_results(&body) => TokenLookup::NotFound,
            Ok(_) => TokenLookup::Found,
            Err(e) => TokenLookup::Failed(e.to_string()),
        }
    }
}

#[async_trait::async_trait]
impl Classifier for LexicalAuthorityClassifier {
    async fn classify(&self, word: &str) -> LookupOutcome {
        for token in word.split_whitespace() {
            match self.lookup_token(token).await {
                TokenLookup::Found => continue,
                TokenLookup::NotFound => {
                    tracing::debug!("No dictionary entry for token {:?} of {:?}", token, word);
                    return LookupOutcome::Classified(Classification::Unknown);
                }
                TokenLookup::Failed(error) => {
                    return LookupOutcome::Failed {
                        token: token.to_string(),
                        error,
                    };
                }
            }
        }

        LookupOutcome::Classified(Classification::Known)
    }
}

/// Whether a search result page says it found nothing
///
/// The page reports its hit count in `div.searchSummary`; a summary starting
/// with `0 result` means no entry. A page without a summary counts as a hit.
pub fn reports_no_results(html: &str) -> bool {
    let Ok(summary_selector) = Selector::parse("div.searchSummary") else {
        return false;
    };

    let document = Html::parse_document(html);
    let summary = document
        .select(&summary_selector)
        .next()
        .map(|element| {
            let raw: String = element.text().collect();
            raw.split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .unwrap_or_default();

    summary.starts_with("0 result")
}
