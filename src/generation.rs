//! Article Generation
//! Mission: Draft pending articles per topic through a text-generation backend

use crate::models::Article;
use crate::store::ContentStore;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4";

const SYSTEM_PROMPT: &str = "You are a journalist writing insightful news articles.";

/// A subject area articles are generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Topic {
    pub sector: &'static str,
    pub subsectors: &'static [&'static str],
    pub audience: &'static str,
    pub perspective: &'static str,
}

pub const TOPICS: [Topic; 7] = [
    Topic {
        sector: "Technology & Innovation",
        subsectors: &[
            "AI Governance",
            "Quantum Computing",
            "Bio-Digital Interfaces",
            "Ethical Hacking",
            "Edge AI",
            "Neuromorphic Chips",
            "Digital Twin Ecosystems",
            "Web3 Infrastructure",
        ],
        audience: "CTOs and tech investors",
        perspective: "Focus on ethical implications",
    },
    Topic {
        sector: "Sustainable Development",
        subsectors: &[
            "Circular Cities",
            "Blue Economy",
            "Carbon Removal Tech",
            "Climate-Resilient Agriculture",
            "Just Transition Policies",
            "Green Hydrogen",
            "Biodiversity Credits",
        ],
        audience: "Policy makers and ESG professionals",
        perspective: "Balance economic and ecological needs",
    },
    Topic {
        sector: "Future of Work",
        subsectors: &[
            "AI Copilots",
            "Four-Day Workweek",
            "Skills Obsolescence",
            "Digital Nomad Visas",
            "Neurodiverse Teams",
            "Robot Tax Proposals",
            "Metaverse Workspaces",
        ],
        audience: "HR leaders and remote workers",
        perspective: "Human-centric automation",
    },
    Topic {
        sector: "Geopolitics",
        subsectors: &[
            "Semiconductor Wars",
            "Arctic Resource Competition",
            "Digital Sovereignty",
            "Climate Migration Treaties",
            "Space Militarization",
            "Rare Earth Diplomacy",
        ],
        audience: "Foreign policy analysts",
        perspective: "Emerging multipolar dynamics",
    },
    Topic {
        sector: "Health Evolution",
        subsectors: &[
            "Gene Editing Ethics",
            "AI Drug Discovery",
            "Microbiome Therapies",
            "Hospital-at-Home Models",
            "Mental Health Tech",
            "Longevity Economy",
        ],
        audience: "Medical professionals and patients",
        perspective: "Prevention-over-treatment paradigm",
    },
    Topic {
        sector: "Consumer Evolution",
        subsectors: &[
            "Deinfluencing Movement",
            "Anti-Algorithm Shopping",
            "Quiet Luxury",
            "Digital Ownership",
            "Generational Spending Shifts",
            "Sensory Commerce",
        ],
        audience: "Brand strategists and millennials",
        perspective: "Post-materialist values",
    },
    Topic {
        sector: "Urban Futures",
        subsectors: &[
            "15-Minute Cities",
            "Vertical Farming Systems",
            "Mobility-as-a-Service",
            "Disaster-Proof Architecture",
            "Smart Slums",
            "Underground Urbanism",
        ],
        audience: "Urban planners and residents",
        perspective: "Equitable urbanization",
    },
];

impl Topic {
    pub fn prompt(&self) -> String {
        format!(
            "Write a detailed news article about the latest trends in {} ({}). \
             The audience is {}. {}. It should be insightful and engaging.",
            self.sector,
            self.subsectors.join(", "),
            self.audience,
            self.perspective
        )
    }
}

/// Text-generation backend
#[async_trait::async_trait]
pub trait ArticleGenerator: Send + Sync {
    async fn generate(&self, topic: &Topic) -> Result<String>;
}

// ============================================================================
// OpenAI chat completions
// ============================================================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

pub struct OpenAiGenerator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiGenerator {
    pub fn new(api_key: &str, model: &str, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent("Newsroom/1.0")
            .timeout(Duration::from_secs(120))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait::async_trait]
impl ArticleGenerator for OpenAiGenerator {
    async fn generate(&self, topic: &Topic) -> Result<String> {
        let prompt = topic.prompt();
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
        };

        debug!(sector = topic.sector, model = %self.model, "requesting completion");

        let response: ChatResponse = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("chat completion request failed")?
            .error_for_status()
            .context("chat completion status")?
            .json()
            .await
            .context("chat completion body")?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .context("chat completion returned no content")
    }
}

// ============================================================================
// Drafting
// ============================================================================

fn fallback_title(topic: &Topic, today: DateTime<Utc>) -> String {
    format!("Latest {} Insights - {}", topic.sector, today.format("%B %d, %Y"))
}

/// Turn generated prose into a pending, author-less article.
///
/// A leading paragraph becomes the title when the body has more than one;
/// otherwise the title is dated by sector.
pub fn draft_article(topic: &Topic, content: &str, today: DateTime<Utc>) -> Article {
    let content = content.trim();
    let (title, body) = match content.split_once("\n\n") {
        Some((head, rest)) if !rest.trim().is_empty() => {
            let head = head.trim().trim_matches(|c| c == '*' || c == '#').trim();
            if head.is_empty() {
                (fallback_title(topic, today), content)
            } else {
                (head.to_string(), rest.trim())
            }
        }
        _ => (fallback_title(topic, today), content),
    };

    let mut article = Article::new(&title, body, None);
    article.tags = vec![topic.sector.to_string()];
    article
}

/// Generate and store one article per topic. Topics whose generation fails
/// are skipped.
pub async fn generate_articles(
    generator: &dyn ArticleGenerator,
    store: &dyn ContentStore,
    topics: &[Topic],
) -> Result<Vec<Article>> {
    let mut created = Vec::with_capacity(topics.len());

    for topic in topics {
        let content = match generator.generate(topic).await {
            Ok(content) => content,
            Err(e) => {
                warn!("❌ Generation failed for {}: {:#}", topic.sector, e);
                continue;
            }
        };

        let article = draft_article(topic, &content, Utc::now());
        store.insert_article(&article).await?;
        info!("📝 Generated article for {}: {}", topic.sector, article.title);
        created.push(article);
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleStatus;
    use crate::store::MemoryStore;
    use axum::{routing::post, Json, Router};
    use chrono::TimeZone;
    use serde_json::{json, Value};

    struct CannedGenerator;

    #[async_trait::async_trait]
    impl ArticleGenerator for CannedGenerator {
        async fn generate(&self, topic: &Topic) -> Result<String> {
            if topic.sector == "Geopolitics" {
                anyhow::bail!("rate limited");
            }
            Ok(format!("**{} Today**\n\nFirst paragraph.\n\nSecond.", topic.sector))
        }
    }

    #[test]
    fn test_draft_article_uses_heading_as_title() {
        let today = Utc.with_ymd_and_hms(2025, 3, 7, 12, 0, 0).unwrap();
        let article = draft_article(&TOPICS[0], "## Edge AI Rises\n\nBody one.\n\nBody two.", today);

        assert_eq!(article.title, "Edge AI Rises");
        assert_eq!(article.description, "Body one.\n\nBody two.");
        assert_eq!(article.tags, vec!["Technology & Innovation".to_string()]);
        assert_eq!(article.status, ArticleStatus::Pending);
        assert!(article.author_id.is_none());
    }

    #[test]
    fn test_draft_article_single_paragraph_gets_dated_title() {
        let today = Utc.with_ymd_and_hms(2025, 3, 7, 12, 0, 0).unwrap();
        let article = draft_article(&TOPICS[3], "Just one block of text.", today);

        assert_eq!(article.title, "Latest Geopolitics Insights - March 07, 2025");
        assert_eq!(article.description, "Just one block of text.");
    }

    #[test]
    fn test_prompt_mentions_audience() {
        let prompt = TOPICS[4].prompt();
        assert!(prompt.contains("Health Evolution"));
        assert!(prompt.contains("Medical professionals and patients"));
        assert!(prompt.contains("Microbiome Therapies"));
    }

    #[tokio::test]
    async fn test_generate_articles_skips_failures() {
        let store = MemoryStore::new();
        let created = generate_articles(&CannedGenerator, &store, &TOPICS)
            .await
            .unwrap();

        assert_eq!(created.len(), TOPICS.len() - 1);
        assert!(created.iter().all(|a| a.author_id.is_none()));
        assert!(created.iter().all(|a| a.status == ArticleStatus::Pending));
        assert_eq!(store.list_articles(100).await.unwrap().len(), TOPICS.len() - 1);
        assert!(created.iter().any(|a| a.title == "Urban Futures Today"));
    }

    #[tokio::test]
    async fn test_openai_generator_against_local_server() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], "gpt-test");
                assert_eq!(body["messages"][0]["role"], "system");
                Json(json!({
                    "choices": [{"message": {"role": "assistant", "content": "Headline\n\nBody"}}]
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let generator =
            OpenAiGenerator::new("sk-test", "gpt-test", &format!("http://{}/v1/", addr)).unwrap();
        let content = generator.generate(&TOPICS[1]).await.unwrap();
        assert_eq!(content, "Headline\n\nBody");
    }
}
