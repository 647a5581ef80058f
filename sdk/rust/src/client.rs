use reqwest::header::{ETAG, IF_NONE_MATCH};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid server URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("server URL cannot carry a path: {0}")]
    CannotBeABase(String),

    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Talk {
    pub title: String,
    pub presenter: String,
    pub summary: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryEntry {
    pub word_pair: String,
    pub local: String,
    pub foreign: String,
}

#[derive(Serialize)]
struct Proposal<'a> {
    presenter: &'a str,
    summary: &'a str,
}

/// Result of a conditional talk list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResult {
    /// A newer list, with the tag to send on the next poll.
    Changed { talks: Vec<Talk>, tag: Option<String> },
    /// The client's tag is still current.
    NotModified,
}

pub struct SkillShareClient {
    client: Client,
    base: Url,
}

impl SkillShareClient {
    pub fn new(server_url: &str) -> Result<Self, SdkError> {
        let base = Url::parse(server_url)?;
        if base.cannot_be_a_base() {
            return Err(SdkError::CannotBeABase(server_url.to_string()));
        }
        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    /// Build a URL from raw path segments. Each segment is percent-encoded,
    /// so titles may contain `/`, spaces or any other character.
    fn url(&self, segments: &[&str]) -> Result<Url, SdkError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| SdkError::CannotBeABase(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(request: RequestBuilder) -> Result<Response, SdkError> {
        let resp = request.send().await?;
        let status = resp.status();
        if status.is_success() || status == StatusCode::NOT_MODIFIED {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(SdkError::Status { status, body })
    }

    /// Fetch the full talk list.
    pub async fn talks(&self) -> Result<Vec<Talk>, SdkError> {
        match self.poll_talks(None, None).await? {
            PollResult::Changed { talks, .. } => Ok(talks),
            PollResult::NotModified => Ok(Vec::new()),
        }
    }

    /// Conditional fetch of the talk list.
    ///
    /// With `tag` set the server answers "not modified" when nothing changed;
    /// with `wait` as well it holds the request open for up to that many
    /// seconds waiting for a change.
    pub async fn poll_talks(&self, tag: Option<&str>, wait: Option<u64>) -> Result<PollResult, SdkError> {
        let mut request = self.client.get(self.url(&["talks"])?);
        if let Some(tag) = tag {
            request = request.header(IF_NONE_MATCH, tag);
        }
        if let Some(wait) = wait {
            request = request.header("Prefer", format!("wait={wait}"));
        }

        let resp = Self::send(request).await?;
        if resp.status() == StatusCode::NOT_MODIFIED {
            return Ok(PollResult::NotModified);
        }
        let tag = resp
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let talks = resp.json().await?;
        Ok(PollResult::Changed { talks, tag })
    }

    /// Fetch one talk, `None` when it does not exist.
    pub async fn talk(&self, title: &str) -> Result<Option<Talk>, SdkError> {
        let resp = self.client.get(self.url(&["talks", title])?).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SdkError::Status { status, body });
        }
        Ok(Some(resp.json().await?))
    }

    /// Create or replace a talk. Existing comments are discarded.
    pub async fn put_talk(&self, title: &str, presenter: &str, summary: &str) -> Result<(), SdkError> {
        let request = self
            .client
            .put(self.url(&["talks", title])?)
            .json(&Proposal { presenter, summary });
        Self::send(request).await?;
        Ok(())
    }

    pub async fn delete_talk(&self, title: &str) -> Result<(), SdkError> {
        Self::send(self.client.delete(self.url(&["talks", title])?)).await?;
        Ok(())
    }

    pub async fn add_comment(&self, title: &str, author: &str, message: &str) -> Result<(), SdkError> {
        let comment = Comment {
            author: author.to_string(),
            message: message.to_string(),
        };
        let request = self
            .client
            .post(self.url(&["talks", title, "comments"])?)
            .json(&comment);
        Self::send(request).await?;
        Ok(())
    }

    /// Fetch the whole glossary.
    pub async fn glossary(&self) -> Result<Vec<GlossaryEntry>, SdkError> {
        let resp = Self::send(self.client.get(self.url(&["glossary"])?)).await?;
        Ok(resp.json().await?)
    }

    /// Fetch one glossary entry, `None` when it does not exist.
    pub async fn word(&self, word_pair: &str) -> Result<Option<GlossaryEntry>, SdkError> {
        let resp = self.client.get(self.url(&["glossary", word_pair])?).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SdkError::Status { status, body });
        }
        Ok(Some(resp.json().await?))
    }

    /// Store an entry under its word pair; returns the updated glossary.
    pub async fn put_word(&self, entry: &GlossaryEntry) -> Result<Vec<GlossaryEntry>, SdkError> {
        let request = self
            .client
            .put(self.url(&["glossary", &entry.word_pair])?)
            .json(entry);
        Ok(Self::send(request).await?.json().await?)
    }

    /// Remove an entry; returns the updated glossary.
    pub async fn delete_word(&self, word_pair: &str) -> Result<Vec<GlossaryEntry>, SdkError> {
        let resp = Self::send(self.client.delete(self.url(&["glossary", word_pair])?)).await?;
        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_are_encoded() {
        let client = SkillShareClient::new("http://localhost:8000").unwrap();
        let url = client.url(&["talks", "Unituning / 101"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/talks/Unituning%20%2F%20101");
    }

    #[test]
    fn test_base_path_is_kept() {
        let client = SkillShareClient::new("http://localhost:8000/board/").unwrap();
        let url = client.url(&["glossary"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/board/glossary");
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert!(matches!(
            SkillShareClient::new("mailto:someone@example.com"),
            Err(SdkError::CannotBeABase(_))
        ));
    }

    #[test]
    fn test_talk_without_comments_decodes() {
        let talk: Talk = serde_json::from_str(r#"{"title":"T","presenter":"P","summary":"S"}"#).unwrap();
        assert!(talk.comments.is_empty());
    }
}
