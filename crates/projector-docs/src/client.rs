use serde::Deserialize;
use tracing::{debug, warn};

use crate::auth::ServiceAccountAuth;
use crate::error::{DocsError, Result};

const DOCS_API_BASE: &str = "https://docs.googleapis.com/v1";

/// A fetched document: title plus the concatenated body text.
#[derive(Debug, Clone)]
pub struct FetchedDoc {
    pub title: String,
    pub content: String,
}

/// Google Docs reader authenticated with a service account.
///
/// The auth half is optional at construction so the rest of the gateway
/// can start without a key file; fetches then fail closed.
pub struct DocsClient {
    http: reqwest::Client,
    auth: Option<ServiceAccountAuth>,
}

impl DocsClient {
    pub fn new(auth: Option<ServiceAccountAuth>) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth,
        }
    }

    /// Fetch a document by share URL and flatten its body to plain text.
    pub async fn fetch(&self, doc_url: &str) -> Result<FetchedDoc> {
        let auth = self
            .auth
            .as_ref()
            .ok_or_else(|| DocsError::Config("service account key not set".into()))?;
        let doc_id = extract_doc_id(doc_url)
            .ok_or_else(|| DocsError::InvalidUrl(doc_url.to_string()))?;

        let token = auth.ensure_token().await?;
        let url = format!("{DOCS_API_BASE}/documents/{doc_id}");
        debug!(doc_id, "fetching document");

        let resp = self.http.get(&url).bearer_auth(&token).send().await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, doc_id, "document fetch failed");
            return Err(DocsError::Api {
                status,
                message: text,
            });
        }

        let doc: Document = resp
            .json()
            .await
            .map_err(|e| DocsError::Parse(e.to_string()))?;

        let content = extract_text(&doc);
        Ok(FetchedDoc {
            title: doc.title.unwrap_or_default(),
            content,
        })
    }
}

/// Pull the document id out of a share URL — the first long id-shaped run.
pub fn extract_doc_id(doc_url: &str) -> Option<&str> {
    let bytes = doc_url.as_bytes();
    let mut start = 0;
    while start < bytes.len() {
        let end = doc_url[start..]
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .map(|i| start + i)
            .unwrap_or(bytes.len());
        if end - start >= 25 {
            return Some(&doc_url[start..end]);
        }
        let skip = doc_url[end..].chars().next().map_or(1, |c| c.len_utf8());
        start = end + skip;
    }
    None
}

/// Concatenate the text runs of every paragraph in document order.
fn extract_text(doc: &Document) -> String {
    let mut text = String::new();
    if let Some(body) = &doc.body {
        for element in &body.content {
            let Some(paragraph) = &element.paragraph else {
                continue;
            };
            for pe in &paragraph.elements {
                if let Some(run) = &pe.text_run {
                    if let Some(content) = &run.content {
                        text.push_str(content);
                    }
                }
            }
        }
    }
    text
}

// Google Docs API document shape — only the fields the extraction walks.

#[derive(Deserialize)]
struct Document {
    title: Option<String>,
    body: Option<Body>,
}

#[derive(Deserialize)]
struct Body {
    #[serde(default)]
    content: Vec<StructuralElement>,
}

#[derive(Deserialize)]
struct StructuralElement {
    paragraph: Option<Paragraph>,
}

#[derive(Deserialize)]
struct Paragraph {
    #[serde(default)]
    elements: Vec<ParagraphElement>,
}

#[derive(Deserialize)]
struct ParagraphElement {
    #[serde(rename = "textRun")]
    text_run: Option<TextRun>,
}

#[derive(Deserialize)]
struct TextRun {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_id_extracted_from_share_url() {
        let url = "https://docs.google.com/document/d/1aBcDeFgHiJkLmNoPqRsTuVwXyZ0123456789/edit";
        assert_eq!(
            extract_doc_id(url),
            Some("1aBcDeFgHiJkLmNoPqRsTuVwXyZ0123456789")
        );
    }

    #[test]
    fn short_runs_are_not_doc_ids() {
        assert_eq!(extract_doc_id("https://example.com/short/path"), None);
    }

    #[test]
    fn text_extraction_walks_paragraph_runs() {
        let doc: Document = serde_json::from_value(serde_json::json!({
            "title": "Notes",
            "body": {
                "content": [
                    {"paragraph": {"elements": [
                        {"textRun": {"content": "Hello "}},
                        {"textRun": {"content": "world.\n"}}
                    ]}},
                    {"sectionBreak": {}},
                    {"paragraph": {"elements": [
                        {"textRun": {"content": "Second paragraph."}}
                    ]}}
                ]
            }
        }))
        .unwrap();
        assert_eq!(extract_text(&doc), "Hello world.\nSecond paragraph.");
    }
}
