//! Prompt text for the three LLM call sites.

/// System prompt for the Slack responder.
pub const SLACK_SYSTEM_PROMPT: &str = "you are a helpful slack bot. answer questions like a very smart professor.\nWhen analyzing screenshots or images, describe what you see and provide relevant insights.";

/// Per-slide prompt for the vision extraction pass over a captured deck.
pub const SLIDE_EXTRACTION_PROMPT: &str = "This is a slide from a presentation. Please provide a very thorough summary of what this slide is about and what it communicates. Focus on capturing the key messages, main points, and any important details, even if some text is partially visible. Your summary should help reconstruct the full narrative of the presentation when combined with other slides. Do not include any other commentary, and use as much detail as needed to fully capture the content of the slide.";

/// User turn for document Q&A: fetched document text plus the question.
pub fn doc_question(context: &str, question: &str) -> String {
    format!(
        "Context from Google Doc:\n{context}\n\nQuestion: {question}\n\nPlease provide a clear and concise answer based on the context provided."
    )
}

/// Marker appended to a message for each turn that carries screenshots.
/// Kept textual so history replays read sensibly even without the images.
pub fn image_note(count: usize) -> String {
    format!("\n\nImage Analysis: [Processing {count} screenshots attached to this message]")
}
