//! Prompt templates for the pipeline's three model interactions.
//!
//! The synthesis template carries few-shot examples demonstrating the exact
//! output shape, which matters more for schema adherence than the format
//! instructions themselves.

/// Prompt for extracting (brand, product, type) from a free-text query.
pub(crate) fn intent_prompt(query: &str) -> String {
    format!(
        r#"Extract the brand, product category, and type of product from the following user query. Return a JSON like:
{{"brand": "...", "product": "...", "type": "..."}}.

Query: "{query}"
"#
    )
}

/// Prompt for the structured competitor synthesis pass.
pub(crate) fn synthesis_prompt(evidence: &str, brand: &str, product: &str) -> String {
    format!(
        r#"You are analyzing competitor strategies in the {product} category. Your task is to extract and summarize what each **major competing brand** is doing across social media and marketing channels.

Instructions:
- Focus **only on competitors** (exclude {brand}).
- Mention **brand names explicitly**.
- Group actions and strategies under each brand within one paragraph.
- Cover:
  - Platforms used (e.g., Instagram, TikTok, YouTube)
  - Tactics (e.g., influencer partnerships, AR/VR, livestreams, UGC, storytelling)
  - Regional targeting (e.g., China via Douyin, global vs. local focus)
  - Mention niche players if relevant.

Example:
[
{{
"heading": "Tom Ford",
"summary": "Tom Ford is using Instagram and TikTok to promote its perfumes through influencer collaborations and AR filters. It targets a luxury-driven audience with global reach.",
"engagement": "High influencer engagement on TikTok; innovative AR adoption on Snapchat."
}},
{{
"heading": "Byredo",
"summary": "Byredo focuses on Instagram Reels and minimalistic brand storytelling. Campaigns emphasize Scandinavian craftsmanship and appeal to niche fragrance lovers.",
"engagement": "Moderate, with rising organic shares."
}}
]
TEXT:
{evidence}

Respond with JSON only: an object with a "summaries" key holding an array of objects, each with string fields "heading", "summary", and "engagement". A bare array in the example shape is also acceptable. Do not add commentary outside the JSON.
"#
    )
}

/// Prompt for the per-record editorial rewrite.
pub(crate) fn refine_prompt(summary: &str) -> String {
    format!(
        r#"You are an expert editor improving strategic marketing summaries.

Given this original summary, improve it for:
- Clarity and conciseness
- Logical structure
- Impactful phrasing
- Flow and transitions between brand tactics

Avoid repetition, overly general statements, or redundant phrasing. Do not add new information.

Output only the improved version (no labels).

Original Summary:
{summary}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesis_prompt_excludes_subject_brand_by_name() {
        let prompt = synthesis_prompt("some evidence", "Dior", "perfume");
        assert!(prompt.contains("exclude Dior"));
        assert!(prompt.contains("the perfume category"));
        assert!(prompt.contains("some evidence"));
    }

    #[test]
    fn intent_prompt_embeds_query() {
        let prompt = intent_prompt("What are Dior's competitors doing?");
        assert!(prompt.contains("What are Dior's competitors doing?"));
        assert!(prompt.contains(r#"{"brand": "...""#));
    }

    #[test]
    fn refine_prompt_forbids_labels() {
        let prompt = refine_prompt("original text");
        assert!(prompt.contains("Output only the improved version (no labels)."));
        assert!(prompt.contains("original text"));
    }
}
