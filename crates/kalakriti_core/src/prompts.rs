//! crates/kalakriti_core/src/prompts.rs
//!
//! Instruction blocks sent to the language model. Each builder substitutes the
//! artisan's story and the product context into a fixed template.

use crate::conversation::{Role, Turn};
use crate::domain::ProductRecord;

const DESCRIPTIONS_TEMPLATE: &str = r#"You are an expert e-commerce copywriter specializing in handmade artisanal crafts.
Your task is to generate three distinct product descriptions for a new listing.

**Primary Context: The Artisan's Story (This is the most important information)**
---
{artisan_story}
---

**Product Details:**
- Product Name: {product_name}
- Materials Used: {materials}

**Instructions:**
You MUST respond with ONLY a valid JSON object. Do not include any other text or markdown formatting like ```json. The JSON object must have these exact keys: "story_driven", "bullet_points", "social_media_caption". The value for "bullet_points" must be an array of strings."#;

const SOCIAL_PLAN_TEMPLATE: &str = r#"You are a professional social media strategist who specializes in helping independent artisans.
Your task is to create a 3-day social media content plan to help an artisan achieve their goal.

**Primary Context: The Artisan's Story**
---
{artisan_story}
---

**Product to Feature:**
- Product Name: {product_name}

**Campaign Goal:**
- {campaign_goal}

**Instructions:**
You MUST respond with ONLY a valid JSON object. The object must have a key "plan_title" and a key "posts".
The "posts" key must contain a list of exactly 3 JSON objects.
Each post object must have these three keys: "day_title", "suggested_image", and "caption".
- "day_title": A short, catchy title for the day's post (e.g., "Day 1: The Teaser").
- "suggested_image": A brief description of the type of photo the artisan should use.
- "caption": The full, ready-to-use caption, complete with engaging text, emojis, and 3-5 relevant hashtags."#;

const CUSTOMER_QUERY_TEMPLATE: &str = r#"You are a friendly and helpful customer service bot for an artisan marketplace.
Your name is Sahayak Bot. You have one critical rule: **You must only answer questions using the information provided below.** Do not make up any information, prices, or policies. If the answer is not in the context, politely state that you can provide details about the craft's origin and the artisan's story.

**Source of Truth: Artisan's Story**
---
{artisan_story}
---

**Source of Truth: Product Details**
---
{product_details}
---

**Conversation So Far:**
{conversation}

Now, answer the customer's latest question based *only* on the provided information."#;

/// Goals offered to artisans by the post planner.
pub const CAMPAIGN_GOALS: &[&str] = &[
    "Launch a new product",
    "Share the 'behind-the-scenes' making process",
    "Announce a weekend sale or special offer",
    "Educate customers about my unique craft",
    "Tell a story about a specific design",
];

pub fn product_descriptions_prompt(artisan_story: &str, product_name: &str, materials: &str) -> String {
    fill(
        DESCRIPTIONS_TEMPLATE,
        &[
            ("artisan_story", artisan_story),
            ("product_name", product_name),
            ("materials", materials),
        ],
    )
}

pub fn social_plan_prompt(artisan_story: &str, product_name: &str, campaign_goal: &str) -> String {
    fill(
        SOCIAL_PLAN_TEMPLATE,
        &[
            ("artisan_story", artisan_story),
            ("product_name", product_name),
            ("campaign_goal", campaign_goal),
        ],
    )
}

pub fn customer_query_prompt(artisan_story: &str, product: &ProductRecord, conversation: &[Turn]) -> String {
    let product_details = render_product_details(product);
    let transcript = render_transcript(conversation);
    fill(
        CUSTOMER_QUERY_TEMPLATE,
        &[
            ("artisan_story", artisan_story),
            ("product_details", &product_details),
            ("conversation", &transcript),
        ],
    )
}

/// Replaces each `{name}` in `template` with its value in a single pass.
/// Substituted text is copied verbatim and never scanned for placeholders.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// The product fields the assistant is allowed to talk about.
pub fn render_product_details(product: &ProductRecord) -> String {
    let mut lines = vec![
        format!("- Name: {}", product.name),
        format!("- Price: ₹{:.2}", product.price),
    ];
    let optional = [
        ("Materials", &product.materials),
        ("Craft", &product.craft_type),
        ("Description", &product.description_story),
        ("Features", &product.description_bullets),
    ];
    for (label, value) in optional {
        if !value.trim().is_empty() {
            lines.push(format!("- {}: {}", label, value));
        }
    }
    lines.join("\n")
}

fn render_transcript(conversation: &[Turn]) -> String {
    if conversation.is_empty() {
        return "(no messages yet)".to_string();
    }
    conversation
        .iter()
        .map(|turn| {
            let speaker = match turn.role {
                Role::User => "Customer",
                Role::Assistant => "Sahayak Bot",
            };
            format!("{}: {}", speaker, turn.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
