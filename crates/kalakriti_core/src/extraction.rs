//! crates/kalakriti_core/src/extraction.rs
//!
//! Best-effort recovery of a JSON object from free-form model output, and the
//! lenient mapping from that object onto the typed generation results.
//!
//! The model is asked for bare JSON but often wraps it in prose or a code
//! fence. Everything between the first `{` and the last `}` is parsed; the shape
//! of the result is not validated, so every field is read with a default.

use serde_json::Value;

use crate::domain::{ProductDescriptions, SocialPlan, SocialPost};
use crate::generation::GenerationError;

/// Carves the outermost `{ ... }` span out of `reply` and parses it.
pub fn extract_json(reply: &str) -> Result<Value, GenerationError> {
    let (start, end) = match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) => (start, end),
        _ => return Err(GenerationError::MalformedResponse),
    };

    // A reply like "} then {" has both braces but nothing between them.
    if end < start {
        return Err(GenerationError::ParseFailure(
            "closing brace precedes opening brace".to_string(),
        ));
    }

    serde_json::from_str(&reply[start..=end])
        .map_err(|e| GenerationError::ParseFailure(e.to_string()))
}

fn string_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Reads `story_driven`, `bullet_points` and `social_media_caption`.
pub fn descriptions_from_value(value: &Value) -> ProductDescriptions {
    let bullet_points = value
        .get("bullet_points")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    ProductDescriptions {
        story_driven: string_field(value, "story_driven"),
        bullet_points,
        social_caption: string_field(value, "social_media_caption"),
    }
}

/// Reads `plan_title` and the `posts` array, filling in display defaults.
pub fn plan_from_value(value: &Value) -> SocialPlan {
    let plan_title = match string_field(value, "plan_title") {
        title if title.trim().is_empty() => "Your Content Plan".to_string(),
        title => title,
    };

    let posts = value
        .get("posts")
        .and_then(Value::as_array)
        .map(|posts| {
            posts
                .iter()
                .enumerate()
                .map(|(i, post)| SocialPost {
                    day_title: match string_field(post, "day_title") {
                        t if t.trim().is_empty() => format!("Post {}", i + 1),
                        t => t,
                    },
                    suggested_image: string_field(post, "suggested_image"),
                    caption: string_field(post, "caption"),
                })
                .collect()
        })
        .unwrap_or_default();

    SocialPlan { plan_title, posts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_object_from_code_fence() {
        let reply = "Sure! ```json\n{\"a\":1}\n```";
        assert_eq!(extract_json(reply).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn reply_without_braces_is_malformed() {
        assert_eq!(
            extract_json("I cannot help with that."),
            Err(GenerationError::MalformedResponse)
        );
        assert_eq!(extract_json("only an opening {"), Err(GenerationError::MalformedResponse));
    }

    #[test]
    fn invalid_json_is_a_parse_failure() {
        assert!(matches!(
            extract_json("{bad json}"),
            Err(GenerationError::ParseFailure(_))
        ));
        assert!(matches!(
            extract_json("} backwards {"),
            Err(GenerationError::ParseFailure(_))
        ));
    }

    #[test]
    fn nested_objects_survive_surrounding_prose() {
        let reply = "Here you go:\n{\"plan_title\": \"Launch\", \"posts\": [{\"caption\": \"hi\"}]}\nEnjoy!";
        let value = extract_json(reply).unwrap();
        assert_eq!(value["posts"][0]["caption"], "hi");
    }

    #[test]
    fn descriptions_tolerate_missing_and_odd_fields() {
        let value = json!({
            "story_driven": "Woven on a pit loom.",
            "bullet_points": ["Cotton", 100, null],
        });
        let d = descriptions_from_value(&value);
        assert_eq!(d.story_driven, "Woven on a pit loom.");
        assert_eq!(d.bullet_points, vec!["Cotton", "100", "null"]);
        assert_eq!(d.social_caption, "");
    }

    #[test]
    fn plan_defaults_titles() {
        let value = json!({
            "posts": [
                {"day_title": "Day 1: The Teaser", "suggested_image": "Loom close-up", "caption": "Soon..."},
                {"suggested_image": "Finished scarf", "caption": "It's here"}
            ]
        });
        let plan = plan_from_value(&value);
        assert_eq!(plan.plan_title, "Your Content Plan");
        assert_eq!(plan.posts.len(), 2);
        assert_eq!(plan.posts[0].day_title, "Day 1: The Teaser");
        assert_eq!(plan.posts[1].day_title, "Post 2");
        assert_eq!(plan.posts[1].caption, "It's here");
    }

    #[test]
    fn plan_without_posts_is_empty() {
        let plan = plan_from_value(&json!({"plan_title": "Diwali Sale"}));
        assert_eq!(plan.plan_title, "Diwali Sale");
        assert!(plan.posts.is_empty());
    }
}
