use serde::{Deserialize, Serialize};

/// One typeahead row as the compose widget expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
    pub text: String,
    /// `Some(false)` keeps the user editing instead of finalizing the row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve: Option<bool>,
}

impl Suggestion {
    #[must_use]
    pub fn final_choice(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            resolve: None,
        }
    }

    #[must_use]
    pub fn keep_editing(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            resolve: Some(false),
        }
    }

    #[must_use]
    pub fn placeholder(message: &str) -> Self {
        Self::final_choice(format!("<i>({message})</i>"), "")
    }
}

/// Resolver response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_flag_only_serialized_when_set() {
        let json = serde_json::to_value(Suggestion::final_choice("t", "x")).unwrap();
        assert!(json.get("resolve").is_none());

        let json = serde_json::to_value(Suggestion::keep_editing("France", "France: ")).unwrap();
        assert_eq!(json["resolve"], serde_json::json!(false));
    }

    #[test]
    fn test_placeholder() {
        let s = Suggestion::placeholder("country not found");
        assert_eq!(s.title, "<i>(country not found)</i>");
        assert_eq!(s.text, "");
    }
}
