//! Follow-up suggestions shown under a reply, chosen from the user's text.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionRule {
    pub keywords: Vec<String>,
    pub items: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Suggester {
    rules: Vec<SuggestionRule>,
    default: Vec<String>,
}

impl Suggester {
    pub fn new(rules: Vec<SuggestionRule>, default: Vec<String>) -> Self {
        let rules = rules
            .into_iter()
            .map(|mut r| {
                r.keywords = r.keywords.iter().map(|k| k.to_lowercase()).collect();
                r
            })
            .filter(|r| !r.items.is_empty())
            .collect();
        Self { rules, default }
    }

    /// First rule whose keyword occurs in `text`, else the default list.
    pub fn suggest(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        self.rules
            .iter()
            .find(|r| r.keywords.iter().any(|k| !k.is_empty() && lower.contains(k.as_str())))
            .map(|r| r.items.clone())
            .unwrap_or_else(|| self.default.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggester() -> Suggester {
        Suggester::new(
            vec![
                SuggestionRule {
                    keywords: vec!["Service".into()],
                    items: vec!["Project Management".into(), "AI Automation".into()],
                },
                SuggestionRule {
                    keywords: vec!["vision".into()],
                    items: vec![],
                },
            ],
            vec!["What is Spitfox?".into()],
        )
    }

    #[test]
    fn first_matching_rule_wins() {
        assert_eq!(
            suggester().suggest("Show SERVICES"),
            vec!["Project Management".to_string(), "AI Automation".to_string()]
        );
    }

    #[test]
    fn falls_back_to_default() {
        assert_eq!(suggester().suggest("hello"), vec!["What is Spitfox?".to_string()]);
        // rules without items are dropped
        assert_eq!(suggester().suggest("your vision"), vec!["What is Spitfox?".to_string()]);
    }
}
