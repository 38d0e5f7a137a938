//! Intent Classifier: quick canned replies for booking, contact and pricing questions.
//! Pure keyword containment over lower-cased text; no side effects.

use serde::Deserialize;

/// Canned-reply categories. Declaration order is match priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Booking,
    Contact,
    Pricing,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Booking => "booking",
            Intent::Contact => "contact",
            Intent::Pricing => "pricing",
        }
    }
}

/// One intent as configured in the content file.
#[derive(Debug, Clone, Deserialize)]
pub struct IntentRule {
    pub kind: Intent,
    pub keywords: Vec<String>,
    pub reply: String,
}

#[derive(Debug, Clone)]
pub struct IntentClassifier {
    rules: Vec<IntentRule>,
}

impl IntentClassifier {
    /// Keywords are lower-cased and blank ones dropped; rules are ordered by
    /// [`Intent`] priority regardless of file order.
    pub fn new(rules: Vec<IntentRule>) -> Self {
        let mut rules: Vec<IntentRule> = rules
            .into_iter()
            .map(|mut r| {
                r.keywords = r
                    .keywords
                    .iter()
                    .map(|k| k.trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect();
                r.reply = r.reply.trim().to_string();
                r
            })
            .collect();
        rules.sort_by_key(|r| r.kind);
        Self { rules }
    }

    /// First rule with a keyword contained in `text` (case-insensitive), if any.
    pub fn classify(&self, text: &str) -> Option<&IntentRule> {
        let lower = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| lower.contains(k.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(kind: Intent, keywords: &[&str], reply: &str) -> IntentRule {
        IntentRule {
            kind,
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            reply: reply.to_string(),
        }
    }

    fn classifier() -> IntentClassifier {
        // Deliberately out of priority order.
        IntentClassifier::new(vec![
            rule(Intent::Pricing, &["τιμη", "cost", "price"], "pricing"),
            rule(Intent::Contact, &["email", "επικοινων", "CONTACT"], "contact"),
            rule(Intent::Booking, &["ραντεβ", "meeting", "call"], "  booking  "),
        ])
    }

    fn kind_of(text: &str) -> Option<Intent> {
        classifier().classify(text).map(|r| r.kind)
    }

    #[test]
    fn matches_each_category() {
        assert_eq!(kind_of("Can we schedule a meeting?"), Some(Intent::Booking));
        assert_eq!(kind_of("What is your email address"), Some(Intent::Contact));
        assert_eq!(kind_of("How much does it cost?"), Some(Intent::Pricing));
    }

    #[test]
    fn priority_is_booking_then_contact_then_pricing() {
        assert_eq!(kind_of("email me the price of a call"), Some(Intent::Booking));
        assert_eq!(kind_of("contact me about the price"), Some(Intent::Contact));
    }

    #[test]
    fn case_insensitive_including_greek() {
        assert_eq!(kind_of("MEETING please"), Some(Intent::Booking));
        assert_eq!(kind_of("Contact"), Some(Intent::Contact));
        assert_eq!(kind_of("Θέλω ραντεβού"), Some(Intent::Booking));
        assert_eq!(kind_of("ΤΙΜΗ"), Some(Intent::Pricing));
        assert_eq!(kind_of("θέλω να επικοινωνήσω"), Some(Intent::Contact));
    }

    #[test]
    fn no_match_falls_through() {
        assert_eq!(kind_of(""), None);
        assert_eq!(kind_of("What services do you offer?"), None);
    }

    #[test]
    fn substring_containment_is_literal() {
        // "recall" contains "call"
        assert_eq!(kind_of("I recall your website"), Some(Intent::Booking));
    }

    #[test]
    fn replies_are_trimmed() {
        let c = classifier();
        assert_eq!(c.classify("call").unwrap().reply, "booking");
    }
}
