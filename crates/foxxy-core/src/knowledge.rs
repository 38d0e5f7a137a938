//! Knowledge Store: the fixed fact sheet injected into every model prompt.

use serde::Deserialize;

/// Topics of the knowledge document, in prompt order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Company,
    Services,
    Industries,
    Project,
    Analysis,
    Ai,
    Owner,
    Philosophy,
    Vision,
    Mission,
}

impl Topic {
    pub const ALL: [Topic; 10] = [
        Topic::Company,
        Topic::Services,
        Topic::Industries,
        Topic::Project,
        Topic::Analysis,
        Topic::Ai,
        Topic::Owner,
        Topic::Philosophy,
        Topic::Vision,
        Topic::Mission,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Topic::Company => "COMPANY",
            Topic::Services => "SERVICES",
            Topic::Industries => "INDUSTRIES",
            Topic::Project => "PROJECT MANAGEMENT",
            Topic::Analysis => "BUSINESS ANALYSIS",
            Topic::Ai => "AI AUTOMATION",
            Topic::Owner => "OWNER",
            Topic::Philosophy => "PHILOSOPHY",
            Topic::Vision => "VISION",
            Topic::Mission => "MISSION",
        }
    }
}

/// Read-only mapping from topic to ordered facts. Loaded once, shared by all requests.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KnowledgeDocument {
    #[serde(default)]
    company: Vec<String>,
    #[serde(default)]
    services: Vec<String>,
    #[serde(default)]
    industries: Vec<String>,
    #[serde(default)]
    project: Vec<String>,
    #[serde(default)]
    analysis: Vec<String>,
    #[serde(default)]
    ai: Vec<String>,
    #[serde(default)]
    owner: Vec<String>,
    #[serde(default)]
    philosophy: Vec<String>,
    #[serde(default)]
    vision: Vec<String>,
    #[serde(default)]
    mission: Vec<String>,
}

impl KnowledgeDocument {
    pub fn facts(&self, topic: Topic) -> &[String] {
        match topic {
            Topic::Company => &self.company,
            Topic::Services => &self.services,
            Topic::Industries => &self.industries,
            Topic::Project => &self.project,
            Topic::Analysis => &self.analysis,
            Topic::Ai => &self.ai,
            Topic::Owner => &self.owner,
            Topic::Philosophy => &self.philosophy,
            Topic::Vision => &self.vision,
            Topic::Mission => &self.mission,
        }
    }

    pub fn is_empty(&self) -> bool {
        Topic::ALL.iter().all(|t| self.facts(*t).is_empty())
    }

    /// Renders every section in [`Topic::ALL`] order. Empty sections are skipped.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for topic in Topic::ALL {
            let facts = self.facts(topic);
            if facts.is_empty() {
                continue;
            }
            out.push_str("--- ");
            out.push_str(topic.label());
            out.push_str(" ---\n");
            for fact in facts {
                out.push_str(fact.trim());
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }
}
