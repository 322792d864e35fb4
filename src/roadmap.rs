//! Career roadmap produced at the end of a consultation

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// Structured multi-phase career plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roadmap {
    pub role_name: String,
    pub estimated_total_time: String,
    pub difficulty: String,
    pub career_insights: CareerInsights,
    pub phases: Vec<Phase>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerInsights {
    pub salary_range: String,
    pub demand: String,
    #[serde(default)]
    pub key_skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub title: String,
    pub duration: String,
    pub description: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub milestones: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Error)]
pub enum RoadmapParseError {
    #[error("no JSON object found in reply")]
    NoJson,
    #[error("malformed roadmap JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("roadmap is missing {0}")]
    Incomplete(&'static str),
}

static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)```").unwrap());

/// Pull the JSON object out of a model reply.
///
/// Replies may be bare JSON, wrapped in a markdown fence, or surrounded by
/// prose; the outermost `{ ... }` span wins.
fn extract_json(reply: &str) -> Option<&str> {
    let body = FENCED_BLOCK
        .captures(reply)
        .and_then(|c| c.get(1))
        .map_or(reply, |m| m.as_str());

    let start = body.find('{')?;
    let end = body.rfind('}')?;
    if end < start {
        return None;
    }
    body.get(start..=end)
}

/// Parse and sanity-check a roadmap reply
pub fn parse_roadmap(reply: &str) -> Result<Roadmap, RoadmapParseError> {
    let json = extract_json(reply).ok_or(RoadmapParseError::NoJson)?;
    let roadmap: Roadmap = serde_json::from_str(json)?;

    if roadmap.role_name.trim().is_empty() {
        return Err(RoadmapParseError::Incomplete("a role name"));
    }
    if roadmap.phases.is_empty() {
        return Err(RoadmapParseError::Incomplete("phases"));
    }

    Ok(roadmap)
}

impl fmt::Display for Roadmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.role_name)?;
        writeln!(
            f,
            "Estimated time: {} | Difficulty: {}",
            self.estimated_total_time, self.difficulty
        )?;
        writeln!(
            f,
            "Salary range: {} | Demand: {}",
            self.career_insights.salary_range, self.career_insights.demand
        )?;
        if !self.career_insights.key_skills.is_empty() {
            writeln!(f, "Key skills: {}", self.career_insights.key_skills.join(", "))?;
        }

        for (i, phase) in self.phases.iter().enumerate() {
            writeln!(f)?;
            writeln!(f, "Phase {}: {} ({})", i + 1, phase.title, phase.duration)?;
            writeln!(f, "  {}", phase.description)?;
            if !phase.topics.is_empty() {
                writeln!(f, "  Topics: {}", phase.topics.join(", "))?;
            }
            for resource in &phase.resources {
                writeln!(f, "  - {} <{}>", resource.name, resource.url)?;
            }
            for milestone in &phase.milestones {
                writeln!(f, "  * {milestone}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn sample_roadmap(phase_count: usize) -> Roadmap {
    Roadmap {
        role_name: "Backend Engineer".to_string(),
        estimated_total_time: "12 months".to_string(),
        difficulty: "Intermediate".to_string(),
        career_insights: CareerInsights {
            salary_range: "6-12 LPA".to_string(),
            demand: "High".to_string(),
            key_skills: vec!["Rust".to_string(), "SQL".to_string()],
        },
        phases: (1..=phase_count)
            .map(|i| Phase {
                title: format!("Phase {i}"),
                duration: "3 months".to_string(),
                description: "Build foundations".to_string(),
                topics: vec!["Data structures".to_string()],
                resources: vec![Resource {
                    name: "The Book".to_string(),
                    url: "https://doc.rust-lang.org/book/".to_string(),
                }],
                milestones: vec!["Ship a project".to_string()],
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = r#"{
        "roleName": "Data Analyst",
        "estimatedTotalTime": "9 months",
        "difficulty": "Beginner",
        "careerInsights": {"salaryRange": "4-8 LPA", "demand": "Growing", "keySkills": ["SQL", "Python"]},
        "phases": [
            {"title": "Foundations", "duration": "2 months", "description": "Statistics basics",
             "topics": ["Probability"], "resources": [{"name": "Khan Academy", "url": "https://khanacademy.org"}],
             "milestones": ["Finish course"]},
            {"title": "Tooling", "duration": "2 months", "description": "SQL and spreadsheets"}
        ]
    }"#;

    #[test]
    fn test_parse_bare_json() {
        let roadmap = parse_roadmap(REPLY).unwrap();
        assert_eq!(roadmap.role_name, "Data Analyst");
        assert_eq!(roadmap.career_insights.key_skills, vec!["SQL", "Python"]);
        assert_eq!(roadmap.phases.len(), 2);
        assert_eq!(roadmap.phases[0].resources[0].name, "Khan Academy");
        // Optional lists default to empty
        assert!(roadmap.phases[1].topics.is_empty());
    }

    #[test]
    fn test_parse_fenced_json_with_prose() {
        let reply = format!("Here is your roadmap:\n```json\n{REPLY}\n```\nGood luck!");
        let roadmap = parse_roadmap(&reply).unwrap();
        assert_eq!(roadmap.difficulty, "Beginner");
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(
            parse_roadmap("I cannot help with that."),
            Err(RoadmapParseError::NoJson)
        ));
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(matches!(
            parse_roadmap(r#"{"roleName": "x", "phases": [}"#),
            Err(RoadmapParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_rejects_empty_phases() {
        let reply = r#"{"roleName": "X", "estimatedTotalTime": "1y", "difficulty": "Hard",
            "careerInsights": {"salaryRange": "", "demand": ""}, "phases": []}"#;
        assert!(matches!(
            parse_roadmap(reply),
            Err(RoadmapParseError::Incomplete("phases"))
        ));
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(sample_roadmap(1)).unwrap();
        assert!(value.get("roleName").is_some());
        assert!(value["careerInsights"].get("keySkills").is_some());
    }

    #[test]
    fn test_display_lists_every_phase() {
        let text = sample_roadmap(4).to_string();
        assert!(text.starts_with("Backend Engineer"));
        assert!(text.contains("Phase 4: Phase 4 (3 months)"));
    }
}
