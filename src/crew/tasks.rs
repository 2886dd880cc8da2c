//! Task definitions for the job-posting pipeline.
//!
//! Descriptions are templates over the crew inputs. A task whose template
//! names an input that was left empty fails to render.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::agents::AgentRole;
use crate::error::CrewError;
use crate::prompt::render_template;

/// User-supplied inputs for one crew run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CrewInputs {
    pub company_domain: String,
    pub company_description: String,
    pub hiring_needs: String,
    pub specific_benefits: String,
}

impl CrewInputs {
    /// Template variables for every non-empty input.
    pub fn template_vars(&self) -> BTreeMap<&'static str, String> {
        [
            ("company_domain", &self.company_domain),
            ("company_description", &self.company_description),
            ("hiring_needs", &self.hiring_needs),
            ("specific_benefits", &self.specific_benefits),
        ]
        .into_iter()
        .map(|(key, value)| (key, value.trim().to_string()))
        .filter(|(_, value)| !value.is_empty())
        .collect()
    }
}

/// One step of the sequential pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskKind {
    ResearchCompanyCulture,
    ResearchRoleRequirements,
    DraftJobPosting,
    ReviewJobPosting,
    IndustryAnalysis,
}

impl TaskKind {
    /// Every task, in execution order.
    pub const ALL: [TaskKind; 5] = [
        TaskKind::ResearchCompanyCulture,
        TaskKind::ResearchRoleRequirements,
        TaskKind::DraftJobPosting,
        TaskKind::ReviewJobPosting,
        TaskKind::IndustryAnalysis,
    ];

    /// Tasks to run, optionally without the trailing industry analysis.
    pub fn pipeline(include_industry_analysis: bool) -> Vec<TaskKind> {
        Self::ALL
            .into_iter()
            .filter(|kind| include_industry_analysis || *kind != TaskKind::IndustryAnalysis)
            .collect()
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::ResearchCompanyCulture => "Company culture research",
            Self::ResearchRoleRequirements => "Role requirements",
            Self::DraftJobPosting => "Draft job posting",
            Self::ReviewJobPosting => "Reviewed job posting",
            Self::IndustryAnalysis => "Industry analysis",
        }
    }

    pub fn agent(self) -> AgentRole {
        match self {
            Self::ResearchCompanyCulture
            | Self::ResearchRoleRequirements
            | Self::IndustryAnalysis => AgentRole::ResearchAnalyst,
            Self::DraftJobPosting => AgentRole::JobDescriptionWriter,
            Self::ReviewJobPosting => AgentRole::ReviewSpecialist,
        }
    }

    fn description_template(self) -> &'static str {
        match self {
            Self::ResearchCompanyCulture => {
                "Analyze the provided company website and the hiring manager's company's domain \
                 {company_domain}, description {company_description}. Focus on understanding the \
                 company's culture, values, and mission. Identify unique selling points and \
                 specific projects or achievements highlighted on the site. Compile a report \
                 summarizing these insights, specifically how they can be leveraged in a job \
                 posting to attract the right candidates."
            }
            Self::ResearchRoleRequirements => {
                "Based on the hiring manager's needs: {hiring_needs}, identify the key skills, \
                 experiences, and qualities the ideal candidate should possess for the role. \
                 Consider the company's current projects, its competitive landscape, and industry \
                 trends. Prepare a list of recommended job requirements and qualifications that \
                 align with the company's needs and values."
            }
            Self::DraftJobPosting => {
                "Draft a job posting for the role described by the hiring manager: \
                 {hiring_needs}. Use the insights on {company_description} to start with a \
                 compelling introduction, followed by a detailed role description, \
                 responsibilities, and required skills and qualifications. Ensure the tone aligns \
                 with the company's culture and incorporate any unique benefits or opportunities \
                 offered by the company. Specific benefits: {specific_benefits}."
            }
            Self::ReviewJobPosting => {
                "Review the draft job posting for the role {hiring_needs}. Check for clarity, \
                 engagement, grammatical accuracy, and alignment with the company's culture and \
                 values. Edit and refine the content, ensuring it speaks directly to the desired \
                 candidates and accurately reflects the role's unique benefits and opportunities. \
                 Provide feedback for any necessary revisions."
            }
            Self::IndustryAnalysis => {
                "Conduct an in-depth analysis of the industry related to the company's domain \
                 {company_domain}. Investigate current trends, challenges, and opportunities \
                 within the industry, utilizing market reports, recent developments, and expert \
                 opinions. Assess how these factors could impact the role being hired for and the \
                 overall attractiveness of the position to potential candidates. Consider how the \
                 company's position within this industry and its response to these trends could \
                 be leveraged to attract top talent. Include in your report how the role \
                 contributes to addressing industry challenges or seizing opportunities."
            }
        }
    }

    pub fn expected_output(self) -> &'static str {
        match self {
            Self::ResearchCompanyCulture => {
                "A comprehensive report detailing the company's culture, values, and mission, \
                 along with specific selling points relevant to the job role. Suggestions on \
                 incorporating these insights into the job posting should be included."
            }
            Self::ResearchRoleRequirements => {
                "A list of recommended skills, experiences, and qualities for the ideal \
                 candidate, aligned with the company's culture, ongoing projects, and the \
                 specific role's requirements."
            }
            Self::DraftJobPosting => {
                "A detailed, engaging job posting that includes an introduction, role \
                 description, responsibilities, requirements, and unique company benefits. The \
                 tone should resonate with the company's culture and values, aimed at attracting \
                 the right candidates."
            }
            Self::ReviewJobPosting => {
                "A polished, error-free job posting that is clear, engaging, and perfectly \
                 aligned with the company's culture and values. Feedback on potential \
                 improvements and final approval for publishing. Formatted in markdown."
            }
            Self::IndustryAnalysis => {
                "A detailed analysis report that identifies major industry trends, challenges, \
                 and opportunities relevant to the company's domain and the specific job role. \
                 This report should provide strategic insights on positioning the job role and \
                 the company as an attractive choice for potential candidates."
            }
        }
    }

    /// Output-shape instruction for tasks with structured output.
    pub fn format_note(self) -> Option<&'static str> {
        match self {
            Self::ResearchRoleRequirements => Some(
                "Respond with a single JSON object and nothing else, shaped as \
                 {\"skills\": [string], \"experience\": [string], \"qualities\": [string]}.",
            ),
            _ => None,
        }
    }

    pub fn expects_json(self) -> bool {
        self.format_note().is_some()
    }

    /// Render the description with crew inputs substituted.
    pub fn description(self, vars: &BTreeMap<&str, String>) -> Result<String, CrewError> {
        render_template(self.description_template(), vars)
            .map_err(|msg| CrewError::Template(format!("{}: {msg}", self.title())))
    }

    /// Web search run before the task, if any.
    pub fn search_query(self, inputs: &CrewInputs) -> Option<String> {
        let domain = inputs.company_domain.trim();
        let needs = inputs.hiring_needs.trim();
        let query = match self {
            Self::ResearchCompanyCulture => format!("{domain} company culture values mission"),
            Self::ResearchRoleRequirements => format!("{needs} skills qualifications requirements"),
            Self::DraftJobPosting => format!("{needs} job description"),
            Self::ReviewJobPosting => return None,
            Self::IndustryAnalysis => format!("{domain} industry trends challenges"),
        };
        let query = query.trim().to_string();
        (!query.is_empty()).then_some(query)
    }

    /// Website scraped before the task, if any.
    pub fn scrape_target(self, inputs: &CrewInputs) -> Option<String> {
        match self {
            Self::ResearchCompanyCulture => {
                let domain = inputs.company_domain.trim();
                (!domain.is_empty()).then(|| domain.to_string())
            }
            _ => None,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Structured output of [`TaskKind::ResearchRoleRequirements`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRequirements {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<String>,
    #[serde(default)]
    pub qualities: Vec<String>,
}

impl RoleRequirements {
    /// Parse model output, tolerating code fences and surrounding prose.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let trimmed = text.trim();
        let candidate = match (trimmed.find('{'), trimmed.rfind('}')) {
            (Some(start), Some(end)) if start < end => &trimmed[start..=end],
            _ => trimmed,
        };
        serde_json::from_str(candidate)
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty() && self.experience.is_empty() && self.qualities.is_empty()
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        for (heading, items) in [
            ("Skills", &self.skills),
            ("Experience", &self.experience),
            ("Qualities", &self.qualities),
        ] {
            if items.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("**{heading}**\n"));
            for item in items {
                out.push_str(&format!("- {item}\n"));
            }
        }
        out.trim_end().to_string()
    }
}
