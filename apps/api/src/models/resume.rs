use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::profile::{EducationItem, ExperienceItem, ProjectItem, SkillItem};

/// A named, saved résumé. Owned by the store; never expires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeVersion {
    pub id: String,
    /// Creation time in epoch milliseconds.
    pub created: i64,
    pub name: String,
    pub template_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_code: Option<String>,
    #[serde(default)]
    pub tailored_content: TailoredContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas: Option<Vec<CanvasItem>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, Value>,
}

/// Rewritten text keyed by the id of the profile item it came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TailoredContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub experience: BTreeMap<String, String>,
    pub education: BTreeMap<String, String>,
    pub skills: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasItem {
    pub id: String,
    #[serde(flatten)]
    pub content: CanvasContent,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: CanvasHeight,
    #[serde(default)]
    pub style: BTreeMap<String, Value>,
}

/// What a canvas block shows, tagged by `type` with the payload under `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum CanvasContent {
    Experience(ExperienceItem),
    Education(EducationItem),
    Skill(SkillItem),
    Project(ProjectItem),
    Text(TextBlock),
    Divider,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextBlock {
    pub text: String,
}

/// Either a fixed height or `"auto"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CanvasHeight {
    Fixed(f64),
    Auto(AutoHeight),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoHeight {
    Auto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomTemplate {
    pub id: String,
    pub name: String,
    pub code: String,
    pub created: i64,
    pub updated: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativeDesign {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<CanvasItem>,
    pub updated: i64,
}
