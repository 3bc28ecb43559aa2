use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The profile is a singleton stored under this id.
pub const MASTER_PROFILE_ID: &str = "master";

#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    #[error("{collection} item at position {index} has an empty id")]
    EmptyId {
        collection: &'static str,
        index: usize,
    },

    #[error("{collection} contains duplicate id '{id}'")]
    DuplicateId { collection: &'static str, id: String },
}

/// Mints an id for a new collection item. Random, so deleted ids are never reused.
pub fn new_item_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub id: String,
    pub basics: Basics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_template: Option<String>,
    pub socials: Socials,
    pub experience: Vec<ExperienceItem>,
    pub education: Vec<EducationItem>,
    pub skills: Vec<SkillItem>,
    pub projects: Vec<ProjectItem>,
    pub achievements: Vec<AchievementItem>,
    pub publications: Vec<PublicationItem>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            id: MASTER_PROFILE_ID.to_string(),
            basics: Basics::default(),
            custom_template: None,
            socials: Socials::default(),
            experience: Vec::new(),
            education: Vec::new(),
            skills: Vec::new(),
            projects: Vec::new(),
            achievements: Vec::new(),
            publications: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Basics {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub country_code: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub summary: String,
    pub title: String,
}

impl Basics {
    /// First, middle and last name joined by single spaces, skipping blanks.
    pub fn full_name(&self) -> String {
        [&self.first_name, &self.middle_name, &self.last_name]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Socials {
    pub linkedin: String,
    pub github: String,
    pub twitter: String,
    pub youtube: String,
    pub instagram: String,
    pub website: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceItem {
    pub id: String,
    pub company: String,
    pub role: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub current: bool,
    #[serde(rename = "raw_context")]
    pub raw_context: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationItem {
    pub id: String,
    pub institution: String,
    pub area: String,
    pub study_type: String,
    pub start_date: String,
    pub end_date: String,
    pub score: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "raw_context", skip_serializing_if = "Option::is_none")]
    pub raw_context: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillItem {
    pub id: String,
    pub name: String,
    pub level: String,
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub raw_context: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AchievementItem {
    pub id: String,
    pub title: String,
    pub date: String,
    pub issuer: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicationItem {
    pub id: String,
    pub name: String,
    pub publisher: String,
    pub release_date: String,
    pub url: String,
    pub summary: String,
}

impl Profile {
    /// Checks that every collection item has a non-empty id, unique within
    /// its collection.
    pub fn validate(&self) -> Result<(), ProfileError> {
        check_ids("experience", self.experience.iter().map(|i| i.id.as_str()))?;
        check_ids("education", self.education.iter().map(|i| i.id.as_str()))?;
        check_ids("skills", self.skills.iter().map(|i| i.id.as_str()))?;
        check_ids("projects", self.projects.iter().map(|i| i.id.as_str()))?;
        check_ids(
            "achievements",
            self.achievements.iter().map(|i| i.id.as_str()),
        )?;
        check_ids(
            "publications",
            self.publications.iter().map(|i| i.id.as_str()),
        )
    }

    /// Gives a fresh id to every item submitted without one.
    pub fn assign_missing_ids(&mut self) {
        fn fill<'a>(ids: impl Iterator<Item = &'a mut String>) {
            for id in ids.filter(|id| id.trim().is_empty()) {
                *id = new_item_id();
            }
        }
        fill(self.experience.iter_mut().map(|i| &mut i.id));
        fill(self.education.iter_mut().map(|i| &mut i.id));
        fill(self.skills.iter_mut().map(|i| &mut i.id));
        fill(self.projects.iter_mut().map(|i| &mut i.id));
        fill(self.achievements.iter_mut().map(|i| &mut i.id));
        fill(self.publications.iter_mut().map(|i| &mut i.id));
    }
}

fn check_ids<'a>(
    collection: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), ProfileError> {
    let mut seen = HashSet::new();
    for (index, id) in ids.enumerate() {
        if id.trim().is_empty() {
            return Err(ProfileError::EmptyId { collection, index });
        }
        if !seen.insert(id) {
            return Err(ProfileError::DuplicateId {
                collection,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}
