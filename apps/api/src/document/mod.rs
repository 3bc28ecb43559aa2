//! pdfmake document definitions. The browser turns these into PDFs; the
//! server only decides layout and content.

pub mod cover_letter;
pub mod templates;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::models::profile::{Basics, ExperienceItem, Profile};

pub use cover_letter::{cover_letter_document, CoverLetterData};

pub const PAGE_MARGIN: u32 = 40;

/// Built-in résumé layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumeTemplate {
    Classic,
    Modern,
    Minimal,
}

impl ResumeTemplate {
    /// Unknown ids fall back to the classic layout.
    pub fn from_id(id: &str) -> Self {
        match id {
            "modern" => ResumeTemplate::Modern,
            "minimal" => ResumeTemplate::Minimal,
            _ => ResumeTemplate::Classic,
        }
    }
}

pub fn resume_document(profile: &Profile, template_id: &str) -> Value {
    match ResumeTemplate::from_id(template_id) {
        ResumeTemplate::Classic => templates::classic(profile),
        ResumeTemplate::Modern => templates::modern(profile),
        ResumeTemplate::Minimal => templates::minimal(profile),
    }
}

/// `{First}_{Last}_Resume.pdf`
pub fn resume_file_name(basics: &Basics) -> String {
    format!("{}_{}_Resume.pdf", basics.first_name, basics.last_name)
}

/// `Cover_Letter_{Last}.pdf`
pub fn cover_letter_file_name(basics: &Basics) -> String {
    format!("Cover_Letter_{}.pdf", basics.last_name)
}

/// Wraps content in an A4 page with uniform margins and the Roboto font.
fn page(content: Vec<Value>, margin: u32) -> Value {
    json!({
        "pageSize": "A4",
        "pageMargins": [margin, margin, margin, margin],
        "content": content,
        "defaultStyle": {"font": "Roboto"}
    })
}

fn display_name(basics: &Basics) -> String {
    format!("{} {}", basics.first_name, basics.last_name)
}

fn date_range(exp: &ExperienceItem) -> String {
    let end = if exp.current { "Present" } else { exp.end_date.as_str() };
    format!("{} — {}", exp.start_date, end)
}

fn city_state(basics: &Basics) -> Option<String> {
    (!basics.city.is_empty()).then(|| format!("{}, {}", basics.city, basics.state))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> Profile {
        let mut profile = Profile::default();
        profile.basics.first_name = "Ada".into();
        profile.basics.last_name = "Lovelace".into();
        profile
    }

    #[test]
    fn test_unknown_template_is_classic() {
        let profile = ada();
        assert_eq!(
            resume_document(&profile, "executive"),
            resume_document(&profile, "classic")
        );
        assert_ne!(
            resume_document(&profile, "modern"),
            resume_document(&profile, "classic")
        );
    }

    #[test]
    fn test_page_shell() {
        let doc = resume_document(&ada(), "classic");
        assert_eq!(doc["pageSize"], "A4");
        assert_eq!(doc["pageMargins"], json!([40, 40, 40, 40]));
        assert_eq!(doc["defaultStyle"]["font"], "Roboto");
    }

    #[test]
    fn test_file_names() {
        let profile = ada();
        assert_eq!(resume_file_name(&profile.basics), "Ada_Lovelace_Resume.pdf");
        assert_eq!(
            cover_letter_file_name(&profile.basics),
            "Cover_Letter_Lovelace.pdf"
        );
    }

    #[test]
    fn test_current_role_reads_present() {
        let exp = ExperienceItem {
            start_date: "2021".into(),
            end_date: "2023".into(),
            current: true,
            ..Default::default()
        };
        assert_eq!(date_range(&exp), "2021 — Present");
    }
}
