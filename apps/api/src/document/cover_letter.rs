use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::document::{city_state, display_name, page, PAGE_MARGIN};
use crate::models::profile::Profile;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoverLetterData {
    #[serde(default)]
    pub recipient_name: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub content: String,
}

/// Date, recipient block, optional subject line, salutation, body
/// paragraphs, sign-off and a contact line.
pub fn cover_letter_document(profile: &Profile, data: &CoverLetterData, date: NaiveDate) -> Value {
    let basics = &profile.basics;
    let mut content = vec![json!({
        "text": date.format("%B %-d, %Y").to_string(),
        "fontSize": 10,
        "margin": [0, 0, 0, 15]
    })];

    if !data.recipient_name.is_empty() {
        content.push(json!({
            "text": data.recipient_name, "fontSize": 10, "bold": true, "margin": [0, 0, 0, 2]
        }));
    }
    if !data.company_name.is_empty() {
        content.push(json!({
            "text": data.company_name, "fontSize": 10, "margin": [0, 0, 0, 15]
        }));
    }
    if let Some(subject) = data.subject.as_deref().filter(|s| !s.is_empty()) {
        content.push(json!({
            "text": format!("RE: {subject}"), "fontSize": 10, "bold": true, "margin": [0, 0, 0, 15]
        }));
    }

    let recipient = if data.recipient_name.is_empty() {
        "Hiring Manager"
    } else {
        data.recipient_name.as_str()
    };
    content.push(json!({
        "text": format!("Dear {recipient},"), "fontSize": 10, "margin": [0, 0, 0, 10]
    }));

    for paragraph in data.content.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
        content.push(json!({
            "text": paragraph,
            "fontSize": 10,
            "lineHeight": 1.5,
            "margin": [0, 0, 0, 10],
            "alignment": "justify"
        }));
    }

    content.push(json!({"text": "Sincerely,", "fontSize": 10, "margin": [0, 20, 0, 30]}));
    content.push(json!({"text": display_name(basics), "fontSize": 10, "bold": true}));

    let contacts: Vec<String> = [
        Some(basics.email.clone()),
        Some(basics.phone.clone()),
        city_state(basics),
    ]
    .into_iter()
    .flatten()
    .filter(|s| !s.is_empty())
    .collect();
    if !contacts.is_empty() {
        content.push(json!({
            "text": contacts.join(" | "),
            "fontSize": 9,
            "color": "#64748b",
            "margin": [0, 5, 0, 0]
        }));
    }

    page(content, PAGE_MARGIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter(recipient: &str, subject: Option<&str>) -> Value {
        let mut profile = Profile::default();
        profile.basics.first_name = "Ada".into();
        profile.basics.last_name = "Lovelace".into();
        profile.basics.email = "ada@example.com".into();
        profile.basics.phone = "555".into();
        let data = CoverLetterData {
            recipient_name: recipient.into(),
            company_name: "Analytical Engines Ltd".into(),
            subject: subject.map(str::to_string),
            content: "First paragraph.\n\n  \n\nSecond paragraph.  ".into(),
        };
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        cover_letter_document(&profile, &data, date)
    }

    fn texts(doc: &Value) -> Vec<String> {
        doc["content"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["text"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_full_letter() {
        let doc = letter("Charles Babbage", Some("Engineer role"));
        assert_eq!(
            texts(&doc),
            vec![
                "March 5, 2024",
                "Charles Babbage",
                "Analytical Engines Ltd",
                "RE: Engineer role",
                "Dear Charles Babbage,",
                "First paragraph.",
                "Second paragraph.",
                "Sincerely,",
                "Ada Lovelace",
                "ada@example.com | 555",
            ]
        );
    }

    #[test]
    fn test_salutation_defaults_and_subject_is_optional() {
        let text = texts(&letter("", None));
        assert!(text.contains(&"Dear Hiring Manager,".to_string()));
        assert!(!text.iter().any(|t| t.starts_with("RE:")));
    }
}
