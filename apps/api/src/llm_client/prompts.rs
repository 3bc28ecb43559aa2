// Built-in prompt vault entries. Users may edit any of them; an edited entry
// is marked custom and survives a reset.

use crate::models::prompt::PromptTemplate;

pub const RESUME_TAILOR: &str = "resume-tailor";
pub const SUMMARY_GEN: &str = "summary-gen";
pub const SKILL_EXTRACT: &str = "skill-extract";
/// The activation handshake pair.
pub const HELLO_JSON: &str = "hello-json";

pub const HELLO_JSON_SYSTEM: &str = r#"Return a JSON string exactly in this format: {"greetings": "hi"}"#;
pub const HELLO_JSON_USER: &str = "Return hit in JSON format.";

/// Replies accepted as a successful handshake.
pub const ACCEPTED_GREETINGS: &[&str] = &["hi", "hit"];

struct Builtin {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    system: &'static str,
    user: &'static str,
}

const BUILTINS: &[Builtin] = &[
    Builtin {
        id: RESUME_TAILOR,
        name: "Experience Tailoring",
        description: "Rewrites professional experience bullets based on a job description.",
        system: "You are an expert resume writer. Rewrite the following professional experience \
                 bullets to align with the provided job description while maintaining factual \
                 accuracy. Use strong action verbs and quantify achievements.",
        user: "Experience Item:\n{{experience}}\n\nJob Description:\n{{jobDescription}}\n\n\
               Rewrite strictly as a list of bullet points.",
    },
    Builtin {
        id: SUMMARY_GEN,
        name: "Summary Generation",
        description: "Generates a professional summary based on profile and JD.",
        system: "You are an expert career coach. Create a compelling, concise professional \
                 summary (2-3 sentences) for a resume.",
        user: "Profile Data:\n{{profileSummary}}\n\nJob Description:\n{{jobDescription}}\n\n\
               Generate a professional summary labeled \"Professional Summary\".",
    },
    Builtin {
        id: SKILL_EXTRACT,
        name: "Skill Extraction",
        description: "Extracts relevant skills from a job description.",
        system: "Extract key technical and soft skills from the following job description. \
                 Return them as a comma-separated list.",
        user: "Job Description:\n{{jobDescription}}",
    },
    Builtin {
        id: HELLO_JSON,
        name: "Hello JSON Test",
        description: "Test prompt to verify JSON response format.",
        system: HELLO_JSON_SYSTEM,
        user: HELLO_JSON_USER,
    },
];

/// Fresh copies of the built-in prompts, stamped with `now`.
pub fn default_prompts(now: i64) -> Vec<PromptTemplate> {
    BUILTINS
        .iter()
        .map(|b| PromptTemplate {
            id: b.id.to_string(),
            name: b.name.to_string(),
            description: b.description.to_string(),
            system_prompt: b.system.to_string(),
            user_prompt_template: b.user.to_string(),
            is_custom: false,
            last_updated: now,
        })
        .collect()
}

/// Replaces every `{{name}}` token whose name has a value. Unknown tokens
/// are left as written.
pub fn fill_prompt(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let name = after[..end].trim();
                match values.iter().find(|(k, _)| *k == name) {
                    Some((_, value)) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids() {
        let ids: Vec<String> = default_prompts(0).into_iter().map(|p| p.id).collect();
        assert_eq!(
            ids,
            vec!["resume-tailor", "summary-gen", "skill-extract", "hello-json"]
        );
    }

    #[test]
    fn test_tailor_prompt_text() {
        let prompts = default_prompts(5);
        let tailor = &prompts[0];
        assert!(tailor.system_prompt.starts_with("You are an expert resume writer. Rewrite"));
        assert!(tailor.user_prompt_template.contains("Experience Item:\n{{experience}}\n\n"));
        assert!(!tailor.is_custom);
        assert_eq!(tailor.last_updated, 5);
    }

    #[test]
    fn test_fill_prompt_replaces_every_occurrence() {
        let out = fill_prompt("{{a}} and {{ a }} then {{b}}", &[("a", "x"), ("b", "y")]);
        assert_eq!(out, "x and x then y");
    }

    #[test]
    fn test_fill_prompt_keeps_unknown_and_unclosed() {
        assert_eq!(fill_prompt("{{who}} {{", &[("a", "x")]), "{{who}} {{");
    }

    #[test]
    fn test_fill_prompt_does_not_rescan_values() {
        assert_eq!(fill_prompt("{{a}}", &[("a", "{{b}}"), ("b", "no")]), "{{b}}");
    }
}
