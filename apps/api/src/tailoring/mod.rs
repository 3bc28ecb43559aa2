//! Rewrites résumé text for a job description using the active provider.

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use crate::llm_client::activation::generate_with_active;
use crate::llm_client::prompts::{fill_prompt, RESUME_TAILOR, SUMMARY_GEN};
use crate::llm_client::{LlmClient, LlmError};
use crate::models::profile::{ExperienceItem, Profile};
use crate::models::prompt::PromptTemplate;
use crate::models::resume::ResumeVersion;
use crate::store::prompts::get_prompt;
use crate::store::{self, get_profile, StoreError};

#[derive(Debug, Error)]
pub enum TailorError {
    #[error("Resume {0} not found")]
    ResumeNotFound(String),

    #[error("Prompt '{0}' not found")]
    PromptMissing(&'static str),

    #[error("Job description is empty")]
    EmptyJobDescription,

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Tailors every experience item, then the summary, one call at a time.
/// Each result is saved on the résumé as soon as it arrives.
pub async fn tailor_resume(
    pool: &SqlitePool,
    llm: &LlmClient,
    resume_id: &str,
    job_description: &str,
) -> Result<ResumeVersion, TailorError> {
    if job_description.trim().is_empty() {
        return Err(TailorError::EmptyJobDescription);
    }
    let mut resume: ResumeVersion = store::get(pool, resume_id)
        .await?
        .ok_or_else(|| TailorError::ResumeNotFound(resume_id.to_string()))?;
    let profile = get_profile(pool).await?.unwrap_or_default();
    let tailor = load_prompt(pool, RESUME_TAILOR).await?;
    let summary = load_prompt(pool, SUMMARY_GEN).await?;

    for (i, item) in profile.experience.iter().enumerate() {
        info!(
            "Tailoring experience {}/{} for resume {resume_id}",
            i + 1,
            profile.experience.len()
        );
        let experience = describe_experience(item);
        let user = fill_prompt(
            &tailor.user_prompt_template,
            &[
                ("experience", experience.as_str()),
                ("jobDescription", job_description),
            ],
        );
        let text = generate_with_active(pool, llm, &tailor.system_prompt, &user).await?;
        resume
            .tailored_content
            .experience
            .insert(item.id.clone(), text);
        store::put(pool, &resume).await?;
    }

    let profile_summary = describe_profile(&profile);
    let user = fill_prompt(
        &summary.user_prompt_template,
        &[
            ("profileSummary", profile_summary.as_str()),
            ("jobDescription", job_description),
        ],
    );
    let text = generate_with_active(pool, llm, &summary.system_prompt, &user).await?;
    resume.tailored_content.summary = Some(text);
    store::put(pool, &resume).await?;

    info!("Tailored resume {resume_id}");
    Ok(resume)
}

async fn load_prompt(pool: &SqlitePool, id: &'static str) -> Result<PromptTemplate, TailorError> {
    get_prompt(pool, id)
        .await?
        .ok_or(TailorError::PromptMissing(id))
}

fn describe_experience(item: &ExperienceItem) -> String {
    let end = if item.current {
        "Present"
    } else {
        item.end_date.as_str()
    };
    let mut text = format!("{} at {}", item.role, item.company);
    if !item.start_date.is_empty() || !end.is_empty() {
        text.push_str(&format!(" ({} - {end})", item.start_date));
    }
    if !item.raw_context.is_empty() {
        text.push('\n');
        text.push_str(&item.raw_context);
    }
    text
}

fn describe_profile(profile: &Profile) -> String {
    let basics = &profile.basics;
    let mut lines = vec![format!("Name: {}", basics.full_name())];
    if !basics.title.is_empty() {
        lines.push(format!("Title: {}", basics.title));
    }
    if !basics.summary.is_empty() {
        lines.push(format!("Summary: {}", basics.summary));
    }
    if !profile.skills.is_empty() {
        let skills: Vec<&str> = profile.skills.iter().map(|s| s.name.as_str()).collect();
        lines.push(format!("Skills: {}", skills.join(", ")));
    }
    for exp in &profile.experience {
        lines.push(format!("Experience: {} at {}", exp.role, exp.company));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;
    use crate::llm_client::test_support::{client, serve, Stub};
    use crate::models::settings::{ProviderCredentials, ProviderKind};
    use crate::store::prompts::initialize_prompts;
    use crate::store::{get_settings, put_profile, put_settings};

    async fn seeded_pool() -> SqlitePool {
        let pool = memory_pool().await;
        initialize_prompts(&pool).await.unwrap();

        let mut settings = get_settings(&pool).await.unwrap();
        settings.active_provider = ProviderKind::OpenAi;
        settings.providers.openai = ProviderCredentials {
            key: "sk".into(),
            model: "gpt-4o".into(),
        };
        put_settings(&pool, &settings).await.unwrap();

        let mut profile = Profile::default();
        profile.basics.first_name = "Ada".into();
        for id in ["e1", "e2"] {
            profile.experience.push(ExperienceItem {
                id: id.into(),
                role: "Engineer".into(),
                company: format!("Co {id}"),
                ..Default::default()
            });
        }
        put_profile(&pool, &profile).await.unwrap();

        let resume = ResumeVersion {
            id: "r1".into(),
            created: 1,
            name: "Target".into(),
            template_id: "classic".into(),
            custom_code: None,
            tailored_content: Default::default(),
            canvas: None,
            meta: Default::default(),
        };
        store::put(&pool, &resume).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_tailor_fills_every_experience_and_summary() {
        let pool = seeded_pool().await;
        let stub = Stub::reply("- Rewritten");
        let seen = stub.seen.clone();
        let (llm, activity, _) = client(&serve(stub).await);

        let resume = tailor_resume(&pool, &llm, "r1", "Rust backend role")
            .await
            .unwrap();
        assert_eq!(resume.tailored_content.experience.len(), 2);
        assert_eq!(resume.tailored_content.experience["e2"], "- Rewritten");
        assert_eq!(resume.tailored_content.summary.as_deref(), Some("- Rewritten"));

        let stored: ResumeVersion = store::get(&pool, "r1").await.unwrap().unwrap();
        assert_eq!(stored, resume);

        assert_eq!(activity.entries().len(), 3);
        let seen = seen.lock().unwrap();
        let first_user = seen[0].1["messages"][1]["content"].as_str().unwrap();
        assert!(first_user.contains("Engineer at Co e1"));
        assert!(first_user.contains("Job Description:\nRust backend role"));
        let last_user = seen[2].1["messages"][1]["content"].as_str().unwrap();
        assert!(last_user.starts_with("Profile Data:\nName: Ada"));
    }

    #[tokio::test]
    async fn test_unknown_resume() {
        let pool = seeded_pool().await;
        let (llm, _, _) = client("http://127.0.0.1:9");
        assert!(matches!(
            tailor_resume(&pool, &llm, "nope", "jd").await,
            Err(TailorError::ResumeNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_job_description() {
        let pool = seeded_pool().await;
        let (llm, _, _) = client("http://127.0.0.1:9");
        assert!(matches!(
            tailor_resume(&pool, &llm, "r1", "   ").await,
            Err(TailorError::EmptyJobDescription)
        ));
    }

    #[test]
    fn test_describe_experience() {
        let item = ExperienceItem {
            role: "Dev".into(),
            company: "Acme".into(),
            start_date: "2020".into(),
            current: true,
            raw_context: "Built APIs".into(),
            ..Default::default()
        };
        assert_eq!(describe_experience(&item), "Dev at Acme (2020 - Present)\nBuilt APIs");
    }
}
