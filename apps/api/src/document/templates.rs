use serde_json::{json, Value};

use crate::document::{city_state, date_range, display_name, page, PAGE_MARGIN};
use crate::models::profile::Profile;

const MINIMAL_MARGIN: u32 = 60;

// ── Classic: centered header, skills and education beside experience ────────

mod classic_colors {
    pub const PRIMARY: &str = "#1e293b";
    pub const SECONDARY: &str = "#64748b";
    pub const ACCENT: &str = "#2563eb";
    pub const MUTED: &str = "#94a3b8";
    pub const BORDER: &str = "#e2e8f0";
}

fn classic_heading(title: &str) -> Value {
    json!({
        "text": title,
        "fontSize": 10,
        "bold": true,
        "color": classic_colors::MUTED,
        "margin": [0, 0, 0, 8]
    })
}

pub fn classic(profile: &Profile) -> Value {
    use classic_colors::*;
    let basics = &profile.basics;
    let mut content = vec![json!({
        "text": display_name(basics).to_uppercase(),
        "fontSize": 28,
        "bold": true,
        "color": PRIMARY,
        "alignment": "center",
        "margin": [0, 0, 0, 5]
    })];

    if !basics.title.is_empty() {
        content.push(json!({
            "text": basics.title,
            "fontSize": 12,
            "bold": true,
            "color": ACCENT,
            "alignment": "center",
            "margin": [0, 0, 0, 10]
        }));
    }

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
            "text": contacts.join("  •  "),
            "fontSize": 9,
            "color": SECONDARY,
            "alignment": "center",
            "margin": [0, 0, 0, 25]
        }));
    }

    if !basics.summary.is_empty() {
        content.push(classic_heading("PROFESSIONAL PROFILE"));
        content.push(json!({
            "canvas": [{
                "type": "line", "x1": 0, "y1": 0, "x2": 515, "y2": 0,
                "lineWidth": 0.5, "lineColor": BORDER
            }],
            "margin": [0, 0, 0, 8]
        }));
        content.push(json!({
            "text": basics.summary,
            "fontSize": 10,
            "color": SECONDARY,
            "lineHeight": 1.4,
            "margin": [0, 0, 0, 20]
        }));
    }

    let mut left = Vec::new();
    if !profile.skills.is_empty() {
        left.push(classic_heading("SKILLS"));
        for skill in &profile.skills {
            left.push(json!({
                "text": skill.name,
                "fontSize": 9,
                "color": PRIMARY,
                "background": BORDER,
                "margin": [0, 0, 0, 4]
            }));
        }
        left.push(json!({"text": "", "margin": [0, 0, 0, 15]}));
    }
    if !profile.education.is_empty() {
        left.push(classic_heading("EDUCATION"));
        for edu in &profile.education {
            left.push(json!({
                "text": edu.study_type, "fontSize": 10, "bold": true,
                "color": PRIMARY, "margin": [0, 5, 0, 2]
            }));
            left.push(json!({
                "text": edu.institution, "fontSize": 9,
                "color": SECONDARY, "margin": [0, 0, 0, 2]
            }));
            left.push(json!({
                "text": format!("{} - {}", edu.start_date, edu.end_date),
                "fontSize": 8, "color": MUTED, "margin": [0, 0, 0, 8]
            }));
        }
    }

    let mut right = Vec::new();
    if !profile.experience.is_empty() {
        right.push(classic_heading("EXPERIENCE"));
        for exp in &profile.experience {
            right.push(json!({
                "text": exp.role, "fontSize": 11, "bold": true,
                "color": PRIMARY, "margin": [0, 5, 0, 2]
            }));
            right.push(json!({
                "text": exp.company, "fontSize": 10, "bold": true,
                "color": ACCENT, "margin": [0, 0, 0, 2]
            }));
            right.push(json!({
                "text": date_range(exp), "fontSize": 8,
                "color": MUTED, "margin": [0, 0, 0, 5]
            }));
            if !exp.raw_context.is_empty() {
                right.push(json!({
                    "text": exp.raw_context, "fontSize": 9, "color": SECONDARY,
                    "lineHeight": 1.3, "margin": [0, 0, 0, 12]
                }));
            }
        }
    }

    content.push(json!({
        "columns": [
            {"width": "30%", "stack": left},
            {"width": "5%", "text": ""},
            {"width": "65%", "stack": right}
        ]
    }));

    page(content, PAGE_MARGIN)
}

// ── Modern: contact sidebar on the left, narrative on the right ─────────────

mod modern_colors {
    pub const DARK: &str = "#0f172a";
    pub const ACCENT: &str = "#3b82f6";
    pub const MUTED: &str = "#94a3b8";
    pub const TEXT: &str = "#334155";
}

fn modern_label(title: &str, margin: [u32; 4]) -> Value {
    json!({
        "text": title, "fontSize": 8, "bold": true,
        "color": modern_colors::MUTED, "margin": margin
    })
}

pub fn modern(profile: &Profile) -> Value {
    use modern_colors::*;
    let basics = &profile.basics;

    let mut sidebar = vec![
        json!({
            "text": basics.first_name, "fontSize": 24, "bold": true,
            "color": DARK, "margin": [0, 0, 0, 0]
        }),
        json!({
            "text": basics.last_name, "fontSize": 24, "bold": true,
            "color": DARK, "margin": [0, 0, 0, 5]
        }),
        json!({
            "text": basics.title.to_uppercase(), "fontSize": 9, "bold": true,
            "color": ACCENT, "margin": [0, 0, 0, 20]
        }),
        modern_label("CONTACT", [0, 0, 0, 8]),
    ];
    for line in [&basics.email, &basics.phone] {
        if !line.is_empty() {
            sidebar.push(json!({
                "text": line, "fontSize": 9, "color": TEXT, "margin": [0, 0, 0, 4]
            }));
        }
    }
    if let Some(place) = city_state(basics) {
        sidebar.push(json!({
            "text": place, "fontSize": 9, "color": TEXT, "margin": [0, 0, 0, 15]
        }));
    }
    if !profile.skills.is_empty() {
        sidebar.push(modern_label("EXPERTISE", [0, 10, 0, 8]));
        sidebar.extend(profile.skills.iter().map(|s| {
            json!({"text": s.name, "fontSize": 9, "color": TEXT, "margin": [0, 0, 0, 3]})
        }));
    }
    if !profile.education.is_empty() {
        sidebar.push(modern_label("EDUCATION", [0, 15, 0, 8]));
        for edu in &profile.education {
            sidebar.push(json!({
                "text": edu.study_type, "fontSize": 9, "bold": true,
                "color": DARK, "margin": [0, 0, 0, 2]
            }));
            sidebar.push(json!({
                "text": edu.institution, "fontSize": 8,
                "color": MUTED, "margin": [0, 0, 0, 8]
            }));
        }
    }

    let mut main = Vec::new();
    if !basics.summary.is_empty() {
        main.push(json!({
            "text": "PROFILE", "fontSize": 12, "bold": true,
            "color": DARK, "margin": [0, 0, 0, 8]
        }));
        main.push(json!({
            "text": basics.summary, "fontSize": 10, "color": TEXT,
            "lineHeight": 1.4, "margin": [0, 0, 0, 20]
        }));
    }
    if !profile.experience.is_empty() {
        main.push(json!({
            "text": "EXPERIENCE", "fontSize": 12, "bold": true,
            "color": DARK, "margin": [0, 0, 0, 12]
        }));
        for exp in &profile.experience {
            main.push(json!({
                "columns": [
                    {"text": exp.role, "fontSize": 11, "bold": true, "color": DARK, "width": "*"},
                    {"text": date_range(exp), "fontSize": 8, "color": MUTED, "width": "auto"}
                ],
                "margin": [0, 0, 0, 3]
            }));
            main.push(json!({
                "text": exp.company, "fontSize": 10, "bold": true,
                "color": ACCENT, "margin": [0, 0, 0, 5]
            }));
            if !exp.raw_context.is_empty() {
                main.push(json!({
                    "text": exp.raw_context, "fontSize": 9, "color": TEXT,
                    "lineHeight": 1.3, "margin": [0, 0, 0, 15]
                }));
            }
        }
    }

    let content = vec![json!({
        "columns": [
            {"width": "35%", "stack": sidebar},
            {"width": "65%", "stack": main}
        ]
    })];
    page(content, PAGE_MARGIN)
}

// ── Minimal: single column, wide margins ────────────────────────────────────

mod minimal_colors {
    pub const PRIMARY: &str = "#0f172a";
    pub const SECONDARY: &str = "#64748b";
    pub const MUTED: &str = "#cbd5e1";
}

fn minimal_label(title: &str, bottom: u32) -> Value {
    json!({
        "text": title, "fontSize": 8, "bold": true, "color": minimal_colors::MUTED,
        "letterSpacing": 3, "margin": [0, 0, 0, bottom]
    })
}

pub fn minimal(profile: &Profile) -> Value {
    use minimal_colors::*;
    let basics = &profile.basics;

    let mut content = vec![json!({
        "text": display_name(basics), "fontSize": 28,
        "color": PRIMARY, "margin": [0, 0, 0, 3]
    })];

    if !basics.title.is_empty() {
        content.push(json!({
            "text": basics.title.to_uppercase(), "fontSize": 9, "bold": true,
            "color": SECONDARY, "letterSpacing": 2, "margin": [0, 0, 0, 15]
        }));
    }

    let contacts: Vec<&str> = [basics.email.as_str(), basics.city.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    if !contacts.is_empty() {
        content.push(json!({
            "text": contacts.join("  •  "), "fontSize": 8,
            "color": MUTED, "margin": [0, 0, 0, 25]
        }));
    }

    if !basics.summary.is_empty() {
        content.push(json!({
            "text": basics.summary, "fontSize": 10, "color": SECONDARY,
            "lineHeight": 1.5, "margin": [0, 0, 0, 30]
        }));
    }

    if !profile.experience.is_empty() {
        content.push(minimal_label("EXPERIENCE", 15));
        for exp in &profile.experience {
            let mut stack = vec![
                json!({
                    "text": exp.role, "fontSize": 11, "bold": true,
                    "color": PRIMARY, "margin": [0, 0, 0, 2]
                }),
                json!({
                    "text": exp.company, "fontSize": 9,
                    "color": SECONDARY, "margin": [0, 0, 0, 5]
                }),
            ];
            if !exp.raw_context.is_empty() {
                stack.push(json!({
                    "text": exp.raw_context, "fontSize": 9, "color": SECONDARY,
                    "lineHeight": 1.3, "margin": [0, 0, 0, 0]
                }));
            }
            content.push(json!({
                "columns": [
                    {"width": "25%", "text": date_range(exp), "fontSize": 8, "color": MUTED},
                    {"width": "75%", "stack": stack}
                ],
                "margin": [0, 0, 0, 20]
            }));
        }
    }

    if !profile.skills.is_empty() || !profile.education.is_empty() {
        let skills = if profile.skills.is_empty() {
            json!({"width": "50%", "text": ""})
        } else {
            let mut stack = vec![minimal_label("SKILLS", 10)];
            stack.extend(profile.skills.iter().map(|s| {
                json!({
                    "text": format!("• {}", s.name), "fontSize": 9,
                    "color": SECONDARY, "margin": [0, 0, 0, 3]
                })
            }));
            json!({"width": "50%", "stack": stack})
        };
        let education = if profile.education.is_empty() {
            json!({"width": "50%", "text": ""})
        } else {
            let mut stack = vec![minimal_label("EDUCATION", 10)];
            for edu in &profile.education {
                stack.push(json!({
                    "text": edu.study_type, "fontSize": 10, "bold": true,
                    "color": PRIMARY, "margin": [0, 0, 0, 2]
                }));
                stack.push(json!({
                    "text": edu.institution, "fontSize": 9,
                    "color": SECONDARY, "margin": [0, 0, 0, 10]
                }));
            }
            json!({"width": "50%", "stack": stack})
        };
        content.push(json!({
            "columns": [skills, education],
            "margin": [0, 20, 0, 0]
        }));
    }

    page(content, MINIMAL_MARGIN)
}
