// src/services/classifier.rs
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityKind {
    Academic,
    MentalHealth,
    Achievement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertType {
    AcademicStruggle,
    MentalHealth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Urgent,
}

/// Teacher alert raised by a chat message, before it gets an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDraft {
    pub student_id: String,
    pub student_name: String,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub ai_insight: String,
    pub suggested_actions: Vec<String>,
}

/// Activity log entry derived from what the student wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDraft {
    pub student_id: String,
    pub kind: ActivityKind,
    pub category: &'static str,
    pub description: &'static str,
    pub alert: Option<AlertDraft>,
}

#[derive(Debug, Clone, Default)]
pub struct ClassifierContext {
    pub student_id: String,
    pub student_name: String,
    /// Recent check-ins where the student reported academic challenges.
    pub academic_challenge_checkins: usize,
}

struct Rule {
    keywords: &'static [&'static str],
    applies: fn(&ClassifierContext) -> bool,
    kind: ActivityKind,
    category: &'static str,
    description: &'static str,
    alert: Option<fn(&ClassifierContext) -> AlertDraft>,
}

const ACADEMIC_ALERT_MIN_CHECKINS: usize = 3;

// Evaluated top to bottom, first match wins.
const RULES: &[Rule] = &[
    Rule {
        keywords: &["depressed", "hopeless", "can't cope", "give up"],
        applies: always,
        kind: ActivityKind::MentalHealth,
        category: "emotional-crisis",
        description: "Expressed serious emotional distress",
        alert: Some(distress_alert),
    },
    Rule {
        keywords: &["failing", "don't understand", "too hard", "can't do it"],
        applies: struggles_repeatedly,
        kind: ActivityKind::Academic,
        category: "struggling",
        description: "Expressed difficulty with coursework",
        alert: Some(academic_alert),
    },
    Rule {
        keywords: &["stress", "anxious", "worried"],
        applies: always,
        kind: ActivityKind::MentalHealth,
        category: "emotional-support",
        description: "Sought support for stress or anxiety",
        alert: None,
    },
    Rule {
        keywords: &["homework", "assignment", "study"],
        applies: always,
        kind: ActivityKind::Academic,
        category: "study-help",
        description: "Asked for academic help",
        alert: None,
    },
    Rule {
        keywords: &["career", "future", "goal"],
        applies: always,
        kind: ActivityKind::Achievement,
        category: "goal-planning",
        description: "Discussed career goals and aspirations",
        alert: None,
    },
];

fn always(_: &ClassifierContext) -> bool {
    true
}

fn struggles_repeatedly(ctx: &ClassifierContext) -> bool {
    ctx.academic_challenge_checkins >= ACADEMIC_ALERT_MIN_CHECKINS
}

fn distress_alert(ctx: &ClassifierContext) -> AlertDraft {
    AlertDraft {
        student_id: ctx.student_id.clone(),
        student_name: ctx.student_name.clone(),
        alert_type: AlertType::MentalHealth,
        severity: Severity::Urgent,
        title: "Student Expressing Serious Emotional Distress".to_string(),
        description: format!(
            "{} has used concerning language in chat that may indicate mental health crisis.",
            ctx.student_name
        ),
        ai_insight: "The student used language indicating potential depression or hopelessness. \
                     Immediate check-in recommended."
            .to_string(),
        suggested_actions: to_strings(&[
            "Schedule immediate one-on-one conversation",
            "Contact school counselor",
            "Reach out to parents/guardians",
            "Provide mental health resources",
        ]),
    }
}

fn academic_alert(ctx: &ClassifierContext) -> AlertDraft {
    AlertDraft {
        student_id: ctx.student_id.clone(),
        student_name: ctx.student_name.clone(),
        alert_type: AlertType::AcademicStruggle,
        severity: Severity::High,
        title: "Student Struggling with Academic Performance".to_string(),
        description: format!(
            "{} has repeatedly mentioned academic difficulties and may need extra support.",
            ctx.student_name
        ),
        ai_insight: "Pattern detected: Student has expressed academic challenges in multiple \
                     check-ins and is seeking help."
            .to_string(),
        suggested_actions: to_strings(&[
            "Arrange tutoring sessions",
            "Review study methods and materials",
            "Break down complex topics into smaller parts",
            "Consider additional practice resources",
        ]),
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn classify(text: &str, ctx: &ClassifierContext) -> Option<ActivityDraft> {
    let lower = text.to_lowercase();

    RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| lower.contains(k)) && (rule.applies)(ctx))
        .map(|rule| ActivityDraft {
            student_id: ctx.student_id.clone(),
            kind: rule.kind,
            category: rule.category,
            description: rule.description,
            alert: rule.alert.map(|build| build(ctx)),
        })
}
