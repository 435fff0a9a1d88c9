// src/services/insights.rs
use std::fmt::{self, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::StudentProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Excellent,
    Good,
    Okay,
    Stressed,
    Struggling,
}

impl Mood {
    pub fn score(self) -> f64 {
        match self {
            Mood::Excellent => 5.0,
            Mood::Good => 4.0,
            Mood::Okay => 3.0,
            Mood::Stressed => 2.0,
            Mood::Struggling => 1.0,
        }
    }

    fn from_average(score: f64) -> Self {
        if score >= 4.5 {
            Mood::Excellent
        } else if score >= 3.5 {
            Mood::Good
        } else if score >= 2.5 {
            Mood::Okay
        } else if score >= 1.5 {
            Mood::Stressed
        } else {
            Mood::Struggling
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Excellent => "excellent",
            Mood::Good => "good",
            Mood::Okay => "okay",
            Mood::Stressed => "stressed",
            Mood::Struggling => "struggling",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One day's self-report from the check-in form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCheckIn {
    pub mood: Mood,
    /// 1-10
    pub stress_level: u8,
    pub sleep_hours: f64,
    /// 1-10
    pub energy_level: u8,
    pub study_hours: f64,
    #[serde(default)]
    pub subjects_studied: Vec<String>,
    pub homework_completed: bool,
    pub classes_attended: u32,
    #[serde(default)]
    pub physical_activity_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub academic_challenges_faced: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodTrend {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodAnalysis {
    /// `None` when there are no check-ins to average.
    pub average_mood: Option<Mood>,
    pub average_stress: f64,
    pub trend: MoodTrend,
    pub concerns: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicMetrics {
    pub total_study_hours: f64,
    pub average_study_hours: f64,
    /// Percent of check-ins with homework done.
    pub homework_completion_rate: u32,
    /// Percent of an assumed six classes a day.
    pub attendance_rate: u32,
    pub most_studied_subjects: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub strengths: Vec<&'static str>,
    pub growth_areas: Vec<&'static str>,
    pub recommendations: Vec<&'static str>,
}

const CLASSES_PER_DAY: f64 = 6.0;
const TREND_WINDOW: usize = 3;
const TREND_MARGIN: f64 = 0.5;

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

fn more_than_half<F>(check_ins: &[DailyCheckIn], pred: F) -> bool
where
    F: Fn(&DailyCheckIn) -> bool,
{
    let hits = check_ins.iter().filter(|c| pred(c)).count();
    hits as f64 > check_ins.len() as f64 / 2.0
}

/// Summarise mood and stress over check-ins ordered newest first.
///
/// The trend compares the three newest check-ins with up to three before
/// them and stays `Stable` until there is something older to compare to.
pub fn analyze_mood_patterns(check_ins: &[DailyCheckIn]) -> MoodAnalysis {
    let Some(avg_mood) = mean(check_ins.iter().map(|c| c.mood.score())) else {
        return MoodAnalysis {
            average_mood: None,
            average_stress: 0.0,
            trend: MoodTrend::Stable,
            concerns: Vec::new(),
        };
    };
    let avg_stress = mean(check_ins.iter().map(|c| f64::from(c.stress_level))).unwrap_or(0.0);

    let recent = check_ins.iter().take(TREND_WINDOW).map(|c| c.mood.score());
    let older = check_ins
        .iter()
        .skip(TREND_WINDOW)
        .take(TREND_WINDOW)
        .map(|c| c.mood.score());
    let trend = match (check_ins.len() >= TREND_WINDOW, mean(recent), mean(older)) {
        (true, Some(recent), Some(older)) if recent > older + TREND_MARGIN => MoodTrend::Improving,
        (true, Some(recent), Some(older)) if recent < older - TREND_MARGIN => MoodTrend::Declining,
        _ => MoodTrend::Stable,
    };

    let mut concerns = Vec::new();
    if avg_stress > 7.0 {
        concerns.push("High stress levels detected");
    }
    if avg_mood < 2.5 {
        concerns.push("Consistently low mood");
    }
    if more_than_half(check_ins, |c| c.sleep_hours < 6.0) {
        concerns.push("Insufficient sleep pattern");
    }
    if more_than_half(check_ins, |c| c.energy_level < 4) {
        concerns.push("Low energy levels");
    }

    MoodAnalysis {
        average_mood: Some(Mood::from_average(avg_mood)),
        average_stress: round_tenth(avg_stress),
        trend,
        concerns,
    }
}

pub fn calculate_academic_metrics(check_ins: &[DailyCheckIn]) -> AcademicMetrics {
    if check_ins.is_empty() {
        return AcademicMetrics {
            total_study_hours: 0.0,
            average_study_hours: 0.0,
            homework_completion_rate: 0,
            attendance_rate: 0,
            most_studied_subjects: Vec::new(),
        };
    }

    let days = check_ins.len() as f64;
    let total_study: f64 = check_ins.iter().map(|c| c.study_hours).sum();
    let completed = check_ins.iter().filter(|c| c.homework_completed).count() as f64;
    let classes: u32 = check_ins.iter().map(|c| c.classes_attended).sum();
    let attendance = if classes > 0 {
        f64::from(classes) / (days * CLASSES_PER_DAY) * 100.0
    } else {
        100.0
    };

    // first-seen order breaks ties
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for subject in check_ins.iter().flat_map(|c| &c.subjects_studied) {
        match counts.iter_mut().find(|(s, _)| *s == subject.as_str()) {
            Some((_, n)) => *n += 1,
            None => counts.push((subject.as_str(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    AcademicMetrics {
        total_study_hours: round_tenth(total_study),
        average_study_hours: round_tenth(total_study / days),
        homework_completion_rate: (completed / days * 100.0).round() as u32,
        attendance_rate: attendance.round() as u32,
        most_studied_subjects: counts
            .into_iter()
            .take(3)
            .map(|(s, _)| s.to_string())
            .collect(),
    }
}

/// Strengths, growth areas and follow-ups for the teacher report.
pub fn generate_insights(profile: &StudentProfile, check_ins: &[DailyCheckIn]) -> Insights {
    let academics = calculate_academic_metrics(check_ins);
    let mood = analyze_mood_patterns(check_ins);
    let mut insights = Insights::default();

    if academics.homework_completion_rate > 80 {
        insights.strengths.push("Consistently completes homework assignments");
    }
    if academics.attendance_rate > 90 {
        insights.strengths.push("Excellent class attendance");
    }
    if academics.average_study_hours > 2.0 {
        insights.strengths.push("Demonstrates strong study habits");
    }
    if mood.trend == MoodTrend::Improving {
        insights.strengths.push("Shows improving emotional well-being");
    }
    let activity = mean(check_ins.iter().map(|c| f64::from(c.physical_activity_minutes)));
    if activity.is_some_and(|minutes| minutes > 30.0) {
        insights.strengths.push("Maintains regular physical activity");
    }

    let mut flag = |area: &'static str, recommendation: &'static str| {
        insights.growth_areas.push(area);
        insights.recommendations.push(recommendation);
    };
    if academics.homework_completion_rate < 60 {
        flag(
            "Homework completion needs improvement",
            "Implement a structured homework schedule with breaks",
        );
    }
    if mood.average_stress > 7.0 {
        flag(
            "Managing high stress levels",
            "Introduce stress management techniques and regular breaks",
        );
    }
    if academics.average_study_hours < 1.0 {
        flag(
            "Study time could be increased",
            "Set daily study goals starting with 1-2 hours",
        );
    }
    if more_than_half(check_ins, |c| c.sleep_hours < 7.0) {
        flag(
            "Sleep patterns need attention",
            "Establish a consistent bedtime routine aiming for 7-8 hours",
        );
    }
    if mood.trend == MoodTrend::Declining {
        flag(
            "Emotional well-being showing decline",
            "Consider additional support and counseling resources",
        );
    }

    for challenge in &profile.academic_challenges {
        let challenge = challenge.to_lowercase();
        if challenge.contains("focus") || challenge.contains("concentration") {
            insights
                .recommendations
                .push("Try the Pomodoro Technique (25-min focused sessions)");
        }
        if challenge.contains("time") || challenge.contains("management") {
            insights
                .recommendations
                .push("Use a planner and prioritize tasks by deadline and importance");
        }
    }

    insights
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingHomework {
    pub subject: String,
    pub title: String,
    pub due_date: DateTime<Utc>,
    pub priority: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingTest {
    pub subject: String,
    pub title: String,
    pub test_date: DateTime<Utc>,
    pub importance: String,
}

/// What the mentor should know about the student's last few days.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionContext {
    /// Newest first.
    pub recent_check_ins: Vec<DailyCheckIn>,
    pub current_mood: Option<String>,
    pub current_goals: Vec<String>,
    pub recent_challenges: Vec<String>,
    pub pending_homework: Vec<PendingHomework>,
    pub upcoming_tests: Vec<UpcomingTest>,
    /// Descriptions of logged activities, newest first.
    pub recent_activities: Vec<String>,
}

fn communication_style(age: u32) -> &'static str {
    match age {
        0..=9 => {
            "Use simple, encouraging language. Be playful and use analogies from games and stories. \
             Keep sentences short."
        }
        10..=12 => {
            "Use friendly, supportive language. Balance fun with learning. Relate concepts to their \
             everyday experiences."
        }
        13..=15 => {
            "Use mature but relatable language. Acknowledge their growing independence. Provide deeper \
             explanations when needed."
        }
        16..=17 => {
            "Use sophisticated language. Treat them as a young adult. Discuss complex topics and future \
             planning seriously."
        }
        _ => {
            "Use adult language. Focus on practical strategies and long-term planning. Respect their \
             maturity and decision-making."
        }
    }
}

/// Whole days until `due`, rounded up.
fn days_until(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (due - now).num_milliseconds() as f64;
    (millis / 86_400_000.0).ceil() as i64
}

fn context_summary(context: &SessionContext, now: DateTime<Utc>) -> String {
    let mut out = String::from("\n**RECENT CONTEXT:**\n");

    if let Some(mood) = &context.current_mood {
        let _ = writeln!(out, "- Current Mood: {}", mood);
    }
    if let Some(latest) = context.recent_check_ins.first() {
        let _ = writeln!(
            out,
            "- Latest Check-in: Mood was {}, stress level {}/10, studied {} hours",
            latest.mood, latest.stress_level, latest.study_hours
        );
    }
    if !context.recent_challenges.is_empty() {
        let _ = writeln!(out, "- Recent Challenges: {}", context.recent_challenges.join(", "));
    }
    if !context.current_goals.is_empty() {
        let _ = writeln!(out, "- Active Goals: {}", context.current_goals.join(", "));
    }

    if !context.pending_homework.is_empty() {
        let _ = writeln!(
            out,
            "\n**PENDING HOMEWORK ({} tasks):**",
            context.pending_homework.len()
        );
        for hw in &context.pending_homework {
            let days = days_until(hw.due_date, now);
            let urgency = match days {
                ..=1 => "🔴 URGENT",
                2..=3 => "🟡",
                _ => "🟢",
            };
            let _ = writeln!(
                out,
                "  {} {}: {} (Due in {} days, Priority: {})",
                urgency, hw.subject, hw.title, days, hw.priority
            );
        }
    }

    if !context.upcoming_tests.is_empty() {
        let _ = writeln!(
            out,
            "\n**UPCOMING TESTS ({} exams):**",
            context.upcoming_tests.len()
        );
        for test in &context.upcoming_tests {
            let days = days_until(test.test_date, now);
            let urgency = match days {
                ..=3 => "🔴 SOON",
                4..=7 => "🟡",
                _ => "🟢",
            };
            let _ = writeln!(
                out,
                "  {} {}: {} (In {} days, Type: {})",
                urgency, test.subject, test.title, days, test.importance
            );
        }
    }

    if !context.recent_activities.is_empty() {
        let highlights: Vec<&str> = context
            .recent_activities
            .iter()
            .take(3)
            .map(String::as_str)
            .collect();
        let _ = writeln!(out, "\n**Recent Activity:** {}", highlights.join("; "));
    }

    let workload = context.pending_homework.len() + context.upcoming_tests.len();
    if workload > 0 {
        let _ = writeln!(
            out,
            "\n**MENTORING FOCUS:** Student has {} upcoming academic responsibilities. Provide specific \
             support for time management, study strategies, and stress management as needed.",
            workload
        );
    }

    out
}

/// System prompt that tunes the mentor model to this student.
pub fn generate_mentor_system_instruction(
    profile: &StudentProfile,
    context: Option<&SessionContext>,
) -> String {
    mentor_instruction_at(profile, context, Utc::now())
}

fn mentor_instruction_at(
    profile: &StudentProfile,
    context: Option<&SessionContext>,
    now: DateTime<Utc>,
) -> String {
    let tone = communication_style(profile.age);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "You are an advanced AI personal mentor for {}, a {}-year-old student in {}.\n",
        profile.name, profile.age, profile.grade
    );
    out.push_str(
        "**YOUR ROLE:**\nYou are their mentor, teacher, and supportive friend, helping them grow \
         academically, physically, mentally, and emotionally. You adapt your communication to their \
         maturity level and needs.\n\n",
    );

    let _ = writeln!(out, "**STUDENT PROFILE:**");
    let _ = writeln!(out, "- Name: {}", profile.name);
    let _ = writeln!(out, "- Age: {} years old ({})", profile.age, tone);
    let _ = writeln!(out, "- Grade: {}", profile.grade);
    let _ = writeln!(
        out,
        "- Learning Style: {}\n",
        profile.learning_style.as_deref().unwrap_or("mixed")
    );

    let _ = writeln!(out, "**ACADEMIC BACKGROUND:**");
    let _ = writeln!(out, "- Subjects: {}", profile.subjects.join(", "));
    let _ = writeln!(out, "- Goals: {}", profile.academic_goals);
    let _ = writeln!(out, "- Challenges: {}\n", profile.academic_challenges.join(", "));

    let _ = writeln!(out, "**CAREER ASPIRATIONS:**");
    let _ = writeln!(out, "- Dream: {}", profile.dream_job);
    let _ = writeln!(out, "- Aspirations: {}", profile.career_aspirations);
    if let Some(role_models) = &profile.role_models {
        let _ = writeln!(out, "- Role Models: {}", role_models);
    }

    let _ = writeln!(out, "\n**INTERESTS & HOBBIES:**");
    let _ = writeln!(out, "- Interests: {}", profile.interests.join(", "));
    let _ = writeln!(out, "- Hobbies: {}", profile.hobbies.join(", "));

    let _ = writeln!(out, "\n**SPORTS & PHYSICAL:**");
    if profile.sports_activities.is_empty() {
        let _ = writeln!(out, "- No regular sports activities");
    } else {
        let _ = writeln!(out, "- Activities: {}", profile.sports_activities.join(", "));
    }
    if let Some(fitness) = &profile.fitness_goals {
        let _ = writeln!(out, "- Fitness Goals: {}", fitness);
    }

    let _ = writeln!(out, "\n**PERSONAL CHALLENGES:**");
    let _ = writeln!(out, "- Personal: {}", profile.personal_challenges.join(", "));
    if let Some(concerns) = &profile.mental_health_concerns {
        let _ = writeln!(
            out,
            "- Mental Health: {} (approach with extra sensitivity)",
            concerns
        );
    }

    if let Some(context) = context {
        out.push_str(&context_summary(context, now));
    }

    let _ = write!(
        out,
        "\n**COMMUNICATION GUIDELINES:**\n{tone}\n\n\
         1. **Personalization**: Always remember their goals, interests, and challenges. Reference them naturally.\n\
         2. **Encouragement**: Celebrate progress and provide constructive feedback.\n\
         3. **Holistic Support**: Address academics, sports, mental health, and personal growth.\n\
         4. **Age-Appropriate**: Adapt complexity and examples to their age and maturity.\n\
         5. **Action-Oriented**: Provide specific, actionable advice and strategies.\n\
         6. **Empathy**: Show understanding, especially for their stated challenges.\n\
         7. **Career Guidance**: Connect current activities to their dream of becoming {dream}.\n\
         8. **Growth Mindset**: Encourage continuous improvement and learning from failures.\n\n\
         **IMPORTANT BOUNDARIES:**\n\
         - You complement but don't replace teachers, parents, or mental health professionals\n\
         - For serious mental health concerns, gently suggest speaking with a trusted adult\n\
         - Provide academic support but encourage independent thinking\n\
         - Be supportive but maintain appropriate mentor-student boundaries\n\n\
         **RESPONSE STYLE:**\n\
         - Use their name occasionally to personalize\n\
         - Keep responses conversational and engaging\n\
         - Use emojis sparingly and appropriately for their age\n\
         - Break down complex topics into digestible parts\n\
         - Ask follow-up questions to understand their needs better\n\
         - Provide examples relevant to their interests\n\n\
         Remember: Your goal is to help {name} grow in every aspect of their life, supporting their \
         journey to becoming {dream} while maintaining balance and well-being.",
        tone = tone,
        dream = profile.dream_job,
        name = profile.name,
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn check_in(mood: Mood) -> DailyCheckIn {
        DailyCheckIn {
            mood,
            stress_level: 4,
            sleep_hours: 8.0,
            energy_level: 7,
            study_hours: 2.0,
            subjects_studied: Vec::new(),
            homework_completed: true,
            classes_attended: 6,
            physical_activity_minutes: 20,
            academic_challenges_faced: None,
        }
    }

    fn student() -> StudentProfile {
        StudentProfile {
            id: "test-123".into(),
            name: "John Doe".into(),
            age: 16,
            grade: "10".into(),
            dream_job: "Software Engineer".into(),
            subjects: vec!["Math".into(), "Science".into()],
            interests: vec!["Coding".into(), "Gaming".into()],
            hobbies: vec!["Reading".into()],
            sports_activities: vec!["Basketball".into()],
            academic_challenges: vec!["Time management".into()],
            ..Default::default()
        }
    }

    #[test]
    fn no_check_ins_means_unknown_mood() {
        let analysis = analyze_mood_patterns(&[]);
        assert_eq!(analysis.average_mood, None);
        assert_eq!(analysis.average_stress, 0.0);
        assert_eq!(analysis.trend, MoodTrend::Stable);
        assert!(analysis.concerns.is_empty());
    }

    #[test]
    fn mood_trend_compares_newest_with_older() {
        use Mood::*;
        let improving: Vec<_> = [Excellent, Good, Excellent, Stressed, Okay, Stressed]
            .into_iter()
            .map(check_in)
            .collect();
        assert_eq!(analyze_mood_patterns(&improving).trend, MoodTrend::Improving);

        let declining: Vec<_> = [Stressed, Okay, Good, Excellent]
            .into_iter()
            .map(check_in)
            .collect();
        assert_eq!(analyze_mood_patterns(&declining).trend, MoodTrend::Declining);

        // nothing older to compare against yet
        let three: Vec<_> = [Excellent, Struggling, Struggling]
            .into_iter()
            .map(check_in)
            .collect();
        assert_eq!(analyze_mood_patterns(&three).trend, MoodTrend::Stable);
    }

    #[test]
    fn concerns_need_a_majority_of_days() {
        let mut days = vec![check_in(Mood::Struggling), check_in(Mood::Stressed), check_in(Mood::Okay)];
        for day in &mut days {
            day.stress_level = 8;
        }
        days[0].sleep_hours = 5.0;
        days[1].sleep_hours = 5.5;
        days[0].energy_level = 2;

        let analysis = analyze_mood_patterns(&days);
        assert_eq!(analysis.average_mood, Some(Mood::Stressed));
        assert_eq!(analysis.average_stress, 8.0);
        assert_eq!(
            analysis.concerns,
            vec![
                "High stress levels detected",
                "Consistently low mood",
                "Insufficient sleep pattern"
            ]
        );
    }

    #[test]
    fn average_stress_is_rounded_to_a_tenth() {
        let mut days = vec![check_in(Mood::Good), check_in(Mood::Good), check_in(Mood::Good)];
        days[0].stress_level = 3;
        days[1].stress_level = 4;
        days[2].stress_level = 4;
        assert_eq!(analyze_mood_patterns(&days).average_stress, 3.7);
    }

    #[test]
    fn academic_metrics() {
        let mut days = vec![check_in(Mood::Good), check_in(Mood::Okay), check_in(Mood::Good)];
        days[0].study_hours = 1.25;
        days[1].study_hours = 0.5;
        days[2].study_hours = 3.0;
        days[1].homework_completed = false;
        days[0].classes_attended = 5;
        days[1].classes_attended = 3;
        days[2].classes_attended = 6;
        days[0].subjects_studied = vec!["Art".into(), "Math".into()];
        days[1].subjects_studied = vec!["Math".into(), "History".into()];
        days[2].subjects_studied = vec!["Biology".into(), "History".into(), "Math".into()];

        let metrics = calculate_academic_metrics(&days);
        assert_eq!(metrics.total_study_hours, 4.8);
        assert_eq!(metrics.average_study_hours, 1.6);
        assert_eq!(metrics.homework_completion_rate, 67);
        assert_eq!(metrics.attendance_rate, 78);
        assert_eq!(metrics.most_studied_subjects, vec!["Math", "History", "Art"]);
    }

    #[test]
    fn no_classes_logged_counts_as_full_attendance() {
        let mut day = check_in(Mood::Okay);
        day.classes_attended = 0;
        assert_eq!(calculate_academic_metrics(&[day]).attendance_rate, 100);
        assert_eq!(calculate_academic_metrics(&[]).attendance_rate, 0);
    }

    #[test]
    fn insights_for_a_steady_week() {
        let mut day = check_in(Mood::Good);
        day.study_hours = 3.0;
        day.physical_activity_minutes = 60;

        let insights = generate_insights(&student(), &[day]);
        assert_eq!(
            insights.strengths,
            vec![
                "Consistently completes homework assignments",
                "Excellent class attendance",
                "Demonstrates strong study habits",
                "Maintains regular physical activity",
            ]
        );
        assert!(insights.growth_areas.is_empty());
        assert_eq!(
            insights.recommendations,
            vec!["Use a planner and prioritize tasks by deadline and importance"]
        );
    }

    #[test]
    fn insights_pair_growth_areas_with_recommendations() {
        let mut profile = student();
        profile.academic_challenges = vec!["Trouble with concentration".into()];
        let days: Vec<_> = (0..4)
            .map(|_| {
                let mut day = check_in(Mood::Stressed);
                day.stress_level = 9;
                day.sleep_hours = 6.0;
                day.study_hours = 0.5;
                day.homework_completed = false;
                day
            })
            .collect();

        let insights = generate_insights(&profile, &days);
        assert_eq!(
            insights.growth_areas,
            vec![
                "Homework completion needs improvement",
                "Managing high stress levels",
                "Study time could be increased",
                "Sleep patterns need attention",
            ]
        );
        assert_eq!(insights.recommendations.len(), 5);
        assert_eq!(
            insights.recommendations.last(),
            Some(&"Try the Pomodoro Technique (25-min focused sessions)")
        );
    }

    #[test]
    fn tone_follows_age() {
        assert!(communication_style(8).contains("playful"));
        assert!(communication_style(12).contains("friendly"));
        assert!(communication_style(15).contains("growing independence"));
        assert!(communication_style(17).contains("young adult"));
        assert!(communication_style(19).contains("adult language"));
    }

    #[test]
    fn instruction_describes_the_student() {
        let instruction = generate_mentor_system_instruction(&student(), None);
        assert!(instruction.starts_with(
            "You are an advanced AI personal mentor for John Doe, a 16-year-old student in 10."
        ));
        assert!(instruction.contains("Software Engineer"));
        assert!(instruction.contains("- Interests: Coding, Gaming"));
        assert!(instruction.contains("- Activities: Basketball"));
        assert!(instruction.contains("- Learning Style: mixed"));
        assert!(!instruction.contains("RECENT CONTEXT"));
        assert!(!instruction.contains("Role Models"));
    }

    #[test]
    fn context_flags_urgent_work() {
        let now = Utc.with_ymd_and_hms(2024, 5, 6, 9, 0, 0).unwrap();
        let context = SessionContext {
            recent_check_ins: vec![check_in(Mood::Stressed)],
            current_mood: Some("stressed".into()),
            pending_homework: vec![
                PendingHomework {
                    subject: "Math".into(),
                    title: "Fractions worksheet".into(),
                    due_date: now + Duration::hours(20),
                    priority: "high".into(),
                },
                PendingHomework {
                    subject: "History".into(),
                    title: "Essay".into(),
                    due_date: now + Duration::days(10),
                    priority: "low".into(),
                },
            ],
            upcoming_tests: vec![UpcomingTest {
                subject: "Biology".into(),
                title: "Cells quiz".into(),
                test_date: now + Duration::days(5),
                importance: "quiz".into(),
            }],
            recent_activities: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            ..Default::default()
        };

        let summary = context_summary(&context, now);
        assert!(summary.contains("- Current Mood: stressed"));
        assert!(summary.contains("Mood was stressed, stress level 4/10, studied 2 hours"));
        assert!(summary.contains("**PENDING HOMEWORK (2 tasks):**"));
        assert!(summary.contains("🔴 URGENT Math: Fractions worksheet (Due in 1 days, Priority: high)"));
        assert!(summary.contains("🟢 History: Essay (Due in 10 days, Priority: low)"));
        assert!(summary.contains("🟡 Biology: Cells quiz (In 5 days, Type: quiz)"));
        assert!(summary.contains("**Recent Activity:** a; b; c\n"));
        assert!(summary.contains("Student has 3 upcoming academic responsibilities"));

        let instruction = mentor_instruction_at(&student(), Some(&context), now);
        assert!(instruction.contains("**RECENT CONTEXT:**"));
    }
}
