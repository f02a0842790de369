use crate::infra::{InMemoryAnnotationStore, InMemoryEssayRepository, LoggingDeliveryPublisher};
use chrono::Utc;
use clap::{Args, ValueEnum};
use essay_flow::error::AppError;
use essay_flow::workflows::grading::{
    AnnotationSet, Annulment, Essay, EssayGradingService, EssayId, EssayStatus, EssaySubmission,
    GradingPayload, Highlight, HighlightCategory, RubricSystem, ScoringConfig, ScoringEngine,
};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum RubricChoice {
    Enem,
    Pas,
}

impl From<RubricChoice> for RubricSystem {
    fn from(value: RubricChoice) -> Self {
        match value {
            RubricChoice::Enem => RubricSystem::Enem,
            RubricChoice::Pas => RubricSystem::Pas,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Rubric system to grade the demo essay against
    #[arg(long, value_enum, default_value = "enem")]
    pub(crate) system: RubricChoice,
    /// Student name shown in the demo output
    #[arg(long, default_value = "Ana Souza")]
    pub(crate) student: String,
    /// Essay theme used for the delivery subject line
    #[arg(long, default_value = "Urban mobility")]
    pub(crate) theme: String,
    /// Annul the demo essay instead of grading it normally
    #[arg(long)]
    pub(crate) annul: bool,
}

#[derive(Args, Debug)]
pub(crate) struct EnemScoreArgs {
    #[arg(long)]
    pub(crate) c1: u16,
    #[arg(long)]
    pub(crate) c2: u16,
    #[arg(long)]
    pub(crate) c3: u16,
    #[arg(long)]
    pub(crate) c4: u16,
    #[arg(long)]
    pub(crate) c5: u16,
}

#[derive(Args, Debug)]
pub(crate) struct PasScoreArgs {
    /// Content score (NC)
    #[arg(long)]
    pub(crate) nc: f64,
    /// Error count (NE); omit to count zero errors
    #[arg(long)]
    pub(crate) ne: Option<f64>,
    /// Line count (NL)
    #[arg(long)]
    pub(crate) nl: f64,
}

pub(crate) fn run_score_enem(args: EnemScoreArgs) -> Result<(), AppError> {
    let payload = GradingPayload::Enem {
        c1: args.c1,
        c2: args.c2,
        c3: args.c3,
        c4: args.c4,
        c5: args.c5,
        annulment: None,
    };
    preview(RubricSystem::Enem, payload)
}

pub(crate) fn run_score_pas(args: PasScoreArgs) -> Result<(), AppError> {
    let payload = GradingPayload::Pas {
        nc: args.nc,
        ne: args.ne,
        nl: args.nl,
        annulment: None,
    };
    preview(RubricSystem::Pas, payload)
}

/// Score a rubric payload against a throwaway essay and print the result.
fn preview(system: RubricSystem, payload: GradingPayload) -> Result<(), AppError> {
    let engine = ScoringEngine::new(ScoringConfig::default());
    let mut essay = scratch_essay(system);

    engine.apply_scoring(&mut essay, &payload, None)?;
    engine.compute_bimester_score(&mut essay);

    println!("{} score preview", system.label());
    println!("- {}", essay.grade_summary());
    Ok(())
}

fn scratch_essay(system: RubricSystem) -> Essay {
    let now = Utc::now();
    Essay {
        essay_id: EssayId("essay-preview".to_string()),
        student_name: "Preview".to_string(),
        student_email: "preview@example.com".to_string(),
        theme: "Preview".to_string(),
        system,
        status: EssayStatus::Grading,
        bimester: 1,
        count_in_bimester: true,
        annulment: Annulment::default(),
        score: None,
        bimester_score: None,
        general_comments: None,
        created_at: now,
        updated_at: now,
        email_last_sent_at: None,
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        system,
        student,
        theme,
        annul,
    } = args;
    let system = RubricSystem::from(system);

    println!("Essay grading demo ({})", system.label());

    let repository = Arc::new(InMemoryEssayRepository::default());
    let annotations = Arc::new(InMemoryAnnotationStore::default());
    let delivery = Arc::new(LoggingDeliveryPublisher::default());
    let service = Arc::new(EssayGradingService::new(
        repository,
        annotations.clone(),
        delivery.clone(),
        ScoringConfig::default(),
    ));

    let essay = service.submit(EssaySubmission {
        student_name: student.clone(),
        student_email: demo_email(&student),
        theme,
        system,
        bimester: 1,
        count_in_bimester: true,
    })?;
    println!(
        "- Uploaded essay {} for {} -> status {}",
        essay.essay_id.0,
        essay.student_name,
        essay.status.label()
    );

    let essay = service.begin_correction(
        &essay.essay_id,
        Some("Solid structure, revise the conclusion.".to_string()),
    )?;
    println!("- Correction started -> status {}", essay.status.label());

    if system == RubricSystem::Pas {
        // Marked grammar slips feed the PAS error auto-count.
        annotations.put(AnnotationSet {
            essay_id: essay.essay_id.clone(),
            highlights: vec![
                Highlight {
                    page: 1,
                    category: HighlightCategory::Grammar,
                    comment: "verb agreement".to_string(),
                },
                Highlight {
                    page: 2,
                    category: HighlightCategory::Argumentation,
                    comment: "needs a source".to_string(),
                },
            ],
        });
    }

    let annulment = annul.then(|| Annulment {
        active: true,
        reasons: vec!["copied from the support text".to_string()],
    });
    let payload = match system {
        RubricSystem::Enem => GradingPayload::Enem {
            c1: 200,
            c2: 160,
            c3: 160,
            c4: 120,
            c5: 160,
            annulment,
        },
        RubricSystem::Pas => GradingPayload::Pas {
            nc: 9.5,
            ne: None,
            nl: 28.0,
            annulment,
        },
    };
    let essay = service.grade(&essay.essay_id, payload)?;
    println!(
        "- Graded -> status {} | {}",
        essay.status.label(),
        essay.grade_summary()
    );

    let essay = service.send(&essay.essay_id)?;
    println!("- Sent -> status {}", essay.status.label());

    match serde_json::to_string_pretty(&essay.status_view()) {
        Ok(json) => println!("  Public status payload:\n{}", json),
        Err(err) => println!("  Public status payload unavailable: {}", err),
    }

    for event in delivery.deliveries() {
        println!(
            "  Delivery dispatched to {} | subject \"{}\"",
            event.recipient, event.subject
        );
    }

    Ok(())
}

fn demo_email(student: &str) -> String {
    let local: String = student
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() {
                Some(c.to_ascii_lowercase())
            } else if c.is_whitespace() {
                Some('.')
            } else {
                None
            }
        })
        .collect();
    format!("{local}@example.com")
}
