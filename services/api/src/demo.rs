use crate::infra::{InMemoryIntakeRepository, LoggingReferralPublisher};
use batho_pele::error::AppError;
use batho_pele::workflows::intake::{
    classify, validate_document, CostTier, DocumentType, IntakeService, IntakeSubmission,
    Nationality, VerificationSource, VerificationTable,
};
use batho_pele::workflows::treatment::{format_rand, TreatmentCatalog, TreatmentRequest};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Invoice date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Verification table CSV to use instead of the built-in sample extract.
    #[arg(long)]
    pub(crate) verification_table: Option<PathBuf>,
    /// Print the rendered invoice text for the first patient.
    #[arg(long)]
    pub(crate) show_invoice: bool,
}

#[derive(Args, Debug)]
pub(crate) struct VerifyArgs {
    /// Nationality as captured on the intake form, e.g. "South African" or "Zimbabwean"
    #[arg(long, value_parser = parse_nationality)]
    pub(crate) nationality: Nationality,
    /// Document type, e.g. "RSA ID", "Passport", "Asylum Permit" or "No Document"
    #[arg(long = "doc-type", value_parser = parse_document_type)]
    pub(crate) doc_type: DocumentType,
    /// Document number as printed on the document
    #[arg(long = "doc-number", default_value = "")]
    pub(crate) doc_number: String,
    /// Verification table CSV to use instead of the built-in sample extract.
    #[arg(long)]
    pub(crate) verification_table: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct QuoteArgs {
    /// Catalogued condition, e.g. "Hypertension"
    pub(crate) condition: String,
    /// Cost tier: "SA Residents", "Legal Immigrants" or "Illegal Immigrants"
    #[arg(long, default_value = "SA Residents", value_parser = parse_cost_tier)]
    pub(crate) tier: CostTier,
}

pub(crate) fn run_verify(args: VerifyArgs) -> Result<(), AppError> {
    let VerifyArgs {
        nationality,
        doc_type,
        doc_number,
        verification_table,
    } = args;

    let source = load_verification_source(verification_table)?;
    let outcome = validate_document(&doc_type, doc_number.trim(), nationality, source.as_ref());
    let classification = classify(nationality, &doc_type, outcome.implied_legal_status());

    println!("Document check: {} / {}", nationality, doc_type);
    println!("- Validation: {}", outcome.summary());
    println!("- Legal status: {}", classification.legal_status);
    if let Some(flag) = classification.consistency {
        println!("- Consistency: {}", flag.describe());
    }
    println!("- Eligibility: {}", classification.eligibility.label());
    println!("- Cost tier: {}", classification.cost_tier);
    Ok(())
}

pub(crate) fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let catalog = TreatmentCatalog::standard();
    let quote = catalog.quote(&args.condition, args.tier)?;

    println!("{} ({})", quote.condition, quote.cost_tier);
    println!("Plan: {}", quote.plan);
    println!("Medications:");
    for medication in &quote.medications {
        println!("  - {}", medication.describe());
    }
    println!("Cost: {}", format_rand(quote.cost));
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        verification_table,
        show_invoice,
    } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    println!("Batho Pele intake demo (document numbers redacted)");
    let source = load_verification_source(verification_table)?;
    let repository = Arc::new(InMemoryIntakeRepository::default());
    let referrals = Arc::new(LoggingReferralPublisher::default());
    let service = IntakeService::new(repository, referrals.clone(), source);

    let mut registered = Vec::new();
    for submission in demo_submissions() {
        let name = submission.full_name.clone();
        match service.submit(submission) {
            Ok(record) => {
                let view = record.status_view();
                println!(
                    "- {} {} ({}, {}) -> {} | {} | {}",
                    view.patient_id,
                    view.full_name,
                    view.nationality,
                    view.doc_type,
                    view.legal_status,
                    view.eligibility,
                    view.cost_tier
                );
                println!("  Validation: {}", view.validation);
                if let Some(flag) = record.assessment.consistency {
                    println!("  Consistency: {}", flag.describe());
                }
                registered.push(record);
            }
            Err(err) => println!("- {}: submission rejected: {}", name, err),
        }
    }

    match service.metrics() {
        Ok(metrics) => {
            println!("\nDashboard");
            println!(
                "- {} patients | {} eligible | {} manual review | {} referrals",
                metrics.total_patients,
                metrics.eligible,
                metrics.manual_review,
                metrics.needs_referral
            );
            println!(
                "- {} South African | {} foreign nationals",
                metrics.south_african, metrics.foreign_nationals
            );
        }
        Err(err) => println!("\nDashboard unavailable: {}", err),
    }

    let events = referrals.events();
    if events.is_empty() {
        println!("\nHome Affairs referrals: none raised");
    } else {
        println!("\nHome Affairs referrals");
        for referral in events {
            println!(
                "  - {} {} ({})",
                referral.patient_id, referral.full_name, referral.doc_type
            );
        }
    }

    let Some(first) = registered.first() else {
        return Ok(());
    };
    let request = TreatmentRequest {
        diagnosis: "Hypertension".to_string(),
        plan: None,
        cost: None,
        medication: None,
        notes: Some("Recheck blood pressure in four weeks".to_string()),
    };
    if let Err(err) = service.record_treatment(&first.patient_id, request) {
        println!("\nTreatment not recorded: {}", err);
        return Ok(());
    }

    match service.invoice(&first.patient_id, Some(today)) {
        Ok(invoice) => {
            println!(
                "\nInvoice {} for {}: {}",
                invoice.file_name(),
                invoice.patient_name,
                invoice.total_display
            );
            if show_invoice {
                println!("{}", invoice.render());
            }
        }
        Err(err) => println!("\nInvoice unavailable: {}", err),
    }

    Ok(())
}

fn load_verification_source(
    path: Option<PathBuf>,
) -> Result<Arc<dyn VerificationSource>, AppError> {
    let table = match path {
        Some(path) => VerificationTable::from_path(path)?,
        None => VerificationTable::sample(),
    };
    Ok(Arc::new(table))
}

fn demo_submissions() -> Vec<IntakeSubmission> {
    let submission = |name: &str, nationality, doc_type, number: &str| IntakeSubmission {
        full_name: name.to_string(),
        nationality,
        doc_type,
        doc_number: number.to_string(),
        date_of_birth: None,
        estimated_age: None,
        medical_aid: None,
        conditions: None,
    };

    vec![
        submission(
            "Sipho Dlamini",
            Nationality::SouthAfrican,
            DocumentType::RsaId,
            "9001011234087",
        ),
        submission(
            "Tendai Moyo",
            Nationality::Zimbabwean,
            DocumentType::Passport,
            "ZW2023AB001",
        ),
        submission(
            "Ahmed Abdi",
            Nationality::AsylumSeeker,
            DocumentType::AsylumPermit,
            "REF12345678",
        ),
        submission(
            "Naledi Khumalo",
            Nationality::SouthAfrican,
            DocumentType::Passport,
            "ZA2023AB001",
        ),
        IntakeSubmission {
            estimated_age: Some(34),
            ..submission("Unnamed Patient", Nationality::Other, DocumentType::NoDocument, "")
        },
    ]
}

fn parse_nationality(raw: &str) -> Result<Nationality, String> {
    Ok(Nationality::from_label(raw))
}

fn parse_document_type(raw: &str) -> Result<DocumentType, String> {
    Ok(DocumentType::from_label(raw))
}

fn parse_cost_tier(raw: &str) -> Result<CostTier, String> {
    CostTier::from_label(raw)
        .ok_or_else(|| format!("unknown cost tier '{raw}'"))
}
