//! Per-step validation of wizard answers
//!
//! Pure functions: no I/O, re-run on every "next" and once more for every step
//! before submission. Errors come out in field-declaration order.

use icpwiz_types::models::is_blank;
use icpwiz_types::IcpAnswers;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Wizard steps in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WizardStep {
    Company,
    Product,
    Segments,
    Personas,
    Review,
}

impl WizardStep {
    const ORDER: [WizardStep; 5] = [
        WizardStep::Company,
        WizardStep::Product,
        WizardStep::Segments,
        WizardStep::Personas,
        WizardStep::Review,
    ];

    pub fn all() -> [WizardStep; 5] {
        Self::ORDER
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ORDER.get(index).copied()
    }

    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    pub fn label(self) -> &'static str {
        match self {
            WizardStep::Company => "Company",
            WizardStep::Product => "Product",
            WizardStep::Segments => "Target Segments",
            WizardStep::Personas => "Buyer Personas",
            WizardStep::Review => "Review",
        }
    }

    /// Steps that collect answers (everything except Review)
    pub fn is_data_step(self) -> bool {
        self != WizardStep::Review
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {} ({})", self.index() + 1, self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// The first step that failed during full validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub step: WizardStep,
    pub errors: Vec<String>,
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is incomplete: {}", self.step, self.errors.join("; "))
    }
}

fn require(errors: &mut Vec<String>, prefix: &str, label: &str, value: &str) {
    if is_blank(value) {
        errors.push(format!("{}{} is required", prefix, label));
    }
}

fn require_entries(errors: &mut Vec<String>, prefix: &str, label: &str, values: &[String]) {
    if values.iter().all(|v| is_blank(v)) {
        errors.push(format!("{}{} requires at least one entry", prefix, label));
    }
}

fn company_errors(answers: &IcpAnswers, errors: &mut Vec<String>) {
    let company = &answers.company;
    require(errors, "", "Company Name", &company.company_name);
    require(errors, "", "Company Domain", &company.domain);
}

fn product_errors(answers: &IcpAnswers, errors: &mut Vec<String>) {
    let product = &answers.product;
    require(errors, "", "Product Name", &product.name);
    require(errors, "", "Value Proposition", &product.value_proposition);
    require_entries(errors, "", "Key Features", &product.features);

    for (i, competitor) in product.competitors.iter().enumerate() {
        if !competitor.is_empty() {
            require(errors, &format!("Competitor {}: ", i + 1), "Domain", &competitor.domain);
        }
    }
}

fn segment_errors(answers: &IcpAnswers, errors: &mut Vec<String>) {
    let segments = &answers.target_account_segments;
    if segments.is_empty() {
        errors.push("At least one target segment is required".to_string());
        return;
    }

    for (i, segment) in segments.iter().enumerate() {
        let prefix = format!("Segment {}: ", i + 1);
        require(errors, &prefix, "Segment Name", &segment.name);
        require(errors, &prefix, "Industry", &segment.industry);
        require(errors, &prefix, "Company Size", &segment.company_size);
        require(errors, &prefix, "Geography", &segment.geography);
    }
}

fn persona_errors(answers: &IcpAnswers, errors: &mut Vec<String>) {
    let segments = &answers.target_account_segments;
    if segments.is_empty() {
        errors.push("Add a target segment before defining personas".to_string());
        return;
    }

    for (i, segment) in segments.iter().enumerate() {
        if segment.personas.is_empty() {
            errors.push(format!("Segment {}: At least one persona is required", i + 1));
            continue;
        }

        for (j, persona) in segment.personas.iter().enumerate() {
            let prefix = format!("Segment {}, Persona {}: ", i + 1, j + 1);
            require(errors, &prefix, "Job Title", &persona.title);
            require(errors, &prefix, "Seniority", &persona.seniority);
            if persona.decision_influence.is_none() {
                errors.push(format!("{}Decision Influence is required", prefix));
            }
            require_entries(errors, &prefix, "Pain Points", &persona.pain_points);
        }
    }
}

/// Validate one step's slice of the answers
pub fn validate_step(step: WizardStep, answers: &IcpAnswers) -> ValidationResult {
    let mut errors = Vec::new();
    match step {
        WizardStep::Company => company_errors(answers, &mut errors),
        WizardStep::Product => product_errors(answers, &mut errors),
        WizardStep::Segments => segment_errors(answers, &mut errors),
        WizardStep::Personas => persona_errors(answers, &mut errors),
        WizardStep::Review => {}
    }
    ValidationResult::from_errors(errors)
}

/// Validate every step in order; the first invalid one wins
pub fn validate_all(answers: &IcpAnswers) -> Result<(), StepFailure> {
    for step in WizardStep::all() {
        let result = validate_step(step, answers);
        if !result.is_valid {
            return Err(StepFailure {
                step,
                errors: result.errors,
            });
        }
    }
    Ok(())
}

/// Validate the collaborator invite form
pub fn validate_invite(email: &str) -> ValidationResult {
    let mut errors = Vec::new();
    if is_blank(email) {
        errors.push("Email is required".to_string());
    } else if !EMAIL.is_match(email.trim()) {
        errors.push("Email must be a valid address".to_string());
    }
    ValidationResult::from_errors(errors)
}
