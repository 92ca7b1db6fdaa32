//! Terminal rendering for icpwiz commands
//!
//! Tables for listings, key/value blocks for single records, and the red
//! "✗" line used to report failed backend calls.

use comfy_table::{Cell, Color, ContentArrangement, Row, Table};
use icpwiz_core::{AccessBasis, AccessRights, CoreError, ValidationResult, WizardStep, WorkspaceSummary};
use icpwiz_types::{Collaborator, Persona, Product, Segment, Workspace};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug)]
pub enum CliError {
    /// The backend answered with a failure envelope
    Backend {
        action: String,
        message: String,
        status: Option<u16>,
    },
    PermissionDenied {
        action: &'static str,
        slug: String,
    },
    Core(CoreError),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Backend {
                action,
                message,
                status: Some(code),
            } => write!(f, "{} failed ({}): {}", action, code, message),
            CliError::Backend {
                action, message, ..
            } => write!(f, "{} failed: {}", action, message),
            CliError::PermissionDenied { action, slug } => {
                write!(f, "You do not have permission to {} in '{}'", action, slug)
            }
            CliError::Core(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {}

impl From<CoreError> for CliError {
    fn from(e: CoreError) -> Self {
        CliError::Core(e)
    }
}

impl CliError {
    pub fn suggestion(&self) -> Option<String> {
        match self {
            CliError::Backend {
                status: Some(401), ..
            } => Some("Session expired or invalid; run 'icpwiz login' again".to_string()),
            CliError::Backend { status: None, .. } => {
                Some("Check the backend URL with 'icpwiz config show'".to_string())
            }
            CliError::PermissionDenied { slug, .. } => {
                Some(format!("Check your role with 'icpwiz access {}'", slug))
            }
            CliError::Core(e) => e.suggestion(),
            _ => None,
        }
    }
}

/// Turn a failed envelope into an error named after the attempted action
pub fn backend_error<T>(action: impl Into<String>, result: icpwiz_core::ApiResult<T>) -> CliError {
    CliError::Backend {
        action: action.into(),
        message: result
            .error
            .unwrap_or_else(|| "Unknown error".to_string()),
        status: result.status,
    }
}

// ============================================================================
// Status Lines
// ============================================================================

pub fn success_line(message: &str, no_color: bool) -> String {
    if no_color {
        format!("✓ {}", message)
    } else {
        format!("\x1b[32m✓\x1b[0m {}", message)
    }
}

pub fn failure_line(message: &str, no_color: bool) -> String {
    if no_color {
        format!("✗ {}", message)
    } else {
        format!("\x1b[31m✗\x1b[0m {}", message)
    }
}

/// Print an error and its hint to stderr
pub fn report_error(error: &anyhow::Error, no_color: bool) {
    eprintln!("{}", failure_line(&format!("{:#}", error), no_color));

    let hint = error
        .downcast_ref::<CliError>()
        .and_then(CliError::suggestion)
        .or_else(|| error.downcast_ref::<CoreError>().and_then(CoreError::suggestion));
    if let Some(hint) = hint {
        eprintln!("  {}", hint);
    }
}

pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message.to_string());
    spinner
}

// ============================================================================
// Formatters
// ============================================================================

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

fn new_table(headers: &[&str], no_color: bool) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if no_color {
        table.set_header(headers.to_vec());
    } else {
        table.set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }
    table
}

pub fn format_workspace_table(workspaces: &[Workspace], json: bool, no_color: bool) -> String {
    if json {
        return to_json(workspaces);
    }
    if workspaces.is_empty() {
        return "No workspaces yet. Run 'icpwiz wizard submit' to create one.".to_string();
    }

    let mut table = new_table(
        &["Slug", "Name", "Segments", "Personas", "Updated"],
        no_color,
    );
    for ws in workspaces {
        let updated = ws
            .updated_at
            .or(ws.created_at)
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(Row::from(vec![
            ws.slug.clone(),
            truncate(&ws.name, 30),
            ws.segments.len().to_string(),
            ws.all_personas().count().to_string(),
            updated,
        ]));
    }
    table.to_string()
}

pub fn format_workspace_info(workspace: &Workspace, rights: &AccessRights, json: bool) -> String {
    if json {
        return to_json(workspace);
    }

    let mut lines = vec![
        format!("Workspace:      {}", workspace.name),
        format!("Slug:           {}", workspace.slug),
        format!("ID:             {}", workspace.id),
        format!("Owner:          {}", workspace.owner().unwrap_or("-")),
        format!(
            "Product:        {}",
            workspace
                .product
                .as_ref()
                .map(|p| p.name.as_str())
                .filter(|n| !n.is_empty())
                .unwrap_or("-")
        ),
        format!("Segments:       {}", workspace.segments.len()),
        format!("Personas:       {}", workspace.all_personas().count()),
        format!("Collaborators:  {}", workspace.collaborators.len()),
        format!("Your access:    {}", describe_rights(rights)),
    ];

    for segment in &workspace.segments {
        lines.push(format!(
            "  - {} ({} personas)",
            segment.display_name(),
            segment.personas.len()
        ));
    }
    lines.join("\n")
}

pub fn format_segment_table(segments: &[Segment], json: bool, no_color: bool) -> String {
    if json {
        return to_json(segments);
    }
    if segments.is_empty() {
        return "No segments found.".to_string();
    }

    let mut table = new_table(
        &["ID", "Name", "Industry", "Size", "Geography", "Personas"],
        no_color,
    );
    for segment in segments {
        table.add_row(Row::from(vec![
            segment.id.clone().unwrap_or_else(|| "-".to_string()),
            truncate(segment.display_name(), 30),
            dash_if_blank(&segment.industry),
            dash_if_blank(&segment.company_size),
            dash_if_blank(&segment.geography),
            segment.personas.len().to_string(),
        ]));
    }
    table.to_string()
}

pub fn format_persona_table(personas: &[Persona], json: bool, no_color: bool) -> String {
    if json {
        return to_json(personas);
    }
    if personas.is_empty() {
        return "No personas found.".to_string();
    }

    let mut table = new_table(
        &["ID", "Title", "Seniority", "Influence", "Channels"],
        no_color,
    );
    for persona in personas {
        table.add_row(Row::from(vec![
            persona.id.clone().unwrap_or_else(|| "-".to_string()),
            truncate(&persona.title, 30),
            dash_if_blank(&persona.seniority),
            persona
                .decision_influence
                .map(|d| d.label().to_string())
                .unwrap_or_else(|| "-".to_string()),
            truncate(&persona.channels.join(", "), 40),
        ]));
    }
    table.to_string()
}

pub fn format_product_table(products: &[Product], json: bool, no_color: bool) -> String {
    if json {
        return to_json(products);
    }
    if products.is_empty() {
        return "No products found.".to_string();
    }

    let mut table = new_table(
        &["ID", "Name", "Value Proposition", "Features", "Competitors"],
        no_color,
    );
    for product in products {
        table.add_row(Row::from(vec![
            product.id.clone().unwrap_or_else(|| "-".to_string()),
            truncate(&product.name, 30),
            truncate(&product.value_proposition, 50),
            product.filled_features().count().to_string(),
            product.competitors.len().to_string(),
        ]));
    }
    table.to_string()
}

pub fn format_collaborator_table(
    collaborators: &[Collaborator],
    json: bool,
    no_color: bool,
) -> String {
    if json {
        return to_json(collaborators);
    }
    if collaborators.is_empty() {
        return "No collaborators yet.".to_string();
    }

    let mut table = new_table(&["Email", "Role", "Added"], no_color);
    for collaborator in collaborators {
        table.add_row(Row::from(vec![
            collaborator.email.clone(),
            collaborator.role.to_string(),
            collaborator.added_at.format("%Y-%m-%d").to_string(),
        ]));
    }
    table.to_string()
}

pub fn format_access(basis: AccessBasis, rights: &AccessRights, json: bool) -> String {
    if json {
        return to_json(&serde_json::json!({ "basis": basis, "rights": rights }));
    }

    let basis = match basis {
        AccessBasis::Anonymous => "not logged in".to_string(),
        AccessBasis::Owner => "owner".to_string(),
        AccessBasis::Role(role) => format!("collaborator ({})", role),
        AccessBasis::Listed => "listed collaborator".to_string(),
        AccessBasis::Outsider => "no access".to_string(),
    };
    [
        format!("Access:      {}", basis),
        format!("View:        {}", yes_no(rights.can_view)),
        format!("Edit:        {}", yes_no(rights.can_edit)),
        format!("Invite:      {}", yes_no(rights.can_invite)),
        format!("Delete:      {}", yes_no(rights.can_delete)),
    ]
    .join("\n")
}

pub fn format_summary(summary: &WorkspaceSummary, json: bool) -> String {
    if json {
        return to_json(summary);
    }

    let mut lines = vec![
        format!("{} ({})", summary.name, summary.slug),
        "=".repeat(summary.name.chars().count() + summary.slug.len() + 3),
        format!("Segments:       {}", summary.segment_count),
        format!("Personas:       {}", summary.persona_count),
        format!("Collaborators:  {}", summary.collaborator_count),
        format!("Product:        {}", yes_no(summary.has_product)),
    ];

    if !summary.industries.is_empty() {
        lines.push(format!("Industries:     {}", summary.industries.join(", ")));
    }
    if !summary.top_channels.is_empty() {
        lines.push("Top channels:".to_string());
        for (channel, count) in summary.top_channels.iter().take(5) {
            lines.push(format!("  {}: {}", channel, count));
        }
    }
    if let Some(completion) = &summary.completion {
        lines.push(format!(
            "Wizard:         {}/{} steps ({}%)",
            completion.completed_steps,
            completion.total_steps,
            completion.percent()
        ));
        for step in &completion.incomplete {
            lines.push(format!("  incomplete: {}", step));
        }
    }
    lines.join("\n")
}

/// One block per validated step
pub fn format_validation(results: &[(WizardStep, ValidationResult)], no_color: bool) -> String {
    let mut lines = Vec::new();
    for (step, result) in results {
        if result.is_valid {
            lines.push(success_line(&step.to_string(), no_color));
        } else {
            lines.push(failure_line(&step.to_string(), no_color));
            for error in &result.errors {
                lines.push(format!("    {}", error));
            }
        }
    }
    lines.join("\n")
}

// ============================================================================
// Utilities
// ============================================================================

fn describe_rights(rights: &AccessRights) -> String {
    let granted: Vec<&str> = [
        (rights.can_view, "view"),
        (rights.can_edit, "edit"),
        (rights.can_invite, "invite"),
        (rights.can_delete, "delete"),
    ]
    .into_iter()
    .filter_map(|(granted, name)| granted.then_some(name))
    .collect();

    if granted.is_empty() {
        "none".to_string()
    } else {
        granted.join(", ")
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn dash_if_blank(value: &str) -> String {
    if value.trim().is_empty() {
        "-".to_string()
    } else {
        truncate(value.trim(), 25)
    }
}

fn truncate(s: &str, max: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max {
        s.to_string()
    } else {
        s.chars().take(max - 1).collect::<String>() + "…"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use icpwiz_core::WizardCompletion;
    use icpwiz_types::{CollaboratorRole, DecisionInfluence};

    fn workspace(slug: &str) -> Workspace {
        serde_json::from_value(serde_json::json!({
            "_id": "w1",
            "slug": slug,
            "name": "Acme Corp",
            "creatorId": "u1",
            "segments": [{ "_id": "s1", "name": "Enterprise SaaS", "industry": "Software" }]
        }))
        .unwrap()
    }

    #[test]
    fn test_truncate_unicode() {
        assert_eq!(truncate("hello world", 20), "hello world");
        assert_eq!(truncate("hello world", 5), "hell…");
        assert_eq!(truncate("café crème", 4), "caf…");
    }

    #[test]
    fn test_workspace_table_empty_and_json() {
        assert!(format_workspace_table(&[], false, true).contains("No workspaces yet"));

        let output = format_workspace_table(&[workspace("acme")], true, true);
        assert!(output.starts_with('['));
        assert!(output.contains("\"_id\": \"w1\""));
    }

    #[test]
    fn test_workspace_table_rows() {
        let output = format_workspace_table(&[workspace("acme")], false, true);
        assert!(output.contains("acme"));
        assert!(output.contains("Acme Corp"));
    }

    #[test]
    fn test_workspace_info_lists_segments_and_rights() {
        let output = format_workspace_info(&workspace("acme"), &AccessRights::OWNER, false);
        assert!(output.contains("Owner:          u1"));
        assert!(output.contains("  - Enterprise SaaS (0 personas)"));
        assert!(output.contains("view, edit, invite, delete"));

        let none = format_workspace_info(&workspace("acme"), &AccessRights::NONE, false);
        assert!(none.contains("Your access:    none"));
    }

    #[test]
    fn test_persona_table_shows_influence_label() {
        let persona = Persona {
            title: "VP Engineering".to_string(),
            decision_influence: Some(DecisionInfluence::DecisionMaker),
            channels: vec!["LinkedIn".to_string()],
            ..Default::default()
        };
        let output = format_persona_table(&[persona], false, true);
        assert!(output.contains("VP Engineering"));
        assert!(output.contains(DecisionInfluence::DecisionMaker.label()));
    }

    #[test]
    fn test_collaborator_table() {
        let output = format_collaborator_table(
            &[Collaborator::new("pat@acme.io", CollaboratorRole::Editor)],
            false,
            true,
        );
        assert!(output.contains("pat@acme.io"));
        assert!(output.contains("editor"));
        assert!(format_collaborator_table(&[], false, true).contains("No collaborators"));
    }

    #[test]
    fn test_access_block() {
        let output = format_access(
            AccessBasis::Role(CollaboratorRole::Viewer),
            &AccessRights::for_role(CollaboratorRole::Viewer),
            false,
        );
        assert!(output.contains("collaborator (viewer)"));
        assert!(output.contains("View:        yes"));
        assert!(output.contains("Edit:        no"));

        let json = format_access(AccessBasis::Owner, &AccessRights::OWNER, true);
        assert!(json.contains("\"canDelete\": true"));
    }

    #[test]
    fn test_summary_block() {
        let summary = WorkspaceSummary {
            name: "Acme".to_string(),
            slug: "acme".to_string(),
            segment_count: 2,
            persona_count: 3,
            collaborator_count: 1,
            has_product: true,
            industries: vec!["Fintech".to_string()],
            top_channels: vec![("Email".to_string(), 2)],
            completion: Some(WizardCompletion {
                completed_steps: 3,
                total_steps: 4,
                incomplete: vec!["Buyer Personas".to_string()],
            }),
        };

        let output = format_summary(&summary, false);
        assert!(output.starts_with("Acme (acme)"));
        assert!(output.contains("  Email: 2"));
        assert!(output.contains("3/4 steps (75%)"));
        assert!(output.contains("incomplete: Buyer Personas"));
    }

    #[test]
    fn test_validation_lines() {
        let results = vec![
            (WizardStep::Company, ValidationResult { is_valid: true, errors: vec![] }),
            (
                WizardStep::Product,
                ValidationResult {
                    is_valid: false,
                    errors: vec!["Product Name is required".to_string()],
                },
            ),
        ];
        let output = format_validation(&results, true);
        assert!(output.contains("✓ Step 1 (Company)"));
        assert!(output.contains("✗ Step 2 (Product)"));
        assert!(output.contains("    Product Name is required"));
    }

    #[test]
    fn test_backend_error_message() {
        let failure = icpwiz_core::ApiResult::<()>::failure("Forbidden", Some(403));
        let err = backend_error("Delete workspace", failure);
        assert_eq!(err.to_string(), "Delete workspace failed (403): Forbidden");

        let offline = backend_error(
            "List workspaces",
            icpwiz_core::ApiResult::<()>::failure("Network error: refused", None),
        );
        assert!(offline.suggestion().unwrap().contains("config show"));
    }
}
