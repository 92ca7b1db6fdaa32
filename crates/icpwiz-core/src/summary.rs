//! Dashboard figures derived from a workspace and its wizard answers

use crate::validation::{validate_step, WizardStep};
use icpwiz_types::{IcpAnswers, Workspace};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardCompletion {
    pub completed_steps: usize,
    pub total_steps: usize,
    /// Data steps that still fail validation
    pub incomplete: Vec<String>,
}

impl WizardCompletion {
    pub fn percent(&self) -> u8 {
        if self.total_steps == 0 {
            return 0;
        }
        ((self.completed_steps * 100) / self.total_steps) as u8
    }

    pub fn for_answers(answers: &IcpAnswers) -> Self {
        let data_steps: Vec<_> = WizardStep::all()
            .into_iter()
            .filter(|s| s.is_data_step())
            .collect();
        let incomplete: Vec<String> = data_steps
            .iter()
            .filter(|step| !validate_step(**step, answers).is_valid)
            .map(|step| step.label().to_string())
            .collect();

        Self {
            completed_steps: data_steps.len() - incomplete.len(),
            total_steps: data_steps.len(),
            incomplete,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSummary {
    pub name: String,
    pub slug: String,
    pub segment_count: usize,
    pub persona_count: usize,
    pub collaborator_count: usize,
    pub has_product: bool,
    pub industries: Vec<String>,
    /// Outreach channels across all personas, most used first
    pub top_channels: Vec<(String, usize)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<WizardCompletion>,
}

impl WorkspaceSummary {
    pub fn build(workspace: &Workspace, answers: Option<&IcpAnswers>) -> Self {
        let industries: BTreeSet<String> = workspace
            .segments
            .iter()
            .map(|s| s.industry.trim())
            .filter(|i| !i.is_empty())
            .map(str::to_string)
            .collect();

        let mut channel_counts: HashMap<String, usize> = HashMap::new();
        for channel in workspace.all_personas().flat_map(|p| p.channels.iter()) {
            let channel = channel.trim();
            if !channel.is_empty() {
                *channel_counts.entry(channel.to_string()).or_insert(0) += 1;
            }
        }
        let mut top_channels: Vec<(String, usize)> = channel_counts.into_iter().collect();
        top_channels.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Self {
            name: workspace.name.clone(),
            slug: workspace.slug.clone(),
            segment_count: workspace.segments.len(),
            persona_count: workspace.all_personas().count(),
            collaborator_count: workspace.collaborators.len(),
            has_product: workspace.product.is_some(),
            industries: industries.into_iter().collect(),
            top_channels,
            completion: answers.map(WizardCompletion::for_answers),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{complete_answers, workspace};
    use icpwiz_types::{Persona, Segment};

    fn persona(channels: &[&str]) -> Persona {
        Persona {
            channels: channels.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_counts_and_channels() {
        let mut ws = workspace("w1", "acme", "u1");
        ws.personas = vec![persona(&["Email"])];
        ws.segments = vec![
            Segment {
                industry: "Fintech".to_string(),
                personas: vec![persona(&["LinkedIn", "Email"]), persona(&["Events"])],
                ..Default::default()
            },
            Segment {
                industry: " Fintech ".to_string(),
                personas: vec![persona(&["LinkedIn", " "])],
                ..Default::default()
            },
            Segment::named("No industry"),
        ];

        let summary = WorkspaceSummary::build(&ws, None);
        assert_eq!(summary.segment_count, 3);
        assert_eq!(summary.persona_count, 4);
        assert_eq!(summary.industries, vec!["Fintech"]);
        assert_eq!(
            summary.top_channels,
            vec![
                ("Email".to_string(), 2),
                ("LinkedIn".to_string(), 2),
                ("Events".to_string(), 1),
            ]
        );
        assert!(summary.completion.is_none());
    }

    #[test]
    fn test_completion() {
        let ws = workspace("w1", "acme", "u1");

        let full = WorkspaceSummary::build(&ws, Some(&complete_answers()));
        let completion = full.completion.unwrap();
        assert_eq!(completion.completed_steps, 4);
        assert_eq!(completion.percent(), 100);
        assert!(completion.incomplete.is_empty());

        let mut partial = complete_answers();
        partial.target_account_segments.clear();
        let completion = WizardCompletion::for_answers(&partial);
        assert_eq!(completion.completed_steps, 2);
        assert_eq!(completion.percent(), 50);
        assert_eq!(completion.incomplete, vec!["Target Segments", "Buyer Personas"]);
    }
}
