//! Shared test data

use icpwiz_types::{DecisionInfluence, IcpAnswers, Persona, Segment, Workspace};

/// Answers that pass every wizard step
pub(crate) fn complete_answers() -> IcpAnswers {
    let mut answers = IcpAnswers::default();
    answers.company.company_name = "Acme".to_string();
    answers.company.domain = "acme.com".to_string();
    answers.product.name = "Acme Analytics".to_string();
    answers.product.value_proposition = "Ship insights faster".to_string();
    answers.product.features = vec!["Dashboards".to_string()];
    answers.target_account_segments = vec![Segment {
        name: "Enterprise SaaS".to_string(),
        industry: "Software".to_string(),
        company_size: "1000+".to_string(),
        geography: "North America".to_string(),
        personas: vec![Persona {
            title: "VP Engineering".to_string(),
            seniority: "VP".to_string(),
            decision_influence: Some(DecisionInfluence::DecisionMaker),
            pain_points: vec!["Slow reporting".to_string()],
            channels: vec!["LinkedIn".to_string(), "Email".to_string()],
            ..Default::default()
        }],
        ..Default::default()
    }];
    answers
}

pub(crate) fn workspace(id: &str, slug: &str, owner: &str) -> Workspace {
    Workspace {
        id: id.to_string(),
        slug: slug.to_string(),
        name: slug.to_string(),
        creator_id: Some(owner.to_string()),
        owner_id: None,
        collaborators: vec![],
        product: None,
        personas: vec![],
        segments: vec![],
        created_at: None,
        updated_at: None,
    }
}
