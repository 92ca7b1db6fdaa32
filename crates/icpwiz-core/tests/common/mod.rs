//! Shared helpers for integration tests

#![allow(dead_code)]

use icpwiz_core::auth::TOKEN_KEY;
use icpwiz_core::{ApiClient, ClientConfig, LocalStore, MemoryStore, SessionStore, StorageService};
use icpwiz_types::{DecisionInfluence, IcpAnswers, Persona, Segment};
use serde_json::{json, Value};
use std::sync::Arc;

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub api: ApiClient,
    pub storage: StorageService<Arc<MemoryStore>>,
}

/// Client pointed at `base_url`, with a stored token when `token` is set
pub fn harness(base_url: &str, token: Option<&str>) -> Harness {
    let store = Arc::new(MemoryStore::new());
    if let Some(token) = token {
        store.set_item(TOKEN_KEY, token).unwrap();
    }
    let sessions = SessionStore::new(store.clone());
    let config = ClientConfig::default().with_api_url(Some(base_url.to_string()));
    let api = ApiClient::new(&config, sessions).unwrap();
    Harness {
        storage: StorageService::new(store.clone()),
        store,
        api,
    }
}

pub fn answers() -> IcpAnswers {
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
            channels: vec!["LinkedIn".to_string()],
            ..Default::default()
        }],
        ..Default::default()
    }];
    answers
}

pub fn workspace_json(id: &str, slug: &str) -> Value {
    json!({
        "_id": id,
        "slug": slug,
        "name": "Acme Corp",
        "creatorId": "u1",
        "collaborators": ["pat@acme.io"],
        "segments": [{ "_id": "s1", "name": "Enterprise SaaS", "industry": "Software" }]
    })
}
