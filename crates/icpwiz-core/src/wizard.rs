//! Multi-step wizard state and the final submission flow
//!
//! [`WizardSession`] is the state container behind the form: current step,
//! aggregate answers, the errors of the last failed transition. Moving forward
//! is gated by [`validate_step`]; submission re-validates everything and jumps
//! back to the first incomplete step.

use crate::api::{slugify, ApiClient, WorkspacePayload};
use crate::error::{CoreError, Result};
use crate::storage::{LocalStore, ScopedKey, StorageService};
use crate::validation::{validate_all, validate_step, StepFailure, WizardStep};
use icpwiz_types::{Competitor, IcpAnswers, Persona, Segment, Workspace};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct WizardSession {
    step: WizardStep,
    /// Furthest step reached so far; `go_to` cannot skip past it
    furthest: WizardStep,
    answers: IcpAnswers,
    errors: Vec<String>,
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardSession {
    /// Fresh wizard on the first step
    pub fn new() -> Self {
        Self {
            step: WizardStep::Company,
            furthest: WizardStep::Company,
            answers: IcpAnswers::default(),
            errors: Vec::new(),
        }
    }

    /// Edit existing answers; every step is reachable
    pub fn with_answers(answers: IcpAnswers) -> Self {
        Self {
            furthest: WizardStep::Review,
            answers,
            ..Self::new()
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn answers(&self) -> &IcpAnswers {
        &self.answers
    }

    pub fn answers_mut(&mut self) -> &mut IcpAnswers {
        &mut self.answers
    }

    pub fn into_answers(self) -> IcpAnswers {
        self.answers
    }

    /// Errors from the last blocked transition
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Validate the current step and advance when it passes
    pub fn next(&mut self) -> bool {
        let result = validate_step(self.step, &self.answers);
        if !result.is_valid {
            debug!(step = %self.step, errors = result.errors.len(), "Step blocked");
            self.errors = result.errors;
            return false;
        }

        self.errors.clear();
        match self.step.next() {
            Some(next) => {
                self.step = next;
                self.furthest = self.furthest.max(next);
                true
            }
            None => false,
        }
    }

    pub fn back(&mut self) -> bool {
        match self.step.previous() {
            Some(previous) => {
                self.step = previous;
                self.errors.clear();
                true
            }
            None => false,
        }
    }

    /// Jump to a step already reached
    pub fn go_to(&mut self, step: WizardStep) -> bool {
        if step > self.furthest {
            return false;
        }
        self.step = step;
        self.errors.clear();
        true
    }

    /// Validate every step; on failure jump to the first invalid one
    pub fn validate_all(&mut self) -> std::result::Result<(), StepFailure> {
        match validate_all(&self.answers) {
            Ok(()) => {
                self.errors.clear();
                Ok(())
            }
            Err(failure) => {
                self.step = failure.step;
                self.errors = failure.errors.clone();
                Err(failure)
            }
        }
    }

    // ===================
    // Collection helpers
    // ===================

    pub fn add_segment(&mut self, segment: Segment) -> usize {
        self.answers.target_account_segments.push(segment);
        self.answers.target_account_segments.len() - 1
    }

    pub fn remove_segment(&mut self, index: usize) -> Option<Segment> {
        let segments = &mut self.answers.target_account_segments;
        (index < segments.len()).then(|| segments.remove(index))
    }

    /// Append a persona to a segment; `None` when the segment does not exist
    pub fn add_persona(&mut self, segment: usize, persona: Persona) -> Option<usize> {
        let segment = self.answers.target_account_segments.get_mut(segment)?;
        segment.personas.push(persona);
        Some(segment.personas.len() - 1)
    }

    pub fn remove_persona(&mut self, segment: usize, index: usize) -> Option<Persona> {
        let personas = &mut self
            .answers
            .target_account_segments
            .get_mut(segment)?
            .personas;
        (index < personas.len()).then(|| personas.remove(index))
    }

    pub fn add_feature(&mut self, feature: impl Into<String>) {
        self.answers.product.features.push(feature.into());
    }

    pub fn remove_feature(&mut self, index: usize) -> Option<String> {
        let features = &mut self.answers.product.features;
        (index < features.len()).then(|| features.remove(index))
    }

    pub fn add_competitor(&mut self, competitor: Competitor) {
        self.answers.product.competitors.push(competitor);
    }

    pub fn remove_competitor(&mut self, index: usize) -> Option<Competitor> {
        let competitors = &mut self.answers.product.competitors;
        (index < competitors.len()).then(|| competitors.remove(index))
    }
}

/// Where a completed wizard goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitTarget {
    /// `POST /api/workspaces`
    NewWorkspace { name: String },
    /// `PUT /api/workspaces/:slug`
    Existing { slug: String },
}

impl SubmitTarget {
    /// Slug the wizard draft for this target is kept under
    pub fn draft_slug(&self) -> String {
        match self {
            SubmitTarget::NewWorkspace { name } => slugify(name),
            SubmitTarget::Existing { slug } => slug.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Nothing was sent; the failing step and its errors
    Invalid(StepFailure),
    /// Stored remotely and cached locally; show the listing next
    Submitted(Workspace),
}

/// Clears the in-flight flag when the submission ends, however it ends
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Sends completed answers to the backend, then caches the result
pub struct WizardSubmitter<'a, S: LocalStore> {
    api: &'a ApiClient,
    storage: &'a StorageService<S>,
    in_flight: AtomicBool,
}

impl<'a, S: LocalStore> WizardSubmitter<'a, S> {
    pub fn new(api: &'a ApiClient, storage: &'a StorageService<S>) -> Self {
        Self {
            api,
            storage,
            in_flight: AtomicBool::new(false),
        }
    }

    /// True while a submission is waiting on the backend
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Validate, then create or update the workspace
    ///
    /// Answers that fail validation are kept as a draft under the target's
    /// slug. A second call while one is in flight fails with
    /// [`CoreError::SubmissionInProgress`].
    pub async fn submit(&self, answers: &IcpAnswers, target: &SubmitTarget) -> Result<SubmitOutcome> {
        if let Err(failure) = validate_all(answers) {
            self.keep_draft(answers, target)?;
            return Ok(SubmitOutcome::Invalid(failure));
        }

        if self.in_flight.swap(true, Ordering::AcqRel) {
            return Err(CoreError::SubmissionInProgress);
        }
        let _guard = InFlight(&self.in_flight);

        let result = match target {
            SubmitTarget::NewWorkspace { name } => {
                self.api
                    .create_workspace(&WorkspacePayload::create(name, answers))
                    .await
            }
            SubmitTarget::Existing { slug } => {
                self.api
                    .update_workspace(slug, &WorkspacePayload::update(answers))
                    .await
            }
        };
        let workspace = result.into_result()?;

        self.storage.save_workspace(&workspace)?;
        self.storage.save_icp_data(&workspace.id, answers)?;
        self.storage
            .remove_scoped(ScopedKey::WizardDraft, &target.draft_slug())?;
        self.storage
            .remove_scoped(ScopedKey::WizardDraft, &workspace.slug)?;

        info!(slug = %workspace.slug, segments = answers.target_account_segments.len(), "Wizard submitted");
        Ok(SubmitOutcome::Submitted(workspace))
    }

    /// Submit a session, moving it to the first invalid step on failure
    pub async fn submit_session(
        &self,
        session: &mut WizardSession,
        target: &SubmitTarget,
    ) -> Result<SubmitOutcome> {
        if let Err(failure) = session.validate_all() {
            self.keep_draft(session.answers(), target)?;
            return Ok(SubmitOutcome::Invalid(failure));
        }
        self.submit(session.answers(), target).await
    }

    /// Saved draft for a slug, if an earlier submission failed validation
    pub fn draft(&self, slug: &str) -> Result<Option<IcpAnswers>> {
        self.storage.get_scoped(ScopedKey::WizardDraft, slug)
    }

    fn keep_draft(&self, answers: &IcpAnswers, target: &SubmitTarget) -> Result<()> {
        let slug = target.draft_slug();
        if slug.is_empty() {
            return Ok(());
        }
        self.storage.save_scoped(ScopedKey::WizardDraft, &slug, answers)?;
        debug!(slug = %slug, "Wizard draft kept");
        Ok(())
    }
}
