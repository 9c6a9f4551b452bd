//! Two-stage step/version selection.
//!
//! A [`Session`] owns the candidate set of the current stage and the matching
//! suggestion list handed to the prompt. Submitting input either rejects it,
//! advances to the version stage, confirms the pair or exits.

use crate::model::Manifest;
use crate::prompt::Prompt;
use crate::suggest::Suggestion;
use anyhow::Result;
use thiserror::Error;

/// Input that ends the session at any stage.
pub const EXIT_SENTINEL: &str = "exit";

pub const PLACEHOLDER_DESCRIPTION: &str = "No description available";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub step: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorState {
    AwaitingStepName,
    AwaitingVersion { step: String },
    Confirmed(Selection),
    Exited,
}

/// Result of submitting one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Advanced,
    Rejected(String),
    Confirmed(Selection),
    Exited,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Confirmed(Selection),
    Exited,
}

#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("selection session already finished")]
    Finished,

    #[error("step '{0}' disappeared from the manifest")]
    UnknownStep(String),
}

pub struct Session<'m> {
    manifest: &'m Manifest,
    state: SelectorState,
    candidates: Vec<String>,
    suggestions: Vec<Suggestion>,
}

impl<'m> Session<'m> {
    pub fn new(manifest: &'m Manifest) -> Self {
        let mut session = Self {
            manifest,
            state: SelectorState::AwaitingStepName,
            candidates: Vec::new(),
            suggestions: Vec::new(),
        };
        session.set_candidates(manifest.step_names());
        session
    }

    pub fn state(&self) -> &SelectorState {
        &self.state
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.state,
            SelectorState::Confirmed(_) | SelectorState::Exited
        )
    }

    pub fn prompt_message(&self) -> String {
        match &self.state {
            SelectorState::AwaitingVersion { step } => {
                format!("Which version of the step ({}) failed?", step)
            }
            _ => "Please select the step that failed.".to_string(),
        }
    }

    pub fn submit(&mut self, input: &str) -> Result<Verdict, SelectorError> {
        if self.is_finished() {
            return Err(SelectorError::Finished);
        }

        if input == EXIT_SENTINEL {
            self.state = SelectorState::Exited;
            return Ok(Verdict::Exited);
        }

        if !self.candidates.iter().any(|c| c == input) {
            return Ok(Verdict::Rejected(input.to_string()));
        }

        let manifest = self.manifest;
        match self.state.clone() {
            SelectorState::AwaitingStepName => {
                let step = manifest
                    .step(input)
                    .ok_or_else(|| SelectorError::UnknownStep(input.to_string()))?;
                self.set_candidates(step.version_names());
                self.state = SelectorState::AwaitingVersion {
                    step: step.name.clone(),
                };
                Ok(Verdict::Advanced)
            }
            SelectorState::AwaitingVersion { step } => {
                let selection = Selection {
                    step,
                    version: input.to_string(),
                };
                self.candidates.clear();
                self.suggestions.clear();
                self.state = SelectorState::Confirmed(selection.clone());
                Ok(Verdict::Confirmed(selection))
            }
            SelectorState::Confirmed(_) | SelectorState::Exited => Err(SelectorError::Finished),
        }
    }

    // Replaces the whole candidate set so nothing from the previous stage survives.
    fn set_candidates(&mut self, candidates: Vec<String>) {
        self.suggestions = candidates
            .iter()
            .map(|c| Suggestion::new(c.as_str(), PLACEHOLDER_DESCRIPTION))
            .collect();
        self.candidates = candidates;
    }
}

/// Drive a session against `prompt` until the pair is confirmed or the user exits.
pub fn select<P: Prompt>(manifest: &Manifest, prompt: &mut P) -> Result<Outcome> {
    let mut session = Session::new(manifest);

    loop {
        let message = session.prompt_message();
        let input = prompt.read_line(&message, session.suggestions())?;

        match session.submit(&input)? {
            Verdict::Advanced => {
                tracing::debug!(step = %input, "step accepted");
            }
            Verdict::Rejected(input) => {
                tracing::warn!("Wrong selection. - {} - is not in the list", input);
                prompt.break_line()?;
            }
            Verdict::Confirmed(selection) => return Ok(Outcome::Confirmed(selection)),
            Verdict::Exited => return Ok(Outcome::Exited),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::suggest::filter_has_prefix;
    use std::collections::VecDeque;

    pub(crate) const MANIFEST: &str = r#"{
        "steps": {
            "git-clone": {"latest_version_number": "4.0.0", "versions": {"3.9.0": {}, "4.0.0": {}}},
            "script": {"latest_version_number": "1.2.0", "versions": {"1.1.0": {}, "1.2.0": {}}},
            "no-versions": {"latest_version_number": "", "versions": {}}
        }
    }"#;

    pub(crate) fn manifest() -> Manifest {
        Manifest::from_slice(MANIFEST.as_bytes()).unwrap()
    }

    /// Replays canned answers and records what each round was offered.
    #[derive(Default)]
    pub(crate) struct ScriptedPrompt {
        pub answers: VecDeque<String>,
        pub offered: Vec<(String, Vec<String>)>,
        pub breaks: usize,
    }

    impl ScriptedPrompt {
        pub(crate) fn new(answers: &[&str]) -> Self {
            Self {
                answers: answers.iter().map(|a| a.to_string()).collect(),
                ..Default::default()
            }
        }
    }

    impl Prompt for ScriptedPrompt {
        fn read_line(&mut self, message: &str, suggestions: &[Suggestion]) -> Result<String> {
            self.offered.push((
                message.to_string(),
                suggestions.iter().map(|s| s.text.clone()).collect(),
            ));
            self.answers
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("prompt ran out of answers"))
        }

        fn break_line(&mut self) -> Result<()> {
            self.breaks += 1;
            Ok(())
        }
    }

    #[test]
    fn rejected_step_keeps_stage_and_candidates() {
        let manifest = manifest();
        let mut session = Session::new(&manifest);
        let before = session.candidates().to_vec();

        for input in ["", "scr", "Script", "1.1.0", " script", "git-clone "] {
            assert_eq!(
                session.submit(input).unwrap(),
                Verdict::Rejected(input.to_string())
            );
            assert_eq!(session.state(), &SelectorState::AwaitingStepName);
            assert_eq!(session.candidates(), before.as_slice());
        }
    }

    #[test]
    fn exit_ends_either_stage() {
        let manifest = manifest();

        let mut session = Session::new(&manifest);
        assert_eq!(session.submit(EXIT_SENTINEL).unwrap(), Verdict::Exited);
        assert_eq!(session.state(), &SelectorState::Exited);

        let mut session = Session::new(&manifest);
        session.submit("script").unwrap();
        assert_eq!(session.submit(EXIT_SENTINEL).unwrap(), Verdict::Exited);
        assert_eq!(session.state(), &SelectorState::Exited);
    }

    #[test]
    fn exit_wins_over_membership() {
        let manifest = Manifest::from_slice(
            br#"{"steps": {"exit": {"versions": {"exit": {}}}}}"#,
        )
        .unwrap();
        let mut session = Session::new(&manifest);
        assert_eq!(session.submit("exit").unwrap(), Verdict::Exited);
    }

    #[test]
    fn choosing_a_step_swaps_candidates_to_its_versions() {
        let manifest = manifest();

        let mut session = Session::new(&manifest);
        assert_eq!(session.submit("script").unwrap(), Verdict::Advanced);
        assert_eq!(
            session.state(),
            &SelectorState::AwaitingVersion {
                step: "script".to_string()
            }
        );
        assert_eq!(session.candidates(), ["1.1.0", "1.2.0"]);
        let texts: Vec<_> = session.suggestions().iter().map(|s| &s.text).collect();
        assert_eq!(texts, ["1.1.0", "1.2.0"]);

        let mut session = Session::new(&manifest);
        assert_eq!(session.submit("git-clone").unwrap(), Verdict::Advanced);
        assert_eq!(session.candidates(), ["3.9.0", "4.0.0"]);

        // Step names are no longer valid input.
        assert_eq!(
            session.submit("script").unwrap(),
            Verdict::Rejected("script".to_string())
        );
        assert_eq!(
            session.submit("1.1.0").unwrap(),
            Verdict::Rejected("1.1.0".to_string())
        );
    }

    #[test]
    fn unknown_version_is_rejected_then_valid_one_confirms() {
        let manifest = manifest();
        let mut session = Session::new(&manifest);
        session.submit("script").unwrap();

        assert_eq!(
            session.submit("1.3.0").unwrap(),
            Verdict::Rejected("1.3.0".to_string())
        );
        assert_eq!(session.candidates(), ["1.1.0", "1.2.0"]);

        let expected = Selection {
            step: "script".to_string(),
            version: "1.1.0".to_string(),
        };
        assert_eq!(
            session.submit("1.1.0").unwrap(),
            Verdict::Confirmed(expected.clone())
        );
        assert_eq!(session.state(), &SelectorState::Confirmed(expected));
        assert!(matches!(session.submit("1.2.0"), Err(SelectorError::Finished)));
    }

    #[test]
    fn step_without_versions_never_confirms() {
        let manifest = manifest();
        let mut session = Session::new(&manifest);
        session.submit("no-versions").unwrap();
        assert!(session.candidates().is_empty());

        for input in ["", "1.0.0", "no-versions", "latest", "EXIT"] {
            assert!(matches!(session.submit(input).unwrap(), Verdict::Rejected(_)));
            assert!(!session.is_finished());
        }
        assert_eq!(session.submit(EXIT_SENTINEL).unwrap(), Verdict::Exited);
    }

    #[test]
    fn suggestion_filter_and_membership_disagree_on_case() {
        let manifest = manifest();
        let mut session = Session::new(&manifest);

        let shown = filter_has_prefix(session.suggestions(), "scr", true);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].text, "script");

        let shown = filter_has_prefix(session.suggestions(), "Script", true);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].text, "script");
        assert_eq!(
            session.submit("Script").unwrap(),
            Verdict::Rejected("Script".to_string())
        );
    }

    #[test]
    fn prompt_message_names_the_step() {
        let manifest = manifest();
        let mut session = Session::new(&manifest);
        assert_eq!(session.prompt_message(), "Please select the step that failed.");
        session.submit("git-clone").unwrap();
        assert_eq!(
            session.prompt_message(),
            "Which version of the step (git-clone) failed?"
        );
    }

    #[test]
    fn select_reprompts_until_confirmed() {
        let manifest = manifest();
        let mut prompt = ScriptedPrompt::new(&["Script", "script", "1.3.0", "1.1.0"]);

        let outcome = select(&manifest, &mut prompt).unwrap();

        assert_eq!(
            outcome,
            Outcome::Confirmed(Selection {
                step: "script".to_string(),
                version: "1.1.0".to_string(),
            })
        );
        assert_eq!(prompt.breaks, 2);
        let offered: Vec<_> = prompt.offered.iter().map(|(_, s)| s.clone()).collect();
        let steps = vec!["git-clone", "no-versions", "script"];
        let versions = vec!["1.1.0", "1.2.0"];
        assert_eq!(offered, vec![steps.clone(), steps, versions.clone(), versions]);
    }

    #[test]
    fn select_stops_on_exit() {
        let manifest = manifest();
        let mut prompt = ScriptedPrompt::new(&["git-clone", "exit", "4.0.0"]);

        assert_eq!(select(&manifest, &mut prompt).unwrap(), Outcome::Exited);
        assert_eq!(prompt.answers.len(), 1);
    }
}
