//! Vision-language planner.
use super::{ActionDecoder, MessageWindow, PromptBuilder, VlmPlannerConfig};
use crate::util::image_to_data_url;
use anyhow::{bail, Result};
use embench_core::{
    record::{Record, RecordValue},
    Action, ChatMessage, ContentPart, Feedback, LanguageModel, Observation, Plan, Policy, Role,
};
use log::{debug, warn};

/// Reply substituted when the model fails to respond.
const EMPTY_REPLY: &str = "{}";

/// States of [`VlmPlanner`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlannerState {
    /// No planning step in the current episode yet.
    Idle,

    /// The prompt was sent to the model.
    AwaitingModelResponse,

    /// The reply of the model was decoded into a plan.
    ActionDecoded,

    /// Feedback of an executed action was received.
    HistoryUpdated,
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Planner querying a vision-language model.
///
/// ```mermaid
/// stateDiagram-v2
///     [*] --> Idle
///     Idle --> AwaitingModelResponse: act
///     AwaitingModelResponse --> ActionDecoded: reply or fallback
///     ActionDecoded --> HistoryUpdated: update_info
///     HistoryUpdated --> HistoryUpdated: update_info
///     HistoryUpdated --> AwaitingModelResponse: act
///     ActionDecoded --> AwaitingModelResponse: act
///     ActionDecoded --> Idle: reset
///     HistoryUpdated --> Idle: reset
/// ```
///
/// Each call of [`Policy::act`] renders a prompt from the instruction and the
/// feedback received so far, sends it with the current frame (unless
/// `language_only`) and decodes the reply. The planner never fails because of
/// the model: a model error is treated as the reply `{}`, and a reply which
/// cannot be decoded yields a single uniformly random action, counted in
/// `output_json_error`.
pub struct VlmPlanner<M: LanguageModel> {
    config: VlmPlannerConfig,
    model: M,
    actions: Vec<String>,
    prompt: PromptBuilder,
    decoder: ActionDecoder,
    window: MessageWindow,
    feedback: Vec<Feedback>,
    planner_steps: usize,
    output_json_error: usize,
    state: PlannerState,
    rng: fastrand::Rng,
}

impl<M: LanguageModel> VlmPlanner<M> {
    /// Builds a planner over the action vocabulary `actions`.
    pub fn build(config: VlmPlannerConfig, model: M, actions: Vec<String>) -> Result<Self> {
        if actions.is_empty() {
            bail!("The action vocabulary is empty");
        }
        let prompt = PromptBuilder::new(
            config.system_prompt.clone(),
            actions.clone(),
            &config.examples,
            config.n_shot,
            config.language_only,
        );
        let decoder = ActionDecoder::new(
            config.json_key.clone(),
            config.action_key.clone(),
            actions.len(),
        );
        let window = MessageWindow::new(config.message_window_len);
        let rng = fastrand::Rng::with_seed(config.seed);

        Ok(Self {
            config,
            model,
            actions,
            prompt,
            decoder,
            window,
            feedback: vec![],
            planner_steps: 0,
            output_json_error: 0,
            state: PlannerState::Idle,
            rng,
        })
    }

    /// The current state.
    pub fn state(&self) -> PlannerState {
        self.state
    }

    /// The messages of the current episode, oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        self.window.messages()
    }

    /// The feedback received in the current episode.
    pub fn feedback(&self) -> &[Feedback] {
        &self.feedback
    }

    /// The number of planning steps in the current episode.
    pub fn planner_steps(&self) -> usize {
        self.planner_steps
    }

    /// The number of replies in the current episode that could not be decoded.
    pub fn output_json_error(&self) -> usize {
        self.output_json_error
    }

    /// The action vocabulary.
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    /// Returns a mutable reference to the model.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    fn user_message(&self, obs: &Observation, prompt: String) -> Result<ChatMessage> {
        if self.config.language_only {
            return Ok(ChatMessage::user_text(prompt));
        }
        match obs.frame(&self.config.obs_key) {
            Some(frame) => Ok(ChatMessage::new(
                Role::User,
                vec![
                    ContentPart::image_url(image_to_data_url(frame)?),
                    ContentPart::text(prompt),
                ],
            )),
            None => {
                warn!(
                    "Observation has no frame {:?}, sending text only",
                    self.config.obs_key
                );
                Ok(ChatMessage::user_text(prompt))
            }
        }
    }

    fn random_action(&mut self) -> usize {
        self.rng.usize(..self.actions.len())
    }
}

impl<M: LanguageModel> Policy for VlmPlanner<M> {
    fn reset(&mut self) {
        self.window.clear();
        self.feedback.clear();
        self.planner_steps = 0;
        self.output_json_error = 0;
        self.state = PlannerState::Idle;
    }

    fn act(&mut self, obs: &Observation, instruction: &str) -> Result<Plan> {
        let prompt = self.prompt.build(instruction, &self.feedback);
        let message = self.user_message(obs, prompt)?;
        if self.config.chat_history {
            self.window.push(message);
        } else {
            self.window.replace(message);
        }

        self.state = PlannerState::AwaitingModelResponse;
        let reply = {
            let result = if self.config.truncate {
                self.model.respond(&self.window.truncated())
            } else {
                self.model.respond(self.window.messages())
            };
            match result {
                Ok(reply) => reply,
                Err(e) => {
                    warn!("Model error: {:#}", e);
                    EMPTY_REPLY.to_string()
                }
            }
        };
        debug!("Model output:\n{}", reply);

        if self.config.chat_history {
            self.window.push(ChatMessage::assistant_text(reply.clone()));
        }

        let (ids, valid) = match self.decoder.decode(&reply) {
            Ok(ids) => (ids, true),
            Err(e) => {
                warn!("Failed to decode the model output ({}), taking a random action", e);
                self.output_json_error += 1;
                (vec![self.random_action()], false)
            }
        };
        self.planner_steps += 1;
        self.state = PlannerState::ActionDecoded;

        Ok(Plan {
            actions: ids.into_iter().map(Action::new).collect(),
            raw_output: reply,
            valid,
        })
    }

    fn update_info(&mut self, feedback: Feedback) {
        self.feedback.push(feedback);
        self.state = PlannerState::HistoryUpdated;
    }

    fn record(&self) -> Record {
        Record::from_slice(&[
            (
                "planner_steps",
                RecordValue::Scalar(self.planner_steps as f32),
            ),
            (
                "output_json_error",
                RecordValue::Scalar(self.output_json_error as f32),
            ),
        ])
    }
}
