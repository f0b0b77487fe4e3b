//! Action vocabulary of TEACh agents.
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fs::File, io::BufReader, path::Path};

/// Name of the action ending an episode.
pub const STOP: &str = "Stop";

const AGENT_ACTIONS: [&str; 17] = [
    "Stop",
    "Forward",
    "Backward",
    "Turn Left",
    "Turn Right",
    "Look Up",
    "Look Down",
    "Pan Left",
    "Pan Right",
    "Pickup",
    "Place",
    "Open",
    "Close",
    "ToggleOn",
    "ToggleOff",
    "Slice",
    "Pour",
];

const OBJ_INTERACTION_ACTIONS: [&str; 8] = [
    "Pickup",
    "Place",
    "Open",
    "Close",
    "ToggleOn",
    "ToggleOff",
    "Slice",
    "Pour",
];

#[derive(Deserialize, Serialize)]
struct VocabularyFile {
    all_agent_actions: Vec<String>,
    obj_interaction_actions: Vec<String>,
}

/// The actions an agent can take, in index order.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionVocabulary {
    names: Vec<String>,
    interactions: HashSet<String>,
}

impl Default for ActionVocabulary {
    fn default() -> Self {
        Self {
            names: AGENT_ACTIONS.iter().map(|s| s.to_string()).collect(),
            interactions: OBJ_INTERACTION_ACTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ActionVocabulary {
    /// Loads the vocabulary from a JSON file of the form
    /// `{"all_agent_actions": [...], "obj_interaction_actions": [...]}`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        let v: VocabularyFile = serde_json::from_reader(BufReader::new(file))?;
        ensure!(
            !v.all_agent_actions.is_empty(),
            "No action in {:?}",
            path
        );
        Ok(Self {
            names: v.all_agent_actions,
            interactions: v.obj_interaction_actions.into_iter().collect(),
        })
    }

    /// Names of the actions.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Name of the action at `ix`.
    pub fn get(&self, ix: usize) -> Option<&str> {
        self.names.get(ix).map(|s| s.as_str())
    }

    /// Index of the action `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// `true` if `name` acts on an object at an interaction point.
    pub fn is_interaction(&self, name: &str) -> bool {
        self.interactions.contains(name)
    }

    /// The number of actions.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// `true` if there is no action.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
