//! EDH instances.
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// A turn of the dialog history.
///
/// Datasets store turns either as objects or as `[speaker, text]` pairs.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DialogTurn {
    /// `{"speaker": ..., "text": ...}`.
    Object {
        /// Speaker of the turn, e.g. `Commander`.
        #[serde(default)]
        speaker: String,
        /// Utterance.
        text: String,
    },

    /// `[speaker, text]`.
    Pair(String, String),
}

impl DialogTurn {
    /// Speaker of the turn.
    pub fn speaker(&self) -> &str {
        match self {
            DialogTurn::Object { speaker, .. } => speaker,
            DialogTurn::Pair(speaker, _) => speaker,
        }
    }

    /// Utterance of the turn.
    pub fn text(&self) -> &str {
        match self {
            DialogTurn::Object { text, .. } => text,
            DialogTurn::Pair(_, text) => text,
        }
    }
}

#[derive(Deserialize)]
struct InstanceFields {
    #[serde(default)]
    instance_id: Option<String>,
    game_id: String,
    #[serde(default)]
    dialog_history: Vec<DialogTurn>,
}

/// An execution-from-dialog-history task.
#[derive(Clone, Debug)]
pub struct EdhInstance {
    /// Identifier of the instance, the file stem if the file has none.
    pub instance_id: String,

    /// Identifier of the game the instance is cut from.
    pub game_id: String,

    /// Dialog preceding the task.
    pub dialog_history: Vec<DialogTurn>,

    /// The whole JSON document, handed to the simulator.
    pub raw: Value,

    /// File the instance was read from.
    pub path: PathBuf,
}

impl EdhInstance {
    /// Reads an instance file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let raw: Value =
            serde_json::from_str(&text).with_context(|| format!("Failed to parse {:?}", path))?;
        let fields: InstanceFields = serde_json::from_value(raw.clone())
            .with_context(|| format!("Malformed EDH instance {:?}", path))?;
        let instance_id = match fields.instance_id {
            Some(id) => id,
            None => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "unknown".to_string()),
        };

        Ok(Self {
            instance_id,
            game_id: fields.game_id,
            dialog_history: fields.dialog_history,
            raw,
            path: path.to_path_buf(),
        })
    }

    /// The instruction: all utterances of the dialog joined by a space.
    pub fn instruction(&self) -> String {
        self.dialog_history
            .iter()
            .map(|t| t.text())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Lists the `*.json` files of `dir` sorted by file name.
///
/// A missing directory yields an empty list.
pub fn list_instance_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Ok(vec![]);
    }
    let mut files = vec![];
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().map_or(false, |e| e == "json") {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
