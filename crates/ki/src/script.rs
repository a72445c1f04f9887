//! RON session scripts: modes, entity shortcuts, filters, remaps and the
//! key events to replay.

use std::{fs, path::Path, sync::Arc};

use ki_config::{
    DefaultConfig, EntityAction, FilterOptions, Handler, Metadata, RemapReport, RemapTable,
    Shortcut,
};
use ki_engine::{Engine, ModeSpec};
use ki_keycode::Chord;
use ki_mode::{Mode, WorkflowEvent};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::Error;

/// A custom mode entered from normal mode.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModeDef {
    /// Mode name.
    pub name: String,
    /// Entry chord in normal mode.
    pub key: Chord,
}

/// An entity shortcut.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityDef {
    /// Mode the shortcut lives in.
    #[serde(default = "entity_mode")]
    pub mode: String,
    /// Entity name.
    pub name: String,
    /// Path or url; defaults to the name.
    #[serde(default)]
    pub identifier: Option<String>,
    /// Chord selecting the entity.
    pub key: Chord,
    /// Metadata category.
    #[serde(default = "entities_category")]
    pub category: String,
    /// Return to desktop after the action.
    #[serde(default = "yes")]
    pub auto_exit: bool,
}

/// Default mode for entity shortcuts.
fn entity_mode() -> String {
    Mode::ENTITY.to_string()
}

/// Default metadata category for entity shortcuts.
fn entities_category() -> String {
    "Entities".to_string()
}

/// Serde default for flags that start enabled.
fn yes() -> bool {
    true
}

/// A replayable session.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Script {
    /// Custom modes, registered first.
    pub modes: Vec<ModeDef>,
    /// Entity shortcuts loaded with the default configuration.
    pub entities: Vec<EntityDef>,
    /// Include/exclude filter for the entity shortcuts.
    pub filter: FilterOptions,
    /// Remap applied after loading.
    pub remap: RemapTable,
    /// Key events to replay, in order.
    pub events: Vec<Chord>,
}

impl Script {
    /// Parse a script from RON text.
    pub fn parse(path: &Path, text: &str) -> Result<Self, Error> {
        ron::from_str(text).map_err(|e| Error::Script {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read and parse a script file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path)?;
        Self::parse(path, &text)
    }

    /// Register everything the script declares.
    pub fn install(&self, engine: &mut Engine, log: &ActionLog) -> Result<RemapReport, Error> {
        for m in &self.modes {
            engine.register_mode(ModeSpec::new(m.name.as_str(), m.key.clone()))?;
        }
        let mut defaults = DefaultConfig::new();
        for e in &self.entities {
            let entity = ScriptEntity {
                name: e.name.clone(),
                identifier: e.identifier.clone().unwrap_or_else(|| e.name.clone()),
                auto_exit: e.auto_exit,
                log: log.clone(),
            };
            let shortcut = Shortcut::new(
                e.key.clone(),
                Handler::entity(entity),
                Metadata::new(e.category.as_str(), e.name.as_str()),
            );
            defaults = defaults.with_shortcuts(e.mode.as_str(), vec![shortcut]);
        }
        engine.use_default_config(&defaults, &self.filter)?;
        Ok(engine.remap(&self.remap))
    }
}

/// One entity action performed during a replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRecord {
    /// Entity name.
    pub entity: String,
    /// Entity identifier.
    pub identifier: String,
    /// Mode the action ran in.
    pub mode: String,
    /// Pending action captured in normal mode.
    pub action: Option<String>,
    /// Workflow chords, oldest first.
    pub workflow: Vec<String>,
}

/// Shared sink for [`ActionRecord`]s.
pub type ActionLog = Arc<Mutex<Vec<ActionRecord>>>;

/// Entity that records its actions instead of touching the OS.
struct ScriptEntity {
    /// Display name.
    name: String,
    /// Path or url.
    identifier: String,
    /// Value returned from every dispatch.
    auto_exit: bool,
    /// Where actions are recorded.
    log: ActionLog,
}

impl EntityAction for ScriptEntity {
    fn name(&self) -> &str {
        &self.name
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn dispatch_action(
        &self,
        mode: &Mode,
        action: Option<&Chord>,
        workflow: &[WorkflowEvent],
    ) -> Option<bool> {
        info!(
            entity = %self.name,
            mode = %mode,
            action = ?action.map(Chord::to_string),
            steps = workflow.len(),
            "entity_action"
        );
        self.log.lock().push(ActionRecord {
            entity: self.name.clone(),
            identifier: self.identifier.clone(),
            mode: mode.to_string(),
            action: action.map(Chord::to_string),
            workflow: workflow.iter().map(|e| e.chord.to_string()).collect(),
        });
        Some(self.auto_exit)
    }
}
