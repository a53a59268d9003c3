//! Named grammars and their installation into a highlighting engine.

use std::collections::HashMap;

use crate::grammar::Grammar;
use crate::scope::is_known_scope;
use crate::types::HighlightError;
use crate::HighlightEngine;

/// Why a grammar could not be registered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The id or one of the aliases is already taken.
    #[error("{name} is already registered (by {owner})")]
    Duplicate { name: String, owner: String },

    /// A mode or keyword class uses a scope the stylesheet doesn't know.
    #[error("{language} uses unknown scope `{scope}`")]
    UnknownScope { language: String, scope: String },

    /// The engine refused the grammar.
    #[error("engine rejected {language}: {source}")]
    Engine {
        language: String,
        #[source]
        source: HighlightError,
    },
}

/// Outcome of [`GrammarRegistry::install`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RegistrationReport {
    /// Ids registered, in order.
    pub registered: Vec<String>,
    /// Grammars that failed, with the reason.
    pub failed: Vec<(String, RegistryError)>,
}

impl RegistrationReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Grammars by id, with alias lookup.
///
/// A grammar is immutable once registered; the registry only hands out shared
/// references.
#[derive(Debug, Default)]
pub struct GrammarRegistry {
    grammars: Vec<Grammar>,
    /// Lower-cased id or alias -> index into `grammars`.
    names: HashMap<String, usize>,
}

impl GrammarRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check a grammar against the registry without registering it.
    pub fn check(&self, grammar: &Grammar) -> Result<(), RegistryError> {
        for name in grammar.names() {
            if let Some(&index) = self.names.get(&name.to_lowercase()) {
                return Err(RegistryError::Duplicate {
                    name: name.to_string(),
                    owner: self.grammars[index].id.clone(),
                });
            }
        }

        let mode_scopes = grammar.modes().into_iter().filter_map(|m| m.scope.as_deref());
        let keyword_scopes = grammar
            .keyword_tables()
            .into_iter()
            .flat_map(|k| k.classes.keys().map(String::as_str));
        if let Some(scope) = mode_scopes.chain(keyword_scopes).find(|s| !is_known_scope(s)) {
            return Err(RegistryError::UnknownScope {
                language: grammar.id.clone(),
                scope: scope.to_string(),
            });
        }

        Ok(())
    }

    /// Register a grammar locally, without touching any engine.
    pub fn register(&mut self, grammar: Grammar) -> Result<(), RegistryError> {
        self.check(&grammar)?;
        self.insert(grammar);
        Ok(())
    }

    /// Register grammars locally and with `engine`, one at a time.
    ///
    /// Each grammar is checked, then handed to the engine, and only recorded
    /// once the engine accepted it. A failure is logged and skipped; the
    /// remaining grammars are still installed.
    pub fn install<E, I>(&mut self, grammars: I, engine: &mut E) -> RegistrationReport
    where
        E: HighlightEngine,
        I: IntoIterator<Item = Grammar>,
    {
        let mut report = RegistrationReport::default();

        for grammar in grammars {
            let id = grammar.id.clone();
            let result = self.check(&grammar).and_then(|()| {
                engine
                    .register_language(&grammar)
                    .map_err(|source| RegistryError::Engine {
                        language: id.clone(),
                        source,
                    })
            });

            match result {
                Ok(()) => {
                    tracing::debug!(language = %id, "registered grammar");
                    self.insert(grammar);
                    report.registered.push(id);
                }
                Err(error) => {
                    tracing::warn!(language = %id, %error, "grammar registration failed");
                    report.failed.push((id, error));
                }
            }
        }

        report
    }

    /// Look up a grammar by id or alias (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&Grammar> {
        self.names
            .get(&name.to_lowercase())
            .map(|&index| &self.grammars[index])
    }

    /// Registered id for a name or alias.
    pub fn canonical_name(&self, name: &str) -> Option<&str> {
        self.get(name).map(|g| g.id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Grammar> {
        self.grammars.iter()
    }

    pub fn len(&self) -> usize {
        self.grammars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grammars.is_empty()
    }

    fn insert(&mut self, grammar: Grammar) {
        let index = self.grammars.len();
        for name in grammar.names() {
            self.names.insert(name.to_lowercase(), index);
        }
        self.grammars.push(grammar);
    }
}
