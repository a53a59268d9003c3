//! The page-load sequence.
//!
//! [`boot`] runs the synchronous part of a page load, in order:
//!
//! 1. resolve and apply the theme,
//! 2. register the bundled grammars with the engine,
//! 3. highlight every code block on the page.
//!
//! The search index needs a fetch, so `boot` only describes it as a
//! [`SearchRequest`]; the host drives it on its own executor.

use grove_highlight::{
    BlockSource, DispatchConfig, DispatchStats, Dispatcher, Grammar, GrammarRegistry,
    HighlightEngine, RegistrationReport,
};
use grove_search::IndexConfig;
use grove_theme::{PreferenceStore, SystemScheme, Theme, ThemeResolver, ThemeSurface};

use crate::{GroveConfig, builtin_grammars};

/// Everything a page load needs from the platform.
#[derive(Debug)]
pub struct PageLoad<B, E, S, M, T> {
    /// Root the code blocks are found under.
    pub document: B,
    pub engine: E,
    pub store: S,
    pub scheme: M,
    pub surface: T,
    /// Source file of the current tree, when the page declares one.
    pub source_path: Option<String>,
}

/// The search index still to be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub manifest_url: String,
    pub source_path: Option<String>,
    pub config: IndexConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootReport {
    pub theme: Theme,
    pub registration: RegistrationReport,
    pub highlight: DispatchStats,
}

/// A grammar registry bound to its engine.
///
/// Kept after boot so content rendered later can be highlighted with the
/// same registrations.
#[derive(Debug)]
pub struct Highlighter<E> {
    registry: GrammarRegistry,
    engine: E,
    config: DispatchConfig,
}

impl<E: HighlightEngine> Highlighter<E> {
    pub fn new(engine: E, config: DispatchConfig) -> Self {
        Self {
            registry: GrammarRegistry::new(),
            engine,
            config,
        }
    }

    pub fn install<I>(&mut self, grammars: I) -> RegistrationReport
    where
        I: IntoIterator<Item = Grammar>,
    {
        self.registry.install(grammars, &mut self.engine)
    }

    pub fn highlight_all<B>(&mut self, root: &B) -> DispatchStats
    where
        B: BlockSource<Element = E::Element>,
    {
        Dispatcher::with_config(&self.registry, self.config.clone())
            .highlight_all(root, &mut self.engine)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

/// State that outlives the page load.
#[derive(Debug)]
pub struct Booted<E, S, M, T> {
    pub report: BootReport,
    pub theme: ThemeResolver<S, M, T>,
    pub highlighter: Highlighter<E>,
    /// `None` when search is disabled.
    pub search: Option<SearchRequest>,
}

/// Run the synchronous part of a page load.
pub fn boot<B, E, S, M, T>(page: PageLoad<B, E, S, M, T>, config: &GroveConfig) -> Booted<E, S, M, T>
where
    B: BlockSource,
    E: HighlightEngine<Element = B::Element>,
    S: PreferenceStore,
    M: SystemScheme,
    T: ThemeSurface,
{
    let PageLoad {
        document,
        engine,
        store,
        scheme,
        surface,
        source_path,
    } = page;

    let theme = ThemeResolver::load(store, scheme, surface, config.theme.clone());

    let mut highlighter = Highlighter::new(engine, config.highlight.clone());
    let registration = highlighter.install(builtin_grammars());
    let highlight = highlighter.highlight_all(&document);

    let search = config.search.then(|| SearchRequest {
        manifest_url: config.manifest_url(),
        source_path,
        config: config.index.clone(),
    });

    let report = BootReport {
        theme: theme.applied(),
        registration,
        highlight,
    };
    tracing::info!(
        theme = %report.theme,
        grammars = report.registration.registered.len(),
        highlighted = report.highlight.highlighted,
        failed = report.highlight.failed,
        "page booted"
    );

    Booted {
        report,
        theme,
        highlighter,
        search,
    }
}
