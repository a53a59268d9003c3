//! Turning manifest entries into quick-open actions.

use serde::{Deserialize, Serialize};

use crate::manifest::ManifestEntry;

/// What selecting an item does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Action {
    /// Go to a page of the site.
    Navigate { route: String },
    /// Open an external URI (the editor).
    Open { uri: String },
}

/// One entry of the quick-open list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionItem {
    pub id: String,
    pub title: String,
    pub section: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotkey: Option<String>,
    /// HTML for the item icon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub action: Action,
}

/// The "edit current tree" command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EditorConfig {
    pub id: String,
    pub title: String,
    pub hotkey: String,
    pub icon: String,
    /// Paths under this root live in the dev container.
    pub workspace_root: String,
    /// Prefix for container paths; the part after `workspace_root` is appended.
    pub remote_prefix: String,
    /// Prefix for any other absolute path.
    pub file_prefix: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            id: "edit".into(),
            title: "Edit current tree in Visual Studio Code".into(),
            hotkey: "cmd+e".into(),
            icon: material_icon("edit"),
            workspace_root: "/workspaces/".into(),
            remote_prefix: "vscode://vscode-remote/dev-container/workspaces/".into(),
            file_prefix: "vscode://file".into(),
        }
    }
}

/// Index building settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct IndexConfig {
    /// Manifest location, relative to the site root.
    pub manifest_path: String,
    /// Entries tagged with this are listed first.
    pub pinned_tag: String,
    pub pinned_section: String,
    pub pinned_icon: String,
    pub all_section: String,
    pub commands_section: String,
    pub untitled: String,
    pub editor: EditorConfig,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            manifest_path: "forest.json".into(),
            pinned_tag: "top".into(),
            pinned_section: "Top Trees".into(),
            pinned_icon: material_icon("bookmark"),
            all_section: "All Trees".into(),
            commands_section: "Commands".into(),
            untitled: "Untitled".into(),
            editor: EditorConfig::default(),
        }
    }
}

fn material_icon(name: &str) -> String {
    format!(r#"<span class="material-symbols-outlined">{name}</span>"#)
}

/// Editor URI for a source file path.
///
/// Container paths map to the remote dev-container scheme, anything else to a
/// local file URI.
pub fn edit_uri(path: &str, config: &EditorConfig) -> String {
    match path.strip_prefix(config.workspace_root.as_str()) {
        Some(rest) => format!("{}{rest}", config.remote_prefix),
        None if path.starts_with('/') => format!("{}{path}", config.file_prefix),
        None => format!("{}/{path}", config.file_prefix),
    }
}

/// The ordered quick-open list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SearchIndex {
    items: Vec<ActionItem>,
}

impl SearchIndex {
    /// Build the list: the edit command when a source path is known, then
    /// pinned entries, then the rest. Each group keeps manifest order.
    pub fn from_entries(
        entries: &[ManifestEntry],
        source_path: Option<&str>,
        config: &IndexConfig,
    ) -> Self {
        let (pinned, remaining): (Vec<&ManifestEntry>, Vec<&ManifestEntry>) =
            entries.iter().partition(|e| e.has_tag(&config.pinned_tag));

        let mut items = Vec::with_capacity(entries.len() + 1);

        if let Some(path) = source_path {
            let editor = &config.editor;
            items.push(ActionItem {
                id: editor.id.clone(),
                title: editor.title.clone(),
                section: config.commands_section.clone(),
                hotkey: Some(editor.hotkey.clone()),
                icon: Some(editor.icon.clone()),
                action: Action::Open {
                    uri: edit_uri(path, editor),
                },
            });
        }

        let groups = [
            (pinned, &config.pinned_section, Some(&config.pinned_icon)),
            (remaining, &config.all_section, None),
        ];
        for (group, section, icon) in groups {
            items.extend(group.into_iter().map(|entry| ActionItem {
                id: entry.uri.clone(),
                title: entry.display_title(&config.untitled),
                section: section.clone(),
                hotkey: None,
                icon: icon.cloned(),
                action: Action::Navigate {
                    route: entry.route.clone(),
                },
            }));
        }

        Self { items }
    }

    pub fn items(&self) -> &[ActionItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ActionItem> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
