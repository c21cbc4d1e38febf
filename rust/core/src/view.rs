// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! View model reflecting controller state.
//!
//! Rendering is a pure function of the snapshot; nothing here mutates.

use crate::progress::LoadingProgress;
use crate::shell::ShellState;
use serde::Serialize;

/// User actions exposed as buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    LoadFragments,
    LoadCustomFragment,
    DeleteArchModel,
    DownloadAll,
    DeleteAll,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::LoadFragments => "Load Fragments",
            Action::LoadCustomFragment => "Load Custom Fragment",
            Action::DeleteArchModel => "Delete Architecture Model",
            Action::DownloadAll => "Download Fragments",
            Action::DeleteAll => "Delete All Models",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    pub action: Action,
    pub label: &'static str,
    pub enabled: bool,
}

impl Button {
    fn new(action: Action, enabled: bool) -> Self {
        Self {
            action,
            label: action.label(),
            enabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressView {
    pub current: usize,
    pub total: usize,
    pub percent: f64,
}

impl From<LoadingProgress> for ProgressView {
    fn from(progress: LoadingProgress) -> Self {
        Self {
            current: progress.current,
            total: progress.total,
            percent: progress.percent(),
        }
    }
}

/// Controller state captured for one render.
#[derive(Debug, Clone)]
pub struct ViewSnapshot<'a> {
    pub shell: ShellState,
    pub model_ids: Vec<String>,
    pub is_loading: bool,
    pub progress: Option<LoadingProgress>,
    pub error: Option<String>,
    pub arch_pattern: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub shell: ShellState,
    pub viewer_ready: bool,
    /// Shown until the shell is Ready; replaced by the error banner on failure.
    pub initializing: bool,
    pub models_count: usize,
    pub model_ids: Vec<String>,
    pub is_loading: bool,
    pub progress: Option<ProgressView>,
    pub error: Option<String>,
    pub buttons: Vec<Button>,
}

impl ViewModel {
    pub fn render(snapshot: ViewSnapshot<'_>) -> Self {
        let ready = snapshot.shell == ShellState::Ready;
        let initializing = matches!(
            snapshot.shell,
            ShellState::Uninitialized | ShellState::Initializing
        );
        let count = snapshot.model_ids.len();
        let idle = !snapshot.is_loading;

        let mut buttons = Vec::with_capacity(5);
        if count == 0 {
            buttons.push(Button::new(Action::LoadFragments, ready && idle));
        }
        buttons.push(Button::new(Action::LoadCustomFragment, ready && idle));
        if has_match(&snapshot.model_ids, snapshot.arch_pattern) {
            buttons.push(Button::new(Action::DeleteArchModel, idle));
        }
        if count > 0 {
            buttons.push(Button::new(Action::DownloadAll, idle));
            buttons.push(Button::new(Action::DeleteAll, idle));
        }

        Self {
            viewer_ready: ready,
            initializing,
            models_count: count,
            is_loading: snapshot.is_loading,
            progress: snapshot.progress.map(ProgressView::from),
            error: snapshot.error,
            buttons,
            model_ids: snapshot.model_ids,
            shell: snapshot.shell,
        }
    }

    pub fn button(&self, action: Action) -> Option<&Button> {
        self.buttons.iter().find(|b| b.action == action)
    }
}

/// First id containing `pattern`.
pub fn find_match<'a>(model_ids: &'a [String], pattern: &str) -> Option<&'a String> {
    if pattern.is_empty() {
        return None;
    }
    model_ids.iter().find(|id| id.contains(pattern))
}

fn has_match(model_ids: &[String], pattern: &str) -> bool {
    find_match(model_ids, pattern).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(ids: &[&str]) -> ViewSnapshot<'static> {
        ViewSnapshot {
            shell: ShellState::Ready,
            model_ids: ids.iter().map(|s| s.to_string()).collect(),
            is_loading: false,
            progress: None,
            error: None,
            arch_pattern: "arq",
        }
    }

    fn actions(view: &ViewModel) -> Vec<Action> {
        view.buttons.iter().map(|b| b.action).collect()
    }

    #[test]
    fn empty_viewer_offers_loading() {
        let view = ViewModel::render(snapshot(&[]));
        assert_eq!(
            actions(&view),
            vec![Action::LoadFragments, Action::LoadCustomFragment]
        );
        assert!(view.buttons.iter().all(|b| b.enabled));
        assert!(!view.initializing);
    }

    #[test]
    fn loaded_models_offer_download_and_delete() {
        let view = ViewModel::render(snapshot(&["school_arq", "school_str"]));
        assert_eq!(
            actions(&view),
            vec![
                Action::LoadCustomFragment,
                Action::DeleteArchModel,
                Action::DownloadAll,
                Action::DeleteAll
            ]
        );
        assert_eq!(view.models_count, 2);
    }

    #[test]
    fn delete_arch_hidden_without_match() {
        let view = ViewModel::render(snapshot(&["school_str"]));
        assert!(view.button(Action::DeleteArchModel).is_none());
        assert!(view.button(Action::DownloadAll).is_some());
    }

    #[test]
    fn everything_disabled_while_loading() {
        let mut snap = snapshot(&["school_arq"]);
        snap.is_loading = true;
        snap.progress = Some(LoadingProgress { current: 1, total: 2 });
        let view = ViewModel::render(snap);

        assert!(view.buttons.iter().all(|b| !b.enabled));
        assert_eq!(view.progress.as_ref().map(|p| p.percent), Some(50.0));
    }

    #[test]
    fn banners_follow_shell_state() {
        let mut snap = snapshot(&[]);
        snap.shell = ShellState::Initializing;
        let view = ViewModel::render(snap);
        assert!(view.initializing);
        assert!(!view.viewer_ready);
        assert!(!view.button(Action::LoadFragments).unwrap().enabled);

        let mut snap = snapshot(&[]);
        snap.shell = ShellState::Error("boom".into());
        snap.error = Some("Initialization failed: boom".into());
        let view = ViewModel::render(snap);
        assert!(!view.initializing);
        assert_eq!(view.error.as_deref(), Some("Initialization failed: boom"));
    }

    #[test]
    fn find_match_is_substring_based() {
        let ids = vec!["school_str".to_string(), "school_arq".to_string()];
        assert_eq!(find_match(&ids, "arq").map(String::as_str), Some("school_arq"));
        assert_eq!(find_match(&ids, "mep"), None);
        assert_eq!(find_match(&ids, ""), None);
    }
}
