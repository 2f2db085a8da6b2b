//! Text search slice.

use serde::Serialize;

use super::{ChangeTracked, ViewerState};
use crate::engine::SearchHit;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchState {
    pub query: Option<String>,
    pub hits: Vec<SearchHit>,
    /// Index into `hits`.
    pub active: Option<usize>,
    /// A search for `query` is in flight.
    pub pending: bool,
    pub results_changed: bool,
    pub active_changed: bool,
}

impl SearchState {
    pub fn active_hit(&self) -> Option<&SearchHit> {
        self.active.and_then(|i| self.hits.get(i))
    }
}

impl ChangeTracked for SearchState {
    fn any_changed(&self) -> bool {
        self.results_changed || self.active_changed
    }

    fn cleared(&self) -> Self {
        Self {
            results_changed: false,
            active_changed: false,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchAction {
    Begin(String),
    /// Results for `query`; ignored unless it is still the current query.
    Results { query: String, hits: Vec<SearchHit> },
    Failed { query: String },
    Next,
    Previous,
    Clear,
}

fn is_current(state: &SearchState, query: &str) -> bool {
    state.query.as_deref() == Some(query)
}

fn with_active(state: &SearchState, active: usize) -> Option<SearchState> {
    if state.active == Some(active) {
        return None;
    }
    Some(SearchState {
        active: Some(active),
        active_changed: true,
        ..state.clone()
    })
}

pub fn reduce(state: &SearchState, action: &SearchAction, _root: &ViewerState) -> Option<SearchState> {
    match action {
        SearchAction::Begin(query) => Some(SearchState {
            query: Some(query.clone()),
            hits: Vec::new(),
            active: None,
            pending: true,
            results_changed: true,
            active_changed: state.active.is_some() || state.active_changed,
        }),
        SearchAction::Results { query, hits } => {
            if !is_current(state, query) {
                log::debug!("dropping stale search results for {:?}", query);
                return None;
            }
            Some(SearchState {
                hits: hits.clone(),
                active: (!hits.is_empty()).then_some(0),
                pending: false,
                results_changed: true,
                active_changed: true,
                ..state.clone()
            })
        }
        SearchAction::Failed { query } => {
            if !is_current(state, query) || !state.pending {
                return None;
            }
            Some(SearchState {
                pending: false,
                results_changed: true,
                ..state.clone()
            })
        }
        SearchAction::Next => {
            let len = state.hits.len();
            if len == 0 {
                return None;
            }
            let next = state.active.map_or(0, |i| (i + 1) % len);
            with_active(state, next)
        }
        SearchAction::Previous => {
            let len = state.hits.len();
            if len == 0 {
                return None;
            }
            let previous = state.active.map_or(len - 1, |i| (i + len - 1) % len);
            with_active(state, previous)
        }
        SearchAction::Clear => {
            if state.query.is_none() && state.hits.is_empty() {
                return None;
            }
            Some(SearchState {
                results_changed: true,
                active_changed: state.active.is_some() || state.active_changed,
                ..SearchState::default()
            })
        }
    }
}
