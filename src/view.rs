//! View state and derived views.
//!
//! A [`ViewState`] is an immutable description of what the user is looking
//! at; every transition returns a new state. [`build_view`] derives the rows
//! to show from a dataset and a state without touching the dataset.

use std::cmp::Ordering;

use clap::ValueEnum;

use crate::{
    load::{Boards, Dataset},
    rank::{RankedRecord, overall_standings},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    Rank,
    Value,
    Name,
}

/// Which slice of the dataset is shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Tab {
    /// Every record; split sheets are ranked across groups.
    #[default]
    All,
    /// One group, matched case-insensitively against group labels.
    Group(String),
}

impl Tab {
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Tab::All
        } else {
            Tab::Group(trimmed.to_string())
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub sort: SortKey,
    pub query: String,
    pub tab: Tab,
    /// Chart bars; `None` shows every record.
    pub top_n: Option<usize>,
}

impl ViewState {
    pub fn with_sort(&self, sort: SortKey) -> Self {
        Self {
            sort,
            ..self.clone()
        }
    }

    pub fn with_query(&self, query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..self.clone()
        }
    }

    pub fn with_tab(&self, tab: Tab) -> Self {
        Self {
            tab,
            ..self.clone()
        }
    }

    pub fn with_top_n(&self, top_n: Option<usize>) -> Self {
        Self {
            top_n,
            ..self.clone()
        }
    }
}

/// Rows derived for one render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct View {
    /// Every record of the current tab, unfiltered, in rank order.
    pub base: Vec<RankedRecord>,
    /// Filtered and sorted rows to display.
    pub rows: Vec<RankedRecord>,
    /// Sum of values over the whole dataset, whatever the tab.
    pub dataset_total: f64,
}

impl View {
    /// Sum of values over the unfiltered tab.
    pub fn total(&self) -> f64 {
        self.base.iter().map(|r| r.value).sum()
    }

    /// Fraction of the dataset total held by `value`.
    pub fn share_of(&self, value: f64) -> f64 {
        let denominator = if self.dataset_total == 0.0 {
            1.0
        } else {
            self.dataset_total
        };
        value / denominator
    }

    /// Top records by value, for charts.
    pub fn top_by_value(&self, top_n: Option<usize>) -> Vec<&RankedRecord> {
        let mut sorted = self.base.iter().collect::<Vec<_>>();
        sorted.sort_by(|a, b| b.value.total_cmp(&a.value));
        if let Some(limit) = top_n {
            sorted.truncate(limit);
        }
        sorted
    }
}

pub fn build_view(dataset: Option<&Dataset>, state: &ViewState) -> View {
    let Some(dataset) = dataset else {
        return View::default();
    };
    let base = tab_records(dataset, &state.tab);
    let needle = state.query.trim().to_lowercase();
    let mut rows = base
        .iter()
        .filter(|record| needle.is_empty() || record.name.to_lowercase().contains(&needle))
        .cloned()
        .collect::<Vec<_>>();
    sort_rows(&mut rows, state.sort);
    View {
        base,
        rows,
        dataset_total: dataset_total(dataset),
    }
}

fn dataset_total(dataset: &Dataset) -> f64 {
    match &dataset.boards {
        Boards::Single(records) => records.iter().map(|r| r.value).sum(),
        Boards::Split(groups) => groups
            .iter()
            .flat_map(|g| &g.records)
            .map(|r| r.value)
            .sum(),
    }
}

/// Group labels a dataset offers as tabs.
pub fn group_labels(dataset: &Dataset) -> Vec<String> {
    match &dataset.boards {
        Boards::Split(groups) => groups.iter().map(|g| g.label.clone()).collect(),
        Boards::Single(records) => {
            let mut labels = Vec::<String>::new();
            for label in records.iter().filter_map(|r| r.group.as_ref()) {
                if !labels.iter().any(|known| known.eq_ignore_ascii_case(label)) {
                    labels.push(label.clone());
                }
            }
            labels
        }
    }
}

fn tab_records(dataset: &Dataset, tab: &Tab) -> Vec<RankedRecord> {
    match (&dataset.boards, tab) {
        (Boards::Single(records), Tab::All) => records.clone(),
        (Boards::Single(records), Tab::Group(label)) => records
            .iter()
            .filter(|r| r.group.as_deref().is_some_and(|g| g.eq_ignore_ascii_case(label)))
            .cloned()
            .collect(),
        (Boards::Split(groups), Tab::All) => {
            overall_standings(groups.iter().map(|g| g.records.as_slice()))
                .into_iter()
                .map(|standing| RankedRecord {
                    rank: standing.overall_rank,
                    ..standing.record.clone()
                })
                .collect()
        }
        (Boards::Split(groups), Tab::Group(label)) => groups
            .iter()
            .find(|g| g.label.eq_ignore_ascii_case(label))
            .map(|g| g.records.clone())
            .unwrap_or_default(),
    }
}

fn sort_rows(rows: &mut [RankedRecord], sort: SortKey) {
    match sort {
        SortKey::Rank => rows.sort_by_key(|r| r.rank),
        SortKey::Value => rows.sort_by(|a, b| b.value.total_cmp(&a.value)),
        SortKey::Name => rows.sort_by(|a, b| compare_names(&a.name, &b.name)),
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
