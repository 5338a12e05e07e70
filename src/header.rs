//! Header resolution.
//!
//! Maps the semantic fields of a leaderboard (rank, name, value, refresh,
//! gender) onto the concrete columns of a sheet's header row. Matching runs
//! in two passes per field: an exact pass over normalized headers, then a
//! substring pass in either direction. The first column found wins.
//!
//! Sheets that hold two side-by-side group tables (for example a male and a
//! female ranking sharing one header row) resolve to [`TableLayout::Split`].

use std::{fmt, sync::OnceLock};

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::source::RawSheet;

/// The semantic roles a column can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKey {
    Rank,
    Name,
    Value,
    Refresh,
    Gender,
}

impl FieldKey {
    pub const ALL: [FieldKey; 5] = [
        FieldKey::Rank,
        FieldKey::Name,
        FieldKey::Value,
        FieldKey::Refresh,
        FieldKey::Gender,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::Rank => "rank",
            FieldKey::Name => "name",
            FieldKey::Value => "value",
            FieldKey::Refresh => "refresh",
            FieldKey::Gender => "gender",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepted header variants per field key, in priority order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Synonyms {
    pub rank: Vec<String>,
    pub name: Vec<String>,
    pub value: Vec<String>,
    pub refresh: Vec<String>,
    pub gender: Vec<String>,
}

impl Synonyms {
    pub fn get(&self, key: FieldKey) -> &[String] {
        match key {
            FieldKey::Rank => &self.rank,
            FieldKey::Name => &self.name,
            FieldKey::Value => &self.value,
            FieldKey::Refresh => &self.refresh,
            FieldKey::Gender => &self.gender,
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for Synonyms {
    fn default() -> Self {
        Self {
            rank: strings(&["rank", "ranking", "순위", "등수", "no.", "#"]),
            name: strings(&["name", "비제이명", "bj", "닉네임", "nickname", "player", "이름"]),
            value: strings(&[
                "value",
                "월별 누적별풍선",
                "누적별풍선",
                "별풍선",
                "score",
                "points",
                "total",
            ]),
            refresh: strings(&["새로고침시간", "refresh", "updated", "updated at", "timestamp"]),
            gender: strings(&["gender", "성별", "sex"]),
        }
    }
}

/// One side of a split sheet: a display label and the header prefix tokens
/// identifying its columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub label: String,
    pub tokens: Vec<String>,
}

impl GroupSpec {
    pub fn new(label: &str, tokens: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            tokens: strings(tokens),
        }
    }

    /// Whether a raw cell value designates this group.
    pub fn matches_value(&self, value: &str) -> bool {
        let normalized = normalize_header(value);
        !normalized.is_empty()
            && (normalized == normalize_header(&self.label)
                || self
                    .tokens
                    .iter()
                    .any(|token| normalize_header(token) == normalized))
    }
}

pub fn default_groups() -> [GroupSpec; 2] {
    [
        GroupSpec::new("Male", &["male", "남자", "남성", "남"]),
        GroupSpec::new("Female", &["female", "여자", "여성", "여"]),
    ]
}

/// A header matched to a field: its column position and original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub index: usize,
    pub header: String,
}

/// Field key to column assignment for one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub rank: Option<ResolvedColumn>,
    pub name: Option<ResolvedColumn>,
    pub value: Option<ResolvedColumn>,
    pub refresh: Option<ResolvedColumn>,
    pub gender: Option<ResolvedColumn>,
}

impl ColumnMap {
    pub fn get(&self, key: FieldKey) -> Option<&ResolvedColumn> {
        match key {
            FieldKey::Rank => self.rank.as_ref(),
            FieldKey::Name => self.name.as_ref(),
            FieldKey::Value => self.value.as_ref(),
            FieldKey::Refresh => self.refresh.as_ref(),
            FieldKey::Gender => self.gender.as_ref(),
        }
    }

    fn slot(&mut self, key: FieldKey) -> &mut Option<ResolvedColumn> {
        match key {
            FieldKey::Rank => &mut self.rank,
            FieldKey::Name => &mut self.name,
            FieldKey::Value => &mut self.value,
            FieldKey::Refresh => &mut self.refresh,
            FieldKey::Gender => &mut self.gender,
        }
    }

    /// Both `name` and `value` resolved.
    pub fn is_usable(&self) -> bool {
        self.name.is_some() && self.value.is_some()
    }
}

/// Column maps for one group of a split sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupColumns {
    pub label: String,
    pub columns: ColumnMap,
}

/// How a sheet's columns are laid out, resolved once per load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableLayout {
    Single(ColumnMap),
    Split([GroupColumns; 2]),
}

impl TableLayout {
    pub fn is_split(&self) -> bool {
        matches!(self, TableLayout::Split(_))
    }
}

/// Result of split detection, kept even when detection fails so callers can
/// report what each group resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitColumns {
    pub ok: bool,
    pub groups: [GroupColumns; 2],
}

fn whitespace() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace pattern"))
}

/// Trims, lowercases, and collapses internal whitespace.
pub fn normalize_header(value: &str) -> String {
    whitespace()
        .replace_all(value.trim(), " ")
        .to_lowercase()
}

/// Resolves every field key against a header row.
pub fn resolve(header_row: &[Option<String>], synonyms: &Synonyms) -> ColumnMap {
    let candidates = header_row
        .iter()
        .enumerate()
        .filter_map(|(index, cell)| {
            let raw = cell.as_deref()?;
            let normalized = normalize_header(raw);
            (!normalized.is_empty()).then(|| Candidate {
                index,
                header: raw.to_string(),
                key: normalized,
            })
        })
        .collect::<Vec<_>>();
    resolve_candidates(&candidates, synonyms)
}

/// Resolves the split layout for the two configured groups.
pub fn resolve_split(
    header_row: &[Option<String>],
    synonyms: &Synonyms,
    groups: &[GroupSpec; 2],
) -> SplitColumns {
    let shared = resolve(&unprefixed_headers(header_row, groups), synonyms).refresh;
    let resolved = [0, 1].map(|slot| {
        let group = &groups[slot];
        let candidates = header_row
            .iter()
            .enumerate()
            .filter_map(|(index, cell)| {
                let raw = cell.as_deref()?;
                let remainder = strip_group_token(&normalize_header(raw), &group.tokens)?;
                Some(Candidate {
                    index,
                    header: raw.to_string(),
                    key: remainder,
                })
            })
            .collect::<Vec<_>>();
        let mut columns = resolve_candidates(&candidates, synonyms);
        if columns.refresh.is_none() {
            columns.refresh = shared.clone();
        }
        GroupColumns {
            label: group.label.clone(),
            columns,
        }
    });
    let ok = resolved.iter().all(|group| group.columns.is_usable());
    SplitColumns {
        ok,
        groups: resolved,
    }
}

/// Picks the layout for a header row: split when both groups resolve,
/// otherwise the single-table map.
pub fn detect_layout(
    header_row: &[Option<String>],
    synonyms: &Synonyms,
    groups: &[GroupSpec; 2],
) -> TableLayout {
    let split = resolve_split(header_row, synonyms, groups);
    if split.ok {
        debug!(
            "Detected split layout for groups '{}' and '{}'",
            split.groups[0].label, split.groups[1].label
        );
        TableLayout::Split(split.groups)
    } else {
        TableLayout::Single(resolve(header_row, synonyms))
    }
}

/// A sheet chosen for loading together with its layout.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetSelection<'a> {
    pub sheet: &'a RawSheet,
    pub layout: TableLayout,
}

impl SheetSelection<'_> {
    pub fn is_usable(&self) -> bool {
        match &self.layout {
            TableLayout::Single(map) => map.is_usable(),
            TableLayout::Split(_) => true,
        }
    }
}

/// Chooses the first usable sheet in declaration order, evaluating
/// `preferred` first when the workbook has it. Falls back to the first sheet
/// (possibly unusable) when nothing qualifies.
pub fn select_sheet<'a>(
    sheets: &'a [RawSheet],
    preferred: Option<&str>,
    synonyms: &Synonyms,
    groups: &[GroupSpec; 2],
) -> Option<SheetSelection<'a>> {
    let preferred_first = preferred
        .and_then(|name| sheets.iter().find(|sheet| sheet.name == name))
        .into_iter();
    let ordered = preferred_first.chain(
        sheets
            .iter()
            .filter(|sheet| Some(sheet.name.as_str()) != preferred),
    );
    for sheet in ordered {
        let selection = SheetSelection {
            sheet,
            layout: detect_layout(&sheet.header_row(), synonyms, groups),
        };
        if selection.is_usable() {
            debug!("Selected sheet '{}'", sheet.name);
            return Some(selection);
        }
        debug!("Sheet '{}' lacks name/value columns; skipping", sheet.name);
    }
    let first = sheets.first()?;
    Some(SheetSelection {
        sheet: first,
        layout: detect_layout(&first.header_row(), synonyms, groups),
    })
}

struct Candidate {
    index: usize,
    header: String,
    /// Normalized text matched against synonyms.
    key: String,
}

fn resolve_candidates(candidates: &[Candidate], synonyms: &Synonyms) -> ColumnMap {
    let mut map = ColumnMap::default();
    for key in FieldKey::ALL {
        let accepted = synonyms
            .get(key)
            .iter()
            .map(|s| normalize_header(s))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();
        let found = candidates
            .iter()
            .find(|c| accepted.iter().any(|syn| c.key == *syn))
            .or_else(|| {
                candidates.iter().find(|c| {
                    accepted
                        .iter()
                        .any(|syn| c.key.contains(syn.as_str()) || syn.contains(c.key.as_str()))
                })
            });
        *map.slot(key) = found.map(|c| ResolvedColumn {
            index: c.index,
            header: c.header.clone(),
        });
    }
    map
}

/// Finds a group token at the start of the header or after a
/// non-alphanumeric character and returns the header with it removed.
fn strip_group_token(normalized: &str, tokens: &[String]) -> Option<String> {
    tokens
        .iter()
        .map(|token| normalize_header(token))
        .filter(|token| !token.is_empty())
        .find_map(|token| {
            let at = find_token(normalized, &token)?;
            let remainder = format!("{} {}", &normalized[..at], &normalized[at + token.len()..]);
            let remainder = normalize_header(&remainder);
            (!remainder.is_empty()).then_some(remainder)
        })
}

fn find_token(haystack: &str, token: &str) -> Option<usize> {
    haystack.match_indices(token).map(|(at, _)| at).find(|&at| {
        haystack[..at]
            .chars()
            .next_back()
            .is_none_or(|prev| !prev.is_alphanumeric())
    })
}

fn has_group_token(normalized: &str, groups: &[GroupSpec; 2]) -> bool {
    groups.iter().flat_map(|g| g.tokens.iter()).any(|token| {
        let token = normalize_header(token);
        !token.is_empty() && find_token(normalized, &token).is_some()
    })
}

fn unprefixed_headers(header_row: &[Option<String>], groups: &[GroupSpec; 2]) -> Vec<Option<String>> {
    header_row
        .iter()
        .map(|cell| {
            cell.as_ref()
                .filter(|raw| !has_group_token(&normalize_header(raw), groups))
                .cloned()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<Option<String>> {
        cells
            .iter()
            .map(|c| (!c.is_empty()).then(|| c.to_string()))
            .collect()
    }

    #[test]
    fn normalize_header_collapses_whitespace_and_case() {
        assert_eq!(normalize_header("  Monthly \t  Total  "), "monthly total");
        assert_eq!(normalize_header("월별  누적별풍선"), "월별 누적별풍선");
    }

    #[test]
    fn exact_match_beats_earlier_substring_match() {
        let map = resolve(&row(&["Player Name", "Name", "Score"]), &Synonyms::default());
        assert_eq!(map.name.unwrap().index, 1);
        assert_eq!(map.value.unwrap().index, 2);
    }

    #[test]
    fn substring_pass_handles_partial_headers() {
        let map = resolve(&row(&["BJ Name", "Total Points"]), &Synonyms::default());
        assert_eq!(map.name.unwrap().header, "BJ Name");
        assert_eq!(map.value.unwrap().header, "Total Points");
    }

    #[test]
    fn korean_headers_resolve() {
        let map = resolve(
            &row(&["순위", "비제이명", "월별 누적별풍선", "새로고침시간"]),
            &Synonyms::default(),
        );
        assert_eq!(map.rank.unwrap().index, 0);
        assert_eq!(map.name.unwrap().index, 1);
        assert_eq!(map.value.unwrap().index, 2);
        assert_eq!(map.refresh.unwrap().index, 3);
        assert!(map.gender.is_none());
    }

    #[test]
    fn free_text_columns_do_not_become_rank() {
        let synonyms = Synonyms::default();
        for header in ["Notes", "Nominee", "Anonymous", "Donor"] {
            let map = resolve(&row(&["Name", "Score", header]), &synonyms);
            assert_eq!(map.rank, None, "{header} resolved as rank");
            assert!(map.is_usable());
        }
        let map = resolve(&row(&["No.", "Name", "Score"]), &synonyms);
        assert_eq!(map.rank.map(|c| c.index), Some(0));
    }

    #[test]
    fn token_lookup_respects_word_starts() {
        assert_eq!(find_token("female name", "male"), None);
        assert_eq!(find_token("male name", "male"), Some(0));
        assert_eq!(find_token("top-male name", "male"), Some(4));
    }

    #[test]
    fn strip_group_token_leaves_field_remainder() {
        let tokens = vec!["남자".to_string()];
        assert_eq!(strip_group_token("남자 순위", &tokens), Some("순위".to_string()));
        assert_eq!(strip_group_token("남자순위", &tokens), Some("순위".to_string()));
        assert_eq!(strip_group_token("남자", &tokens), None);
        assert_eq!(strip_group_token("여자 순위", &tokens), None);
    }

    #[test]
    fn split_groups_share_unprefixed_refresh_column() {
        let header = row(&[
            "Male Rank",
            "Male Name",
            "Male Score",
            "Female Rank",
            "Female Name",
            "Female Score",
            "Updated",
        ]);
        let split = resolve_split(&header, &Synonyms::default(), &default_groups());
        assert!(split.ok);
        let [male, female] = &split.groups;
        assert_eq!(male.columns.name.as_ref().unwrap().index, 1);
        assert_eq!(female.columns.name.as_ref().unwrap().index, 4);
        assert_eq!(male.columns.refresh.as_ref().unwrap().index, 6);
        assert_eq!(female.columns.refresh.as_ref().unwrap().index, 6);
    }

    #[test]
    fn group_value_matching_accepts_label_and_tokens() {
        let [male, female] = default_groups();
        assert!(male.matches_value(" MALE "));
        assert!(male.matches_value("남"));
        assert!(!male.matches_value("Female"));
        assert!(female.matches_value("여성"));
        assert!(!female.matches_value(""));
    }
}
