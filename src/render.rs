//! Text rendering of a leaderboard.
//!
//! A [`Renderer`] is an ordered list of [`RenderStage`]s followed by
//! post-render hooks, all fixed when the renderer is built. Each stage
//! appends its section to the output buffer.

use std::fmt::Write as _;

use itertools::Itertools;

use crate::{
    chart,
    config::Config,
    export::format_share,
    load::Session,
    prefs::Theme,
    summary::summarize,
    table::{self, Align},
    tier::{self, tier_level, tier_of},
    view::{View, ViewState},
};

const RESET: &str = "\u{1b}[0m";

/// Everything a stage may read while rendering.
pub struct RenderContext<'a> {
    pub session: &'a Session,
    pub state: &'a ViewState,
    pub view: &'a View,
    pub config: &'a Config,
    pub theme: Theme,
}

pub trait RenderStage {
    fn name(&self) -> &'static str;
    fn render(&self, ctx: &RenderContext<'_>, out: &mut String);
}

/// Called with the finished output after every render.
pub type RenderHook = Box<dyn Fn(&RenderContext<'_>, &str)>;

#[derive(Default)]
pub struct Renderer {
    stages: Vec<Box<dyn RenderStage>>,
    hooks: Vec<RenderHook>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hint, summary, table, and chart, in that order.
    pub fn standard() -> Self {
        Self::new()
            .with_stage(HintStage)
            .with_stage(SummaryStage)
            .with_stage(TableStage)
            .with_stage(ChartStage)
    }

    pub fn with_stage(mut self, stage: impl RenderStage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn with_hook(mut self, hook: impl Fn(&RenderContext<'_>, &str) + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    pub fn render(&self, ctx: &RenderContext<'_>) -> String {
        let mut out = String::new();
        for stage in &self.stages {
            let before = out.len();
            stage.render(ctx, &mut out);
            if out.len() > before && !out.ends_with("\n\n") {
                out.push('\n');
            }
        }
        for hook in &self.hooks {
            hook(ctx, &out);
        }
        out
    }
}

pub struct HintStage;

impl RenderStage for HintStage {
    fn name(&self) -> &'static str {
        "hint"
    }

    fn render(&self, ctx: &RenderContext<'_>, out: &mut String) {
        let _ = writeln!(out, "{}", ctx.session.hint);
        if let Some(dataset) = &ctx.session.dataset {
            let _ = writeln!(out, "Sheet: {}", dataset.sheet);
        }
    }
}

pub struct SummaryStage;

impl RenderStage for SummaryStage {
    fn name(&self) -> &'static str {
        "summary"
    }

    fn render(&self, ctx: &RenderContext<'_>, out: &mut String) {
        let summary = summarize(&ctx.view.base);
        let refresh = summary
            .refresh
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "-".to_string());
        let leader = summary
            .leader
            .as_ref()
            .map(|(name, value)| format!("  (1st: {name}, {})", format_thousands(*value)))
            .unwrap_or_default();
        let _ = writeln!(out, "Records  {}", format_thousands(summary.count as f64));
        let _ = writeln!(out, "Total    {}{leader}", format_thousands(summary.total));
        let _ = writeln!(out, "Average  {}", format_thousands(summary.average));
        let _ = writeln!(out, "Refresh  {refresh}");

        let palette = Palette::for_theme(ctx.theme);
        let tiers = &ctx.config.tiers;
        let legend = tier::descending(tiers)
            .into_iter()
            .map(|tier| {
                format!(
                    "{} {}+",
                    palette.tier(tier_level(tier, tiers), &tier.label),
                    format_thousands(tier.min)
                )
            })
            .join("  ");
        if !legend.is_empty() {
            let _ = writeln!(out, "Tiers    {legend}");
        }
    }
}

pub struct TableStage;

impl RenderStage for TableStage {
    fn name(&self) -> &'static str {
        "table"
    }

    fn render(&self, ctx: &RenderContext<'_>, out: &mut String) {
        if ctx.view.rows.is_empty() {
            let _ = writeln!(out, "No data to display.");
            return;
        }
        let palette = Palette::for_theme(ctx.theme);
        let tiers = &ctx.config.tiers;
        let show_share = ctx.config.show_share;

        let mut headers = vec![
            "#".to_string(),
            "name".to_string(),
            "tier".to_string(),
            "value".to_string(),
        ];
        let mut aligns = vec![Align::Right, Align::Left, Align::Left, Align::Right];
        if show_share {
            headers.push("share".to_string());
            aligns.push(Align::Right);
        }

        let rows = ctx
            .view
            .rows
            .iter()
            .map(|record| {
                let tier = tier_of(record.value, tiers)
                    .map(|tier| palette.tier(tier_level(tier, tiers), &tier.label))
                    .unwrap_or_else(|| "-".to_string());
                let mut row = vec![
                    palette.rank(record.rank),
                    record.name.clone(),
                    tier,
                    format_thousands(record.value),
                ];
                if show_share {
                    row.push(format_share(ctx.view.share_of(record.value)));
                }
                row
            })
            .collect::<Vec<_>>();

        out.push_str(&table::render_table(&headers, &rows, &aligns));
        let _ = writeln!(
            out,
            "Showing {} of {}",
            ctx.view.rows.len(),
            ctx.view.base.len()
        );
    }
}

pub struct ChartStage;

impl RenderStage for ChartStage {
    fn name(&self) -> &'static str {
        "chart"
    }

    fn render(&self, ctx: &RenderContext<'_>, out: &mut String) {
        let top = ctx.view.top_by_value(ctx.state.top_n);
        if top.is_empty() {
            return;
        }
        let palette = Palette::for_theme(ctx.theme);
        let heading = match ctx.state.top_n {
            Some(limit) => format!("Top {limit} by value"),
            None => "All by value".to_string(),
        };
        let _ = writeln!(out, "{heading}");
        out.push_str(&chart::render_bars(
            &top,
            ctx.config.chart.width,
            format_thousands,
            |bar| palette.bar(bar),
        ));
    }
}

/// ANSI styles for a theme; the plain theme has none.
struct Palette {
    podium: [&'static str; 3],
    tiers: [&'static str; 3],
    bar: &'static str,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                podium: ["\u{1b}[1;33m", "\u{1b}[1;37m", "\u{1b}[1;31m"],
                tiers: ["\u{1b}[35m", "\u{1b}[36m", "\u{1b}[32m"],
                bar: "\u{1b}[36m",
            },
            Theme::Light => Self {
                podium: ["\u{1b}[1;34m", "\u{1b}[1;90m", "\u{1b}[1;31m"],
                tiers: ["\u{1b}[35m", "\u{1b}[34m", "\u{1b}[32m"],
                bar: "\u{1b}[34m",
            },
            Theme::Plain => Self {
                podium: [""; 3],
                tiers: [""; 3],
                bar: "",
            },
        }
    }

    fn paint(style: &str, text: &str) -> String {
        if style.is_empty() {
            text.to_string()
        } else {
            format!("{style}{text}{RESET}")
        }
    }

    /// Ranks 1 to 3 get a podium badge.
    fn rank(&self, rank: i64) -> String {
        let text = rank.to_string();
        match rank {
            1..=3 => Self::paint(self.podium[(rank - 1) as usize], &text),
            _ => text,
        }
    }

    fn tier(&self, level: usize, label: &str) -> String {
        let style = self.tiers.get(level.saturating_sub(1)).copied().unwrap_or("");
        Self::paint(style, label)
    }

    fn bar(&self, bar: &str) -> String {
        Self::paint(self.bar, bar)
    }
}

/// Thousands-separated display of a number; fractions keep up to two
/// decimals.
pub fn format_thousands(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let negative = rounded < 0.0;
    let magnitude = rounded.abs();
    let whole = magnitude.trunc() as u64;
    let cents = ((magnitude - magnitude.trunc()) * 100.0).round() as u64;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if cents > 0 {
        let fraction = format!("{cents:02}");
        grouped.push('.');
        grouped.push_str(fraction.trim_end_matches('0'));
    }
    if negative && (whole > 0 || cents > 0) {
        grouped.insert(0, '-');
    }
    grouped
}
