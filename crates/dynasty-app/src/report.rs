// Report types and rendering: aligned text tables, pretty JSON, CSV.

use dynasty_core::{DraftSlotOdds, Eligibility, RosterId, TeamPrediction};
use dynasty_sleeper::{LeagueData, ReportedStanding};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Anything that renders as a header row plus data rows.
pub trait Tabular {
    fn title(&self) -> String;
    fn headers(&self) -> Vec<String>;
    fn rows(&self) -> Vec<Vec<String>>;
}

pub fn render<R: Tabular + Serialize>(report: &R, format: OutputFormat) -> Result<String, ReportError> {
    match format {
        OutputFormat::Table => Ok(render_table(report)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Csv => render_csv(report),
    }
}

fn render_table<R: Tabular>(report: &R) -> String {
    let headers = report.headers();
    let rows = report.rows();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&report.title());
    out.push('\n');
    out.push_str(&line(&headers[..]));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&line(&rule[..]));
    out.push('\n');
    for row in &rows {
        out.push_str(&line(&row[..]));
        out.push('\n');
    }
    out
}

fn render_csv<R: Tabular>(report: &R) -> Result<String, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(report.headers())?;
    for row in report.rows() {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8(bytes)?)
}

fn record(wins: u32, losses: u32, ties: u32) -> String {
    if ties > 0 {
        format!("{wins}-{losses}-{ties}")
    } else {
        format!("{wins}-{losses}")
    }
}

fn pct(value: f64) -> String {
    format!("{value:.1}")
}

// ---------------------------------------------------------------------------
// Standings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsReport {
    pub league: String,
    pub season: String,
    pub teams: Vec<ReportedStanding>,
}

impl StandingsReport {
    pub fn new(data: &LeagueData) -> Self {
        StandingsReport {
            league: data.name().to_string(),
            season: data.season().to_string(),
            teams: data.reported_standings(),
        }
    }
}

impl Tabular for StandingsReport {
    fn title(&self) -> String {
        format!("{} standings ({})", self.league, self.season)
    }

    fn headers(&self) -> Vec<String> {
        ["#", "Team", "Owner", "Record", "PF"].map(String::from).to_vec()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.teams
            .iter()
            .enumerate()
            .map(|(i, t)| {
                vec![
                    (i + 1).to_string(),
                    t.team_name.clone(),
                    t.owner_name.clone(),
                    record(t.wins, t.losses, t.ties),
                    format!("{:.2}", t.points_for),
                ]
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Season predictions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    pub team_name: String,
    #[serde(flatten)]
    pub prediction: TeamPrediction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub league: String,
    pub remaining_weeks: i32,
    pub playoff_teams: usize,
    pub trials: u32,
    pub teams: Vec<PredictionRow>,
}

impl PredictionReport {
    pub fn divisional(&self) -> bool {
        self.teams
            .iter()
            .any(|t| t.prediction.division_winner_pct.is_some())
    }

    pub fn team(&self, roster_id: RosterId) -> Option<&TeamPrediction> {
        self.teams
            .iter()
            .map(|t| &t.prediction)
            .find(|p| p.roster_id == roster_id)
    }
}

impl Tabular for PredictionReport {
    fn title(&self) -> String {
        format!(
            "{}: {} weeks left, top {} make the playoffs ({} trials)",
            self.league, self.remaining_weeks, self.playoff_teams, self.trials
        )
    }

    fn headers(&self) -> Vec<String> {
        let mut headers: Vec<String> = ["#", "Team", "Record", "PF", "Proj W", "Playoffs %", "#1 Seed %"]
            .map(String::from)
            .to_vec();
        if self.divisional() {
            headers.push("Division %".into());
        }
        headers
    }

    fn rows(&self) -> Vec<Vec<String>> {
        let divisional = self.divisional();
        self.teams
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let p = &row.prediction;
                let mut cells = vec![
                    (i + 1).to_string(),
                    row.team_name.clone(),
                    record(p.wins, p.losses, p.ties),
                    format!("{:.2}", p.points_for),
                    format!("{:.1}", p.projected_wins),
                    pct(p.make_playoffs_pct),
                    pct(p.one_seed_pct),
                ];
                if divisional {
                    cells.push(p.division_winner_pct.map(pct).unwrap_or_default());
                }
                cells
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Draft odds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftOddsRow {
    pub roster_id: RosterId,
    pub team_name: String,
    pub eligibility: Eligibility,
    pub most_likely_slot: Option<usize>,
    pub expected_slot: f64,
    pub slots: Vec<f64>,
}

impl DraftOddsRow {
    pub fn new(odds: &DraftSlotOdds, team_name: String) -> Self {
        DraftOddsRow {
            roster_id: odds.roster_id,
            team_name,
            eligibility: odds.eligibility,
            most_likely_slot: odds.most_likely_slot(),
            expected_slot: odds.expected_slot(),
            slots: odds.slots.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftOddsReport {
    pub league: String,
    pub remaining_weeks: i32,
    pub non_playoff_slots: usize,
    pub lottery: bool,
    pub teams: Vec<DraftOddsRow>,
}

impl Tabular for DraftOddsReport {
    fn title(&self) -> String {
        let mode = if self.remaining_weeks > 0 {
            format!("{} weeks left", self.remaining_weeks)
        } else {
            "regular season complete".to_string()
        };
        format!(
            "{} draft odds: {}, {} non-playoff picks{}",
            self.league,
            mode,
            self.non_playoff_slots,
            if self.lottery { ", lottery" } else { "" }
        )
    }

    fn headers(&self) -> Vec<String> {
        let slots = self.teams.first().map_or(0, |t| t.slots.len());
        let mut headers: Vec<String> = ["Team", "Status", "Likely", "Avg"].map(String::from).to_vec();
        headers.extend((1..=slots).map(|s| format!("P{s}")));
        headers
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.teams
            .iter()
            .map(|t| {
                let mut cells = vec![
                    t.team_name.clone(),
                    t.eligibility.label().to_string(),
                    t.most_likely_slot.map(|s| s.to_string()).unwrap_or_default(),
                    format!("{:.2}", t.expected_slot),
                ];
                cells.extend(t.slots.iter().map(|&p| slot_cell(p)));
                cells
            })
            .collect()
    }
}

/// Zero prints blank; floor-level odds print as `<0.1`.
fn slot_cell(value: f64) -> String {
    if value <= 0.0 {
        String::new()
    } else if value < 0.1 {
        "<0.1".to_string()
    } else {
        pct(value)
    }
}
