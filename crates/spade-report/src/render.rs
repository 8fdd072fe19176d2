//! CSV writers for the two export shapes.
//!
//! Both shapes are several tables stacked in one file, so rows have differing
//! widths and the writer is built `flexible`. Lines end in CRLF.

use chrono::{DateTime, SecondsFormat, Utc};
use spade_core::{
  report::{ActionSource, ReportedAction, SessionReport},
  session::GameSession,
};

use crate::error::Result;

const UNNAMED: &str = "Unnamed";
const ONGOING: &str = "Ongoing";

// ─── Sheet ───────────────────────────────────────────────────────────────────

/// A flexible CSV writer over an in-memory buffer that can also emit empty
/// separator lines.
struct Sheet {
  wtr: csv::Writer<Vec<u8>>,
}

impl Sheet {
  fn new() -> Self { Self { wtr: Self::writer(Vec::new()) } }

  fn writer(buf: Vec<u8>) -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
      .flexible(true)
      .terminator(csv::Terminator::CRLF)
      .from_writer(buf)
  }

  fn row<I, T>(&mut self, fields: I) -> Result<()>
  where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
  {
    self.wtr.write_record(fields)?;
    Ok(())
  }

  /// An empty line. The csv crate would quote an empty record, so the
  /// terminator goes straight into the buffer.
  fn blank(&mut self) -> Result<()> {
    let wtr = std::mem::replace(&mut self.wtr, Self::writer(Vec::new()));
    let mut buf = wtr.into_inner().map_err(|e| e.into_error())?;
    buf.extend_from_slice(b"\r\n");
    self.wtr = Self::writer(buf);
    Ok(())
  }

  fn finish(self) -> Result<String> {
    let bytes = self.wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
  }
}

// ─── Field formatting ────────────────────────────────────────────────────────

fn fmt_time(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Secs, true) }

fn session_name(session: &GameSession) -> &str {
  session.session_name.as_deref().unwrap_or(UNNAMED)
}

fn end_time(session: &GameSession) -> String {
  session.end_time.map(fmt_time).unwrap_or_else(|| ONGOING.to_string())
}

/// Minutes to one decimal place, blank while the session is open.
fn duration(session: &GameSession) -> String {
  session
    .duration_minutes()
    .map(|m| format!("{m:.1}"))
    .unwrap_or_default()
}

fn single_source(action: &ReportedAction) -> &'static str {
  match action.source() {
    ActionSource::Library => "Library",
    ActionSource::Custom => "Custom (Session)",
  }
}

fn summary_source(action: &ReportedAction) -> &'static str {
  match action.source() {
    ActionSource::Library => "Library",
    ActionSource::Custom => "Custom",
  }
}

// ─── Single session ──────────────────────────────────────────────────────────

pub(crate) fn session_csv(report: &SessionReport) -> Result<String> {
  let s = &report.session;
  let mut sheet = Sheet::new();

  sheet.row(["Session Information"])?;
  sheet.row(["Session ID".to_string(), s.session_id.to_string()])?;
  sheet.row(["Session Name", session_name(s)])?;
  sheet.row(["Start Time".to_string(), fmt_time(s.start_time)])?;
  sheet.row(["End Time".to_string(), end_time(s)])?;
  sheet.row(["Status", s.status.as_str()])?;
  sheet.row(["Final User Score".to_string(), s.user_score.to_string()])?;
  sheet.row(["Final LLM Score".to_string(), s.llm_score.to_string()])?;
  sheet.blank()?;

  sheet.row(["Actions Tracked"])?;
  sheet.row(["Action ID", "Description", "User Points", "LLM Points", "Source"])?;
  for a in &report.actions {
    sheet.row([
      a.action.action_id.to_string(),
      a.description().to_string(),
      a.action.user_movement.to_string(),
      a.action.llm_movement.to_string(),
      single_source(a).to_string(),
    ])?;
  }

  sheet.finish()
}

// ─── All sessions ────────────────────────────────────────────────────────────

pub(crate) fn all_sessions_csv(reports: &[SessionReport]) -> Result<String> {
  let mut sheet = Sheet::new();

  sheet.row(["All Sessions Summary"])?;
  sheet.row([
    "Session ID",
    "Session Name",
    "Start Time",
    "End Time",
    "Status",
    "User Score",
    "LLM Score",
    "Duration (minutes)",
    "Total Actions",
  ])?;
  for r in reports {
    let s = &r.session;
    sheet.row([
      s.session_id.to_string(),
      session_name(s).to_string(),
      fmt_time(s.start_time),
      end_time(s),
      s.status.as_str().to_string(),
      s.user_score.to_string(),
      s.llm_score.to_string(),
      duration(s),
      r.action_count().to_string(),
    ])?;
  }
  sheet.blank()?;
  sheet.blank()?;

  sheet.row(["Detailed Action Log"])?;
  sheet.row([
    "Session ID",
    "Session Name",
    "Action ID",
    "Description",
    "User Points",
    "LLM Points",
    "Source",
  ])?;
  for r in reports {
    let s = &r.session;
    for a in &r.actions {
      sheet.row([
        s.session_id.to_string(),
        session_name(s).to_string(),
        a.action.action_id.to_string(),
        a.description().to_string(),
        a.action.user_movement.to_string(),
        a.action.llm_movement.to_string(),
        summary_source(a).to_string(),
      ])?;
    }
  }

  sheet.finish()
}
