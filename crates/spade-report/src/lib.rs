//! CSV exports for Spade sessions.
//!
//! Renders [`SessionReport`]s built by a [`spade_core::store::ControlStore`].
//! Pure synchronous; no HTTP or database dependencies.

pub mod error;
mod render;

pub use error::{Error, Result};
use spade_core::report::SessionReport;

/// One session: an information block followed by its tracked actions, with
/// custom actions sourced as `Custom (Session)`.
pub fn render_session_csv(report: &SessionReport) -> Result<String> {
  render::session_csv(report)
}

/// A summary row per session, then every tracked action flattened into one
/// detail table.
pub fn render_all_csv(reports: &[SessionReport]) -> Result<String> {
  render::all_sessions_csv(reports)
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone, Utc};
  use spade_core::{
    action::TrackedAction,
    report::ReportedAction,
    session::{GameSession, SessionStatus},
  };
  use uuid::Uuid;

  use super::*;

  fn session(name: Option<&str>) -> GameSession {
    let start = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
    let mut s = GameSession::start(Uuid::new_v4(), name.map(String::from), start);
    s.user_score = 6;
    s.llm_score = 0;
    s
  }

  fn action(
    session_id: Uuid,
    library: Option<&str>,
    local: Option<&str>,
    user_movement: i64,
    llm_movement: i64,
  ) -> ReportedAction {
    ReportedAction {
      action:              TrackedAction {
        action_id: Uuid::new_v4(),
        session_id,
        library_id: library.map(|_| Uuid::new_v4()),
        action_description: local.map(String::from),
        user_movement,
        llm_movement,
      },
      library_description: library.map(String::from),
    }
  }

  fn scenario() -> SessionReport {
    let mut s = session(Some("Essay"));
    s.status = SessionStatus::Ended;
    s.end_time = Some(s.start_time + Duration::seconds(750));
    let id = s.session_id;
    SessionReport {
      session: s,
      actions: vec![
        action(id, None, Some("Wrote the intro, then asked for review"), 4, -1),
        action(id, Some("Asked AI to critique my work"), None, 2, 1),
      ],
    }
  }

  fn lines(csv: &str) -> Vec<&str> { csv.split("\r\n").collect() }

  #[test]
  fn single_session_layout() {
    let report = scenario();
    let csv = render_session_csv(&report).unwrap();
    let lines = lines(&csv);

    assert_eq!(lines[0], "Session Information");
    assert_eq!(lines[1], format!("Session ID,{}", report.session.session_id));
    assert_eq!(lines[2], "Session Name,Essay");
    assert_eq!(lines[3], "Start Time,2025-03-01T09:00:00Z");
    assert_eq!(lines[4], "End Time,2025-03-01T09:12:30Z");
    assert_eq!(lines[5], "Status,ended");
    assert_eq!(lines[6], "Final User Score,6");
    assert_eq!(lines[7], "Final LLM Score,0");
    assert_eq!(lines[8], "");
    assert_eq!(lines[9], "Actions Tracked");
    assert_eq!(lines[10], "Action ID,Description,User Points,LLM Points,Source");
    assert!(lines[11].ends_with(",\"Wrote the intro, then asked for review\",4,-1,Custom (Session)"));
    assert!(lines[12].ends_with(",Asked AI to critique my work,2,1,Library"));
    assert_eq!(lines[13], "");
    assert_eq!(lines.len(), 14);
  }

  #[test]
  fn action_rows_match_tracked_count() {
    let report = scenario();
    let csv = render_session_csv(&report).unwrap();
    let header = lines(&csv)
      .iter()
      .position(|l| l.starts_with("Action ID,"))
      .unwrap();
    let rows = lines(&csv)[header + 1..]
      .iter()
      .filter(|l| !l.is_empty())
      .count();
    assert_eq!(rows, report.action_count());
  }

  #[test]
  fn open_unnamed_session_uses_placeholders() {
    let report = SessionReport { session: session(None), actions: vec![] };
    let csv = render_session_csv(&report).unwrap();
    assert!(csv.contains("Session Name,Unnamed\r\n"));
    assert!(csv.contains("End Time,Ongoing\r\n"));
    assert!(csv.ends_with("Action ID,Description,User Points,LLM Points,Source\r\n"));
  }

  #[test]
  fn missing_descriptions_fall_back() {
    let mut report = scenario();
    let id = report.session.session_id;
    report.actions = vec![action(id, None, None, 1, 0), {
      let mut dangling = action(id, Some("gone"), None, 0, 1);
      dangling.library_description = None;
      dangling
    }];

    let csv = render_session_csv(&report).unwrap();
    assert!(csv.contains(",Custom,1,0,Custom (Session)\r\n"));
    assert!(csv.contains(",Unknown,0,1,Library\r\n"));
  }

  #[test]
  fn all_sessions_layout() {
    let ended = scenario();
    let open = SessionReport { session: session(None), actions: vec![] };
    let csv = render_all_csv(&[open.clone(), ended.clone()]).unwrap();
    let lines = lines(&csv);

    assert_eq!(lines[0], "All Sessions Summary");
    assert_eq!(
      lines[1],
      "Session ID,Session Name,Start Time,End Time,Status,User Score,LLM Score,Duration (minutes),Total Actions"
    );
    assert_eq!(
      lines[2],
      format!(
        "{},Unnamed,2025-03-01T09:00:00Z,Ongoing,active,6,0,,0",
        open.session.session_id
      )
    );
    assert_eq!(
      lines[3],
      format!(
        "{},Essay,2025-03-01T09:00:00Z,2025-03-01T09:12:30Z,ended,6,0,12.5,2",
        ended.session.session_id
      )
    );
    assert_eq!(lines[4], "");
    assert_eq!(lines[5], "");
    assert_eq!(lines[6], "Detailed Action Log");
    assert_eq!(
      lines[7],
      "Session ID,Session Name,Action ID,Description,User Points,LLM Points,Source"
    );
    assert!(lines[8].starts_with(&format!("{},Essay,", ended.session.session_id)));
    assert!(lines[8].ends_with(",4,-1,Custom"));
    assert!(lines[9].ends_with(",Asked AI to critique my work,2,1,Library"));
    assert_eq!(lines.len(), 11);
  }

  #[test]
  fn whole_minute_duration_keeps_one_decimal() {
    let mut s = session(Some("Short"));
    s.status = SessionStatus::Ended;
    s.end_time = Some(s.start_time + Duration::minutes(3));
    let csv = render_all_csv(&[SessionReport { session: s, actions: vec![] }]).unwrap();
    assert!(csv.contains(",ended,6,0,3.0,0\r\n"));
  }

  #[test]
  fn no_sessions_still_has_both_headers() {
    let csv = render_all_csv(&[]).unwrap();
    assert!(csv.starts_with("All Sessions Summary\r\n"));
    assert!(csv.ends_with("Detailed Action Log\r\nSession ID,Session Name,Action ID,Description,User Points,LLM Points,Source\r\n"));
  }
}
