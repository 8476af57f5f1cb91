//! History export: one CSV row per timeline event.

use crate::models::{HistoryEvent, HistoryKind};
use serde::Serialize;

#[derive(Serialize)]
struct HistoryRow<'a> {
    seq: u64,
    at: String,
    kind: &'static str,
    player: &'a str,
    trick: &'a str,
    detail: String,
}

impl<'a> HistoryRow<'a> {
    fn from_event(event: &'a HistoryEvent) -> Self {
        let (player, trick, detail) = match &event.kind {
            HistoryKind::SetAttempt { player_name, trick, landed, .. }
            | HistoryKind::DefenseAttempt { player_name, trick, landed, .. } => (
                player_name.as_str(),
                trick.as_str(),
                if *landed { "landed".to_string() } else { "missed".to_string() },
            ),
            HistoryKind::LetterAssigned { player_name, letter, letter_count, eliminated, .. } => {
                let mut detail = format!("{} ({}/5)", letter, letter_count);
                if *eliminated {
                    detail.push_str(" eliminated");
                }
                (player_name.as_str(), "", detail)
            }
            HistoryKind::RoundClosed { trick, next_setter_name, .. } => (
                "",
                trick.as_str(),
                match next_setter_name {
                    Some(name) => format!("next setter {}", name),
                    None => "game over".to_string(),
                },
            ),
        };
        Self {
            seq: event.seq,
            at: event.at.to_rfc3339(),
            kind: event.kind_name(),
            player,
            trick,
            detail,
        }
    }
}

/// Render the history as CSV with a header row: seq, at, kind, player, trick, detail.
pub fn history_to_csv(events: &[HistoryEvent]) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for event in events {
        writer.serialize(HistoryRow::from_event(event))?;
    }
    let bytes = writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
