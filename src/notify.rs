//! Winner Notices
//!
//! Formats per-participant summaries into notices and hands them to a sink.
//! Delivery failures are logged and skipped so one bad address never blocks
//! the rest of the winners.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::squares::{aggregate, ParticipantPrizeSummary, Resolver, ScoreEvent};
use crate::store::{PoolStore, TeamNames};

pub fn quarter_name(quarter: u8) -> &'static str {
    match quarter {
        1 => "1st Quarter",
        2 => "2nd Quarter",
        3 => "3rd Quarter",
        4 => "4th Quarter/Final",
        _ => "Quarter",
    }
}

/// Ready-to-send message for one winner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerNotice {
    pub participant_id: String,
    pub participant_name: String,
    pub total_prize: u64,
    pub subject: String,
    pub body: String,
}

impl WinnerNotice {
    pub fn build(summary: &ParticipantPrizeSummary, score: &ScoreEvent, teams: &TeamNames) -> Self {
        let quarter = quarter_name(score.quarter);
        let greeting_name = if summary.participant_name.is_empty() {
            summary.participant_id.as_str()
        } else {
            summary.participant_name.as_str()
        };

        let subject = format!(
            "Congratulations! You won ${} in {}!",
            summary.total_prize, quarter
        );

        let mut lines = vec![
            format!("Congratulations, {}!", greeting_name),
            format!("You won ${}!", summary.total_prize),
            String::new(),
            format!("{} Results", quarter),
            format!(
                "{}: {} | {}: {}",
                teams.home, score.home_score, teams.away, score.away_score
            ),
            format!(
                "Winning numbers: {} - {}",
                score.home_digit(),
                score.away_digit()
            ),
            String::new(),
            "Your Winning Squares:".to_string(),
        ];
        lines.extend(summary.entries.iter().map(|entry| {
            format!(
                "- {} (row {}, col {}): ${}",
                entry.label, entry.row, entry.col, entry.prize
            )
        }));
        lines.push(String::new());
        lines.push("Contact the game administrator to collect your winnings.".to_string());
        let body = lines.join("\n");

        Self {
            participant_id: summary.participant_id.clone(),
            participant_name: summary.participant_name.clone(),
            total_prize: summary.total_prize,
            subject,
            body,
        }
    }
}

/// Delivery channel for winner notices
pub trait NoticeSink {
    fn deliver(&mut self, notice: &WinnerNotice) -> Result<()>;
}

/// Writes notices to the log instead of sending them anywhere
#[derive(Debug, Default)]
pub struct LogSink;

impl NoticeSink for LogSink {
    fn deliver(&mut self, notice: &WinnerNotice) -> Result<()> {
        info!(
            participant = %notice.participant_id,
            total_prize = notice.total_prize,
            "🏆 {}",
            notice.subject
        );
        Ok(())
    }
}

/// Outcome of one dispatch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub success: bool,
    pub message: String,
    pub notices_sent: usize,
    pub total_winners: usize,
}

/// Build and deliver one notice per summary
pub fn dispatch<S>(
    summaries: &[ParticipantPrizeSummary],
    score: &ScoreEvent,
    teams: &TeamNames,
    sink: &mut S,
) -> DispatchReport
where
    S: NoticeSink + ?Sized,
{
    if summaries.is_empty() {
        info!(quarter = score.quarter, "No winners found for quarter");
        return DispatchReport {
            success: true,
            message: "No winners to notify".to_string(),
            notices_sent: 0,
            total_winners: 0,
        };
    }

    let mut notices_sent = 0;
    for summary in summaries {
        let notice = WinnerNotice::build(summary, score, teams);
        match sink.deliver(&notice) {
            Ok(()) => {
                notices_sent += 1;
                info!(
                    "Winner notice sent to {} for ${}",
                    notice.participant_id, notice.total_prize
                );
            }
            Err(e) => {
                error!(
                    "Failed to deliver notice to {}: {:#}",
                    notice.participant_id, e
                );
            }
        }
    }

    DispatchReport {
        success: true,
        message: format!("Winner notifications sent for Q{}", score.quarter),
        notices_sent,
        total_winners: summaries.len(),
    }
}

/// Matched winners of one quarter and the outcome of notifying them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterWinners {
    pub summaries: Vec<ParticipantPrizeSummary>,
    pub report: DispatchReport,
}

impl QuarterWinners {
    fn skipped(success: bool, message: &str) -> Self {
        Self {
            summaries: Vec::new(),
            report: DispatchReport {
                success,
                message: message.to_string(),
                notices_sent: 0,
                total_winners: 0,
            },
        }
    }
}

/// Full quarter flow: active board -> winning cells -> claims -> summaries -> notices.
///
/// A missing board or one the resolver rejects is reported, not raised; only
/// storage failures are errors. With `dry_run` the summaries are computed but
/// nothing reaches the sink.
pub fn notify_winners<S>(
    store: &PoolStore,
    resolver: &Resolver,
    score: &ScoreEvent,
    sink: &mut S,
    dry_run: bool,
) -> Result<QuarterWinners>
where
    S: NoticeSink + ?Sized,
{
    let Some(board) = store.active_board()? else {
        info!("No active board numbers found - skipping winner notifications");
        return Ok(QuarterWinners::skipped(true, "No board numbers set yet"));
    };

    let cells = match resolver.resolve(score, &board.home_numbers, &board.away_numbers) {
        Ok(cells) => cells,
        Err(e) => {
            warn!(quarter = score.quarter, "⚠️  {}", e);
            return Ok(QuarterWinners::skipped(
                false,
                "Invalid board numbers configuration",
            ));
        }
    };

    let claims = store.claims_for_quarter(score.quarter)?;
    let summaries = aggregate(&cells, &claims);

    let report = if dry_run {
        DispatchReport {
            success: true,
            message: "Dry run - no notices sent".to_string(),
            notices_sent: 0,
            total_winners: summaries.len(),
        }
    } else {
        let teams = store.team_names()?;
        dispatch(&summaries, score, &teams, sink)
    };

    Ok(QuarterWinners { summaries, report })
}
