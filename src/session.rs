//! Analysis sessions
//!
//! An [`AnalysisSession`] pairs a window with the result of analyzing it.
//! It is created empty, populated exactly once, and read-only afterwards;
//! the cross-period aggregator and the output formatters only ever see it
//! through shared references.

use crate::analyzer::{CategorySummary, MatchedRecord, PeriodAnalysis, analyze};
use crate::error::{Result, SpendstatError};
use crate::types::{Record, Window};
use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, info};

/// One window and, once analyzed, its result tables
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    window: Window,
    analysis: Option<PeriodAnalysis>,
}

impl AnalysisSession {
    /// Create an unanalyzed session for a window
    pub fn new(window: Window) -> Self {
        Self {
            window,
            analysis: None,
        }
    }

    /// The window this session covers
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Window label
    pub fn label(&self) -> &str {
        self.window.label()
    }

    /// First day of the window
    pub fn start(&self) -> NaiveDate {
        self.window.start()
    }

    /// Last day of the window
    pub fn end(&self) -> NaiveDate {
        self.window.end()
    }

    /// Whether the result tables have been populated
    pub fn is_analyzed(&self) -> bool {
        self.analysis.is_some()
    }

    /// Run the period analysis for this session's window
    ///
    /// Fails with `SessionAlreadyAnalyzed` on a second call; the first
    /// result is kept.
    pub fn populate(&mut self, records: &[Record]) -> Result<()> {
        if self.analysis.is_some() {
            return Err(SpendstatError::SessionAlreadyAnalyzed(
                self.label().to_string(),
            ));
        }
        self.analysis = Some(analyze(records, &self.window)?);
        Ok(())
    }

    /// Result tables, if analyzed
    pub fn analysis(&self) -> Option<&PeriodAnalysis> {
        self.analysis.as_ref()
    }

    /// Result tables, or `SessionNotAnalyzed`
    pub fn require_analysis(&self) -> Result<&PeriodAnalysis> {
        self.analysis
            .as_ref()
            .ok_or_else(|| SpendstatError::SessionNotAnalyzed(self.label().to_string()))
    }

    /// Finished records overlapping the window
    pub fn matched(&self) -> Option<&[MatchedRecord]> {
        self.analysis.as_ref().map(PeriodAnalysis::matched)
    }

    /// Unfinished records overlapping the window
    pub fn unfinished(&self) -> Option<&[Record]> {
        self.analysis.as_ref().map(PeriodAnalysis::unfinished)
    }

    /// Cost in window per category
    pub fn summary(&self) -> Option<&CategorySummary> {
        self.analysis.as_ref().map(PeriodAnalysis::summary)
    }
}

/// Analyze every window against the same record set
///
/// Sessions come back in window order. With `parallel` the windows are
/// analyzed on the rayon pool; results are identical to the sequential run.
pub fn analyze_windows(
    records: &[Record],
    windows: impl IntoIterator<Item = Window>,
    parallel: bool,
) -> Result<Vec<AnalysisSession>> {
    let mut sessions: Vec<AnalysisSession> = windows.into_iter().map(AnalysisSession::new).collect();

    info!(
        "Analyzing {} records across {} windows",
        records.len(),
        sessions.len()
    );

    if parallel {
        debug!("Using parallel window analysis");
        sessions
            .par_iter_mut()
            .try_for_each(|session| session.populate(records))?;
    } else {
        for session in &mut sessions {
            session.populate(records)?;
        }
    }

    Ok(sessions)
}
