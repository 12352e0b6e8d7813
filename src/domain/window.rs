// Fetch window covering the widest requested timescale
use super::error::GraphError;
use super::timescale::TimescaleToken;
use chrono::NaiveDateTime;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// The token that set the window width.
    pub widest: TimescaleToken,
}

impl WindowSpec {
    /// One window wide enough for every token, ending at `now`. When two
    /// tokens cover the same span the first one listed wins.
    pub fn resolve(tokens: &[TimescaleToken], now: NaiveDateTime) -> Result<Self, GraphError> {
        let widest = tokens
            .iter()
            .copied()
            .reduce(|best, t| match t.cmp_span(&best) {
                Ordering::Greater => t,
                _ => best,
            })
            .ok_or(GraphError::NoTokens)?;

        let start = now
            .checked_sub_signed(widest.span())
            .ok_or_else(|| {
                GraphError::invalid_token(&widest.to_string(), "window starts before the earliest date")
            })?;

        tracing::debug!("Resolved fetch window {} .. {} from {}", start, now, widest);

        Ok(Self {
            start,
            end: now,
            widest,
        })
    }
}
