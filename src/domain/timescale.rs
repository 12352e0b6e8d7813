// Timescale tokens: "15min", "6H", "3D", "2M"
use super::error::GraphError;
use chrono::TimeDelta;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Minute,
    Hour,
    Day,
    Month,
}

impl TimeUnit {
    /// Unit markers in match order. "min" must be tried before "M" so a
    /// minute token never reads as a month.
    const MARKERS: [(&'static str, TimeUnit); 4] = [
        ("min", TimeUnit::Minute),
        ("H", TimeUnit::Hour),
        ("D", TimeUnit::Day),
        ("M", TimeUnit::Month),
    ];

    /// Length of one unit in minutes. A month is a flat 30 days.
    pub fn minutes(self) -> u64 {
        match self {
            TimeUnit::Minute => 1,
            TimeUnit::Hour => 60,
            TimeUnit::Day => 1_440,
            TimeUnit::Month => 43_200,
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            TimeUnit::Minute => "min",
            TimeUnit::Hour => "H",
            TimeUnit::Day => "D",
            TimeUnit::Month => "M",
        }
    }
}

/// Widest accepted span: 100 years of 365 days. InfluxDB cannot store
/// timestamps much further back than that from the present.
pub const MAX_SPAN_MINUTES: u64 = 100 * 365 * 1_440;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimescaleToken {
    pub magnitude: u32,
    pub unit: TimeUnit,
}

impl TimescaleToken {
    pub fn parse(raw: &str) -> Result<Self, GraphError> {
        let s = raw.trim();

        let (digits, unit) = TimeUnit::MARKERS
            .iter()
            .find_map(|(marker, unit)| s.strip_suffix(marker).map(|d| (d, *unit)))
            .ok_or_else(|| GraphError::invalid_token(s, "expected a min, H, D or M suffix"))?;

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GraphError::invalid_token(
                s,
                format!("'{}' is not a whole number of {}", digits, unit.marker()),
            ));
        }

        let magnitude: u32 = digits
            .parse()
            .map_err(|_| GraphError::invalid_token(s, "magnitude out of range"))?;
        if magnitude == 0 {
            return Err(GraphError::invalid_token(s, "magnitude must be positive"));
        }

        let token = Self { magnitude, unit };
        if token.span_minutes() > MAX_SPAN_MINUTES {
            return Err(GraphError::invalid_token(s, "span longer than 100 years"));
        }
        Ok(token)
    }

    /// Parse a comma and/or whitespace separated list.
    ///
    /// Bad tokens are returned alongside the good ones rather than failing the
    /// list. Repeats of an identical token are dropped.
    pub fn parse_list(list: &str) -> (Vec<TimescaleToken>, Vec<GraphError>) {
        let mut tokens: Vec<TimescaleToken> = Vec::new();
        let mut rejected = Vec::new();

        for part in list
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
        {
            match Self::parse(part) {
                Ok(token) if tokens.contains(&token) => {
                    tracing::debug!("Ignoring repeated timescale {}", token);
                }
                Ok(token) => tokens.push(token),
                Err(e) => rejected.push(e),
            }
        }

        (tokens, rejected)
    }

    pub fn span_minutes(&self) -> u64 {
        u64::from(self.magnitude) * self.unit.minutes()
    }

    pub fn span(&self) -> TimeDelta {
        // parse() caps the span well inside TimeDelta's range
        i64::try_from(self.span_minutes())
            .ok()
            .and_then(TimeDelta::try_minutes)
            .unwrap_or(TimeDelta::MAX)
    }

    /// Orders tokens by how much time they cover, so `60min` and `1H` tie.
    pub fn cmp_span(&self, other: &Self) -> Ordering {
        self.span_minutes().cmp(&other.span_minutes())
    }
}

impl fmt::Display for TimescaleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit.marker())
    }
}
