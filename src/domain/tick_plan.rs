// Time-axis tick selection per timescale
use super::reading::Variant;
use super::style::{RotateTarget, VariantStyle};
use super::timescale::{TimeUnit, TimescaleToken};
use chrono::{NaiveDateTime, TimeDelta, Timelike};

/// Calendar field a locator walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Day,
    Hour,
    Minute,
    Second,
}

/// How a row turns the token magnitude into a locator step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    One,
    Magnitude,
    TwiceMagnitude,
    AdaptiveMinutes,
}

struct ScaleRow {
    unit: TimeUnit,
    major: (Field, Step),
    major_format: &'static str,
    minor: (Field, Step),
    minor_format: &'static str,
}

/// Every tick density and label format decision lives in this table.
const SCALE_TABLE: [ScaleRow; 4] = [
    ScaleRow {
        unit: TimeUnit::Day,
        major: (Field::Day, Step::One),
        major_format: "%m-%d",
        minor: (Field::Hour, Step::Magnitude),
        minor_format: "%-I:%M %p",
    },
    ScaleRow {
        unit: TimeUnit::Hour,
        major: (Field::Hour, Step::One),
        major_format: "%-I %p",
        minor: (Field::Minute, Step::TwiceMagnitude),
        minor_format: "%-I:%M %p",
    },
    ScaleRow {
        unit: TimeUnit::Minute,
        major: (Field::Minute, Step::AdaptiveMinutes),
        major_format: "%-I:%M %p",
        minor: (Field::Second, Step::TwiceMagnitude),
        minor_format: "%-I:%M:%S %p",
    },
    ScaleRow {
        unit: TimeUnit::Month,
        major: (Field::Day, Step::One),
        major_format: "%m-%d",
        minor: (Field::Hour, Step::One),
        minor_format: "%-I:%M %p",
    },
];

/// Upper bound on major ticks for minute scales.
const MAX_MINUTE_TICKS: f64 = 8.0;

/// Largest step that still yields at most eight ticks, halving the tick
/// target until the rounded step is nonzero.
pub fn adaptive_minute_step(magnitude: u32) -> u32 {
    let mut target = MAX_MINUTE_TICKS;
    loop {
        let step = (f64::from(magnitude) / target).round_ties_even();
        if step >= 1.0 {
            return step as u32;
        }
        target /= 2.0;
    }
}

/// Picks timestamps whose field value is a multiple of `step`, within the
/// field's period (so a minute step of 7 ticks at :00, :07 ... :56).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    Days,
    Hours { step: u32 },
    Minutes { step: u32 },
    Seconds { step: u32 },
}

impl Locator {
    fn resolve(field: Field, step: Step, magnitude: u32) -> Self {
        let step = match step {
            Step::One => 1,
            Step::Magnitude => magnitude,
            Step::TwiceMagnitude => magnitude.saturating_mul(2),
            Step::AdaptiveMinutes => adaptive_minute_step(magnitude),
        }
        .max(1);

        match field {
            Field::Day => Locator::Days,
            Field::Hour => Locator::Hours { step },
            Field::Minute => Locator::Minutes { step },
            Field::Second => Locator::Seconds { step },
        }
    }

    fn unit(self) -> TimeDelta {
        match self {
            Locator::Days => TimeDelta::days(1),
            Locator::Hours { .. } => TimeDelta::hours(1),
            Locator::Minutes { .. } => TimeDelta::minutes(1),
            Locator::Seconds { .. } => TimeDelta::seconds(1),
        }
    }

    fn floor(self, t: NaiveDateTime) -> NaiveDateTime {
        let date = t.date();
        let (h, m, s) = (t.hour(), t.minute(), t.second());
        let floored = match self {
            Locator::Days => date.and_hms_opt(0, 0, 0),
            Locator::Hours { .. } => date.and_hms_opt(h, 0, 0),
            Locator::Minutes { .. } => date.and_hms_opt(h, m, 0),
            Locator::Seconds { .. } => date.and_hms_opt(h, m, s),
        };
        floored.unwrap_or(t)
    }

    fn accepts(self, t: NaiveDateTime) -> bool {
        match self {
            Locator::Days => true,
            Locator::Hours { step } => t.hour() % step == 0,
            Locator::Minutes { step } => t.minute() % step == 0,
            Locator::Seconds { step } => t.second() % step == 0,
        }
    }

    /// Tick positions inside `[start, end]`.
    pub fn ticks(self, start: NaiveDateTime, end: NaiveDateTime) -> Vec<NaiveDateTime> {
        let unit = self.unit();
        let mut ticks = Vec::new();
        let mut t = self.floor(start);
        if t < start {
            t += unit;
        }
        while t <= end {
            if self.accepts(t) {
                ticks.push(t);
            }
            t += unit;
        }
        ticks
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSet {
    pub locator: Locator,
    pub format: &'static str,
}

impl TickSet {
    pub fn label(&self, t: NaiveDateTime) -> String {
        t.format(self.format).to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelSizes {
    pub major: f64,
    pub minor: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickRotation {
    pub degrees: f64,
    pub target: RotateTarget,
}

/// Axis decisions for one (timescale, variant) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct TickPlan {
    pub major: TickSet,
    /// Absent for thumbnails.
    pub minor: Option<TickSet>,
    pub rotation: TickRotation,
    pub label_sizes: LabelSizes,
}

impl TickPlan {
    pub fn plan(token: TimescaleToken, variant: Variant, style: &VariantStyle, rotation_degrees: f64) -> Self {
        let row = SCALE_TABLE
            .iter()
            .find(|row| row.unit == token.unit)
            .unwrap_or(&SCALE_TABLE[0]);

        let major = TickSet {
            locator: Locator::resolve(row.major.0, row.major.1, token.magnitude),
            format: row.major_format,
        };
        let minor = match variant {
            Variant::Full => Some(TickSet {
                locator: Locator::resolve(row.minor.0, row.minor.1, token.magnitude),
                format: row.minor_format,
            }),
            Variant::Thumbnail => None,
        };

        tracing::debug!(
            "Tick plan for {} {:?}: major {:?}, minor {:?}",
            token,
            variant,
            major.locator,
            minor.map(|m| m.locator)
        );

        Self {
            major,
            minor,
            rotation: TickRotation {
                degrees: rotation_degrees,
                target: style.rotate,
            },
            label_sizes: LabelSizes {
                major: style.x_major_tick_label_size,
                minor: style.x_minor_tick_label_size,
                value: style.y_tick_label_size,
            },
        }
    }

    pub fn major_ticks(&self, start: NaiveDateTime, end: NaiveDateTime) -> Vec<NaiveDateTime> {
        self.major.locator.ticks(start, end)
    }

    /// Minor positions, minus any that coincide with a major tick.
    pub fn minor_ticks(&self, start: NaiveDateTime, end: NaiveDateTime) -> Vec<NaiveDateTime> {
        let Some(minor) = self.minor else {
            return Vec::new();
        };
        let major = self.major_ticks(start, end);
        minor
            .locator
            .ticks(start, end)
            .into_iter()
            .filter(|t| major.binary_search(t).is_err())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, d)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn plan(token: &str, variant: Variant) -> TickPlan {
        TickPlan::plan(
            TimescaleToken::parse(token).unwrap(),
            variant,
            &VariantStyle::large(),
            45.0,
        )
    }

    #[test]
    fn test_adaptive_minute_step() {
        assert_eq!(adaptive_minute_step(15), 2);
        assert_eq!(adaptive_minute_step(1), 1);
        assert_eq!(adaptive_minute_step(4), 1);
        assert_eq!(adaptive_minute_step(12), 2);
        assert_eq!(adaptive_minute_step(30), 4);
        assert_eq!(adaptive_minute_step(60), 8);
    }

    #[test]
    fn test_fifteen_minutes_gets_at_most_eight_major_ticks() {
        let plan = plan("15min", Variant::Full);
        let Locator::Minutes { step } = plan.major.locator else {
            panic!("expected a minute locator, got {:?}", plan.major.locator);
        };
        assert!(step == 2 || step == 3);

        let end = at(3, 14, 37, 12);
        let ticks = plan.major_ticks(end - TimeDelta::minutes(15), end);
        assert!(!ticks.is_empty() && ticks.len() <= 8, "{} ticks", ticks.len());
    }

    #[test]
    fn test_day_scale_table_row() {
        let plan = plan("3D", Variant::Full);
        assert_eq!(plan.major.locator, Locator::Days);
        assert_eq!(plan.major.format, "%m-%d");
        assert_eq!(plan.minor.unwrap().locator, Locator::Hours { step: 3 });

        let end = at(10, 12, 0, 0);
        let days = plan.major_ticks(end - TimeDelta::days(3), end);
        assert_eq!(days, vec![at(8, 0, 0, 0), at(9, 0, 0, 0), at(10, 0, 0, 0)]);
    }

    #[test]
    fn test_hour_scale_table_row() {
        let plan = plan("6H", Variant::Full);
        assert_eq!(plan.major.locator, Locator::Hours { step: 1 });
        assert_eq!(plan.minor.unwrap().locator, Locator::Minutes { step: 12 });

        let end = at(10, 12, 30, 0);
        let minor = plan.minor_ticks(end - TimeDelta::hours(1), end);
        // 11:36, 11:48, 12:12, 12:24; 12:00 belongs to the major set
        assert_eq!(
            minor,
            vec![at(10, 11, 36, 0), at(10, 11, 48, 0), at(10, 12, 12, 0), at(10, 12, 24, 0)]
        );
    }

    #[test]
    fn test_minute_minor_ticks_are_seconds() {
        let plan = plan("15min", Variant::Full);
        assert_eq!(plan.minor.unwrap().locator, Locator::Seconds { step: 30 });
    }

    #[test]
    fn test_month_reuses_day_formatting() {
        let month = plan("2M", Variant::Full);
        let day = plan("2D", Variant::Full);
        assert_eq!(month.major, day.major);
        assert_eq!(month.minor.unwrap().locator, Locator::Hours { step: 1 });
    }

    #[test]
    fn test_thumbnails_have_no_minor_ticks() {
        for token in ["15min", "6H", "3D", "2M"] {
            let plan = plan(token, Variant::Thumbnail);
            assert!(plan.minor.is_none(), "{token}");
            let end = at(10, 0, 0, 0);
            assert!(plan.minor_ticks(end - TimeDelta::hours(6), end).is_empty());
        }
    }

    #[test]
    fn test_step_beyond_field_period_ticks_on_the_hour() {
        // 45min: minor step of 90 seconds only matches :00
        let locator = Locator::Seconds { step: 90 };
        let ticks = locator.ticks(at(1, 9, 0, 30), at(1, 9, 3, 0));
        assert_eq!(ticks, vec![at(1, 9, 1, 0), at(1, 9, 2, 0), at(1, 9, 3, 0)]);
    }

    #[test]
    fn test_labels() {
        let plan = plan("6H", Variant::Full);
        assert_eq!(plan.major.label(at(1, 15, 0, 0)), "3 PM");
        assert_eq!(plan.minor.unwrap().label(at(1, 9, 12, 0)), "9:12 AM");
    }

    #[test]
    fn test_plan_is_deterministic() {
        assert_eq!(plan("6H", Variant::Full), plan("6H", Variant::Full));
    }
}
