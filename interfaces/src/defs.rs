use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// One configured syndication feed: the label shown to readers and where to fetch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSourceSpec {
    pub category: String,
    pub url: String,
}

impl FeedSourceSpec {
    pub fn new(category: &str, url: &str) -> Self {
        Self {
            category: category.to_string(),
            url: url.to_string(),
        }
    }
}

/// Calendar fields of an instant already split by the feed library, read as UTC wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl CalendarTime {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        Self { year, month, day, hour, minute, second }
    }

    /// `None` when the fields do not name a real calendar instant (month 13, Feb 30, ...).
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        let naive = NaiveDate::from_ymd_opt(self.year, self.month, self.day)?
            .and_hms_opt(self.hour, self.minute, self.second)?;
        Some(Utc.from_utc_datetime(&naive))
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for CalendarTime {
    fn from(value: DateTime<Tz>) -> Self {
        use chrono::{Datelike, Timelike};
        let utc = value.with_timezone(&Utc);
        Self {
            year: utc.year(),
            month: utc.month(),
            day: utc.day(),
            hour: utc.hour(),
            minute: utc.minute(),
            second: utc.second(),
        }
    }
}

/// A feed entry as handed over by the feed library. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub published: Option<String>,
    pub published_parsed: Option<CalendarTime>,
    pub summary: Option<String>,
    pub content: Vec<String>,
}

/// A normalized, deduplicated feed entry ready for summarization.
///
/// Only the ingestor builds these; by then `published` is UTC and title, link and summary
/// are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub published: DateTime<Utc>,
    pub summary: String,
    pub category: Option<String>,
}

/// The rendered digest plus the subject line used when mailing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestOutput {
    pub subject: String,
    pub text: String,
}
