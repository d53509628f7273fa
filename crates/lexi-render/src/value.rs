// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Field values handed out by a [`crate::FieldAccessor`].
use std::collections::BTreeMap;
use std::fmt;

use crate::ident::{Guid, ObjectId};

/// A run of text in one writing system, optionally linking to an object.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Run {
    /// The text.
    pub text: String,
    /// Writing-system id of the run.
    pub ws: String,
    /// Object the run hyperlinks to, if any.
    pub link: Option<Guid>,
}

/// Formatted text: an ordered list of [`Run`]s.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TsString {
    /// Runs in display order.
    pub runs: Vec<Run>,
}

impl TsString {
    /// Single unlinked run.
    pub fn plain(text: impl Into<String>, ws: impl Into<String>) -> Self {
        Self {
            runs: vec![Run {
                text: text.into(),
                ws: ws.into(),
                link: None,
            }],
        }
    }

    /// Concatenated text of every run.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// `true` when no run carries any text.
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.is_empty())
    }

    /// Writing system of the first non-empty run.
    pub fn first_ws(&self) -> Option<&str> {
        self.runs
            .iter()
            .find(|r| !r.text.is_empty())
            .map(|r| r.ws.as_str())
    }
}

/// One [`TsString`] alternative per writing system.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MultiString {
    alternatives: BTreeMap<String, TsString>,
}

impl MultiString {
    /// Empty multi-string.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Self::set`] for a plain-text alternative.
    pub fn with(mut self, ws: impl Into<String>, text: impl Into<String>) -> Self {
        let ws = ws.into();
        let value = TsString::plain(text, ws.clone());
        self.set(ws, value);
        self
    }

    /// Replaces the alternative for `ws`.
    pub fn set(&mut self, ws: impl Into<String>, value: TsString) {
        self.alternatives.insert(ws.into(), value);
    }

    /// Alternative for `ws`, if present and non-empty.
    pub fn get(&self, ws: &str) -> Option<&TsString> {
        self.alternatives.get(ws).filter(|t| !t.is_empty())
    }

    /// `true` when every alternative is empty.
    pub fn is_empty(&self) -> bool {
        self.alternatives.values().all(TsString::is_empty)
    }

    /// Alternatives ordered by writing-system id.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TsString)> + '_ {
        self.alternatives.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Plain calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CalendarDate {
    /// Year.
    pub year: i32,
    /// Month, 1-based.
    pub month: u8,
    /// Day of month, 1-based.
    pub day: u8,
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// How exact a [`GenDate`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenDatePrecision {
    /// Known date.
    #[default]
    Exact,
    /// Approximately this date.
    Approximate,
    /// Some time before this date.
    Before,
    /// Some time after this date.
    After,
}

/// A "generic" date of uneven precision: year only, month and year, or a
/// full date, possibly BC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenDate {
    /// Precision qualifier.
    pub precision: GenDatePrecision,
    /// Year, always positive; see `is_ad`.
    pub year: u32,
    /// Month, 1-based.
    pub month: Option<u8>,
    /// Day, 1-based; only meaningful with a month.
    pub day: Option<u8>,
    /// `false` for BC dates.
    pub is_ad: bool,
}

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

impl fmt::Display for GenDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.precision {
            GenDatePrecision::Exact => {}
            GenDatePrecision::Approximate => f.write_str("About ")?,
            GenDatePrecision::Before => f.write_str("Before ")?,
            GenDatePrecision::After => f.write_str("After ")?,
        }
        let month = self
            .month
            .and_then(|m| MONTHS.get(usize::from(m).checked_sub(1)?));
        match (self.day, month) {
            (Some(day), Some(month)) => write!(f, "{day} {month} ")?,
            (None, Some(month)) => write!(f, "{month} ")?,
            _ => {}
        }
        write!(f, "{}", self.year)?;
        if !self.is_ad {
            f.write_str(" BC")?;
        }
        Ok(())
    }
}

/// Reference to a media file as stored in the lexicon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    /// The file object.
    pub id: ObjectId,
    /// Path as recorded in the store (usually relative to the media root).
    pub path: String,
}

impl FileRef {
    /// Lower-cased extension of `path`, without the dot.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.path)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }
}

/// A field value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    /// Unset.
    #[default]
    Null,
    /// Atomic object reference.
    Object(ObjectId),
    /// Ordered objects.
    Sequence(Vec<ObjectId>),
    /// Unordered objects.
    Collection(Vec<ObjectId>),
    /// Plain string.
    String(String),
    /// Integer.
    Integer(i64),
    /// Boolean.
    Boolean(bool),
    /// Calendar date.
    Date(CalendarDate),
    /// Generic date.
    GenDate(GenDate),
    /// Formatted text.
    Rich(TsString),
    /// Text per writing system.
    Multi(MultiString),
    /// Structured text: one formatted string per paragraph.
    Paragraphs(Vec<TsString>),
    /// Media file.
    File(FileRef),
}

impl Value {
    /// `true` when the value would render nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Sequence(v) | Self::Collection(v) => v.is_empty(),
            Self::String(s) => s.is_empty(),
            Self::Rich(t) => t.is_empty(),
            Self::Multi(m) => m.is_empty(),
            Self::Paragraphs(p) => p.iter().all(TsString::is_empty),
            Self::File(f) => f.path.is_empty(),
            Self::Object(_)
            | Self::Integer(_)
            | Self::Boolean(_)
            | Self::Date(_)
            | Self::GenDate(_) => false,
        }
    }

    /// The referenced objects of an atomic, sequence, or collection value.
    pub fn objects(&self) -> &[ObjectId] {
        match self {
            Self::Object(o) => std::slice::from_ref(o),
            Self::Sequence(v) | Self::Collection(v) => v,
            _ => &[],
        }
    }
}
