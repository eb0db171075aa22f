//! Streaming parser for the orientation telemetry text protocol.
//!
//! Wire format (as printed by the IMU module):
//!
//! ```text
//! X: 123.45\tY: 12.30\tZ: -4.10\n
//! └─tag─┘└─value─┘ └─ delimiter: tab or newline
//! ```
//!
//! A field is a candidate sample when its first byte is a known axis tag;
//! the text between the first and second `:` is trimmed and parsed as a
//! float.  Anything else is skipped without disturbing the fields around
//! it.
//!
//! Reads from the transport can end anywhere, including in the middle of a
//! number (`"X: 12"` + `"3.4\t"`).  The parser therefore only ever yields
//! *complete* fields: the unterminated tail of each chunk is kept in a
//! bounded carry-over buffer and completed by the next chunk.  With
//! [`ParserConfig::carry_partial_fields`] off, the tail is dropped instead.
//!
//! A tail that outgrows the buffer is dropped and the parser skips ahead
//! to the next delimiter, so the remainder of that field is never parsed
//! as a field of its own.

use heapless::Vec as FixedVec;
use log::{trace, warn};

use crate::config::ParserConfig;

/// Longest field that can be carried over between reads.  Real fields are
/// well under 32 bytes; a longer tail is line noise.
pub const MAX_PENDING_FIELD: usize = 128;

/// Orientation axis, identified on the wire by its tag letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Yaw / heading.
    X,
    /// Pitch.
    Y,
    /// Roll.
    Z,
}

impl Axis {
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'X' => Some(Self::X),
            b'Y' => Some(Self::Y),
            b'Z' => Some(Self::Z),
            _ => None,
        }
    }

    pub const fn tag(self) -> char {
        match self {
            Self::X => 'X',
            Self::Y => 'Y',
            Self::Z => 'Z',
        }
    }
}

/// One angle reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledSample {
    pub axis: Axis,
    pub value: f64,
}

/// Running counters, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserStats {
    /// Non-empty complete fields examined.
    pub fields: u64,
    /// Samples yielded.
    pub samples: u64,
    /// Fields that were not a valid sample.
    pub skipped: u64,
    /// Valid readings of exactly 0.0 that were suppressed.
    pub zero_suppressed: u64,
    /// Bytes of unterminated tails that were dropped.
    pub discarded_bytes: u64,
}

fn is_delimiter(b: u8) -> bool {
    b == b'\t' || b == b'\n'
}

/// Stateful field parser.  One instance per transport.
pub struct FrameParser {
    config: ParserConfig,
    pending: FixedVec<u8, MAX_PENDING_FIELD>,
    /// Inside an oversized field; drop input up to the next delimiter.
    discarding: bool,
    work: Vec<u8>,
    stats: ParserStats,
}

impl FrameParser {
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            pending: FixedVec::new(),
            discarding: false,
            work: Vec::with_capacity(MAX_PENDING_FIELD + 1024),
            stats: ParserStats::default(),
        }
    }

    /// Feed one chunk and iterate the samples it completes.
    ///
    /// The unterminated tail is stashed (or dropped) before this returns;
    /// dropping the iterator early only loses the complete fields it had
    /// not reached yet.
    pub fn feed(&mut self, data: &[u8]) -> Samples<'_> {
        let data = self.skip_discarded(data);

        self.work.clear();
        self.work.extend_from_slice(&self.pending);
        self.pending.clear();
        self.work.extend_from_slice(data);

        let complete = self
            .work
            .iter()
            .rposition(|b| is_delimiter(*b))
            .map_or(0, |i| i + 1);
        let tail = &self.work[complete..];

        if !tail.is_empty() {
            if !self.config.carry_partial_fields {
                trace!("parser: dropping trailing field ({} bytes)", tail.len());
                self.stats.discarded_bytes += tail.len() as u64;
            } else if self.pending.extend_from_slice(tail).is_err() {
                warn!(
                    "parser: unterminated field exceeds {} bytes, discarding",
                    MAX_PENDING_FIELD
                );
                self.pending.clear();
                self.discarding = true;
                self.stats.discarded_bytes += tail.len() as u64;
            }
        }

        Samples {
            fields: self.work[..complete].split(|b| is_delimiter(*b)),
            suppress_zero: self.config.suppress_zero_readings,
            stats: &mut self.stats,
        }
    }

    /// While discarding, eat `data` up to and including the first
    /// delimiter and return what follows it.
    fn skip_discarded<'d>(&mut self, data: &'d [u8]) -> &'d [u8] {
        if !self.discarding {
            return data;
        }
        match data.iter().position(|b| is_delimiter(*b)) {
            Some(end) => {
                self.discarding = false;
                self.stats.discarded_bytes += end as u64;
                &data[end + 1..]
            }
            None => {
                self.stats.discarded_bytes += data.len() as u64;
                &[]
            }
        }
    }

    /// Forget any carried-over partial field (e.g. after the transport was
    /// reopened and the byte stream restarted).
    pub fn reset(&mut self) {
        self.pending.clear();
        self.discarding = false;
        self.work.clear();
    }

    pub fn set_config(&mut self, config: ParserConfig) {
        if !config.carry_partial_fields {
            self.pending.clear();
            self.discarding = false;
        }
        self.config = config;
    }

    /// Bytes currently waiting for their delimiter.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn stats(&self) -> ParserStats {
        self.stats
    }
}

/// Lazy iterator over the samples completed by one [`FrameParser::feed`].
pub struct Samples<'a> {
    fields: core::slice::Split<'a, u8, fn(&u8) -> bool>,
    suppress_zero: bool,
    stats: &'a mut ParserStats,
}

impl Iterator for Samples<'_> {
    type Item = LabeledSample;

    fn next(&mut self) -> Option<LabeledSample> {
        for field in self.fields.by_ref() {
            if field.is_empty() {
                continue;
            }
            self.stats.fields += 1;
            match parse_field(field) {
                Some(sample) if self.suppress_zero && sample.value == 0.0 => {
                    self.stats.zero_suppressed += 1;
                }
                Some(sample) => {
                    self.stats.samples += 1;
                    return Some(sample);
                }
                None => {
                    self.stats.skipped += 1;
                }
            }
        }
        None
    }
}

/// Parse one complete field.  `None` means "not a sample".
pub fn parse_field(field: &[u8]) -> Option<LabeledSample> {
    let axis = Axis::from_tag(*field.first()?)?;
    let text = core::str::from_utf8(field).ok()?;
    let value: f64 = text.split(':').nth(1)?.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(LabeledSample { axis, value })
}
