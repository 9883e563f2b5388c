use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, info, trace, warn};
use ndarray::{Array4, ArrayViewMut2, s};

use super::error::{Result, SphError};
use super::model::{Component, allocate_coefficients};

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// First line of an sph file: `<int> <bitstring> <int> <bitstring>`.
///
/// Only the bit-strings are authoritative: the count of `'1'`s in
/// `degree_mask` is one more than the highest degree present, and the count
/// in `knot_mask` is the number of knots present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SphHeader {
    pub degree_in_file: usize,
    pub degree_mask: String,
    pub knots_in_file: usize,
    pub knot_mask: String,
}

impl SphHeader {
    pub fn parse(text: &str, line: usize) -> Result<Self> {
        let fields: Vec<&str> = text.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(SphError::format(
                line,
                format!("header needs 4 fields, found {}", fields.len()),
            ));
        }
        let integer = |field: &str, name: &str| {
            field.parse::<usize>().map_err(|_| {
                SphError::format(line, format!("header {name} '{field}' is not an integer"))
            })
        };

        let header = SphHeader {
            degree_in_file: integer(fields[0], "degree")?,
            degree_mask: fields[1].to_string(),
            knots_in_file: integer(fields[2], "knot count")?,
            knot_mask: fields[3].to_string(),
        };
        match header.used_degree() {
            None => Err(SphError::format(
                line,
                format!("degree bit-string '{}' marks no active degrees", header.degree_mask),
            )),
            Some(used) if used > header.degree_in_file => Err(SphError::format(
                line,
                format!(
                    "degree bit-string marks degree {used}, above the declared maximum {}",
                    header.degree_in_file
                ),
            )),
            Some(_) => Ok(header),
        }
    }

    /// Highest spherical-harmonic degree carried by the file.
    pub fn used_degree(&self) -> Option<usize> {
        self.degree_mask.matches('1').count().checked_sub(1)
    }

    /// Number of radial knots carried by the file.
    pub fn used_knots(&self) -> usize {
        self.knot_mask.matches('1').count()
    }
}

// ---------------------------------------------------------------------------
// Token reader
// ---------------------------------------------------------------------------

/// A whitespace-delimited token and the physical line it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub line: usize,
}

impl Token {
    fn value(&self) -> Result<f64> {
        self.text.parse::<f64>().map_err(|_| {
            SphError::format(self.line, format!("'{}' is not a number", self.text))
        })
    }
}

/// Lazily pulls tokens across line boundaries from a buffered reader.
///
/// Tokens of the current line are held until consumed, so callers can tell
/// whether a logical record ended exactly at a line break.
pub struct TokenReader<R> {
    reader: R,
    line: usize,
    buf: String,
    pending: VecDeque<String>,
}

impl<R: BufRead> TokenReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
            pending: VecDeque::new(),
        }
    }

    /// First non-blank line, returned whole with its line number.
    pub fn header_line(&mut self) -> Result<Option<(usize, String)>> {
        while self.read_line()? {
            let text = self.buf.trim();
            if !text.is_empty() {
                return Ok(Some((self.line, text.to_string())));
            }
        }
        Ok(None)
    }

    pub fn next_token(&mut self) -> Result<Option<Token>> {
        while self.pending.is_empty() {
            if !self.read_line()? {
                return Ok(None);
            }
            self.pending
                .extend(self.buf.split_whitespace().map(str::to_string));
        }
        Ok(self.pending.pop_front().map(|text| Token {
            text,
            line: self.line,
        }))
    }

    /// Whether unconsumed tokens remain on the line last read.
    pub fn line_has_more(&self) -> bool {
        !self.pending.is_empty()
    }

    fn read_line(&mut self) -> Result<bool> {
        self.buf.clear();
        if self.reader.read_line(&mut self.buf)? == 0 {
            return Ok(false);
        }
        self.line += 1;
        Ok(true)
    }
}

impl<R: BufRead> Iterator for TokenReader<R> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

// ---------------------------------------------------------------------------
// Group decoding
// ---------------------------------------------------------------------------

/// Destination of the next value inside one `(knot, degree)` group.
///
/// Walks `OrderZero → Real(1) → Imaginary(1) → Real(2) → …`; order zero has
/// no imaginary part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSlot {
    OrderZero,
    Real(usize),
    Imaginary(usize),
}

impl OrderSlot {
    pub fn target(self) -> (Component, usize) {
        match self {
            OrderSlot::OrderZero => (Component::Real, 0),
            OrderSlot::Real(m) => (Component::Real, m),
            OrderSlot::Imaginary(m) => (Component::Imaginary, m),
        }
    }

    pub fn advance(self) -> Self {
        match self {
            OrderSlot::OrderZero => OrderSlot::Real(1),
            OrderSlot::Real(m) => OrderSlot::Imaginary(m),
            OrderSlot::Imaginary(m) => OrderSlot::Real(m + 1),
        }
    }
}

/// Values in the group for degree `l`: order 0 plus a real/imaginary pair
/// for each order `1..=l`.
pub fn group_len(degree: usize) -> usize {
    2 * degree + 1
}

/// Write one complete group into its `[component, order]` plane.
pub fn decode_group(values: &[f64], mut plane: ArrayViewMut2<f64>) {
    let mut slot = OrderSlot::OrderZero;
    for &value in values {
        let (component, order) = slot.target();
        plane[[component.index(), order]] = value;
        slot = slot.advance();
    }
}

/// Position in the `knot × degree` iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GroupCursor {
    knot: usize,
    degree: usize,
    knot_count: usize,
    max_degree: usize,
}

impl GroupCursor {
    fn new(knot_count: usize, max_degree: usize) -> Self {
        Self {
            knot: 0,
            degree: 0,
            knot_count,
            max_degree,
        }
    }

    fn is_complete(&self) -> bool {
        self.knot >= self.knot_count
    }

    /// Guard against writing past the last knot. `decode_body` stops at
    /// `knot == knot_count`, so this only fires if the loop is changed.
    fn check_knot(&self, line: usize) -> Result<()> {
        if self.knot > self.knot_count {
            return Err(SphError::format(
                line,
                format!(
                    "knot index {} overruns the {} knots in the model",
                    self.knot, self.knot_count
                ),
            ));
        }
        Ok(())
    }

    fn advance(&mut self) {
        self.degree += 1;
        if self.degree > self.max_degree {
            self.degree = 0;
            self.knot += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Outcome of a successful parse.
#[derive(Debug, Clone)]
pub struct ParsedSph {
    pub header: SphHeader,
    pub degree: usize,
    pub coefficients: Array4<f64>,
}

/// Reads sph streams for a model with `knot_count` knots and, optionally, a
/// degree that is already fixed.
#[derive(Debug, Clone, Copy)]
pub struct SphParser {
    knot_count: usize,
    expected_degree: Option<usize>,
}

impl SphParser {
    pub fn new(knot_count: usize, expected_degree: Option<usize>) -> Self {
        Self {
            knot_count,
            expected_degree,
        }
    }

    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<ParsedSph> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let parsed = self.parse(BufReader::new(file))?;
        info!(
            "read {} (degree {}, {} knots)",
            path.display(),
            parsed.degree,
            self.knot_count
        );
        Ok(parsed)
    }

    pub fn parse<R: BufRead>(&self, reader: R) -> Result<ParsedSph> {
        let mut tokens = TokenReader::new(reader);
        let (line, text) = tokens
            .header_line()?
            .ok_or_else(|| SphError::truncated("stream has no header line"))?;
        let header = SphHeader::parse(&text, line)?;
        let degree = self.reconcile(&header)?;

        let mut coefficients = allocate_coefficients(self.knot_count, degree)?;
        decode_body(&mut tokens, &mut coefficients, self.knot_count, degree)?;

        // Everything after the last group is ignored, unreadable or not.
        match tokens.next_token() {
            Ok(None) => {}
            Ok(Some(extra)) => warn!(
                "ignoring trailing input from line {} ('{}'): header and body may disagree",
                extra.line, extra.text
            ),
            Err(err) => warn!("ignoring unreadable trailing input: {err}"),
        }

        Ok(ParsedSph {
            header,
            degree,
            coefficients,
        })
    }

    /// Check the header against the model shape; returns the degree to use.
    fn reconcile(&self, header: &SphHeader) -> Result<usize> {
        let used_knots = header.used_knots();
        if used_knots != self.knot_count {
            return Err(SphError::ShapeMismatch {
                what: "wrong number of active knots in header",
                expected: self.knot_count,
                found: used_knots,
            });
        }

        // Validated non-empty by SphHeader::parse.
        let used_degree = header.used_degree().unwrap_or_default();
        match self.expected_degree {
            Some(expected) if expected != used_degree => Err(SphError::ShapeMismatch {
                what: "wrong number of active spherical-harmonic degrees in header",
                expected,
                found: used_degree,
            }),
            Some(expected) => Ok(expected),
            None => {
                debug!(
                    "taking degree {used_degree} from header (file declares {})",
                    header.degree_in_file
                );
                Ok(used_degree)
            }
        }
    }
}

fn decode_body<R: BufRead>(
    tokens: &mut TokenReader<R>,
    coefficients: &mut Array4<f64>,
    knot_count: usize,
    max_degree: usize,
) -> Result<()> {
    let mut cursor = GroupCursor::new(knot_count, max_degree);
    let mut group = Vec::with_capacity(group_len(max_degree));

    while !cursor.is_complete() {
        let wanted = group_len(cursor.degree);
        group.clear();

        let mut line = 0;
        while group.len() < wanted {
            let token = tokens.next_token()?.ok_or_else(|| {
                SphError::truncated(format!(
                    "input ended in group for knot {} degree {} after {} of {} values",
                    cursor.knot,
                    cursor.degree,
                    group.len(),
                    wanted
                ))
            })?;
            line = token.line;
            group.push(token.value()?);
        }
        if tokens.line_has_more() {
            return Err(SphError::format(
                line,
                format!(
                    "too much data on a coefficient line: group for knot {} degree {} takes {} values",
                    cursor.knot, cursor.degree, wanted
                ),
            ));
        }

        cursor.check_knot(line)?;
        trace!("knot {} degree {}: {:?}", cursor.knot, cursor.degree, group);
        decode_group(
            &group,
            coefficients.slice_mut(s![cursor.knot, .., cursor.degree, ..]),
        );
        cursor.advance();
    }
    Ok(())
}
