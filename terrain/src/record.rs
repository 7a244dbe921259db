//! Plain text elevation records.
//!
//! A record is one line of whitespace separated `lat lon elevation`.
//! Grid streams start with a header line
//! `nx ny incx incy minlon minlat`, path streams have no header.
//! Blank lines are ignored and do not count as records.

use crate::TerrainError;
use geo::geometry::{Coord, Rect};
use std::io::{BufRead, Lines};
use tmerc::C;

/// A single elevation sample.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: C,

    /// Longitude in degrees.
    pub lon: C,

    /// Elevation in source vertical units.
    pub elevation: C,
}

impl GeoPoint {
    /// Returns this sample's location as `x = lon, y = lat`.
    pub fn coord(&self) -> Coord<C> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }
}

/// Shape and placement of a grid stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridHeader {
    /// Number of columns (fastest varying).
    pub nx: usize,

    /// Number of rows.
    pub ny: usize,

    /// Longitude increment between columns, in degrees.
    pub inc_x: C,

    /// Latitude increment between rows, in degrees.
    pub inc_y: C,

    pub min_lon: C,

    pub min_lat: C,
}

impl GridHeader {
    /// Returns the number of records this grid declares.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    /// Returns the geographic extent this grid declares.
    #[allow(clippy::cast_precision_loss)]
    pub fn extent(&self) -> Rect<C> {
        let min = Coord {
            x: self.min_lon,
            y: self.min_lat,
        };
        let max = Coord {
            x: self.min_lon + self.inc_x * self.nx as C,
            y: self.min_lat + self.inc_y * self.ny as C,
        };
        Rect::new(min, max)
    }
}

/// Line-numbered record reader.
pub struct Records<R> {
    lines: Lines<R>,

    /// One-based number of the last line read.
    line: usize,
}

impl<R: BufRead> Records<R> {
    pub fn new(rdr: R) -> Self {
        Self {
            lines: rdr.lines(),
            line: 0,
        }
    }

    /// Reads and parses a grid header from the next non-blank line.
    pub fn header(&mut self) -> Result<GridHeader, TerrainError> {
        let (line, text) = match self.next_line()? {
            Some(next) => next,
            None => return Err(malformed(self.line + 1, "missing grid header")),
        };
        let fields: Vec<&str> = text.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(malformed(
                line,
                format!("expected 6 header fields, found {}", fields.len()),
            ));
        }
        let nx = parse_dimension(line, fields[0])?;
        let ny = parse_dimension(line, fields[1])?;
        if nx.checked_mul(ny).is_none() {
            return Err(malformed(line, "grid dimensions overflow"));
        }
        Ok(GridHeader {
            nx,
            ny,
            inc_x: parse_float(line, fields[2])?,
            inc_y: parse_float(line, fields[3])?,
            min_lon: parse_float(line, fields[4])?,
            min_lat: parse_float(line, fields[5])?,
        })
    }
}

/// Private API.
impl<R: BufRead> Records<R> {
    fn next_line(&mut self) -> Result<Option<(usize, String)>, TerrainError> {
        for text in self.lines.by_ref() {
            self.line += 1;
            let text = text?;
            if !text.trim().is_empty() {
                return Ok(Some((self.line, text)));
            }
        }
        Ok(None)
    }

    fn parse_point(line: usize, text: &str) -> Result<GeoPoint, TerrainError> {
        let mut fields = text.split_whitespace();
        let mut next = || {
            fields
                .next()
                .ok_or_else(|| malformed(line, "expected 3 fields"))
                .and_then(|field| parse_float(line, field))
        };
        let point = GeoPoint {
            lat: next()?,
            lon: next()?,
            elevation: next()?,
        };
        if fields.next().is_some() {
            return Err(malformed(line, "expected 3 fields"));
        }
        Ok(point)
    }
}

impl<R: BufRead> Iterator for Records<R> {
    type Item = Result<GeoPoint, TerrainError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_line() {
            Ok(Some((line, text))) => Some(Self::parse_point(line, &text)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

fn malformed(line: usize, reason: impl Into<String>) -> TerrainError {
    TerrainError::MalformedRecord {
        line,
        reason: reason.into(),
    }
}

fn parse_float(line: usize, field: &str) -> Result<C, TerrainError> {
    match field.parse::<C>() {
        Ok(val) if val.is_finite() => Ok(val),
        _ => Err(malformed(line, format!("'{field}' is not a finite number"))),
    }
}

fn parse_dimension(line: usize, field: &str) -> Result<usize, TerrainError> {
    match field.parse::<usize>() {
        Ok(val) if val > 0 => Ok(val),
        _ => Err(malformed(
            line,
            format!("'{field}' is not a positive grid dimension"),
        )),
    }
}
