//! Decoding of the parameter set handed to the planning screen.
//!
//! The search and cart screens pass the selected places as parallel
//! arrays (`names`, `addresses`, `lats`, `lngs`) joined by
//! [`PARAM_SEPARATOR`], plus an optional `start`. Values are expected to be
//! URL-decoded already.

use thiserror::Error;
use tracing::warn;

use crate::geo::Coordinate;
use crate::waypoint::PlaceInput;

pub const PARAM_SEPARATOR: &str = "|||";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamsError {
    #[error("`{field}` has {found} entries but `names` has {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("place {index} has an empty name")]
    BlankName { index: usize },
    #[error("`{field}` entry {index} is not a valid coordinate: {value:?}")]
    InvalidCoordinate {
        field: &'static str,
        index: usize,
        value: String,
    },
}

/// Decoded entry parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanningParams {
    pub starting_point: Option<String>,
    pub places: Vec<PlaceInput>,
}

impl PlanningParams {
    /// Reads the parameter set from decoded query pairs. Unknown keys are
    /// ignored; a repeated key keeps its last value.
    pub fn from_query<'a, I>(pairs: I) -> Result<Self, ParamsError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut names = "";
        let mut addresses = "";
        let mut lats = "";
        let mut lngs = "";
        let mut start = None;

        for (key, value) in pairs {
            match key {
                "names" => names = value,
                "addresses" => addresses = value,
                "lats" => lats = value,
                "lngs" => lngs = value,
                "start" => start = Some(value),
                _ => {}
            }
        }

        Self::parse(names, addresses, lats, lngs, start)
    }

    pub fn parse(
        names: &str,
        addresses: &str,
        lats: &str,
        lngs: &str,
        start: Option<&str>,
    ) -> Result<Self, ParamsError> {
        let starting_point = start
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        if names.is_empty() {
            return Ok(Self {
                starting_point,
                places: Vec::new(),
            });
        }

        let names: Vec<&str> = names.split(PARAM_SEPARATOR).collect();
        let expected = names.len();
        let addresses = split_field("addresses", addresses, expected)?;
        let lats = split_field("lats", lats, expected)?;
        let lngs = split_field("lngs", lngs, expected)?;

        let mut places = Vec::with_capacity(expected);
        for (index, name) in names.iter().enumerate() {
            let name = name.trim();
            if name.is_empty() {
                return Err(ParamsError::BlankName { index });
            }

            let lat = parse_degrees("lats", index, lats[index], 90.0)?;
            let lon = parse_degrees("lngs", index, lngs[index], 180.0)?;
            let coord = match (lat, lon) {
                (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
                (None, None) => None,
                _ => {
                    warn!(place = name, "place has only one coordinate component, ignoring it");
                    None
                }
            };

            places.push(PlaceInput::new(name, addresses[index].trim(), coord));
        }

        Ok(Self {
            starting_point,
            places,
        })
    }
}

/// Splits a parallel array. An absent field stands for `expected` empty
/// entries; a present one must match `names` positionally.
fn split_field<'a>(field: &'static str, raw: &'a str, expected: usize) -> Result<Vec<&'a str>, ParamsError> {
    if raw.is_empty() {
        return Ok(vec![""; expected]);
    }
    let parts: Vec<&str> = raw.split(PARAM_SEPARATOR).collect();
    if parts.len() != expected {
        return Err(ParamsError::LengthMismatch {
            field,
            expected,
            found: parts.len(),
        });
    }
    Ok(parts)
}

fn parse_degrees(field: &'static str, index: usize, raw: &str, limit: f64) -> Result<Option<f64>, ParamsError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value.abs() <= limit => Ok(Some(value)),
        _ => Err(ParamsError::InvalidCoordinate {
            field,
            index,
            value: raw.to_string(),
        }),
    }
}
