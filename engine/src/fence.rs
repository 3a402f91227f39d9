//! Fence configuration and the strings describing it.
//!
//! A polygon is given as `polygon:lat,lon;lat,lon;...` and is implicitly closed, a circle as
//! `center:lat,lon` with an optional `;km:X` radius (5 km if absent).
//!
//! Both are parsed once at startup, `Fences` is then shared read-only.
//!

use std::str::FromStr;

use nom::{
    bytes::complete::tag,
    character::complete::{char, multispace0},
    combinator::{all_consuming, map, opt},
    multi::separated_list1,
    number::complete::double,
    sequence::{delimited, pair, preceded, separated_pair, terminated, tuple},
    IResult,
};
use tracing::{debug, trace};

use crate::ConfigError;

/// Radius used when the circle spec has no `km:` part.
pub const DEFAULT_RADIUS_KM: f64 = 5.0;

/// Closed polygon, vertices are `(lat, lon)`.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon(pub Vec<(f64, f64)>);

impl Polygon {
    pub fn vertices(&self) -> &[(f64, f64)] {
        &self.0
    }
}

impl FromStr for Polygon {
    type Err = ConfigError;

    #[tracing::instrument]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, poly) = polygon(s).map_err(|e| syntax(s, e))?;
        if poly.len() < 3 {
            return Err(ConfigError::TooFewVertices(poly.len()));
        }
        trace!("{} vertices", poly.len());
        Ok(Polygon(poly))
    }
}

/// Circle around a center, radius in km.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub lat: f64,
    pub lon: f64,
    pub km: f64,
}

impl FromStr for Circle {
    type Err = ConfigError;

    #[tracing::instrument]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, circle) = circle(s).map_err(|e| syntax(s, e))?;
        if !circle.km.is_finite() || circle.km < 0. {
            return Err(ConfigError::OutOfRange("radius", circle.km));
        }
        Ok(circle)
    }
}

/// Everything an event is checked against.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fences {
    pub polygon: Option<Polygon>,
    pub circle: Option<Circle>,
    /// Speed threshold in knots
    pub speed_kts: Option<f64>,
}

impl Fences {
    /// Build the configuration from the raw specs, failing on the first bad one.
    ///
    #[tracing::instrument]
    pub fn from_specs(
        polygon: Option<&str>,
        circle: Option<&str>,
        speed_kts: Option<f64>,
    ) -> Result<Self, ConfigError> {
        let polygon = polygon.map(str::parse::<Polygon>).transpose()?;
        let circle = circle.map(str::parse::<Circle>).transpose()?;
        if let Some(v) = speed_kts {
            if !v.is_finite() || v < 0. {
                return Err(ConfigError::OutOfRange("speed threshold", v));
            }
        }
        let fences = Fences {
            polygon,
            circle,
            speed_kts,
        };
        debug!("fences={:?}", fences);
        Ok(fences)
    }

    /// Nothing configured means nothing can ever alert.
    ///
    pub fn is_empty(&self) -> bool {
        self.polygon.is_none() && self.circle.is_none() && self.speed_kts.is_none()
    }
}

fn syntax(spec: &str, e: nom::Err<nom::error::Error<&str>>) -> ConfigError {
    let near = match e {
        nom::Err::Error(e) | nom::Err::Failure(e) => e.input.to_string(),
        nom::Err::Incomplete(_) => String::new(),
    };
    ConfigError::Syntax {
        spec: spec.to_string(),
        near,
    }
}

#[inline]
fn number(input: &str) -> IResult<&str, f64> {
    delimited(multispace0, double, multispace0)(input)
}

#[inline]
fn coord(input: &str) -> IResult<&str, (f64, f64)> {
    separated_pair(number, char(','), number)(input)
}

fn polygon(input: &str) -> IResult<&str, Vec<(f64, f64)>> {
    all_consuming(terminated(
        preceded(tag("polygon:"), separated_list1(char(';'), coord)),
        opt(char(';')),
    ))(input)
}

fn circle(input: &str) -> IResult<&str, Circle> {
    let radius = preceded(
        pair(char(';'), delimited(multispace0, tag("km:"), multispace0)),
        number,
    );
    let spec = tuple((preceded(tag("center:"), coord), opt(radius), opt(char(';'))));

    all_consuming(map(spec, |((lat, lon), km, _)| Circle {
        lat,
        lon,
        km: km.unwrap_or(DEFAULT_RADIUS_KM),
    }))(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_polygon_parse() {
        let p: Polygon = "polygon:48.0,2.0;49.0,2.5;48.0,3.0".parse().unwrap();
        assert_eq!(vec![(48.0, 2.0), (49.0, 2.5), (48.0, 3.0)], p.0);
    }

    #[test]
    fn test_polygon_parse_spaces_and_trailing() {
        let p: Polygon = "polygon: 48.0 , 2.0; 49.0,2.5 ;48, -3.5;".parse().unwrap();
        assert_eq!(vec![(48.0, 2.0), (49.0, 2.5), (48.0, -3.5)], p.0);
    }

    #[rstest]
    #[case("48.0,2.0;49.0,2.5;48.0,3.0")]
    #[case("polygon:")]
    #[case("polygon:48.0;49.0,2.5;48.0,3.0")]
    #[case("polygon:48.0,2.0;;48.0,3.0")]
    #[case("polygon:a,b;c,d;e,f")]
    #[case("circle:48.0,2.0;49.0,2.5;48.0,3.0")]
    fn test_polygon_parse_bad(#[case] spec: &str) {
        assert!(matches!(
            spec.parse::<Polygon>(),
            Err(ConfigError::Syntax { .. })
        ));
    }

    #[test]
    fn test_polygon_too_few() {
        assert!(matches!(
            "polygon:1,2;3,4".parse::<Polygon>(),
            Err(ConfigError::TooFewVertices(2))
        ));
    }

    #[rstest]
    #[case("center:50.8,4.4", Circle { lat: 50.8, lon: 4.4, km: 5.0 })]
    #[case("center:50.8,4.4;km:12.5", Circle { lat: 50.8, lon: 4.4, km: 12.5 })]
    #[case("center: -33.9 , 151.2 ; km: 3", Circle { lat: -33.9, lon: 151.2, km: 3.0 })]
    #[case("center:0,0;km:0;", Circle { lat: 0., lon: 0., km: 0. })]
    fn test_circle_parse(#[case] spec: &str, #[case] c: Circle) {
        assert_eq!(c, spec.parse::<Circle>().unwrap());
    }

    #[rstest]
    #[case("50.8,4.4;km:3")]
    #[case("center:50.8")]
    #[case("center:50.8,4.4;km:")]
    #[case("center:50.8,4.4;radius:3")]
    #[case("center:50.8,4.4;km:three")]
    fn test_circle_parse_bad(#[case] spec: &str) {
        assert!(matches!(
            spec.parse::<Circle>(),
            Err(ConfigError::Syntax { .. })
        ));
    }

    #[test]
    fn test_circle_negative_radius() {
        assert!(matches!(
            "center:1,2;km:-1".parse::<Circle>(),
            Err(ConfigError::OutOfRange("radius", _))
        ));
    }

    #[test]
    fn test_fences_from_specs() {
        let f = Fences::from_specs(
            Some("polygon:0,0;0,10;10,10;10,0"),
            Some("center:5,5;km:100"),
            Some(30.),
        )
        .unwrap();
        assert_eq!(4, f.polygon.unwrap().vertices().len());
        assert_eq!(100., f.circle.unwrap().km);
        assert_eq!(Some(30.), f.speed_kts);
    }

    #[test]
    fn test_fences_empty() {
        let f = Fences::from_specs(None, None, None).unwrap();
        assert!(f.is_empty());
    }

    #[rstest]
    #[case(-1.)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn test_fences_bad_threshold(#[case] v: f64) {
        assert!(Fences::from_specs(None, None, Some(v)).is_err());
    }

    #[test]
    fn test_fences_fail_fast() {
        assert!(Fences::from_specs(Some("polygon:1,2"), Some("center:0,0"), None).is_err());
        assert!(Fences::from_specs(None, Some("center:0,0;km"), None).is_err());
    }
}
