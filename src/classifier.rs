//! Deterministic property-bag classifier (spec §4.D).
//!
//! Rules are evaluated in the listed order; the first match wins. This
//! ordering is load-bearing — see the rule table in spec.md §4.D and the
//! property-based test below that checks it is preserved exactly.

use std::collections::HashMap;

/// The geometry kind a feature carries. Every feature has exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
  Point,
  Line,
  Polygon,
  MultiPolygon,
}

impl GeometryKind {
  #[must_use]
  pub const fn is_polygon(self) -> bool {
    matches!(self, Self::Polygon | Self::MultiPolygon)
  }
}

impl TryFrom<u8> for GeometryKind {
  type Error = ();

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(Self::Point),
      1 => Ok(Self::Line),
      2 => Ok(Self::Polygon),
      3 => Ok(Self::MultiPolygon),
      _ => Err(()),
    }
  }
}

/// The classifier's output; the only signal the renderer needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentCategory {
  Unknown,
  Road,
  Highway,
  Water,
  Border,
  PopulatedPlace,
  Railway,
  Forest,
  Civilian,
  Plain,
  Lakes,
  Buildings,
  Mountains,
  Desert,
  NationalPark,
}

/// An unordered key→value string map attached to a feature. Duplicate keys
/// collapse to the last occurrence on insert.
#[derive(Debug, Clone, Default)]
pub struct PropertyMap(HashMap<String, String>);

impl PropertyMap {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.0.insert(key.into(), value.into());
  }

  #[must_use]
  pub fn get(&self, key: &str) -> Option<&str> {
    self.0.get(key).map(String::as_str)
  }

  fn any_key_starts_with(&self, prefix: &str) -> bool {
    self.0.keys().any(|k| k.starts_with(prefix))
  }

  fn value_starts_with_any(&self, key: &str, prefixes: &[&str]) -> bool {
    self
      .get(key)
      .is_some_and(|v| prefixes.iter().any(|p| v.starts_with(p)))
  }

  fn value_is(&self, key: &str, value: &str) -> bool {
    self.get(key) == Some(value)
  }
}

impl FromIterator<(String, String)> for PropertyMap {
  fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
    let mut map = Self::new();
    for (k, v) in iter {
      map.insert(k, v);
    }
    map
  }
}

/// Closed set of "road-like" highway tag values (rule 2).
const ROAD_LIKE_HIGHWAY_TYPES: &[&str] = &[
  "primary",
  "secondary",
  "tertiary",
  "residential",
  "service",
  "unclassified",
  "living_street",
  "road",
  "pedestrian",
  "track",
];

const LANDUSE_CIVILIAN: &[&str] = &[
  "residential",
  "cemetery",
  "industrial",
  "commercial",
  "square",
  "construction",
  "military",
  "quarry",
  "brownfield",
];

const LANDUSE_PLAIN: &[&str] = &[
  "farm",
  "meadow",
  "grass",
  "greenfield",
  "recreation_ground",
  "winter_sports",
  "allotments",
];

const LANDUSE_LAKES: &[&str] = &["reservoir", "basin"];

/// Apply the spec §4.D rule table to one feature's properties and
/// geometry kind. First match wins; ties are resolved by listing order.
#[must_use]
pub fn classify(properties: &PropertyMap, geometry: GeometryKind) -> EnvironmentCategory {
  use EnvironmentCategory::{
    Border, Buildings, Civilian, Desert, Forest, Highway, Lakes, Mountains, NationalPark,
    PopulatedPlace, Plain, Railway, Road, Unknown, Water,
  };

  // 1. highway in {motorway, trunk}
  if properties.value_is("highway", "motorway") || properties.value_is("highway", "trunk") {
    return Highway;
  }

  // 2. highway present and road-like
  if properties.value_starts_with_any("highway", ROAD_LIKE_HIGHWAY_TYPES) {
    return Road;
  }

  // 3. any key starting with "water" and geometry != Point
  if geometry != GeometryKind::Point && properties.any_key_starts_with("water") {
    return Water;
  }

  // 4. boundary = administrative && admin_level = 2
  if properties.value_is("boundary", "administrative") && properties.value_is("admin_level", "2")
  {
    return Border;
  }

  // 5. Point && place present, value prefixed by city/town/locality/hamlet
  if geometry == GeometryKind::Point
    && properties.value_starts_with_any("place", &["city", "town", "locality", "hamlet"])
  {
    return PopulatedPlace;
  }

  // 6. any key starting with "railway"
  if properties.any_key_starts_with("railway") {
    return Railway;
  }

  // 7. Polygon && key starting with "natural": switch on its value.
  // Normalized as a plain AND with the outer geometry check (spec §9 Open
  // Question) rather than nesting the geometry test inside the
  // per-property predicate.
  if geometry.is_polygon() && properties.any_key_starts_with("natural") {
    return match properties.get("natural") {
      Some(v) if ["fell", "grassland", "heath", "moor", "scrub", "wetland"].contains(&v) => Plain,
      Some(v) if ["wood", "tree_row"].contains(&v) => Forest,
      Some(v) if ["bare_rock", "rock", "scree"].contains(&v) => Mountains,
      Some(v) if ["beach", "sand"].contains(&v) => Desert,
      Some("water") => Lakes,
      _ => Unknown,
    };
  }

  // 8. boundary starts with "forest"
  if properties.value_starts_with_any("boundary", &["forest"]) {
    return Forest;
  }

  // 9. landuse starts with "forest" or "orchard"
  if properties.value_starts_with_any("landuse", &["forest", "orchard"]) {
    return Forest;
  }

  // 10. Polygon && landuse in civilian set (prefix match)
  if geometry.is_polygon() && properties.value_starts_with_any("landuse", LANDUSE_CIVILIAN) {
    return Civilian;
  }

  // 11. Polygon && landuse in plain set
  if geometry.is_polygon() && properties.value_starts_with_any("landuse", LANDUSE_PLAIN) {
    return Plain;
  }

  // 12. Polygon && landuse in lakes set
  if geometry.is_polygon() && properties.value_starts_with_any("landuse", LANDUSE_LAKES) {
    return Lakes;
  }

  // 13. Polygon && any key starting with "building"
  if geometry.is_polygon() && properties.any_key_starts_with("building") {
    return Buildings;
  }

  // 14. Polygon && any key starting with "leisure"
  if geometry.is_polygon() && properties.any_key_starts_with("leisure") {
    return NationalPark;
  }

  // 15. Polygon && any key starting with "amenity"
  if geometry.is_polygon() && properties.any_key_starts_with("amenity") {
    return Buildings;
  }

  // 16. otherwise
  Unknown
}

#[cfg(test)]
mod tests {
  use super::*;
  use rstest::rstest;

  fn props(pairs: &[(&str, &str)]) -> PropertyMap {
    pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
  }

  #[rstest]
  #[case(&[("highway", "motorway")], GeometryKind::Line, EnvironmentCategory::Highway)]
  #[case(&[("highway", "trunk")], GeometryKind::Line, EnvironmentCategory::Highway)]
  #[case(&[("highway", "residential")], GeometryKind::Line, EnvironmentCategory::Road)]
  #[case(&[("natural", "water")], GeometryKind::Polygon, EnvironmentCategory::Lakes)]
  #[case(&[("natural", "water")], GeometryKind::Point, EnvironmentCategory::Unknown)]
  #[case(&[("boundary", "administrative"), ("admin_level", "2")], GeometryKind::Polygon, EnvironmentCategory::Border)]
  #[case(&[("boundary", "administrative"), ("admin_level", "4")], GeometryKind::Polygon, EnvironmentCategory::Unknown)]
  #[case(&[("place", "city")], GeometryKind::Point, EnvironmentCategory::PopulatedPlace)]
  #[case(&[("place", "suburb")], GeometryKind::Point, EnvironmentCategory::Unknown)]
  #[case(&[("railway", "rail")], GeometryKind::Line, EnvironmentCategory::Railway)]
  #[case(&[("natural", "wood")], GeometryKind::Polygon, EnvironmentCategory::Forest)]
  #[case(&[("natural", "bare_rock")], GeometryKind::Polygon, EnvironmentCategory::Mountains)]
  #[case(&[("natural", "sand")], GeometryKind::Polygon, EnvironmentCategory::Desert)]
  #[case(&[("natural", "cliff")], GeometryKind::Polygon, EnvironmentCategory::Unknown)]
  #[case(&[("boundary", "forest_compartment")], GeometryKind::Polygon, EnvironmentCategory::Forest)]
  #[case(&[("landuse", "forest")], GeometryKind::Polygon, EnvironmentCategory::Forest)]
  #[case(&[("landuse", "orchard")], GeometryKind::Polygon, EnvironmentCategory::Forest)]
  #[case(&[("landuse", "residential")], GeometryKind::Polygon, EnvironmentCategory::Civilian)]
  #[case(&[("landuse", "farm")], GeometryKind::Polygon, EnvironmentCategory::Plain)]
  #[case(&[("landuse", "reservoir")], GeometryKind::Polygon, EnvironmentCategory::Lakes)]
  #[case(&[("building", "yes")], GeometryKind::Polygon, EnvironmentCategory::Buildings)]
  #[case(&[("leisure", "park")], GeometryKind::Polygon, EnvironmentCategory::NationalPark)]
  #[case(&[("amenity", "school")], GeometryKind::Polygon, EnvironmentCategory::Buildings)]
  #[case(&[], GeometryKind::Point, EnvironmentCategory::Unknown)]
  fn classification_matches_rule_table(
    #[case] pairs: &[(&str, &str)],
    #[case] geometry: GeometryKind,
    #[case] expected: EnvironmentCategory,
  ) {
    assert_eq!(classify(&props(pairs), geometry), expected);
  }

  #[test]
  fn landuse_civilian_requires_polygon() {
    let p = props(&[("landuse", "residential")]);
    assert_eq!(classify(&p, GeometryKind::Line), EnvironmentCategory::Unknown);
  }

  #[test]
  fn first_match_wins_over_later_rules() {
    // highway=motorway also has a railway key; rule 1 must still win.
    let p = props(&[("highway", "motorway"), ("railway", "rail")]);
    assert_eq!(classify(&p, GeometryKind::Line), EnvironmentCategory::Highway);
  }

  #[test]
  fn geometry_kind_rejects_unknown_byte() {
    assert_eq!(GeometryKind::try_from(0u8), Ok(GeometryKind::Point));
    assert_eq!(GeometryKind::try_from(3u8), Ok(GeometryKind::MultiPolygon));
    assert!(GeometryKind::try_from(4u8).is_err());
  }

  #[test]
  fn duplicate_keys_collapse_to_last_insert() {
    let mut p = PropertyMap::new();
    p.insert("highway", "residential");
    p.insert("highway", "motorway");
    assert_eq!(classify(&p, GeometryKind::Line), EnvironmentCategory::Highway);
  }
}
