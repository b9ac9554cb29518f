use crate::store::Document;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub region_id: i64,
    pub name: String,
    #[serde(default)]
    pub constellations: Vec<i64>,
}

impl Region {
    pub fn new(region_id: i64, name: impl Into<String>, constellations: Vec<i64>) -> Self {
        Self { region_id, name: name.into(), constellations }
    }
}

impl Document for Region {
    const COLLECTION: &'static str = "regions";

    fn key(&self) -> i64 {
        self.region_id
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Constellation {
    pub constellation_id: i64,
    pub region_id: i64,
    pub name: String,
    #[serde(default)]
    pub systems: Vec<i64>,
}

impl Constellation {
    pub fn new(constellation_id: i64, region_id: i64, name: impl Into<String>, systems: Vec<i64>) -> Self {
        Self { constellation_id, region_id, name: name.into(), systems }
    }
}

impl Document for Constellation {
    const COLLECTION: &'static str = "constellations";

    fn key(&self) -> i64 {
        self.constellation_id
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolarSystem {
    pub system_id: i64,
    pub constellation_id: i64,
    pub name: String,
    #[serde(default)]
    pub security_status: f64,
    #[serde(default)]
    pub stations: Vec<i64>,
}

impl SolarSystem {
    pub fn new(system_id: i64, constellation_id: i64, name: impl Into<String>, stations: Vec<i64>) -> Self {
        Self { system_id, constellation_id, name: name.into(), security_status: 0.0, stations }
    }
}

impl Document for SolarSystem {
    const COLLECTION: &'static str = "systems";

    fn key(&self) -> i64 {
        self.system_id
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub station_id: i64,
    pub system_id: i64,
    pub name: String,
}

impl Station {
    pub fn new(station_id: i64, system_id: i64, name: impl Into<String>) -> Self {
        Self { station_id, system_id, name: name.into() }
    }
}

impl Document for Station {
    const COLLECTION: &'static str = "stations";

    fn key(&self) -> i64 {
        self.station_id
    }
}

/// Player-owned structure. The upstream body has no id field, so the id
/// comes from the request path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    pub structure_id: i64,
    pub solar_system_id: i64,
    pub name: String,
    #[serde(default)]
    pub owner_id: Option<i64>,
}

impl Structure {
    pub fn new(structure_id: i64, solar_system_id: i64, name: impl Into<String>) -> Self {
        Self { structure_id, solar_system_id, name: name.into(), owner_id: None }
    }

    pub fn from_upstream(structure_id: i64, body: UpstreamStructure) -> Self {
        Self { structure_id, solar_system_id: body.solar_system_id, name: body.name, owner_id: body.owner_id }
    }
}

impl Document for Structure {
    const COLLECTION: &'static str = "structures";

    fn key(&self) -> i64 {
        self.structure_id
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct UpstreamStructure {
    pub name: String,
    pub solar_system_id: i64,
    #[serde(default)]
    pub owner_id: Option<i64>,
}
