//! Geolocation by address.
//!
//! # Responsibilities
//! - Open MaxMind country and city databases at startup
//! - Resolve an address to country name, ISO code and city name
//!
//! # Design Decisions
//! - Databases are read fully into memory once; lookups are pure reads
//! - English names only
//! - Country falls back to the registered country when the record has no
//!   physical country

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::Path;

use maxminddb::{geoip2, Reader};

use crate::lookup::LookupError;

/// Country information for an address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Country {
    pub name: Option<String>,
    pub iso: Option<String>,
}

/// Geolocation source.
pub trait GeoDatabase: Send + Sync {
    fn country(&self, ip: IpAddr) -> Result<Country, LookupError>;

    fn city(&self, ip: IpAddr) -> Result<Option<String>, LookupError>;
}

/// MaxMind GeoIP2 / GeoLite2 databases.
pub struct MaxMindDatabase {
    country: Option<Reader<Vec<u8>>>,
    city: Option<Reader<Vec<u8>>>,
}

impl MaxMindDatabase {
    /// Open whichever databases are given. Both may be absent.
    pub fn open(country_path: Option<&Path>, city_path: Option<&Path>) -> Result<Self, LookupError> {
        let country = country_path.map(Reader::open_readfile).transpose()?;
        let city = city_path.map(Reader::open_readfile).transpose()?;

        if let Some(path) = country_path {
            tracing::info!(path = %path.display(), "Country database loaded");
        }
        if let Some(path) = city_path {
            tracing::info!(path = %path.display(), "City database loaded");
        }

        Ok(Self { country, city })
    }

    /// True when no database was opened.
    pub fn is_empty(&self) -> bool {
        self.country.is_none() && self.city.is_none()
    }
}

fn english(names: Option<&BTreeMap<&str, &str>>) -> Option<String> {
    names
        .and_then(|names| names.get("en"))
        .filter(|name| !name.is_empty())
        .map(|name| name.to_string())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

impl GeoDatabase for MaxMindDatabase {
    fn country(&self, ip: IpAddr) -> Result<Country, LookupError> {
        let Some(reader) = &self.country else {
            return Ok(Country::default());
        };
        let record: geoip2::Country = reader.lookup(ip)?;

        let physical = record.country.as_ref();
        let registered = record.registered_country.as_ref();

        let name = english(physical.and_then(|c| c.names.as_ref()))
            .or_else(|| english(registered.and_then(|c| c.names.as_ref())));
        let iso = non_empty(physical.and_then(|c| c.iso_code))
            .or_else(|| non_empty(registered.and_then(|c| c.iso_code)));

        Ok(Country { name, iso })
    }

    fn city(&self, ip: IpAddr) -> Result<Option<String>, LookupError> {
        let Some(reader) = &self.city else {
            return Ok(None);
        };
        let record: geoip2::City = reader.lookup(ip)?;
        Ok(english(record.city.as_ref().and_then(|c| c.names.as_ref())))
    }
}
