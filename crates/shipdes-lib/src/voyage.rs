//! Port-to-port voyage planning.
//!
//! Derives the number of round voyages a ship completes per year from a
//! route's segment distances, the fraction of service speed held on each
//! segment and the days spent alongside at each end.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::profiles::{fuzzy_matches, normalize_name};
use crate::request::EconomicParameters;

/// One-way route split into segments (nm) plus port time (days).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Short lookup key, e.g. `rotterdam-shanghai`.
    pub key: String,
    pub name: String,
    /// Port approach and departure, both ends together.
    pub port_approach_nm: f64,
    pub canal_nm: f64,
    pub ocean_nm: f64,
    pub port_days_origin: f64,
    pub port_days_destination: f64,
}

impl Route {
    /// A user-defined route with the standard two days in each port.
    pub fn custom(port_approach_nm: f64, canal_nm: f64, ocean_nm: f64) -> Self {
        Self {
            key: "custom".to_string(),
            name: "Custom".to_string(),
            port_approach_nm,
            canal_nm,
            ocean_nm,
            port_days_origin: 2.0,
            port_days_destination: 2.0,
        }
    }

    pub fn total_distance(&self) -> f64 {
        self.port_approach_nm + self.canal_nm + self.ocean_nm
    }

    pub fn port_days(&self) -> f64 {
        self.port_days_origin + self.port_days_destination
    }
}

fn standard_route(key: &str, name: &str, canal_nm: f64, ocean_nm: f64) -> Route {
    Route {
        key: key.to_string(),
        name: name.to_string(),
        canal_nm,
        ocean_nm,
        ..Route::custom(100.0, 0.0, 0.0)
    }
}

static STANDARD_ROUTES: Lazy<RouteCatalog> = Lazy::new(|| RouteCatalog {
    routes: vec![
        standard_route(
            "southampton-singapore",
            "Southampton → Singapore (Suez)",
            120.0,
            7_780.0,
        ),
        standard_route(
            "rotterdam-shanghai",
            "Rotterdam → Shanghai (Suez)",
            120.0,
            9_780.0,
        ),
        standard_route(
            "newyork-losangeles",
            "New York → Los Angeles (Panama)",
            50.0,
            4_850.0,
        ),
        standard_route(
            "houston-rotterdam",
            "Houston → Rotterdam (Atlantic)",
            0.0,
            4_700.0,
        ),
        Route::custom(100.0, 0.0, 8_000.0),
    ],
});

/// Named routes available for voyage planning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteCatalog {
    pub routes: Vec<Route>,
}

impl RouteCatalog {
    /// Built-in trade routes plus the default custom route.
    pub fn standard() -> &'static RouteCatalog {
        &STANDARD_ROUTES
    }

    /// Find a route by key or display name, case-insensitively.
    pub fn find(&self, name: &str) -> Result<&Route> {
        let key = normalize_name(name);
        self.routes
            .iter()
            .find(|r| normalize_name(&r.key) == key || normalize_name(&r.name) == key)
            .ok_or_else(|| Error::UnknownRoute {
                name: name.to_string(),
                suggestions: fuzzy_matches(&key, self.routes.iter().map(|r| r.key.as_str()), 3),
            })
    }
}

/// Percentage of service speed held on each segment type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedProfile {
    pub ocean_pct: f64,
    pub canal_pct: f64,
    pub port_pct: f64,
}

impl Default for SpeedProfile {
    fn default() -> Self {
        Self {
            ocean_pct: 100.0,
            canal_pct: 20.0,
            port_pct: 10.0,
        }
    }
}

/// A route sailed at a given service speed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoyagePlan {
    pub route: Route,
    pub speed_kn: f64,
    pub profile: SpeedProfile,
}

impl VoyagePlan {
    pub fn new(route: Route, speed_kn: f64, profile: SpeedProfile) -> Result<Self> {
        if !speed_kn.is_finite() || speed_kn <= 0.0 {
            return Err(Error::invalid(
                "speed_kn",
                "must be a finite positive number",
            ));
        }
        for (field, value) in [
            ("profile.ocean_pct", profile.ocean_pct),
            ("profile.canal_pct", profile.canal_pct),
            ("profile.port_pct", profile.port_pct),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::invalid(field, "must be a finite non-negative number"));
            }
        }
        for (field, value) in [
            ("route.port_approach_nm", route.port_approach_nm),
            ("route.canal_nm", route.canal_nm),
            ("route.ocean_nm", route.ocean_nm),
            ("route.port_days_origin", route.port_days_origin),
            ("route.port_days_destination", route.port_days_destination),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::invalid(field, "must be a finite non-negative number"));
            }
        }
        Ok(Self {
            route,
            speed_kn,
            profile,
        })
    }

    /// Days under way for one passage. Segments sailed at 0 % are skipped.
    pub fn one_way_days(&self) -> f64 {
        let leg = |distance: f64, pct: f64| {
            if pct > 0.0 {
                distance / (self.speed_kn * pct / 100.0) / 24.0
            } else {
                0.0
            }
        };
        leg(self.route.port_approach_nm, self.profile.port_pct)
            + leg(self.route.canal_nm, self.profile.canal_pct)
            + leg(self.route.ocean_nm, self.profile.ocean_pct)
    }

    /// Round trip plus port time (days).
    pub fn voyage_days(&self) -> f64 {
        2.0 * self.one_way_days() + self.route.port_days()
    }

    /// Round voyages completed in `sea_days` of operation.
    pub fn annual_voyages(&self, sea_days: f64) -> f64 {
        let days = self.voyage_days();
        if days <= 0.0 {
            return 0.0;
        }
        sea_days / days
    }

    /// Replace the voyages per year of `econ` with this plan's figure.
    pub fn apply_to(&self, econ: &mut EconomicParameters) {
        let voyages = self.annual_voyages(econ.sea_days_per_year);
        debug!(
            route = %self.route.key,
            voyage_days = self.voyage_days(),
            voyages,
            "voyages per year from route"
        );
        econ.voyages_per_year = voyages;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_route_by_key_or_name() {
        let catalog = RouteCatalog::standard();
        let by_key = catalog.find("Rotterdam-Shanghai").unwrap();
        let by_name = catalog.find("rotterdam → shanghai (suez)").unwrap();
        assert_eq!(by_key, by_name);
        assert_eq!(by_key.total_distance(), 10_000.0);
    }

    #[test]
    fn unknown_route_suggests_keys() {
        let err = RouteCatalog::standard().find("houston-rotterdm").unwrap_err();
        match err {
            Error::UnknownRoute { suggestions, .. } => {
                assert_eq!(
                    suggestions.first().map(String::as_str),
                    Some("houston-rotterdam")
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn voyage_time_uses_segment_speeds() {
        let route = RouteCatalog::standard()
            .find("houston-rotterdam")
            .unwrap()
            .clone();
        let plan = VoyagePlan::new(route, 15.0, SpeedProfile::default()).unwrap();
        // 100 nm at 1.5 kn plus 4700 nm at 15 kn.
        let one_way = (100.0 / 1.5 + 4_700.0 / 15.0) / 24.0;
        assert!((plan.one_way_days() - one_way).abs() < 1e-9);
        assert!((plan.voyage_days() - (2.0 * one_way + 4.0)).abs() < 1e-9);
        assert!((plan.annual_voyages(340.0) - 340.0 / (2.0 * one_way + 4.0)).abs() < 1e-9);
    }

    #[test]
    fn zero_percent_segment_is_skipped() {
        let profile = SpeedProfile {
            canal_pct: 0.0,
            ..SpeedProfile::default()
        };
        let with_canal = VoyagePlan::new(Route::custom(0.0, 500.0, 0.0), 10.0, profile).unwrap();
        assert_eq!(with_canal.one_way_days(), 0.0);
    }

    #[test]
    fn rejects_zero_speed() {
        assert!(VoyagePlan::new(Route::custom(100.0, 0.0, 8_000.0), 0.0, SpeedProfile::default()).is_err());
    }
}
