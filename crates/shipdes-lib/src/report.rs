//! Plain-text design report in the layout of the classic ship design
//! program output, with per-line output options.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::request::{DesignMode, DesignRequest};
use crate::result::DesignResult;
use crate::tables::{non_zero, KW_PER_HP, POWER_MARGIN};
use crate::volume::teu_capacity;

/// One optional line (or line fragment) of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportItem {
    Length,
    Breadth,
    LengthBreadth,
    Depth,
    Draught,
    BreadthDraught,
    Block,
    Displacement,
    CargoDeadweight,
    TotalDeadweight,
    PropDiameter,
    Speed,
    Range,
    EngineRpm,
    PropellerRpm,
    ServicePower,
    InstalledPower,
    EffectivePower,
    OpenWaterEfficiency,
    HullEfficiency,
    Qpc,
    CorrelationFactor,
    TransmissionEfficiency,
    Margin,
    SteelMass,
    OutfitMass,
    MachineryMass,
    Freeboard,
    Stability,
    VoyagesPerYear,
    SeaDays,
    FuelCost,
    InterestRate,
    RepaymentYears,
    BuildCost,
    AnnualCapitalCharge,
    AnnualFuelCost,
    FreightRate,
    Emissions,
}

const ITEM_KEYS: &[(ReportItem, &str)] = &[
    (ReportItem::Length, "length"),
    (ReportItem::Breadth, "breadth"),
    (ReportItem::LengthBreadth, "length_breadth"),
    (ReportItem::Depth, "depth"),
    (ReportItem::Draught, "draught"),
    (ReportItem::BreadthDraught, "breadth_draught"),
    (ReportItem::Block, "block"),
    (ReportItem::Displacement, "displacement"),
    (ReportItem::CargoDeadweight, "cargo_deadweight"),
    (ReportItem::TotalDeadweight, "total_deadweight"),
    (ReportItem::PropDiameter, "prop_diameter"),
    (ReportItem::Speed, "speed"),
    (ReportItem::Range, "range"),
    (ReportItem::EngineRpm, "engine_rpm"),
    (ReportItem::PropellerRpm, "propeller_rpm"),
    (ReportItem::ServicePower, "service_power"),
    (ReportItem::InstalledPower, "installed_power"),
    (ReportItem::EffectivePower, "effective_power"),
    (ReportItem::OpenWaterEfficiency, "open_water_efficiency"),
    (ReportItem::HullEfficiency, "hull_efficiency"),
    (ReportItem::Qpc, "qpc"),
    (ReportItem::CorrelationFactor, "correlation_factor"),
    (ReportItem::TransmissionEfficiency, "transmission_efficiency"),
    (ReportItem::Margin, "margin"),
    (ReportItem::SteelMass, "steel_mass"),
    (ReportItem::OutfitMass, "outfit_mass"),
    (ReportItem::MachineryMass, "machinery_mass"),
    (ReportItem::Freeboard, "freeboard"),
    (ReportItem::Stability, "stability"),
    (ReportItem::VoyagesPerYear, "voyages_per_year"),
    (ReportItem::SeaDays, "sea_days"),
    (ReportItem::FuelCost, "fuel_cost"),
    (ReportItem::InterestRate, "interest_rate"),
    (ReportItem::RepaymentYears, "repayment_years"),
    (ReportItem::BuildCost, "build_cost"),
    (ReportItem::AnnualCapitalCharge, "annual_capital_charge"),
    (ReportItem::AnnualFuelCost, "annual_fuel_cost"),
    (ReportItem::FreightRate, "freight_rate"),
    (ReportItem::Emissions, "emissions"),
];

const ECONOMIC_ITEMS: &[ReportItem] = &[
    ReportItem::VoyagesPerYear,
    ReportItem::SeaDays,
    ReportItem::FuelCost,
    ReportItem::InterestRate,
    ReportItem::RepaymentYears,
    ReportItem::BuildCost,
    ReportItem::AnnualCapitalCharge,
    ReportItem::AnnualFuelCost,
    ReportItem::FreightRate,
];

impl ReportItem {
    pub fn all() -> impl Iterator<Item = ReportItem> {
        ITEM_KEYS.iter().map(|(item, _)| *item)
    }

    pub fn key(self) -> &'static str {
        ITEM_KEYS
            .iter()
            .find(|(item, _)| *item == self)
            .map(|(_, key)| *key)
            .unwrap_or_default()
    }

    fn is_economic(self) -> bool {
        ECONOMIC_ITEMS.contains(&self)
    }
}

impl FromStr for ReportItem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase().replace('-', "_");
        ITEM_KEYS
            .iter()
            .find(|(_, k)| *k == key)
            .map(|(item, _)| *item)
            .ok_or_else(|| Error::invalid("report item", format!("unknown item '{s}'")))
    }
}

/// Which report lines to print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    pub hidden: BTreeSet<ReportItem>,
    pub case_number: u32,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            hidden: BTreeSet::new(),
            case_number: 1,
        }
    }
}

impl ReportOptions {
    pub fn hide(mut self, item: ReportItem) -> Self {
        self.hidden.insert(item);
        self
    }

    pub fn shows(&self, item: ReportItem) -> bool {
        !self.hidden.contains(&item)
    }

    fn shows_any(&self, economic: bool) -> bool {
        ReportItem::all().any(|item| item.is_economic() == economic && self.shows(item))
    }
}

/// Render `result` as the text report.
pub fn render_report(request: &DesignRequest, result: &DesignResult, options: &ReportOptions) -> String {
    let mut out = Lines::default();
    out.push(format!(
        "Case {:3}: {} with {} engine",
        options.case_number, result.ship_type, result.fuel_type
    ));

    if !result.is_success() {
        out.push(format!("  *** {}", result.status));
    }

    let Some(state) = result.state.as_ref() else {
        out.push("------- End of output results.".to_string());
        return out.finish();
    };

    let hull = &state.hull;
    let power = &state.power;
    let masses = &state.masses;
    let nuclear = result.range_nm.is_none();
    let show = |item| options.shows(item);
    let shows_dimensions = options.shows_any(false);
    let shows_economics = result.economics.is_some() && options.shows_any(true);

    if !shows_dimensions && !shows_economics {
        out.push("  --- No output is selected!".to_string());
        out.push("------- End of output results.".to_string());
        return out.finish();
    }

    if shows_dimensions {
        out.push("  ------- Dimensions:".to_string());
    }
    out.joined(
        "   ",
        [
            show(ReportItem::Length).then(|| format!("Lbp(m) = {:8.2}", hull.length)),
            show(ReportItem::Breadth).then(|| format!("B(m) = {:7.2}", hull.breadth)),
            show(ReportItem::LengthBreadth)
                .then(|| format!("L/B = {:7.2}", hull.length / non_zero(hull.breadth))),
        ],
    );
    out.joined(
        "   ",
        [
            show(ReportItem::Depth).then(|| format!("D(m) = {:7.2}", hull.depth)),
            show(ReportItem::Draught).then(|| format!("T(m) = {:7.2}", hull.draught)),
            show(ReportItem::BreadthDraught)
                .then(|| format!("B/T = {:7.2}", hull.breadth / non_zero(hull.draught))),
        ],
    );
    out.when(show(ReportItem::Block), || format!("   CB = {:5.3}", hull.block));
    out.when(show(ReportItem::Displacement), || {
        format!("   Disp. (tonnes) = {:7.0}", state.displacement)
    });

    let estimated_teu = teu_capacity(hull.length, hull.breadth, hull.depth);
    if request.design_mode == DesignMode::Teu {
        out.push(format!("   Target TEU = {:.0}", request.teu_count));
        out.push(format!("   Est. Capacity = {} TEU", estimated_teu.floor()));
        out.push(format!("   Avg. Weight = {:5.2} t/TEU", request.teu_avg_weight));
        out.push(format!(
            "   -> Target Cargo DW = {:7.0} tonnes",
            request.target_weight()
        ));
    } else if result.ship_type == "Container ship"
        && (show(ReportItem::CargoDeadweight) || show(ReportItem::TotalDeadweight))
    {
        out.push(format!("   (Est. TEU Capacity = ~{})", estimated_teu.floor()));
    }

    out.when(show(ReportItem::CargoDeadweight), || {
        format!("   Cargo DW(tonnes) = {:7.0}", masses.cargo_deadweight)
    });
    out.when(show(ReportItem::TotalDeadweight), || {
        format!("   Total DW(tonnes) = {:7.0}", masses.total_deadweight)
    });
    out.when(show(ReportItem::PropDiameter), || {
        format!("   Prop.dia./T = {:7.2}", request.prop_diameter_ratio)
    });
    out.when(show(ReportItem::Speed), || {
        format!("   Speed (knots) = {:7.2}", request.speed_kn)
    });
    out.when(show(ReportItem::Range), || match result.range_nm {
        Some(range) => format!("   Range(N.M.) = {range:8.1}"),
        None => "   Range(N.M.) = Infinite".to_string(),
    });
    out.when(show(ReportItem::EngineRpm), || {
        format!("   Engine RPM = {:6.1}", request.engine_rpm)
    });
    out.when(show(ReportItem::PropellerRpm), || {
        let rpm = request
            .resolve()
            .map(|r| r.propeller_rpm)
            .unwrap_or(request.propeller_rpm);
        format!("   Propeller RPM = {rpm:6.1}")
    });
    out.when(show(ReportItem::ServicePower), || {
        format!(
            "   Service power = {:6.0} BHP / {:6.0} KW",
            power.service_power,
            power.service_power_kw()
        )
    });
    out.when(show(ReportItem::InstalledPower), || {
        format!(
            "   Installed power = {:6.0} BHP / {:6.0} KW",
            power.installed_power,
            power.installed_power_kw()
        )
    });

    let first: Vec<String> = [
        show(ReportItem::EffectivePower).then(|| {
            format!(
                "Pe = {:6.1}/{:6.1}",
                power.effective_power,
                power.effective_power * KW_PER_HP
            )
        }),
        show(ReportItem::OpenWaterEfficiency)
            .then(|| format!("NO = {:5.3}", power.open_water_efficiency)),
        show(ReportItem::HullEfficiency).then(|| format!("NH = {:5.3}", power.hull_efficiency)),
    ]
    .into_iter()
    .flatten()
    .collect();
    let second: Vec<String> = [
        show(ReportItem::Qpc).then(|| format!("QPC = {:5.3}", power.quasi_propulsive_coefficient)),
        show(ReportItem::CorrelationFactor)
            .then(|| format!("SCF = {:5.3}", power.correlation_factor)),
        show(ReportItem::TransmissionEfficiency)
            .then(|| format!("NT = {:5.3}", power.transmission_efficiency)),
        show(ReportItem::Margin).then(|| format!("Margin={:.0}%", POWER_MARGIN * 100.0)),
    ]
    .into_iter()
    .flatten()
    .collect();
    match (first.is_empty(), second.is_empty()) {
        (false, false) => {
            out.push(format!("    ( {}", first.join(", ")));
            out.push(format!("      {} )", second.join(", ")));
        }
        (false, true) => out.push(format!("    ( {} )", first.join(", "))),
        (true, false) => out.push(format!("    ( {} )", second.join(", "))),
        (true, true) => {}
    }

    out.when(show(ReportItem::SteelMass), || {
        format!("   Steel mass(tonnes) = {:5.0}", masses.steel)
    });
    out.when(show(ReportItem::OutfitMass), || {
        format!("   Outfit mass(tonnes) = {:5.0}", masses.outfit)
    });
    out.when(show(ReportItem::MachineryMass), || {
        format!("   Machy mass(tonnes) = {:5.0}", masses.machinery)
    });
    out.when(show(ReportItem::Freeboard), || {
        format!("   Freeboard(m) = {:5.2}", state.freeboard)
    });
    out.when(show(ReportItem::Stability), || {
        format!("   Approx. GM(m) = {:5.1}", state.metacentric_height)
    });

    if let (Some(econ), Some(params)) = (result.economics.as_ref(), request.economics.as_ref()) {
        if shows_economics {
            out.push("  ------- Economic analysis:".to_string());
            out.when(show(ReportItem::VoyagesPerYear), || {
                format!("   Voyages/year = {:6.3}", params.voyages_per_year)
            });
            out.when(show(ReportItem::SeaDays), || {
                format!("   Sea days/year = {:6.2}", params.sea_days_per_year)
            });
            if nuclear {
                if show(ReportItem::FuelCost) {
                    let installed_kw = power.installed_power_kw();
                    out.push(format!(
                        "   Reactor Cost Rate = {:.2} ($/kW)",
                        params.reactor_cost_per_kw
                    ));
                    out.push(format!("   @ {installed_kw:.0} kW (Installed)"));
                    out.push(format!(
                        "   -> Reactor CAPEX = {:6.2} (M$)",
                        econ.capital.machinery * 1.0e-6
                    ));
                }
                out.when(show(ReportItem::InterestRate), || {
                    format!("   Core Life (years) = {:3.0}", params.core_life_years)
                });
            } else {
                out.when(show(ReportItem::FuelCost), || {
                    format!("   Fuel cost/tonne = {:6.2}", params.fuel_price)
                });
            }
            out.when(show(ReportItem::InterestRate), || {
                format!("   Interest rate (%) = {:6.2}", params.interest_pct)
            });
            out.when(show(ReportItem::RepaymentYears), || {
                format!("   Repayment years = {:3}", params.repayment_years)
            });
            out.when(show(ReportItem::BuildCost), || {
                format!("   Build cost = {:5.2}(M)", econ.build_cost_musd)
            });
            out.when(show(ReportItem::AnnualCapitalCharge), || {
                format!("   Annual capital charges = {:5.2}", econ.annual.capital_charge)
            });
            out.when(show(ReportItem::AnnualFuelCost), || {
                let label = if nuclear {
                    "Annual Core/Decom Cost"
                } else {
                    "Annual fuel costs"
                };
                format!("   {label} = {:5.2}", econ.annual.energy)
            });
            out.when(show(ReportItem::FreightRate), || {
                match econ.required_rate_per_teu {
                    Some(per_teu) => format!("   Required rate = {per_teu:5.2} ($/TEU)"),
                    None => format!(
                        "   Required freight rate = {:5.2} ($/tonne)",
                        econ.required_freight_rate
                    ),
                }
            });
        }
    }

    if let Some(emissions) = result.emissions.as_ref().filter(|_| show(ReportItem::Emissions)) {
        out.push("  ------- Emissions:".to_string());
        out.push(format!("   Gross tonnage = {:8.0}", emissions.gross_tonnage));
        out.push(format!(
            "   EEDI = {:6.2} (required {:6.2}) g/t.nm",
            emissions.eedi.attained, emissions.eedi.required
        ));
        if let Some(cii) = emissions.cii.as_ref() {
            out.push(format!(
                "   CII = {:6.2} (required {:6.2}), rating {}",
                cii.index.attained, cii.index.required, cii.rating
            ));
        }
    }

    for warning in &result.warnings {
        out.push(format!("  *** Warning: {warning}"));
    }

    out.push("------- End of output results.".to_string());
    out.finish()
}

#[derive(Default)]
struct Lines {
    text: String,
}

impl Lines {
    fn push(&mut self, line: String) {
        let _ = writeln!(self.text, "{line}");
    }

    fn when(&mut self, enabled: bool, line: impl FnOnce() -> String) {
        if enabled {
            self.push(line());
        }
    }

    fn joined<const N: usize>(&mut self, indent: &str, parts: [Option<String>; N]) {
        let parts: Vec<String> = parts.into_iter().flatten().collect();
        if !parts.is_empty() {
            self.push(format!("{indent}{}", parts.join(", ")));
        }
    }

    fn finish(self) -> String {
        self.text
    }
}
