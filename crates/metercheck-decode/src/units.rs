//! MT-1820 status code tables.
//!
//! Reference data only. Classification does not consult these tables.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Quantity {
    Resistance,
    Temperature,
    Voltage,
    Current,
    DiodeTest,
    Capacitance,
    TransistorTest,
    Frequency,
    ContinuityTest,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UnitInfo {
    pub code: u16,
    pub quantity: Quantity,
    pub symbol: &'static str,
    pub factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Excitation {
    #[serde(rename = "AC")]
    Ac,
    #[serde(rename = "DC")]
    Dc,
}

const fn unit(code: u16, quantity: Quantity, symbol: &'static str, factor: f64) -> UnitInfo {
    UnitInfo { code, quantity, symbol, factor }
}

pub static UNITS: [UnitInfo; 18] = [
    unit(0x0020, Quantity::Resistance, "Ω", 1e-1),
    unit(0x2020, Quantity::Resistance, "kΩ", 1e-2),
    unit(0x1020, Quantity::Resistance, "MΩ", 1e-3),
    unit(0x0002, Quantity::Temperature, "˚C", 1e-1),
    unit(0x0001, Quantity::Temperature, "˚F", 1.0),
    unit(0x4080, Quantity::Voltage, "mV", 1e-1),
    unit(0x0080, Quantity::Voltage, "V", 1.0),
    unit(0x8040, Quantity::Current, "μA", 1e-6),
    unit(0x4040, Quantity::Current, "mA", 1e-3),
    unit(0x0040, Quantity::Current, "A", 1.0),
    unit(0x0480, Quantity::DiodeTest, "V", 1.0),
    unit(0x0004, Quantity::Capacitance, "nF", 1e-2),
    unit(0x8004, Quantity::Capacitance, "μF", 1e-6),
    unit(0x0010, Quantity::TransistorTest, "hFE", 1.0),
    unit(0x0008, Quantity::Frequency, "Hz", 1e-2),
    unit(0x2008, Quantity::Frequency, "kHz", 1e3),
    unit(0x1008, Quantity::Frequency, "MHz", 1e6),
    unit(0x0820, Quantity::ContinuityTest, "Ω", 1.0),
];

pub static EXCITATIONS: [(u16, Excitation); 2] = [
    (0x2900, Excitation::Ac),
    (0x3100, Excitation::Dc),
];

pub fn lookup_unit(code: u16) -> Option<&'static UnitInfo> {
    UNITS.iter().find(|u| u.code == code)
}

pub fn lookup_excitation(code: u16) -> Option<Excitation> {
    EXCITATIONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, e)| *e)
}
