//! # Telemetry Module
//!
//! Formats on-board telemetry into the position report comment.

/// Battery readings carried in the comment field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryTelemetry {
    /// Battery voltage in volts
    pub volts: f32,

    /// Current draw in milliamperes
    pub current_ma: u32,
}

impl BatteryTelemetry {
    pub fn new(volts: f32, current_ma: u32) -> Self {
        Self { volts, current_ma }
    }

    /// Comment fragment, e.g. `" -  _Bat.: 4.12V - Cur.: 0 mA "`
    ///
    /// # Examples
    ///
    /// ```
    /// use aprs_beacon::telemetry::BatteryTelemetry;
    ///
    /// let telemetry = BatteryTelemetry::new(4.123, 0);
    /// assert_eq!(telemetry.to_comment(), " -  _Bat.: 4.12V - Cur.: 0 mA ");
    /// ```
    pub fn to_comment(&self) -> String {
        format!(" -  _Bat.: {:.2}V - Cur.: {} mA ", self.volts, self.current_ma)
    }
}
