//! # Beacon Service
//!
//! Turns the latest GPS fix into a framed position report once per tick and
//! hands it to the radio.
//!
//! A packet is sent only when a new fix arrived since the previous one.
//! Transmit failures are logged and dropped; the next tick carries a fresher
//! fix anyway.

use bytes::Bytes;
use std::future::Future;
use tokio::io::AsyncBufRead;
use tokio::time::{interval, Duration};
use tracing::{debug, error, info, warn};

use crate::aprs::encoder::assemble_with_precision;
use crate::aprs::message::AprsMessage;
use crate::aprs::protocol::{PositionReport, Precision};
use crate::aprs::timestamp::{format_date, format_time};
use crate::ax25::frame::{encode_ui_frame, encode_ui_frame_with_fcs};
use crate::ax25::kiss::encode_kiss_frame;
use crate::ax25::Address;
use crate::config::{Config, Framing};
use crate::error::Result;
use crate::gps::{FixFeed, FixTracker, GpsFix, GpsReceiver};
use crate::radio::Radio;
use crate::telemetry::BatteryTelemetry;

/// KISS port the TNC transmits on
const KISS_PORT: u8 = 0;

/// Build a position report from a receiver snapshot
///
/// Floating point telemetry is truncated toward zero; clamping to protocol
/// ranges happens at assembly time.
pub fn report_from_gps<G: GpsReceiver + ?Sized>(
    gps: &G,
    symbol: char,
    overlay: char,
    comment: String,
) -> PositionReport {
    PositionReport {
        latitude: gps.raw_latitude(),
        longitude: gps.raw_longitude(),
        altitude_feet: gps.altitude_feet() as i32,
        speed_knots: gps.speed_knots() as i32,
        course_degrees: gps.course_degrees() as i32,
        symbol,
        overlay,
        comment,
    }
}

/// Periodic APRS position beacon
pub struct Beacon<R> {
    radio: R,
    source: Address,
    destination: Address,
    symbol: char,
    overlay: char,
    comment: String,
    framing: Framing,
    precision: Precision,
    interval: Duration,
    packets_sent: u64,
}

impl<R> std::fmt::Debug for Beacon<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Beacon")
            .field("source", &self.source)
            .field("destination", &self.destination)
            .field("framing", &self.framing)
            .field("precision", &self.precision)
            .field("packets_sent", &self.packets_sent)
            .finish_non_exhaustive()
    }
}

impl<R: Radio> Beacon<R> {
    /// Create a beacon transmitting through `radio`
    ///
    /// # Errors
    ///
    /// Returns `InvalidAddress` if the station callsign or destination is malformed,
    /// or `Config` if any other value is out of range
    pub fn new(radio: R, config: &Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            radio,
            source: config.source_address()?,
            destination: config.destination_address()?,
            symbol: config.station.symbol,
            overlay: config.station.overlay,
            comment: config.beacon.comment.clone(),
            framing: config.beacon.framing,
            precision: config.beacon.precision(),
            interval: Duration::from_millis(config.beacon.interval_ms),
            packets_sent: 0,
        })
    }

    pub fn packets_sent(&self) -> u64 {
        self.packets_sent
    }

    /// Assemble the APRS packet body for one fix
    ///
    /// The comment is the battery fragment (if any) followed by the
    /// configured static comment.
    pub fn build_body<G: GpsReceiver + ?Sized>(
        &self,
        gps: &G,
        battery: Option<&BatteryTelemetry>,
    ) -> String {
        let mut comment = battery.map(BatteryTelemetry::to_comment).unwrap_or_default();
        comment.push_str(&self.comment);

        let report = report_from_gps(gps, self.symbol, self.overlay, comment);
        assemble_with_precision(&report, self.precision)
    }

    /// Frame a packet body for the radio
    pub fn frame(&self, body: &str) -> Bytes {
        match self.framing {
            Framing::Text => Bytes::from(self.message(body).to_string()),
            Framing::Lora => Bytes::from(self.message(body).encode_lora()),
            Framing::Ax25 => encode_ui_frame_with_fcs(&self.destination, &self.source, body.as_bytes()),
            Framing::Kiss => {
                let frame = encode_ui_frame(&self.destination, &self.source, body.as_bytes());
                Bytes::from(encode_kiss_frame(KISS_PORT, &frame))
            }
        }
    }

    fn message(&self, body: &str) -> AprsMessage {
        AprsMessage::new(self.source.clone(), self.destination.clone(), body.to_string())
    }

    /// Transmit one report if the receiver has an update
    ///
    /// # Returns
    ///
    /// * `bool` - Whether a packet was transmitted
    pub async fn beacon<G: GpsReceiver + ?Sized>(
        &mut self,
        gps: &G,
        battery: Option<&BatteryTelemetry>,
    ) -> bool {
        if !gps.fix_updated() {
            return false;
        }

        let body = self.build_body(gps, battery);
        let packet = self.frame(&body);

        match self.radio.transmit(&packet).await {
            Ok(()) => {
                self.packets_sent += 1;
                info!("{}>{}:{}", self.source, self.destination, body);
                true
            }
            Err(e) => {
                warn!("Failed to transmit position report: {}", e);
                false
            }
        }
    }

    /// Run until `shutdown` resolves or the fix feed ends
    ///
    /// A fix still pending when the feed ends is transmitted before returning.
    ///
    /// # Errors
    ///
    /// Returns error if reading the fix feed fails
    pub async fn run<F, S>(&mut self, mut feed: FixFeed<F>, shutdown: S) -> Result<()>
    where
        F: AsyncBufRead + Unpin,
        S: Future<Output = ()>,
    {
        let mut tracker = FixTracker::new();
        let mut beacon_interval = interval(self.interval);
        tokio::pin!(shutdown);

        info!(
            "Beaconing every {} ms as {} ({:?} framing)",
            self.interval.as_millis(),
            self.source,
            self.framing
        );

        let outcome = loop {
            tokio::select! {
                _ = beacon_interval.tick() => {
                    self.beacon_tracked(&mut tracker).await;
                }

                fix = feed.next_fix() => {
                    match fix {
                        Ok(Some(fix)) => {
                            log_fix(&fix);
                            tracker.update(fix);
                        }
                        Ok(None) => {
                            info!("Fix feed ended");
                            self.beacon_tracked(&mut tracker).await;
                            break Ok(());
                        }
                        Err(e) => {
                            error!("Fix feed failed: {}", e);
                            break Err(e);
                        }
                    }
                }

                _ = &mut shutdown => {
                    info!("Shutting down...");
                    break Ok(());
                }
            }
        };

        info!("Total packets sent: {}", self.packets_sent);
        outcome
    }

    /// Transmit the tracked fix at most once, whether or not the radio accepts it
    async fn beacon_tracked(&mut self, tracker: &mut FixTracker) {
        if !tracker.fix_updated() {
            return;
        }

        let battery = tracker.latest().and_then(|fix| fix.battery());
        self.beacon(&*tracker, battery.as_ref()).await;
        tracker.clear_updated();
    }
}

fn log_fix(fix: &GpsFix) {
    if let Some(satellites) = fix.satellite_count() {
        debug!("Sat count: {}", satellites);
    }
    if let Some(time) = &fix.time {
        debug!("Fix time: {} {}", format_date(time), format_time(time));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aprs::protocol::RawCoordinate;
    use crate::ax25::kiss::KISS_FEND;
    use crate::config::{BeaconConfig, GpsConfig, LoggingConfig, RadioConfig, StationConfig};
    use crate::error::BeaconError;
    use crate::gps::{parse_fix, MockGpsReceiver};
    use crate::radio::MockRadio;
    use std::sync::{Arc, Mutex};

    fn test_config(framing: Framing, dao: bool) -> Config {
        Config {
            station: StationConfig {
                callsign: "N0CALL".to_string(),
                ssid: 11,
                destination: "APLT00".to_string(),
                symbol: 'O',
                overlay: '/',
            },
            radio: RadioConfig {
                port: "/dev/ttyUSB0".to_string(),
                baud_rate: 9600,
                timeout_ms: 1000,
                reconnect_interval_ms: 2000,
                max_open_attempts: 5,
                frequency_mhz: 443.775,
            },
            gps: GpsConfig::default(),
            beacon: BeaconConfig {
                interval_ms: 1000,
                framing,
                dao,
                comment: String::new(),
            },
            logging: LoggingConfig::default(),
        }
    }

    fn updated_receiver() -> MockGpsReceiver {
        let mut gps = MockGpsReceiver::new();
        gps.expect_fix_updated().return_const(true);
        gps.expect_raw_latitude()
            .return_const(RawCoordinate::new(49, 58_333_333, false));
        gps.expect_raw_longitude()
            .return_const(RawCoordinate::new(72, 29_166_667, true));
        gps.expect_altitude_feet().return_const(1234.9);
        gps.expect_speed_knots().return_const(45.6);
        gps.expect_course_degrees().return_const(123.4);
        gps.expect_satellite_count().return_const(Some(8u32));
        gps
    }

    /// Radio that records every payload
    fn recording_radio() -> (MockRadio, Arc<Mutex<Vec<Vec<u8>>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&sent);
        let mut radio = MockRadio::new();
        radio.expect_transmit().returning(move |payload| {
            log.lock().unwrap().push(payload.to_vec());
            Ok(())
        });
        (radio, sent)
    }

    #[test]
    fn test_report_from_gps_truncates() {
        let gps = updated_receiver();
        let report = report_from_gps(&gps, 'O', '/', String::new());

        assert_eq!(report.altitude_feet, 1234);
        assert_eq!(report.speed_knots, 45);
        assert_eq!(report.course_degrees, 123);
    }

    #[test]
    fn test_build_body_with_battery() {
        let beacon = Beacon::new(MockRadio::new(), &test_config(Framing::Text, false)).unwrap();
        let battery = BatteryTelemetry::new(4.12, 0);

        assert_eq!(
            beacon.build_body(&updated_receiver(), Some(&battery)),
            "!4903.50N/07201.75WO123/045/A=001234 -  _Bat.: 4.12V - Cur.: 0 mA "
        );
    }

    #[test]
    fn test_build_body_dao_appends_token_after_comment() {
        let mut config = test_config(Framing::Text, true);
        config.beacon.comment = " rocket".to_string();
        let beacon = Beacon::new(MockRadio::new(), &config).unwrap();

        let body = beacon.build_body(&updated_receiver(), None);
        assert!(body.starts_with("!4903.50N/07201.75WO123/045/A=001234 rocket!w"));
        assert!(body.ends_with('!'));
    }

    #[test]
    fn test_frame_text() {
        let beacon = Beacon::new(MockRadio::new(), &test_config(Framing::Text, false)).unwrap();
        assert_eq!(&beacon.frame("!body")[..], b"N0CALL-11>APLT00:!body");
    }

    #[test]
    fn test_frame_lora() {
        let beacon = Beacon::new(MockRadio::new(), &test_config(Framing::Lora, false)).unwrap();
        let packet = beacon.frame("!body");

        assert_eq!(&packet[..3], &[b'<', 0xFF, 0x01]);
        assert_eq!(&packet[3..], b"N0CALL-11>APLT00:!body");
    }

    #[test]
    fn test_frame_ax25() {
        let beacon = Beacon::new(MockRadio::new(), &test_config(Framing::Ax25, false)).unwrap();
        let packet = beacon.frame("!body");

        // 16-byte header + body + FCS
        assert_eq!(packet.len(), 16 + 5 + 2);
        assert_eq!(&packet[16..21], b"!body");
    }

    #[test]
    fn test_frame_kiss() {
        let beacon = Beacon::new(MockRadio::new(), &test_config(Framing::Kiss, false)).unwrap();
        let packet = beacon.frame("!body");

        assert_eq!(packet[0], KISS_FEND);
        assert_eq!(packet[1], 0x00);
        assert_eq!(packet[packet.len() - 1], KISS_FEND);
        assert!(packet.ends_with(b"!body\xC0"));
    }

    #[test]
    fn test_new_rejects_bad_callsign() {
        let mut config = test_config(Framing::Text, false);
        config.station.callsign = "BAD CALL".to_string();
        assert!(matches!(
            Beacon::new(MockRadio::new(), &config),
            Err(BeaconError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_new_rejects_zero_interval() {
        let mut config = test_config(Framing::Text, false);
        config.beacon.interval_ms = 0;
        assert!(matches!(
            Beacon::new(MockRadio::new(), &config),
            Err(BeaconError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_beacon_skips_without_update() {
        let mut gps = MockGpsReceiver::new();
        gps.expect_fix_updated().return_const(false);

        let mut radio = MockRadio::new();
        radio.expect_transmit().never();

        let mut beacon = Beacon::new(radio, &test_config(Framing::Text, false)).unwrap();
        assert!(!beacon.beacon(&gps, None).await);
        assert_eq!(beacon.packets_sent(), 0);
    }

    #[tokio::test]
    async fn test_beacon_transmits_framed_report() {
        let (radio, sent) = recording_radio();
        let mut beacon = Beacon::new(radio, &test_config(Framing::Text, false)).unwrap();

        assert!(beacon.beacon(&updated_receiver(), None).await);
        assert_eq!(beacon.packets_sent(), 1);
        assert_eq!(
            sent.lock().unwrap()[0],
            b"N0CALL-11>APLT00:!4903.50N/07201.75WO123/045/A=001234".to_vec()
        );
    }

    #[tokio::test]
    async fn test_beacon_transmit_failure_not_retried() {
        let mut radio = MockRadio::new();
        radio
            .expect_transmit()
            .times(1)
            .returning(|_| Err(BeaconError::Radio("link down".to_string())));

        let mut beacon = Beacon::new(radio, &test_config(Framing::Lora, false)).unwrap();
        assert!(!beacon.beacon(&updated_receiver(), None).await);
        assert_eq!(beacon.packets_sent(), 0);
    }

    #[tokio::test]
    async fn test_failed_transmit_is_not_repeated_on_next_tick() {
        let attempts = Arc::new(Mutex::new(0u32));
        let counter = Arc::clone(&attempts);
        let mut radio = MockRadio::new();
        radio.expect_transmit().returning(move |_| {
            let mut count = counter.lock().unwrap();
            *count += 1;
            if *count == 1 {
                Err(BeaconError::Radio("link down".to_string()))
            } else {
                Ok(())
            }
        });

        let mut beacon = Beacon::new(radio, &test_config(Framing::Lora, false)).unwrap();
        let mut tracker = FixTracker::new();
        tracker.update(parse_fix(r#"{"latitude": 49.5, "longitude": -72.25}"#).unwrap());

        beacon.beacon_tracked(&mut tracker).await;
        beacon.beacon_tracked(&mut tracker).await;
        assert_eq!(*attempts.lock().unwrap(), 1);
        assert_eq!(beacon.packets_sent(), 0);
        assert!(!tracker.fix_updated());

        // A fresh fix goes out on the next tick
        tracker.update(parse_fix(r#"{"latitude": 49.6, "longitude": -72.25}"#).unwrap());
        beacon.beacon_tracked(&mut tracker).await;
        assert_eq!(*attempts.lock().unwrap(), 2);
        assert_eq!(beacon.packets_sent(), 1);
    }

    #[tokio::test]
    async fn test_beacon_output_is_repeatable() {
        let (radio, sent) = recording_radio();
        let mut beacon = Beacon::new(radio, &test_config(Framing::Ax25, true)).unwrap();
        let gps = updated_receiver();

        beacon.beacon(&gps, None).await;
        beacon.beacon(&gps, None).await;

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], sent[1]);
    }

    #[tokio::test]
    async fn test_run_sends_latest_fix_and_stops_at_end_of_feed() {
        let (radio, sent) = recording_radio();
        let mut beacon = Beacon::new(radio, &test_config(Framing::Text, false)).unwrap();

        let input = concat!(
            r#"{"latitude": 10.0, "longitude": 20.0}"#,
            "\n",
            r#"{"latitude": 49.5, "longitude": -72.25, "course_degrees": 0, "battery_volts": 3.9}"#,
            "\n",
        );
        let feed = FixFeed::new(input.as_bytes());

        beacon.run(feed, std::future::pending()).await.unwrap();

        let sent = sent.lock().unwrap();
        assert!(!sent.is_empty());
        assert_eq!(beacon.packets_sent(), sent.len() as u64);

        let last = String::from_utf8(sent.last().unwrap().clone()).unwrap();
        assert_eq!(
            last,
            "N0CALL-11>APLT00:!4930.00N/07215.00WO360/000/A=000000 -  _Bat.: 3.90V - Cur.: 0 mA "
        );
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let mut radio = MockRadio::new();
        radio.expect_transmit().never();
        let mut beacon = Beacon::new(radio, &test_config(Framing::Text, false)).unwrap();

        // Empty stdin-like reader that never yields a fix before shutdown
        let (_writer, reader) = tokio::io::duplex(64);
        let feed = FixFeed::new(tokio::io::BufReader::new(reader));

        beacon.run(feed, async {}).await.unwrap();
        assert_eq!(beacon.packets_sent(), 0);
    }

    #[tokio::test]
    async fn test_run_returns_feed_read_error() {
        let mut radio = MockRadio::new();
        radio.expect_transmit().never();
        let mut beacon = Beacon::new(radio, &test_config(Framing::Text, false)).unwrap();

        let reader = tokio_test::io::Builder::new()
            .read_error(std::io::Error::new(std::io::ErrorKind::Other, "gps unplugged"))
            .build();
        let feed = FixFeed::new(tokio::io::BufReader::new(reader));

        let result = beacon.run(feed, std::future::pending()).await;
        assert!(matches!(result, Err(BeaconError::Io(_))));
        assert_eq!(beacon.packets_sent(), 0);
    }
}
