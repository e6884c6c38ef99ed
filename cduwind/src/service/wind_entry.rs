//! Composition of weather ingestion, wind computation and CDU entry.
//!
//! [`WindEntryService`] keeps the rows computed from the most recent
//! briefing and enters them on request. Only one entry runs at a time; a
//! second request while one is running fails with
//! [`ServiceError::AlreadyRunning`].

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::ServiceError;
use crate::control::ControlLink;
use crate::sequence::{
    build_sequence, SequenceEngine, SequenceOutcome, SequenceProgress, SequenceTiming,
};
use crate::weather::WeatherSnapshot;
use crate::wind::{compute_for_map, map_theatre_to_map_id, CduRows, MapId};

/// Ground temperature used when a briefing carries none (ISA sea level).
pub const DEFAULT_GROUND_TEMP_C: i32 = 15;

/// Rows computed from one briefing.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedWinds {
    pub rows: CduRows,
    pub map: MapId,
    pub ground_temp_c: i32,
    /// The briefing had no ground temperature and the default was used.
    pub temperature_defaulted: bool,
    /// Timestamp of the briefing the rows came from.
    pub timestamp: i64,
    pub source: String,
}

/// Service configuration.
#[derive(Debug, Clone, Default)]
pub struct WindEntryConfig {
    /// Fixed map. `None` resolves the map from each briefing's theatre.
    pub map: Option<MapId>,
    pub timing: SequenceTiming,
}

/// Orchestrates weather updates and CDU entry.
pub struct WindEntryService<L> {
    engine: SequenceEngine<L>,
    map: Option<MapId>,
    latest: Mutex<Option<ComputedWinds>>,
    tables_tx: broadcast::Sender<ComputedWinds>,
    entry_lock: tokio::sync::Mutex<()>,
}

impl<L: ControlLink> WindEntryService<L> {
    pub fn new(link: Arc<L>, config: WindEntryConfig) -> Self {
        let (tables_tx, _) = broadcast::channel(16);
        Self {
            engine: SequenceEngine::new(link, config.timing),
            map: config.map,
            latest: Mutex::new(None),
            tables_tx,
            entry_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Most recently computed rows.
    pub fn latest(&self) -> Option<ComputedWinds> {
        self.latest.lock().clone()
    }

    /// Subscribe to newly computed rows.
    pub fn subscribe_tables(&self) -> broadcast::Receiver<ComputedWinds> {
        self.tables_tx.subscribe()
    }

    /// Whether a CDU entry is currently running.
    pub fn is_entry_running(&self) -> bool {
        self.entry_lock.try_lock().is_err()
    }

    pub fn link(&self) -> &Arc<L> {
        self.engine.link()
    }

    /// Map used for a briefing: the configured map, else its theatre.
    pub fn resolve_map(&self, snapshot: &WeatherSnapshot) -> Result<MapId, ServiceError> {
        if let Some(map) = self.map {
            return Ok(map);
        }
        let theatre = snapshot.theatre();
        theatre
            .and_then(map_theatre_to_map_id)
            .ok_or_else(|| ServiceError::MapUnresolved {
                theatre: theatre.map(str::to_string),
            })
    }

    /// Compute rows for a briefing and make them the latest.
    ///
    /// On error the previous rows are kept.
    pub fn apply_weather(&self, snapshot: &WeatherSnapshot) -> Result<ComputedWinds, ServiceError> {
        let map = self.resolve_map(snapshot)?;
        let ground_temp_c = snapshot.ground_temp.unwrap_or(DEFAULT_GROUND_TEMP_C);

        let computed = ComputedWinds {
            rows: compute_for_map(
                &snapshot.ground,
                &snapshot.mid,
                &snapshot.high,
                ground_temp_c,
                map,
            ),
            map,
            ground_temp_c,
            temperature_defaulted: snapshot.ground_temp.is_none(),
            timestamp: snapshot.timestamp,
            source: snapshot.source.clone(),
        };

        log_table(&computed);
        *self.latest.lock() = Some(computed.clone());
        let _ = self.tables_tx.send(computed.clone());
        Ok(computed)
    }

    /// Apply briefings from `weather` until it closes or `shutdown` fires.
    pub async fn run_weather_loop(
        &self,
        mut weather: broadcast::Receiver<WeatherSnapshot>,
        shutdown: CancellationToken,
    ) {
        loop {
            let received = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                received = weather.recv() => received,
            };

            match received {
                Ok(snapshot) => {
                    if let Err(e) = self.apply_weather(&snapshot) {
                        warn!(error = %e, timestamp = snapshot.timestamp, "Briefing not applied");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Weather updates skipped, consumer lagging");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        debug!("Weather loop stopped");
    }

    /// Enter the latest rows on the CDU.
    pub async fn enter_latest(
        &self,
        progress: Option<&mpsc::Sender<SequenceProgress>>,
        cancel: &CancellationToken,
    ) -> Result<SequenceOutcome, ServiceError> {
        let rows = self.latest().ok_or(ServiceError::NoWindData)?.rows;
        self.enter_rows(&rows, progress, cancel).await
    }

    /// Enter explicit rows on the CDU.
    pub async fn enter_rows(
        &self,
        rows: &CduRows,
        progress: Option<&mpsc::Sender<SequenceProgress>>,
        cancel: &CancellationToken,
    ) -> Result<SequenceOutcome, ServiceError> {
        let _running = self
            .entry_lock
            .try_lock()
            .map_err(|_| ServiceError::AlreadyRunning)?;

        let commands = build_sequence(rows, *self.engine.timing())?;
        Ok(self.engine.execute(&commands, progress, cancel).await?)
    }
}

fn log_table(computed: &ComputedWinds) {
    info!(
        map = %computed.map,
        ground_temp = computed.ground_temp_c,
        temperature_defaulted = computed.temperature_defaulted,
        source = %computed.source,
        "Computed CDU wind table"
    );
    for row in &computed.rows {
        info!(
            band = row.band,
            bearing = row.bearing,
            speed = row.speed,
            temperature = row.temperature,
            "  {}",
            row
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::{MissionInfo, WindLayer};
    use std::collections::HashMap;
    use std::time::Duration;

    #[derive(Default)]
    struct SilentLink {
        sent: Mutex<Vec<(String, i32)>>,
        /// Hold every send this long.
        send_delay: Duration,
    }

    impl ControlLink for SilentLink {
        async fn send_control(&self, name: &str, value: i32) -> bool {
            tokio::time::sleep(self.send_delay).await;
            self.sent.lock().push((name.to_string(), value));
            true
        }

        fn value(&self, _name: &str) -> Option<String> {
            None
        }

        fn snapshot(&self) -> HashMap<String, String> {
            HashMap::new()
        }
    }

    fn snapshot(theatre: Option<&str>, ground_temp: Option<i32>) -> WeatherSnapshot {
        let wind = WindLayer {
            speed: 10.0,
            direction: 270.0,
            nav_direction: None,
        };
        WeatherSnapshot {
            ground: wind.clone(),
            mid: wind.clone(),
            high: wind,
            ground_temp,
            timestamp: 1_700_000_000,
            source: "test".to_string(),
            mission: theatre.map(|t| MissionInfo {
                theatre: Some(t.to_string()),
                sortie: None,
                start_time: None,
            }),
        }
    }

    fn service(map: Option<MapId>) -> WindEntryService<SilentLink> {
        WindEntryService::new(
            Arc::new(SilentLink::default()),
            WindEntryConfig {
                map,
                timing: SequenceTiming::immediate(),
            },
        )
    }

    #[test]
    fn test_map_from_theatre() {
        let service = service(None);
        let computed = service
            .apply_weather(&snapshot(Some("Caucasus"), Some(20)))
            .unwrap();

        assert_eq!(computed.map, MapId::Caucasus);
        assert_eq!(computed.rows[0].bearing, 263);
        assert_eq!(service.latest(), Some(computed));
    }

    #[test]
    fn test_configured_map_wins_over_theatre() {
        let service = service(Some(MapId::Kola));
        let computed = service
            .apply_weather(&snapshot(Some("Caucasus"), Some(20)))
            .unwrap();
        assert_eq!(computed.map, MapId::Kola);
        // 270 - 15
        assert_eq!(computed.rows[0].bearing, 255);
    }

    #[test]
    fn test_missing_temperature_uses_isa_default() {
        let service = service(Some(MapId::Caucasus));
        let computed = service.apply_weather(&snapshot(None, None)).unwrap();
        assert!(computed.temperature_defaulted);
        assert_eq!(computed.rows[0].temperature, DEFAULT_GROUND_TEMP_C);
    }

    #[test]
    fn test_unresolved_map_keeps_previous_rows() {
        let service = service(None);
        let first = service
            .apply_weather(&snapshot(Some("Syria"), Some(10)))
            .unwrap();

        let err = service
            .apply_weather(&snapshot(Some("Moon"), Some(30)))
            .unwrap_err();
        assert!(matches!(err, ServiceError::MapUnresolved { theatre: Some(ref t) } if t == "Moon"));
        assert_eq!(service.latest(), Some(first));

        let err = service.apply_weather(&snapshot(None, Some(30))).unwrap_err();
        assert!(matches!(err, ServiceError::MapUnresolved { theatre: None }));
    }

    #[tokio::test]
    async fn test_enter_without_weather_fails() {
        let service = service(None);
        let err = service
            .enter_latest(None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NoWindData));
    }

    #[tokio::test]
    async fn test_enter_latest_drives_link() {
        let service = service(Some(MapId::Caucasus));
        service.apply_weather(&snapshot(None, Some(20))).unwrap();

        let outcome = service
            .enter_latest(None, &CancellationToken::new())
            .await
            .unwrap();

        assert!(outcome.is_completed());
        let sent = service.link().sent.lock().clone();
        assert_eq!(sent[0], ("CDU_SYS".to_string(), 1));
        assert!(!service.is_entry_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_entry_is_rejected_while_running() {
        let link = SilentLink {
            send_delay: Duration::from_millis(10),
            ..Default::default()
        };
        let service = Arc::new(WindEntryService::new(
            Arc::new(link),
            WindEntryConfig {
                map: Some(MapId::Caucasus),
                timing: SequenceTiming::immediate(),
            },
        ));
        service.apply_weather(&snapshot(None, Some(20))).unwrap();

        let cancel = CancellationToken::new();
        let first = {
            let service = Arc::clone(&service);
            let cancel = cancel.clone();
            tokio::spawn(async move { service.enter_latest(None, &cancel).await })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(service.is_entry_running());
        let err = service
            .enter_latest(None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyRunning));

        cancel.cancel();
        let result = first.await.unwrap();
        assert!(result.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_weather_loop_applies_updates() {
        let service = Arc::new(service(Some(MapId::Caucasus)));
        let (tx, rx) = broadcast::channel(4);
        let mut tables = service.subscribe_tables();
        let shutdown = CancellationToken::new();

        let task = {
            let service = Arc::clone(&service);
            let shutdown = shutdown.clone();
            tokio::spawn(async move { service.run_weather_loop(rx, shutdown).await })
        };

        tx.send(snapshot(None, Some(20))).unwrap();
        let table = tables.recv().await.unwrap();
        assert_eq!(table.rows[4].temperature, -32);

        shutdown.cancel();
        task.await.unwrap();
    }
}
