use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::sync::mpsc;

use crate::batch::types::{BatchRequest, Progress, Station, StationSchedule, TaggedPass, Target};
use crate::predict::{predict_satellite_passes, OrbitalState, Pass, PredictError, TleEntry};

/// Scan every (target, station) pair in target-major order.
///
/// `prepare` runs once per target and `scan` once per pair. A target that
/// fails to prepare is logged for each of its pairs, contributes no passes
/// and still counts towards progress. Each station's passes come back
/// sorted by start, ties kept in pair order.
pub fn run<T, S, P, F, R>(
    targets: &[T],
    stations: &[Station],
    prepare: P,
    scan: F,
    mut on_progress: R,
) -> Vec<StationSchedule>
where
    T: Target,
    P: Fn(&T) -> Result<S, PredictError>,
    F: Fn(&S, &Station) -> Vec<Pass>,
    R: FnMut(Progress),
{
    let total = targets.len() * stations.len();
    let mut schedules = empty_schedules(stations);
    let mut completed = 0;

    for target in targets {
        let prepared = prepare(target);
        for (schedule, station) in schedules.iter_mut().zip(stations) {
            let passes = scan_pair(&scan, &prepared, target, station);
            schedule.passes.extend(tag(target, station, passes));

            completed += 1;
            on_progress(Progress { completed, total });
        }
    }

    sort_schedules(&mut schedules);
    schedules
}

/// [`run`] on a pool of `workers` threads.
///
/// Pair results are collected in the same order [`run`] visits them, so
/// both return identical schedules. Progress is reported from the calling
/// thread in completion order.
pub fn run_parallel<T, S, P, F, R>(
    targets: &[T],
    stations: &[Station],
    prepare: P,
    scan: F,
    workers: usize,
    mut on_progress: R,
) -> Vec<StationSchedule>
where
    T: Target + Sync,
    S: Send + Sync,
    P: Fn(&T) -> Result<S, PredictError> + Sync,
    F: Fn(&S, &Station) -> Vec<Pass> + Sync,
    R: FnMut(Progress),
{
    let pairs: Vec<(usize, usize)> = (0..targets.len())
        .flat_map(|t| (0..stations.len()).map(move |s| (t, s)))
        .collect();
    let total = pairs.len();

    let pool = match ThreadPoolBuilder::new()
        .num_threads(workers.clamp(1, total.max(1)))
        .build()
    {
        Ok(pool) => pool,
        Err(e) => {
            log::warn!(
                "Failed to start {} prediction workers, running sequentially: {}",
                workers,
                e
            );
            return run(targets, stations, prepare, scan, on_progress);
        }
    };

    let (tx, rx) = mpsc::channel::<()>();
    let mut results: Vec<Vec<Pass>> = Vec::new();

    pool.in_place_scope(|scope| {
        let results = &mut results;
        let (pairs, prepare, scan) = (&pairs, &prepare, &scan);
        scope.spawn(move |_| {
            let prepared: Vec<Result<S, PredictError>> =
                targets.par_iter().map(|target| prepare(target)).collect();
            *results = pairs
                .par_iter()
                .map(|&(t, s)| {
                    let passes = scan_pair(scan, &prepared[t], &targets[t], &stations[s]);
                    // Receiver outlives the pool work.
                    let _ = tx.send(());
                    passes
                })
                .collect();
        });

        for (done, ()) in rx.iter().enumerate() {
            on_progress(Progress {
                completed: done + 1,
                total,
            });
        }
    });

    let mut schedules = empty_schedules(stations);
    for (&(t, s), passes) in pairs.iter().zip(results) {
        schedules[s]
            .passes
            .extend(tag(&targets[t], &stations[s], passes));
    }

    sort_schedules(&mut schedules);
    schedules
}

/// Scan loaded TLE targets over every station.
///
/// SGP4 is initialised once per target and shared by all of its stations.
pub fn predict_schedules<R: FnMut(Progress)>(
    targets: &[&TleEntry],
    stations: &[Station],
    request: &BatchRequest,
    on_progress: R,
) -> Vec<StationSchedule> {
    let prepare = |target: &&TleEntry| target.orbital_state();
    let scan = |state: &OrbitalState, station: &Station| -> Vec<Pass> {
        predict_satellite_passes(state, &station.site, request.start, request.days)
    };

    if request.workers > 1 {
        run_parallel(targets, stations, prepare, scan, request.workers, on_progress)
    } else {
        run(targets, stations, prepare, scan, on_progress)
    }
}

fn scan_pair<T, S, F>(
    scan: &F,
    prepared: &Result<S, PredictError>,
    target: &T,
    station: &Station,
) -> Vec<Pass>
where
    T: Target,
    F: Fn(&S, &Station) -> Vec<Pass>,
{
    match prepared {
        Ok(state) => scan(state, station),
        Err(e) => {
            log::warn!(
                "Failed to predict passes for {} over {}: {}",
                target.info().name,
                station.name,
                e
            );
            Vec::new()
        }
    }
}

fn tag<'a, T: Target>(
    target: &'a T,
    station: &'a Station,
    passes: Vec<Pass>,
) -> impl Iterator<Item = TaggedPass> + 'a {
    let info = target.info();
    passes.into_iter().map(move |pass| TaggedPass {
        satellite: info.name.clone(),
        norad_id: info.norad_id,
        station_id: station.id.clone(),
        station_name: station.name.clone(),
        pass,
    })
}

fn empty_schedules(stations: &[Station]) -> Vec<StationSchedule> {
    stations
        .iter()
        .map(|station| StationSchedule {
            station_id: station.id.clone(),
            station_name: station.name.clone(),
            passes: Vec::new(),
        })
        .collect()
}

fn sort_schedules(schedules: &mut [StationSchedule]) {
    for schedule in schedules {
        schedule.passes.sort_by_key(|p| p.pass.start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::{CompassPoint, ObserverSite, SatelliteInfo};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeTarget {
        info: SatelliteInfo,
        fails: bool,
    }

    impl Target for FakeTarget {
        fn info(&self) -> &SatelliteInfo {
            &self.info
        }
    }

    fn target(norad_id: u32, fails: bool) -> FakeTarget {
        FakeTarget {
            info: SatelliteInfo {
                name: format!("SAT-{}", norad_id),
                norad_id,
                tle_source: "test".into(),
            },
            fails,
        }
    }

    fn station(id: &str) -> Station {
        Station {
            id: id.into(),
            name: id.to_uppercase(),
            site: ObserverSite::default(),
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
    }

    fn pass_at(minutes: i64) -> Pass {
        let start = t0() + Duration::minutes(minutes);
        Pass {
            start,
            peak: start + Duration::minutes(4),
            end: start + Duration::minutes(8),
            peak_elevation_deg: 40.0,
            start_azimuth_deg: 0.0,
            end_azimuth_deg: 180.0,
            start_compass: CompassPoint::N,
            end_compass: CompassPoint::S,
        }
    }

    fn fake_prepare(target: &FakeTarget) -> Result<i64, PredictError> {
        if target.fails {
            return Err(PredictError::Propagation("decayed".into()));
        }
        Ok(i64::from(target.info.norad_id))
    }

    /// Satellite n passes station "a" at minutes 100/n and 300, station "b" at 50 * n.
    fn fake_scan(n: &i64, station: &Station) -> Vec<Pass> {
        match station.id.as_str() {
            "a" => vec![pass_at(100 / n), pass_at(300)],
            _ => vec![pass_at(50 * n)],
        }
    }

    #[test]
    fn merges_and_sorts_per_station() {
        let targets = vec![target(1, false), target(2, false)];
        let stations = vec![station("a"), station("b")];

        let schedules = run(&targets, &stations, fake_prepare, fake_scan, |_| {});

        assert_eq!(schedules.len(), 2);
        assert_eq!(schedules[0].station_id, "a");
        assert_eq!(schedules[1].station_id, "b");

        let a: Vec<_> = schedules[0]
            .passes
            .iter()
            .map(|p| (p.norad_id, p.pass.start))
            .collect();
        assert_eq!(
            a,
            vec![
                (2, t0() + Duration::minutes(50)),
                (1, t0() + Duration::minutes(100)),
                // tie: inserted by satellite 1 first
                (1, t0() + Duration::minutes(300)),
                (2, t0() + Duration::minutes(300)),
            ]
        );
        assert!(schedules[1].passes.iter().all(|p| p.station_name == "B"));
        assert_eq!(schedules[1].passes[0].satellite, "SAT-1");
    }

    #[test]
    fn failing_pair_does_not_abort_batch() {
        let targets = vec![target(1, false), target(7, true), target(2, false)];
        let stations = vec![station("a"), station("b")];
        let mut progress = Vec::new();

        let schedules = run(&targets, &stations, fake_prepare, fake_scan, |p| {
            progress.push(p)
        });

        assert_eq!(progress.len(), 6);
        for (i, p) in progress.iter().enumerate() {
            assert_eq!(p.completed, i + 1);
            assert_eq!(p.total, 6);
        }
        assert!(schedules
            .iter()
            .flat_map(|s| &s.passes)
            .all(|p| p.norad_id != 7));
        assert_eq!(schedules[0].passes.len(), 4);
        assert_eq!(schedules[1].passes.len(), 2);
    }

    #[test]
    fn parallel_matches_sequential() {
        let targets: Vec<_> = (1..=6).map(|n| target(n, n == 4)).collect();
        let stations = vec![station("a"), station("b"), station("c")];

        let sequential = run(&targets, &stations, fake_prepare, fake_scan, |_| {});
        let mut progress = Vec::new();
        let parallel = run_parallel(&targets, &stations, fake_prepare, fake_scan, 4, |p| {
            progress.push(p)
        });

        assert_eq!(sequential, parallel);
        let completed: Vec<_> = progress.iter().map(|p| p.completed).collect();
        assert_eq!(completed, (1..=18).collect::<Vec<_>>());
    }

    #[test]
    fn prepares_each_target_once() {
        let targets: Vec<_> = (1..=3).map(|n| target(n, n == 2)).collect();
        let stations = vec![station("a"), station("b"), station("c"), station("d")];

        for workers in [1, 3] {
            let calls = AtomicUsize::new(0);
            let counting = |t: &FakeTarget| {
                calls.fetch_add(1, Ordering::SeqCst);
                fake_prepare(t)
            };
            let mut reports = 0;
            let schedules = if workers > 1 {
                run_parallel(&targets, &stations, counting, fake_scan, workers, |_| {
                    reports += 1
                })
            } else {
                run(&targets, &stations, counting, fake_scan, |_| reports += 1)
            };

            assert_eq!(calls.load(Ordering::SeqCst), 3);
            // the failed target still counts once per station
            assert_eq!(reports, 12);
            assert_eq!(schedules[0].passes.len(), 4);
        }
    }

    #[test]
    fn empty_inputs() {
        let targets: Vec<FakeTarget> = Vec::new();
        let stations = vec![station("a")];
        let schedules = run_parallel(&targets, &stations, fake_prepare, fake_scan, 8, |_| {});
        assert_eq!(schedules.len(), 1);
        assert!(schedules[0].passes.is_empty());
    }
}
