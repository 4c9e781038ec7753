use crate::inflow_series::{TimeSeriesRecord, TimeSeriesStore};

/**
Interpolates the inflow state at an arbitrary query time.

Piecewise-linear in time between records, flat extrapolation outside the
recorded range. Total over all query times given a non-empty store: queries
before the first record return it verbatim, queries after the last record
return that one, and a single-record store answers every query with its one
record.

The species fractions of an interior blend are interpolated slot by slot and
are not re-normalized, so their sum may drift from 1.0 by floating error.

# Arguments
- `store` - Parsed inflow series, records in ascending time order.
- `time` - Query time [s].

# Returns
The interpolated record; `time` is the query time for interior blends and
the endpoint's own timestamp under flat extrapolation.
*/
pub fn interpolate(store: &TimeSeriesStore, time: f64) -> TimeSeriesRecord {
    let records = store.records();

    if time < records[0].time {
        return records[0].clone();
    }

    // Linear scan for the bracketing pair; the series is short and queried
    // once per boundary face per time step.
    for pair in records.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if a.time <= time && time <= b.time {
            let dt = b.time - a.time;
            if dt == 0.0 {
                return a.clone(); // Duplicate timestamps, zero-width interval
            }
            let t = (time - a.time) / dt;
            let s = 1.0 - t;
            return TimeSeriesRecord {
                time,
                mass_quantity: s * a.mass_quantity + t * b.mass_quantity,
                stagnation_temperature: s * a.stagnation_temperature
                    + t * b.stagnation_temperature,
                fractions: &a.fractions * s + &b.fractions * t,
            };
        }
    }

    records[records.len() - 1].clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::path::Path;

    fn two_record_store() -> TimeSeriesStore {
        TimeSeriesStore::parse_str(
            "2\nH2 O2\n2\n0.0 1.0 300.0 0.5 0.5\n10.0 2.0 350.0 0.2 0.8\n",
            Path::new("test.dat"),
            20,
        )
        .unwrap()
    }

    #[test]
    fn blends_midpoint() {
        let store = two_record_store();
        let rec = interpolate(&store, 5.0);
        assert_relative_eq!(rec.time, 5.0);
        assert_relative_eq!(rec.mass_quantity, 1.5);
        assert_relative_eq!(rec.stagnation_temperature, 325.0);
        assert_relative_eq!(rec.fractions[0], 0.35);
        assert_relative_eq!(rec.fractions[1], 0.65);
    }

    #[test]
    fn flat_extrapolation_below_range() {
        let store = two_record_store();
        assert_eq!(interpolate(&store, -1.0), store.records()[0]);
        assert_eq!(interpolate(&store, -1e9), store.records()[0]);
    }

    #[test]
    fn flat_extrapolation_above_range() {
        let store = two_record_store();
        assert_eq!(interpolate(&store, 20.0), store.records()[1]);
        assert_eq!(interpolate(&store, 1e9), store.records()[1]);
    }

    #[test]
    fn endpoint_queries_reproduce_records() {
        let store = TimeSeriesStore::parse_str(
            "1\nH2\n3\n0.0 1.0 300.0 1.0\n4.0 3.0 320.0 1.0\n9.0 2.0 310.0 1.0\n",
            Path::new("test.dat"),
            20,
        )
        .unwrap();
        for rec in store.records() {
            assert_eq!(&interpolate(&store, rec.time), rec);
        }
    }

    #[test]
    fn interior_blend_stays_between_endpoints() {
        let store = two_record_store();
        for k in 1..10 {
            let rec = interpolate(&store, k as f64);
            assert!(rec.mass_quantity >= 1.0 && rec.mass_quantity <= 2.0);
            assert!(rec.stagnation_temperature >= 300.0 && rec.stagnation_temperature <= 350.0);
            assert!(rec.fractions[0] >= 0.2 && rec.fractions[0] <= 0.5);
        }
    }

    #[test]
    fn single_record_answers_every_query() {
        let store =
            TimeSeriesStore::parse_str("1\nH2\n1\n5.0 1.0 300.0 1.0\n", Path::new("test.dat"), 20)
                .unwrap();
        let only = &store.records()[0];
        assert_eq!(&interpolate(&store, -100.0), only);
        assert_eq!(&interpolate(&store, 5.0), only);
        assert_eq!(&interpolate(&store, 100.0), only);
    }

    #[test]
    fn zero_width_interval_returns_left_record() {
        let store = TimeSeriesStore::parse_str(
            "1\nH2\n2\n3.0 1.0 300.0 1.0\n3.0 9.0 900.0 1.0\n",
            Path::new("test.dat"),
            20,
        )
        .unwrap();
        let rec = interpolate(&store, 3.0);
        assert_relative_eq!(rec.mass_quantity, 1.0);
    }
}
