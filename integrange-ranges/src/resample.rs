use integrange_core::models::{Column, ColumnType, IntervalStore, Record, Value};
use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index::sample;

use crate::errors::{RangesError, RangesResult};

/// Column holding the bootstrap replicate a row was drawn in; 0 is the original population.
pub const RESAMPLE_COLUMN: &str = "resample";

/// Column labelling the population a row belongs to.
pub const ORIGIN_COLUMN: &str = "origin";

fn resample_column() -> Column {
    Column::new(RESAMPLE_COLUMN, ColumnType::Int)
}

fn check_untagged(store: &IntervalStore) -> RangesResult<()> {
    if store.schema().contains(RESAMPLE_COLUMN) {
        return Err(RangesError::Schema(format!(
            "store already has a `{}` column",
            RESAMPLE_COLUMN
        )));
    }
    Ok(())
}

///
/// Draw `replicates` bootstrap populations from a background store.
///
/// Each replicate samples `sample_size` rows without replacement and tags
/// them with its replicate number (1 to `replicates`) in a new `resample`
/// column. Replicates are concatenated in order; inside a replicate rows
/// keep their background order. All draws come from one generator seeded
/// with `seed`, so identical arguments give identical output.
///
/// # Arguments:
/// - background: population to draw from
/// - sample_size: rows per replicate, at most the background size
/// - replicates: number of draws
/// - seed: generator seed
pub fn bootstrap_resample(
    background: &IntervalStore,
    sample_size: usize,
    replicates: u32,
    seed: u64,
) -> RangesResult<IntervalStore> {
    check_untagged(background)?;
    if sample_size > background.len() {
        return Err(RangesError::SampleSize {
            requested: sample_size,
            available: background.len(),
        });
    }

    let schema = background.schema().with_column(resample_column())?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut records: Vec<Record> = Vec::with_capacity(sample_size * replicates as usize);

    for tag in 1..=replicates {
        let mut rows = sample(&mut rng, background.len(), sample_size).into_vec();
        rows.sort_unstable();
        for row in rows {
            let Some(record) = background.get(row) else { continue };
            let mut values = record.values.clone();
            values.push(Some(Value::Int(tag as i64)));
            records.push(record.clone().with_values(values));
        }
        debug!("Replicate {} drew {} intervals", tag, sample_size);
    }

    info!(
        "Drew {} replicates of {} from {} background intervals (seed {})",
        replicates,
        sample_size,
        background.len(),
        seed
    );
    Ok(IntervalStore::new(
        background.genome().clone(),
        schema,
        records,
    )?)
}

/// Tag every row of an original population with `resample = 0`.
pub fn tag_original(store: &IntervalStore) -> RangesResult<IntervalStore> {
    check_untagged(store)?;
    Ok(store.with_constant_column(resample_column(), Value::Int(0))?)
}

/// Label every row with a categorical `origin` column.
pub fn with_origin(store: &IntervalStore, label: &str) -> RangesResult<IntervalStore> {
    Ok(store.with_constant_column(
        Column::new(ORIGIN_COLUMN, ColumnType::Categorical),
        Value::from(label),
    )?)
}
